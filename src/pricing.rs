//! Price Table - Injected, Immutable Rates
//!
//! Every rate the calculator uses lives here. `PriceTable::default()` is the
//! built-in GBP table; a JSON file only needs the fields it overrides.
//! Lookups are lenient: an unknown key prices as zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Failed to read price table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid price table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version '{0}' in price table")]
    InvalidVersion(String),

    #[error("Price table {table} requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { table: String, required: String, current: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceTable {
    pub version: String,
    pub engine_min_version: String,
    pub currency: String,
    pub colours: ColourRates,
    /// Price per linear metre, keyed by cill tier.
    pub cill_per_metre: BTreeMap<String, f64>,
    /// Price per handle, keyed by lower-cased colour.
    pub handles: BTreeMap<String, f64>,
    /// Flat price per side, keyed by addon tier.
    pub addons: BTreeMap<String, f64>,
    /// Flat price per extra, keyed by extras label.
    pub extras: BTreeMap<String, f64>,
    pub trickle_vent: f64,
    pub transom_bar: f64,
    pub astragal_bar: f64,
    pub bifold: BifoldRates,
    pub doors: DoorRates,
    pub slider: SliderRates,
    pub window: WindowRates,
    pub area: AreaRates,
    pub bay: BayRates,
    pub roof_bar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColourRates {
    /// Colours that carry no surcharge. Compared case-insensitively.
    pub standard: Vec<String>,
    pub outside_ral: f64,
    pub inside_ral: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BifoldRates {
    pub leaf: f64,
    /// Per panel.
    pub integral_blinds: f64,
    /// Per panel.
    pub low_e_glass: f64,
    pub sidelight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoorRates {
    pub french_leaf: f64,
    pub single_leaf: f64,
    pub sidelight: f64,
    pub toplight: f64,
    /// Per sidelight or toplight carrying a transom.
    pub sidelight_transom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SliderRates {
    pub panel: f64,
    /// Per panel, on top of the panel price.
    pub interlock_47mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowRates {
    pub opener: f64,
    pub transom: f64,
    pub fixed: f64,
}

/// Per square metre of frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AreaRates {
    pub shaped: f64,
    pub fixed: f64,
    pub rooflight: f64,
    pub lantern: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BayRates {
    pub frame: f64,
    pub corner_post: f64,
}

fn table<const N: usize>(entries: [(&str, f64); N]) -> BTreeMap<String, f64> {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            engine_min_version: "1.0.0".to_string(),
            currency: "GBP".to_string(),
            colours: ColourRates::default(),
            cill_per_metre: table([
                ("none", 0.0),
                ("90mm", 38.0),
                ("150mm", 45.0),
                ("180mm", 52.0),
                ("225mm", 65.0),
            ]),
            handles: table([
                ("white", 0.0),
                ("black", 0.0),
                ("grey", 0.0),
                ("anthracite", 0.0),
                ("silver", 12.0),
                ("chrome", 18.0),
                ("satin chrome", 18.0),
                ("gold", 25.0),
            ]),
            addons: table([("20mm", 45.0), ("38mm", 65.0)]),
            extras: table([
                ("Corner Post", 150.0),
                ("Adjustable Jamb", 85.0),
                ("External Handle", 40.0),
                ("Flat Pack", 75.0),
            ]),
            trickle_vent: 25.0,
            transom_bar: 35.0,
            astragal_bar: 35.0,
            bifold: BifoldRates::default(),
            doors: DoorRates::default(),
            slider: SliderRates::default(),
            window: WindowRates::default(),
            area: AreaRates::default(),
            bay: BayRates::default(),
            roof_bar: 40.0,
        }
    }
}

impl Default for ColourRates {
    fn default() -> Self {
        Self {
            standard: ["white", "black", "grey", "anthracite"].map(String::from).to_vec(),
            outside_ral: 250.0,
            inside_ral: 0.0,
        }
    }
}

impl Default for BifoldRates {
    fn default() -> Self {
        Self { leaf: 395.0, integral_blinds: 180.0, low_e_glass: 45.0, sidelight: 350.0 }
    }
}

impl Default for DoorRates {
    fn default() -> Self {
        Self {
            french_leaf: 650.0,
            single_leaf: 895.0,
            sidelight: 320.0,
            toplight: 280.0,
            sidelight_transom: 45.0,
        }
    }
}

impl Default for SliderRates {
    fn default() -> Self {
        Self { panel: 520.0, interlock_47mm: 60.0 }
    }
}

impl Default for WindowRates {
    fn default() -> Self {
        Self { opener: 240.0, transom: 180.0, fixed: 140.0 }
    }
}

impl Default for AreaRates {
    fn default() -> Self {
        Self { shaped: 420.0, fixed: 280.0, rooflight: 900.0, lantern: 1250.0 }
    }
}

impl Default for BayRates {
    fn default() -> Self {
        Self { frame: 450.0, corner_post: 95.0 }
    }
}

impl PriceTable {
    /// Load a table from JSON. Missing fields take the built-in values.
    pub fn load(path: &Path) -> Result<Self, PricingError> {
        let content = fs::read_to_string(path)?;
        let table: PriceTable = serde_json::from_str(&content)?;
        debug!(path = %path.display(), version = %table.version, "loaded price table");
        Ok(table)
    }

    /// Refuse tables written for a newer engine.
    pub fn check_engine_version(&self) -> Result<(), PricingError> {
        let engine = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| PricingError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let required = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| PricingError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine < required {
            return Err(PricingError::EngineVersionMismatch {
                table: self.version.clone(),
                required: self.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }
        Ok(())
    }

    pub fn is_standard_colour(&self, colour: &str) -> bool {
        self.colours.standard.iter().any(|c| c.eq_ignore_ascii_case(colour.trim()))
    }

    pub fn cill_rate(&self, tier: &str) -> f64 {
        self.cill_per_metre.get(tier).copied().unwrap_or(0.0)
    }

    pub fn handle_price(&self, colour: &str) -> f64 {
        self.handles.get(&colour.trim().to_lowercase()).copied().unwrap_or(0.0)
    }

    pub fn addon_price(&self, tier: &str) -> Option<f64> {
        self.addons.get(tier).copied()
    }

    pub fn extra_price(&self, label: &str) -> f64 {
        self.extras.get(label).copied().unwrap_or(0.0)
    }
}
