//! Product Configuration Model - One Configured Item
//!
//! A configuration is a tagged union keyed by `type`. Every variant carries the
//! same flattened base shape (id, dimensions, legacy style fields) and extends it
//! with its own attributes. Configurations are plain data: validation and
//! pricing read them, `update` produces new ones, nothing mutates them in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Width of one bi-fold leaf used for panel-count advice.
pub const PANEL_WIDTH_MM: u32 = 600;

/// Width given to a sidelight that is switched on while still zero-width.
pub const DEFAULT_SIDELIGHT_WIDTH_MM: u32 = 400;

/// Glass unit thickness assumed when a bi-fold carries no override.
pub const DEFAULT_GLASS_THICKNESS_MM: u32 = 28;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown product type: {0}")]
    UnknownProductType(String),

    #[error("Patch changes product type from {from} to {to}; start a new configuration instead")]
    ProductTypeChange { from: ProductType, to: String },

    #[error("Patch must be a JSON object")]
    PatchNotObject,

    #[error("Patched configuration is not representable: {0}")]
    Representation(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductType {
    Bifold,
    FrenchDoor,
    SingleDoor,
    Slider,
    Window,
    Shaped,
    Fixed,
    Bay,
    Rooflight,
    Lantern,
    Custom,
}

impl ProductType {
    pub const ALL: [ProductType; 11] = [
        ProductType::Bifold,
        ProductType::FrenchDoor,
        ProductType::SingleDoor,
        ProductType::Slider,
        ProductType::Window,
        ProductType::Shaped,
        ProductType::Fixed,
        ProductType::Bay,
        ProductType::Rooflight,
        ProductType::Lantern,
        ProductType::Custom,
    ];

    /// Wire name, identical to the `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Bifold => "Bifold",
            ProductType::FrenchDoor => "FrenchDoor",
            ProductType::SingleDoor => "SingleDoor",
            ProductType::Slider => "Slider",
            ProductType::Window => "Window",
            ProductType::Shaped => "Shaped",
            ProductType::Fixed => "Fixed",
            ProductType::Bay => "Bay",
            ProductType::Rooflight => "Rooflight",
            ProductType::Lantern => "Lantern",
            ProductType::Custom => "Custom",
        }
    }

    /// Plural name used in customer-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductType::Bifold => "bi-fold doors",
            ProductType::FrenchDoor => "French doors",
            ProductType::SingleDoor => "single doors",
            ProductType::Slider => "sliding doors",
            ProductType::Window => "windows",
            ProductType::Shaped => "shaped frames",
            ProductType::Fixed => "fixed frames",
            ProductType::Bay => "bay windows",
            ProductType::Rooflight => "rooflights",
            ProductType::Lantern => "roof lanterns",
            ProductType::Custom => "custom products",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ConfigError;

    /// Accepts the wire name or any case/separator variant of it
    /// (`french-door`, `french_door`, `FRENCHDOOR`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        ProductType::ALL
            .into_iter()
            .find(|t| t.as_str().to_lowercase() == key)
            .ok_or_else(|| ConfigError::UnknownProductType(s.to_string()))
    }
}

/// Legacy boolean flag or a vent count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrickleVents {
    Present(bool),
    Count(i64),
}

impl Default for TrickleVents {
    fn default() -> Self {
        TrickleVents::Count(0)
    }
}

impl TrickleVents {
    /// Normalized non-negative vent count.
    pub fn count(&self) -> u32 {
        match *self {
            TrickleVents::Present(true) => 1,
            TrickleVents::Present(false) => 0,
            TrickleVents::Count(n) => n.clamp(0, u32::MAX as i64) as u32,
        }
    }
}

/// Fields shared by every product variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub glass: String,
    #[serde(default)]
    pub handle_color: String,
    #[serde(default = "default_cill")]
    pub cill: String,
    #[serde(default)]
    pub trickle_vents: TrickleVents,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

fn default_color() -> String { "White".to_string() }
fn default_cill() -> String { "none".to_string() }
fn default_threshold() -> String { "standard".to_string() }
fn default_bifold_opening() -> String { "outward".to_string() }
fn default_slide_direction() -> String { "left".to_string() }
fn default_window_style() -> String { "two-pane-left-opener".to_string() }
fn default_frame_system() -> String { "standard".to_string() }
fn default_shape() -> String { "gable".to_string() }
fn default_bay_frames() -> u32 { 3 }

impl BaseConfig {
    /// Fresh base with a newly generated id.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            width,
            height,
            color: default_color(),
            glass: "Clear".to_string(),
            handle_color: "Black".to_string(),
            cill: default_cill(),
            trickle_vents: TrickleVents::default(),
            extras: vec![],
            notes: String::new(),
        }
    }

    fn with_cill(mut self, cill: &str) -> Self {
        self.cill = cill.to_string();
        self
    }

    /// Set-membership test on the extras list; duplicates never count twice.
    pub fn has_extra(&self, label: &str) -> bool {
        self.extras.iter().any(|e| e == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddonTier {
    #[serde(rename = "20mm")]
    Mm20,
    #[serde(rename = "38mm")]
    Mm38,
}

impl AddonTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonTier::Mm20 => "20mm",
            AddonTier::Mm38 => "38mm",
        }
    }
}

/// Frame extension strips per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addons {
    #[serde(default)]
    pub left: Option<AddonTier>,
    #[serde(default)]
    pub right: Option<AddonTier>,
    #[serde(default)]
    pub top: Option<AddonTier>,
}

impl Addons {
    /// Sides in pricing order: left, right, top.
    pub fn sides(&self) -> [(&'static str, Option<AddonTier>); 3] {
        [("left", self.left), ("right", self.right), ("top", self.top)]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlassType {
    #[default]
    Clear,
    Obscure,
    Tinted,
    Acoustic,
}

impl GlassType {
    /// Only obscure glass carries a meaningful pattern name.
    pub fn supports_pattern(&self) -> bool {
        matches!(self, GlassType::Obscure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BifoldConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub panels: u32,
    /// Leaf split as `"L+R"`, e.g. `"3+0"`.
    pub configuration: String,
    #[serde(default = "default_bifold_opening")]
    pub opening_direction: String,
    #[serde(default)]
    pub traffic_door: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outside_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inside_color: Option<String>,
    #[serde(default = "default_threshold")]
    pub threshold: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_ramp: Option<String>,
    #[serde(default)]
    pub transom_bars: u32,
    #[serde(default)]
    pub astragal_bars: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transom_bar_positions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astragal_bar_positions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_color: Option<String>,
    #[serde(default)]
    pub glass_type: GlassType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glass_pattern: Option<String>,
    #[serde(default)]
    pub integral_blinds: bool,
    #[serde(default)]
    pub low_e_glass: bool,
    /// Certification flag. Price-neutral.
    #[serde(default)]
    pub pas24: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glass_thickness: Option<u32>,
    #[serde(default)]
    pub addons: Addons,
    /// Extra-frame sidelights priced with the bi-fold.
    #[serde(default)]
    pub extra_sidelights: u32,
}

impl BifoldConfig {
    /// Parse the `"L+R"` split. `None` if it is not two non-negative integers.
    pub fn split(&self) -> Option<(u32, u32)> {
        let (left, right) = self.configuration.split_once('+')?;
        Some((left.trim().parse().ok()?, right.trim().parse().ok()?))
    }

    pub fn max_panels(&self) -> u32 {
        max_panels(self.base.width)
    }

    pub fn panel_options(&self) -> Vec<u32> {
        panel_options(self.max_panels())
    }

    pub fn glass_thickness(&self) -> u32 {
        self.glass_thickness.unwrap_or(DEFAULT_GLASS_THICKNESS_MM)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningDirection {
    In,
    #[default]
    Out,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Left,
    #[default]
    Right,
}

/// Left or right sidelight flanking a door.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLight {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transom: Option<bool>,
}

impl SideLight {
    /// Switch the sidelight on, giving it the default width if it has none.
    pub fn enable(&mut self) {
        self.enabled = true;
        if self.width == 0 {
            self.width = DEFAULT_SIDELIGHT_WIDTH_MM;
        }
    }

    /// Width taken out of the overall frame.
    pub fn occupied_width(&self) -> u32 {
        if self.enabled { self.width } else { 0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLight {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transom: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidelights {
    #[serde(default)]
    pub left: SideLight,
    #[serde(default)]
    pub right: SideLight,
    #[serde(default)]
    pub top: TopLight,
}

/// French and single doors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub opening_direction: OpeningDirection,
    #[serde(default)]
    pub master_handle: HandleSide,
    #[serde(default)]
    pub sidelights: Sidelights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outside_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inside_color: Option<String>,
    #[serde(default = "default_threshold")]
    pub threshold: String,
    #[serde(default)]
    pub addons: Addons,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl DoorConfig {
    fn new(base: BaseConfig) -> Self {
        Self {
            base,
            opening_direction: OpeningDirection::default(),
            master_handle: HandleSide::default(),
            sidelights: Sidelights::default(),
            outside_color: None,
            inside_color: None,
            threshold: default_threshold(),
            addons: Addons::default(),
            location: None,
        }
    }

    /// Overall width less every enabled left/right sidelight. Recomputed on
    /// each call and may go negative for inconsistent input.
    pub fn door_width(&self) -> i64 {
        self.base.width as i64
            - self.sidelights.left.occupied_width() as i64
            - self.sidelights.right.occupied_width() as i64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interlock {
    #[default]
    #[serde(rename = "25mm")]
    Mm25,
    #[serde(rename = "47mm")]
    Mm47,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub interlock: Interlock,
    pub panels: u32,
    #[serde(default = "default_slide_direction")]
    pub slide_direction: String,
}

/// Panel counts a slider is manufactured in.
pub const SLIDER_PANEL_COUNTS: [u32; 4] = [2, 3, 4, 6];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub style: String,
    /// Id of a layout in the window layout registry.
    #[serde(default = "default_window_style")]
    pub window_style: String,
    #[serde(default = "default_frame_system")]
    pub frame_system: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapedConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default = "default_shape")]
    pub shape: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default = "default_bay_frames")]
    pub frames: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Rooflights and lanterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub bars: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductConfig {
    Bifold(BifoldConfig),
    FrenchDoor(DoorConfig),
    SingleDoor(DoorConfig),
    Slider(SliderConfig),
    Window(WindowConfig),
    Shaped(ShapedConfig),
    Fixed(FixedConfig),
    Bay(BayConfig),
    Rooflight(RoofConfig),
    Lantern(RoofConfig),
    Custom(CustomConfig),
}

impl ProductConfig {
    /// Default configuration for a freshly selected product type.
    pub fn new(product_type: ProductType) -> Self {
        match product_type {
            ProductType::Bifold => ProductConfig::Bifold(BifoldConfig {
                base: BaseConfig::new(3000, 2100).with_cill("150mm"),
                panels: 3,
                configuration: "3+0".to_string(),
                opening_direction: default_bifold_opening(),
                traffic_door: false,
                outside_color: None,
                inside_color: None,
                threshold: default_threshold(),
                threshold_ramp: None,
                transom_bars: 0,
                astragal_bars: 0,
                transom_bar_positions: None,
                astragal_bar_positions: None,
                hardware_color: None,
                glass_type: GlassType::default(),
                glass_pattern: None,
                integral_blinds: false,
                low_e_glass: false,
                pas24: false,
                glass_thickness: None,
                addons: Addons::default(),
                extra_sidelights: 0,
            }),
            ProductType::FrenchDoor => ProductConfig::FrenchDoor(DoorConfig::new(
                BaseConfig::new(1500, 2100).with_cill("150mm"),
            )),
            ProductType::SingleDoor => ProductConfig::SingleDoor(DoorConfig::new(
                BaseConfig::new(900, 2100).with_cill("150mm"),
            )),
            ProductType::Slider => ProductConfig::Slider(SliderConfig {
                base: BaseConfig::new(3000, 2100).with_cill("150mm"),
                interlock: Interlock::default(),
                panels: 2,
                slide_direction: default_slide_direction(),
            }),
            ProductType::Window => ProductConfig::Window(WindowConfig {
                base: BaseConfig::new(1200, 1200).with_cill("150mm"),
                style: "casement".to_string(),
                window_style: default_window_style(),
                frame_system: default_frame_system(),
            }),
            ProductType::Shaped => ProductConfig::Shaped(ShapedConfig {
                base: BaseConfig::new(1500, 1500),
                shape: default_shape(),
            }),
            ProductType::Fixed => ProductConfig::Fixed(FixedConfig {
                base: BaseConfig::new(1000, 1000),
                location: None,
            }),
            ProductType::Bay => ProductConfig::Bay(BayConfig {
                base: BaseConfig::new(3000, 1200).with_cill("150mm"),
                frames: default_bay_frames(),
                location: None,
            }),
            ProductType::Rooflight => ProductConfig::Rooflight(RoofConfig {
                base: BaseConfig::new(1000, 1000),
                bars: 0,
                location: None,
            }),
            ProductType::Lantern => ProductConfig::Lantern(RoofConfig {
                base: BaseConfig::new(2000, 1500),
                bars: 4,
                location: None,
            }),
            ProductType::Custom => ProductConfig::Custom(CustomConfig {
                base: BaseConfig::new(1000, 1000),
                description: String::new(),
            }),
        }
    }

    pub fn product_type(&self) -> ProductType {
        match self {
            ProductConfig::Bifold(_) => ProductType::Bifold,
            ProductConfig::FrenchDoor(_) => ProductType::FrenchDoor,
            ProductConfig::SingleDoor(_) => ProductType::SingleDoor,
            ProductConfig::Slider(_) => ProductType::Slider,
            ProductConfig::Window(_) => ProductType::Window,
            ProductConfig::Shaped(_) => ProductType::Shaped,
            ProductConfig::Fixed(_) => ProductType::Fixed,
            ProductConfig::Bay(_) => ProductType::Bay,
            ProductConfig::Rooflight(_) => ProductType::Rooflight,
            ProductConfig::Lantern(_) => ProductType::Lantern,
            ProductConfig::Custom(_) => ProductType::Custom,
        }
    }

    pub fn base(&self) -> &BaseConfig {
        match self {
            ProductConfig::Bifold(c) => &c.base,
            ProductConfig::FrenchDoor(c) | ProductConfig::SingleDoor(c) => &c.base,
            ProductConfig::Slider(c) => &c.base,
            ProductConfig::Window(c) => &c.base,
            ProductConfig::Shaped(c) => &c.base,
            ProductConfig::Fixed(c) => &c.base,
            ProductConfig::Bay(c) => &c.base,
            ProductConfig::Rooflight(c) | ProductConfig::Lantern(c) => &c.base,
            ProductConfig::Custom(c) => &c.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn width(&self) -> u32 {
        self.base().width
    }

    pub fn height(&self) -> u32 {
        self.base().height
    }

    /// Free-text installation location, for the types that carry one.
    pub fn location(&self) -> Option<&str> {
        match self {
            ProductConfig::FrenchDoor(c) | ProductConfig::SingleDoor(c) => c.location.as_deref(),
            ProductConfig::Fixed(c) => c.location.as_deref(),
            ProductConfig::Bay(c) => c.location.as_deref(),
            ProductConfig::Rooflight(c) => c.location.as_deref(),
            _ => None,
        }
    }

    /// Shallow-merge `patch` over this configuration.
    ///
    /// Keys absent from the patch are unchanged. `id` in a patch is ignored; a
    /// `type` that differs from this configuration's type is rejected.
    /// Bounds and self-consistency are not checked here.
    pub fn update(&self, patch: &Value) -> Result<ProductConfig, ConfigError> {
        let patch = patch.as_object().ok_or(ConfigError::PatchNotObject)?;
        let mut merged: Map<String, Value> = serde_json::from_value(serde_json::to_value(self)?)?;

        for (key, value) in patch {
            match key.as_str() {
                "id" => continue,
                "type" => {
                    if value.as_str() != Some(self.product_type().as_str()) {
                        return Err(ConfigError::ProductTypeChange {
                            from: self.product_type(),
                            to: value.to_string(),
                        });
                    }
                }
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Structural problems a patch can introduce. Reported, never repaired.
    pub fn consistency_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = vec![];
        match self {
            ProductConfig::Bifold(c) => {
                if c.panels == 0 {
                    issues.push(ConsistencyIssue::NoPanels);
                }
                match c.split() {
                    None => issues.push(ConsistencyIssue::UnparseableSplit {
                        configuration: c.configuration.clone(),
                    }),
                    Some((left, right)) if left.checked_add(right) != Some(c.panels) => {
                        issues.push(ConsistencyIssue::SplitMismatch { left, right, panels: c.panels })
                    }
                    Some(_) => {}
                }
                check_bar_positions(&mut issues, "transom", c.transom_bars, c.transom_bar_positions.as_deref());
                check_bar_positions(&mut issues, "astragal", c.astragal_bars, c.astragal_bar_positions.as_deref());
            }
            ProductConfig::Slider(c) => {
                if !SLIDER_PANEL_COUNTS.contains(&c.panels) {
                    issues.push(ConsistencyIssue::SliderPanelCount { panels: c.panels });
                }
            }
            _ => {}
        }
        issues
    }
}

fn check_bar_positions(
    issues: &mut Vec<ConsistencyIssue>,
    bars: &'static str,
    count: u32,
    positions: Option<&[f64]>,
) {
    let Some(positions) = positions else { return };
    if positions.len() != count as usize {
        issues.push(ConsistencyIssue::BarPositionCount {
            bars,
            expected: count,
            actual: positions.len(),
        });
    }
    for &position in positions {
        if !(0.0..=100.0).contains(&position) {
            issues.push(ConsistencyIssue::BarPositionOutOfRange { bars, position });
        }
    }
}

/// Free-function form of [`ProductConfig::new`].
pub fn create_default_config(product_type: ProductType) -> ProductConfig {
    ProductConfig::new(product_type)
}

/// Free-function form of [`ProductConfig::update`].
pub fn update_config(config: &ProductConfig, patch: &Value) -> Result<ProductConfig, ConfigError> {
    config.update(patch)
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    #[error("Bi-fold must have at least one panel")]
    NoPanels,

    #[error("Panel configuration '{configuration}' is not of the form L+R")]
    UnparseableSplit { configuration: String },

    #[error("Panel configuration {left}+{right} does not add up to {panels} panels")]
    SplitMismatch { left: u32, right: u32, panels: u32 },

    #[error("{expected} {bars} bars but {actual} positions given")]
    BarPositionCount { bars: &'static str, expected: u32, actual: usize },

    #[error("{bars} bar position {position} is outside 0-100%")]
    BarPositionOutOfRange { bars: &'static str, position: f64 },

    #[error("Sliders are made with 2, 3, 4 or 6 panels, not {panels}")]
    SliderPanelCount { panels: u32 },
}

/// Structurally sensible bi-fold panel count for a width. Advisory only.
pub fn max_panels(width: u32) -> u32 {
    width / PANEL_WIDTH_MM
}

/// Selectable panel counts for a maximum panel count.
pub fn panel_options(max: u32) -> Vec<u32> {
    match max {
        0 | 1 => vec![],
        2 => vec![2],
        3 => vec![2, 3],
        4..=6 => vec![max - 2, max - 1, max],
        _ => vec![5, 6, 7],
    }
}
