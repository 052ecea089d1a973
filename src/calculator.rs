//! Price Calculator - Configuration to Itemized Breakdown
//!
//! Pure function of a configuration, a price table and the window layouts.
//! Line items come out in one fixed sequence:
//! panels/leaves, cill, handle, trickle vents, custom colour, addons (left,
//! right, top), transom bars, astragal bars, blinds, glass, sidelights, extras.
//! A line whose total is zero is dropped, except the inside-colour surcharge.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::{
    Addons, BaseConfig, BayConfig, BifoldConfig, DoorConfig, ProductConfig, RoofConfig,
    SliderConfig, WindowConfig, Interlock,
};
use crate::layouts::LayoutRegistry;
use crate::pricing::PriceTable;

/// Optional extras in the order they are billed.
pub const EXTRAS_ORDER: [&str; 4] = ["Corner Post", "Adjustable Jamb", "External Handle", "Flat Pack"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub label: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub total: f64,
}

impl PriceBreakdown {
    /// Placeholder persisted when no calculator exists for a product.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Round to pence, half away from zero on the binary value. A product like
/// 45.045 is stored just below the half and rounds down to 45.04; that
/// matches the storefront's rounding and must stay.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn area_m2(base: &BaseConfig) -> f64 {
    base.width as f64 * base.height as f64 / 1_000_000.0
}

/// Accumulates line items in call order.
struct Lines<'a> {
    table: &'a PriceTable,
    items: Vec<LineItem>,
}

impl<'a> Lines<'a> {
    fn new(table: &'a PriceTable) -> Self {
        Self { table, items: vec![] }
    }

    fn always(&mut self, label: impl Into<String>, quantity: u32, unit_price: f64) {
        let unit_price = round2(unit_price);
        self.items.push(LineItem {
            label: label.into(),
            quantity,
            unit_price,
            total: round2(quantity as f64 * unit_price),
        });
    }

    fn non_zero(&mut self, label: impl Into<String>, quantity: u32, unit_price: f64) {
        if round2(quantity as f64 * round2(unit_price)) != 0.0 {
            self.always(label, quantity, unit_price);
        }
    }

    /// Priced by area, one line per frame.
    fn area(&mut self, name: &str, base: &BaseConfig, rate: f64) {
        let area = area_m2(base);
        self.always(format!("{} ({:.2} m²)", name, area), 1, area * rate);
    }

    fn cill(&mut self, base: &BaseConfig) {
        let rate = self.table.cill_rate(&base.cill);
        self.non_zero(format!("Cill ({})", base.cill), 1, rate * base.width as f64 / 1000.0);
    }

    fn handles(&mut self, colour: &str, quantity: u32) {
        let price = self.table.handle_price(colour);
        self.non_zero(format!("Handle ({})", colour), quantity, price);
    }

    fn trickle_vents(&mut self, base: &BaseConfig) {
        self.non_zero("Trickle vents", base.trickle_vents.count(), self.table.trickle_vent);
    }

    /// Outside surcharge when the outside colour is non-standard; inside
    /// surcharge, even at zero, when the inside colour is non-standard and
    /// differs from the outside. A blank colour was never chosen and is never
    /// charged.
    fn colours(&mut self, outside: &str, inside: &str) {
        let table = self.table;
        let custom = |colour: &str| !colour.trim().is_empty() && !table.is_standard_colour(colour);
        if custom(outside) {
            self.non_zero(format!("Custom colour - outside ({})", outside), 1, self.table.colours.outside_ral);
        }
        if custom(inside) && !inside.trim().eq_ignore_ascii_case(outside.trim()) {
            self.always(format!("Custom colour - inside ({})", inside), 1, self.table.colours.inside_ral);
        }
    }

    fn addons(&mut self, addons: &Addons) {
        for (side, tier) in addons.sides() {
            let Some(tier) = tier else { continue };
            if let Some(price) = self.table.addon_price(tier.as_str()) {
                self.non_zero(format!("Addon {} ({})", side, tier.as_str()), 1, price);
            }
        }
    }

    fn bars(&mut self, transom: u32, astragal: u32) {
        self.non_zero("Transom bars", transom, self.table.transom_bar);
        self.non_zero("Astragal bars", astragal, self.table.astragal_bar);
    }

    fn extras(&mut self, base: &BaseConfig) {
        for label in EXTRAS_ORDER {
            if base.has_extra(label) {
                self.non_zero(label, 1, self.table.extra_price(label));
            }
        }
    }

    fn finish(self) -> PriceBreakdown {
        let subtotal = round2(self.items.iter().map(|item| item.total).sum());
        PriceBreakdown { line_items: self.items, subtotal, total: subtotal }
    }
}

/// Effective outside and inside colours; overrides fall back to `color`.
fn colour_pair<'c>(base: &'c BaseConfig, outside: &'c Option<String>, inside: &'c Option<String>) -> (&'c str, &'c str) {
    (
        outside.as_deref().unwrap_or(&base.color),
        inside.as_deref().unwrap_or(&base.color),
    )
}

/// The price calculator - one breakdown per configuration
pub struct PriceCalculator {
    table: PriceTable,
    layouts: LayoutRegistry,
}

impl PriceCalculator {
    pub fn new(table: PriceTable, layouts: LayoutRegistry) -> Self {
        Self { table, layouts }
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    /// `None` means no preview is available for this configuration, which is
    /// different from a breakdown that totals zero.
    pub fn price(&self, config: &ProductConfig) -> Option<PriceBreakdown> {
        match config {
            ProductConfig::Bifold(c) => Some(self.bifold(c)),
            ProductConfig::FrenchDoor(c) => Some(self.door(c, "French door leaves", 2, self.table.doors.french_leaf)),
            ProductConfig::SingleDoor(c) => Some(self.door(c, "Door leaf", 1, self.table.doors.single_leaf)),
            ProductConfig::Slider(c) => Some(self.slider(c)),
            ProductConfig::Window(c) => self.window(c),
            ProductConfig::Shaped(c) => Some(self.framed_area(&c.base, "Shaped frame", self.table.area.shaped)),
            ProductConfig::Fixed(c) => Some(self.framed_area(&c.base, "Fixed glazing", self.table.area.fixed)),
            ProductConfig::Bay(c) => Some(self.bay(c)),
            ProductConfig::Rooflight(c) => Some(self.roof(c, "Rooflight", self.table.area.rooflight)),
            ProductConfig::Lantern(c) => Some(self.roof(c, "Roof lantern", self.table.area.lantern)),
            ProductConfig::Custom(_) => None,
        }
    }

    fn bifold(&self, c: &BifoldConfig) -> PriceBreakdown {
        let rates = &self.table.bifold;
        let (outside, inside) = colour_pair(&c.base, &c.outside_color, &c.inside_color);
        let mut lines = Lines::new(&self.table);

        lines.always("Bi-fold panels", c.panels, rates.leaf);
        lines.cill(&c.base);
        lines.handles(&c.base.handle_color, c.panels);
        lines.trickle_vents(&c.base);
        lines.colours(outside, inside);
        lines.addons(&c.addons);
        lines.bars(c.transom_bars, c.astragal_bars);
        if c.integral_blinds {
            lines.non_zero("Integrated blinds", c.panels, rates.integral_blinds);
        }
        if c.low_e_glass {
            lines.non_zero("Low-E glass upgrade", c.panels, rates.low_e_glass);
        }
        lines.non_zero("Sidelights", c.extra_sidelights, rates.sidelight);
        lines.extras(&c.base);
        lines.finish()
    }

    fn door(&self, c: &DoorConfig, leaf_label: &str, leaves: u32, leaf_price: f64) -> PriceBreakdown {
        let rates = &self.table.doors;
        let (outside, inside) = colour_pair(&c.base, &c.outside_color, &c.inside_color);
        let lights = &c.sidelights;
        let mut lines = Lines::new(&self.table);

        lines.always(leaf_label, leaves, leaf_price);
        lines.cill(&c.base);
        lines.handles(&c.base.handle_color, 1);
        lines.trickle_vents(&c.base);
        lines.colours(outside, inside);
        lines.addons(&c.addons);

        let side_count = [&lights.left, &lights.right].iter().filter(|l| l.enabled).count() as u32;
        lines.non_zero("Sidelights", side_count, rates.sidelight);
        if lights.top.enabled {
            lines.non_zero("Toplight", 1, rates.toplight);
        }
        let transoms = [
            lights.left.enabled && lights.left.transom == Some(true),
            lights.right.enabled && lights.right.transom == Some(true),
            lights.top.enabled && lights.top.transom == Some(true),
        ]
        .iter()
        .filter(|&&t| t)
        .count() as u32;
        lines.non_zero("Sidelight transoms", transoms, rates.sidelight_transom);

        lines.extras(&c.base);
        lines.finish()
    }

    fn slider(&self, c: &SliderConfig) -> PriceBreakdown {
        let rates = &self.table.slider;
        let mut lines = Lines::new(&self.table);

        lines.always("Sliding panels", c.panels, rates.panel);
        if c.interlock == Interlock::Mm47 {
            lines.non_zero("47mm interlock upgrade", c.panels, rates.interlock_47mm);
        }
        lines.cill(&c.base);
        lines.handles(&c.base.handle_color, c.panels);
        lines.trickle_vents(&c.base);
        lines.colours(&c.base.color, &c.base.color);
        lines.extras(&c.base);
        lines.finish()
    }

    /// Needs the layout to count panes; unknown layouts have no preview.
    fn window(&self, c: &WindowConfig) -> Option<PriceBreakdown> {
        let counts = self.layouts.get(&c.window_style)?.counts();
        let rates = &self.table.window;
        let mut lines = Lines::new(&self.table);

        lines.non_zero("Opening sashes", counts.openers, rates.opener);
        lines.non_zero("Transom openers", counts.transoms, rates.transom);
        lines.non_zero("Fixed panes", counts.fixed, rates.fixed);
        lines.cill(&c.base);
        lines.handles(&c.base.handle_color, counts.operable());
        lines.trickle_vents(&c.base);
        lines.colours(&c.base.color, &c.base.color);
        lines.extras(&c.base);
        Some(lines.finish())
    }

    fn framed_area(&self, base: &BaseConfig, name: &str, rate: f64) -> PriceBreakdown {
        let mut lines = Lines::new(&self.table);
        lines.area(name, base, rate);
        lines.cill(base);
        lines.trickle_vents(base);
        lines.colours(&base.color, &base.color);
        lines.extras(base);
        lines.finish()
    }

    fn bay(&self, c: &BayConfig) -> PriceBreakdown {
        let rates = &self.table.bay;
        let mut lines = Lines::new(&self.table);

        lines.always("Bay frames", c.frames, rates.frame);
        lines.non_zero("Bay corner posts", c.frames.saturating_sub(1), rates.corner_post);
        lines.cill(&c.base);
        lines.trickle_vents(&c.base);
        lines.colours(&c.base.color, &c.base.color);
        lines.extras(&c.base);
        lines.finish()
    }

    fn roof(&self, c: &RoofConfig, name: &str, rate: f64) -> PriceBreakdown {
        let mut lines = Lines::new(&self.table);
        lines.area(name, &c.base, rate);
        lines.trickle_vents(&c.base);
        lines.colours(&c.base.color, &c.base.color);
        lines.non_zero("Glazing bars", c.bars, self.table.roof_bar);
        lines.extras(&c.base);
        lines.finish()
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new(PriceTable::default(), LayoutRegistry::builtin())
    }
}

/// Price against the built-in table and layouts.
pub fn price(config: &ProductConfig) -> Option<PriceBreakdown> {
    static STANDARD: OnceLock<PriceCalculator> = OnceLock::new();
    STANDARD.get_or_init(PriceCalculator::default).price(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductType;
    use serde_json::json;

    fn configured(product_type: ProductType, patch: serde_json::Value) -> ProductConfig {
        ProductConfig::new(product_type).update(&patch).unwrap()
    }

    fn labels(breakdown: &PriceBreakdown) -> Vec<&str> {
        breakdown.line_items.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn test_bifold_custom_colour_example() {
        let config = configured(ProductType::Bifold, json!({
            "outsideColor": "RAL 7016",
            "insideColor": "RAL 7016",
            "cill": "none"
        }));
        let breakdown = price(&config).unwrap();

        assert_eq!(labels(&breakdown), vec!["Bi-fold panels", "Custom colour - outside (RAL 7016)"]);
        assert_eq!(breakdown.line_items[0].total, 1185.0);
        assert_eq!(breakdown.line_items[1].total, 250.0);
        assert_eq!(breakdown.subtotal, 1435.0);
        assert_eq!(breakdown.total, breakdown.subtotal);
    }

    #[test]
    fn test_inside_surcharge_emitted_at_zero() {
        let config = configured(ProductType::Bifold, json!({
            "outsideColor": "RAL 7016",
            "insideColor": "RAL 9016",
            "cill": "none"
        }));
        let breakdown = price(&config).unwrap();
        let inside = breakdown
            .line_items
            .iter()
            .find(|l| l.label.starts_with("Custom colour - inside"))
            .expect("inside surcharge line");
        assert_eq!(inside.total, 0.0);
        assert_eq!(breakdown.subtotal, 1435.0);
    }

    #[test]
    fn test_zero_lines_suppressed() {
        let config = configured(ProductType::Bifold, json!({"handleColor": "white", "cill": "none"}));
        let breakdown = price(&config).unwrap();
        assert!(!breakdown.line_items.iter().any(|l| l.label.starts_with("Handle")));
        assert!(!breakdown.line_items.iter().any(|l| l.label.starts_with("Cill")));

        let odd = configured(ProductType::Bifold, json!({"cill": "unobtainium"}));
        assert!(!price(&odd).unwrap().line_items.iter().any(|l| l.label.starts_with("Cill")));
    }

    #[test]
    fn test_cill_is_per_linear_metre() {
        let config = configured(ProductType::Bifold, json!({"width": 3100, "cill": "150mm"}));
        let cill = price(&config).unwrap().line_items.into_iter().find(|l| l.label == "Cill (150mm)").unwrap();
        assert_eq!(cill.quantity, 1);
        assert_eq!(cill.total, 139.5);
    }

    #[test]
    fn test_full_bifold_order() {
        let config = configured(ProductType::Bifold, json!({
            "panels": 4,
            "configuration": "2+2",
            "handleColor": "Chrome",
            "trickleVents": true,
            "outsideColor": "RAL 7016",
            "insideColor": "RAL 9010",
            "addons": {"left": "20mm", "right": null, "top": "38mm"},
            "transomBars": 2,
            "astragalBars": 1,
            "integralBlinds": true,
            "lowEGlass": true,
            "extraSidelights": 1,
            "extras": ["Flat Pack", "Corner Post", "Flat Pack", "Mystery Extra"]
        }));
        let breakdown = price(&config).unwrap();
        assert_eq!(labels(&breakdown), vec![
            "Bi-fold panels",
            "Cill (150mm)",
            "Handle (Chrome)",
            "Trickle vents",
            "Custom colour - outside (RAL 7016)",
            "Custom colour - inside (RAL 9010)",
            "Addon left (20mm)",
            "Addon top (38mm)",
            "Transom bars",
            "Astragal bars",
            "Integrated blinds",
            "Low-E glass upgrade",
            "Sidelights",
            "Corner Post",
            "Flat Pack",
        ]);

        let handle = &breakdown.line_items[2];
        assert_eq!((handle.quantity, handle.total), (4, 72.0));
        let flat_pack = breakdown.line_items.last().unwrap();
        assert_eq!((flat_pack.quantity, flat_pack.total), (1, 75.0));

        let sum: f64 = breakdown.line_items.iter().map(|l| l.total).sum();
        assert_eq!(breakdown.subtotal, round2(sum));
    }

    #[test]
    fn test_trickle_vent_count() {
        let config = configured(ProductType::Bifold, json!({"trickleVents": 3}));
        let vents = price(&config).unwrap().line_items.into_iter().find(|l| l.label == "Trickle vents").unwrap();
        assert_eq!((vents.quantity, vents.total), (3, 75.0));
    }

    #[test]
    fn test_french_door_with_sidelights() {
        let config = configured(ProductType::FrenchDoor, json!({
            "width": 2200,
            "cill": "none",
            "sidelights": {
                "left": {"enabled": true, "width": 400, "transom": true},
                "right": {"enabled": true, "width": 0},
                "top": {"enabled": false, "height": 300, "transom": true}
            }
        }));
        let breakdown = price(&config).unwrap();
        assert_eq!(labels(&breakdown), vec!["French door leaves", "Sidelights", "Sidelight transoms"]);
        assert_eq!(breakdown.subtotal, 1300.0 + 640.0 + 45.0);
    }

    #[test]
    fn test_single_door_leaf() {
        let config = configured(ProductType::SingleDoor, json!({"cill": "none", "handleColor": "gold"}));
        let breakdown = price(&config).unwrap();
        assert_eq!(labels(&breakdown), vec!["Door leaf", "Handle (gold)"]);
        assert_eq!(breakdown.subtotal, 920.0);
    }

    #[test]
    fn test_slider_interlock_upgrade() {
        let config = configured(ProductType::Slider, json!({"panels": 3, "interlock": "47mm", "cill": "none"}));
        let breakdown = price(&config).unwrap();
        assert_eq!(labels(&breakdown), vec!["Sliding panels", "47mm interlock upgrade"]);
        assert_eq!(breakdown.subtotal, 1560.0 + 180.0);
    }

    #[test]
    fn test_window_counts_layout_panes() {
        let config = configured(ProductType::Window, json!({
            "windowStyle": "two-pane-with-transoms",
            "cill": "none",
            "handleColor": "silver"
        }));
        let breakdown = price(&config).unwrap();
        assert_eq!(labels(&breakdown), vec![
            "Opening sashes",
            "Transom openers",
            "Fixed panes",
            "Handle (silver)",
        ]);
        assert_eq!(breakdown.line_items[3].quantity, 3);
    }

    #[test]
    fn test_window_unknown_layout_has_no_preview() {
        let config = configured(ProductType::Window, json!({"windowStyle": "porthole"}));
        assert!(price(&config).is_none());
    }

    #[test]
    fn test_area_products() {
        let fixed = configured(ProductType::Fixed, json!({"width": 1200, "height": 2000}));
        let breakdown = price(&fixed).unwrap();
        assert_eq!(breakdown.line_items[0].label, "Fixed glazing (2.40 m²)");
        assert_eq!(breakdown.subtotal, 672.0);

        let lantern = configured(ProductType::Lantern, json!({"bars": 2}));
        let breakdown = price(&lantern).unwrap();
        assert_eq!(labels(&breakdown), vec!["Roof lantern (3.00 m²)", "Glazing bars"]);
        assert_eq!(breakdown.subtotal, 3750.0 + 80.0);
    }

    #[test]
    fn test_unset_colour_is_not_custom() {
        let fixed: ProductConfig =
            serde_json::from_value(json!({"type": "Fixed", "id": "x", "width": 1000, "height": 1000})).unwrap();
        assert_eq!(fixed.base().color, "White");
        let breakdown = price(&fixed).unwrap();
        assert_eq!(labels(&breakdown), vec!["Fixed glazing (1.00 m²)"]);
        assert_eq!(breakdown.subtotal, 280.0);

        let blank = configured(ProductType::Bifold, json!({"color": "", "outsideColor": " ", "cill": "none"}));
        let breakdown = price(&blank).unwrap();
        assert!(!labels(&breakdown).iter().any(|l| l.starts_with("Custom colour")));
        assert_eq!(breakdown.subtotal, 1185.0);
    }

    #[test]
    fn test_bay_corner_posts() {
        let config = configured(ProductType::Bay, json!({"frames": 3, "cill": "none"}));
        let breakdown = price(&config).unwrap();
        assert_eq!(labels(&breakdown), vec!["Bay frames", "Bay corner posts"]);
        assert_eq!(breakdown.subtotal, 1350.0 + 190.0);
    }

    #[test]
    fn test_custom_has_no_calculator() {
        assert!(price(&ProductConfig::new(ProductType::Custom)).is_none());
    }

    #[test]
    fn test_injected_table() {
        let mut table = PriceTable::default();
        table.bifold.leaf = 400.0;
        let calculator = PriceCalculator::new(table, LayoutRegistry::builtin());
        let config = configured(ProductType::Bifold, json!({"cill": "none"}));
        assert_eq!(calculator.price(&config).unwrap().subtotal, 1200.0);
    }
}
