//! Quote Assembler - Configuration + Breakdown to Persistable Payload
//!
//! A payload embeds full configuration snapshots, never references. The
//! top-level product fields describe the first item; totals always cover every
//! item. `financials` mirrors the top-level totals for older readers.

use serde::{Deserialize, Serialize};

use crate::calculator::{round2, PriceBreakdown};
use crate::config::{ProductConfig, ProductType};

/// Lifecycle of a stored quote: `draft -> pending -> ordered`, and `archived`
/// from anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Pending,
    Ordered,
    Archived,
}

impl QuoteStatus {
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        match (self, next) {
            (_, QuoteStatus::Archived) => true,
            (QuoteStatus::Archived, _) => false,
            (QuoteStatus::Draft, QuoteStatus::Pending) => true,
            (QuoteStatus::Pending, QuoteStatus::Ordered) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Ordered => "ordered",
            QuoteStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "pending" => Ok(QuoteStatus::Pending),
            "ordered" => Ok(QuoteStatus::Ordered),
            "archived" => Ok(QuoteStatus::Archived),
            other => Err(format!("Unknown quote status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    pub net_total: f64,
    pub tax_total: f64,
    pub gross_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub product_type: ProductType,
    pub configuration: ProductConfig,
    pub price_breakdown: PriceBreakdown,
    /// False when the calculator had nothing to offer and the breakdown is
    /// the empty placeholder.
    pub price_available: bool,
    pub quantity: u32,
    pub net_price: f64,
    pub total_price: f64,
}

impl QuoteItem {
    pub fn new(config: &ProductConfig, breakdown: Option<&PriceBreakdown>) -> Self {
        let (net_price, total_price) = breakdown.map(resolve_totals).unwrap_or((0.0, 0.0));
        Self {
            product_type: config.product_type(),
            configuration: config.clone(),
            price_breakdown: breakdown.cloned().unwrap_or_else(PriceBreakdown::empty),
            price_available: breakdown.is_some(),
            quantity: 1,
            net_price,
            total_price,
        }
    }
}

fn present(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Net prefers the subtotal, gross prefers the total; each falls back to the
/// other. Non-finite amounts count as absent.
fn resolve_totals(breakdown: &PriceBreakdown) -> (f64, f64) {
    let subtotal = present(breakdown.subtotal);
    let total = present(breakdown.total);
    let net = subtotal.or(total).unwrap_or(0.0);
    let gross = total.or(subtotal).unwrap_or(net);
    (net, gross)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub product_type: ProductType,
    pub configuration: ProductConfig,
    pub price_breakdown: PriceBreakdown,
    pub quantity: u32,
    pub location: Option<String>,
    pub net_price: f64,
    pub total_price: f64,
    pub tax_total: f64,
    pub items: Vec<QuoteItem>,
    pub financials: Financials,
}

impl QuotePayload {
    /// Append another configured item and recompute every total.
    pub fn push_item(&mut self, config: &ProductConfig, breakdown: Option<&PriceBreakdown>) {
        self.items.push(QuoteItem::new(config, breakdown));
        self.recompute();
    }

    fn recompute(&mut self) {
        let net: f64 = self.items.iter().map(|i| i.net_price * i.quantity as f64).sum();
        let gross: f64 = self.items.iter().map(|i| i.total_price * i.quantity as f64).sum();
        self.net_price = round2(net);
        self.total_price = round2(gross);
        self.tax_total = round2((self.total_price - self.net_price).max(0.0));
        self.financials = Financials {
            net_total: self.net_price,
            tax_total: self.tax_total,
            gross_total: self.total_price,
        };
    }
}

/// Package one configuration and its breakdown (if any) as a new quote.
pub fn assemble(config: &ProductConfig, breakdown: Option<&PriceBreakdown>) -> QuotePayload {
    let item = QuoteItem::new(config, breakdown);
    let mut payload = QuotePayload {
        product_type: item.product_type,
        configuration: item.configuration.clone(),
        price_breakdown: item.price_breakdown.clone(),
        quantity: item.quantity,
        location: config.location().map(str::to_string),
        net_price: 0.0,
        total_price: 0.0,
        tax_total: 0.0,
        items: vec![item],
        financials: Financials::default(),
    };
    payload.recompute();
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{price, LineItem};
    use serde_json::json;

    fn breakdown(subtotal: f64, total: f64) -> PriceBreakdown {
        PriceBreakdown {
            line_items: vec![LineItem { label: "Thing".into(), quantity: 1, unit_price: subtotal, total: subtotal }],
            subtotal,
            total,
        }
    }

    #[test]
    fn test_equal_totals_mean_zero_tax() {
        let config = ProductConfig::new(ProductType::Bifold);
        let payload = assemble(&config, price(&config).as_ref());
        assert_eq!(payload.net_price, payload.total_price);
        assert_eq!(payload.tax_total, 0.0);
        assert_eq!(payload.financials.gross_total, payload.total_price);
        assert_eq!(payload.financials.net_total, payload.net_price);
        assert_eq!(payload.quantity, 1);
        assert_eq!(payload.items.len(), 1);
        assert!(payload.items[0].price_available);
    }

    #[test]
    fn test_tax_is_gross_minus_net() {
        let config = ProductConfig::new(ProductType::Bifold);
        let payload = assemble(&config, Some(&breakdown(1000.0, 1200.0)));
        assert_eq!(payload.net_price, 1000.0);
        assert_eq!(payload.total_price, 1200.0);
        assert_eq!(payload.tax_total, 200.0);
        assert_eq!(payload.financials.tax_total, 200.0);
    }

    #[test]
    fn test_tax_never_negative() {
        let config = ProductConfig::new(ProductType::Bifold);
        let payload = assemble(&config, Some(&breakdown(1200.0, 1000.0)));
        assert_eq!(payload.tax_total, 0.0);
    }

    #[test]
    fn test_absent_amounts_fall_back() {
        let config = ProductConfig::new(ProductType::Bifold);
        let no_subtotal = assemble(&config, Some(&breakdown(f64::NAN, 800.0)));
        assert_eq!((no_subtotal.net_price, no_subtotal.total_price), (800.0, 800.0));

        let no_total = assemble(&config, Some(&breakdown(650.0, f64::NAN)));
        assert_eq!((no_total.net_price, no_total.total_price), (650.0, 650.0));
    }

    #[test]
    fn test_missing_breakdown_persists_empty_placeholder() {
        let config = ProductConfig::new(ProductType::Custom);
        let payload = assemble(&config, None);
        assert!(payload.price_breakdown.line_items.is_empty());
        assert_eq!(payload.price_breakdown.subtotal, 0.0);
        assert_eq!(payload.net_price, 0.0);
        assert!(!payload.items[0].price_available);
    }

    #[test]
    fn test_location_copied_to_top_level() {
        let config = ProductConfig::new(ProductType::Rooflight)
            .update(&json!({"location": "Orangery"}))
            .unwrap();
        assert_eq!(assemble(&config, None).location.as_deref(), Some("Orangery"));
        let bifold = ProductConfig::new(ProductType::Bifold);
        assert_eq!(assemble(&bifold, None).location, None);
    }

    #[test]
    fn test_multi_item_totals() {
        let door = ProductConfig::new(ProductType::SingleDoor);
        let window = ProductConfig::new(ProductType::Window);
        let mut payload = assemble(&door, Some(&breakdown(900.0, 900.0)));
        payload.push_item(&window, Some(&breakdown(500.25, 600.25)));

        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.product_type, ProductType::SingleDoor);
        assert_eq!(payload.net_price, 1400.25);
        assert_eq!(payload.total_price, 1500.25);
        assert_eq!(payload.tax_total, 100.0);
        assert_eq!(payload.financials.gross_total, 1500.25);
    }

    #[test]
    fn test_payload_is_a_snapshot() {
        let config = ProductConfig::new(ProductType::Bifold);
        let payload = assemble(&config, None);
        let edited = config.update(&json!({"width": 5000})).unwrap();
        assert_eq!(payload.configuration.width(), 3000);
        assert_eq!(edited.width(), 5000);
    }

    #[test]
    fn test_status_transitions() {
        use QuoteStatus::*;
        assert!(Draft.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Ordered));
        assert!(Draft.can_transition_to(Archived));
        assert!(Ordered.can_transition_to(Archived));
        assert!(!Draft.can_transition_to(Ordered));
        assert!(!Ordered.can_transition_to(Draft));
        assert!(!Archived.can_transition_to(Draft));
        assert!(Archived.can_transition_to(Archived));
        assert!(!Pending.can_transition_to(Pending));
        assert_eq!("Pending".parse::<QuoteStatus>().unwrap(), Pending);
    }

    #[test]
    fn test_payload_wire_fields() {
        let config = ProductConfig::new(ProductType::FrenchDoor);
        let value = serde_json::to_value(assemble(&config, price(&config).as_ref())).unwrap();
        for key in ["productType", "configuration", "priceBreakdown", "quantity", "location", "netPrice", "totalPrice", "items", "financials"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["financials"].get("grossTotal").is_some());
        assert_eq!(value["productType"], "FrenchDoor");
    }
}
