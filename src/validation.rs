//! Validation System - Dimension & Structural Rules
//!
//! Rules produce at most one violation each and run in a fixed order; the
//! first violation wins. Limits are data keyed by product type. A type with
//! no limits registered is provisionally valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::config::{ProductConfig, ProductType};

/// Machine-readable companion to the prose message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    WidthBelowMinimum,
    WidthAboveMaximum,
    HeightBelowMinimum,
    HeightAboveMaximum,
    DoorWidthBelowMinimum,
    DoorWidthAboveMaximum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationViolation {
    pub rule: String,
    pub reason: ValidationReason,
    pub message: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidationReason>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self { is_valid: true, message: None, reason: None }
    }

    pub fn failure(violation: ValidationViolation) -> Self {
        Self {
            is_valid: false,
            message: Some(violation.message),
            reason: Some(violation.reason),
        }
    }
}

/// Inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

/// Per-type limits. Every bound is inclusive; a missing bound is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionLimits {
    #[serde(default)]
    pub min_width: Option<u32>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub min_height: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
    /// Width left for the door leaves once enabled sidelights are taken out.
    #[serde(default)]
    pub door_width: Option<Bounds>,
}

/// Limits the configurator ships with.
pub fn standard_limits() -> BTreeMap<ProductType, DimensionLimits> {
    let mut limits = BTreeMap::new();
    limits.insert(ProductType::Bifold, DimensionLimits {
        min_width: Some(1200),
        max_width: Some(8000),
        max_height: Some(3000),
        ..Default::default()
    });
    limits.insert(ProductType::FrenchDoor, DimensionLimits {
        min_width: Some(1000),
        max_width: Some(5076),
        min_height: Some(500),
        max_height: Some(5068),
        door_width: Some(Bounds { min: 1000, max: 2476 }),
    });
    limits.insert(ProductType::SingleDoor, DimensionLimits {
        min_width: Some(600),
        max_width: Some(1200),
        max_height: Some(2500),
        ..Default::default()
    });
    limits.insert(ProductType::Slider, DimensionLimits {
        min_width: Some(1000),
        max_width: Some(10070),
        min_height: Some(800),
        max_height: Some(2768),
        ..Default::default()
    });
    limits.insert(ProductType::Shaped, DimensionLimits {
        min_width: Some(500),
        max_width: Some(5000),
        min_height: Some(200),
        max_height: Some(3000),
        ..Default::default()
    });
    limits.insert(ProductType::Fixed, DimensionLimits {
        min_width: Some(300),
        max_width: Some(5000),
        min_height: Some(300),
        max_height: Some(3000),
        ..Default::default()
    });
    limits
}

/// Validation rule trait - produces at most one violation
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, config: &ProductConfig, limits: &DimensionLimits) -> Option<ValidationViolation>;
}

fn violation(
    rule: &str,
    reason: ValidationReason,
    message: String,
    expected: String,
    actual: String,
) -> Option<ValidationViolation> {
    Some(ValidationViolation { rule: rule.to_string(), reason, message, expected, actual })
}

// --- Concrete Rules ---

pub struct WidthRule;

impl ValidationRule for WidthRule {
    fn name(&self) -> &'static str { "width" }

    fn check(&self, config: &ProductConfig, limits: &DimensionLimits) -> Option<ValidationViolation> {
        let width = config.width();
        let product = config.product_type().display_name();

        if let Some(min) = limits.min_width.filter(|&min| width < min) {
            return violation(
                self.name(),
                ValidationReason::WidthBelowMinimum,
                format!("Width {}mm is below the {}mm minimum for {}", width, min, product),
                format!(">= {}mm", min),
                format!("{}mm", width),
            );
        }
        if let Some(max) = limits.max_width.filter(|&max| width > max) {
            return violation(
                self.name(),
                ValidationReason::WidthAboveMaximum,
                format!("Width {}mm exceeds the {}mm maximum for {}", width, max, product),
                format!("<= {}mm", max),
                format!("{}mm", width),
            );
        }
        None
    }
}

pub struct HeightRule;

impl ValidationRule for HeightRule {
    fn name(&self) -> &'static str { "height" }

    fn check(&self, config: &ProductConfig, limits: &DimensionLimits) -> Option<ValidationViolation> {
        let height = config.height();
        let product = config.product_type().display_name();

        if let Some(min) = limits.min_height.filter(|&min| height < min) {
            return violation(
                self.name(),
                ValidationReason::HeightBelowMinimum,
                format!("Height {}mm is below the {}mm minimum for {}", height, min, product),
                format!(">= {}mm", min),
                format!("{}mm", height),
            );
        }
        if let Some(max) = limits.max_height.filter(|&max| height > max) {
            return violation(
                self.name(),
                ValidationReason::HeightAboveMaximum,
                format!("Height {}mm exceeds the {}mm maximum for {}", height, max, product),
                format!("<= {}mm", max),
                format!("{}mm", height),
            );
        }
        None
    }
}

/// Door leaf width after sidelights, recomputed from the current sidelights.
pub struct DoorWidthRule;

impl ValidationRule for DoorWidthRule {
    fn name(&self) -> &'static str { "door_width" }

    fn check(&self, config: &ProductConfig, limits: &DimensionLimits) -> Option<ValidationViolation> {
        let bounds = limits.door_width?;
        let door = match config {
            ProductConfig::FrenchDoor(c) | ProductConfig::SingleDoor(c) => c,
            _ => return None,
        };
        let door_width = door.door_width();

        if door_width < bounds.min as i64 {
            return violation(
                self.name(),
                ValidationReason::DoorWidthBelowMinimum,
                format!("Door width {}mm is below the {}mm minimum", door_width, bounds.min),
                format!(">= {}mm", bounds.min),
                format!("{}mm", door_width),
            );
        }
        if door_width > bounds.max as i64 {
            return violation(
                self.name(),
                ValidationReason::DoorWidthAboveMaximum,
                format!("Door width {}mm exceeds the {}mm maximum", door_width, bounds.max),
                format!("<= {}mm", bounds.max),
                format!("{}mm", door_width),
            );
        }
        None
    }
}

/// Validator orchestrates rules over the limits table
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    limits: BTreeMap<ProductType, DimensionLimits>,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_limits(standard_limits())
    }

    pub fn with_limits(limits: BTreeMap<ProductType, DimensionLimits>) -> Self {
        Self {
            rules: vec![
                Box::new(WidthRule),
                Box::new(HeightRule),
                Box::new(DoorWidthRule),
            ],
            limits,
        }
    }

    pub fn limits(&self, product_type: ProductType) -> Option<&DimensionLimits> {
        self.limits.get(&product_type)
    }

    /// First failing rule decides. Never panics, never errors.
    pub fn validate(&self, config: &ProductConfig) -> ValidationResult {
        let Some(limits) = self.limits.get(&config.product_type()) else {
            return ValidationResult::success();
        };

        self.rules
            .iter()
            .find_map(|rule| rule.check(config, limits))
            .map(ValidationResult::failure)
            .unwrap_or_else(ValidationResult::success)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate against the standard limits.
pub fn validate(config: &ProductConfig) -> ValidationResult {
    static STANDARD: OnceLock<Validator> = OnceLock::new();
    STANDARD.get_or_init(Validator::new).validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sized(product_type: ProductType, width: u32, height: u32) -> ProductConfig {
        ProductConfig::new(product_type)
            .update(&json!({"width": width, "height": height}))
            .unwrap()
    }

    #[test]
    fn test_bifold_bounds_inclusive() {
        assert!(validate(&sized(ProductType::Bifold, 1200, 2100)).is_valid);
        assert!(validate(&sized(ProductType::Bifold, 8000, 3000)).is_valid);

        let narrow = validate(&sized(ProductType::Bifold, 1199, 2100));
        assert!(!narrow.is_valid);
        assert_eq!(narrow.reason, Some(ValidationReason::WidthBelowMinimum));
        assert!(narrow.message.unwrap().contains("1200mm"));

        let wide = validate(&sized(ProductType::Bifold, 8001, 2100));
        assert_eq!(wide.reason, Some(ValidationReason::WidthAboveMaximum));

        let tall = validate(&sized(ProductType::Bifold, 3000, 3001));
        assert_eq!(tall.reason, Some(ValidationReason::HeightAboveMaximum));
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let result = validate(&sized(ProductType::Slider, 999, 5000));
        assert_eq!(result.reason, Some(ValidationReason::WidthBelowMinimum));
    }

    #[test]
    fn test_slider_and_fixed_height_minimums() {
        let low = validate(&sized(ProductType::Slider, 3000, 799));
        assert_eq!(low.reason, Some(ValidationReason::HeightBelowMinimum));
        assert!(validate(&sized(ProductType::Slider, 10070, 800)).is_valid);

        assert!(validate(&sized(ProductType::Fixed, 300, 300)).is_valid);
        assert_eq!(
            validate(&sized(ProductType::Fixed, 300, 299)).reason,
            Some(ValidationReason::HeightBelowMinimum)
        );
        assert!(validate(&sized(ProductType::Shaped, 500, 200)).is_valid);
    }

    #[test]
    fn test_french_door_derived_width() {
        let config = ProductConfig::new(ProductType::FrenchDoor)
            .update(&json!({
                "width": 2000,
                "sidelights": {
                    "left": {"enabled": true, "width": 400},
                    "right": {"enabled": false, "width": 900}
                }
            }))
            .unwrap();
        assert!(validate(&config).is_valid);

        let squeezed = config
            .update(&json!({"sidelights": {"left": {"enabled": true, "width": 1200}}}))
            .unwrap();
        let result = validate(&squeezed);
        assert!(!result.is_valid);
        assert_eq!(result.reason, Some(ValidationReason::DoorWidthBelowMinimum));
        let message = result.message.unwrap();
        assert!(message.contains("800mm"));
        assert!(message.contains("1000mm"));
    }

    #[test]
    fn test_french_door_wide_leaf() {
        let result = validate(&sized(ProductType::FrenchDoor, 2500, 2100));
        assert_eq!(result.reason, Some(ValidationReason::DoorWidthAboveMaximum));
    }

    #[test]
    fn test_single_door_limits() {
        assert!(validate(&sized(ProductType::SingleDoor, 600, 2100)).is_valid);
        assert!(validate(&sized(ProductType::SingleDoor, 1200, 2500)).is_valid);
        assert_eq!(
            validate(&sized(ProductType::SingleDoor, 599, 2100)).reason,
            Some(ValidationReason::WidthBelowMinimum)
        );
        assert_eq!(
            validate(&sized(ProductType::SingleDoor, 1201, 2100)).reason,
            Some(ValidationReason::WidthAboveMaximum)
        );
        assert_eq!(
            validate(&sized(ProductType::SingleDoor, 900, 2501)).reason,
            Some(ValidationReason::HeightAboveMaximum)
        );
    }

    #[test]
    fn test_single_door_bounds_are_on_the_frame() {
        let with_sidelights = |width: u32, left: u32, right: u32| {
            ProductConfig::new(ProductType::SingleDoor)
                .update(&json!({
                    "width": width,
                    "sidelights": {
                        "left": {"enabled": left > 0, "width": left},
                        "right": {"enabled": right > 0, "width": right}
                    }
                }))
                .unwrap()
        };

        let wide = validate(&with_sidelights(2000, 500, 500));
        assert!(!wide.is_valid);
        assert_eq!(wide.reason, Some(ValidationReason::WidthAboveMaximum));
        assert!(wide.message.unwrap().contains("2000mm"));

        assert!(validate(&with_sidelights(700, 400, 0)).is_valid);
    }

    #[test]
    fn test_unregistered_types_fail_open() {
        for t in [ProductType::Window, ProductType::Bay, ProductType::Rooflight, ProductType::Lantern, ProductType::Custom] {
            assert!(validate(&sized(t, 1, 1)).is_valid, "{t} should be provisionally valid");
        }
    }

    #[test]
    fn test_custom_limits_injected() {
        let mut limits = BTreeMap::new();
        limits.insert(ProductType::Window, DimensionLimits { max_width: Some(2000), ..Default::default() });
        let validator = Validator::with_limits(limits);
        assert!(!validator.validate(&sized(ProductType::Window, 2001, 1000)).is_valid);
        assert!(validator.validate(&sized(ProductType::Bifold, 100, 100)).is_valid);
    }

    #[test]
    fn test_result_wire_shape() {
        let value = serde_json::to_value(ValidationResult::success()).unwrap();
        assert_eq!(value, json!({"isValid": true}));
    }
}
