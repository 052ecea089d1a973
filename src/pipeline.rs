//! Quote Pipeline - Single Entry Point
//!
//! create -> update -> validate -> price -> assemble -> save.
//! Saving ALWAYS validates first; an invalid configuration never reaches a store.

use thiserror::Error;
use tracing::{debug, warn};

use crate::calculator::{PriceBreakdown, PriceCalculator};
use crate::config::{ConfigError, ConsistencyIssue, ProductConfig, ProductType};
use crate::layouts::{LayoutError, LayoutRegistry};
use crate::pricing::{PriceTable, PricingError};
use crate::quote::{assemble, QuotePayload, QuoteStatus};
use crate::store::{QuoteRecord, QuoteStore, SaveGuard, StoreError};
use crate::validation::{ValidationResult, Validator};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("A save for {0} is already in progress")]
    SaveInProgress(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The quote pipeline - every configurator operation goes through here
pub struct QuotePipeline {
    validator: Validator,
    calculator: PriceCalculator,
    saves: SaveGuard,
}

impl QuotePipeline {
    /// Refuses a price table written for a newer engine.
    pub fn new(table: PriceTable, layouts: LayoutRegistry) -> Result<Self, PipelineError> {
        table.check_engine_version()?;
        Ok(Self {
            validator: Validator::new(),
            calculator: PriceCalculator::new(table, layouts),
            saves: SaveGuard::new(),
        })
    }

    pub fn with_validator(self, validator: Validator) -> Self {
        Self { validator, ..self }
    }

    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }

    pub fn save_guard(&self) -> &SaveGuard {
        &self.saves
    }

    /// Defaults for a newly selected product type.
    pub fn create(&self, product_type: ProductType) -> ProductConfig {
        ProductConfig::new(product_type)
    }

    pub fn update(&self, config: &ProductConfig, patch: &serde_json::Value) -> Result<ProductConfig, PipelineError> {
        Ok(config.update(patch)?)
    }

    pub fn validate(&self, config: &ProductConfig) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let result = self.validator.validate(config);
        if let Some(message) = &result.message {
            debug!(config = %config.id(), product = %config.product_type(), %message, "configuration invalid");
        }
        result
    }

    pub fn price(&self, config: &ProductConfig) -> Option<PriceBreakdown> {
        let breakdown = self.calculator.price(config);
        if breakdown.is_none() {
            debug!(config = %config.id(), product = %config.product_type(), "no price preview available");
        }
        breakdown
    }

    pub fn check(&self, config: &ProductConfig) -> Vec<ConsistencyIssue> {
        config.consistency_issues()
    }

    /// Validate, price and package a configuration.
    ///
    /// This is the ONLY way a payload is built for saving.
    pub fn assemble(&self, config: &ProductConfig) -> Result<QuotePayload, PipelineError> {
        let validation = self.validate(config);
        if !validation.is_valid {
            return Err(PipelineError::ValidationFailed(
                validation.message.unwrap_or_else(|| "configuration is not sellable".to_string()),
            ));
        }

        for issue in self.check(config) {
            warn!(config = %config.id(), %issue, "configuration is internally inconsistent");
        }

        Ok(assemble(config, self.price(config).as_ref()))
    }

    /// Save a new quote, or replace the payload of `existing`.
    ///
    /// A second save for the same quote while one is in flight is rejected,
    /// not queued.
    pub fn save_quote(
        &self,
        store: &dyn QuoteStore,
        config: &ProductConfig,
        existing: Option<&str>,
    ) -> Result<QuoteRecord, PipelineError> {
        let key = existing.unwrap_or(config.id());
        let _ticket = self
            .saves
            .try_begin(key)
            .ok_or_else(|| PipelineError::SaveInProgress(key.to_string()))?;

        let payload = self.assemble(config)?;
        let record = match existing {
            Some(id) => store.update(id, payload)?,
            None => store.save(payload)?,
        };
        Ok(record)
    }

    pub fn set_status(
        &self,
        store: &dyn QuoteStore,
        id: &str,
        status: QuoteStatus,
    ) -> Result<QuoteRecord, PipelineError> {
        Ok(store.set_status(id, status)?)
    }
}

impl Default for QuotePipeline {
    fn default() -> Self {
        Self {
            validator: Validator::default(),
            calculator: PriceCalculator::default(),
            saves: SaveGuard::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryQuoteStore;
    use serde_json::json;

    #[test]
    fn test_invalid_configuration_never_saved() {
        let pipeline = QuotePipeline::default();
        let store = MemoryQuoteStore::new();
        let config = pipeline
            .update(&pipeline.create(ProductType::Bifold), &json!({"width": 900}))
            .unwrap();

        let err = pipeline.save_quote(&store, &config, None).unwrap_err();
        assert!(err.to_string().contains("Validation failed"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_update() {
        let pipeline = QuotePipeline::default();
        let store = MemoryQuoteStore::new();
        let config = pipeline.create(ProductType::Bifold);
        let saved = pipeline.save_quote(&store, &config, None).unwrap();
        assert_eq!(saved.status, QuoteStatus::Draft);

        let wider = pipeline.update(&config, &json!({"width": 4000})).unwrap();
        let updated = pipeline.save_quote(&store, &wider, Some(&saved.id)).unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.payload.configuration.width(), 4000);
        assert!(updated.payload.net_price > saved.payload.net_price);
    }

    #[test]
    fn test_concurrent_save_rejected() {
        let pipeline = QuotePipeline::default();
        let store = MemoryQuoteStore::new();
        let config = pipeline.create(ProductType::Slider);

        let ticket = pipeline.save_guard().try_begin(config.id()).unwrap();
        let err = pipeline.save_quote(&store, &config, None).unwrap_err();
        assert!(matches!(err, PipelineError::SaveInProgress(_)));
        drop(ticket);

        assert!(pipeline.save_quote(&store, &config, None).is_ok());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_unpriced_product_saves_empty_breakdown() {
        let pipeline = QuotePipeline::default();
        let store = MemoryQuoteStore::new();
        let config = pipeline.create(ProductType::Custom);
        assert!(pipeline.price(&config).is_none());

        let saved = pipeline.save_quote(&store, &config, None).unwrap();
        assert!(saved.payload.price_breakdown.line_items.is_empty());
        assert_eq!(saved.payload.total_price, 0.0);
    }

    #[test]
    fn test_nonsense_split_still_saves() {
        let pipeline = QuotePipeline::default();
        let store = MemoryQuoteStore::new();
        let config = pipeline
            .update(&pipeline.create(ProductType::Bifold), &json!({"configuration": "4294967295+1"}))
            .unwrap();

        assert_eq!(pipeline.check(&config).len(), 1);
        let saved = pipeline.save_quote(&store, &config, None).unwrap();
        assert_eq!(store.load(&saved.id).unwrap().payload.configuration, config);
    }

    #[test]
    fn test_rejects_table_for_newer_engine() {
        let table = PriceTable { engine_min_version: "42.0.0".into(), ..PriceTable::default() };
        let result = QuotePipeline::new(table, LayoutRegistry::builtin());
        assert!(matches!(
            result,
            Err(PipelineError::Pricing(PricingError::EngineVersionMismatch { .. }))
        ));
    }

    #[test]
    fn test_status_changes_go_through_store() {
        let pipeline = QuotePipeline::default();
        let store = MemoryQuoteStore::new();
        let saved = pipeline.save_quote(&store, &pipeline.create(ProductType::Fixed), None).unwrap();
        let pending = pipeline.set_status(&store, &saved.id, QuoteStatus::Pending).unwrap();
        assert_eq!(pending.status, QuoteStatus::Pending);
        assert!(pipeline.set_status(&store, &saved.id, QuoteStatus::Draft).is_err());
    }
}
