//! AluQuote Core - Configurator Pricing Engine
//!
//! # Guarantees
//! 1. Configurations Are Data
//! 2. Validation Never Throws
//! 3. Pricing Is Deterministic
//! 4. No Calculator Means No Price, Not Zero
//! 5. Quotes Snapshot, Never Reference
//! 6. Saving Always Validates

pub mod config;
pub mod layouts;
pub mod validation;
pub mod pricing;
pub mod calculator;
pub mod quote;
pub mod store;
pub mod hashing;
pub mod currency;
pub mod pipeline;

pub use config::{
    create_default_config, max_panels, panel_options, update_config, ConfigError,
    ConsistencyIssue, ProductConfig, ProductType,
};
pub use layouts::{LayoutRegistry, Pane, PaneCounts, WindowLayout};
pub use validation::{validate, ValidationReason, ValidationResult, Validator};
pub use pricing::{PriceTable, PricingError};
pub use calculator::{price, LineItem, PriceBreakdown, PriceCalculator};
pub use quote::{assemble, Financials, QuoteItem, QuotePayload, QuoteStatus};
pub use store::{JsonFileQuoteStore, MemoryQuoteStore, QuoteRecord, QuoteStore, SaveGuard, StoreError};
pub use hashing::{canonical_json, configuration_hash};
pub use currency::format_gbp;
pub use pipeline::{PipelineError, QuotePipeline};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
