//! AluQuote CLI - Bridge interface for the storefront
//!
//! Commands: defaults, panel-options, validate, price, quote, show, status
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure, 1 on any other error

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use aluquote_core::{
    currency::format_gbp, max_panels, panel_options, JsonFileQuoteStore, LayoutRegistry,
    PipelineError, PriceTable, ProductConfig, ProductType, QuotePipeline, QuoteStatus, QuoteStore,
};

#[derive(Parser)]
#[command(name = "aluquote-cli")]
#[command(about = "AluQuote CLI - configure, validate, price and quote aluminium products")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Price table JSON (built-in table when omitted)
    #[arg(long, env = "ALUQUOTE_PRICE_TABLE")]
    price_table: Option<PathBuf>,

    /// Directory of extra window layout JSON files
    #[arg(long, env = "ALUQUOTE_LAYOUTS")]
    layouts: Option<PathBuf>,

    /// Directory holding saved quotes
    #[arg(short, long, env = "ALUQUOTE_STORE", default_value = "quotes")]
    store: PathBuf,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Default configuration for a product type
    Defaults {
        /// Product type, e.g. bifold, french-door, rooflight
        product: String,
    },

    /// Selectable bi-fold panel counts for a width
    PanelOptions {
        #[arg(short, long)]
        width: u32,
    },

    /// Validate a configuration
    Validate {
        /// JSON payload (ProductConfig)
        #[arg(short, long)]
        payload: String,
    },

    /// Price a configuration
    Price {
        /// JSON payload (ProductConfig)
        #[arg(short, long)]
        payload: String,
    },

    /// Validate, price and save a configuration as a quote
    Quote {
        /// JSON payload (ProductConfig)
        #[arg(short, long)]
        payload: String,

        /// Existing quote to update instead of creating a new one
        #[arg(short, long)]
        quote_id: Option<String>,
    },

    /// Print a saved quote
    Show {
        quote_id: String,
    },

    /// Move a saved quote to another status
    Status {
        quote_id: String,
        /// draft, pending, ordered or archived
        status: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to serialize output: {}"}}"#, e);
            false
        }
    }
}

fn emit<T: Serialize>(value: &T) -> ExitCode {
    if print_json(value) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn fail(error: impl std::fmt::Display) -> ExitCode {
    print_json(&serde_json::json!({"success": false, "error": error.to_string()}));
    ExitCode::FAILURE
}

fn parse_config(payload: &str) -> Result<ProductConfig, String> {
    serde_json::from_str(payload).map_err(|e| format!("Invalid payload: {}", e))
}

fn build_pipeline(cli: &Cli) -> Result<QuotePipeline, PipelineError> {
    let table = match &cli.price_table {
        Some(path) => PriceTable::load(path)?,
        None => PriceTable::default(),
    };
    let layouts = match &cli.layouts {
        Some(dir) => LayoutRegistry::load_from_dir(dir)?,
        None => LayoutRegistry::builtin(),
    };
    QuotePipeline::new(table, layouts)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pipeline = match build_pipeline(&cli) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    match &cli.command {
        Commands::Defaults { product } => match product.parse::<ProductType>() {
            Ok(product_type) => emit(&pipeline.create(product_type)),
            Err(e) => fail(e),
        },

        Commands::PanelOptions { width } => emit(&serde_json::json!({
            "width": width,
            "maxPanels": max_panels(*width),
            "options": panel_options(max_panels(*width)),
        })),

        Commands::Validate { payload } => {
            let config = match parse_config(payload) {
                Ok(c) => c,
                Err(e) => return fail(e),
            };
            let result = pipeline.validate(&config);
            let issues: Vec<String> = pipeline.check(&config).iter().map(|i| i.to_string()).collect();
            if !print_json(&serde_json::json!({"validation": result, "consistencyIssues": issues})) {
                return ExitCode::FAILURE;
            }
            if result.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Price { payload } => {
            let config = match parse_config(payload) {
                Ok(c) => c,
                Err(e) => return fail(e),
            };
            match pipeline.price(&config) {
                Some(breakdown) => emit(&serde_json::json!({
                    "available": true,
                    "display": format_gbp(breakdown.total),
                    "breakdown": breakdown,
                })),
                None => emit(&serde_json::json!({"available": false})),
            }
        }

        Commands::Quote { payload, quote_id } => {
            let config = match parse_config(payload) {
                Ok(c) => c,
                Err(e) => return fail(e),
            };
            let store = match JsonFileQuoteStore::open(&cli.store) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };
            match pipeline.save_quote(&store, &config, quote_id.as_deref()) {
                Ok(record) => emit(&serde_json::json!({
                    "success": true,
                    "display": format_gbp(record.payload.total_price),
                    "quote": record,
                })),
                Err(e @ PipelineError::ValidationFailed(_)) => {
                    print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
                    ExitCode::from(2)
                }
                Err(e) => fail(e),
            }
        }

        Commands::Show { quote_id } => {
            match JsonFileQuoteStore::open(&cli.store).and_then(|s| s.load(quote_id)) {
                Ok(record) => emit(&record),
                Err(e) => fail(e),
            }
        }

        Commands::Status { quote_id, status } => {
            let status = match status.parse::<QuoteStatus>() {
                Ok(s) => s,
                Err(e) => return fail(e),
            };
            let store = match JsonFileQuoteStore::open(&cli.store) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };
            match pipeline.set_status(&store, quote_id, status) {
                Ok(record) => emit(&record),
                Err(e) => fail(e),
            }
        }
    }
}
