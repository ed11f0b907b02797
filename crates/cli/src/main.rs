//! Shopfront CLI - Browse the product catalog from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # First page of the catalog
//! sf-cli list
//!
//! # Filter, sort and paginate
//! sf-cli list --category phones --sort price-desc --page 2 --page-size 5
//!
//! # Show a single product
//! sf-cli show 42
//!
//! # Search at the data source
//! sf-cli search Pro
//!
//! # List categories and brands
//! sf-cli facets
//! ```
//!
//! # Commands
//!
//! - `list` - Filtered, sorted, paginated product listing
//! - `show` - Product detail lookup
//! - `search` - Data-source keyword search
//! - `facets` - Distinct categories and brands
//!
//! See [`config`] for the environment variables that select the data source.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::CliError;
use commands::list::ListArgs;
use config::CatalogConfig;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront catalog browser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with filters, sorting and pagination
    List(ListArgs),
    /// Show a single product
    Show {
        /// Product ID
        id: ProductId,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Search products at the data source
    Search {
        /// Keyword to look for in names and descriptions
        keyword: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the categories and brands in the catalog
    Facets {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CatalogConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Log to stderr so stdout carries only command output.
fn init_tracing(with_sentry: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cli=info,shopfront_catalog=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(with_sentry.then(|| sentry_tracing::layer().event_filter(sentry_event_filter)))
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match CatalogConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing(sentry_guard.is_some());
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CatalogConfig) -> Result<(), CliError> {
    match cli.command {
        Commands::List(args) => commands::list::run(config, &args).await,
        Commands::Show { id, json } => commands::show::run(config, id, json).await,
        Commands::Search { keyword, json } => commands::search::run(config, &keyword, json).await,
        Commands::Facets { json } => commands::facets::run(config, json).await,
    }
}
