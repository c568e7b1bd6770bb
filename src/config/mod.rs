//! Configuration
//!
//! Every setting is a `clap` argument with an environment fallback, so the same values
//! can come from flags, the process environment or a `.env` file.

use clap::Args;
use thiserror::Error;

pub use crate::config::{
    cart::CartConfig,
    catalog::CatalogConfig,
    logging::{LogFormat, LoggingConfig},
    shop::ShopConfig,
    supabase::SupabaseConfig,
};

mod cart;
mod catalog;
mod logging;
mod shop;
mod supabase;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured currency is not an ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A required setting has no value.
    #[error("missing setting: {0}")]
    Missing(&'static str),
}

/// Complete application configuration.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Hosted backend settings.
    #[command(flatten)]
    pub supabase: SupabaseConfig,

    /// Shop settings.
    #[command(flatten)]
    pub shop: ShopConfig,

    /// Local cart settings.
    #[command(flatten)]
    pub cart: CartConfig,

    /// Catalog source settings.
    #[command(flatten)]
    pub catalog: CatalogConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Loads `.env` into the process environment, if present.
pub fn load_dotenv() {
    // A missing .env file is fine
    _ = dotenvy::dotenv();
}
