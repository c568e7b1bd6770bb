//! Catalog Config

use std::path::PathBuf;

use clap::Args;

/// Catalog source settings.
#[derive(Debug, Clone, Args)]
pub struct CatalogConfig {
    /// YAML catalog to use instead of Supabase
    #[arg(long, env = "CATALOG_FIXTURE")]
    pub catalog_fixture: Option<PathBuf>,
}
