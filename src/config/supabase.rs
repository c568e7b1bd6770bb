//! Supabase Config

use clap::Args;

/// Hosted backend settings.
#[derive(Debug, Clone, Args)]
pub struct SupabaseConfig {
    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase anonymous API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,
}
