//! Shop Config

use std::time::Duration;

use clap::Args;
use rusty_money::iso::{self, Currency};

use crate::{config::ConfigError, orders::FormRules};

/// Shop settings.
#[derive(Debug, Clone, Args)]
pub struct ShopConfig {
    /// WhatsApp number orders are sent to, international format
    #[arg(long, env = "WHATSAPP_NUMBER")]
    pub whatsapp_number: Option<String>,

    /// Delivery zones offered at checkout
    #[arg(
        long,
        env = "DELIVERY_ZONES",
        value_delimiter = ',',
        default_value = "Norte,Sur,Este,Oeste,Centro"
    )]
    pub delivery_zones: Vec<String>,

    /// How many days ahead a delivery can be booked
    #[arg(long, env = "ORDER_MAX_ADVANCE_DAYS", default_value_t = 30)]
    pub order_max_advance_days: u16,

    /// ISO 4217 code of the shop currency
    #[arg(long, env = "SHOP_CURRENCY", default_value = "COP")]
    pub shop_currency: String,

    /// Maximum number of gallery photos
    #[arg(long, env = "GALLERY_LIMIT", default_value_t = 50)]
    pub gallery_limit: usize,

    /// Pause before the cart is cleared after checkout, in milliseconds
    #[arg(long, env = "CHECKOUT_CLEAR_DELAY_MS", default_value_t = 2_000)]
    pub checkout_clear_delay_ms: u64,
}

impl ShopConfig {
    /// The shop currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not recognised.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.shop_currency.trim().to_ascii_uppercase();

        iso::find(&code).ok_or_else(|| ConfigError::UnknownCurrency(self.shop_currency.clone()))
    }

    /// The WhatsApp number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no number is configured.
    pub fn whatsapp_number(&self) -> Result<&str, ConfigError> {
        self.whatsapp_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
            .ok_or(ConfigError::Missing("WHATSAPP_NUMBER"))
    }

    /// Checkout form rules.
    #[must_use]
    pub fn form_rules(&self) -> FormRules {
        FormRules::new(
            self.delivery_zones
                .iter()
                .map(|zone| zone.trim())
                .filter(|zone| !zone.is_empty())
                .map(str::to_string)
                .collect(),
            self.order_max_advance_days,
        )
    }

    /// Pause before the cart is cleared after checkout.
    #[must_use]
    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.checkout_clear_delay_ms)
    }
}
