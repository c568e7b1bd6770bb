//! Sazón
//!
//! Sazón is the ordering core of a restaurant website: a persisted shopping cart with
//! per-line quantity rules, a headless projection of the cart onto on-screen controls,
//! and the composition and submission of orders to a hosted database and a WhatsApp
//! conversation.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod messaging;
pub mod observability;
pub mod orders;
pub mod policy;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod reconciler;
pub mod supabase;
