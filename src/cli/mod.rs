use clap::{Parser, Subcommand};
use sazon::{
    cart::{CartStore, FileSnapshotStore},
    catalog::{Catalog, FixtureCatalog, SupabaseCatalog},
    config::AppConfig,
    observability,
    orders::SupabaseOrdersRepository,
    supabase::SupabaseClient,
};

mod cart;
mod checkout;
mod menu;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "sazon", about = "Sazón ordering CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the menu and the combos
    Menu,
    /// List the gallery photos
    Gallery,
    /// Show or change the cart
    Cart(cart::CartCommand),
    /// Submit the cart as an order
    Checkout(checkout::CheckoutArgs),
    /// Look up and manage stored orders
    Orders(orders::OrdersCommand),
    /// Check that the orders table is reachable
    Ping,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging).map_err(|error| error.to_string())?;

        match self.command {
            Commands::Menu => menu::run_menu(&self.config).await,
            Commands::Gallery => menu::run_gallery(&self.config).await,
            Commands::Cart(command) => cart::run(&self.config, command).await,
            Commands::Checkout(args) => checkout::run(&self.config, args).await,
            Commands::Orders(command) => orders::run(&self.config, command).await,
            Commands::Ping => orders::ping(&self.config).await,
        }
    }
}

fn catalog(config: &AppConfig) -> Result<Box<dyn Catalog>, String> {
    if let Some(path) = &config.catalog.catalog_fixture {
        let catalog = FixtureCatalog::from_path(path)
            .map_err(|error| format!("failed to load {}: {error}", path.display()))?;

        return Ok(Box::new(catalog));
    }

    Ok(Box::new(SupabaseCatalog::new(supabase_client(config)?)))
}

fn orders_repository(config: &AppConfig) -> Result<SupabaseOrdersRepository, String> {
    Ok(SupabaseOrdersRepository::new(supabase_client(config)?))
}

fn supabase_client(config: &AppConfig) -> Result<SupabaseClient, String> {
    SupabaseClient::from_config(&config.supabase).map_err(|error| error.to_string())
}

fn open_cart(config: &AppConfig) -> Result<CartStore<FileSnapshotStore>, String> {
    CartStore::load(config.cart.snapshot_store())
        .map_err(|error| format!("failed to load the cart: {error}"))
}
