use clap::{Args, Subcommand};
use sazon::{
    config::AppConfig,
    orders::{OrderStatus, OrdersRepository, SavedOrder, order_stats},
    pricing,
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Show one order
    Get(GetOrderArgs),
    /// Set the status of an order
    Status(StatusArgs),
    /// List a customer's orders, newest first
    List(CustomerArgs),
    /// Summarise the shop's orders, or one customer's with `--email`
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
struct GetOrderArgs {
    /// Order id
    id: Uuid,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Order id
    id: Uuid,

    /// New status, e.g. `en camino`
    status: String,
}

#[derive(Debug, Args)]
struct CustomerArgs {
    /// Customer email
    #[arg(long)]
    email: String,
}

#[derive(Debug, Args)]
struct StatsArgs {
    /// Only count orders placed with this email
    #[arg(long)]
    email: Option<String>,
}

pub(crate) async fn run(config: &AppConfig, command: OrdersCommand) -> Result<(), String> {
    let repository = super::orders_repository(config)?;
    let symbol = config
        .shop
        .currency()
        .map_err(|error| error.to_string())?
        .symbol;

    match command.command {
        OrdersSubcommand::Get(args) => {
            let order = repository
                .get(args.id)
                .await
                .map_err(|error| format!("failed to get order: {error}"))?;

            print_order(&order, symbol);
        }
        OrdersSubcommand::Status(args) => {
            let order = repository
                .update_status(args.id, &OrderStatus::from(args.status))
                .await
                .map_err(|error| format!("failed to update order: {error}"))?;

            print_order(&order, symbol);
        }
        OrdersSubcommand::List(args) => {
            let orders = repository
                .for_customer(&args.email)
                .await
                .map_err(|error| format!("failed to list orders: {error}"))?;

            if orders.is_empty() {
                println!("no orders found for {}", args.email);
            }

            for order in &orders {
                print_order(order, symbol);
            }
        }
        OrdersSubcommand::Stats(args) => {
            let stats = order_stats(&repository, args.email.as_deref())
                .await
                .map_err(|error| format!("failed to summarise orders: {error}"))?;

            println!("orders: {}", stats.count);
            println!(
                "sales: {}",
                pricing::format_amount(stats.sales_total, symbol)
            );

            for (status, count) in &stats.by_status {
                println!("{status}: {count}");
            }
        }
    }

    Ok(())
}

pub(crate) async fn ping(config: &AppConfig) -> Result<(), String> {
    super::orders_repository(config)?
        .ping()
        .await
        .map_err(|error| format!("orders table unreachable: {error}"))?;

    println!("ok");

    Ok(())
}

fn print_order(order: &SavedOrder, symbol: &str) {
    println!("order_id: {}", order.id);
    println!(
        "created_at: {}",
        order
            .created_at
            .map_or_else(|| "unknown".to_string(), |created_at| created_at.to_string())
    );
    println!("status: {}", order.status);
    println!("customer: {} <{}>", order.customer.name, order.customer.email);
    println!(
        "delivery: {} {} at {}, {}",
        order.customer.delivery_date,
        order.customer.delivery_time,
        order.customer.address,
        order.customer.zone
    );
    println!("total: {}", pricing::format_amount(order.total, symbol));

    for line in order.detail.lines() {
        println!("  {line}");
    }

    println!();
}
