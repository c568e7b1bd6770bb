use std::sync::Arc;

use clap::Args;
use jiff::Zoned;
use sazon::{
    config::AppConfig,
    messaging::LogMessenger,
    orders::{CustomerOrderForm, OrderComposer, OrderSubmitter, SubmissionError},
    pricing,
};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Delivery address
    #[arg(long)]
    address: String,

    /// Delivery zone
    #[arg(long)]
    zone: String,

    /// Delivery date (YYYY-MM-DD)
    #[arg(long)]
    date: String,

    /// Delivery time
    #[arg(long)]
    time: String,

    /// Contact phone
    #[arg(long)]
    phone: Option<String>,
}

impl From<CheckoutArgs> for CustomerOrderForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            address: args.address,
            zone: args.zone,
            delivery_date: args.date,
            delivery_time: args.time,
            phone: args.phone,
        }
    }
}

pub(crate) async fn run(config: &AppConfig, args: CheckoutArgs) -> Result<(), String> {
    let currency = config.shop.currency().map_err(|error| error.to_string())?;
    let number = config
        .shop
        .whatsapp_number()
        .map_err(|error| error.to_string())?;

    let messenger = Arc::new(LogMessenger::new());
    let submitter = OrderSubmitter::new(
        OrderComposer::new(config.shop.form_rules(), currency),
        Arc::new(super::orders_repository(config)?),
        messenger,
        number,
    )
    .with_clear_delay(config.shop.clear_delay());

    let mut cart = super::open_cart(config)?;
    let mut form = CustomerOrderForm::from(args);
    let today = Zoned::now().date();

    let receipt = match submitter.submit(&mut cart, &mut form, today).await {
        Ok(receipt) => receipt,
        Err(error @ SubmissionError::Compose(_)) => {
            for message in error.messages() {
                eprintln!("- {message}");
            }
            return Err("order not submitted".to_string());
        }
        Err(error) => return Err(error.to_string()),
    };

    println!("order: {}", receipt.order.id);
    println!(
        "total: {}",
        pricing::format_amount(receipt.order.total, currency.symbol)
    );
    println!("status: {}", receipt.order.status);
    println!("whatsapp: {}", receipt.link);

    if let Some(error) = receipt.messaging_error {
        eprintln!("could not open WhatsApp ({error}); use the link above");
    }

    if !receipt.cart_cleared {
        eprintln!("the cart could not be emptied; run `sazon cart clear --yes`");
    }

    Ok(())
}
