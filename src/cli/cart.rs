use std::io;

use clap::{Args, Subcommand};
use sazon::{
    cart::{CartLine, CartStore, CartUpdate, Confirmation, FileSnapshotStore, ItemId},
    catalog,
    config::AppConfig,
    receipt,
    reconciler::{BadgeState, ControlState, ControlSurface, Reconciler},
};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: Option<CartSubcommand>,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,
    /// Add a dish or combo
    Add(ItemArgs),
    /// Add one unit to a line
    Inc(ItemArgs),
    /// Take one unit from a line
    Dec(ConfirmItemArgs),
    /// Remove a line
    Remove(ItemArgs),
    /// Empty the cart
    Clear(ConfirmArgs),
}

#[derive(Debug, Args)]
struct ItemArgs {
    /// Dish or combo id
    id: ItemId,
}

#[derive(Debug, Args)]
struct ConfirmItemArgs {
    /// Dish or combo id
    id: ItemId,

    /// Remove the line if it would drop below its minimum
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct ConfirmArgs {
    /// Skip the confirmation
    #[arg(long)]
    yes: bool,
}

/// Prints the state of the item controls after each change.
struct TerminalSurface;

impl ControlSurface for TerminalSurface {
    fn show_controls(&mut self, id: ItemId, state: ControlState) {
        if state.quantity_visible {
            println!("item {id}: [✕] [-] {} [+]", state.quantity);
        } else if state.add_visible {
            println!("item {id}: [Add to cart]");
        }
    }

    fn show_badge(&mut self, badge: BadgeState) {
        if badge.visible {
            println!("cart: {} item(s)", badge.count);
        } else {
            println!("cart: empty");
        }
    }
}

pub(crate) async fn run(config: &AppConfig, command: CartCommand) -> Result<(), String> {
    let mut cart = super::open_cart(config)?;
    let rendered: Vec<ItemId> = cart.lines().iter().map(CartLine::id).collect();

    let update = match command.command.unwrap_or(CartSubcommand::Show) {
        CartSubcommand::Show => return show(config, &cart),
        CartSubcommand::Add(args) => {
            let catalog = super::catalog(config)?;
            let item = catalog::find_purchasable(catalog.as_ref(), args.id)
                .await
                .map_err(|error| error.to_string())?
                .ok_or_else(|| format!("nothing on the menu has id {}", args.id))?;

            cart.add_item(&item)
        }
        CartSubcommand::Inc(args) => cart.increment(args.id),
        CartSubcommand::Dec(args) => cart.decrement(args.id, Confirmation::from(args.yes)),
        CartSubcommand::Remove(args) => cart.remove_item(args.id),
        CartSubcommand::Clear(args) => cart.clear(Confirmation::from(args.yes)),
    }
    .map_err(|error| format!("failed to update the cart: {error}"))?;

    report(&update);

    let mut reconciler = Reconciler::new(TerminalSurface);
    reconciler.register(rendered);
    reconciler.apply(&cart, &update);

    show(config, &cart)
}

fn report(update: &CartUpdate) {
    match update {
        CartUpdate::Added { id, quantity } => println!("added item {id} (quantity {quantity})"),
        CartUpdate::Updated { id, quantity } => println!("item {id} now has quantity {quantity}"),
        CartUpdate::Removed { id } => println!("removed item {id}"),
        CartUpdate::Cleared { ids } => println!("removed {} line(s)", ids.len()),
        CartUpdate::Rejected { violation } => eprintln!("not changed: {violation}"),
        CartUpdate::NeedsConfirmation { id: Some(id) } => eprintln!(
            "item {id} would drop below its minimum; run again with --yes to remove it"
        ),
        CartUpdate::NeedsConfirmation { id: None } => {
            eprintln!("run again with --yes to empty the cart");
        }
        CartUpdate::Unchanged => println!("nothing to change"),
    }
}

fn show(config: &AppConfig, cart: &CartStore<FileSnapshotStore>) -> Result<(), String> {
    let currency = config.shop.currency().map_err(|error| error.to_string())?;

    receipt::write_cart(io::stdout().lock(), cart.lines(), currency)
        .map_err(|error| error.to_string())
}
