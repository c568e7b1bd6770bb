use sazon::{
    catalog::{Combo, MenuItem, group_by_category},
    config::AppConfig,
    pricing,
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

pub(crate) async fn run_menu(config: &AppConfig) -> Result<(), String> {
    let catalog = super::catalog(config)?;
    let currency = config.shop.currency().map_err(|error| error.to_string())?;

    let menu = catalog
        .menu()
        .await
        .map_err(|error| format!("failed to load the menu: {error}"))?;
    let combos = catalog
        .combos()
        .await
        .map_err(|error| format!("failed to load the combos: {error}"))?;

    for (category, items) in group_by_category(&menu) {
        println!("\n{category}");
        println!("{}", menu_table(&items, currency.symbol));
    }

    if !combos.is_empty() {
        println!("\ncombos");
        println!("{}", combo_table(&combos, currency.symbol));
    }

    Ok(())
}

pub(crate) async fn run_gallery(config: &AppConfig) -> Result<(), String> {
    let catalog = super::catalog(config)?;

    let images = catalog
        .gallery(config.shop.gallery_limit)
        .await
        .map_err(|error| format!("failed to load the gallery: {error}"))?;

    if images.is_empty() {
        println!("no photos yet");
        return Ok(());
    }

    for image in images {
        println!("{}  {}", image.name, image.url);
    }

    Ok(())
}

fn menu_table(items: &[&MenuItem], symbol: &str) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Dish", "Price"]);

    for item in items {
        let name = match &item.description {
            Some(description) => format!("{}\n{description}", item.name),
            None => item.name.clone(),
        };

        builder.push_record([
            item.id.to_string(),
            name,
            pricing::format_amount(item.price, symbol),
        ]);
    }

    styled(builder, 2)
}

fn combo_table(combos: &[Combo], symbol: &str) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Combo", "Includes", "Quantity", "Price"]);

    for combo in combos {
        let name = match combo.promotion_badge() {
            Some(badge) => format!("{}\n{badge}", combo.name),
            None => combo.name.clone(),
        };

        let quantity = match (combo.min_quantity.unwrap_or(1), combo.max_quantity) {
            (min, Some(max)) => format!("{min}-{max}"),
            (min, None) => format!("{min}+"),
        };

        builder.push_record([
            combo.id.to_string(),
            name,
            combo.contents().join("\n"),
            quantity,
            pricing::format_amount(combo.price, symbol),
        ]);
    }

    styled(builder, 4)
}

fn styled(builder: Builder, price_column: usize) -> String {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(price_column..=price_column), Alignment::right());

    table.to_string()
}
