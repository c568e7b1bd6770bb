//! Receipt
//!
//! Terminal rendering of the cart.

use std::io;

use rusty_money::{MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartLine, LineKind},
    pricing,
};

/// Errors that can occur when rendering the cart.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Writing the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes the cart as a table followed by its total and unit count.
///
/// # Errors
///
/// Returns an error if the total cannot be computed or the output cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    if lines.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Item", "Qty", "Unit", "Line total"]);

    for (idx, line) in lines.iter().enumerate() {
        builder.push_record([
            format!("{}", idx + 1),
            item_label(line),
            line.quantity().to_string(),
            pricing::format_amount(line.unit_price(), currency.symbol),
            pricing::format_money(&pricing::line_total(line, currency)),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    let total = pricing::cart_total(lines, currency)?;
    let units: u64 = lines.iter().map(|line| u64::from(line.quantity())).sum();

    writeln!(out, "{table}")?;
    writeln!(out, " Total: {}", pricing::format_money(&total))?;
    writeln!(out, " Items: {units}")?;

    Ok(())
}

fn item_label(line: &CartLine) -> String {
    match line.kind() {
        LineKind::Regular => line.name().to_string(),
        LineKind::Combo(bounds) => match bounds.max_quantity() {
            Some(max) => format!(
                "{} (combo, {}-{max})",
                line.name(),
                bounds.min_quantity()
            ),
            None => format!("{} (combo, min {})", line.name(), bounds.min_quantity()),
        },
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::COP;
    use testresult::TestResult;

    use crate::cart::ComboBounds;

    use super::*;

    #[test]
    fn empty_cart_says_so() -> TestResult {
        let mut out = Vec::new();

        write_cart(&mut out, &[], COP)?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty\n");

        Ok(())
    }

    #[test]
    fn cart_table_lists_lines_and_totals() -> TestResult {
        let lines = [
            CartLine::new(
                7,
                "Arroz",
                Decimal::from(15_000),
                None,
                2,
                LineKind::Regular,
            ),
            CartLine::new(
                20,
                "Combo Familiar",
                Decimal::from(42_000),
                None,
                3,
                LineKind::Combo(ComboBounds::new(3, Some(5))?),
            ),
        ];

        let mut out = Vec::new();
        write_cart(&mut out, &lines, COP)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Line total"));
        assert!(output.contains("Arroz"));
        assert!(output.contains("Combo Familiar (combo, 3-5)"));
        assert!(output.contains("$30.000"));
        assert!(output.contains("$126.000"));
        assert!(output.contains(" Total: $156.000"));
        assert!(output.contains(" Items: 5"));

        Ok(())
    }
}
