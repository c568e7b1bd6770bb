//! Pricing

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};

use crate::cart::CartLine;

/// Returns the price of a cart line: unit price times quantity.
pub fn line_total(line: &CartLine, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_decimal(line.subtotal(), currency)
}

/// Calculates the total price of a list of cart lines.
///
/// An empty list totals to zero in the given currency.
///
/// # Errors
///
/// Returns a [`MoneyError`] if money arithmetic fails.
pub fn cart_total(
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, MoneyError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            acc.add(line_total(line, currency))
        })
}

/// Formats money the way the shop displays prices: `$30.000`, `$1.234,5`.
pub fn format_money(money: &Money<'_, Currency>) -> String {
    format_amount(*money.amount(), money.currency().symbol)
}

/// Formats an amount with Colombian digit grouping.
///
/// Thousands are separated with `.`, decimals with `,`, and at most two fractional
/// digits are shown (none for whole amounts).
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let whole = rounded.abs().trunc();
    let fraction = (rounded.abs() - whole).normalize();

    let mut out = String::new();

    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }

    out.push_str(symbol);
    out.push_str(&group_thousands(&whole.to_string()));

    if !fraction.is_zero()
        && let Some(digits) = fraction.to_string().strip_prefix("0.")
    {
        out.push(',');
        out.push_str(digits);
    }

    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push('.');
        }

        grouped.push(ch);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::COP;
    use testresult::TestResult;

    use crate::cart::{CartLine, LineKind};

    use super::*;

    fn line(id: u64, price: i64, quantity: u32) -> CartLine {
        CartLine::new(
            id,
            format!("Item {id}"),
            Decimal::from(price),
            None,
            quantity,
            LineKind::Regular,
        )
    }

    #[test]
    fn line_total_multiplies_quantity() {
        let total = line_total(&line(7, 15_000, 2), COP);

        assert_eq!(total, Money::from_decimal(Decimal::from(30_000), COP));
    }

    #[test]
    fn cart_total_sums_lines() -> TestResult {
        let lines = [line(1, 15_000, 2), line(2, 8_500, 1)];

        let total = cart_total(&lines, COP)?;

        assert_eq!(*total.amount(), Decimal::from(38_500));

        Ok(())
    }

    #[test]
    fn cart_total_empty_is_zero() -> TestResult {
        let total = cart_total(&[], COP)?;

        assert!(total.amount().is_zero());

        Ok(())
    }

    #[test]
    fn formats_whole_amounts_without_decimals() {
        assert_eq!(format_amount(Decimal::from(30_000), "$"), "$30.000");
        assert_eq!(format_amount(Decimal::from(1_234_567), "$"), "$1.234.567");
        assert_eq!(format_amount(Decimal::from(950), "$"), "$950");
        assert_eq!(format_amount(Decimal::ZERO, "$"), "$0");
    }

    #[test]
    fn formats_fractional_amounts_with_comma() {
        assert_eq!(format_amount(Decimal::new(12_345, 1), "$"), "$1.234,5");
        assert_eq!(format_amount(Decimal::new(1_999, 3), "$"), "$2");
        assert_eq!(format_amount(Decimal::new(105, 2), "$"), "$1,05");
    }

    #[test]
    fn format_money_uses_currency_symbol() {
        let money = Money::from_decimal(Decimal::from(45_000), COP);

        assert_eq!(format_money(&money), "$45.000");
    }
}
