//! Order composer
//!
//! Builds the stored order and the WhatsApp message from the cart lines and the form.
//! The message depends only on the order's own line order, so identical inputs produce
//! byte-identical text.

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::CartLine,
    orders::{
        CustomerOrderForm, FieldError, FormRules, ORDER_SOURCE, OrderLine, OrderRecord,
        OrderStatus,
    },
    policy::{self, Violations},
    pricing,
};

const MESSAGE_HEADER: &str = "🍽️ *MI PEDIDO*";
const MESSAGE_FOOTER: &str = "¡Gracias por tu pedido! 😊";

/// Reasons an order cannot be built.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Nothing to order.
    #[error("the cart is empty")]
    EmptyCart,

    /// One or more form fields failed their rule.
    #[error("{} form field(s) are invalid", .0.len())]
    InvalidForm(Vec<FieldError>),

    /// One or more lines break their quantity bounds.
    #[error("{} cart line(s) break their quantity rules", .0.len())]
    PolicyViolation(Violations),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl ComposeError {
    /// Human-readable messages to show the customer.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::EmptyCart => vec!["Your cart is empty".to_string()],
            Self::InvalidForm(errors) => errors.iter().map(ToString::to_string).collect(),
            Self::PolicyViolation(violations) => {
                violations.iter().map(ToString::to_string).collect()
            }
            Self::Money(error) => vec![error.to_string()],
        }
    }
}

/// Builds order records and messages.
#[derive(Debug, Clone)]
pub struct OrderComposer {
    rules: FormRules,
    currency: &'static Currency,
}

impl OrderComposer {
    /// Creates a composer checking forms against `rules` and pricing in `currency`.
    pub fn new(rules: FormRules, currency: &'static Currency) -> Self {
        Self { rules, currency }
    }

    /// The form rules in use.
    pub fn rules(&self) -> &FormRules {
        &self.rules
    }

    /// The shop currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Builds the record to store for `lines` and `form`.
    ///
    /// Checks run in a fixed order: the cart must not be empty, then the form must be
    /// valid, then every line must be within its quantity bounds.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`ComposeError`].
    pub fn build_order_record(
        &self,
        lines: &[CartLine],
        form: &CustomerOrderForm,
        today: Date,
    ) -> Result<OrderRecord, ComposeError> {
        if lines.is_empty() {
            return Err(ComposeError::EmptyCart);
        }

        let customer = self
            .rules
            .validate(form, today)
            .map_err(ComposeError::InvalidForm)?;

        let violations = policy::validate(lines);

        if !violations.is_empty() {
            return Err(ComposeError::PolicyViolation(violations));
        }

        let total = pricing::cart_total(lines, self.currency)?;

        Ok(OrderRecord {
            customer,
            lines: lines.iter().map(OrderLine::from).collect(),
            total: *total.amount(),
            status: OrderStatus::Pending,
            source: ORDER_SOURCE.to_string(),
        })
    }

    /// Composes the WhatsApp message for `record`.
    pub fn build_message(&self, record: &OrderRecord) -> String {
        let customer = &record.customer;
        let mut message = String::new();

        message.push_str(MESSAGE_HEADER);
        message.push_str("\n\n");

        message.push_str(&format!("👤 *Cliente:* {}\n", customer.name));
        message.push_str(&format!("📧 *Correo:* {}\n", customer.email));
        message.push_str(&format!("📍 *Dirección:* {}\n", customer.address));
        message.push_str(&format!("🗺️ *Zona:* {}\n", customer.zone));
        message.push_str(&format!("📅 *Fecha de entrega:* {}\n", customer.delivery_date));
        message.push_str(&format!("🕐 *Hora de entrega:* {}\n", customer.delivery_time));

        if let Some(phone) = &customer.phone {
            message.push_str(&format!("📞 *Teléfono:* {phone}\n"));
        }

        message.push('\n');

        for line in &record.lines {
            message.push_str(&format!("• {}x {}\n", line.quantity, line.name));
            message.push_str(&format!(
                "  {} c/u = {}\n\n",
                self.format(line.unit_price),
                self.format(line.line_total)
            ));
        }

        message.push_str(&format!("💰 *TOTAL: {}*\n\n", self.format(record.total)));
        message.push_str(MESSAGE_FOOTER);

        message
    }

    fn format(&self, amount: Decimal) -> String {
        pricing::format_amount(amount, self.currency.symbol)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::COP;
    use testresult::TestResult;

    use crate::{
        cart::{ComboBounds, LineKind},
        orders::FormField,
    };

    use super::*;

    const TODAY: Date = date(2026, 10, 18);

    fn composer() -> OrderComposer {
        OrderComposer::new(FormRules::default(), COP)
    }

    fn form() -> CustomerOrderForm {
        CustomerOrderForm {
            name: "Ana Gómez".to_string(),
            email: "ana@example.com".to_string(),
            address: "Calle 45 # 12-30".to_string(),
            zone: "Norte".to_string(),
            delivery_date: "2026-10-20".to_string(),
            delivery_time: "12:30".to_string(),
            phone: Some("3107573527".to_string()),
        }
    }

    fn arroz(quantity: u32) -> CartLine {
        CartLine::new(
            7,
            "Arroz",
            Decimal::from(15_000),
            None,
            quantity,
            LineKind::Regular,
        )
    }

    fn combo(quantity: u32) -> TestResult<CartLine> {
        Ok(CartLine::new(
            20,
            "Combo Familiar",
            Decimal::from(42_000),
            None,
            quantity,
            LineKind::Combo(ComboBounds::new(3, Some(5))?),
        ))
    }

    #[test]
    fn empty_cart_is_rejected_first() {
        let bad_form = CustomerOrderForm::default();

        let result = composer().build_order_record(&[], &bad_form, TODAY);

        assert!(matches!(result, Err(ComposeError::EmptyCart)));
    }

    #[test]
    fn form_is_checked_before_policy() -> TestResult {
        let bad_form = CustomerOrderForm {
            email: "not-an-email".to_string(),
            ..form()
        };

        let result = composer().build_order_record(&[combo(2)?], &bad_form, TODAY);

        let Err(ComposeError::InvalidForm(errors)) = result else {
            return Err(format!("expected a form error, got {result:?}").into());
        };

        assert_eq!(
            errors.iter().map(|error| error.field).collect::<Vec<_>>(),
            vec![FormField::Email]
        );

        Ok(())
    }

    #[test]
    fn policy_violations_block_the_order() -> TestResult {
        let result = composer().build_order_record(&[arroz(1), combo(2)?], &form(), TODAY);

        let Err(error) = result else {
            return Err("expected a policy violation".into());
        };

        assert!(matches!(error, ComposeError::PolicyViolation(_)));
        assert_eq!(
            error.messages(),
            vec!["Combo Familiar requires at least 3 units (has 2)".to_string()]
        );

        Ok(())
    }

    #[test]
    fn record_totals_lines_and_stamps_pending() -> TestResult {
        let record = composer().build_order_record(&[arroz(2), combo(3)?], &form(), TODAY)?;

        assert_eq!(record.total, Decimal::from(156_000));
        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.source, "web");
        assert_eq!(record.detail(), "2x Arroz\n3x Combo Familiar");
        assert_eq!(
            record.lines.iter().map(|line| line.line_total).collect::<Vec<_>>(),
            vec![Decimal::from(30_000), Decimal::from(126_000)]
        );

        Ok(())
    }

    #[test]
    fn message_follows_the_template() -> TestResult {
        let composer = composer();
        let record = composer.build_order_record(&[arroz(2)], &form(), TODAY)?;

        let expected = "🍽️ *MI PEDIDO*\n\n\
            👤 *Cliente:* Ana Gómez\n\
            📧 *Correo:* ana@example.com\n\
            📍 *Dirección:* Calle 45 # 12-30\n\
            🗺️ *Zona:* Norte\n\
            📅 *Fecha de entrega:* 2026-10-20\n\
            🕐 *Hora de entrega:* 12:30\n\
            📞 *Teléfono:* 3107573527\n\
            \n\
            • 2x Arroz\n\
            \x20 $15.000 c/u = $30.000\n\n\
            💰 *TOTAL: $30.000*\n\n\
            ¡Gracias por tu pedido! 😊";

        assert_eq!(composer.build_message(&record), expected);

        Ok(())
    }

    #[test]
    fn message_keeps_cart_order_and_is_deterministic() -> TestResult {
        let composer = composer();
        let lines = [combo(3)?, arroz(1)];

        let first = composer.build_message(&composer.build_order_record(&lines, &form(), TODAY)?);
        let second = composer.build_message(&composer.build_order_record(&lines, &form(), TODAY)?);

        assert_eq!(first, second);

        let combo_at = first.find("3x Combo Familiar");
        let arroz_at = first.find("1x Arroz");

        assert!(combo_at.is_some() && arroz_at.is_some() && combo_at < arroz_at);

        Ok(())
    }
}
