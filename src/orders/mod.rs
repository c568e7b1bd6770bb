//! Orders
//!
//! Turning a cart and a customer form into a stored order and a WhatsApp message.

use std::{collections::BTreeMap, fmt};

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::{CartLine, ItemId};

pub mod composer;
pub mod form;
pub mod repository;
pub mod submission;

pub use composer::{ComposeError, OrderComposer};
pub use form::{CustomerOrderForm, FieldError, FormField, FormRules};
pub use repository::{
    MockOrdersRepository, OrdersRepository, PersistenceError, SupabaseOrdersRepository,
    order_stats,
};
pub use submission::{
    FailedStage, OrderSubmitter, SubmissionError, SubmissionReceipt, SubmissionStage,
};

/// Source tag stamped on orders placed through the website.
pub const ORDER_SOURCE: &str = "web";

/// Status of a stored order.
///
/// Orders start as [`OrderStatus::Pending`]; the kitchen moves them along with statuses
/// this crate does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Just placed
    Pending,

    /// Any other status, kept verbatim
    Other(String),
}

impl OrderStatus {
    const PENDING: &'static str = "pendiente";

    /// The stored status string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => Self::PENDING,
            Self::Other(status) => status,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(status: String) -> Self {
        if status == Self::PENDING {
            Self::Pending
        } else {
            Self::Other(status)
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(status: &str) -> Self {
        Self::from(status.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => OrderStatus::PENDING.to_string(),
            OrderStatus::Other(status) => status,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated customer and delivery details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Delivery address
    pub address: String,

    /// Delivery zone
    pub zone: String,

    /// Delivery date
    pub delivery_date: Date,

    /// Delivery time, as entered
    pub delivery_time: String,

    /// Contact phone
    pub phone: Option<String>,
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Menu item or combo id
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Unit price
    pub unit_price: Decimal,

    /// Units ordered
    pub quantity: u32,

    /// `unit_price * quantity`
    pub line_total: Decimal,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id(),
            name: line.name().to_string(),
            unit_price: line.unit_price(),
            quantity: line.quantity(),
            line_total: line.subtotal(),
        }
    }
}

/// An order ready to be stored. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Customer and delivery details
    pub customer: Customer,

    /// Lines in cart order
    pub lines: Vec<OrderLine>,

    /// Sum of the line totals
    pub total: Decimal,

    /// Status; always pending when built
    pub status: OrderStatus,

    /// Where the order came from
    pub source: String,
}

impl OrderRecord {
    /// One `"{quantity}x {name}"` row per line.
    pub fn detail(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}x {}", line.quantity, line.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOrder {
    /// Backend-assigned id
    pub id: Uuid,

    /// Backend-assigned creation time
    pub created_at: Option<Timestamp>,

    /// Customer and delivery details
    pub customer: Customer,

    /// Order total
    pub total: Decimal,

    /// Line detail text
    pub detail: String,

    /// Current status
    pub status: OrderStatus,

    /// Where the order came from
    pub source: String,
}

/// Summary of a set of stored orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    /// Number of orders
    pub count: usize,

    /// Sum of order totals
    pub sales_total: Decimal,

    /// Orders per status
    pub by_status: BTreeMap<OrderStatus, usize>,
}

impl OrderStats {
    /// Summarises `orders`.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a SavedOrder>) -> Self {
        orders.into_iter().fold(Self::default(), |mut stats, order| {
            stats.count += 1;
            stats.sales_total += order.total;
            *stats.by_status.entry(order.status.clone()).or_default() += 1;
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn saved(total: i64, status: &str) -> TestResult<SavedOrder> {
        Ok(SavedOrder {
            id: Uuid::nil(),
            created_at: None,
            customer: Customer {
                name: "Ana Gómez".to_string(),
                email: "ana@example.com".to_string(),
                address: "Calle 45 # 12-30".to_string(),
                zone: "Norte".to_string(),
                delivery_date: "2026-10-20".parse()?,
                delivery_time: "12:30".to_string(),
                phone: None,
            },
            total: Decimal::from(total),
            detail: "2x Arroz".to_string(),
            status: OrderStatus::from(status),
            source: ORDER_SOURCE.to_string(),
        })
    }

    #[test]
    fn pending_round_trips_through_strings() -> TestResult {
        assert_eq!(OrderStatus::from("pendiente"), OrderStatus::Pending);
        assert_eq!(
            OrderStatus::from("entregado"),
            OrderStatus::Other("entregado".to_string())
        );
        assert_eq!(serde_json::to_string(&OrderStatus::Pending)?, r#""pendiente""#);
        assert_eq!(
            serde_json::from_str::<OrderStatus>(r#""en camino""#)?.as_str(),
            "en camino"
        );

        Ok(())
    }

    #[test]
    fn stats_count_sales_and_statuses() -> TestResult {
        let orders = [
            saved(30_000, "pendiente")?,
            saved(42_000, "entregado")?,
            saved(15_000, "pendiente")?,
        ];

        let stats = OrderStats::from_orders(&orders);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.sales_total, Decimal::from(87_000));
        assert_eq!(stats.by_status.get(&OrderStatus::Pending), Some(&2));
        assert_eq!(
            stats.by_status.get(&OrderStatus::from("entregado")),
            Some(&1)
        );

        Ok(())
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        let stats = OrderStats::from_orders(std::iter::empty());

        assert_eq!(stats, OrderStats::default());
    }
}
