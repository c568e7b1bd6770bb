//! Order persistence

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date};
use mockall::automock;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    orders::{Customer, OrderRecord, OrderStats, OrderStatus, SavedOrder},
    supabase::{SupabaseClient, SupabaseError},
};

const ORDERS_TABLE: &str = "pedidos";

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backend could not be reached or refused the request.
    #[error(transparent)]
    Backend(#[from] SupabaseError),

    /// The backend answered with something other than the expected order.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// No order has this id.
    #[error("order {0} not found")]
    NotFound(Uuid),
}

/// Stores and reads orders.
#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Stores a new order.
    async fn insert(&self, record: &OrderRecord) -> Result<SavedOrder, PersistenceError>;

    /// Sets the status of an order.
    async fn update_status(
        &self,
        id: Uuid,
        status: &OrderStatus,
    ) -> Result<SavedOrder, PersistenceError>;

    /// Reads one order.
    async fn get(&self, id: Uuid) -> Result<SavedOrder, PersistenceError>;

    /// Orders placed with `email`, newest first.
    async fn for_customer(&self, email: &str) -> Result<Vec<SavedOrder>, PersistenceError>;

    /// Every order in the shop, newest first.
    async fn all(&self) -> Result<Vec<SavedOrder>, PersistenceError>;

    /// Checks that the orders table is reachable.
    async fn ping(&self) -> Result<(), PersistenceError>;
}

#[derive(Debug, Serialize)]
struct NewOrderRow<'a> {
    cliente_nombre: &'a str,
    cliente_telefono: Option<&'a str>,
    cliente_correo: &'a str,
    cliente_direccion: &'a str,
    cliente_zona: &'a str,
    fecha_entrega: Date,
    hora_entrega: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    total_pedido: Decimal,
    detalle_pedido: String,
    estado: &'a OrderStatus,
    fuente: &'a str,
}

impl<'a> From<&'a OrderRecord> for NewOrderRow<'a> {
    fn from(record: &'a OrderRecord) -> Self {
        let customer = &record.customer;

        Self {
            cliente_nombre: &customer.name,
            cliente_telefono: customer.phone.as_deref(),
            cliente_correo: &customer.email,
            cliente_direccion: &customer.address,
            cliente_zona: &customer.zone,
            fecha_entrega: customer.delivery_date,
            hora_entrega: &customer.delivery_time,
            total_pedido: record.total,
            detalle_pedido: record.detail(),
            estado: &record.status,
            fuente: &record.source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    id: Uuid,
    #[serde(default)]
    created_at: Option<Timestamp>,
    cliente_nombre: String,
    #[serde(default)]
    cliente_telefono: Option<String>,
    cliente_correo: String,
    cliente_direccion: String,
    cliente_zona: String,
    fecha_entrega: Date,
    hora_entrega: String,
    total_pedido: Decimal,
    #[serde(default)]
    detalle_pedido: String,
    estado: OrderStatus,
    #[serde(default)]
    fuente: String,
}

impl From<OrderRow> for SavedOrder {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            customer: Customer {
                name: row.cliente_nombre,
                email: row.cliente_correo,
                address: row.cliente_direccion,
                zone: row.cliente_zona,
                delivery_date: row.fecha_entrega,
                delivery_time: row.hora_entrega,
                phone: row.cliente_telefono,
            },
            total: row.total_pedido,
            detail: row.detalle_pedido,
            status: row.estado,
            source: row.fuente,
        }
    }
}

/// Summarises the orders of one customer, or of the whole shop when `email` is `None`.
///
/// # Errors
///
/// Returns a [`PersistenceError`] if the orders cannot be read.
pub async fn order_stats(
    orders: &dyn OrdersRepository,
    email: Option<&str>,
) -> Result<OrderStats, PersistenceError> {
    let orders = match email {
        Some(email) => orders.for_customer(email).await?,
        None => orders.all().await?,
    };

    Ok(OrderStats::from_orders(&orders))
}

/// Orders stored in the project's `pedidos` table.
#[derive(Debug, Clone)]
pub struct SupabaseOrdersRepository {
    client: SupabaseClient,
}

impl SupabaseOrdersRepository {
    /// Creates a repository over `client`.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn newest_first(
        &self,
        filter: Option<(&str, String)>,
    ) -> Result<Vec<SavedOrder>, PersistenceError> {
        let mut query = vec![("select", "*".to_string())];
        query.extend(filter);
        query.push(("order", "created_at.desc".to_string()));

        let request = self.client.table(Method::GET, ORDERS_TABLE)?.query(&query);
        let rows: Vec<OrderRow> = SupabaseClient::send_json(request).await?;

        debug!(orders = rows.len(), "orders fetched");

        Ok(rows.into_iter().map(SavedOrder::from).collect())
    }

    async fn single(
        request: reqwest::RequestBuilder,
        missing: impl FnOnce() -> PersistenceError,
    ) -> Result<SavedOrder, PersistenceError> {
        let rows: Vec<OrderRow> = SupabaseClient::send_json(request).await?;

        rows.into_iter()
            .next()
            .map(SavedOrder::from)
            .ok_or_else(missing)
    }
}

#[async_trait]
impl OrdersRepository for SupabaseOrdersRepository {
    async fn insert(&self, record: &OrderRecord) -> Result<SavedOrder, PersistenceError> {
        let request = self
            .client
            .table(Method::POST, ORDERS_TABLE)?
            .header("Prefer", "return=representation")
            .json(&[NewOrderRow::from(record)]);

        let saved = Self::single(request, || {
            PersistenceError::UnexpectedResponse("insert returned no rows".to_string())
        })
        .await?;

        info!(order = %saved.id, total = %saved.total, "order stored");

        Ok(saved)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: &OrderStatus,
    ) -> Result<SavedOrder, PersistenceError> {
        let request = self
            .client
            .table(Method::PATCH, ORDERS_TABLE)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&json!({ "estado": status }));

        let saved = Self::single(request, || PersistenceError::NotFound(id)).await?;

        info!(order = %id, %status, "order status updated");

        Ok(saved)
    }

    async fn get(&self, id: Uuid) -> Result<SavedOrder, PersistenceError> {
        let request = self
            .client
            .table(Method::GET, ORDERS_TABLE)?
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]);

        Self::single(request, || PersistenceError::NotFound(id)).await
    }

    async fn for_customer(&self, email: &str) -> Result<Vec<SavedOrder>, PersistenceError> {
        self.newest_first(Some(("cliente_correo", format!("eq.{email}"))))
            .await
    }

    async fn all(&self) -> Result<Vec<SavedOrder>, PersistenceError> {
        self.newest_first(None).await
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        let request = self
            .client
            .table(Method::GET, ORDERS_TABLE)?
            .query(&[("select", "id"), ("limit", "1")]);

        SupabaseClient::send(request).await?;

        Ok(())
    }
}
