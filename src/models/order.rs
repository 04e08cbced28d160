//! # Order Types
//!
//! An order binds a customer, a technician and a service. Its status only
//! moves between `open` and `closed`; closing stamps the completion date.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::Party;

/// Corresponds to the PostgreSQL `order_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Closed,
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(OrderStatus::Open),
            "closed" => Some(OrderStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "customer")]
    pub customer_id: Uuid,
    #[serde(rename = "technician")]
    pub technician_id: Uuid,
    #[serde(rename = "service")]
    pub service_id: Uuid,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub order_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completion_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Order {
    #[inline]
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id || self.technician_id == user_id
    }
}

/// Order with both parties resolved to `{id, username, email}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub customer: Option<Party>,
    pub technician: Option<Party>,
    pub service: Uuid,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub order_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completion_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Which side of an order a user is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderParty {
    Customer(Uuid),
    Technician(Uuid),
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub technician_id: Uuid,
    pub service_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub service_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// Request payload for `POST /order/create`
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer: Option<Uuid>,
    pub technician: Option<Uuid>,
    pub service: Option<Uuid>,
}

/// Request payload for `PUT /order/update/{id}`
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub service: Option<Uuid>,
    pub status: Option<String>,
}
