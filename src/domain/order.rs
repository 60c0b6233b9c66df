use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

/// Lifecycle of an order. `Completed` and `Cancelled` are terminal; once an
/// order reaches either, no further transition is permitted for any actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Validation(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

/// Who is asking for a status change. Owners are restricted to cancelling
/// their own pending orders; managers may set any non-terminal order to any
/// status.
#[derive(Debug, Clone, Copy)]
pub enum TransitionActor {
    Owner(Uuid),
    Manager,
}

/// Checks whether `actor` may move an order from `from` to `to`.
///
/// The persistence layer calls this inside the same transaction that read
/// `from`, so the decision cannot race with a concurrent status change.
pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    actor: TransitionActor,
) -> Result<(), DomainError> {
    if from.is_terminal() {
        return Err(DomainError::InvalidTransition { from, to });
    }
    match actor {
        TransitionActor::Manager => Ok(()),
        TransitionActor::Owner(_) => {
            if from == OrderStatus::Pending && to == OrderStatus::Cancelled {
                Ok(())
            } else {
                Err(DomainError::InvalidTransition { from, to })
            }
        }
    }
}

/// Authenticated caller as resolved from a bearer token by the presentation
/// layer.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_manager: bool,
}

#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Everything needed to persist a new order in one transaction.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: Uuid,
    pub lines: Vec<OrderLineInput>,
    pub total_amount: BigDecimal,
    pub shipping_address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Summary row for listings; carries no lines.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

/// Mutable order fields, each individually optional. Compiled by the
/// persistence layer to a fixed UPDATE statement shape; fields left `None`
/// are not touched.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub notes: Option<String>,
    pub shipping_address: Option<String>,
}

impl OrderChanges {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.shipping_address.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
    pub is_active: bool,
}
