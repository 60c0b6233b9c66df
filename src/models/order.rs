use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::orders;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: String,
    pub notes: Option<String>,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: String,
    pub notes: Option<String>,
    pub shipping_address: String,
}

/// Fixed-shape changeset for the mutable order columns; `None` fields are
/// skipped by Diesel rather than written as NULL.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangesRow {
    pub notes: Option<String>,
    pub shipping_address: Option<String>,
}
