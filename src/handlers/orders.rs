use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::order::{OrderDetails, OrderStatus, OrderSummary};
use crate::domain::page::{OrderFilter, Page, PageRequest};
use crate::errors::AppError;
use crate::handlers::auth::AuthedActor;
use crate::AppOrderService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub lines: Vec<CheckoutLineRequest>,
    pub shipping_address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "3.50"
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: String,
    pub status: OrderStatus,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailsResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: String,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub shipping_address: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Filter by status (managers only).
    pub status: Option<String>,
    /// Inclusive start date (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    PageRequest::DEFAULT_PER_PAGE
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderSummaryResponse>,
    pub total_items: i64,
    pub total_pages: i64,
    pub page: i64,
    pub per_page: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountsResponse {
    pub counts: BTreeMap<String, i64>,
}

fn summary_response(o: OrderSummary) -> OrderSummaryResponse {
    OrderSummaryResponse {
        id: o.id,
        user_id: o.user_id,
        total_amount: o.total_amount.to_string(),
        status: o.status,
        created_at: o.created_at.to_rfc3339(),
    }
}

fn details_response(o: OrderDetails) -> OrderDetailsResponse {
    OrderDetailsResponse {
        id: o.id,
        user_id: o.user_id,
        total_amount: o.total_amount.to_string(),
        status: o.status,
        notes: o.notes,
        shipping_address: o.shipping_address,
        created_at: o.created_at.to_rfc3339(),
        lines: o
            .lines
            .into_iter()
            .map(|l| OrderLineResponse {
                id: l.id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price.to_string(),
            })
            .collect(),
    }
}

fn page_response(page: Page<OrderSummary>) -> ListOrdersResponse {
    ListOrdersResponse {
        items: page.items.into_iter().map(summary_response).collect(),
        total_items: page.total_items,
        total_pages: page.total_pages,
        page: page.page,
        per_page: page.per_page,
        has_prev: page.has_prev,
        has_next: page.has_next,
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Places an order for the authenticated user. Lines carry product and
/// quantity only; prices come from the current product records, never from
/// the client. The order, its lines, and the stock decrements commit in one
/// transaction.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = CreateOrderResponse),
        (status = 400, description = "Empty or invalid lines, or insufficient stock"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    actor: AuthedActor,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let user_id = actor.0.user_id;

    let order_id = web::block(move || {
        let mut cart = Cart::new();
        for line in &body.lines {
            if line.quantity <= 0 {
                return Err(AppError::BadRequest(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            cart.add(line.product_id, line.quantity);
        }
        service
            .checkout_cart(user_id, &cart, body.shipping_address, body.notes)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse { id: order_id }))
}

/// GET /api/orders
///
/// Managers get all orders, paginated and filtered by status and inclusive
/// date range. Regular users get their own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("status" = Option<String>, Query, description = "Status filter (managers only)"),
        ("from" = Option<String>, Query, description = "Inclusive start date, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Inclusive end date, YYYY-MM-DD"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<AppOrderService>,
    actor: AuthedActor,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let actor = actor.0;

    let response = web::block(move || {
        if actor.is_manager {
            let status = params
                .status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?;
            let filter = OrderFilter {
                status,
                from: params.from,
                to: params.to,
            };
            let page = service.list_orders(&filter, PageRequest::new(params.page, params.per_page))?;
            Ok::<_, AppError>(page_response(page))
        } else {
            let items: Vec<OrderSummaryResponse> = service
                .orders_for_user(actor.user_id)?
                .into_iter()
                .map(summary_response)
                .collect();
            let total_items = items.len() as i64;
            Ok(ListOrdersResponse {
                total_items,
                total_pages: i64::from(total_items > 0),
                page: 1,
                per_page: total_items.max(1),
                has_prev: false,
                has_next: false,
                items,
            })
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/orders/{id}
///
/// Returns the order with its lines. Users only see their own orders;
/// managers see any order. Everything else is a 404.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderDetailsResponse),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 404, description = "No such order visible to this actor"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let details = web::block(move || service.order_details(order_id, &actor.0))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(details_response(details)))
}

/// PUT /api/orders/{id}
///
/// Manager-only status update. Terminal orders (completed, cancelled) cannot
/// be moved; cancelling restores the order's stock.
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status or disallowed transition"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Caller is not a manager"),
        (status = 404, description = "No such order"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<AppOrderService>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    if !actor.0.is_manager {
        return Err(AppError::Forbidden);
    }
    let order_id = path.into_inner();
    let target: OrderStatus = body.into_inner().status.parse().map_err(AppError::from)?;

    web::block(move || service.set_status(order_id, target))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Order status updated" })))
}

/// GET /api/orders/stats
///
/// Manager-only order counts per status, for the back-office dashboard.
#[utoipa::path(
    get,
    path = "/api/orders/stats",
    responses(
        (status = 200, description = "Counts per status", body = StatusCountsResponse),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Caller is not a manager"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn order_stats(
    service: web::Data<AppOrderService>,
    actor: AuthedActor,
) -> Result<HttpResponse, AppError> {
    if !actor.0.is_manager {
        return Err(AppError::Forbidden);
    }

    let counts = web::block(move || service.status_counts())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let mut map: BTreeMap<String, i64> = OrderStatus::ALL
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    for (status, count) in counts {
        map.insert(status.to_string(), count);
    }

    Ok(HttpResponse::Ok().json(StatusCountsResponse { counts: map }))
}
