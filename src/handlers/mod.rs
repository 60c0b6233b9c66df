pub mod auth;
pub mod orders;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::order_stats,
    ),
    components(schemas(
        orders::CheckoutLineRequest,
        orders::CheckoutRequest,
        orders::CreateOrderResponse,
        orders::OrderLineResponse,
        orders::OrderSummaryResponse,
        orders::OrderDetailsResponse,
        orders::ListOrdersResponse,
        orders::UpdateStatusRequest,
        orders::StatusCountsResponse,
        crate::domain::order::OrderStatus,
    )),
    tags(
        (name = "orders", description = "Grocery order workflow")
    )
)]
pub struct ApiDoc;
