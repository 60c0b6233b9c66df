use uuid::Uuid;

use super::errors::DomainError;
use super::order::{
    OrderChanges, OrderDetails, OrderDraft, OrderStatus, OrderSummary, ProductView,
    TransitionActor,
};
use super::page::{OrderFilter, Page, PageRequest};

/// Persistence port for orders and their lines. Implementations provide
/// transactional semantics; business rules beyond column constraints live in
/// the domain and application layers.
pub trait OrderStore: Send + Sync + 'static {
    /// Persists the draft atomically: order row, line rows, and one guarded
    /// stock decrement per line. Any failure leaves no trace.
    fn create(&self, draft: OrderDraft) -> Result<Uuid, DomainError>;

    /// Ownership-scoped read: only returns the order if `user_id` owns it.
    fn find_for_user(&self, order_id: Uuid, user_id: Uuid)
        -> Result<Option<OrderDetails>, DomainError>;

    /// Privileged read with no ownership filter.
    fn find_any(&self, order_id: Uuid) -> Result<Option<OrderDetails>, DomainError>;

    /// A user's orders, newest first, without lines.
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError>;

    /// Paginated listing over all orders; the count query applies the same
    /// filters as the page query.
    fn list_filtered(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<OrderSummary>, DomainError>;

    /// Reads the current status (and ownership, for owners) and applies the
    /// transition rules inside one transaction. Cancellation restores the
    /// decremented stock in the same transaction.
    fn transition(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        actor: TransitionActor,
    ) -> Result<(), DomainError>;

    /// Applies the non-`None` fields of `changes`; a no-op when all fields
    /// are `None`.
    fn update(&self, order_id: Uuid, changes: OrderChanges) -> Result<(), DomainError>;

    /// Hard delete; lines cascade. Returns whether a row was removed. Not
    /// exercised by the order workflow, kept as a back-office capability.
    fn delete(&self, order_id: Uuid) -> Result<bool, DomainError>;

    /// Order counts grouped by status.
    fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, DomainError>;
}

/// Read-only product access used for stock checks and authoritative pricing.
pub trait ProductStore: Send + Sync + 'static {
    fn stock_level(&self, product_id: Uuid) -> Result<Option<i32>, DomainError>;

    /// Returns the product only when it exists and is active.
    fn find_active(&self, product_id: Uuid) -> Result<Option<ProductView>, DomainError>;
}
