use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    Actor, OrderDetails, OrderDraft, OrderLineInput, OrderStatus, OrderSummary, TransitionActor,
};
use crate::domain::page::{OrderFilter, Page, PageRequest};
use crate::domain::ports::{OrderStore, ProductStore};

/// Largest accepted difference between a submitted total and the sum of its
/// lines, to absorb decimal rounding.
fn total_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2) // 0.01
}

/// Order workflow: validates input, dispatches on the acting party, and
/// converts every storage failure into an explicit failure result with a
/// server-side diagnostic. No storage error escapes this layer unlogged.
pub struct OrderService<S, P> {
    orders: S,
    products: P,
}

impl<S: OrderStore, P: ProductStore> OrderService<S, P> {
    pub fn new(orders: S, products: P) -> Self {
        Self { orders, products }
    }

    /// Places an order for pre-priced lines.
    ///
    /// The caller is responsible for pricing lines from authoritative
    /// product records (see [`Self::checkout_cart`]); this method verifies
    /// that the submitted total matches the lines before anything is
    /// persisted. Stock is checked and debited inside the store transaction.
    pub fn place_order(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLineInput>,
        total_amount: BigDecimal,
        shipping_address: String,
        notes: Option<String>,
    ) -> Result<Uuid, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::Validation("order has no lines".to_string()));
        }
        for line in &lines {
            if line.quantity <= 0 {
                return Err(DomainError::Validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            if line.unit_price < BigDecimal::from(0) {
                return Err(DomainError::Validation(format!(
                    "price for product {} must not be negative",
                    line.product_id
                )));
            }
        }
        if shipping_address.trim().is_empty() {
            return Err(DomainError::Validation(
                "shipping address is required".to_string(),
            ));
        }

        let computed: BigDecimal = lines
            .iter()
            .map(|l| &l.unit_price * BigDecimal::from(l.quantity))
            .fold(BigDecimal::from(0), |acc, v| acc + v);
        if (&computed - &total_amount).abs() > total_tolerance() {
            return Err(DomainError::Validation(format!(
                "total {} does not match order lines ({})",
                total_amount, computed
            )));
        }

        let result = self.orders.create(OrderDraft {
            user_id,
            lines,
            total_amount,
            shipping_address,
            notes,
        });
        match &result {
            Ok(order_id) => {
                log::info!("placed order {} for user {}", order_id, user_id);
            }
            Err(DomainError::InsufficientStock { product_id }) => {
                log::warn!(
                    "order for user {} rejected: insufficient stock for product {}",
                    user_id,
                    product_id
                );
            }
            Err(e) => {
                log::error!("failed to place order for user {}: {}", user_id, e);
            }
        }
        result
    }

    /// Converts a session cart into an order, pricing every entry from the
    /// current product record rather than trusting client-side prices.
    /// The caller clears the cart once this returns `Ok`.
    pub fn checkout_cart(
        &self,
        user_id: Uuid,
        cart: &Cart,
        shipping_address: String,
        notes: Option<String>,
    ) -> Result<Uuid, DomainError> {
        if cart.is_empty() {
            return Err(DomainError::Validation("cart is empty".to_string()));
        }

        let mut lines = Vec::with_capacity(cart.len());
        for (product_id, quantity) in cart.items() {
            let product = self
                .products
                .find_active(product_id)?
                .ok_or_else(|| {
                    DomainError::Validation(format!("product {} is unavailable", product_id))
                })?;
            lines.push(OrderLineInput {
                product_id,
                quantity,
                unit_price: product.unit_price,
            });
        }
        let total: BigDecimal = lines
            .iter()
            .map(|l| &l.unit_price * BigDecimal::from(l.quantity))
            .fold(BigDecimal::from(0), |acc, v| acc + v);

        self.place_order(user_id, lines, total, shipping_address, notes)
    }

    /// Fetches one order with its lines. Regular users only see their own
    /// orders; managers see any order. Anything else is a not-found, so the
    /// existence of other users' orders is not leaked.
    pub fn order_details(&self, order_id: Uuid, actor: &Actor) -> Result<OrderDetails, DomainError> {
        let found = if actor.is_manager {
            self.orders.find_any(order_id)
        } else {
            self.orders.find_for_user(order_id, actor.user_id)
        };
        found
            .map_err(|e| self.log_internal("read order", order_id, e))?
            .ok_or(DomainError::NotFound)
    }

    pub fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError> {
        self.orders
            .list_for_user(user_id)
            .map_err(|e| self.log_internal("list orders for user", user_id, e))
    }

    /// Manager listing across all users, paginated and filtered.
    pub fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<OrderSummary>, DomainError> {
        self.orders.list_filtered(filter, page).map_err(|e| {
            log::error!("failed to list orders: {}", e);
            e
        })
    }

    /// User-triggered cancellation: allowed only while the order is still
    /// pending and owned by `user_id`; both are re-checked inside the store
    /// transaction.
    pub fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let result =
            self.orders
                .transition(order_id, OrderStatus::Cancelled, TransitionActor::Owner(user_id));
        if let Err(e) = &result {
            log::warn!(
                "user {} could not cancel order {}: {}",
                user_id,
                order_id,
                e
            );
        }
        result
    }

    /// Manager-triggered status change to any non-terminal-escaping target.
    pub fn set_status(&self, order_id: Uuid, target: OrderStatus) -> Result<(), DomainError> {
        let result = self
            .orders
            .transition(order_id, target, TransitionActor::Manager);
        if let Err(e) = &result {
            log::warn!("status change of order {} to {} failed: {}", order_id, target, e);
        }
        result
    }

    pub fn status_counts(&self) -> Result<Vec<(OrderStatus, i64)>, DomainError> {
        self.orders.count_by_status().map_err(|e| {
            log::error!("failed to count orders by status: {}", e);
            e
        })
    }

    fn log_internal(&self, what: &str, id: Uuid, e: DomainError) -> DomainError {
        if matches!(e, DomainError::Internal(_)) {
            log::error!("failed to {} ({}): {}", what, id, e);
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::order::{OrderChanges, ProductView};

    #[derive(Default)]
    struct FakeOrders {
        created: Mutex<Vec<OrderDraft>>,
        known: Mutex<HashMap<Uuid, OrderDetails>>,
        transitions: Mutex<Vec<(Uuid, OrderStatus, bool)>>,
    }

    impl FakeOrders {
        fn insert(&self, details: OrderDetails) {
            self.known
                .lock()
                .expect("lock poisoned")
                .insert(details.id, details);
        }
    }

    impl OrderStore for FakeOrders {
        fn create(&self, draft: OrderDraft) -> Result<Uuid, DomainError> {
            let id = Uuid::new_v4();
            self.created.lock().expect("lock poisoned").push(draft);
            Ok(id)
        }

        fn find_for_user(
            &self,
            order_id: Uuid,
            user_id: Uuid,
        ) -> Result<Option<OrderDetails>, DomainError> {
            Ok(self
                .known
                .lock()
                .expect("lock poisoned")
                .get(&order_id)
                .filter(|o| o.user_id == user_id)
                .cloned())
        }

        fn find_any(&self, order_id: Uuid) -> Result<Option<OrderDetails>, DomainError> {
            Ok(self
                .known
                .lock()
                .expect("lock poisoned")
                .get(&order_id)
                .cloned())
        }

        fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError> {
            Ok(self
                .known
                .lock()
                .expect("lock poisoned")
                .values()
                .filter(|o| o.user_id == user_id)
                .map(|o| OrderSummary {
                    id: o.id,
                    user_id: o.user_id,
                    total_amount: o.total_amount.clone(),
                    status: o.status,
                    created_at: o.created_at,
                })
                .collect())
        }

        fn list_filtered(
            &self,
            _filter: &OrderFilter,
            page: PageRequest,
        ) -> Result<Page<OrderSummary>, DomainError> {
            Ok(Page::new(vec![], 0, page))
        }

        fn transition(
            &self,
            order_id: Uuid,
            target: OrderStatus,
            actor: TransitionActor,
        ) -> Result<(), DomainError> {
            let as_owner = matches!(actor, TransitionActor::Owner(_));
            self.transitions
                .lock()
                .expect("lock poisoned")
                .push((order_id, target, as_owner));
            Ok(())
        }

        fn update(&self, _order_id: Uuid, _changes: OrderChanges) -> Result<(), DomainError> {
            Ok(())
        }

        fn delete(&self, _order_id: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }

        fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, DomainError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct FakeProducts {
        products: Mutex<HashMap<Uuid, ProductView>>,
    }

    impl FakeProducts {
        fn with(products: Vec<ProductView>) -> Self {
            let map = products.into_iter().map(|p| (p.id, p)).collect();
            Self {
                products: Mutex::new(map),
            }
        }
    }

    impl ProductStore for FakeProducts {
        fn stock_level(&self, product_id: Uuid) -> Result<Option<i32>, DomainError> {
            Ok(self
                .products
                .lock()
                .expect("lock poisoned")
                .get(&product_id)
                .map(|p| p.stock_quantity))
        }

        fn find_active(&self, product_id: Uuid) -> Result<Option<ProductView>, DomainError> {
            Ok(self
                .products
                .lock()
                .expect("lock poisoned")
                .get(&product_id)
                .filter(|p| p.is_active)
                .cloned())
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn product(name: &str, price: &str, stock: i32, active: bool) -> ProductView {
        ProductView {
            id: Uuid::new_v4(),
            name: name.to_string(),
            unit_price: dec(price),
            stock_quantity: stock,
            is_active: active,
        }
    }

    fn line(product_id: Uuid, quantity: i32, price: &str) -> OrderLineInput {
        OrderLineInput {
            product_id,
            quantity,
            unit_price: dec(price),
        }
    }

    fn service_with(
        orders: FakeOrders,
        products: FakeProducts,
    ) -> OrderService<FakeOrders, FakeProducts> {
        OrderService::new(orders, products)
    }

    fn details(user_id: Uuid, status: OrderStatus) -> OrderDetails {
        OrderDetails {
            id: Uuid::new_v4(),
            user_id,
            total_amount: dec("12.00"),
            status,
            notes: None,
            shipping_address: "1 Main St".to_string(),
            created_at: chrono::Utc::now(),
            lines: vec![],
        }
    }

    #[test]
    fn rejects_empty_line_list_before_persisting() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let err = svc
            .place_order(Uuid::new_v4(), vec![], dec("0"), "1 Main St".to_string(), None)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.orders.created.lock().expect("lock poisoned").is_empty());
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let err = svc
            .place_order(
                Uuid::new_v4(),
                vec![line(Uuid::new_v4(), 0, "3.50")],
                dec("0"),
                "1 Main St".to_string(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_blank_shipping_address() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let err = svc
            .place_order(
                Uuid::new_v4(),
                vec![line(Uuid::new_v4(), 1, "3.50")],
                dec("3.50"),
                "   ".to_string(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_total_that_disagrees_with_lines() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let err = svc
            .place_order(
                Uuid::new_v4(),
                vec![line(Uuid::new_v4(), 2, "3.50")],
                dec("8.00"),
                "1 Main St".to_string(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.orders.created.lock().expect("lock poisoned").is_empty());
    }

    #[test]
    fn accepts_total_within_rounding_tolerance() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        svc.place_order(
            Uuid::new_v4(),
            vec![line(Uuid::new_v4(), 2, "3.50")],
            dec("7.01"),
            "1 Main St".to_string(),
            None,
        )
        .expect("within tolerance");
    }

    #[test]
    fn stored_draft_carries_all_fields() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let user = Uuid::new_v4();
        svc.place_order(
            user,
            vec![line(Uuid::new_v4(), 2, "3.50"), line(Uuid::new_v4(), 1, "5.00")],
            dec("12.00"),
            "1 Main St".to_string(),
            Some("ring the bell".to_string()),
        )
        .expect("place failed");

        let created = svc.orders.created.lock().expect("lock poisoned");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].user_id, user);
        assert_eq!(created[0].lines.len(), 2);
        assert_eq!(created[0].total_amount, dec("12.00"));
        assert_eq!(created[0].notes.as_deref(), Some("ring the bell"));
    }

    #[test]
    fn checkout_prices_cart_from_product_records() {
        let apples = product("apples", "3.50", 10, true);
        let milk = product("milk", "5.00", 1, true);
        let (apples_id, milk_id) = (apples.id, milk.id);
        let svc = service_with(FakeOrders::default(), FakeProducts::with(vec![apples, milk]));

        let mut cart = Cart::new();
        cart.add(apples_id, 2);
        cart.add(milk_id, 1);

        svc.checkout_cart(Uuid::new_v4(), &cart, "1 Main St".to_string(), None)
            .expect("checkout failed");

        let created = svc.orders.created.lock().expect("lock poisoned");
        assert_eq!(created[0].total_amount, dec("12.00"));
        let apple_line = created[0]
            .lines
            .iter()
            .find(|l| l.product_id == apples_id)
            .expect("apples line missing");
        assert_eq!(apple_line.unit_price, dec("3.50"));
        assert_eq!(apple_line.quantity, 2);
    }

    #[test]
    fn checkout_rejects_empty_cart() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let err = svc
            .checkout_cart(Uuid::new_v4(), &Cart::new(), "1 Main St".to_string(), None)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn checkout_rejects_inactive_product() {
        let discontinued = product("old stock", "1.00", 5, false);
        let id = discontinued.id;
        let svc = service_with(FakeOrders::default(), FakeProducts::with(vec![discontinued]));

        let mut cart = Cart::new();
        cart.add(id, 1);

        let err = svc
            .checkout_cart(Uuid::new_v4(), &cart, "1 Main St".to_string(), None)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.orders.created.lock().expect("lock poisoned").is_empty());
    }

    #[test]
    fn user_cannot_read_someone_elses_order() {
        let orders = FakeOrders::default();
        let owner = Uuid::new_v4();
        let order = details(owner, OrderStatus::Pending);
        let order_id = order.id;
        orders.insert(order);
        let svc = service_with(orders, FakeProducts::default());

        let stranger = Actor {
            user_id: Uuid::new_v4(),
            is_manager: false,
        };
        let err = svc.order_details(order_id, &stranger).unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn manager_reads_any_order() {
        let orders = FakeOrders::default();
        let order = details(Uuid::new_v4(), OrderStatus::Shipped);
        let order_id = order.id;
        orders.insert(order);
        let svc = service_with(orders, FakeProducts::default());

        let manager = Actor {
            user_id: Uuid::new_v4(),
            is_manager: true,
        };
        let found = svc.order_details(order_id, &manager).expect("read failed");
        assert_eq!(found.id, order_id);
    }

    #[test]
    fn cancel_runs_as_owner_transition() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let (order_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
        svc.cancel_order(order_id, user_id).expect("cancel failed");

        let transitions = svc.orders.transitions.lock().expect("lock poisoned");
        assert_eq!(transitions.as_slice(), &[(order_id, OrderStatus::Cancelled, true)]);
    }

    #[test]
    fn set_status_runs_as_manager_transition() {
        let svc = service_with(FakeOrders::default(), FakeProducts::default());
        let order_id = Uuid::new_v4();
        svc.set_status(order_id, OrderStatus::Shipped)
            .expect("set_status failed");

        let transitions = svc.orders.transitions.lock().expect("lock poisoned");
        assert_eq!(transitions.as_slice(), &[(order_id, OrderStatus::Shipped, false)]);
    }
}
