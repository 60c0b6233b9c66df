use std::collections::BTreeMap;

use uuid::Uuid;

/// Session-scoped shopping cart: a mapping of product id to quantity.
///
/// The cart lives entirely in the session layer and is never persisted; the
/// caller clears it after a successful order placement. Quantities are kept
/// strictly positive — setting a quantity to zero removes the entry.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: BTreeMap<Uuid, i32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` to the product's current quantity.
    pub fn add(&mut self, product_id: Uuid, quantity: i32) {
        if quantity <= 0 {
            return;
        }
        let entry = self.items.entry(product_id).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Replaces the product's quantity; zero or negative removes it.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) {
        if quantity <= 0 {
            self.items.remove(&product_id);
        } else {
            self.items.insert(product_id, quantity);
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.remove(&product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> impl Iterator<Item = (Uuid, i32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }
}
