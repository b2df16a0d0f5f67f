//! Cart state: an in-memory reducer persisted after every mutation.
//!
//! The cart is owned by the session, hydrated from the store at startup, and
//! written back after each change. Persistence failures (the quota-exceeded
//! class of errors) are logged and swallowed: the in-memory cart remains
//! authoritative for the lifetime of the session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tavola_core::{LineId, ProductId, VariantId};

use crate::api::types::{OrderItemRequest, Product, ProductVariant};
use crate::store::{self, SharedStore, keys};

/// A variant chosen for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRef {
    pub id: VariantId,
    pub name: String,
}

/// One line in the cart.
///
/// Quantity is always at least 1; a line reduced to zero is removed rather
/// than stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID, or `product:variant` composite when a variant was chosen.
    pub id: LineId,
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: Option<VariantRef>,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Build a cart line from a product, using its base price.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: LineId::product(&product.id),
            product_id: product.id.clone(),
            variant: None,
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// Build a cart line for a specific variant of a product.
    #[must_use]
    pub fn from_variant(product: &Product, variant: &ProductVariant) -> Self {
        Self {
            id: LineId::variant(&product.id, &variant.id),
            product_id: product.id.clone(),
            variant: Some(VariantRef {
                id: variant.id.clone(),
                name: variant.name.clone(),
            }),
            name: format!("{} ({})", product.name, variant.name),
            unit_price: variant.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// Line subtotal (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The session's cart: ordered lines, unique by line ID.
pub struct CartManager {
    items: Vec<CartItem>,
    store: SharedStore,
}

impl CartManager {
    /// Create a cart hydrated from the persistent store.
    #[must_use]
    pub fn load(store: SharedStore) -> Self {
        let items = store::read_json(store.as_ref(), keys::CART).unwrap_or_default();
        Self { items, store }
    }

    /// Add one unit of `item`. If a line with the same ID exists, its
    /// quantity is incremented by one; otherwise the line is appended.
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity += 1,
            None => self.items.push(CartItem { quantity: 1, ..item }),
        }
        self.persist();
    }

    /// Remove the line with the given ID, if present.
    pub fn remove(&mut self, id: &LineId) {
        self.items.retain(|item| &item.id != id);
        self.persist();
    }

    /// Set the quantity of a line. A quantity of zero (or below) removes the
    /// line, never storing a zero-quantity entry.
    pub fn set_quantity(&mut self, id: &LineId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.quantity = quantity;
        }
        self.persist();
    }

    /// Empty the cart and delete its persistent record.
    pub fn clear(&mut self) {
        self.items.clear();
        store::remove(self.store.as_ref(), keys::CART);
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Total price across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Snapshot the cart as order-creation request lines.
    #[must_use]
    pub fn to_order_items(&self) -> Vec<OrderItemRequest> {
        self.items
            .iter()
            .map(|item| OrderItemRequest {
                product_id: item.product_id.clone(),
                variant_id: item.variant.as_ref().map(|v| v.id.clone()),
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect()
    }

    fn persist(&self) {
        store::write_json(self.store.as_ref(), keys::CART, &self.items);
    }
}
