//! Wire types for the Tavola backend.
//!
//! These mirror the backend's JSON shapes. Amount fields use the lenient
//! [`decimal_or_zero`] coercion since the backend serializes prices
//! inconsistently across endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tavola_core::{
    CategoryId, Email, OrderId, OrderStatus, OrderType, PaymentId, ProductId, SessionId, UserId,
    VariantId, decimal_or_zero,
};

// =============================================================================
// Catalog
// =============================================================================

/// A browsable menu category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A purchasable variant of a product (e.g., a size).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub available: bool,
}

/// A product with optional variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Orders
// =============================================================================

/// One line of an order snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
}

/// A server-owned order. The client only caches the most recently
/// fetched copy; the backend remains the authority on status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned identifier (some endpoints name it `order_id`).
    #[serde(alias = "order_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Delivery destination for a delivery-type order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Contact details for a guest (unauthenticated backend account) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One line of an order-creation request, snapshotted from the cart.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Body for `POST /orders-create/`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<GuestContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub tip_amount: Decimal,
    pub items: Vec<OrderItemRequest>,
}

/// Body for `POST /orders/{id}/rate/`.
#[derive(Debug, Clone, Serialize)]
pub struct RateOrderRequest {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// =============================================================================
// Payment
// =============================================================================

/// Body for `POST /payment/checkout/create/`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    pub payment_method: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Response of `POST /payment/checkout/create/`.
///
/// `checkout_url` is nominally required but modeled as optional so the
/// payment bridge owns the "no checkout URL received" failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Body for `POST /payment/checkout/verify/`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyCheckoutRequest {
    pub session_id: SessionId,
    pub order_id: OrderId,
}

/// Response of `POST /payment/checkout/verify/`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCheckoutResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl VerifyCheckoutResponse {
    /// Whether the backend confirmed the charge.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self.status.as_str(), "verified" | "success")
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Access/refresh token pair issued by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Backend user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of the login, registration, and federated-exchange endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub tokens: TokenPair,
    pub user: UserProfile,
}

/// Body for `POST /auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/google/`.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}
