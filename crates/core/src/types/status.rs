//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Delivery,
    Pickup,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivery => write!(f, "delivery"),
            Self::Pickup => write!(f, "pickup"),
        }
    }
}

/// Outcome of a hosted-payment return flow.
///
/// `SuccessUnverified` is the degraded-trust state: the hosted page redirected
/// back with a success signal but the server-side verification call could not
/// be made (or did not resolve). Treating that as success rather than failure
/// is a product decision carried over deliberately - it avoids silently losing
/// a real charge - and callers should route such orders to a
/// verification-required support path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    SuccessUnverified,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::SuccessUnverified => write!(f, "success_unverified"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_serde_names() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, r#""preparing""#);

        let parsed: OrderStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
    }

    #[test]
    fn payment_status_display() {
        assert_eq!(
            PaymentStatus::SuccessUnverified.to_string(),
            "success_unverified"
        );
    }
}
