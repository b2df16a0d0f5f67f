//! Stripe hosted-checkout bridge.
//!
//! The bridge spans the redirect to the hosted payment page and back: it
//! creates the remote checkout session, parks a [`PendingPayment`] record in
//! the persistent store so the return page can find its identifiers, and on
//! return resolves one of three outcomes. Verification ambiguity (the
//! redirect says the charge went through but the server-side check cannot
//! run) is a first-class outcome, not an error: losing track of a real
//! charge is worse than an untidy success page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use tavola_core::{OrderId, PaymentId, PaymentStatus, SessionId};

use crate::api::types::{CheckoutSessionRequest, Order, VerifyCheckoutRequest};
use crate::api::{ApiClient, ApiError};
use crate::auth::AuthManager;
use crate::cart::CartManager;
use crate::query::ReturnParams;
use crate::store::{self, SharedStore, keys};

/// Errors from checkout-session creation.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The backend answered without a redirect target.
    #[error("no checkout URL received")]
    MissingCheckoutUrl,

    /// The backend rejected the session-creation call.
    #[error("{0}")]
    Api(#[from] ApiError),
}

/// The local record bridging session creation and the return redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPayment {
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    pub session_id: SessionId,
    pub order_id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A created checkout session, ready for the caller to redirect to.
#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    pub checkout_url: String,
    pub session_id: Option<SessionId>,
}

/// Terminal state of a payment return flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The backend confirmed the charge.
    Success { order_id: OrderId },
    /// The redirect reported success but server-side verification could not
    /// run (identifiers incomplete). The user may have been charged; callers
    /// should route to a "verification required" view rather than a failure.
    SuccessUnverified { order_id: Option<OrderId> },
    /// No positive signal; nothing was mutated beyond what the message says.
    Failed { message: String },
}

impl PaymentOutcome {
    /// The status classification of this outcome.
    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        match self {
            Self::Success { .. } => PaymentStatus::Success,
            Self::SuccessUnverified { .. } => PaymentStatus::SuccessUnverified,
            Self::Failed { .. } => PaymentStatus::Failed,
        }
    }
}

/// Bridges order checkout to the hosted payment page and back.
pub struct PaymentBridge {
    api: ApiClient,
    store: SharedStore,
    origin: Url,
}

impl PaymentBridge {
    /// `origin` is the base URL the success/cancel callback paths are joined
    /// onto.
    #[must_use]
    pub const fn new(api: ApiClient, store: SharedStore, origin: Url) -> Self {
        Self { api, store, origin }
    }

    /// Create a hosted checkout session for `order` and park the pending
    /// record for the return flow. The caller redirects to `checkout_url`.
    ///
    /// # Errors
    ///
    /// Returns `MissingCheckoutUrl` when the backend answers without a
    /// redirect target, or `Api` when session creation fails outright. In
    /// both cases no pending record is written.
    #[instrument(skip(self, auth, order), fields(order_id = %order.id))]
    pub async fn create_checkout_session(
        &self,
        auth: &AuthManager,
        order: &Order,
    ) -> Result<CheckoutRedirect, PaymentError> {
        let request = CheckoutSessionRequest {
            order_id: order.id.clone(),
            payment_method: "stripe".to_string(),
            success_url: self.callback_url("payment/success"),
            cancel_url: self.callback_url("payment/cancel"),
        };

        let response = self
            .api
            .create_checkout_session(&request, auth.token())
            .await?;

        let checkout_url = response
            .checkout_url
            .filter(|u| !u.is_empty())
            .ok_or(PaymentError::MissingCheckoutUrl)?;

        if let Some(session_id) = &response.session_id {
            let pending = PendingPayment {
                payment_id: response.payment_id,
                session_id: session_id.clone(),
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                total_amount: order.total_amount,
                expires_at: response.expires_at,
            };
            store::write_json(self.store.as_ref(), keys::PENDING_PAYMENT, &pending);
        }

        info!(session_id = ?response.session_id, "checkout session created");
        Ok(CheckoutRedirect {
            checkout_url,
            session_id: response.session_id,
        })
    }

    /// Resolve the return redirect from the hosted payment page.
    ///
    /// Identifier recovery: `session_id` from the URL query if present, else
    /// from the stored [`PendingPayment`]; `order_id` from the pending record,
    /// else from the URL. With both in hand the backend verify operation
    /// decides the outcome. With identifiers incomplete but the URL claiming
    /// `success=true`, the outcome degrades to `SuccessUnverified` without a
    /// verify call.
    ///
    /// The cart is cleared and the pending record removed only on `Success`
    /// or `SuccessUnverified`; on `Failed` both are left intact.
    #[instrument(skip_all)]
    pub async fn resolve_return(
        &self,
        cart: &mut CartManager,
        query: &str,
    ) -> PaymentOutcome {
        let params = ReturnParams::from_query(query);
        let pending: Option<PendingPayment> =
            store::read_json(self.store.as_ref(), keys::PENDING_PAYMENT);

        let session_id = params
            .session_id
            .clone()
            .or_else(|| pending.as_ref().map(|p| p.session_id.clone()));
        let order_id = pending
            .as_ref()
            .map(|p| p.order_id.clone())
            .or_else(|| params.order_id.clone());

        match (session_id, order_id) {
            (Some(session_id), Some(order_id)) => {
                self.verify(cart, session_id, order_id).await
            }
            (session_id, order_id) if params.success => {
                if session_id.is_none() && order_id.is_none() {
                    return PaymentOutcome::Failed {
                        message: "no payment information found".to_string(),
                    };
                }
                warn!("redirect reports success but identifiers are incomplete");
                self.settle(cart);
                PaymentOutcome::SuccessUnverified { order_id }
            }
            _ => PaymentOutcome::Failed {
                message: "no payment information found".to_string(),
            },
        }
    }

    /// Read the pending record for the cancel page. Display only; nothing is
    /// cleared, so retrying checkout finds the cart and record intact.
    #[must_use]
    pub fn cancelled_payment(&self) -> Option<PendingPayment> {
        store::read_json(self.store.as_ref(), keys::PENDING_PAYMENT)
    }

    async fn verify(
        &self,
        cart: &mut CartManager,
        session_id: SessionId,
        order_id: OrderId,
    ) -> PaymentOutcome {
        let request = VerifyCheckoutRequest {
            session_id,
            order_id: order_id.clone(),
        };

        match self.api.verify_checkout_session(&request, None).await {
            Ok(response) if response.is_verified() => {
                info!(order_id = %order_id, "payment verified");
                self.settle(cart);
                PaymentOutcome::Success { order_id }
            }
            Ok(response) => {
                warn!(status = %response.status, "payment verification rejected");
                PaymentOutcome::Failed {
                    message: response
                        .message
                        .unwrap_or_else(|| "payment verification failed".to_string()),
                }
            }
            Err(err) => {
                warn!(error = %err, "payment verification call failed");
                PaymentOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Positive outcome housekeeping: empty the cart and drop the pending
    /// record.
    fn settle(&self, cart: &mut CartManager) {
        cart.clear();
        store::remove(self.store.as_ref(), keys::PENDING_PAYMENT);
    }

    fn callback_url(&self, path: &str) -> String {
        self.origin
            .join(path)
            .map_or_else(|_| format!("{}{path}", self.origin), |u| u.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn bridge_with_store() -> (PaymentBridge, SharedStore) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let bridge = PaymentBridge::new(
            ApiClient::new(Url::parse("http://localhost:9").unwrap()),
            Arc::clone(&store),
            Url::parse("https://shop.example.com/").unwrap(),
        );
        (bridge, store)
    }

    fn pending(session: &str, order: &str) -> PendingPayment {
        PendingPayment {
            payment_id: None,
            session_id: SessionId::new(session),
            order_id: OrderId::new(order),
            order_number: Some("1042".to_string()),
            total_amount: "23.50".parse().unwrap(),
            expires_at: None,
        }
    }

    #[test]
    fn callback_urls_derive_from_origin() {
        let (bridge, _) = bridge_with_store();
        assert_eq!(
            bridge.callback_url("payment/success"),
            "https://shop.example.com/payment/success"
        );
    }

    #[tokio::test]
    async fn url_only_success_fallback_settles_unverified() {
        // No pending record, URL carries session_id and success=true but no
        // order id: degrade to unverified success without calling verify.
        let (bridge, store) = bridge_with_store();
        let mut cart = CartManager::load(Arc::clone(&store));

        let outcome = bridge
            .resolve_return(&mut cart, "session_id=cs_test_abc&success=true")
            .await;

        assert_eq!(
            outcome,
            PaymentOutcome::SuccessUnverified { order_id: None }
        );
        assert_eq!(outcome.status(), PaymentStatus::SuccessUnverified);
        assert!(cart.is_empty());
        assert_eq!(store.get(keys::PENDING_PAYMENT).unwrap(), None);
    }

    #[tokio::test]
    async fn success_flag_with_order_id_only_is_unverified() {
        let (bridge, _store) = bridge_with_store();
        let mut cart = CartManager::load(Arc::new(MemoryStore::new()));

        let outcome = bridge
            .resolve_return(&mut cart, "order_id=ord_7&success=true")
            .await;

        assert_eq!(
            outcome,
            PaymentOutcome::SuccessUnverified {
                order_id: Some(OrderId::new("ord_7")),
            }
        );
    }

    #[tokio::test]
    async fn bare_return_with_no_identifiers_fails_without_mutating() {
        let (bridge, store) = bridge_with_store();
        store.set(keys::CART, "[]").unwrap();
        let mut cart = CartManager::load(Arc::clone(&store));

        let outcome = bridge.resolve_return(&mut cart, "").await;

        assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
        assert_eq!(outcome.status(), PaymentStatus::Failed);
        // Neither the cart record nor anything else was touched.
        assert!(store.get(keys::CART).unwrap().is_some());
    }

    #[tokio::test]
    async fn success_flag_alone_still_fails() {
        let (bridge, _store) = bridge_with_store();
        let mut cart = CartManager::load(Arc::new(MemoryStore::new()));

        let outcome = bridge.resolve_return(&mut cart, "success=true").await;
        assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn failed_verify_call_retains_pending_record() {
        // Both identifiers are present so verify is attempted; against an
        // unroutable backend it fails, which must leave everything intact
        // for a retry.
        let (bridge, store) = bridge_with_store();
        store::write_json(store.as_ref(), keys::PENDING_PAYMENT, &pending("cs_1", "ord_1"));
        let mut cart = CartManager::load(Arc::clone(&store));

        let outcome = bridge.resolve_return(&mut cart, "").await;

        assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
        assert!(store.get(keys::PENDING_PAYMENT).unwrap().is_some());
    }

    #[test]
    fn cancel_page_read_is_non_destructive() {
        let (bridge, store) = bridge_with_store();
        store::write_json(store.as_ref(), keys::PENDING_PAYMENT, &pending("cs_9", "ord_9"));

        let shown = bridge.cancelled_payment().unwrap();
        assert_eq!(shown.order_number.as_deref(), Some("1042"));
        assert!(store.get(keys::PENDING_PAYMENT).unwrap().is_some());
    }
}
