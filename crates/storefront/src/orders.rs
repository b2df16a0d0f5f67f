//! Order orchestration: turning a cart plus a checkout form into a remote
//! order, and the authenticated order-history view.
//!
//! Validation is fail-fast: an empty cart, a delivery order without an
//! address, a negative tip, or a missing login all reject the draft before
//! any network request. The cart is cleared only after the backend has
//! acknowledged the order, never optimistically.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use tavola_core::{OrderId, OrderType};

use crate::api::types::{
    CreateOrderRequest, DeliveryAddress, GuestContact, Order, RateOrderRequest,
};
use crate::api::{ApiClient, ApiError};
use crate::auth::AuthManager;
use crate::cart::CartManager;

/// Errors surfaced by order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order creation and history require a logged-in user.
    #[error("not authenticated")]
    Unauthenticated,

    /// Nothing in the cart to order.
    #[error("cannot create an order from an empty cart")]
    EmptyCart,

    /// A delivery order needs somewhere to deliver to.
    #[error("delivery orders require a delivery address")]
    MissingDeliveryAddress,

    /// Tips cannot be negative.
    #[error("tip amount cannot be negative")]
    NegativeTip,

    /// A submission is already in flight; resubmission must be a fresh
    /// user-initiated action after the current one settles.
    #[error("an order submission is already in progress")]
    SubmissionInFlight,

    /// The backend rejected the operation; the message is the server-provided
    /// detail when one was present.
    #[error("{0}")]
    Api(#[from] ApiError),
}

/// Submission state of the current draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    /// The last submission failed with this message. The draft is retained by
    /// the caller for resubmission.
    Failed(String),
}

/// A checkout form under construction. Transient, never persisted.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_type: OrderType,
    /// Contact details; optional when the authenticated profile supplies them.
    pub contact: Option<GuestContact>,
    /// Required iff `order_type` is delivery.
    pub delivery_address: Option<DeliveryAddress>,
    pub special_instructions: Option<String>,
    pub tip_amount: Decimal,
}

impl OrderDraft {
    /// A pickup draft with no extras.
    #[must_use]
    pub const fn pickup() -> Self {
        Self {
            order_type: OrderType::Pickup,
            contact: None,
            delivery_address: None,
            special_instructions: None,
            tip_amount: Decimal::ZERO,
        }
    }

    /// A delivery draft to the given address.
    #[must_use]
    pub const fn delivery(address: DeliveryAddress) -> Self {
        Self {
            order_type: OrderType::Delivery,
            contact: None,
            delivery_address: Some(address),
            special_instructions: None,
            tip_amount: Decimal::ZERO,
        }
    }
}

/// Sequences order creation against the cart and auth state, and serves the
/// authenticated order-history view.
pub struct OrderOrchestrator {
    api: ApiClient,
    submit_state: SubmitState,
    last_order: Option<Order>,
    history: Option<Vec<Order>>,
}

impl OrderOrchestrator {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            api,
            submit_state: SubmitState::Idle,
            last_order: None,
            history: None,
        }
    }

    /// Current submission state, for suspending the submit action.
    #[must_use]
    pub const fn submit_state(&self) -> &SubmitState {
        &self.submit_state
    }

    /// The most recently created or fetched order, if any.
    #[must_use]
    pub const fn last_order(&self) -> Option<&Order> {
        self.last_order.as_ref()
    }

    /// Create an order from the cart snapshot plus the checkout draft.
    ///
    /// The cart is cleared only after the backend acknowledges the order. On
    /// failure the cart and draft are untouched and the state moves to
    /// `Failed` with the surfaced message.
    ///
    /// # Errors
    ///
    /// Validation errors (`Unauthenticated`, `EmptyCart`,
    /// `MissingDeliveryAddress`, `NegativeTip`) fire before any network call;
    /// `SubmissionInFlight` rejects overlapping submissions; `Api` carries a
    /// backend rejection.
    #[instrument(skip_all, fields(order_type = ?draft.order_type))]
    pub async fn create_order_from_cart(
        &mut self,
        cart: &mut CartManager,
        auth: &AuthManager,
        draft: &OrderDraft,
    ) -> Result<Order, OrderError> {
        if self.submit_state == SubmitState::Submitting {
            return Err(OrderError::SubmissionInFlight);
        }
        let token = auth.token().ok_or(OrderError::Unauthenticated)?;
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        if draft.order_type == OrderType::Delivery && draft.delivery_address.is_none() {
            return Err(OrderError::MissingDeliveryAddress);
        }
        if draft.tip_amount < Decimal::ZERO {
            return Err(OrderError::NegativeTip);
        }

        let request = CreateOrderRequest {
            order_type: draft.order_type,
            contact: draft.contact.clone(),
            delivery_address: draft.delivery_address.clone(),
            special_instructions: draft.special_instructions.clone(),
            tip_amount: draft.tip_amount,
            items: cart.to_order_items(),
        };

        self.submit_state = SubmitState::Submitting;
        match self.api.create_order(&request, token).await {
            Ok(order) => {
                info!(order_id = %order.id, "order created");
                cart.clear();
                self.submit_state = SubmitState::Idle;
                self.last_order = Some(order.clone());
                self.history = None;
                Ok(order)
            }
            Err(err) => {
                warn!(error = %err, "order creation failed");
                self.submit_state = SubmitState::Failed(err.to_string());
                Err(OrderError::Api(err))
            }
        }
    }

    /// Fetch one order and cache it as the last-seen order.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without calling out when logged out, or
    /// `Api` on a backend failure.
    #[instrument(skip(self, auth), fields(order_id = %order_id))]
    pub async fn fetch_order(
        &mut self,
        auth: &AuthManager,
        order_id: &OrderId,
    ) -> Result<Order, OrderError> {
        let token = auth.token().ok_or(OrderError::Unauthenticated)?;
        let order = self.api.get_order(order_id, token).await?;
        self.last_order = Some(order.clone());
        Ok(order)
    }

    /// Fetch the user's order history, served from the in-session cache when
    /// it is warm.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without calling out when logged out, or
    /// `Api` on a backend failure.
    #[instrument(skip_all)]
    pub async fn fetch_order_history(
        &mut self,
        auth: &AuthManager,
    ) -> Result<&[Order], OrderError> {
        let token = auth.token().ok_or(OrderError::Unauthenticated)?;
        if self.history.is_none() {
            let orders = self.api.list_orders(token).await?;
            self.history = Some(orders);
        }
        Ok(self.history.as_deref().unwrap_or_default())
    }

    /// Cancel an order and refresh the cached views of it.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when logged out, or `Api` when the backend
    /// refuses the cancellation.
    #[instrument(skip(self, auth), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &mut self,
        auth: &AuthManager,
        order_id: &OrderId,
    ) -> Result<Order, OrderError> {
        let token = auth.token().ok_or(OrderError::Unauthenticated)?;
        let order = self.api.cancel_order(order_id, token).await?;
        self.absorb(order.clone());
        Ok(order)
    }

    /// Rate a delivered order.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when logged out, or `Api` when the backend
    /// rejects the rating.
    #[instrument(skip(self, auth, comment), fields(order_id = %order_id, rating))]
    pub async fn rate_order(
        &mut self,
        auth: &AuthManager,
        order_id: &OrderId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Order, OrderError> {
        let token = auth.token().ok_or(OrderError::Unauthenticated)?;
        let order = self
            .api
            .rate_order(order_id, &RateOrderRequest { rating, comment }, token)
            .await?;
        self.absorb(order.clone());
        Ok(order)
    }

    /// Drop user-scoped state. Called whenever the authenticated user changes
    /// (login as someone else, logout) so one user's history never leaks into
    /// another session.
    pub fn auth_changed(&mut self) {
        self.history = None;
        self.last_order = None;
        self.submit_state = SubmitState::Idle;
    }

    /// Fold an updated order back into the cached views.
    fn absorb(&mut self, order: Order) {
        if let Some(history) = &mut self.history
            && let Some(slot) = history.iter_mut().find(|o| o.id == order.id)
        {
            *slot = order.clone();
        }
        if self.last_order.as_ref().is_some_and(|o| o.id == order.id) || self.last_order.is_none() {
            self.last_order = Some(order);
        }
    }
}
