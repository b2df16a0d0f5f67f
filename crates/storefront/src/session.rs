//! The storefront session: one owner for cart, auth, orders, payment, and
//! catalog, wired over a shared persistent store.
//!
//! This is the embedding surface. A host constructs one `Storefront` per
//! user session; the component accessors expose the individual managers and
//! the flow methods sequence the cross-component choreography (order
//! creation clearing the cart, login changes dropping another user's order
//! history).

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::api::ApiClient;
use crate::api::types::{AuthResponse, Order};
use crate::auth::{AuthError, AuthManager};
use crate::cart::CartManager;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::orders::{OrderDraft, OrderError, OrderOrchestrator};
use crate::payment::{CheckoutRedirect, PaymentBridge, PaymentError, PaymentOutcome};
use crate::store::{FileStore, SharedStore, StoreError};

/// A complete storefront session.
pub struct Storefront {
    cart: CartManager,
    auth: AuthManager,
    orders: OrderOrchestrator,
    payment: PaymentBridge,
    catalog: CatalogClient,
    api: ApiClient,
    google_ready_timeout: Duration,
}

impl Storefront {
    /// Open a session backed by an on-disk store under the configured data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open(config: &StorefrontConfig) -> Result<Self, StoreError> {
        let store: SharedStore = Arc::new(FileStore::open(&config.data_dir)?);
        Ok(Self::with_store(config, store))
    }

    /// Open a session over an explicit store backend.
    #[must_use]
    pub fn with_store(config: &StorefrontConfig, store: SharedStore) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        Self {
            cart: CartManager::load(Arc::clone(&store)),
            auth: AuthManager::load(Arc::clone(&store)),
            orders: OrderOrchestrator::new(api.clone()),
            payment: PaymentBridge::new(api.clone(), store, config.origin.clone()),
            catalog: CatalogClient::new(api.clone()),
            api,
            google_ready_timeout: config.google_ready_timeout,
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartManager {
        &mut self.cart
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthManager {
        &self.auth
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderOrchestrator {
        &self.orders
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    #[must_use]
    pub const fn payment(&self) -> &PaymentBridge {
        &self.payment
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Flows
    // =========================================================================

    /// Create an order from the current cart. On success the cart is empty
    /// and its persistent record deleted.
    ///
    /// # Errors
    ///
    /// See [`OrderOrchestrator::create_order_from_cart`].
    pub async fn place_order(&mut self, draft: &OrderDraft) -> Result<Order, OrderError> {
        self.orders
            .create_order_from_cart(&mut self.cart, &self.auth, draft)
            .await
    }

    /// Create a hosted checkout session for an order; the caller redirects
    /// the user to the returned URL.
    ///
    /// # Errors
    ///
    /// See [`PaymentBridge::create_checkout_session`].
    pub async fn begin_checkout(&self, order: &Order) -> Result<CheckoutRedirect, PaymentError> {
        self.payment.create_checkout_session(&self.auth, order).await
    }

    /// Resolve the return redirect from the hosted payment page.
    pub async fn finish_checkout(&mut self, query: &str) -> PaymentOutcome {
        self.payment.resolve_return(&mut self.cart, query).await
    }

    /// Log in with email and password, dropping any prior user's cached
    /// order state.
    ///
    /// # Errors
    ///
    /// See [`AuthManager::login`].
    #[instrument(skip_all)]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.auth.login(&self.api, email, password).await?;
        self.orders.auth_changed();
        Ok(())
    }

    /// Register a new account and log in as it.
    ///
    /// # Errors
    ///
    /// See [`AuthManager::register`].
    #[instrument(skip_all)]
    pub async fn register(
        &mut self,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.auth.register(&self.api, name, email, password).await?;
        self.orders.auth_changed();
        Ok(())
    }

    /// Log in with a Google ID token future (resolved by the host's provider
    /// integration), bounded by the configured readiness timeout.
    ///
    /// # Errors
    ///
    /// See [`AuthManager::login_with_google`].
    #[instrument(skip_all)]
    pub async fn login_with_google<F>(&mut self, id_token: F) -> Result<(), AuthError>
    where
        F: Future<Output = Result<String, AuthError>>,
    {
        self.auth
            .login_with_google(&self.api, self.google_ready_timeout, id_token)
            .await?;
        self.orders.auth_changed();
        Ok(())
    }

    /// Install an already-exchanged federated session.
    pub fn federated_login_success(&mut self, response: AuthResponse) {
        self.auth.federated_login_success(response);
        self.orders.auth_changed();
    }

    /// Log out: the session record is deleted and cached order history is
    /// dropped. The cart survives logout.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.orders.auth_changed();
    }

    /// Converge on auth state written by another session over the same store.
    pub fn sync_auth_from_store(&mut self) {
        self.auth.reload_from_store();
        self.orders.auth_changed();
    }

    /// Fetch the authenticated user's order history.
    ///
    /// # Errors
    ///
    /// See [`OrderOrchestrator::fetch_order_history`].
    pub async fn order_history(&mut self) -> Result<&[Order], OrderError> {
        self.orders.fetch_order_history(&self.auth).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::api::types::{TokenPair, UserProfile};
    use crate::store::MemoryStore;
    use tavola_core::UserId;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            api_base_url: url::Url::parse("http://localhost:9/api").unwrap(),
            origin: url::Url::parse("https://shop.example.com/").unwrap(),
            data_dir: PathBuf::from("unused"),
            google_client_id: None,
            google_ready_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn logout_preserves_cart() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut shop = Storefront::with_store(&config(), store);

        shop.federated_login_success(AuthResponse {
            tokens: TokenPair {
                access: "tok".to_string(),
                refresh: None,
            },
            user: UserProfile {
                id: UserId::new("usr_1"),
                email: "g@example.com".to_string(),
                name: None,
            },
        });
        shop.cart_mut().add(crate::cart::CartItem::from_product(
            &crate::api::types::Product {
                id: tavola_core::ProductId::new("prod_1"),
                name: "Tiramisu".to_string(),
                description: None,
                price: "6.00".parse().unwrap(),
                image: None,
                category: None,
                available: true,
                variants: Vec::new(),
            },
        ));

        shop.logout();
        assert!(!shop.auth().is_authenticated());
        assert_eq!(shop.cart().total_items(), 1);
    }

    #[tokio::test]
    async fn history_after_logout_is_rejected_without_network() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut shop = Storefront::with_store(&config(), store);
        shop.logout();

        let result = shop.order_history().await;
        assert!(matches!(result, Err(OrderError::Unauthenticated)));
    }
}
