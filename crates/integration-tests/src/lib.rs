//! Integration tests for Tavola.
//!
//! Each test wires a full [`Storefront`] session against an `httpmock`
//! server standing in for the remote REST backend, plus an in-memory
//! persistent store. This exercises the real wire codec and the real
//! cross-component choreography (cart clearing, pending-payment records,
//! auth gating) without a network or a browser.
//!
//! Run with: `cargo test -p tavola-integration-tests`

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use url::Url;

use tavola_core::UserId;
use tavola_storefront::api::types::{AuthResponse, Product, TokenPair, UserProfile};
use tavola_storefront::cart::CartItem;
use tavola_storefront::config::StorefrontConfig;
use tavola_storefront::session::Storefront;
use tavola_storefront::store::{MemoryStore, SharedStore};

/// A storefront session wired to a mock backend over an inspectable store.
pub struct TestContext {
    pub server: MockServer,
    pub shop: Storefront,
    pub store: SharedStore,
}

impl TestContext {
    /// Start a mock backend and open a session against it.
    #[must_use]
    pub fn start() -> Self {
        init_tracing();
        let server = MockServer::start();
        let store: SharedStore = Arc::new(MemoryStore::new());
        let config = test_config(&server.base_url());
        let shop = Storefront::with_store(&config, Arc::clone(&store));
        Self { server, shop, store }
    }

    /// Install an authenticated session without a network round trip.
    pub fn log_in(&mut self, email: &str) {
        self.shop.federated_login_success(auth_response(email));
    }

    /// Put one unit of a sample product in the cart.
    pub fn add_sample_item(&mut self) {
        self.shop
            .cart_mut()
            .add(CartItem::from_product(&sample_product()));
    }
}

/// Route storefront tracing through the test harness, honoring `RUST_LOG`.
/// Safe to call from every test; only the first call installs.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Config pointed at the mock backend. The data dir is unused by the
/// in-memory store.
#[must_use]
pub fn test_config(api_base_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        api_base_url: Url::parse(api_base_url).expect("mock server URL is valid"),
        origin: Url::parse("https://shop.example.com/").expect("static URL is valid"),
        data_dir: std::env::temp_dir().join("tavola-test"),
        google_client_id: None,
        google_ready_timeout: Duration::from_secs(1),
    }
}

/// A minimal in-stock product.
#[must_use]
pub fn sample_product() -> Product {
    Product {
        id: "prod_margherita".into(),
        name: "Margherita".to_string(),
        description: Some("Tomato, mozzarella, basil".to_string()),
        price: "9.50".parse().expect("static decimal is valid"),
        image: None,
        category: Some("cat_pizza".into()),
        variants: Vec::new(),
        available: true,
    }
}

/// A token/profile pair as the auth endpoints would return it.
#[must_use]
pub fn auth_response(email: &str) -> AuthResponse {
    AuthResponse {
        tokens: TokenPair {
            access: "test-access-token".to_string(),
            refresh: Some("test-refresh-token".to_string()),
        },
        user: UserProfile {
            id: UserId::new("usr_test"),
            email: email.to_string(),
            name: Some("Test User".to_string()),
        },
    }
}

/// Backend order JSON with the given id and status.
#[must_use]
pub fn order_json(order_id: &str, status: &str) -> String {
    format!(
        r#"{{
            "id": "{order_id}",
            "order_number": "1042",
            "status": "{status}",
            "order_type": "pickup",
            "total_amount": "9.50",
            "items": [],
            "created_at": "2026-08-29T12:00:00Z"
        }}"#
    )
}

/// Backend auth-response JSON as the login endpoints produce it.
#[must_use]
pub fn auth_json(email: &str) -> String {
    format!(
        r#"{{
            "tokens": {{"access": "test-access-token", "refresh": "test-refresh-token"}},
            "user": {{"id": "usr_test", "email": "{email}", "name": "Test User"}}
        }}"#
    )
}
