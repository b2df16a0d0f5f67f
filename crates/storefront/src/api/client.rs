//! HTTP client for the Tavola REST backend.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use tavola_core::OrderId;

use super::types::{
    AuthResponse, Category, CheckoutSessionRequest, CheckoutSessionResponse, CreateOrderRequest,
    GoogleLoginRequest, LoginRequest, Order, Product, RateOrderRequest, RegisterRequest,
    VerifyCheckoutRequest, VerifyCheckoutResponse,
};
use super::{ApiError, normalize_error_body};
use crate::query::ProductFilter;

/// Client for the Tavola backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
            }),
        }
    }

    /// Join a path onto the configured base URL.
    fn endpoint(&self, path: &str) -> String {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }

    /// Execute a GET request.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.get(self.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::decode(request.send().await?).await
    }

    /// Execute a POST request with a JSON body.
    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.post(self.endpoint(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::decode(request.send().await?).await
    }

    /// Turn a response into a typed value or a normalized error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = normalize_error_body(status.as_u16(), &body);
            tracing::debug!(status = %status, message = %message, "backend returned error");
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch all menu categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/categories/", None).await
    }

    /// Fetch products, optionally narrowed by a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    #[instrument(skip(self, filter))]
    pub async fn products(&self, filter: Option<&ProductFilter>) -> Result<Vec<Product>, ApiError> {
        let path = filter.map_or_else(
            || "/products/".to_string(),
            |f| {
                let query = f.to_query_string();
                if query.is_empty() {
                    "/products/".to_string()
                } else {
                    format!("/products/?{query}")
                }
            },
        );
        self.get(&path, None).await
    }

    /// Fetch a single product with its variants.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &str) -> Result<Product, ApiError> {
        self.get(&format!("/products/{product_id}/"), None).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or the request fails.
    #[instrument(skip(self, request, token))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        token: &str,
    ) -> Result<Order, ApiError> {
        self.post("/orders-create/", request, Some(token)).await
    }

    /// List the authenticated user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        self.get("/orders/", Some(token)).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId, token: &str) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{order_id}/"), Some(token)).await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the cancellation.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: &OrderId, token: &str) -> Result<Order, ApiError> {
        self.post(&format!("/orders/{order_id}/cancel/"), &(), Some(token))
            .await
    }

    /// Rate a delivered order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the rating.
    #[instrument(skip(self, request, token), fields(order_id = %order_id))]
    pub async fn rate_order(
        &self,
        order_id: &OrderId,
        request: &RateOrderRequest,
        token: &str,
    ) -> Result<Order, ApiError> {
        self.post(&format!("/orders/{order_id}/rate/"), request, Some(token))
            .await
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Create a hosted checkout session for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    #[instrument(skip(self, request, token))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
        token: Option<&str>,
    ) -> Result<CheckoutSessionResponse, ApiError> {
        self.post("/payment/checkout/create/", request, token).await
    }

    /// Verify a checkout session after the hosted page redirected back.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot confirm the payment.
    #[instrument(skip(self, request, token))]
    pub async fn verify_checkout_session(
        &self,
        request: &VerifyCheckoutRequest,
        token: Option<&str>,
    ) -> Result<VerifyCheckoutResponse, ApiError> {
        self.post("/payment/checkout/verify/", request, token).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login/", request, None).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if registration is rejected.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register/", request, None).await
    }

    /// Trade a Google ID token for an application session.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    #[instrument(skip(self, id_token))]
    pub async fn google_login(&self, id_token: &str) -> Result<AuthResponse, ApiError> {
        let request = GoogleLoginRequest {
            id_token: id_token.to_string(),
        };
        self.post("/auth/google/", &request, None).await
    }
}
