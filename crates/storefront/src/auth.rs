//! Authentication: credential login, federated (Google) login, and the
//! persisted session.
//!
//! The manager holds the `{user, access token, refresh token}` triple,
//! hydrated from the store at startup and written back on every successful
//! login. A failed login never disturbs the prior state. Federated login
//! models the identity provider as an awaited one-shot future with a bounded
//! timeout instead of polling a global namespace.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use tavola_core::{Email, EmailError};

use crate::api::types::{AuthResponse, LoginRequest, RegisterRequest, TokenPair, UserProfile};
use crate::api::{ApiClient, ApiError};
use crate::store::{self, SharedStore, keys};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format, caught before any network call.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend rejected the operation.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The identity provider did not produce an ID token within the bound.
    #[error("identity provider timed out")]
    ProviderTimeout,

    /// The identity provider failed outright (script blocked, popup closed).
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// The persisted auth session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        let AuthResponse {
            tokens: TokenPair { access, refresh },
            user,
        } = response;
        Self {
            user,
            access_token: access,
            refresh_token: refresh,
        }
    }
}

/// Session authentication state.
pub struct AuthManager {
    session: Option<AuthSession>,
    store: SharedStore,
}

impl AuthManager {
    /// Create a manager hydrated from the persistent store.
    #[must_use]
    pub fn load(store: SharedStore) -> Self {
        let session = store::read_json(store.as_ref(), keys::AUTH_SESSION);
        Self { session, store }
    }

    /// Whether a user is currently authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The bearer token for privileged calls, when authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// The full session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Log in with email and password.
    ///
    /// On failure the prior state (typically unauthenticated) is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` before any network call for a
    /// malformed address, or `AuthError::Api` when the backend rejects the
    /// credentials.
    #[instrument(skip(self, api, password))]
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&AuthSession, AuthError> {
        let email = Email::parse(email)?;

        let response = api
            .login(&LoginRequest {
                email: email.into_inner(),
                password: password.to_string(),
            })
            .await?;

        Ok(self.install(response))
    }

    /// Register a new account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` before any network call for a
    /// malformed address, or `AuthError::Api` when registration is rejected.
    #[instrument(skip(self, api, password))]
    pub async fn register(
        &mut self,
        api: &ApiClient,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<&AuthSession, AuthError> {
        let email = Email::parse(email)?;

        let response = api
            .register(&RegisterRequest {
                name: name.map(ToString::to_string),
                email: email.into_inner(),
                password: password.to_string(),
            })
            .await?;

        Ok(self.install(response))
    }

    /// Log in via Google: await the provider's ID token (bounded by
    /// `ready_timeout`), then trade it for an application session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderTimeout` if the provider does not resolve
    /// in time, `AuthError::ProviderUnavailable` if it fails, or
    /// `AuthError::Api` if the backend refuses the exchange.
    #[instrument(skip(self, api, id_token))]
    pub async fn login_with_google<F>(
        &mut self,
        api: &ApiClient,
        ready_timeout: Duration,
        id_token: F,
    ) -> Result<&AuthSession, AuthError>
    where
        F: Future<Output = Result<String, AuthError>>,
    {
        let token = tokio::time::timeout(ready_timeout, id_token)
            .await
            .map_err(|_| AuthError::ProviderTimeout)??;

        let response = api.google_login(&token).await?;
        Ok(self.install(response))
    }

    /// Direct state-set path for a federated exchange that already completed
    /// out of band (the callback already traded the ID token for tokens).
    pub fn federated_login_success(&mut self, response: AuthResponse) -> &AuthSession {
        self.install(response)
    }

    /// Clear the persisted session and reset to unauthenticated.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        self.session = None;
        store::remove(self.store.as_ref(), keys::AUTH_SESSION);
    }

    /// Re-read the session from the store.
    ///
    /// This is the handler half of the browser storage-change signal: when
    /// another tab logs in or out, calling this converges this session onto
    /// the shared state without a reload.
    pub fn reload_from_store(&mut self) {
        self.session = store::read_json(self.store.as_ref(), keys::AUTH_SESSION);
    }

    fn install(&mut self, response: AuthResponse) -> &AuthSession {
        let session = AuthSession::from(response);
        store::write_json(self.store.as_ref(), keys::AUTH_SESSION, &session);
        self.session.insert(session)
    }
}
