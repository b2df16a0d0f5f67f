//! Tavola storefront session engine.
//!
//! The client-side state of a food-delivery storefront, expressed as an
//! explicitly owned session struct rather than browser globals: a persistent
//! cart, an order orchestrator, a hosted-payment bridge, and an auth manager,
//! all speaking to a remote REST backend through [`api::ApiClient`].
//!
//! # Architecture
//!
//! - [`config`] - environment-driven configuration
//! - [`api`] - REST client and wire types for the backend
//! - [`store`] - key-value persistence (the browser `localStorage` analog)
//! - [`cart`] - in-memory cart reducer persisted on every mutation
//! - [`orders`] - checkout orchestration and auth-gated order history
//! - [`payment`] - hosted checkout session creation and return-flow verification
//! - [`auth`] - credential and federated login, token persistence
//! - [`catalog`] - cached category/product reads
//! - [`query`] - typed query-string parsing at the URL boundary
//! - [`session`] - the [`session::Storefront`] facade owning all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use tavola_storefront::config::StorefrontConfig;
//! use tavola_storefront::session::Storefront;
//!
//! let config = StorefrontConfig::from_env()?;
//! let mut shop = Storefront::open(&config)?;
//!
//! shop.login("guest@example.com", "hunter2").await?;
//! let order = shop.place_order(&draft).await?;
//! let redirect = shop.begin_checkout(&order).await?;
//! // host redirects the user to redirect.checkout_url ...
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod orders;
pub mod payment;
pub mod query;
pub mod session;
pub mod store;
