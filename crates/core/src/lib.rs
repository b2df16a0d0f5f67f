//! Tavola Core - Shared domain types.
//!
//! This crate provides the common types used across the Tavola storefront
//! engine:
//! - `storefront` - the session-state library driving cart, checkout, and auth
//! - `integration-tests` - end-to-end flow tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses,
//!   plus the lenient decimal wire codec

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
