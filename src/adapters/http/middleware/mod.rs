//! HTTP middleware for axum.
//!
//! - `identity` - Resolves the caller and exposes it to handlers

pub mod identity;

pub use identity::{identity_middleware, IdentityState, RequireCaller};
