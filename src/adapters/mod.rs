//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL repositories (sqlx)
//! - `in_memory` - In-process repositories for tests and local runs
//! - `mail` - Outbound mail transports
//! - `templates` - Notification template rendering
//! - `auth` - Caller identity resolution
//! - `http` - REST API (axum)

pub mod auth;
pub mod http;
pub mod in_memory;
pub mod mail;
pub mod postgres;
pub mod templates;
