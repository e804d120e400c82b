//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write, query handlers read; both receive their
//! collaborators as `Arc<dyn Port>`.

pub mod handlers;

pub use handlers::*;
