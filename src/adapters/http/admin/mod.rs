//! Administrative endpoints.
//!
//! Every route requires a resolved caller; role checks happen in the
//! application handlers so the rules hold for every entry point.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::admin_routes;
