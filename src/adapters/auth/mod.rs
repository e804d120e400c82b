//! Identity adapters.
//!
//! Implementations of the `IdentityProvider` port:
//!
//! - `header` - Trusts caller headers set by the fronting gateway

mod header;

pub use header::{HeaderIdentityProvider, ROLE_HEADER, USER_ID_HEADER};
