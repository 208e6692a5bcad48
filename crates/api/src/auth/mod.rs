//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation. Identity
//!   proof itself comes from the external provider; see `handlers::auth`.

pub mod jwt;
