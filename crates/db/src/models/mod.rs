//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Join-projection structs for read paths that pull author columns
//! - `Deserialize`-free create/update DTOs (the API layer owns the wire
//!   shapes; these carry already-validated values)

pub mod comment;
pub mod project;
pub mod user;
