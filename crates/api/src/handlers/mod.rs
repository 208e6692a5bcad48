//! Request handlers, one submodule per resource.
//!
//! Handlers validate input with `peerhub_core::validation`, delegate
//! persistence to the repositories in `peerhub_db`, and map failures via
//! [`crate::error::AppError`]. Project-returning reads go through
//! [`crate::listing`] for view assembly.

pub mod auth;
pub mod project;
pub mod user;
