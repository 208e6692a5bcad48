//! Domain logic for the Peer Project Hub backend.
//!
//! Pure types and functions with no I/O: the error taxonomy, the stat
//! projection applied to every returned project, listing/pagination
//! helpers, and input validation. Both the repository layer and the API
//! crate build on this crate; it has no internal dependencies.

pub mod error;
pub mod listing;
pub mod stats;
pub mod types;
pub mod validation;
