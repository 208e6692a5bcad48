//! Route definitions for the `/auth` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Auth routes mounted at `/auth`.
///
/// ```text
/// POST /verify   -> verify (public; exchanges an asserted identity for a token)
/// GET  /me       -> me
/// PUT  /profile  -> update_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(auth::verify))
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile))
}
