//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// User routes mounted at `/users`.
///
/// ```text
/// GET  /{id}                     -> get_profile (optional auth)
/// GET  /search/{query}           -> search (public)
/// POST /favorites/{project_id}   -> toggle_favorite
/// GET  /favorites/me             -> my_favorites
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(user::get_profile))
        .route("/search/{query}", get(user::search))
        .route("/favorites/{project_id}", post(user::toggle_favorite))
        .route("/favorites/me", get(user::my_favorites))
}
