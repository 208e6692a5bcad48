//! Route definitions for the `/projects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Project routes mounted at `/projects`.
///
/// ```text
/// GET    /               -> list (optional auth)
/// POST   /               -> create
/// GET    /tags/popular   -> popular_tags (public)
/// GET    /{id}           -> get_by_id (optional auth)
/// PUT    /{id}           -> update (author only)
/// DELETE /{id}           -> delete (author only)
/// POST   /{id}/like      -> toggle_like
/// POST   /{id}/rate      -> rate
/// POST   /{id}/comments  -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/tags/popular", get(project::popular_tags))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/like", post(project::toggle_like))
        .route("/{id}/rate", post(project::rate))
        .route("/{id}/comments", post(project::add_comment))
}
