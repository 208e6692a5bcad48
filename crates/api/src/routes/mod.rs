pub mod auth;
pub mod health;
pub mod project;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/verify                    exchange asserted identity for a token (public)
/// /auth/me                        caller profile with favorite ids
/// /auth/profile                   update caller profile (PUT)
///
/// /projects                       list (GET, optional auth), create (POST)
/// /projects/tags/popular          top tags across active projects (public)
/// /projects/{id}                  detail (GET), update (PUT), delete (DELETE)
/// /projects/{id}/like             toggle like (POST)
/// /projects/{id}/rate             set star rating (POST)
/// /projects/{id}/comments         add comment or reply (POST)
///
/// /users/{id}                     public profile with stats and projects
/// /users/search/{query}           user search (public)
/// /users/favorites/{project_id}   toggle favorite (POST)
/// /users/favorites/me             caller's favorited projects (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Identity exchange and the caller's own profile.
        .nest("/auth", auth::router())
        // Project listing, CRUD, and engagement.
        .nest("/projects", project::router())
        // Public profiles, search, favorites.
        .nest("/users", user::router())
}
