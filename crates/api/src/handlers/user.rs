//! Handlers for the `/users` resource: public profiles, search, favorites.
//!
//! Public profiles withhold the identity subject, email, and favorites
//! list; those only ever appear on the caller's own `/auth/me`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use peerhub_core::error::CoreError;
use peerhub_core::listing::{Page, Pagination, DEFAULT_USER_PAGE_SIZE};
use peerhub_core::types::{DbId, Timestamp};
use peerhub_db::models::user::{User, UserSearchRow};
use peerhub_db::repositories::{ProjectRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::listing::{enrich, ProjectView};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Aggregate activity numbers shown on a public profile, computed over
/// the user's active projects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_projects: i64,
    pub total_likes: i64,
    pub total_views: i64,
    pub member_since: Timestamp,
}

/// A user's public profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: DbId,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub github_username: String,
    pub website: String,
    pub skills: Vec<String>,
    pub joined_at: Timestamp,
    pub last_active_at: Timestamp,
    pub stats: ProfileStats,
}

/// Response body for `GET /users/{id}`.
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub user: PublicProfile,
    pub projects: Vec<ProjectView>,
}

/// Query parameters for `GET /users/search/{query}`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One user search hit, with their active-project count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResult {
    pub id: DbId,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub github_username: String,
    pub skills: Vec<String>,
    pub joined_at: Timestamp,
    pub project_count: i64,
}

/// Pagination block for user search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total: i64,
}

/// Response body for `GET /users/search/{query}`.
#[derive(Debug, Serialize)]
pub struct UserSearchResponse {
    pub users: Vec<UserSearchResult>,
    pub pagination: SearchPagination,
}

/// Response body for `POST /users/favorites/{project_id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub is_favorited: bool,
    pub message: String,
}

fn search_result_of(row: UserSearchRow) -> UserSearchResult {
    UserSearchResult {
        id: row.id,
        display_name: row.display_name,
        photo_url: row.photo_url,
        bio: row.bio,
        github_username: row.github_username,
        skills: row.skills,
        joined_at: row.joined_at,
        project_count: row.project_count,
    }
}

fn public_profile_of(user: User, stats: ProfileStats) -> PublicProfile {
    PublicProfile {
        id: user.id,
        display_name: user.display_name,
        photo_url: user.photo_url,
        bio: user.bio,
        github_username: user.github_username,
        website: user.website,
        skills: user.skills,
        joined_at: user.joined_at,
        last_active_at: user.last_active_at,
        stats,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{id}
///
/// Public profile with aggregate stats and the user's active projects.
/// The project views are viewer-aware, so a signed-in caller sees their
/// own like and rating state on each one.
pub async fn get_profile(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<PublicProfileResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let rows = ProjectRepo::list_by_author(&state.pool, id).await?;
    let projects = enrich(&state.pool, rows, viewer.user_id()).await?;

    // Stats aggregate over the same active projects shown below them.
    let stats = ProfileStats {
        total_projects: projects.len() as i64,
        total_likes: projects.iter().map(|p| p.stats.total_likes).sum(),
        total_views: projects.iter().map(|p| p.views).sum(),
        member_since: user.joined_at,
    };

    Ok(Json(PublicProfileResponse {
        user: public_profile_of(user, stats),
        projects,
    }))
}

/// GET /api/v1/users/search/{query}
///
/// Case-insensitive match on display name, GitHub username, or skills,
/// most recently active first.
pub async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<UserSearchResponse>> {
    let page = Page::with_default_size(params.page, params.limit, DEFAULT_USER_PAGE_SIZE);

    let rows = UserRepo::search(&state.pool, &query, page.size, page.offset()).await?;
    let total = UserRepo::search_count(&state.pool, &query).await?;
    let block = Pagination::compute(page, total);

    Ok(Json(UserSearchResponse {
        users: rows.into_iter().map(search_result_of).collect(),
        pagination: SearchPagination {
            current_page: block.current_page,
            total_pages: block.total_pages,
            total,
        },
    }))
}

/// POST /api/v1/users/favorites/{project_id}
///
/// Toggle a project in the caller's favorites. The project only has to
/// exist; favoriting an archived project is allowed, it just won't show
/// up in the favorites listing until active again.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<FavoriteResponse>> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    let is_favorited = UserRepo::toggle_favorite(&state.pool, auth.user_id, project_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        is_favorited,
        "Favorite toggled"
    );

    Ok(Json(FavoriteResponse {
        is_favorited,
        message: if is_favorited {
            "Added to favorites".to_string()
        } else {
            "Removed from favorites".to_string()
        },
    }))
}

/// GET /api/v1/users/favorites/me
///
/// The caller's favorited projects as full views, most recently
/// favorited first. Only active projects appear.
pub async fn my_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<ProjectView>>> {
    let rows = ProjectRepo::favorites_of(&state.pool, auth.user_id).await?;
    let projects = enrich(&state.pool, rows, Some(auth.user_id)).await?;
    Ok(Json(projects))
}
