//! Handlers for the `/projects` resource: listing, CRUD, and engagement.
//!
//! Read paths delegate view assembly to [`crate::listing`] so every
//! returned project carries the same statistics block. Mutations guard
//! ownership before touching the row: a missing project is 404, someone
//! else's project is 403.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use peerhub_core::error::CoreError;
use peerhub_core::listing::{
    parse_order, parse_sort, parse_tag_filter, Page, Pagination, POPULAR_TAG_LIMIT,
};
use peerhub_core::stats::{average_rating, RatingEntry};
use peerhub_core::types::DbId;
use peerhub_core::validation;
use peerhub_db::models::comment::CreateComment;
use peerhub_db::models::project::{CreateProject, ProjectFilter, TagCount, UpdateProject};
use peerhub_db::repositories::{CommentRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::listing::{comment_view, enrich_one, fetch_page, CommentView, ProjectView};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Full-text search over title, description, and tags.
    pub search: Option<String>,
    /// Comma-separated tags; a project matches if it carries any of them.
    pub tags: Option<String>,
    /// Restrict to one author's projects.
    pub author: Option<DbId>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub featured: Option<bool>,
}

/// Response body for `GET /projects`.
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectView>,
    pub pagination: Pagination,
}

/// Response body for `GET /projects/{id}`: the view plus its comments.
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectView,
    pub comments: Vec<CommentView>,
}

/// Request body for `POST /projects` and `PUT /projects/{id}`.
///
/// Updates replace all editable fields, so the same shape serves both.
/// Fields default to empty so absence surfaces as a field-named
/// validation error instead of a body-deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub live_url: String,
    #[serde(default)]
    pub image_url: String,
}

/// Request body for `POST /projects/{id}/rate`.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    /// Star rating. Defaults to 0 when absent, which fails validation.
    #[serde(default)]
    pub rating: i16,
}

/// Request body for `POST /projects/{id}/comments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
    pub parent_comment_id: Option<DbId>,
}

/// Response body for `POST /projects/{id}/like`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub is_liked: bool,
    pub total_likes: i64,
}

/// Response body for `POST /projects/{id}/rate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub user_rating: i16,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// Confirmation message for `DELETE /projects/{id}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Validate a project payload and return the normalized tag list.
/// Text fields are checked here and trimmed at the call site.
fn validate_project_input(input: &ProjectRequest) -> Result<Vec<String>, AppError> {
    validation::validate_title(&input.title)?;
    validation::validate_description(&input.description)?;
    validation::validate_github_url(&input.github_url)?;
    validation::validate_optional_url("Live URL", &input.live_url)?;
    validation::validate_optional_url("Image URL", &input.image_url)?;
    let tags = validation::normalize_tags(&input.tags)?;
    Ok(tags)
}

// ---------------------------------------------------------------------------
// Listing and detail
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
///
/// Paginated listing of active projects with optional search, tag,
/// author, and featured filters. Anonymous callers get `is_liked` and
/// `user_rating` in their neutral state.
pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(params): Query<ListProjectsParams>,
) -> AppResult<Json<ProjectListResponse>> {
    let sort = parse_sort(params.sort_by.as_deref())?;
    let order = parse_order(params.order.as_deref());
    let tags = params
        .tags
        .as_deref()
        .map(parse_tag_filter)
        .unwrap_or_default();

    let filter = ProjectFilter {
        search: params.search,
        tags,
        author_id: params.author,
        featured_only: params.featured == Some(true),
        sort,
        order,
    };

    let page = Page::resolve(params.page, params.limit);
    let (projects, pagination) =
        fetch_page(&state.pool, &filter, page, viewer.user_id()).await?;

    Ok(Json(ProjectListResponse {
        projects,
        pagination,
    }))
}

/// GET /api/v1/projects/{id}
///
/// Full project view plus its comments, newest first. Only active
/// projects are visible here; anything else is 404. Each call bumps the
/// view counter, so the returned count trails this request by one.
pub async fn get_by_id(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectDetailResponse>> {
    let row = ProjectRepo::find_with_author(&state.pool, id)
        .await?
        .filter(|p| p.status == "active")
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    ProjectRepo::increment_views(&state.pool, id).await?;

    let project = enrich_one(&state.pool, row, viewer.user_id()).await?;
    let comments = CommentRepo::list_for_project(&state.pool, id)
        .await?
        .into_iter()
        .map(comment_view)
        .collect();

    Ok(Json(ProjectDetailResponse { project, comments }))
}

/// GET /api/v1/projects/tags/popular
///
/// The 20 most-used tags across active projects.
pub async fn popular_tags(State(state): State<AppState>) -> AppResult<Json<Vec<TagCount>>> {
    let tags = ProjectRepo::popular_tags(&state.pool, POPULAR_TAG_LIMIT).await?;
    Ok(Json(tags))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Create a project owned by the caller. New projects start active with
/// zero views and an empty engagement set.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectView>)> {
    // 1. Validate, normalizing tags to their stored form.
    let tags = validate_project_input(&input)?;

    // 2. Insert.
    let dto = CreateProject {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        tags,
        github_url: input.github_url.trim().to_string(),
        live_url: input.live_url.trim().to_string(),
        image_url: input.image_url.trim().to_string(),
    };
    let project = ProjectRepo::create(&state.pool, auth.user_id, &dto).await?;

    // 3. Read back with the author summary for the response view.
    let row = ProjectRepo::find_with_author(&state.pool, project.id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Project {} unreadable after insert", project.id))
        })?;
    let view = enrich_one(&state.pool, row, Some(auth.user_id)).await?;

    tracing::info!(project_id = project.id, author_id = auth.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/v1/projects/{id}
///
/// Replace the editable fields of a project. Only the author may update;
/// a missing project is 404 before the ownership check so callers can
/// tell the two cases apart.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ProjectRequest>,
) -> AppResult<Json<ProjectView>> {
    // 1. Existence, then ownership.
    let existing = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    if existing.author_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to update this project".into(),
        )));
    }

    // 2. Validate and persist.
    let tags = validate_project_input(&input)?;
    let dto = UpdateProject {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        tags,
        github_url: input.github_url.trim().to_string(),
        live_url: input.live_url.trim().to_string(),
        image_url: input.image_url.trim().to_string(),
    };
    ProjectRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    // 3. Return the refreshed view.
    let row = ProjectRepo::find_with_author(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    let view = enrich_one(&state.pool, row, Some(auth.user_id)).await?;

    tracing::info!(project_id = id, author_id = auth.user_id, "Project updated");

    Ok(Json(view))
}

/// DELETE /api/v1/projects/{id}
///
/// Remove a project and its comments. Likes, ratings, and favorites go
/// with the row via foreign keys; comments are cleaned up separately and
/// best-effort, so a failure there logs a warning instead of undoing the
/// delete.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    // 1. Existence, then ownership.
    let existing = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    if existing.author_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to delete this project".into(),
        )));
    }

    // 2. Delete the row.
    let deleted = ProjectRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }

    // 3. Cascade the comments. The project is already gone, so a failure
    //    here leaves orphans for a later sweep rather than a half-delete.
    match CommentRepo::delete_for_project(&state.pool, id).await {
        Ok(removed) => {
            tracing::info!(project_id = id, removed, "Project deleted");
        }
        Err(error) => {
            tracing::warn!(project_id = id, %error, "Comment cleanup after project delete failed");
        }
    }

    Ok(Json(MessageResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/like
///
/// Toggle the caller's like. Responds with the new state and the updated
/// total so clients can render without a refetch.
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<LikeResponse>> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let is_liked = ProjectRepo::toggle_like(&state.pool, id, auth.user_id).await?;
    let total_likes = ProjectRepo::count_likes(&state.pool, id).await?;

    tracing::info!(project_id = id, user_id = auth.user_id, is_liked, "Like toggled");

    Ok(Json(LikeResponse {
        is_liked,
        total_likes,
    }))
}

/// POST /api/v1/projects/{id}/rate
///
/// Set or replace the caller's star rating (1 to 5, one per user).
pub async fn rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RateRequest>,
) -> AppResult<Json<RatingResponse>> {
    validation::validate_rating(input.rating)?;

    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    ProjectRepo::upsert_rating(&state.pool, id, auth.user_id, input.rating).await?;

    let ratings: Vec<RatingEntry> = ProjectRepo::ratings_for(&state.pool, &[id])
        .await?
        .into_iter()
        .map(|r| RatingEntry {
            user_id: r.user_id,
            rating: r.rating,
        })
        .collect();

    tracing::info!(
        project_id = id,
        user_id = auth.user_id,
        rating = input.rating,
        "Project rated"
    );

    Ok(Json(RatingResponse {
        user_rating: input.rating,
        average_rating: average_rating(&ratings),
        total_ratings: ratings.len() as i64,
    }))
}

/// POST /api/v1/projects/{id}/comments
///
/// Add a comment, optionally as a reply. The parent only has to exist;
/// replies are not confined to the same project.
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    // 1. Validate the content and the target project.
    validation::validate_comment_content(&input.content)?;

    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    // 2. A dangling parent reference is a 404, not a raw FK error.
    if let Some(parent_id) = input.parent_comment_id {
        if !CommentRepo::exists(&state.pool, parent_id).await? {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: parent_id,
            }));
        }
    }

    // 3. Insert and read back with the author summary.
    let dto = CreateComment {
        project_id: id,
        author_id: auth.user_id,
        content: input.content.trim().to_string(),
        parent_comment_id: input.parent_comment_id,
    };
    let comment = CommentRepo::create(&state.pool, &dto).await?;
    let row = CommentRepo::find_with_author(&state.pool, comment.id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Comment {} unreadable after insert", comment.id))
        })?;

    tracing::info!(project_id = id, comment_id = comment.id, "Comment added");

    Ok((StatusCode::CREATED, Json(comment_view(row))))
}
