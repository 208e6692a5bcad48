//! Project entity model, read projections, and DTOs.

use sqlx::FromRow;

use peerhub_core::listing::{ProjectSort, SortOrder};
use peerhub_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status values
// ---------------------------------------------------------------------------

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_ARCHIVED: &str = "archived";
pub const STATUS_PRIVATE: &str = "private";

/// All valid project statuses (mirrors the CHECK constraint).
pub const VALID_STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_ARCHIVED, STATUS_PRIVATE];

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub author_id: DbId,
    pub tags: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    pub image_url: String,
    pub views: i64,
    pub featured: bool,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project row joined with its author's public summary columns.
///
/// Produced by every read path that feeds a response; the author columns
/// are aliased `author_*` in the SELECT list.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectWithAuthor {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub author_id: DbId,
    pub tags: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    pub image_url: String,
    pub views: i64,
    pub featured: bool,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author_display_name: String,
    pub author_photo_url: String,
    pub author_github_username: String,
}

/// One row of the `project_likes` set.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LikeRow {
    pub project_id: DbId,
    pub user_id: DbId,
}

/// One row of the `project_ratings` set.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct RatingRow {
    pub project_id: DbId,
    pub user_id: DbId,
    pub rating: i16,
}

/// A tag with its usage count across active projects.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Values for a new project. Fields arrive pre-validated and normalized
/// (tags lowercased, strings trimmed).
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    pub image_url: String,
}

/// Replacement values for an existing project. Updates are full-document:
/// every editable field is written.
#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// Listing filter
// ---------------------------------------------------------------------------

/// Filter and ordering for the project listing query.
///
/// `sort: None` means the caller did not ask for an ordering, which is
/// newest-first, and lets text-search relevance lead when `search` is set.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub search: Option<String>,
    /// Lowercased tags; a project matches if it carries any of them.
    pub tags: Vec<String>,
    pub author_id: Option<DbId>,
    pub featured_only: bool,
    pub sort: Option<ProjectSort>,
    pub order: SortOrder,
}
