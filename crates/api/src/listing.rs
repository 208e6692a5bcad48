//! Listing service: turns raw project rows into enriched API views.
//!
//! Every read path that returns projects funnels through here so the
//! derived statistics block is computed one way only. The flow is:
//! repository fetch -> batched engagement fetch -> [`project_stats`] per
//! row -> [`ProjectView`] assembly, plus the pagination block for list
//! endpoints. Handlers never compute statistics inline.

use std::collections::HashMap;

use serde::Serialize;

use peerhub_core::listing::{Page, Pagination};
use peerhub_core::stats::{project_stats, ProjectStats, RatingEntry};
use peerhub_core::types::{DbId, Timestamp};
use peerhub_db::models::comment::CommentWithAuthor;
use peerhub_db::models::project::{LikeRow, ProjectFilter, ProjectWithAuthor, RatingRow};
use peerhub_db::repositories::ProjectRepo;
use peerhub_db::DbPool;

// ---------------------------------------------------------------------------
// Wire views
// ---------------------------------------------------------------------------

/// Public author summary attached to every project view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: DbId,
    pub display_name: String,
    pub photo_url: String,
    pub github_username: String,
}

/// A project as returned by the API: stored fields, author summary, and
/// the derived statistics block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    pub image_url: String,
    pub views: i64,
    pub featured: bool,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author: AuthorSummary,
    #[serde(flatten)]
    pub stats: ProjectStats,
}

/// Comment author summary (comments carry no github username).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: DbId,
    pub display_name: String,
    pub photo_url: String,
}

/// A comment as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: DbId,
    pub project_id: DbId,
    pub content: String,
    pub parent_comment_id: Option<DbId>,
    pub edited: bool,
    pub edited_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub author: CommentAuthor,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble a [`ProjectView`] from a joined row and its computed stats.
fn view_of(row: ProjectWithAuthor, stats: ProjectStats) -> ProjectView {
    ProjectView {
        id: row.id,
        title: row.title,
        description: row.description,
        tags: row.tags,
        github_url: row.github_url,
        live_url: row.live_url,
        image_url: row.image_url,
        views: row.views,
        featured: row.featured,
        status: row.status,
        created_at: row.created_at,
        updated_at: row.updated_at,
        author: AuthorSummary {
            id: row.author_id,
            display_name: row.author_display_name,
            photo_url: row.author_photo_url,
            github_username: row.author_github_username,
        },
        stats,
    }
}

/// Map a joined comment row onto its wire view.
pub fn comment_view(row: CommentWithAuthor) -> CommentView {
    CommentView {
        id: row.id,
        project_id: row.project_id,
        content: row.content,
        parent_comment_id: row.parent_comment_id,
        edited: row.edited,
        edited_at: row.edited_at,
        created_at: row.created_at,
        author: CommentAuthor {
            id: row.author_id,
            display_name: row.author_display_name,
            photo_url: row.author_photo_url,
        },
    }
}

/// Group flat engagement rows by project id.
fn group_engagement(
    likes: Vec<LikeRow>,
    ratings: Vec<RatingRow>,
) -> (HashMap<DbId, Vec<DbId>>, HashMap<DbId, Vec<RatingEntry>>) {
    let mut likes_by_project: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for like in likes {
        likes_by_project
            .entry(like.project_id)
            .or_default()
            .push(like.user_id);
    }

    let mut ratings_by_project: HashMap<DbId, Vec<RatingEntry>> = HashMap::new();
    for row in ratings {
        ratings_by_project
            .entry(row.project_id)
            .or_default()
            .push(RatingEntry {
                user_id: row.user_id,
                rating: row.rating,
            });
    }

    (likes_by_project, ratings_by_project)
}

/// Enrich a batch of project rows with their statistics blocks.
///
/// Engagement sets for the whole batch are fetched in two queries
/// (`project_id = ANY(...)`), then projected per row. Row order is
/// preserved.
pub async fn enrich(
    pool: &DbPool,
    rows: Vec<ProjectWithAuthor>,
    viewer: Option<DbId>,
) -> Result<Vec<ProjectView>, sqlx::Error> {
    let ids: Vec<DbId> = rows.iter().map(|p| p.id).collect();
    let likes = ProjectRepo::likes_for(pool, &ids).await?;
    let ratings = ProjectRepo::ratings_for(pool, &ids).await?;
    let (likes_by_project, ratings_by_project) = group_engagement(likes, ratings);

    let views = rows
        .into_iter()
        .map(|row| {
            let likes = likes_by_project.get(&row.id).map_or(&[][..], Vec::as_slice);
            let ratings = ratings_by_project
                .get(&row.id)
                .map_or(&[][..], Vec::as_slice);
            let stats = project_stats(likes, ratings, viewer);
            view_of(row, stats)
        })
        .collect();

    Ok(views)
}

/// Enrich a single project row.
pub async fn enrich_one(
    pool: &DbPool,
    row: ProjectWithAuthor,
    viewer: Option<DbId>,
) -> Result<ProjectView, sqlx::Error> {
    let likes: Vec<DbId> = ProjectRepo::likes_for(pool, &[row.id])
        .await?
        .into_iter()
        .map(|l| l.user_id)
        .collect();
    let ratings: Vec<RatingEntry> = ProjectRepo::ratings_for(pool, &[row.id])
        .await?
        .into_iter()
        .map(|r| RatingEntry {
            user_id: r.user_id,
            rating: r.rating,
        })
        .collect();

    let stats = project_stats(&likes, &ratings, viewer);
    Ok(view_of(row, stats))
}

/// Fetch one page of the project listing: filtered rows, statistics, and
/// the pagination block computed from the unpaged total.
pub async fn fetch_page(
    pool: &DbPool,
    filter: &ProjectFilter,
    page: Page,
    viewer: Option<DbId>,
) -> Result<(Vec<ProjectView>, Pagination), sqlx::Error> {
    let rows = ProjectRepo::list(pool, filter, page.size, page.offset()).await?;
    let total = ProjectRepo::count(pool, filter).await?;
    let projects = enrich(pool, rows, viewer).await?;
    Ok((projects, Pagination::compute(page, total)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
