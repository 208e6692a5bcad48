//! Repository for the `comments` table.

use sqlx::PgPool;

use peerhub_core::types::DbId;

use crate::models::comment::{Comment, CommentWithAuthor, CreateComment};

/// Column list for single-table `comments` queries and RETURNING clauses.
const COLUMNS: &str = "\
    id, project_id, author_id, content, parent_comment_id, \
    edited, edited_at, created_at";

/// Column list for reads that join the author (aliases `c` and `u`).
const COLUMNS_WITH_AUTHOR: &str = "\
    c.id, c.project_id, c.author_id, c.content, c.parent_comment_id, \
    c.edited, c.edited_at, c.created_at, \
    u.display_name AS author_display_name, \
    u.photo_url AS author_photo_url";

/// Provides comment operations, including the cascade removal that
/// follows a project delete.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment.
    pub async fn create(pool: &PgPool, dto: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (project_id, author_id, content, parent_comment_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(dto.project_id)
            .bind(dto.author_id)
            .bind(&dto.content)
            .bind(dto.parent_comment_id)
            .fetch_one(pool)
            .await
    }

    /// Find a comment with its author summary.
    pub async fn find_with_author(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_WITH_AUTHOR} FROM comments c \
             JOIN users u ON u.id = c.author_id \
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CommentWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All comments on a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_WITH_AUTHOR} FROM comments c \
             JOIN users u ON u.id = c.author_id \
             WHERE c.project_id = $1 \
             ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, CommentWithAuthor>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Whether a comment exists. Used to validate the parent reference
    /// of a reply before insert.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Remove all comments on a project. Returns the number removed so
    /// the caller can log the cascade.
    pub async fn delete_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE project_id = $1")
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
