//! Comment entity model and DTOs.

use sqlx::FromRow;

use peerhub_core::types::{DbId, Timestamp};

/// A comment row from the `comments` table.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub project_id: DbId,
    pub author_id: DbId,
    pub content: String,
    /// Set when the comment replies to another comment on the same
    /// project; cleared if the parent is later deleted.
    pub parent_comment_id: Option<DbId>,
    pub edited: bool,
    pub edited_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A comment row joined with its author's public summary columns.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: DbId,
    pub project_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub parent_comment_id: Option<DbId>,
    pub edited: bool,
    pub edited_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub author_display_name: String,
    pub author_photo_url: String,
}

/// Values for a new comment. Content arrives pre-validated.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub project_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub parent_comment_id: Option<DbId>,
}
