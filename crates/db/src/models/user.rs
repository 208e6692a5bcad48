//! User entity model and DTOs.

use sqlx::FromRow;

use peerhub_core::types::{DbId, Timestamp};

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    /// Stable identifier from the external identity provider.
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub github_username: String,
    pub website: String,
    pub skills: Vec<String>,
    pub joined_at: Timestamp,
    pub last_active_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Identity asserted by the auth provider, used to upsert a user row on
/// sign-in. `photo_url` only overwrites the stored value when non-empty.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

/// Profile fields a user can edit. `None` leaves the stored value alone,
/// except `skills` where absence clears the list.
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub display_name: String,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub website: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// A user-search result row: public profile columns plus the number of
/// active projects the user has published.
#[derive(Debug, Clone, FromRow)]
pub struct UserSearchRow {
    pub id: DbId,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub github_username: String,
    pub skills: Vec<String>,
    pub joined_at: Timestamp,
    pub project_count: i64,
}
