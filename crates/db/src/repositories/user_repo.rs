//! Repository for the `users` and `user_favorites` tables.

use sqlx::PgPool;

use peerhub_core::types::DbId;

use crate::models::user::{UpdateProfile, User, UserSearchRow, VerifiedIdentity};

/// Column list for `users` SELECT queries and RETURNING clauses.
const COLUMNS: &str = "\
    id, subject, email, display_name, photo_url, bio, github_username, \
    website, skills, joined_at, last_active_at, created_at, updated_at";

/// Match condition for user search: display name, GitHub handle, or any
/// skill contains the pattern (`$1`, case-insensitive).
const SEARCH_CONDITION: &str = "\
    u.display_name ILIKE $1 \
    OR u.github_username ILIKE $1 \
    OR EXISTS (SELECT 1 FROM unnest(u.skills) AS s(skill) WHERE s.skill ILIKE $1)";

/// Provides user account, profile, and favorites operations.
pub struct UserRepo;

impl UserRepo {
    /// Upsert a user row from a verified identity, keyed on the provider
    /// subject. Sign-in refreshes email and display name, keeps the stored
    /// photo when the provider sends none, and touches `last_active_at`.
    pub async fn upsert_identity(
        pool: &PgPool,
        identity: &VerifiedIdentity,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (subject, email, display_name, photo_url) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (subject) DO UPDATE SET \
                 email = EXCLUDED.email, \
                 display_name = EXCLUDED.display_name, \
                 photo_url = CASE \
                     WHEN EXCLUDED.photo_url <> '' THEN EXCLUDED.photo_url \
                     ELSE users.photo_url \
                 END, \
                 last_active_at = NOW(), \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&identity.subject)
            .bind(&identity.email)
            .bind(&identity.display_name)
            .bind(&identity.photo_url)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's editable profile fields. `None` keeps the stored
    /// value; an absent skills list clears it.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        dto: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                 display_name = $2, \
                 bio = COALESCE($3, bio), \
                 github_username = COALESCE($4, github_username), \
                 website = COALESCE($5, website), \
                 skills = COALESCE($6, ARRAY[]::TEXT[]), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&dto.display_name)
            .bind(dto.bio.as_deref())
            .bind(dto.github_username.as_deref())
            .bind(dto.website.as_deref())
            .bind(dto.skills.as_deref())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------------

    /// Toggle a project in the user's favorites set. Returns the new state
    /// (`true` when the favorite now exists). Same remove-then-insert
    /// scheme as likes, so concurrent toggles cannot error.
    pub async fn toggle_favorite(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let removed = sqlx::query(
            "DELETE FROM user_favorites WHERE user_id = $1 AND project_id = $2",
        )
        .bind(user_id)
        .bind(project_id)
        .execute(pool)
        .await?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO user_favorites (user_id, project_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, project_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(project_id)
        .execute(pool)
        .await?;

        Ok(true)
    }

    /// IDs of the projects the user has favorited, most recent first.
    /// May reference projects that no longer exist; read paths that
    /// return full projects filter through a join instead.
    pub async fn favorite_project_ids(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT project_id FROM user_favorites \
             WHERE user_id = $1 \
             ORDER BY favorited_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search users by display name, GitHub handle, or skill.
    pub async fn search(
        pool: &PgPool,
        query_text: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserSearchRow>, sqlx::Error> {
        let pattern = format!("%{query_text}%");
        let query = format!(
            "SELECT u.id, u.display_name, u.photo_url, u.bio, u.github_username, \
                    u.skills, u.joined_at, \
                    (SELECT COUNT(*)::BIGINT FROM projects p \
                     WHERE p.author_id = u.id AND p.status = 'active') AS project_count \
             FROM users u \
             WHERE {SEARCH_CONDITION} \
             ORDER BY u.last_active_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, UserSearchRow>(&query)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count users matching a search (for pagination metadata).
    pub async fn search_count(pool: &PgPool, query_text: &str) -> Result<i64, sqlx::Error> {
        let pattern = format!("%{query_text}%");
        let query = format!("SELECT COUNT(*)::BIGINT FROM users u WHERE {SEARCH_CONDITION}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(&pattern)
            .fetch_one(pool)
            .await
    }
}
