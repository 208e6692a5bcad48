//! Repository for the `projects` table and its engagement sets
//! (`project_likes`, `project_ratings`).

use sqlx::PgPool;

use peerhub_core::listing::{build_tsquery, ProjectSort};
use peerhub_core::types::DbId;

use crate::models::project::{
    CreateProject, LikeRow, Project, ProjectFilter, ProjectWithAuthor, RatingRow, TagCount,
    UpdateProject,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for single-table `projects` queries and RETURNING clauses.
const COLUMNS: &str = "\
    id, title, description, author_id, tags, github_url, live_url, \
    image_url, views, featured, status, created_at, updated_at";

/// Column list for read paths that join the author (aliases `p` and `u`).
const LISTING_COLUMNS: &str = "\
    p.id, p.title, p.description, p.author_id, p.tags, p.github_url, \
    p.live_url, p.image_url, p.views, p.featured, p.status, \
    p.created_at, p.updated_at, \
    u.display_name AS author_display_name, \
    u.photo_url AS author_photo_url, \
    u.github_username AS author_github_username";

/// tsvector over title, description, and tags. Must stay in sync with the
/// `idx_projects_search` index expression so the planner can use it.
const SEARCH_VECTOR: &str = "to_tsvector('english', \
    p.title || ' ' || p.description || ' ' || immutable_array_to_string(p.tags, ' '))";

// ---------------------------------------------------------------------------
// ProjectRepo
// ---------------------------------------------------------------------------

/// Provides CRUD, listing, and engagement operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a new project owned by `author_id`. Status defaults to
    /// `active`, views to zero.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        dto: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                 (title, description, author_id, tags, github_url, live_url, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(author_id)
            .bind(&dto.tags)
            .bind(&dto.github_url)
            .bind(&dto.live_url)
            .bind(&dto.image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a project by ID regardless of status. Mutation guards use this
    /// to tell "missing" apart from "not yours".
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project with its author summary, regardless of status.
    pub async fn find_with_author(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM projects p \
             JOIN users u ON u.id = p.author_id \
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, ProjectWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the editable fields of a project. Returns `None` if no row
    /// with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        dto: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                 title = $2, description = $3, tags = $4, github_url = $5, \
                 live_url = $6, image_url = $7, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(&dto.tags)
            .bind(&dto.github_url)
            .bind(&dto.live_url)
            .bind(&dto.image_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project. Likes and ratings go with the row (FK cascade);
    /// comments are removed separately by the caller.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump the view counter. Atomic in SQL, so concurrent detail fetches
    /// never lose an increment.
    pub async fn increment_views(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// List active projects matching `filter`, ordered and paginated.
    ///
    /// Derived sort keys (total likes, average rating) are computed inside
    /// the query, so the ordering is exact over the whole filtered set.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectWithAuthor>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx, search_idx) = build_project_filter(filter);
        let order_by = build_order_by(filter, search_idx);

        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM projects p \
             JOIN users u ON u.id = p.author_id \
             {where_clause} \
             ORDER BY {order_by} \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_filter_values(sqlx::query_as::<_, ProjectWithAuthor>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count active projects matching `filter` (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &ProjectFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _, _) = build_project_filter(filter);

        let query = format!("SELECT COUNT(*)::BIGINT FROM projects p {where_clause}");

        let q = bind_filter_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// All active projects by one author, newest first, unpaginated.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
    ) -> Result<Vec<ProjectWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM projects p \
             JOIN users u ON u.id = p.author_id \
             WHERE p.author_id = $1 AND p.status = 'active' \
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, ProjectWithAuthor>(&query)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// The active projects a user has favorited, most recently favorited
    /// first. Favorites pointing at deleted or non-active projects drop
    /// out of the join.
    pub async fn favorites_of(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProjectWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM user_favorites f \
             JOIN projects p ON p.id = f.project_id \
             JOIN users u ON u.id = p.author_id \
             WHERE f.user_id = $1 AND p.status = 'active' \
             ORDER BY f.favorited_at DESC"
        );
        sqlx::query_as::<_, ProjectWithAuthor>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// The most-used tags across active projects, with usage counts.
    pub async fn popular_tags(pool: &PgPool, limit: i64) -> Result<Vec<TagCount>, sqlx::Error> {
        sqlx::query_as::<_, TagCount>(
            "SELECT t.tag AS name, COUNT(*)::BIGINT AS count \
             FROM projects p \
             CROSS JOIN unnest(p.tags) AS t(tag) \
             WHERE p.status = 'active' \
             GROUP BY t.tag \
             ORDER BY count DESC, name ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Engagement sets
    // -----------------------------------------------------------------------

    /// Toggle a user's like on a project. Returns the new state (`true`
    /// when the like now exists).
    ///
    /// Remove-then-insert keeps racing toggles safe: both may miss the
    /// delete, but the insert is idempotent, so the pair settles on
    /// "liked" instead of erroring.
    pub async fn toggle_like(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let removed = sqlx::query(
            "DELETE FROM project_likes WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO project_likes (project_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(true)
    }

    /// Current number of likes on a project.
    pub async fn count_likes(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM project_likes WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Set or replace a user's rating of a project.
    pub async fn upsert_rating(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        rating: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_ratings (project_id, user_id, rating) VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, user_id) \
             DO UPDATE SET rating = EXCLUDED.rating, rated_at = NOW()",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(rating)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Fetch the like sets for a batch of projects.
    pub async fn likes_for(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<LikeRow>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, LikeRow>(
            "SELECT project_id, user_id FROM project_likes WHERE project_id = ANY($1)",
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await
    }

    /// Fetch the rating sets for a batch of projects.
    pub async fn ratings_for(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<RatingRow>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, RatingRow>(
            "SELECT project_id, user_id, rating FROM project_ratings WHERE project_id = ANY($1)",
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built listing queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    TextArray(Vec<String>),
}

/// Build the WHERE clause and bind values for a project listing filter.
///
/// Returns `(where_clause, bind_values, next_bind_index, search_bind_index)`.
/// The clause always begins with `WHERE` since the active-status condition
/// is unconditional. `search_bind_index` is the placeholder carrying the
/// tsquery text, so ORDER BY can reference the same parameter for ranking.
fn build_project_filter(filter: &ProjectFilter) -> (String, Vec<BindValue>, u32, Option<u32>) {
    let mut conditions: Vec<String> = vec!["p.status = 'active'".to_string()];
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut search_idx = None;

    if let Some(tsquery) = filter.search.as_deref().and_then(build_tsquery) {
        conditions.push(format!(
            "{SEARCH_VECTOR} @@ to_tsquery('english', ${bind_idx})"
        ));
        search_idx = Some(bind_idx);
        bind_idx += 1;
        bind_values.push(BindValue::Text(tsquery));
    }

    if !filter.tags.is_empty() {
        // Array overlap: a project matches if it has any of the tags.
        conditions.push(format!("p.tags && ${bind_idx}::TEXT[]"));
        bind_idx += 1;
        bind_values.push(BindValue::TextArray(filter.tags.clone()));
    }

    if let Some(author_id) = filter.author_id {
        conditions.push(format!("p.author_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(author_id));
    }

    if filter.featured_only {
        conditions.push("p.featured = TRUE".to_string());
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    (where_clause, bind_values, bind_idx, search_idx)
}

/// Build the ORDER BY key list for a listing query.
///
/// Text-search relevance leads only when the caller did not pick a sort
/// key. The trailing `created_at DESC, id DESC` keeps page boundaries
/// stable when the primary key ties.
fn build_order_by(filter: &ProjectFilter, search_idx: Option<u32>) -> String {
    let mut keys: Vec<String> = Vec::new();

    if filter.sort.is_none() {
        if let Some(idx) = search_idx {
            keys.push(format!(
                "ts_rank({SEARCH_VECTOR}, to_tsquery('english', ${idx})) DESC"
            ));
        }
    }

    let sort = filter.sort.unwrap_or_default();
    keys.push(format!("{} {}", sort_expr(sort), filter.order.as_sql()));

    if sort != ProjectSort::CreatedAt {
        keys.push("p.created_at DESC".to_string());
    }
    keys.push("p.id DESC".to_string());

    keys.join(", ")
}

/// SQL expression for a sort key. Derived keys are correlated subqueries
/// over the engagement sets.
fn sort_expr(sort: ProjectSort) -> &'static str {
    match sort {
        ProjectSort::CreatedAt => "p.created_at",
        ProjectSort::Views => "p.views",
        ProjectSort::TotalLikes => {
            "(SELECT COUNT(*) FROM project_likes l WHERE l.project_id = p.id)"
        }
        ProjectSort::AverageRating => {
            "(SELECT COALESCE(AVG(r.rating), 0) FROM project_ratings r WHERE r.project_id = p.id)"
        }
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_filter_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::TextArray(v) => q = q.bind(v.as_slice()),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_filter_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::TextArray(v) => q = q.bind(v.as_slice()),
        }
    }
    q
}
