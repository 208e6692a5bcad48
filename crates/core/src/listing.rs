//! Listing & discovery helpers shared by the repository and API layers.
//!
//! This module owns the pure half of project listing: sort key and order
//! parsing, tag filter normalization, full-text query construction, and
//! pagination arithmetic. The repository layer turns these values into
//! SQL; nothing here touches the database.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of projects per listing page.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Maximum number of items per page, for any paginated endpoint.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of results per user-search page.
pub const DEFAULT_USER_PAGE_SIZE: i64 = 10;

/// Number of tags returned by the popular-tags endpoint.
pub const POPULAR_TAG_LIMIT: i64 = 20;

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

/// Sort key for project listings.
///
/// `TotalLikes` and `AverageRating` order by derived statistics; the
/// repository layer computes those aggregates inside the query so the
/// ordering is exact over the whole filtered set, not just the current
/// page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSort {
    #[default]
    CreatedAt,
    Views,
    TotalLikes,
    AverageRating,
}

impl ProjectSort {
    /// Parse a wire-format sort key (`createdAt`, `views`, `totalLikes`,
    /// `averageRating`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(Self::CreatedAt),
            "views" => Some(Self::Views),
            "totalLikes" => Some(Self::TotalLikes),
            "averageRating" => Some(Self::AverageRating),
            _ => None,
        }
    }
}

/// Parse an optional `sort_by` query value. Absent input yields `None`
/// (caller falls back to newest-first); unknown keys are rejected.
pub fn parse_sort(value: Option<&str>) -> Result<Option<ProjectSort>, CoreError> {
    match value {
        None => Ok(None),
        Some(raw) => ProjectSort::parse(raw)
            .map(Some)
            .ok_or_else(|| CoreError::Validation(format!("unknown sort key: {raw}"))),
    }
}

/// Sort direction. Descending unless ascending is explicitly requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Parse an optional `order` query value. Only the literal `asc` selects
/// ascending; anything else (including absence) is descending.
pub fn parse_order(value: Option<&str>) -> SortOrder {
    match value {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}

// ---------------------------------------------------------------------------
// Tag filter
// ---------------------------------------------------------------------------

/// Normalize a comma-separated tag filter into lowercase tags.
///
/// Tags are trimmed and lowercased; empty fragments are dropped. An input
/// of only commas/whitespace yields an empty vector (no tag filter).
pub fn parse_tag_filter(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Full-text query construction
// ---------------------------------------------------------------------------

/// Sanitize user input into a list of terms suitable for tsquery construction.
///
/// - Splits on whitespace.
/// - Strips non-alphanumeric characters (except `_`) from each term.
/// - Drops empty terms.
///
/// Returns `None` if the input yields no usable terms.
fn sanitize_terms(query: &str) -> Option<Vec<&str>> {
    let terms: Vec<&str> = query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() { None } else { Some(terms) }
}

/// Sanitize and convert user input into a PostgreSQL `tsquery` string.
///
/// - Whitespace-separated terms are joined with `&` (AND).
/// - Empty or whitespace-only input returns `None`; a search the index
///   cannot express is treated as no search at all.
/// - Special characters that could break tsquery parsing are stripped.
pub fn build_tsquery(query: &str) -> Option<String> {
    sanitize_terms(query).map(|terms| terms.join(" & "))
}

// ---------------------------------------------------------------------------
// Page resolution
// ---------------------------------------------------------------------------

/// A resolved, clamped page request (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Resolve raw query values against the project-listing defaults.
    pub fn resolve(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::with_default_size(page, limit, DEFAULT_PAGE_SIZE)
    }

    /// Resolve raw query values with a caller-chosen default page size.
    /// Page floors at 1; size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_default_size(page: Option<i64>, limit: Option<i64>, default_size: i64) -> Self {
        Self {
            number: page.unwrap_or(1).max(1),
            size: limit.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET for this page.
    pub fn offset(self) -> i64 {
        (self.number - 1) * self.size
    }
}

// ---------------------------------------------------------------------------
// Pagination block
// ---------------------------------------------------------------------------

/// Pagination metadata attached to every project listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_projects: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Compute the pagination block from the requested page and the total
    /// number of matching rows. A total of zero yields zero pages.
    pub fn compute(page: Page, total: i64) -> Self {
        let total_pages = (total + page.size - 1) / page.size;
        Self {
            current_page: page.number,
            total_pages,
            total_projects: total,
            has_next_page: page.number < total_pages,
            has_prev_page: page.number > 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- parse_sort ----------------------------------------------------------

    #[test]
    fn sort_keys_parse() {
        assert_eq!(ProjectSort::parse("createdAt"), Some(ProjectSort::CreatedAt));
        assert_eq!(ProjectSort::parse("views"), Some(ProjectSort::Views));
        assert_eq!(ProjectSort::parse("totalLikes"), Some(ProjectSort::TotalLikes));
        assert_eq!(
            ProjectSort::parse("averageRating"),
            Some(ProjectSort::AverageRating)
        );
    }

    #[test]
    fn sort_absent_is_none() {
        assert_matches!(parse_sort(None), Ok(None));
    }

    #[test]
    fn sort_unknown_key_is_rejected() {
        assert_matches!(parse_sort(Some("title")), Err(CoreError::Validation(_)));
        assert_matches!(parse_sort(Some("CREATEDAT")), Err(CoreError::Validation(_)));
    }

    // -- parse_order ---------------------------------------------------------

    #[test]
    fn order_asc_only_when_explicit() {
        assert_eq!(parse_order(Some("asc")), SortOrder::Asc);
        assert_eq!(parse_order(Some("desc")), SortOrder::Desc);
        assert_eq!(parse_order(Some("ASC")), SortOrder::Desc);
        assert_eq!(parse_order(None), SortOrder::Desc);
    }

    // -- parse_tag_filter ----------------------------------------------------

    #[test]
    fn tag_filter_lowercases_and_trims() {
        assert_eq!(
            parse_tag_filter("React, Rust ,webGL"),
            vec!["react", "rust", "webgl"]
        );
    }

    #[test]
    fn tag_filter_drops_empty_fragments() {
        assert_eq!(parse_tag_filter("rust,,  ,go"), vec!["rust", "go"]);
    }

    #[test]
    fn tag_filter_of_only_separators_is_empty() {
        assert!(parse_tag_filter(" , ,").is_empty());
    }

    // -- build_tsquery -------------------------------------------------------

    #[test]
    fn tsquery_single_term() {
        assert_eq!(build_tsquery("hello"), Some("hello".to_string()));
    }

    #[test]
    fn tsquery_multiple_terms_joined_with_and() {
        assert_eq!(
            build_tsquery("rust parser"),
            Some("rust & parser".to_string())
        );
    }

    #[test]
    fn tsquery_trims_special_characters() {
        assert_eq!(
            build_tsquery("hello! world?"),
            Some("hello & world".to_string())
        );
    }

    #[test]
    fn tsquery_empty_returns_none() {
        assert_eq!(build_tsquery(""), None);
        assert_eq!(build_tsquery("   "), None);
    }

    #[test]
    fn tsquery_punctuation_only_returns_none() {
        assert_eq!(build_tsquery("?!&"), None);
    }

    // -- Page ----------------------------------------------------------------

    #[test]
    fn page_defaults() {
        let page = Page::resolve(None, None);
        assert_eq!(page.number, 1);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_floors_at_one() {
        assert_eq!(Page::resolve(Some(0), None).number, 1);
        assert_eq!(Page::resolve(Some(-3), None).number, 1);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(Page::resolve(None, Some(500)).size, MAX_PAGE_SIZE);
        assert_eq!(Page::resolve(None, Some(0)).size, 1);
        assert_eq!(Page::resolve(None, Some(-10)).size, 1);
    }

    #[test]
    fn page_offset_math() {
        let page = Page::resolve(Some(3), Some(12));
        assert_eq!(page.offset(), 24);
    }

    #[test]
    fn page_custom_default_size() {
        let page = Page::with_default_size(None, None, DEFAULT_USER_PAGE_SIZE);
        assert_eq!(page.size, 10);
    }

    // -- Pagination ----------------------------------------------------------

    #[test]
    fn pagination_empty_result_set() {
        let block = Pagination::compute(Page::resolve(None, None), 0);
        assert_eq!(block.total_pages, 0);
        assert_eq!(block.total_projects, 0);
        assert!(!block.has_next_page);
        assert!(!block.has_prev_page);
    }

    #[test]
    fn pagination_partial_last_page() {
        // 13 projects at 12 per page span 2 pages.
        let block = Pagination::compute(Page::resolve(Some(1), Some(12)), 13);
        assert_eq!(block.total_pages, 2);
        assert!(block.has_next_page);
        assert!(!block.has_prev_page);
    }

    #[test]
    fn pagination_exact_boundary() {
        let block = Pagination::compute(Page::resolve(Some(2), Some(12)), 24);
        assert_eq!(block.total_pages, 2);
        assert!(!block.has_next_page);
        assert!(block.has_prev_page);
    }

    #[test]
    fn pagination_middle_page() {
        let block = Pagination::compute(Page::resolve(Some(2), Some(10)), 35);
        assert_eq!(block.current_page, 2);
        assert_eq!(block.total_pages, 4);
        assert!(block.has_next_page);
        assert!(block.has_prev_page);
    }

    #[test]
    fn pagination_page_beyond_end() {
        let block = Pagination::compute(Page::resolve(Some(9), Some(12)), 13);
        assert!(!block.has_next_page);
        assert!(block.has_prev_page);
    }
}
