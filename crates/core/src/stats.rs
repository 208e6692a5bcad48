//! Derived per-project statistics.
//!
//! Every project returned by the API carries the same derived block:
//! total likes, average rating, and the viewer's own like/rating state.
//! All four values are computed here from the raw engagement sets so that
//! list, detail, favorites, and profile responses can never disagree on
//! how a statistic is defined.

use serde::Serialize;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Engagement entries
// ---------------------------------------------------------------------------

/// One user's rating of a project. The store guarantees at most one entry
/// per (project, user) pair; re-rating replaces the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingEntry {
    pub user_id: DbId,
    pub rating: i16,
}

// ---------------------------------------------------------------------------
// Projected statistics
// ---------------------------------------------------------------------------

/// Derived, viewer-dependent statistics for one project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_likes: i64,
    /// Mean of all current rating values, rounded to one decimal place.
    /// `0.0` when the project has no ratings.
    pub average_rating: f64,
    /// Whether the viewer has liked this project. Always `false` for
    /// anonymous viewers.
    pub is_liked: bool,
    /// The viewer's own rating, or `0` when the viewer has not rated the
    /// project (or is anonymous).
    pub user_rating: i16,
}

/// Project the derived statistics for one project.
///
/// `likes` is the set of user ids that currently like the project and
/// `ratings` the current per-user rating entries. `viewer` is the
/// authenticated caller, or `None` for anonymous requests.
pub fn project_stats(likes: &[DbId], ratings: &[RatingEntry], viewer: Option<DbId>) -> ProjectStats {
    let is_liked = viewer.is_some_and(|v| likes.contains(&v));
    let user_rating = viewer
        .and_then(|v| ratings.iter().find(|r| r.user_id == v))
        .map(|r| r.rating)
        .unwrap_or(0);

    ProjectStats {
        total_likes: likes.len() as i64,
        average_rating: average_rating(ratings),
        is_liked,
        user_rating,
    }
}

/// Mean of the current rating values, rounded to one decimal place with
/// halves rounding up. An empty set yields `0.0`, never NaN.
pub fn average_rating(ratings: &[RatingEntry]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
    round_to_tenth(sum as f64 / ratings.len() as f64)
}

/// Round to one decimal place. Rating values are positive, so rounding
/// half away from zero is round-half-up here.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
