//! Field validation for the write surface.
//!
//! Every mutating endpoint validates its payload through these functions
//! before touching the store, so limits live in exactly one place. The
//! normalize_* variants also return the canonical form that gets stored
//! (trimmed, and lowercased where the field is case-insensitive).

use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field limits
// ---------------------------------------------------------------------------

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 100;

pub const DESCRIPTION_MIN_LEN: usize = 10;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// Projects carry between 1 and 10 tags.
pub const MAX_TAGS: usize = 10;
pub const TAG_MAX_LEN: usize = 30;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

pub const COMMENT_MAX_LEN: usize = 1000;

pub const DISPLAY_NAME_MIN_LEN: usize = 2;
pub const DISPLAY_NAME_MAX_LEN: usize = 50;
pub const BIO_MAX_LEN: usize = 500;

pub const MAX_SKILLS: usize = 20;
pub const SKILL_MAX_LEN: usize = 30;

/// GitHub caps usernames at 39 characters.
pub const GITHUB_USERNAME_MAX_LEN: usize = 39;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// A repository URL must point at github.com (http or https, www optional).
pub const GITHUB_REPO_URL_PATTERN: &str = r"^https?://(www\.)?github\.com/.+";

/// GitHub usernames: alphanumeric with single interior hyphens. Length is
/// checked separately against [`GITHUB_USERNAME_MAX_LEN`].
pub const GITHUB_USERNAME_PATTERN: &str = r"^[a-zA-Z0-9](?:-?[a-zA-Z0-9])*$";

static GITHUB_REPO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GITHUB_REPO_URL_PATTERN).expect("valid regex"));

static GITHUB_USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GITHUB_USERNAME_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Project fields
// ---------------------------------------------------------------------------

/// Validate a project title (3-100 characters after trimming).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.len() < TITLE_MIN_LEN || trimmed.len() > TITLE_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a project description (10-2000 characters after trimming).
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    let trimmed = description.trim();
    if trimmed.len() < DESCRIPTION_MIN_LEN || trimmed.len() > DESCRIPTION_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Description must be between {DESCRIPTION_MIN_LEN} and {DESCRIPTION_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a GitHub repository URL.
pub fn validate_github_url(url: &str) -> Result<(), CoreError> {
    if !GITHUB_REPO_URL_RE.is_match(url.trim()) {
        return Err(CoreError::Validation(
            "GitHub URL must be a valid github.com repository link".into(),
        ));
    }
    Ok(())
}

/// Validate an optional URL field. Empty input passes; anything else must
/// be a well-formed URL. `field` names the offender in the error message.
pub fn validate_optional_url(field: &str, url: &str) -> Result<(), CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.validate_url() {
        return Ok(());
    }
    Err(CoreError::Validation(format!("{field} must be a valid URL")))
}

/// Validate and normalize a project tag list.
///
/// Requires 1 to 10 tags, each 1-30 characters after trimming. Returns the
/// canonical stored form: trimmed and lowercased, order and duplicates
/// preserved exactly as submitted.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, CoreError> {
    if tags.is_empty() || tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "Projects must have between 1 and {MAX_TAGS} tags"
        )));
    }
    let mut normalized = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || trimmed.len() > TAG_MAX_LEN {
            return Err(CoreError::Validation(format!(
                "Each tag must be between 1 and {TAG_MAX_LEN} characters"
            )));
        }
        normalized.push(trimmed.to_lowercase());
    }
    Ok(normalized)
}

// ---------------------------------------------------------------------------
// Engagement fields
// ---------------------------------------------------------------------------

/// Validate a star rating (integer 1-5).
pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Validate comment content (1-1000 characters after trimming).
pub fn validate_comment_content(content: &str) -> Result<(), CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.len() > COMMENT_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Comment must be between 1 and {COMMENT_MAX_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// User fields
// ---------------------------------------------------------------------------

/// Validate a display name (2-50 characters after trimming).
pub fn validate_display_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.len() < DISPLAY_NAME_MIN_LEN || trimmed.len() > DISPLAY_NAME_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Display name must be between {DISPLAY_NAME_MIN_LEN} and {DISPLAY_NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a profile bio (at most 500 characters; empty is fine).
pub fn validate_bio(bio: &str) -> Result<(), CoreError> {
    if bio.trim().len() > BIO_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Bio must be at most {BIO_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a GitHub username. Empty input passes (the field is optional).
pub fn validate_github_username(username: &str) -> Result<(), CoreError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.len() > GITHUB_USERNAME_MAX_LEN || !GITHUB_USERNAME_RE.is_match(trimmed) {
        return Err(CoreError::Validation(
            "GitHub username must be a valid GitHub handle".into(),
        ));
    }
    Ok(())
}

/// Validate and normalize a skills list (at most 20 entries, each 1-30
/// characters after trimming). Returns the trimmed form.
pub fn normalize_skills(skills: &[String]) -> Result<Vec<String>, CoreError> {
    if skills.len() > MAX_SKILLS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_SKILLS} skills are allowed"
        )));
    }
    let mut normalized = Vec::with_capacity(skills.len());
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() || trimmed.len() > SKILL_MAX_LEN {
            return Err(CoreError::Validation(format!(
                "Each skill must be between 1 and {SKILL_MAX_LEN} characters"
            )));
        }
        normalized.push(trimmed.to_string());
    }
    Ok(normalized)
}

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation("Email must be a valid address".into()));
    }
    Ok(())
}

/// Validate that a required string field is present and non-blank.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
