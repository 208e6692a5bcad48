//! Handlers for the `/auth` resource (verify, me, profile).
//!
//! There is no password flow: the identity provider authenticates the
//! user externally, and `/auth/verify` exchanges the asserted identity
//! for a session token of our own.

use axum::extract::State;
use axum::Json;
use peerhub_core::error::CoreError;
use peerhub_core::types::{DbId, Timestamp};
use peerhub_core::validation;
use peerhub_db::models::user::{UpdateProfile, User, VerifiedIdentity};
use peerhub_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/verify`.
///
/// Fields default to empty so that absence surfaces as a field-named
/// validation error instead of a body-deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Stable subject id asserted by the identity provider.
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
}

/// Request body for `PUT /auth/profile`. Absent fields keep their stored
/// values, except `skills` where absence clears the list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub website: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// The caller's own profile, as returned by the auth endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: DbId,
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub github_username: String,
    pub website: String,
    pub skills: Vec<String>,
    pub joined_at: Timestamp,
}

/// Response body for `POST /auth/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Response body for `GET /auth/me`: the profile plus favorite project ids.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub favorites: Vec<DbId>,
}

fn profile_of(user: User) -> UserProfile {
    UserProfile {
        id: user.id,
        subject: user.subject,
        email: user.email,
        display_name: user.display_name,
        photo_url: user.photo_url,
        bio: user.bio,
        github_username: user.github_username,
        website: user.website,
        skills: user.skills,
        joined_at: user.joined_at,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/verify
///
/// Upsert a user from an externally-verified identity and issue an access
/// token. Repeat calls for the same subject update the row in place.
pub async fn verify(
    State(state): State<AppState>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<VerifyResponse>> {
    // 1. Required identity fields.
    validation::validate_required("Subject", &input.subject)?;
    validation::validate_required("Email", &input.email)?;
    validation::validate_required("Display name", &input.display_name)?;
    validation::validate_email(input.email.trim())?;

    // 2. Create or refresh the user row. Email is stored lowercased so
    //    the uniqueness constraint is case-insensitive in practice.
    let identity = VerifiedIdentity {
        subject: input.subject.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        display_name: input.display_name.trim().to_string(),
        photo_url: input.photo_url,
    };
    let user = UserRepo::upsert_identity(&state.pool, &identity).await?;

    // 3. Issue the access token.
    let token = generate_access_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User signed in");

    Ok(Json(VerifyResponse {
        token,
        user: profile_of(user),
    }))
}

/// GET /api/v1/auth/me
///
/// The caller's own profile, including favorite project ids.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let favorites = UserRepo::favorite_project_ids(&state.pool, auth.user_id).await?;

    Ok(Json(MeResponse {
        profile: profile_of(user),
        favorites,
    }))
}

/// PUT /api/v1/auth/profile
///
/// Update the caller's editable profile fields.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    // 1. The row must still exist; absent display name falls back to it.
    let current = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    // 2. Validate the submitted fields.
    let display_name = input.display_name.unwrap_or(current.display_name);
    validation::validate_display_name(&display_name)?;
    if let Some(bio) = &input.bio {
        validation::validate_bio(bio)?;
    }
    if let Some(github_username) = &input.github_username {
        validation::validate_github_username(github_username)?;
    }
    if let Some(website) = &input.website {
        validation::validate_optional_url("Website", website)?;
    }
    let skills = match &input.skills {
        Some(raw) => Some(validation::normalize_skills(raw)?),
        None => None,
    };

    // 3. Persist.
    let dto = UpdateProfile {
        display_name,
        bio: input.bio,
        github_username: input.github_username,
        website: input.website,
        skills,
    };
    let user = UserRepo::update_profile(&state.pool, auth.user_id, &dto)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(profile_of(user)))
}
