//! Profile handlers

use super::parse_id;
use crate::auth::Identity;
use crate::error::{AppError, MessageResponse, USER_NOT_FOUND};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thoughtlog_core::{PublicProfile, Thought, UserProfile};
use utoipa::ToSchema;

/// The caller's own profile with their thoughts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyProfileResponse {
    pub user: UserProfile,
    pub thoughts: Vec<Thought>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileResponse {
    pub user: PublicProfile,
}

#[utoipa::path(
    get,
    path = "/api/profiles/getProfiles/myProfile",
    tag = "profiles",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = MyProfileResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn my_profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .find_user(identity.user_id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;
    let thoughts = state.store.list_thoughts(user.id).await?;

    Ok(Json(MyProfileResponse {
        user: user.to_profile(),
        thoughts,
    }))
}

/// Another user's public profile (no email)
#[utoipa::path(
    get,
    path = "/api/profiles/getProfiles/{userId}",
    tag = "profiles",
    params(("userId" = String, Path, description = "User id")),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Public profile", body = PublicProfileResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    _identity: Identity,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, USER_NOT_FOUND)?;
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(PublicProfileResponse {
        user: user.to_public(),
    }))
}
