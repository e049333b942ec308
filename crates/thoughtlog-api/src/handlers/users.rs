//! User administration and self-service handlers

use super::parse_id;
use crate::audit::{audit_log, AuditEvent};
use crate::auth::{AdminIdentity, Identity};
use crate::error::{AppError, MessageResponse, USER_NOT_FOUND};
use crate::state::AppState;
use crate::validation::{NameUpdateRequest, ValidatedJson};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thoughtlog_core::UserSummary;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: UserSummary,
}

/// List every user (admin only)
#[utoipa::path(
    get,
    path = "/api/users/getUsers",
    tag = "users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 401, description = "Not authenticated or not an admin", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    )
)]
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminIdentity,
) -> Result<impl IntoResponse, AppError> {
    let users = state.store.list_users().await?;

    Ok(Json(UsersResponse {
        users: users.iter().map(|u| u.to_summary()).collect(),
    }))
}

/// Look up one user (admin only)
#[utoipa::path(
    get,
    path = "/api/users/getUsers/{userId}",
    tag = "users",
    params(("userId" = String, Path, description = "User id")),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Not authenticated or not an admin", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminIdentity,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, USER_NOT_FOUND)?;
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(UserResponse {
        user: user.to_summary(),
    }))
}

/// Delete any user (admin only)
///
/// The user's thoughts are left in place.
#[utoipa::path(
    delete,
    path = "/api/users/deleteUsers/{userId}",
    tag = "users",
    params(("userId" = String, Path, description = "User id")),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated or not an admin", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminIdentity(admin): AdminIdentity,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, USER_NOT_FOUND)?;
    remove_user(&state, user_id, admin.user_id).await
}

/// Delete the caller's own account
#[utoipa::path(
    delete,
    path = "/api/users/deleteUsers",
    tag = "users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn delete_self(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    remove_user(&state, identity.user_id, identity.user_id).await
}

async fn remove_user(
    state: &AppState,
    user_id: uuid::Uuid,
    deleted_by: uuid::Uuid,
) -> Result<Json<MessageResponse>, AppError> {
    let user = state
        .store
        .delete_user(user_id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    audit_log(&AuditEvent::UserDeleted {
        user_id: user.id,
        deleted_by,
    });

    Ok(Json(MessageResponse::new(format!(
        "User {} deleted successfully.",
        user.id
    ))))
}

/// Rename the caller
#[utoipa::path(
    put,
    path = "/api/users/updateName",
    tag = "users",
    request_body = NameUpdateRequest,
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Name changed", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn update_name(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    ValidatedJson(body): ValidatedJson<NameUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = body.name.unwrap_or_default();
    let user = state
        .store
        .update_user_name(identity.user_id, &name)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(MessageResponse::new(format!(
        "Changed name for user {} successfully.",
        user.id
    ))))
}
