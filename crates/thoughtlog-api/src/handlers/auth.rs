//! Account handlers: registration, login, password and email changes

use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::auth::{hash_password, issue_token, verify_password, Identity};
use crate::error::{AppError, MessageResponse, EMAIL_EXISTS, INVALID_CREDENTIALS, USER_NOT_FOUND};
use crate::state::AppState;
use crate::validation::{
    EmailUpdateRequest, LoginRequest, PasswordUpdateRequest, RegisterRequest, ValidatedJson,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thoughtlog_core::{NewUser, StoreError};
use utoipa::ToSchema;

/// Login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Value for the `auth-token` header
    pub token: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 409, description = "Email already exists", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = body.name.unwrap_or_default();
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    let ip_address = extract_ip_address(&headers);

    let reject_duplicate = |email: String| {
        audit_log(&AuditEvent::RegistrationFailure {
            email,
            reason: "email already registered".to_string(),
            ip_address: ip_address.clone(),
        });
        AppError::Conflict(EMAIL_EXISTS)
    };

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(reject_duplicate(email));
    }

    let password_hash = hash_password(&password, &state.password)?;
    let user = match state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent registration
        Err(StoreError::DuplicateEmail(email)) => return Err(reject_duplicate(email)),
        Err(e) => return Err(e.into()),
    };

    audit_log(&AuditEvent::RegistrationSuccess {
        user_id: user.id,
        email: user.email.clone(),
        ip_address,
    });

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Created user {} successfully.",
            user.id
        ))),
    ))
}

/// Exchange credentials for a token
///
/// Served on both GET and POST.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 403, description = "Invalid email or password", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let reject = |reason: &str| {
        audit_log(&AuditEvent::LoginFailure {
            email: email.clone(),
            reason: reason.to_string(),
            ip_address: extract_ip_address(&headers),
            user_agent: extract_user_agent(&headers),
        });
        AppError::Forbidden(INVALID_CREDENTIALS)
    };

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        return Err(reject("unknown email"));
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(reject("wrong password"));
    }

    let token = issue_token(&state.jwt, user.id, user.admin)?;

    audit_log(&AuditEvent::LoginSuccess {
        user_id: user.id,
        email: user.email,
        ip_address: extract_ip_address(&headers),
        user_agent: extract_user_agent(&headers),
    });

    Ok(Json(TokenResponse { token }))
}

/// Change the caller's password and revoke the presenting token
///
/// A wrong current password is also reported as "User not found.".
#[utoipa::path(
    put,
    path = "/api/auth/changePassword",
    tag = "auth",
    request_body = PasswordUpdateRequest,
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = MessageResponse),
        (status = 404, description = "User not found or wrong password", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    )
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<PasswordUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let current = body.current_password.unwrap_or_default();
    let new_password = body.new_password.unwrap_or_default();

    let user = state
        .store
        .find_user(identity.user_id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    if !verify_password(&current, &user.password_hash)? {
        return Err(AppError::NotFound(USER_NOT_FOUND));
    }

    let password_hash = hash_password(&new_password, &state.password)?;
    // The old credential stays valid unless the token is revoked.
    state.store.revoke_token(&identity.token).await?;
    state
        .store
        .update_user_password(user.id, &password_hash)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    audit_log(&AuditEvent::PasswordChange {
        user_id: user.id,
        ip_address: extract_ip_address(&headers),
    });

    Ok(Json(MessageResponse::new("Password changed please relogin.")))
}

/// Change the caller's email and revoke the presenting token
#[utoipa::path(
    put,
    path = "/api/auth/changeEmail",
    tag = "auth",
    request_body = EmailUpdateRequest,
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Email changed", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 409, description = "Email already exists", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    )
)]
pub async fn change_email(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<EmailUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_email = body.new_email.unwrap_or_default();

    let user = state
        .store
        .find_user(identity.user_id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    if let Some(owner) = state.store.find_user_by_email(&new_email).await? {
        if owner.id != user.id {
            return Err(AppError::Conflict(EMAIL_EXISTS));
        }
    }

    // The old credential stays valid unless the token is revoked.
    state.store.revoke_token(&identity.token).await?;
    state
        .store
        .update_user_email(user.id, &new_email)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    audit_log(&AuditEvent::EmailChange {
        user_id: user.id,
        new_email,
        ip_address: extract_ip_address(&headers),
    });

    Ok(Json(MessageResponse::new("Email changed please relogin.")))
}
