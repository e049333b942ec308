//! Thought and reason handlers
//!
//! Every operation is scoped to the caller; another user's thought looks
//! exactly like a missing one.

use super::parse_id;
use crate::auth::Identity;
use crate::error::{AppError, MessageResponse, THOUGHTS_NOT_FOUND, THOUGHT_NOT_FOUND};
use crate::state::AppState;
use crate::validation::{ReasonRequest, ThoughtRequest, ValidatedJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thoughtlog_core::{NewReason, NewThought, Thought, ThoughtUpdate};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThoughtsResponse {
    pub thoughts: Vec<Thought>,
}

/// Record a thought for the caller
#[utoipa::path(
    post,
    path = "/api/thoughts/createThought",
    tag = "thoughts",
    request_body = ThoughtRequest,
    security(("auth_token" = [])),
    responses(
        (status = 201, description = "Thought saved", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
    )
)]
pub async fn create_thought(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    ValidatedJson(body): ValidatedJson<ThoughtRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thought = state
        .store
        .create_thought(NewThought {
            user_id: identity.user_id,
            feeling: body.feeling.unwrap_or_default(),
            cause: body.cause.unwrap_or_default(),
            justified: body.justified.unwrap_or(false),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Saved thought {} successfully.",
            thought.id
        ))),
    ))
}

/// All of the caller's thoughts
#[utoipa::path(
    get,
    path = "/api/thoughts/getThoughts",
    tag = "thoughts",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Caller's thoughts", body = ThoughtsResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "No thoughts recorded", body = MessageResponse),
    )
)]
pub async fn get_thoughts(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let thoughts = state.store.list_thoughts(identity.user_id).await?;
    if thoughts.is_empty() {
        return Err(AppError::NotFound(THOUGHTS_NOT_FOUND));
    }

    Ok(Json(ThoughtsResponse { thoughts }))
}

/// One of the caller's thoughts
#[utoipa::path(
    get,
    path = "/api/thoughts/getThoughts/{thoughtId}",
    tag = "thoughts",
    params(("thoughtId" = String, Path, description = "Thought id")),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "The thought", body = Thought),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Thought not found", body = MessageResponse),
    )
)]
pub async fn get_thought(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let thought_id = parse_id(&thought_id, THOUGHT_NOT_FOUND)?;
    let thought = state
        .store
        .find_thought(identity.user_id, thought_id)
        .await?
        .ok_or(AppError::NotFound(THOUGHT_NOT_FOUND))?;

    Ok(Json(thought))
}

/// Replace a thought's feeling and cause, and its justified flag when given
#[utoipa::path(
    put,
    path = "/api/thoughts/updateThoughts/{thoughtId}",
    tag = "thoughts",
    params(("thoughtId" = String, Path, description = "Thought id")),
    request_body = ThoughtRequest,
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Thought updated", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Thought not found", body = MessageResponse),
    )
)]
pub async fn update_thought(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(thought_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ThoughtRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thought_id = parse_id(&thought_id, THOUGHT_NOT_FOUND)?;
    let update = ThoughtUpdate {
        feeling: body.feeling.unwrap_or_default(),
        cause: body.cause.unwrap_or_default(),
        justified: body.justified,
    };

    state
        .store
        .update_thought(identity.user_id, thought_id, update)
        .await?
        .ok_or(AppError::NotFound(THOUGHT_NOT_FOUND))?;

    Ok(Json(MessageResponse::new(format!(
        "Thought {thought_id} updated successfully."
    ))))
}

/// Delete all of the caller's thoughts
#[utoipa::path(
    delete,
    path = "/api/thoughts/deleteThoughts",
    tag = "thoughts",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Thoughts deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Nothing to delete", body = MessageResponse),
    )
)]
pub async fn delete_thoughts(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.store.delete_thoughts_for_user(identity.user_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(THOUGHTS_NOT_FOUND));
    }

    tracing::debug!(user_id = %identity.user_id, deleted, "Deleted thoughts");

    Ok(Json(MessageResponse::new(format!(
        "All thoughts for user {} deleted successfully.",
        identity.user_id
    ))))
}

/// Delete one of the caller's thoughts
#[utoipa::path(
    delete,
    path = "/api/thoughts/deleteThoughts/{thoughtId}",
    tag = "thoughts",
    params(("thoughtId" = String, Path, description = "Thought id")),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Thought deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Thought not found", body = MessageResponse),
    )
)]
pub async fn delete_thought(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let thought_id = parse_id(&thought_id, THOUGHT_NOT_FOUND)?;
    state
        .store
        .delete_thought(identity.user_id, thought_id)
        .await?
        .ok_or(AppError::NotFound(THOUGHT_NOT_FOUND))?;

    Ok(Json(MessageResponse::new(format!(
        "Thought {thought_id} deleted successfully."
    ))))
}

/// Append a reason to a thought
#[utoipa::path(
    put,
    path = "/api/thoughts/updateThoughts/{thoughtId}/addReasons",
    tag = "thoughts",
    params(("thoughtId" = String, Path, description = "Thought id")),
    request_body = ReasonRequest,
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Reason added", body = MessageResponse),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Thought not found", body = MessageResponse),
    )
)]
pub async fn add_reason(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(thought_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ReasonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thought_id = parse_id(&thought_id, THOUGHT_NOT_FOUND)?;
    let reason = NewReason {
        description: body.description.unwrap_or_default(),
        is_positive: body.is_positive.unwrap_or(false),
    };

    state
        .store
        .add_reason(identity.user_id, thought_id, reason)
        .await?
        .ok_or(AppError::NotFound(THOUGHT_NOT_FOUND))?;

    Ok(Json(MessageResponse::new(format!(
        "Reason added for thought {thought_id}."
    ))))
}

/// Remove every reason from a thought
#[utoipa::path(
    put,
    path = "/api/thoughts/updateThoughts/{thoughtId}/deleteReasons",
    tag = "thoughts",
    params(("thoughtId" = String, Path, description = "Thought id")),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Reasons cleared", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Thought not found", body = MessageResponse),
    )
)]
pub async fn clear_reasons(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let thought_id = parse_id(&thought_id, THOUGHT_NOT_FOUND)?;
    if !state
        .store
        .clear_reasons(identity.user_id, thought_id)
        .await?
    {
        return Err(AppError::NotFound(THOUGHT_NOT_FOUND));
    }

    Ok(Json(MessageResponse::new(format!(
        "All reasons for thought {thought_id} deleted successfully."
    ))))
}

/// Remove one reason from a thought
///
/// Succeeds whenever the thought matches, even if the reason was already gone.
#[utoipa::path(
    put,
    path = "/api/thoughts/updateThoughts/{thoughtId}/deleteReasons/{reasonId}",
    tag = "thoughts",
    params(
        ("thoughtId" = String, Path, description = "Thought id"),
        ("reasonId" = String, Path, description = "Reason id"),
    ),
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Reason removed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 404, description = "Thought not found", body = MessageResponse),
    )
)]
pub async fn remove_reason(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path((thought_id, reason_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let thought_id = parse_id(&thought_id, THOUGHT_NOT_FOUND)?;

    // A reason id that is not a UUID names no reason, so only the thought
    // has to exist.
    let found = match Uuid::parse_str(&reason_id) {
        Ok(id) => {
            state
                .store
                .remove_reason(identity.user_id, thought_id, id)
                .await?
        }
        Err(_) => state
            .store
            .find_thought(identity.user_id, thought_id)
            .await?
            .is_some(),
    };
    if !found {
        return Err(AppError::NotFound(THOUGHT_NOT_FOUND));
    }

    Ok(Json(MessageResponse::new(format!(
        "Reason {reason_id} deleted successfully."
    ))))
}
