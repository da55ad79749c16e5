//! Comment endpoints, nested under tickets.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::TtError;
use crate::handlers::parse_body;
use crate::models::CommentResponse;
use crate::policy::Actor;
use crate::routes::AppState;
use crate::services::comment_service::{self, CreateCommentRequest};

/// List a ticket's comments, newest first.
///
/// GET /api/tickets/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, TtError> {
    let comments = comment_service::list_comments(state.store.as_ref(), &actor, ticket_id)?;
    Ok(Json(comments))
}

/// Add a comment to a ticket.
///
/// POST /api/tickets/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(ticket_id): Path<Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<CommentResponse>), TtError> {
    let request: CreateCommentRequest = parse_body(&body)?;
    let response = comment_service::add_comment(
        state.store.as_ref(),
        &actor,
        ticket_id,
        &request,
        Utc::now(),
    )?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a comment from a ticket.
///
/// DELETE /api/tickets/{id}/comments/{commentId}
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((ticket_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, TtError> {
    comment_service::delete_comment(state.store.as_ref(), &actor, ticket_id, comment_id)?;
    Ok(StatusCode::NO_CONTENT)
}
