//! Comment operations, always scoped under a ticket.
//!
//! Reading or adding comments rides on ticket visibility. Deletion is checked
//! against the comment's own author, and the comment must belong to the
//! ticket named in the path or the operation reports not-found.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::TtError;
use crate::models::{Comment, CommentResponse, UserResponse};
use crate::policy::{self, Action, Actor};
use crate::services::{require_comment, require_ticket};
use crate::store::Store;

const MAX_CONTENT_LENGTH: usize = 1000;

/// Create comment request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

/// List a ticket's comments, newest first. Visibility follows the ticket.
pub fn list_comments(
    store: &dyn Store,
    actor: &Actor,
    ticket_id: Uuid,
) -> Result<Vec<CommentResponse>, TtError> {
    let ticket = require_ticket(store, ticket_id)?;
    policy::ensure_allowed(actor, &Action::ViewTicket(&ticket))?;

    store
        .comments_for_ticket(ticket_id)?
        .iter()
        .map(|comment| comment_response(store, comment))
        .collect()
}

/// Add a comment to a ticket the actor can see.
pub fn add_comment(
    store: &dyn Store,
    actor: &Actor,
    ticket_id: Uuid,
    request: &CreateCommentRequest,
    now: DateTime<Utc>,
) -> Result<CommentResponse, TtError> {
    let content = validate_content(request)?;

    let ticket = require_ticket(store, ticket_id)?;
    policy::ensure_allowed(actor, &Action::AddComment(&ticket))?;

    let comment = store.insert_comment(Comment {
        id: Uuid::new_v4(),
        ticket_id,
        author_id: actor.id,
        content,
        internal: false,
        created_at: now,
    })?;

    tracing::info!(
        target: "tt.services.comments",
        comment_id = %comment.id,
        ticket_id = %ticket_id,
        "Comment added"
    );
    comment_response(store, &comment)
}

/// Delete a comment. Author or admin only.
///
/// The path carries both ids; a comment id that exists but hangs off a
/// different ticket is treated as missing so the path cannot be used to
/// probe other tickets' comments.
pub fn delete_comment(
    store: &dyn Store,
    actor: &Actor,
    ticket_id: Uuid,
    comment_id: Uuid,
) -> Result<(), TtError> {
    let comment = require_comment(store, comment_id)?;
    if comment.ticket_id != ticket_id {
        return Err(TtError::NotFound(format!(
            "Comment not found with id: {}",
            comment_id
        )));
    }
    policy::ensure_allowed(actor, &Action::DeleteComment(&comment))?;

    store.delete_comment(comment_id)?;
    tracing::info!(target: "tt.services.comments", comment_id = %comment_id, "Comment deleted");
    Ok(())
}

fn validate_content(request: &CreateCommentRequest) -> Result<String, TtError> {
    let content = request.content.clone().unwrap_or_default();
    let mut fields = BTreeMap::new();

    if content.trim().is_empty() {
        fields.insert("content".to_string(), "Content is required".to_string());
    } else if content.chars().count() > MAX_CONTENT_LENGTH {
        fields.insert(
            "content".to_string(),
            "Comment must not exceed 1000 characters".to_string(),
        );
    }

    if fields.is_empty() {
        Ok(content)
    } else {
        Err(TtError::ValidationFailed { fields })
    }
}

fn comment_response(store: &dyn Store, comment: &Comment) -> Result<CommentResponse, TtError> {
    match store.get_user(comment.author_id)? {
        Some(author) => Ok(CommentResponse {
            id: comment.id,
            content: comment.content.clone(),
            user: UserResponse::from(&author),
            created_at: comment.created_at,
        }),
        None => {
            tracing::error!(
                target: "tt.services.comments",
                author_id = %comment.author_id,
                "Comment author missing from store"
            );
            Err(TtError::Internal)
        }
    }
}
