//! Business logic for authentication, tickets, comments, and user accounts.
//!
//! Services are synchronous functions over the [`Store`] trait. The acting
//! identity and, on every stamping path, the current time are explicit
//! parameters; there is no ambient current-user state and no hidden clock.

pub mod auth_service;
pub mod comment_service;
pub mod ticket_service;
pub mod token_service;
pub mod user_service;

use uuid::Uuid;

use crate::errors::TtError;
use crate::models::{Comment, Ticket, User};
use crate::store::Store;

pub(crate) fn require_user(store: &dyn Store, id: Uuid) -> Result<User, TtError> {
    store
        .get_user(id)?
        .ok_or_else(|| TtError::NotFound(format!("User not found with id: {}", id)))
}

pub(crate) fn require_ticket(store: &dyn Store, id: Uuid) -> Result<Ticket, TtError> {
    store
        .get_ticket(id)?
        .ok_or_else(|| TtError::NotFound(format!("Ticket not found with id: {}", id)))
}

pub(crate) fn require_comment(store: &dyn Store, id: Uuid) -> Result<Comment, TtError> {
    store
        .get_comment(id)?
        .ok_or_else(|| TtError::NotFound(format!("Comment not found with id: {}", id)))
}
