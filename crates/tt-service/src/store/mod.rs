//! Persistence contract for users, tickets and comments.
//!
//! Entities are arena-owned and cross-reference each other by id; resolving a
//! reference is always an explicit lookup through this trait. Mutations go
//! through closure-based update methods that commit only when the closure
//! succeeds, so an authorize-then-mutate sequence is atomic with respect to
//! the entity it targets.

mod memory;

pub use memory::InMemoryStore;

use crate::errors::TtError;
use crate::models::{Comment, Ticket, User};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub trait Store: Send + Sync {
    /// Insert a new user, enforcing username and email uniqueness.
    fn insert_user(&self, user: User) -> Result<User, TtError>;

    fn get_user(&self, id: Uuid) -> Result<Option<User>, TtError>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, TtError>;

    fn list_users(&self) -> Result<Vec<User>, TtError>;

    /// Apply `apply` to a working copy of the user under the write lock,
    /// committing only on `Ok`. Callers must not change username or email;
    /// both are immutable after insert so the identity indexes stay valid.
    fn update_user(
        &self,
        id: Uuid,
        apply: &mut dyn FnMut(&mut User) -> Result<(), TtError>,
    ) -> Result<User, TtError>;

    /// Delete a user and clean up every reference to them: their own tickets
    /// go away (with those tickets' comments), assignments pointing at them
    /// are cleared (touching `updated_at` with `now`), and comments they
    /// authored on surviving tickets are removed.
    fn delete_user(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), TtError>;

    fn insert_ticket(&self, ticket: Ticket) -> Result<Ticket, TtError>;

    fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, TtError>;

    fn list_tickets(&self) -> Result<Vec<Ticket>, TtError>;

    /// Apply `apply` to a working copy of the ticket under the write lock,
    /// committing only on `Ok`. A failed closure leaves the stored ticket
    /// untouched.
    fn update_ticket(
        &self,
        id: Uuid,
        apply: &mut dyn FnMut(&mut Ticket) -> Result<(), TtError>,
    ) -> Result<Ticket, TtError>;

    /// Delete a ticket and the comments it owns.
    fn delete_ticket(&self, id: Uuid) -> Result<(), TtError>;

    fn insert_comment(&self, comment: Comment) -> Result<Comment, TtError>;

    fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, TtError>;

    /// Comments for one ticket, newest first.
    fn comments_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<Comment>, TtError>;

    fn comment_count(&self, ticket_id: Uuid) -> Result<u64, TtError>;

    fn delete_comment(&self, id: Uuid) -> Result<(), TtError>;
}
