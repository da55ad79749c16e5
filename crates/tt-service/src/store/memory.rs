//! In-memory store: one `RwLock` over all arenas.
//!
//! A single lock guards users, tickets, comments and the identity indexes so
//! cross-entity invariants (uniqueness, cascades) cannot be observed half
//! applied. Lock poisoning surfaces as an internal error, never a panic.

use crate::errors::TtError;
use crate::models::{Comment, Ticket, User};
use crate::store::Store;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Arenas {
    users: HashMap<Uuid, User>,
    username_index: HashMap<String, Uuid>,
    email_index: HashMap<String, Uuid>,
    tickets: HashMap<Uuid, Ticket>,
    comments: HashMap<Uuid, Comment>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Arenas>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Arenas>, TtError> {
        self.inner.read().map_err(|_| {
            tracing::error!(target: "tt.store", "Store lock poisoned");
            TtError::Internal
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Arenas>, TtError> {
        self.inner.write().map_err(|_| {
            tracing::error!(target: "tt.store", "Store lock poisoned");
            TtError::Internal
        })
    }
}

impl Store for InMemoryStore {
    fn insert_user(&self, user: User) -> Result<User, TtError> {
        let mut arenas = self.write()?;

        if arenas.username_index.contains_key(&user.username) {
            return Err(TtError::DuplicateIdentity(format!(
                "Username already taken: {}",
                user.username
            )));
        }
        if arenas.email_index.contains_key(&user.email) {
            return Err(TtError::DuplicateIdentity(format!(
                "Email already registered: {}",
                user.email
            )));
        }

        arenas.username_index.insert(user.username.clone(), user.id);
        arenas.email_index.insert(user.email.clone(), user.id);
        arenas.users.insert(user.id, user.clone());

        Ok(user)
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>, TtError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, TtError> {
        let arenas = self.read()?;
        let id = match arenas.username_index.get(username) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(arenas.users.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, TtError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn update_user(
        &self,
        id: Uuid,
        apply: &mut dyn FnMut(&mut User) -> Result<(), TtError>,
    ) -> Result<User, TtError> {
        let mut arenas = self.write()?;

        let mut working = arenas
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| TtError::NotFound(format!("User not found with id: {}", id)))?;

        // Username and email are immutable after insert, so the identity
        // indexes stay valid across updates.
        apply(&mut working)?;
        arenas.users.insert(id, working.clone());

        Ok(working)
    }

    fn delete_user(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), TtError> {
        let mut arenas = self.write()?;

        let user = arenas
            .users
            .remove(&id)
            .ok_or_else(|| TtError::NotFound(format!("User not found with id: {}", id)))?;

        arenas.username_index.remove(&user.username);
        arenas.email_index.remove(&user.email);

        // Tickets the user created go away, taking their comments with them
        let owned: Vec<Uuid> = arenas
            .tickets
            .values()
            .filter(|ticket| ticket.created_by == id)
            .map(|ticket| ticket.id)
            .collect();
        for ticket_id in &owned {
            arenas.tickets.remove(ticket_id);
        }
        arenas
            .comments
            .retain(|_, comment| !owned.contains(&comment.ticket_id));

        // Surviving tickets lose their assignment to the deleted user
        for ticket in arenas.tickets.values_mut() {
            if ticket.assigned_to == Some(id) {
                ticket.assigned_to = None;
                ticket.updated_at = now;
            }
        }

        // Comments the user authored on surviving tickets are removed
        arenas.comments.retain(|_, comment| comment.author_id != id);

        Ok(())
    }

    fn insert_ticket(&self, ticket: Ticket) -> Result<Ticket, TtError> {
        let mut arenas = self.write()?;
        arenas.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, TtError> {
        Ok(self.read()?.tickets.get(&id).cloned())
    }

    fn list_tickets(&self) -> Result<Vec<Ticket>, TtError> {
        Ok(self.read()?.tickets.values().cloned().collect())
    }

    fn update_ticket(
        &self,
        id: Uuid,
        apply: &mut dyn FnMut(&mut Ticket) -> Result<(), TtError>,
    ) -> Result<Ticket, TtError> {
        let mut arenas = self.write()?;

        let mut working = arenas
            .tickets
            .get(&id)
            .cloned()
            .ok_or_else(|| TtError::NotFound(format!("Ticket not found with id: {}", id)))?;

        apply(&mut working)?;
        arenas.tickets.insert(id, working.clone());

        Ok(working)
    }

    fn delete_ticket(&self, id: Uuid) -> Result<(), TtError> {
        let mut arenas = self.write()?;

        if arenas.tickets.remove(&id).is_none() {
            return Err(TtError::NotFound(format!(
                "Ticket not found with id: {}",
                id
            )));
        }

        arenas.comments.retain(|_, comment| comment.ticket_id != id);

        Ok(())
    }

    fn insert_comment(&self, comment: Comment) -> Result<Comment, TtError> {
        let mut arenas = self.write()?;
        arenas.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, TtError> {
        Ok(self.read()?.comments.get(&id).cloned())
    }

    fn comments_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<Comment>, TtError> {
        let mut comments: Vec<Comment> = self
            .read()?
            .comments
            .values()
            .filter(|comment| comment.ticket_id == ticket_id)
            .cloned()
            .collect();

        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(comments)
    }

    fn comment_count(&self, ticket_id: Uuid) -> Result<u64, TtError> {
        Ok(self
            .read()?
            .comments
            .values()
            .filter(|comment| comment.ticket_id == ticket_id)
            .count() as u64)
    }

    fn delete_comment(&self, id: Uuid) -> Result<(), TtError> {
        let mut arenas = self.write()?;

        if arenas.comments.remove(&id).is_none() {
            return Err(TtError::NotFound(format!(
                "Comment not found with id: {}",
                id
            )));
        }

        Ok(())
    }
}
