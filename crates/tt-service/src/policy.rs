//! Pure authorization policy.
//!
//! `decide` maps an (actor, action) pair to Allow or Deny. Action variants
//! carry the resource facts the rules need (ticket creator, comment author),
//! so the function does no I/O and is fully deterministic given its inputs.
//! Callers resolve resources from the store first, then ask the policy.

use crate::errors::TtError;
use crate::models::{Comment, Role, Ticket};
use uuid::Uuid;

/// Roles allowed to change ticket status.
pub const STATUS_UPDATE_ROLES: &[Role] = &[Role::Technician, Role::Manager, Role::Admin];

/// Roles allowed to assign tickets. Deliberately narrower than
/// [`STATUS_UPDATE_ROLES`]: technicians work tickets, managers hand them out.
pub const ASSIGN_ROLES: &[Role] = &[Role::Manager, Role::Admin];

/// Roles that see every ticket. Everyone else is scoped to their own.
pub const GLOBAL_TICKET_VIEW_ROLES: &[Role] = &[Role::Technician, Role::Manager, Role::Admin];

/// Roles allowed to list and view user accounts.
pub const USER_READ_ROLES: &[Role] = &[Role::Manager, Role::Admin];

/// The authenticated identity performing an operation.
///
/// Built by the auth middleware from validated token claims plus a live store
/// lookup. Core operations take it as an explicit parameter; there is no
/// ambient current-user state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

/// An operation to be checked, bundled with the resource facts its rule reads.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    ListTickets,
    ViewTicket(&'a Ticket),
    CreateTicket,
    /// Title, description or priority writes.
    EditTicketFields(&'a Ticket),
    UpdateTicketStatus,
    AssignTicket,
    DeleteTicket(&'a Ticket),
    AddComment(&'a Ticket),
    DeleteComment(&'a Comment),
    ListUsers,
    ViewUser,
    UpdateUserRole,
    ToggleUserEnabled,
    DeleteUser,
}

/// Policy outcome. Deny is always surfaced to the caller as an authorization
/// failure, never silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    #[must_use]
    pub fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Visibility scope for ticket listings and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    /// Every ticket in the system.
    All,
    /// Only tickets created by this user.
    CreatedBy(Uuid),
}

/// Evaluate the policy table for one action.
#[must_use]
pub fn decide(actor: &Actor, action: &Action<'_>) -> Decision {
    match action {
        Action::ListTickets | Action::CreateTicket => Decision::Allow,

        Action::ViewTicket(ticket) | Action::AddComment(ticket) => {
            if GLOBAL_TICKET_VIEW_ROLES.contains(&actor.role) || ticket.created_by == actor.id {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::EditTicketFields(ticket) => {
            if ticket.created_by == actor.id || STATUS_UPDATE_ROLES.contains(&actor.role) {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::UpdateTicketStatus => {
            if STATUS_UPDATE_ROLES.contains(&actor.role) {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::AssignTicket => {
            if ASSIGN_ROLES.contains(&actor.role) {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::DeleteTicket(ticket) => {
            if ticket.created_by == actor.id || actor.role == Role::Admin {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::DeleteComment(comment) => {
            if comment.author_id == actor.id || actor.role == Role::Admin {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::ListUsers | Action::ViewUser => {
            if USER_READ_ROLES.contains(&actor.role) {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }

        Action::UpdateUserRole | Action::ToggleUserEnabled | Action::DeleteUser => {
            if actor.role == Role::Admin {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }
    }
}

/// Evaluate the policy and convert Deny into the service error.
pub fn ensure_allowed(actor: &Actor, action: &Action<'_>) -> Result<(), TtError> {
    match decide(actor, action) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(TtError::AuthorizationDenied),
    }
}

/// Listing scope for an actor: everything for staff roles, own tickets only
/// for plain users.
#[must_use]
pub fn list_scope(actor: &Actor) -> TicketScope {
    if GLOBAL_TICKET_VIEW_ROLES.contains(&actor.role) {
        TicketScope::All
    } else {
        TicketScope::CreatedBy(actor.id)
    }
}
