//! Ticket lifecycle operations.
//!
//! Every operation resolves its ticket, asks the policy, then applies the
//! mutation. Status is an unordered field update with coupled timestamps:
//! writing RESOLVED stamps `resolved_at` every time, writing CLOSED stamps
//! `closed_at`, and neither is ever cleared. A successful mutation touches
//! `updated_at` as an explicit step.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::TtError;
use crate::models::{
    PageResponse, SortDir, Ticket, TicketPriority, TicketResponse, TicketSortKey, TicketStatus,
    UserResponse,
};
use crate::policy::{self, Action, Actor, TicketScope};
use crate::services::{require_ticket, require_user};
use crate::store::Store;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// Create ticket request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
}

/// Sparse update request body. Absent fields are left untouched; there is no
/// way to unassign a ticket through this request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to_id: Option<Uuid>,
}

/// Pagination and sorting query parameters for ticket listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// Search query parameters. `query` is required; listings match on a
/// case-insensitive substring of title or description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketSearchQuery {
    pub query: String,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

struct ValidCreate {
    title: String,
    description: String,
    priority: TicketPriority,
}

/// List the tickets visible to the actor, sorted and paged.
///
/// Plain users only ever see tickets they created; staff roles see all.
pub fn list_tickets(
    store: &dyn Store,
    actor: &Actor,
    query: &TicketPageQuery,
) -> Result<PageResponse<TicketResponse>, TtError> {
    policy::ensure_allowed(actor, &Action::ListTickets)?;
    let (sort_key, sort_dir) = parse_sort(query)?;
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let mut tickets = scoped_tickets(store, actor)?;
    sort_tickets(&mut tickets, sort_key, sort_dir);

    to_page(store, tickets, page, size)
}

/// Search visible tickets by case-insensitive substring on title or
/// description, newest first. Scope rules are identical to listing.
pub fn search_tickets(
    store: &dyn Store,
    actor: &Actor,
    query: &TicketSearchQuery,
) -> Result<PageResponse<TicketResponse>, TtError> {
    policy::ensure_allowed(actor, &Action::ListTickets)?;
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let needle = query.query.to_lowercase();

    let mut tickets: Vec<Ticket> = scoped_tickets(store, actor)?
        .into_iter()
        .filter(|ticket| {
            ticket.title.to_lowercase().contains(&needle)
                || ticket.description.to_lowercase().contains(&needle)
        })
        .collect();
    sort_tickets(&mut tickets, TicketSortKey::CreatedAt, SortDir::Desc);

    to_page(store, tickets, page, size)
}

/// Fetch one ticket.
///
/// A USER reading another identity's existing ticket gets an authorization
/// error; a missing id is always not-found.
pub fn get_ticket(store: &dyn Store, actor: &Actor, id: Uuid) -> Result<TicketResponse, TtError> {
    let ticket = require_ticket(store, id)?;
    policy::ensure_allowed(actor, &Action::ViewTicket(&ticket))?;
    ticket_response(store, &ticket)
}

/// Create a ticket. Status is forced to OPEN and the creator is the actor,
/// whatever the request says.
pub fn create_ticket(
    store: &dyn Store,
    actor: &Actor,
    request: &CreateTicketRequest,
    now: DateTime<Utc>,
) -> Result<TicketResponse, TtError> {
    let valid = validate_create(request)?;
    policy::ensure_allowed(actor, &Action::CreateTicket)?;

    let ticket = store.insert_ticket(Ticket {
        id: Uuid::new_v4(),
        title: valid.title,
        description: valid.description,
        status: TicketStatus::Open,
        priority: valid.priority,
        created_by: actor.id,
        assigned_to: None,
        created_at: now,
        updated_at: now,
        resolved_at: None,
        closed_at: None,
    })?;

    tracing::info!(target: "tt.services.tickets", ticket_id = %ticket.id, "Ticket created");
    ticket_response(store, &ticket)
}

/// Apply a sparse update to a ticket.
///
/// The base edit permission is checked even when no field is present. Fields
/// that are present are then held to their own rules: status needs a staff
/// role, assignment needs manager or admin, and one denied field fails the
/// whole update with nothing applied. The assignee must exist. Field
/// application runs as a single closure under the store's write lock, so a
/// concurrent writer never observes a half-applied update.
pub fn update_ticket(
    store: &dyn Store,
    actor: &Actor,
    id: Uuid,
    request: &UpdateTicketRequest,
    now: DateTime<Utc>,
) -> Result<TicketResponse, TtError> {
    validate_update(request)?;

    let current = require_ticket(store, id)?;
    policy::ensure_allowed(actor, &Action::EditTicketFields(&current))?;
    if request.status.is_some() {
        policy::ensure_allowed(actor, &Action::UpdateTicketStatus)?;
    }
    if let Some(assignee_id) = request.assigned_to_id {
        policy::ensure_allowed(actor, &Action::AssignTicket)?;
        require_user(store, assignee_id)?;
    }

    let updated = store.update_ticket(id, &mut |ticket| {
        // Re-checked under the lock so authorize-then-apply is atomic
        policy::ensure_allowed(actor, &Action::EditTicketFields(ticket))?;

        let mut touched = false;
        if let Some(title) = &request.title {
            ticket.title = title.clone();
            touched = true;
        }
        if let Some(description) = &request.description {
            ticket.description = description.clone();
            touched = true;
        }
        if let Some(status) = request.status {
            ticket.status = status;
            match status {
                TicketStatus::Resolved => ticket.resolved_at = Some(now),
                TicketStatus::Closed => ticket.closed_at = Some(now),
                TicketStatus::Open | TicketStatus::InProgress => {}
            }
            touched = true;
        }
        if let Some(priority) = request.priority {
            ticket.priority = priority;
            touched = true;
        }
        if let Some(assignee_id) = request.assigned_to_id {
            ticket.assigned_to = Some(assignee_id);
            touched = true;
        }

        if touched {
            ticket.updated_at = now;
        }
        Ok(())
    })?;

    ticket_response(store, &updated)
}

/// Delete a ticket and the comments it owns. Creator or admin only.
pub fn delete_ticket(store: &dyn Store, actor: &Actor, id: Uuid) -> Result<(), TtError> {
    let ticket = require_ticket(store, id)?;
    policy::ensure_allowed(actor, &Action::DeleteTicket(&ticket))?;
    store.delete_ticket(id)?;
    tracing::info!(target: "tt.services.tickets", ticket_id = %id, "Ticket deleted");
    Ok(())
}

fn validate_create(request: &CreateTicketRequest) -> Result<ValidCreate, TtError> {
    let mut fields = BTreeMap::new();

    let title = request.title.clone().unwrap_or_default();
    if title.trim().is_empty() {
        fields.insert("title".to_string(), "Title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LENGTH {
        fields.insert(
            "title".to_string(),
            "Title must not exceed 200 characters".to_string(),
        );
    }

    let description = request.description.clone().unwrap_or_default();
    if description.trim().is_empty() {
        fields.insert(
            "description".to_string(),
            "Description is required".to_string(),
        );
    } else if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        fields.insert(
            "description".to_string(),
            "Description must not exceed 2000 characters".to_string(),
        );
    }

    if request.priority.is_none() {
        fields.insert("priority".to_string(), "Priority is required".to_string());
    }

    if let (Some(priority), true) = (request.priority, fields.is_empty()) {
        Ok(ValidCreate {
            title,
            description,
            priority,
        })
    } else {
        Err(TtError::ValidationFailed { fields })
    }
}

fn validate_update(request: &UpdateTicketRequest) -> Result<(), TtError> {
    let mut fields = BTreeMap::new();

    if let Some(title) = &request.title {
        if title.chars().count() > MAX_TITLE_LENGTH {
            fields.insert(
                "title".to_string(),
                "Title must not exceed 200 characters".to_string(),
            );
        }
    }
    if let Some(description) = &request.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            fields.insert(
                "description".to_string(),
                "Description must not exceed 2000 characters".to_string(),
            );
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(TtError::ValidationFailed { fields })
    }
}

fn parse_sort(query: &TicketPageQuery) -> Result<(TicketSortKey, SortDir), TtError> {
    let sort_key = match &query.sort_by {
        Some(raw) => TicketSortKey::from_str(raw).map_err(|_| {
            TtError::validation(
                "sortBy",
                "sortBy must be one of: createdAt, updatedAt, title, status, priority",
            )
        })?,
        None => TicketSortKey::CreatedAt,
    };
    let sort_dir = match &query.sort_dir {
        Some(raw) => SortDir::from_str(raw)
            .map_err(|_| TtError::validation("sortDir", "sortDir must be 'asc' or 'desc'"))?,
        None => SortDir::Desc,
    };
    Ok((sort_key, sort_dir))
}

fn scoped_tickets(store: &dyn Store, actor: &Actor) -> Result<Vec<Ticket>, TtError> {
    let tickets = store.list_tickets()?;
    Ok(match policy::list_scope(actor) {
        TicketScope::All => tickets,
        TicketScope::CreatedBy(user_id) => tickets
            .into_iter()
            .filter(|ticket| ticket.created_by == user_id)
            .collect(),
    })
}

fn sort_tickets(tickets: &mut [Ticket], key: TicketSortKey, dir: SortDir) {
    tickets.sort_by(|a, b| {
        let ordering = match key {
            TicketSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            TicketSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            TicketSortKey::Title => a.title.cmp(&b.title),
            TicketSortKey::Status => a.status.cmp(&b.status),
            TicketSortKey::Priority => a.priority.cmp(&b.priority),
        };
        let ordering = match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        };
        // Ids break ties so page boundaries stay stable across calls
        ordering.then_with(|| a.id.cmp(&b.id))
    });
}

fn to_page(
    store: &dyn Store,
    tickets: Vec<Ticket>,
    page: u64,
    size: u64,
) -> Result<PageResponse<TicketResponse>, TtError> {
    let paged = PageResponse::paginate(tickets, page, size);
    let content = paged
        .content
        .iter()
        .map(|ticket| ticket_response(store, ticket))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PageResponse {
        content,
        total_elements: paged.total_elements,
        total_pages: paged.total_pages,
        size: paged.size,
        number: paged.number,
        first: paged.first,
        last: paged.last,
    })
}

/// Assemble the response view: creator and assignee resolved to user views
/// plus the live comment count. User deletion cleans up every reference, so
/// a missing creator or assignee means a broken store invariant, not a
/// user-visible not-found.
pub(crate) fn ticket_response(
    store: &dyn Store,
    ticket: &Ticket,
) -> Result<TicketResponse, TtError> {
    let created_by = resolve_user_view(store, ticket.created_by)?;
    let assigned_to = match ticket.assigned_to {
        Some(user_id) => Some(resolve_user_view(store, user_id)?),
        None => None,
    };
    let comment_count = store.comment_count(ticket.id)?;

    Ok(TicketResponse {
        id: ticket.id,
        title: ticket.title.clone(),
        description: ticket.description.clone(),
        status: ticket.status,
        priority: ticket.priority,
        created_by,
        assigned_to,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
        resolved_at: ticket.resolved_at,
        comment_count,
    })
}

fn resolve_user_view(store: &dyn Store, user_id: Uuid) -> Result<UserResponse, TtError> {
    match store.get_user(user_id)? {
        Some(user) => Ok(UserResponse::from(&user)),
        None => {
            tracing::error!(
                target: "tt.services.tickets",
                %user_id,
                "Referenced user missing from store"
            );
            Err(TtError::Internal)
        }
    }
}
