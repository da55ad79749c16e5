//! Ticket endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::TtError;
use crate::handlers::parse_body;
use crate::models::{PageResponse, TicketResponse};
use crate::policy::Actor;
use crate::routes::AppState;
use crate::services::ticket_service::{
    self, CreateTicketRequest, TicketPageQuery, TicketSearchQuery, UpdateTicketRequest,
};

/// List tickets visible to the caller.
///
/// GET /api/tickets?page&size&sortBy&sortDir
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TicketPageQuery>,
) -> Result<Json<PageResponse<TicketResponse>>, TtError> {
    let page = ticket_service::list_tickets(state.store.as_ref(), &actor, &query)?;
    Ok(Json(page))
}

/// Search visible tickets by substring.
///
/// GET /api/tickets/search?query&page&size
pub async fn search_tickets(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TicketSearchQuery>,
) -> Result<Json<PageResponse<TicketResponse>>, TtError> {
    let page = ticket_service::search_tickets(state.store.as_ref(), &actor, &query)?;
    Ok(Json(page))
}

/// Create a ticket.
///
/// POST /api/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    body: Bytes,
) -> Result<(StatusCode, Json<TicketResponse>), TtError> {
    let request: CreateTicketRequest = parse_body(&body)?;
    let response =
        ticket_service::create_ticket(state.store.as_ref(), &actor, &request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetch one ticket.
///
/// GET /api/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, TtError> {
    let response = ticket_service::get_ticket(state.store.as_ref(), &actor, id)?;
    Ok(Json(response))
}

/// Apply a sparse update to a ticket.
///
/// PUT /api/tickets/{id}
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<TicketResponse>, TtError> {
    let request: UpdateTicketRequest = parse_body(&body)?;
    let response =
        ticket_service::update_ticket(state.store.as_ref(), &actor, id, &request, Utc::now())?;
    Ok(Json(response))
}

/// Delete a ticket.
///
/// DELETE /api/tickets/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TtError> {
    ticket_service::delete_ticket(state.store.as_ref(), &actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}
