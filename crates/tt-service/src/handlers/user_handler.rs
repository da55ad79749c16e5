//! User administration endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::TtError;
use crate::models::{Role, UserResponse};
use crate::policy::Actor;
use crate::routes::AppState;
use crate::services::user_service;

/// Role change query parameter (`?role=ROLE_TECHNICIAN`).
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

/// List every account.
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<UserResponse>>, TtError> {
    let users = user_service::list_users(state.store.as_ref(), &actor)?;
    Ok(Json(users))
}

/// Fetch one account.
///
/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, TtError> {
    let user = user_service::get_user(state.store.as_ref(), &actor, id)?;
    Ok(Json(user))
}

/// Change an account's role.
///
/// PATCH /api/users/{id}/role?role=ROLE_X
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<UserResponse>, TtError> {
    let role =
        Role::from_str(&query.role).map_err(|message| TtError::validation("role", &message))?;
    let user = user_service::update_user_role(state.store.as_ref(), &actor, id, role, Utc::now())?;
    Ok(Json(user))
}

/// Flip an account between enabled and disabled.
///
/// PATCH /api/users/{id}/toggle
pub async fn toggle_user_enabled(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TtError> {
    user_service::toggle_user_enabled(state.store.as_ref(), &actor, id, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an account and clean up its references.
///
/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TtError> {
    user_service::delete_user(state.store.as_ref(), &actor, id, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}
