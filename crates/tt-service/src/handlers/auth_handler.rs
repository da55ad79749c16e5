//! Registration and login endpoints. Both are public and both answer with a
//! session token plus the account view.

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;

use crate::errors::TtError;
use crate::handlers::parse_body;
use crate::models::AuthResponse;
use crate::routes::AppState;
use crate::services::auth_service::{self, LoginRequest, RegisterRequest};

/// Handle account registration.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthResponse>, TtError> {
    let request: RegisterRequest = parse_body(&body)?;
    let response =
        auth_service::register(state.store.as_ref(), &state.config, &request, Utc::now())?;
    Ok(Json(response))
}

/// Handle login.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthResponse>, TtError> {
    let request: LoginRequest = parse_body(&body)?;
    let response = auth_service::login(state.store.as_ref(), &state.config, &request, Utc::now())?;
    Ok(Json(response))
}
