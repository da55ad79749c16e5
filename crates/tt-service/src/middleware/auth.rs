//! Authentication middleware for protected routes.
//!
//! Extracts the Bearer token from the Authorization header, validates the
//! session JWT, and re-reads the account it names from the store. The live
//! lookup is what makes disabling an account take effect immediately; only
//! the role travels in the token, so a role change waits for the next login.
//!
//! On success an [`Actor`] and the raw [`SessionClaims`] are placed in the
//! request extensions for handlers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use chrono::Utc;
use std::str::FromStr;

use crate::errors::TtError;
use crate::models::Role;
use crate::policy::Actor;
use crate::routes::AppState;
use crate::services::token_service;

/// The one message every token-path failure surfaces. Telling callers which
/// step failed would let them probe for valid usernames and live accounts.
const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

fn invalid_token() -> TtError {
    TtError::AuthenticationFailed(INVALID_TOKEN_MESSAGE.to_string())
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer_token(req: &Request) -> Result<&str, TtError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "tt.middleware.auth", "Missing Authorization header");
            invalid_token()
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "tt.middleware.auth", "Invalid Authorization header format");
        invalid_token()
    })
}

/// Authentication middleware that validates session tokens.
///
/// # Response
///
/// - Returns 401 Unauthorized if the token is missing, invalid, expired, or
///   names an account that no longer exists or is disabled
/// - Continues to the handler with [`Actor`] and [`SessionClaims`] in the
///   request extensions otherwise
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, TtError> {
    let token = extract_bearer_token(&req)?;
    let claims = token_service::validate_token(&state.config, token, Utc::now())?;

    let user = state
        .store
        .get_user_by_username(&claims.sub)?
        .ok_or_else(|| {
            tracing::debug!(target: "tt.middleware.auth", "Token subject no longer exists");
            invalid_token()
        })?;

    if !user.enabled {
        tracing::debug!(
            target: "tt.middleware.auth",
            user_id = %user.id,
            "Token subject is disabled"
        );
        return Err(invalid_token());
    }

    let role = Role::from_str(&claims.role).map_err(|_| {
        tracing::debug!(target: "tt.middleware.auth", "Token carries an unknown role");
        invalid_token()
    })?;

    req.extensions_mut().insert(Actor { id: user.id, role });
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
