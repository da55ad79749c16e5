//! Session token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying the username as subject plus a role claim.
//! Validation is deterministic: the caller supplies `now`, so expiry checks
//! never read the wall clock and tests control time completely.

use chrono::{DateTime, Utc};
use common::jwt::{self, SessionClaims, DEFAULT_CLOCK_SKEW};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;

use crate::config::Config;
use crate::errors::TtError;
use crate::models::Role;

/// Sign a session token for an authenticated user.
///
/// Claims are `{sub: username, role, iat: now, exp: now + expiry}` with the
/// expiry taken from the configuration.
pub fn issue_token(
    config: &Config,
    username: &str,
    role: Role,
    now: DateTime<Utc>,
) -> Result<String, TtError> {
    let iat = now.timestamp();
    let claims = SessionClaims::new(
        username.to_string(),
        role.as_str().to_string(),
        iat,
        iat + config.token_expiry_seconds,
    );

    let key = EncodingKey::from_secret(config.token_key.expose_secret());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| {
        tracing::error!(target: "tt.services.token", "Failed to sign session token: {}", e);
        TtError::Internal
    })
}

/// Validate a session token and return its claims.
///
/// Checks size, signature, structure, expiry, and issued-at plausibility, in
/// that order. Every failure collapses to the same `AuthenticationFailed`
/// message so a caller cannot tell a forged token from an expired one.
pub fn validate_token(
    config: &Config,
    token: &str,
    now: DateTime<Utc>,
) -> Result<SessionClaims, TtError> {
    jwt::ensure_token_size(token).map_err(invalid)?;

    let key = DecodingKey::from_secret(config.token_key.expose_secret());
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against the caller's clock, not the wall clock
    validation.validate_exp = false;

    let data = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(target: "tt.services.token", "Token rejected: {}", e);
        TtError::AuthenticationFailed("The access token is invalid or expired".to_string())
    })?;

    jwt::validate_expiry(data.claims.exp, now.timestamp()).map_err(invalid)?;
    jwt::validate_issued_at(data.claims.iat, DEFAULT_CLOCK_SKEW, now.timestamp())
        .map_err(invalid)?;

    Ok(data.claims)
}

fn invalid(error: jwt::JwtValidationError) -> TtError {
    TtError::AuthenticationFailed(error.to_string())
}
