//! JWT utilities shared across TicketTrack components.
//!
//! This module provides common JWT validation utilities including:
//! - Size limits for DoS prevention
//! - Clock skew constants for iat validation
//! - Deterministic expiry validation
//! - Session token claims structure
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Generic error messages prevent information leakage
//! - The `sub` field in Claims is redacted in Debug output
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{ensure_token_size, validate_expiry, SessionClaims};
//!
//! // Check token size before parsing
//! ensure_token_size(token)?;
//!
//! // After signature verification, validate exp against a single `now`
//! // captured at the start of request handling
//! validate_expiry(claims.exp, now)?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// This limit prevents denial-of-service attacks via oversized tokens.
/// JWTs larger than this size are rejected BEFORE any parsing or cryptographic
/// operations, providing defense-in-depth against resource exhaustion attacks.
///
/// # Rationale
///
/// - Typical session tokens are 200-500 bytes (header + claims + signature)
/// - Standard TicketTrack token: ~300 bytes (HS256 sig, four claims)
/// - 8KB limit allows for reasonable expansion while preventing abuse
/// - Checked BEFORE base64 decode and signature verification for efficiency
///
/// # Attack Scenario
///
/// - Attacker sends 10MB JWT in the Authorization header
/// - Without size limit: Base64 decode allocates large buffer, wastes CPU/memory
/// - With size limit: Rejected immediately with minimal resource usage
///
/// Per OWASP API Security Top 10 - API4:2023 (Unrestricted Resource Consumption)
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance (5 minutes per NIST SP 800-63B).
///
/// This tolerance accounts for clock drift between servers. Tokens with `iat`
/// (issued-at) timestamps more than this amount in the future are rejected.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT validation.
///
/// Note: Error messages are intentionally generic to prevent information leakage.
/// Detailed information is logged at debug level for troubleshooting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token `exp` claim is in the past.
    #[error("The access token is invalid or expired")]
    Expired,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Session token claims structure.
///
/// Used for user session tokens issued at login and registration. The `sub`
/// field contains the username, which is redacted in Debug output.
///
/// # Fields
///
/// - `sub`: Subject (username)
/// - `role`: Role name as it appears on the wire (e.g. `ROLE_USER`)
/// - `iat`: Issued-at timestamp (Unix epoch seconds)
/// - `exp`: Expiration timestamp (Unix epoch seconds)
///
/// # Security
///
/// The `sub` field is redacted in Debug output to prevent accidental logging
/// of user identifiers.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (username) - redacted in Debug output.
    pub sub: String,

    /// Role name granted to this session (e.g. `ROLE_USER`).
    pub role: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for SessionClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClaims")
            .field("sub", &"[REDACTED]")
            .field("role", &self.role)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

impl SessionClaims {
    /// Creates a new `SessionClaims` instance.
    ///
    /// # Arguments
    ///
    /// * `sub` - Subject (username)
    /// * `role` - Wire-format role name
    /// * `iat` - Issued-at timestamp (Unix epoch seconds)
    /// * `exp` - Expiration timestamp (Unix epoch seconds)
    #[must_use]
    pub fn new(sub: String, role: String, iat: i64, exp: i64) -> Self {
        Self {
            sub,
            role,
            iat,
            exp,
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Reject tokens larger than [`MAX_JWT_SIZE_BYTES`] before any parsing.
///
/// # Security
///
/// Must be called BEFORE base64 decoding or signature verification so that
/// oversized tokens are dropped with minimal resource usage.
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` if the token exceeds the limit.
pub fn ensure_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    Ok(())
}

/// Validate the `exp` (expiration) claim against an explicit `now` timestamp.
///
/// Callers capture `now` once at the start of request handling and pass it to
/// every check in the same validation, so the checks cannot disagree with each
/// other and boundary conditions can be unit-tested without wall-clock
/// dependence.
///
/// # Arguments
///
/// * `exp` - The expiration timestamp from the JWT claims (Unix epoch seconds)
/// * `now` - The current time (Unix epoch seconds)
///
/// # Errors
///
/// Returns `JwtValidationError::Expired` if `exp` is at or before `now`.
pub fn validate_expiry(exp: i64, now: i64) -> Result<(), JwtValidationError> {
    if exp <= now {
        tracing::debug!(
            target: "common.jwt",
            exp = exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(JwtValidationError::Expired);
    }

    Ok(())
}

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// Rejects tokens with `iat` too far in the future, which could indicate:
/// - Token pre-generation attack
/// - Clock synchronization issues
/// - Token manipulation
///
/// # Arguments
///
/// * `iat` - The issued-at timestamp from the JWT claims (Unix epoch seconds)
/// * `clock_skew` - Maximum allowed clock skew tolerance
/// * `now` - The current time (Unix epoch seconds)
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if the iat timestamp is
/// more than `clock_skew` in the future.
pub fn validate_issued_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    // Safe cast: clock skew tolerances are a few minutes, well within i64 range
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
