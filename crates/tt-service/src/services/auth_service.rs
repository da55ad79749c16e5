//! Registration and login.
//!
//! Registration always creates an enabled ROLE_USER identity; elevated roles
//! are granted later through user administration. Both operations end by
//! issuing a session token, so a successful register doubles as a login.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::TtError;
use crate::models::{AuthResponse, Role, User, UserResponse};
use crate::services::token_service;
use crate::store::Store;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;

// Verified when the username is unknown so lookups take as long as a real
// password check
const DUMMY_PASSWORD_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Registration request body. The password is a `SecretString` so Debug
/// output stays redacted.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

struct ValidRegistration {
    username: String,
    email: String,
    password: SecretString,
}

/// Register a new identity and issue a session token.
///
/// # Steps
///
/// 1. Validate username, email, and password
/// 2. Hash the password (bcrypt, configurable cost)
/// 3. Insert the user; username and email collisions surface as
///    `DuplicateIdentity`
/// 4. Issue a token (auto-login)
pub fn register(
    store: &dyn Store,
    config: &Config,
    request: &RegisterRequest,
    now: DateTime<Utc>,
) -> Result<AuthResponse, TtError> {
    let valid = validate_registration(request)?;

    let password_hash =
        bcrypt::hash(valid.password.expose_secret(), config.bcrypt_cost).map_err(|e| {
            tracing::error!(target: "tt.services.auth", "Password hashing failed: {}", e);
            TtError::Internal
        })?;

    let user = store.insert_user(User {
        id: Uuid::new_v4(),
        username: valid.username,
        email: valid.email,
        password_hash,
        role: Role::User,
        enabled: true,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(target: "tt.services.auth", user_id = %user.id, "Registered new user");

    let token = token_service::issue_token(config, &user.username, user.role, now)?;
    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        user: UserResponse::from(&user),
    })
}

/// Authenticate a user by username and password.
///
/// # Security
///
/// Unknown username, disabled account, and wrong password all return the
/// same `AuthenticationFailed` error, and a dummy bcrypt verification runs
/// when the username is unknown so both paths take comparable time.
pub fn login(
    store: &dyn Store,
    config: &Config,
    request: &LoginRequest,
    now: DateTime<Utc>,
) -> Result<AuthResponse, TtError> {
    let mut fields = BTreeMap::new();
    let username = request.username.clone().unwrap_or_default();
    if username.trim().is_empty() {
        fields.insert("username".to_string(), "Username is required".to_string());
    }
    let password = request
        .password
        .clone()
        .unwrap_or_else(|| SecretString::from(String::new()));
    if password.expose_secret().trim().is_empty() {
        fields.insert("password".to_string(), "Password is required".to_string());
    }
    if !fields.is_empty() {
        return Err(TtError::ValidationFailed { fields });
    }

    let user = store.get_user_by_username(&username)?;

    let hash_to_verify = user
        .as_ref()
        .map_or(DUMMY_PASSWORD_HASH, |u| u.password_hash.as_str());
    let password_matches = match bcrypt::verify(password.expose_secret(), hash_to_verify) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!(target: "tt.services.auth", "Password verification failed: {}", e);
            false
        }
    };

    let Some(user) = user else {
        return Err(invalid_credentials());
    };
    if !user.enabled || !password_matches {
        tracing::debug!(target: "tt.services.auth", user_id = %user.id, "Login rejected");
        return Err(invalid_credentials());
    }

    let token = token_service::issue_token(config, &user.username, user.role, now)?;
    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        user: UserResponse::from(&user),
    })
}

fn invalid_credentials() -> TtError {
    TtError::AuthenticationFailed("Invalid username or password".to_string())
}

fn validate_registration(request: &RegisterRequest) -> Result<ValidRegistration, TtError> {
    let mut fields = BTreeMap::new();

    let username = request.username.clone().unwrap_or_default();
    if username.trim().is_empty() {
        fields.insert("username".to_string(), "Username is required".to_string());
    } else {
        let length = username.chars().count();
        if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length) {
            fields.insert(
                "username".to_string(),
                "Username must be between 3 and 50 characters".to_string(),
            );
        }
    }

    let email = request.email.clone().unwrap_or_default();
    if email.trim().is_empty() {
        fields.insert("email".to_string(), "Email is required".to_string());
    } else if !is_valid_email(&email) {
        fields.insert("email".to_string(), "Email must be valid".to_string());
    } else if email.chars().count() > MAX_EMAIL_LENGTH {
        fields.insert(
            "email".to_string(),
            "Email must not exceed 100 characters".to_string(),
        );
    }

    let password = request
        .password
        .clone()
        .unwrap_or_else(|| SecretString::from(String::new()));
    if password.expose_secret().trim().is_empty() {
        fields.insert("password".to_string(), "Password is required".to_string());
    } else if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        fields.insert(
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        );
    }

    if fields.is_empty() {
        Ok(ValidRegistration {
            username,
            email,
            password,
        })
    } else {
        Err(TtError::ValidationFailed { fields })
    }
}

/// Simple email validation.
///
/// Checks for basic email format: something@something.something
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    // A second @ means the split left one in the domain
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain needs at least one dot and no empty labels
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| !label.is_empty())
}
