use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretBox, SecretString};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default bcrypt cost factor for password hashing.
///
/// Cost 12 is the interactive-login sweet spot (~250ms per hash). Tests use a
/// lower cost via `TT_BCRYPT_COST` so suites stay fast.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Default session token lifetime in seconds (1 hour).
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 3600;

#[derive(Debug)]
pub struct Config {
    pub bind_address: String,
    /// HS256 signing key for session tokens. 32 bytes, base64 in the
    /// environment, redacted in Debug output.
    pub token_key: SecretBox<Vec<u8>>,
    pub token_expiry_seconds: i64,
    pub bcrypt_cost: u32,
    /// Optional admin account provisioned at startup. Registration only ever
    /// creates USER accounts, so a fresh deployment needs this to reach the
    /// admin surface.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

// `SecretBox<Vec<u8>>` has no `Clone` derive support (`Vec<u8>` is not
// `CloneableSecret` in secrecy 0.10), so clone field-by-field.
impl Clone for Config {
    fn clone(&self) -> Self {
        Config {
            bind_address: self.bind_address.clone(),
            token_key: SecretBox::new(Box::new(self.token_key.expose_secret().clone())),
            token_expiry_seconds: self.token_expiry_seconds,
            bcrypt_cost: self.bcrypt_cost,
            bootstrap_admin: self.bootstrap_admin.clone(),
        }
    }
}

/// Startup-provisioned admin credentials (all three env vars or none).
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token key format: {0}")]
    InvalidTokenKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid value for {var}: {reason}")]
    InvalidVar { var: String, reason: String },

    #[error("Incomplete bootstrap admin config: set all of TT_BOOTSTRAP_ADMIN_USERNAME, TT_BOOTSTRAP_ADMIN_EMAIL, TT_BOOTSTRAP_ADMIN_PASSWORD or none")]
    IncompleteBootstrapAdmin,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let token_key_base64 = vars
            .get("TT_TOKEN_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("TT_TOKEN_KEY".to_string()))?;

        let token_key = general_purpose::STANDARD
            .decode(token_key_base64)
            .map_err(ConfigError::Base64Error)?;

        if token_key.len() != 32 {
            return Err(ConfigError::InvalidTokenKey(format!(
                "Expected 32 bytes, got {}",
                token_key.len()
            )));
        }

        let token_expiry_seconds = match vars.get("TT_TOKEN_EXPIRY_SECONDS") {
            Some(raw) => {
                let parsed: i64 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                    var: "TT_TOKEN_EXPIRY_SECONDS".to_string(),
                    reason: format!("not a number: {}", raw),
                })?;
                if parsed <= 0 {
                    return Err(ConfigError::InvalidVar {
                        var: "TT_TOKEN_EXPIRY_SECONDS".to_string(),
                        reason: "must be positive".to_string(),
                    });
                }
                parsed
            }
            None => DEFAULT_TOKEN_EXPIRY_SECONDS,
        };

        let bcrypt_cost = match vars.get("TT_BCRYPT_COST") {
            Some(raw) => {
                let parsed: u32 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                    var: "TT_BCRYPT_COST".to_string(),
                    reason: format!("not a number: {}", raw),
                })?;
                // bcrypt only accepts costs in 4..=31
                if !(4..=31).contains(&parsed) {
                    return Err(ConfigError::InvalidVar {
                        var: "TT_BCRYPT_COST".to_string(),
                        reason: format!("must be between 4 and 31, got {}", parsed),
                    });
                }
                parsed
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let bootstrap_admin = Self::bootstrap_admin_from_vars(vars)?;

        Ok(Config {
            bind_address,
            token_key: SecretBox::new(Box::new(token_key)),
            token_expiry_seconds,
            bcrypt_cost,
            bootstrap_admin,
        })
    }

    fn bootstrap_admin_from_vars(
        vars: &HashMap<String, String>,
    ) -> Result<Option<BootstrapAdmin>, ConfigError> {
        let username = vars.get("TT_BOOTSTRAP_ADMIN_USERNAME");
        let email = vars.get("TT_BOOTSTRAP_ADMIN_EMAIL");
        let password = vars.get("TT_BOOTSTRAP_ADMIN_PASSWORD");

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) => Ok(Some(BootstrapAdmin {
                username: username.clone(),
                email: email.clone(),
                password: SecretString::from(password.clone()),
            })),
            (None, None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteBootstrapAdmin),
        }
    }
}
