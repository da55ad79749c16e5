//! Builders for session tokens the real service would never issue
//!
//! Integration tests need expired, future-dated, tampered and foreign-key
//! tokens; these helpers sign raw claims directly with jsonwebtoken.

use chrono::Utc;
use common::jwt::SessionClaims;
use common::secret::ExposeSecret;
use jsonwebtoken::{encode, EncodingKey, Header};

use tt_service::config::Config;
use tt_service::models::Role;

/// Builder for session tokens with arbitrary claims
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new(server.config())
///     .for_user("alice")
///     .expired_seconds_ago(7200)
///     .build()?;
/// ```
pub struct TestTokenBuilder<'a> {
    config: &'a Config,
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
    key_override: Option<Vec<u8>>,
}

impl<'a> TestTokenBuilder<'a> {
    /// Create a builder issuing a currently-valid USER token.
    pub fn new(config: &'a Config) -> Self {
        let now = Utc::now().timestamp();
        Self {
            config,
            sub: "test-subject".to_string(),
            role: Role::User.as_str().to_string(),
            iat: now,
            exp: now + config.token_expiry_seconds,
            key_override: None,
        }
    }

    /// Set the subject (username)
    pub fn for_user(mut self, username: &str) -> Self {
        self.sub = username.to_string();
        self
    }

    /// Set the role claim
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role.as_str().to_string();
        self
    }

    /// Set a raw role claim string, valid or not
    pub fn with_raw_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    /// Backdate the token so it expired `seconds_ago` seconds in the past
    pub fn expired_seconds_ago(mut self, seconds_ago: i64) -> Self {
        let now = Utc::now().timestamp();
        self.exp = now - seconds_ago;
        self.iat = self.exp - self.config.token_expiry_seconds;
        self
    }

    /// Date the token `seconds` into the future (iat beyond any clock skew)
    pub fn issued_in_future(mut self, seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        self.iat = now + seconds;
        self.exp = self.iat + self.config.token_expiry_seconds;
        self
    }

    /// Sign with a key that is not the server's
    pub fn signed_with_wrong_key(mut self) -> Self {
        self.key_override = Some(vec![0x42; 32]);
        self
    }

    /// Sign the claims and return the encoded token
    pub fn build(self) -> Result<String, anyhow::Error> {
        let claims = SessionClaims::new(self.sub, self.role, self.iat, self.exp);
        let key_bytes = match self.key_override {
            Some(bytes) => bytes,
            None => self.config.token_key.expose_secret().clone(),
        };
        let key = EncodingKey::from_secret(&key_bytes);
        Ok(encode(&Header::default(), &claims, &key)?)
    }
}

/// Flip the last signature character so the token fails verification.
pub fn tamper_signature(token: &str) -> String {
    let mut tampered = token.to_string();
    match tampered.pop() {
        Some('A') => tampered.push('B'),
        Some(_) => tampered.push('A'),
        None => {}
    }
    tampered
}
