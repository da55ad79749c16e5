//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with
//! TicketTrack-specific guidance. Use these types for all sensitive values
//! like passwords, tokens, and cryptographic material.
//!
//! # Compile-Time Safety
//!
//! The key insight is that `SecretBox<T>` and `SecretString` implement `Debug`
//! with redaction, so any code that derives `Debug` on a struct containing secrets
//! will automatically get safe logging behavior. This makes it **impossible** to
//! accidentally log secrets via `{:?}` or tracing.
//!
//! # Memory Safety
//!
//! Secrets are automatically zeroized when dropped, preventing sensitive
//! data from lingering in memory after use.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,  // Safe: Debug shows "[REDACTED]"
//! }
//!
//! let req = LoginRequest {
//!     username: "alice".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // This is safe - password is redacted
//! println!("{:?}", req);
//! // Output: LoginRequest { username: "alice", password: Secret([REDACTED alloc::string::String]) }
//!
//! // To access the actual value, you must explicitly call expose_secret()
//! let password: &str = req.password.expose_secret();
//! ```
//!
//! # TicketTrack Usage Guidelines
//!
//! Use `SecretString` for:
//! - User passwords in request bodies
//! - Bearer tokens
//! - Bootstrap admin credentials
//!
//! Use `SecretBox<T>` for:
//! - Custom secret types (e.g., `SecretBox<[u8; 32]>` for the token signing key)
//!
//! # Serde Integration
//!
//! With the `serde` feature enabled, secrets can be deserialized from JSON:
//!
//! ```rust
//! use serde::Deserialize;
//! use common::secret::SecretString;
//!
//! #[derive(Debug, Deserialize)]
//! struct Credentials {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let json = r#"{"username": "alice", "password": "hunter2"}"#;
//! let creds: Credentials = serde_json::from_str(json).unwrap();
//!
//! // Debug output is safe
//! println!("{:?}", creds);
//! // username is visible, password is redacted
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
