//! HTTP request handlers.
//!
//! Handlers adapt the HTTP surface to the synchronous service layer: parse
//! the body, pull the authenticated [`Actor`](crate::policy::Actor) out of
//! the request extensions, capture `now` once, and hand off. All decisions
//! live in the services; nothing here touches the store directly.

pub mod auth_handler;
pub mod comment_handler;
pub mod ticket_handler;
pub mod user_handler;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::errors::TtError;

/// Deserialize a JSON request body.
///
/// Bodies are read as raw bytes and parsed here instead of with the `Json`
/// extractor so that malformed JSON and type-level mismatches surface as the
/// standard validation envelope rather than the framework's default reject.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, TtError> {
    serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(target: "tt.handlers", %error, "Malformed request body");
        TtError::validation("request", "Malformed request body")
    })
}
