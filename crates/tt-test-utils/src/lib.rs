//! # TicketTrack Test Utilities
//!
//! Shared test utilities for the TicketTrack service.
//!
//! This crate provides:
//! - Server test harness (TestServer for E2E tests)
//! - Account seeding helpers for roles registration cannot create
//! - Token builders for tokens the real service would never issue
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tt_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestServer::spawn().await?;
//!     let token = server.register_and_login("alice").await?;
//!
//!     let response = server
//!         .client()
//!         .get(format!("{}/api/tickets", server.url()))
//!         .bearer_auth(&token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use server_harness::*;
pub use token_builders::*;
