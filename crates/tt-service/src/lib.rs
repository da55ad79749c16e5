//! TicketTrack Service Library
//!
//! Core library for the TicketTrack access-controlled ticket tracking
//! backend: registration and login with session tokens, role-based ticket
//! and comment operations, and user administration over an in-memory store.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types and the HTTP error envelope
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer token authentication
//! - `models` - Entities, enums and response views
//! - `policy` - Pure authorization policy
//! - `routes` - Router assembly and application state
//! - `services` - Business logic layer
//! - `store` - Persistence contract and the in-memory store

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod store;
