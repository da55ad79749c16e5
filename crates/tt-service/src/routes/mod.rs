//! HTTP routes for the ticket tracker.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers::{auth_handler, comment_handler, ticket_handler, user_handler};
use crate::middleware::require_auth;
use crate::store::Store;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Entity store. Trait object so tests can substitute fakes.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/api/auth/*` - Registration and login (public)
/// - `/health` - Liveness probe (simple "OK") - public
/// - `/api/tickets*` - Ticket and comment endpoints (authenticated)
/// - `/api/users*` - User administration endpoints (authenticated)
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - Permissive CORS for browser clients
pub fn build_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth_handler::register))
        .route("/api/auth/login", post(auth_handler::login))
        .route("/health", get(health_check))
        .with_state(state.clone());

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        // Ticket collection
        .route(
            "/api/tickets",
            get(ticket_handler::list_tickets).post(ticket_handler::create_ticket),
        )
        // Search must be registered alongside :id; static segments win
        .route("/api/tickets/search", get(ticket_handler::search_tickets))
        .route(
            "/api/tickets/:id",
            get(ticket_handler::get_ticket)
                .put(ticket_handler::update_ticket)
                .delete(ticket_handler::delete_ticket),
        )
        // Comments nested under their ticket
        .route(
            "/api/tickets/:id/comments",
            get(comment_handler::list_comments).post(comment_handler::add_comment),
        )
        .route(
            "/api/tickets/:id/comments/:comment_id",
            delete(comment_handler::delete_comment),
        )
        // User administration
        .route("/api/users", get(user_handler::list_users))
        .route(
            "/api/users/:id",
            get(user_handler::get_user).delete(user_handler::delete_user),
        )
        .route("/api/users/:id/role", patch(user_handler::update_user_role))
        .route(
            "/api/users/:id/toggle",
            patch(user_handler::toggle_user_enabled),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflight and tag responses (outermost)
    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}
