//! TicketTrack
//!
//! Entry point for the access-controlled ticket tracking backend.

use chrono::Utc;
use common::secret::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tt_service::config::Config;
use tt_service::models::{Role, User};
use tt_service::routes::{self, AppState};
use tt_service::store::{InMemoryStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tt_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TicketTrack");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        token_expiry_seconds = config.token_expiry_seconds,
        "Configuration loaded successfully"
    );

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());

    // Registration only creates USER accounts; an admin has to come from here
    provision_bootstrap_admin(store.as_ref(), &config)?;

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = AppState { store, config };

    // Build application routes
    let app = routes::build_routes(state);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("TicketTrack listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Insert the configured bootstrap admin account if it does not exist yet.
///
/// Runs once at startup, before the server accepts requests. An existing
/// account with the same username is left untouched so restarts never clobber
/// a password or role change made through the API.
fn provision_bootstrap_admin(
    store: &dyn Store,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(());
    };

    if store.get_user_by_username(&admin.username)?.is_some() {
        info!("Bootstrap admin account already exists, skipping provisioning");
        return Ok(());
    }

    let password_hash = bcrypt::hash(admin.password.expose_secret(), config.bcrypt_cost)?;
    let now = Utc::now();
    store.insert_user(User {
        id: Uuid::new_v4(),
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash,
        role: Role::Admin,
        enabled: true,
        created_at: now,
        updated_at: now,
    })?;

    info!("Bootstrap admin account provisioned");
    Ok(())
}
