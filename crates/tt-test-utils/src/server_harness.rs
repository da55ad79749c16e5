//! Test server harness for E2E testing
//!
//! Provides TestServer for spawning real TicketTrack instances in tests.

use chrono::Utc;
use common::secret::SecretBox;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use tt_service::config::Config;
use tt_service::models::{Role, User};
use tt_service::routes::{self, AppState};
use tt_service::services::token_service;
use tt_service::store::{InMemoryStore, Store};

/// Bcrypt cost for test fixtures. The minimum the algorithm accepts, so
/// suites stay fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Password every harness-created account uses.
pub const TEST_PASSWORD: &str = "password123";

/// Deterministic 32-byte HS256 key for test servers.
pub fn test_token_key() -> Vec<u8> {
    (0u8..32).collect()
}

/// Build a test configuration around the fixed token key.
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        token_key: SecretBox::new(Box::new(test_token_key())),
        token_expiry_seconds: 3600,
        bcrypt_cost: TEST_BCRYPT_COST,
        bootstrap_admin: None,
    }
}

/// Test harness for spawning a TicketTrack server in E2E tests
///
/// The harness keeps a handle to the in-memory store, so tests can seed
/// accounts with staff roles or inspect entities the API does not expose.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_flow() -> Result<(), anyhow::Error> {
///     let server = TestServer::spawn().await?;
///     let token = server.register_and_login("alice").await?;
///     // drive the API with reqwest ...
///     Ok(())
/// }
/// ```
pub struct TestServer {
    addr: SocketAddr,
    store: Arc<InMemoryStore>,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server instance with an empty store.
    ///
    /// The server binds to a random available port and runs in a background
    /// task until the harness is dropped.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let config = test_config();
        let store = Arc::new(InMemoryStore::new());

        let state = AppState {
            store: store.clone(),
            config: config.clone(),
        };
        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Direct access to the in-memory store backing the server
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared HTTP client for requests against this server
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Register an account through the API and return the response body.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Value, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/auth/register", self.url()))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        anyhow::ensure!(
            response.status() == 200,
            "registration failed with status {}",
            response.status()
        );
        Ok(response.json().await?)
    }

    /// Log in through the API and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.url()))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await?;

        anyhow::ensure!(
            response.status() == 200,
            "login failed with status {}",
            response.status()
        );

        let body: Value = response.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("login response missing token"))
    }

    /// Register a USER account with [`TEST_PASSWORD`] and log it in.
    pub async fn register_and_login(&self, username: &str) -> Result<String, anyhow::Error> {
        self.register(
            username,
            &format!("{}@example.com", username),
            TEST_PASSWORD,
        )
        .await?;
        self.login(username, TEST_PASSWORD).await
    }

    /// Insert an account with the given role directly into the store and
    /// return its id plus a valid session token.
    ///
    /// Registration only ever creates USER accounts; staff fixtures have to
    /// come through here. The account can still log in with
    /// [`TEST_PASSWORD`].
    pub fn seed_user(&self, username: &str, role: Role) -> Result<(Uuid, String), anyhow::Error> {
        let password_hash = bcrypt::hash(TEST_PASSWORD, TEST_BCRYPT_COST)?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        self.store
            .insert_user(User {
                id,
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash,
                role,
                enabled: true,
                created_at: now,
                updated_at: now,
            })
            .map_err(|e| anyhow::anyhow!("failed to seed user: {}", e))?;

        let token = token_service::issue_token(&self.config, username, role, now)
            .map_err(|e| anyhow::anyhow!("failed to issue token: {}", e))?;

        Ok((id, token))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Stop the background server task as soon as the test is done
        self._handle.abort();
    }
}
