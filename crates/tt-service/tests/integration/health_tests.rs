//! Integration tests for the health probe
//!
//! The liveness endpoint sits outside the session guard so orchestrators can
//! poll it without credentials.

use reqwest::StatusCode;
use tt_test_utils::TestServer;

/// Test that /health returns 200 OK with a plain text body.
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Health check should return 200 OK"
    );

    let body = response.text().await?;
    assert_eq!(body, "OK", "Health check body should be 'OK'");

    Ok(())
}

/// Test that /health does not require an Authorization header even though
/// the API routes next to it do.
#[tokio::test]
async fn test_health_endpoint_skips_session_guard() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    // A protected route without credentials is rejected
    let guarded = server
        .client()
        .get(format!("{}/api/tickets", server.url()))
        .send()
        .await?;
    assert_eq!(guarded.status(), StatusCode::UNAUTHORIZED);

    // The probe right next to it is not
    let probe = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;
    assert_eq!(probe.status(), StatusCode::OK);

    Ok(())
}

/// Test that unknown paths fall through to a plain 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/definitely-not-a-route", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
