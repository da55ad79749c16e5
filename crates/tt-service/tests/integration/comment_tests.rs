//! E2E tests for the comment thread under a ticket
//!
//! Comment visibility follows the parent ticket, so most of these tests run
//! with a creator, an unrelated user and a technician side by side.

use reqwest::StatusCode;
use serde_json::{json, Value};
use tt_service::models::Role;
use tt_test_utils::TestServer;

async fn create_ticket(server: &TestServer, token: &str) -> Result<String, anyhow::Error> {
    let response = server
        .client()
        .post(format!("{}/api/tickets", server.url()))
        .bearer_auth(token)
        .json(&json!({
            "title": "VPN down",
            "description": "Created by an integration test",
            "priority": "HIGH",
        }))
        .send()
        .await?;

    anyhow::ensure!(
        response.status() == StatusCode::CREATED,
        "ticket creation failed with status {}",
        response.status()
    );
    let body: Value = response.json().await?;
    body["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("ticket response missing id"))
}

async fn add_comment(
    server: &TestServer,
    token: &str,
    ticket_id: &str,
    content: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .post(format!("{}/api/tickets/{}/comments", server.url(), ticket_id))
        .bearer_auth(token)
        .json(&json!({"content": content}))
        .send()
        .await?)
}

/// Test that adding a comment returns 201 and bumps the ticket's count.
#[tokio::test]
async fn test_add_comment_returns_created_view() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;
    let ticket_id = create_ticket(&server, &token).await?;

    // Act
    let response = add_comment(&server, &token, &ticket_id, "Rebooted the gateway").await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await?;
    assert_eq!(body["content"].as_str(), Some("Rebooted the gateway"));
    assert_eq!(body["user"]["username"].as_str(), Some("alice"));
    assert!(body["createdAt"].as_str().is_some());

    let ticket = server
        .client()
        .get(format!("{}/api/tickets/{}", server.url(), ticket_id))
        .bearer_auth(&token)
        .send()
        .await?;
    let ticket: Value = ticket.json().await?;
    assert_eq!(
        ticket["commentCount"].as_u64(),
        Some(1),
        "The ticket view should count the new comment"
    );

    Ok(())
}

/// Test the content validation rules on both edges.
#[tokio::test]
async fn test_add_comment_validates_content() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;
    let ticket_id = create_ticket(&server, &token).await?;

    // Blank content is refused
    let blank = add_comment(&server, &token, &ticket_id, "   ").await?;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    let body: Value = blank.json().await?;
    assert_eq!(
        body["error"]["fields"]["content"].as_str(),
        Some("Content is required")
    );

    // One character past the cap is refused
    let oversized = add_comment(&server, &token, &ticket_id, &"x".repeat(1001)).await?;
    assert_eq!(oversized.status(), StatusCode::BAD_REQUEST);
    let body: Value = oversized.json().await?;
    assert_eq!(
        body["error"]["fields"]["content"].as_str(),
        Some("Comment must not exceed 1000 characters")
    );

    // The cap itself is fine
    let at_cap = add_comment(&server, &token, &ticket_id, &"x".repeat(1000)).await?;
    assert_eq!(at_cap.status(), StatusCode::CREATED);

    Ok(())
}

/// Test that the comment thread is only reachable by ticket viewers.
#[tokio::test]
async fn test_comments_follow_ticket_visibility() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;
    let alice_token = server.register_and_login("alice").await?;
    let carol_token = server.register_and_login("carol").await?;
    let (_tech_id, tech_token) = server.seed_user("tech", Role::Technician)?;
    let ticket_id = create_ticket(&server, &alice_token).await?;

    // An unrelated user can neither read nor write the thread
    let write = add_comment(&server, &carol_token, &ticket_id, "drive-by").await?;
    assert_eq!(write.status(), StatusCode::FORBIDDEN);

    let read = server
        .client()
        .get(format!("{}/api/tickets/{}/comments", server.url(), ticket_id))
        .bearer_auth(&carol_token)
        .send()
        .await?;
    assert_eq!(read.status(), StatusCode::FORBIDDEN);

    // Staff can do both
    let staff_write = add_comment(&server, &tech_token, &ticket_id, "Looking into it").await?;
    assert_eq!(staff_write.status(), StatusCode::CREATED);

    let staff_read = server
        .client()
        .get(format!("{}/api/tickets/{}/comments", server.url(), ticket_id))
        .bearer_auth(&tech_token)
        .send()
        .await?;
    assert_eq!(staff_read.status(), StatusCode::OK);

    Ok(())
}

/// Test that the thread lists newest comments first.
#[tokio::test]
async fn test_list_comments_newest_first() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;
    let ticket_id = create_ticket(&server, &token).await?;

    add_comment(&server, &token, &ticket_id, "first comment").await?;
    add_comment(&server, &token, &ticket_id, "second comment").await?;

    let response = server
        .client()
        .get(format!("{}/api/tickets/{}/comments", server.url(), ticket_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let comments: Value = response.json().await?;
    let contents: Vec<&str> = comments
        .as_array()
        .expect("comments array")
        .iter()
        .filter_map(|c| c["content"].as_str())
        .collect();
    assert_eq!(contents, vec!["second comment", "first comment"]);

    Ok(())
}

/// Test that commenting on a missing ticket is a 404.
#[tokio::test]
async fn test_comment_on_missing_ticket_returns_404() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;

    let missing_id = uuid::Uuid::new_v4();
    let response = add_comment(&server, &token, &missing_id.to_string(), "hello?").await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await?;
    assert_eq!(
        body["error"]["message"].as_str(),
        Some(format!("Ticket not found with id: {}", missing_id).as_str())
    );

    Ok(())
}

/// Test that only the author or an admin may delete a comment.
#[tokio::test]
async fn test_delete_comment_author_and_admin_only() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;
    let alice_token = server.register_and_login("alice").await?;
    let (_tech_id, tech_token) = server.seed_user("tech", Role::Technician)?;
    let (_admin_id, admin_token) = server.seed_user("admin", Role::Admin)?;
    let ticket_id = create_ticket(&server, &alice_token).await?;

    let first = add_comment(&server, &alice_token, &ticket_id, "by alice").await?;
    let first: Value = first.json().await?;
    let first_id = first["id"].as_str().expect("Should have comment id");

    let second = add_comment(&server, &alice_token, &ticket_id, "also by alice").await?;
    let second: Value = second.json().await?;
    let second_id = second["id"].as_str().expect("Should have comment id");

    let comment_url = |comment_id: &str| {
        format!(
            "{}/api/tickets/{}/comments/{}",
            server.url(),
            ticket_id,
            comment_id
        )
    };

    // The author deletes their own comment
    let by_author = server
        .client()
        .delete(comment_url(first_id))
        .bearer_auth(&alice_token)
        .send()
        .await?;
    assert_eq!(by_author.status(), StatusCode::NO_CONTENT);

    // Deleting it again is a 404
    let again = server
        .client()
        .delete(comment_url(first_id))
        .bearer_auth(&alice_token)
        .send()
        .await?;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    // A technician cannot delete someone else's comment
    let by_tech = server
        .client()
        .delete(comment_url(second_id))
        .bearer_auth(&tech_token)
        .send()
        .await?;
    assert_eq!(
        by_tech.status(),
        StatusCode::FORBIDDEN,
        "Moderation is reserved for admins"
    );

    // An admin can
    let by_admin = server
        .client()
        .delete(comment_url(second_id))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(by_admin.status(), StatusCode::NO_CONTENT);

    Ok(())
}

/// Test that the delete path must name the comment's own ticket.
///
/// Reaching a comment through a different ticket id must look exactly like
/// the comment not existing, even for an admin.
#[tokio::test]
async fn test_delete_comment_checks_ticket_ownership() -> Result<(), anyhow::Error> {
    // Arrange - two tickets, a comment under the first
    let server = TestServer::spawn().await?;
    let alice_token = server.register_and_login("alice").await?;
    let (_admin_id, admin_token) = server.seed_user("admin", Role::Admin)?;

    let home_ticket = create_ticket(&server, &alice_token).await?;
    let other_ticket = create_ticket(&server, &alice_token).await?;

    let comment = add_comment(&server, &alice_token, &home_ticket, "anchored here").await?;
    let comment: Value = comment.json().await?;
    let comment_id = comment["id"].as_str().expect("Should have comment id");

    // Act - delete through the wrong ticket
    let response = server
        .client()
        .delete(format!(
            "{}/api/tickets/{}/comments/{}",
            server.url(),
            other_ticket,
            comment_id
        ))
        .bearer_auth(&admin_token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await?;
    assert_eq!(
        body["error"]["message"].as_str(),
        Some(format!("Comment not found with id: {}", comment_id).as_str())
    );

    // The comment is still there under its real ticket
    let listing = server
        .client()
        .get(format!("{}/api/tickets/{}/comments", server.url(), home_ticket))
        .bearer_auth(&alice_token)
        .send()
        .await?;
    let comments: Value = listing.json().await?;
    assert_eq!(comments.as_array().map(Vec::len), Some(1));

    Ok(())
}
