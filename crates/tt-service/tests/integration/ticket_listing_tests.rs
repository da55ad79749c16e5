//! E2E tests for ticket listing, sorting, pagination and search
//!
//! Plain users must only ever see their own tickets in these endpoints no
//! matter what paging or search parameters they send; staff see everything.

use reqwest::StatusCode;
use serde_json::{json, Value};
use tt_service::models::Role;
use tt_test_utils::TestServer;

async fn create_ticket(
    server: &TestServer,
    token: &str,
    title: &str,
    description: &str,
) -> Result<Value, anyhow::Error> {
    let response = server
        .client()
        .post(format!("{}/api/tickets", server.url()))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "description": description,
            "priority": "MEDIUM",
        }))
        .send()
        .await?;

    anyhow::ensure!(
        response.status() == StatusCode::CREATED,
        "ticket creation failed with status {}",
        response.status()
    );
    Ok(response.json().await?)
}

async fn list_tickets(
    server: &TestServer,
    token: &str,
    query: &[(&str, &str)],
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .get(format!("{}/api/tickets", server.url()))
        .query(query)
        .bearer_auth(token)
        .send()
        .await?)
}

/// Pull the titles out of a page response, in order.
fn titles(page: &Value) -> Vec<String> {
    page["content"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Listing Scope Tests
// ============================================================================

/// Test that users list only their own tickets while staff list them all.
#[tokio::test]
async fn test_list_scopes_to_creator_for_users() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;
    let alice_token = server.register_and_login("alice").await?;
    let bob_token = server.register_and_login("bob").await?;
    let (_tech_id, tech_token) = server.seed_user("tech", Role::Technician)?;

    for i in 0..3 {
        create_ticket(&server, &alice_token, &format!("alice-{i}"), "mine").await?;
    }
    for i in 0..2 {
        create_ticket(&server, &bob_token, &format!("bob-{i}"), "also mine").await?;
    }

    // Act / Assert - alice sees exactly her three
    let as_alice = list_tickets(&server, &alice_token, &[]).await?;
    assert_eq!(as_alice.status(), StatusCode::OK);
    let page: Value = as_alice.json().await?;
    assert_eq!(page["totalElements"].as_u64(), Some(3));
    for ticket in page["content"].as_array().expect("content array") {
        assert_eq!(
            ticket["createdBy"]["username"].as_str(),
            Some("alice"),
            "A plain user's listing must never contain foreign tickets"
        );
    }

    // Staff see everything
    let as_tech = list_tickets(&server, &tech_token, &[]).await?;
    let page: Value = as_tech.json().await?;
    assert_eq!(page["totalElements"].as_u64(), Some(5));

    Ok(())
}

// ============================================================================
// Sorting Tests
// ============================================================================

/// Test that the default ordering is newest first.
#[tokio::test]
async fn test_list_default_sort_is_newest_first() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;

    create_ticket(&server, &token, "first", "oldest").await?;
    create_ticket(&server, &token, "second", "middle").await?;
    create_ticket(&server, &token, "third", "newest").await?;

    let response = list_tickets(&server, &token, &[]).await?;
    let page: Value = response.json().await?;

    assert_eq!(titles(&page), vec!["third", "second", "first"]);

    Ok(())
}

/// Test sorting by an explicit key and direction.
#[tokio::test]
async fn test_list_sorts_by_requested_key() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;

    create_ticket(&server, &token, "banana", "b").await?;
    create_ticket(&server, &token, "apple", "a").await?;
    create_ticket(&server, &token, "cherry", "c").await?;

    let response =
        list_tickets(&server, &token, &[("sortBy", "title"), ("sortDir", "asc")]).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = response.json().await?;
    assert_eq!(titles(&page), vec!["apple", "banana", "cherry"]);

    Ok(())
}

/// Test that unknown sort parameters are named in the validation response.
#[tokio::test]
async fn test_list_rejects_unknown_sort_params() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;

    let bad_key = list_tickets(&server, &token, &[("sortBy", "wat")]).await?;
    assert_eq!(bad_key.status(), StatusCode::BAD_REQUEST);
    let body: Value = bad_key.json().await?;
    assert_eq!(
        body["error"]["fields"]["sortBy"].as_str(),
        Some("sortBy must be one of: createdAt, updatedAt, title, status, priority")
    );

    let bad_dir = list_tickets(&server, &token, &[("sortDir", "sideways")]).await?;
    assert_eq!(bad_dir.status(), StatusCode::BAD_REQUEST);
    let body: Value = bad_dir.json().await?;
    assert_eq!(
        body["error"]["fields"]["sortDir"].as_str(),
        Some("sortDir must be 'asc' or 'desc'")
    );

    Ok(())
}

// ============================================================================
// Pagination Tests
// ============================================================================

/// Test the page envelope across a two-page listing.
#[tokio::test]
async fn test_list_pagination_shape() -> Result<(), anyhow::Error> {
    // Arrange - twelve tickets, one more than the default page holds
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;
    for i in 0..12 {
        create_ticket(&server, &token, &format!("ticket-{i:02}"), "filler").await?;
    }

    // First page with defaults
    let response = list_tickets(&server, &token, &[]).await?;
    let page: Value = response.json().await?;
    assert_eq!(page["content"].as_array().map(Vec::len), Some(10));
    assert_eq!(page["totalElements"].as_u64(), Some(12));
    assert_eq!(page["totalPages"].as_u64(), Some(2));
    assert_eq!(page["number"].as_u64(), Some(0));
    assert_eq!(page["size"].as_u64(), Some(10));
    assert_eq!(page["first"].as_bool(), Some(true));
    assert_eq!(page["last"].as_bool(), Some(false));

    // Second page holds the remainder
    let response = list_tickets(&server, &token, &[("page", "1")]).await?;
    let page: Value = response.json().await?;
    assert_eq!(page["content"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["number"].as_u64(), Some(1));
    assert_eq!(page["first"].as_bool(), Some(false));
    assert_eq!(page["last"].as_bool(), Some(true));

    Ok(())
}

/// Test that out-of-range page sizes are clamped instead of erroring.
#[tokio::test]
async fn test_list_size_is_clamped() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;
    for i in 0..3 {
        create_ticket(&server, &token, &format!("ticket-{i}"), "filler").await?;
    }

    let response = list_tickets(&server, &token, &[("size", "0")]).await?;
    let page: Value = response.json().await?;
    assert_eq!(page["size"].as_u64(), Some(1), "size=0 clamps up to 1");
    assert_eq!(page["content"].as_array().map(Vec::len), Some(1));

    let response = list_tickets(&server, &token, &[("size", "1000")]).await?;
    let page: Value = response.json().await?;
    assert_eq!(page["size"].as_u64(), Some(100), "size=1000 clamps down to 100");
    assert_eq!(page["content"].as_array().map(Vec::len), Some(3));

    Ok(())
}

// ============================================================================
// Search Tests
// ============================================================================

/// Test that search matches title and description without case sensitivity.
#[tokio::test]
async fn test_search_matches_title_and_description() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;

    create_ticket(&server, &token, "VPN down", "branch office offline").await?;
    create_ticket(&server, &token, "Email broken", "the vpn gateway is also affected").await?;
    create_ticket(&server, &token, "Printer jam", "third floor").await?;

    // Act - mixed-case needle
    let response = server
        .client()
        .get(format!("{}/api/tickets/search", server.url()))
        .query(&[("query", "vPn")])
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert - one title match, one description match, newest first
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = response.json().await?;
    assert_eq!(page["totalElements"].as_u64(), Some(2));
    assert_eq!(titles(&page), vec!["Email broken", "VPN down"]);

    Ok(())
}

/// Test that search respects the same visibility scope as listing.
#[tokio::test]
async fn test_search_is_scoped_to_visible_tickets() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let alice_token = server.register_and_login("alice").await?;
    let bob_token = server.register_and_login("bob").await?;
    let (_tech_id, tech_token) = server.seed_user("tech", Role::Technician)?;

    create_ticket(&server, &alice_token, "VPN down for alice", "mine").await?;
    create_ticket(&server, &bob_token, "VPN down for bob", "also mine").await?;

    let as_alice = server
        .client()
        .get(format!("{}/api/tickets/search", server.url()))
        .query(&[("query", "vpn")])
        .bearer_auth(&alice_token)
        .send()
        .await?;
    let page: Value = as_alice.json().await?;
    assert_eq!(page["totalElements"].as_u64(), Some(1));
    assert_eq!(titles(&page), vec!["VPN down for alice"]);

    let as_tech = server
        .client()
        .get(format!("{}/api/tickets/search", server.url()))
        .query(&[("query", "vpn")])
        .bearer_auth(&tech_token)
        .send()
        .await?;
    let page: Value = as_tech.json().await?;
    assert_eq!(page["totalElements"].as_u64(), Some(2));

    Ok(())
}

/// Test that the query parameter is mandatory.
#[tokio::test]
async fn test_search_requires_query_param() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;

    let response = server
        .client()
        .get(format!("{}/api/tickets/search", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

/// Test that a query with no hits returns a well-formed empty page.
#[tokio::test]
async fn test_search_no_match_returns_empty_page() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let token = server.register_and_login("alice").await?;
    create_ticket(&server, &token, "VPN down", "branch office").await?;

    let response = server
        .client()
        .get(format!("{}/api/tickets/search", server.url()))
        .query(&[("query", "zzzz")])
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = response.json().await?;
    assert_eq!(page["content"].as_array().map(Vec::len), Some(0));
    assert_eq!(page["totalElements"].as_u64(), Some(0));
    assert_eq!(page["totalPages"].as_u64(), Some(0));
    assert_eq!(page["first"].as_bool(), Some(true));
    assert_eq!(page["last"].as_bool(), Some(true));

    Ok(())
}
