// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for the Strava provider
//!
//! These tests verify token validation, paginated retrieval and error
//! handling using mocked HTTP responses.

use anyhow::Result;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use strava_weekly::error::AppError;
use strava_weekly::providers::strava::StravaProvider;
use strava_weekly::providers::{ActivitySource, TokenCheck};

/// Helper to create one page of mock Strava activities with ids starting at `first_id`
fn mock_activities_page(first_id: u64, count: u64) -> Value {
    let activities: Vec<Value> = (first_id..first_id + count)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Activity {}", id),
                "type": "Run",
                "sport_type": "Run",
                "start_date": "2024-01-15T07:00:00Z",
                "start_date_local": "2024-01-15T08:00:00Z",
                "moving_time": 1800,
                "elapsed_time": 1900,
                "distance": 5000.0,
                "total_elevation_gain": 42.0
            })
        })
        .collect();
    Value::Array(activities)
}

async fn mock_page(server: &mut ServerGuard, page: u32, per_page: u32, status: usize, body: String) -> Mock {
    server
        .mock("GET", "/athlete/activities")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.to_string()),
            Matcher::UrlEncoded("per_page".into(), per_page.to_string()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn test_fetch_all_stops_at_first_empty_page() -> Result<()> {
    let mut server = Server::new_async().await;
    let page_size = 3;
    let full_pages = 3;

    let mut mocks = Vec::new();
    for page in 1..=full_pages {
        let first_id = u64::from((page - 1) * page_size) + 1;
        mocks.push(
            mock_page(
                &mut server,
                page,
                page_size,
                200,
                mock_activities_page(first_id, u64::from(page_size)).to_string(),
            )
            .await,
        );
    }
    mocks.push(mock_page(&mut server, full_pages + 1, page_size, 200, "[]".to_string()).await);

    let provider = StravaProvider::with_base_url(server.url(), page_size);
    let activities = provider.fetch_all("test-token").await?;

    assert_eq!(activities.len(), (full_pages * page_size) as usize);
    let ids: Vec<u64> = activities.iter().map(|a| a.id).collect();
    assert_eq!(ids, (1..=9).collect::<Vec<u64>>());

    // N full pages plus the trailing empty one
    for mock in &mocks {
        mock.assert_async().await;
    }

    Ok(())
}

#[tokio::test]
async fn test_short_page_is_not_treated_as_last() -> Result<()> {
    let mut server = Server::new_async().await;

    let first = mock_page(&mut server, 1, 3, 200, mock_activities_page(1, 3).to_string()).await;
    let second = mock_page(&mut server, 2, 3, 200, mock_activities_page(4, 1).to_string()).await;
    let third = mock_page(&mut server, 3, 3, 200, "[]".to_string()).await;

    let provider = StravaProvider::with_base_url(server.url(), 3);
    let activities = provider.fetch_all("test-token").await?;

    assert_eq!(activities.len(), 4);
    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_no_activities() -> Result<()> {
    let mut server = Server::new_async().await;
    let only = mock_page(&mut server, 1, 200, 200, "[]".to_string()).await;

    let provider = StravaProvider::with_base_url(server.url(), 200);
    assert!(provider.fetch_all("test-token").await?.is_empty());
    only.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_error_page_aborts_whole_fetch() {
    let mut server = Server::new_async().await;

    let _first = mock_page(&mut server, 1, 2, 200, mock_activities_page(1, 2).to_string()).await;
    let _second = mock_page(
        &mut server,
        2,
        2,
        429,
        json!({ "message": "Rate Limit Exceeded" }).to_string(),
    )
    .await;
    let third = server
        .mock("GET", "/athlete/activities")
        .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
        .expect(0)
        .create_async()
        .await;

    let provider = StravaProvider::with_base_url(server.url(), 2);
    let err = provider.fetch_all("test-token").await.unwrap_err();

    match &err {
        AppError::FetchFailed(detail) => {
            assert!(detail.contains("429"));
            assert!(detail.contains("Rate Limit Exceeded"));
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }
    assert!(err.to_string().starts_with("Failed to fetch activities"));
    third.assert_async().await;
}

#[tokio::test]
async fn test_malformed_page_aborts_fetch() {
    let mut server = Server::new_async().await;
    let _first = mock_page(&mut server, 1, 5, 200, json!({ "not": "a list" }).to_string()).await;

    let provider = StravaProvider::with_base_url(server.url(), 5);
    let result = provider.fetch_all("test-token").await;

    assert!(matches!(result, Err(AppError::FetchFailed(_))));
}

#[tokio::test]
async fn test_check_token_statuses() {
    let mut server = Server::new_async().await;

    let _valid = server
        .mock("GET", "/athlete")
        .match_header("authorization", "Bearer good")
        .with_status(200)
        .with_body(json!({ "id": 1 }).to_string())
        .create_async()
        .await;
    let _expired = server
        .mock("GET", "/athlete")
        .match_header("authorization", "Bearer expired")
        .with_status(401)
        .with_body(json!({ "message": "Authorization Error" }).to_string())
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/athlete")
        .match_header("authorization", "Bearer broken")
        .with_status(503)
        .create_async()
        .await;

    let provider = StravaProvider::with_base_url(server.url(), 200);

    assert_eq!(provider.check_token("good").await, TokenCheck::Valid);
    assert_eq!(provider.check_token("expired").await, TokenCheck::Unauthorized);
    assert!(matches!(provider.check_token("broken").await, TokenCheck::Failed(_)));
}

#[tokio::test]
async fn test_check_token_unreachable_server() {
    // Nothing listens on a port we just released
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let provider = StravaProvider::with_base_url(format!("http://127.0.0.1:{}", port), 200);

    assert!(matches!(provider.check_token("any").await, TokenCheck::Failed(_)));
}
