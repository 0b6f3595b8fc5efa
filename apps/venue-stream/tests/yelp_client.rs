//! Yelp Client Integration Tests
//!
//! Runs the search adapter against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use venue_stream::{
    Business, BusinessSearchPort, Credentials, SearchError, SearchQuery, YelpClient, YelpSettings,
};

fn client_for(base_url: &str, timeout: Duration) -> YelpClient {
    let settings = YelpSettings {
        base_url: base_url.to_string(),
        timeout,
        search_limit: 50,
    };
    YelpClient::new(&Credentials::new("test-key".to_string()), &settings).unwrap()
}

fn query() -> SearchQuery {
    SearchQuery::new("NYC", "restaurants")
}

#[tokio::test]
async fn search_sends_query_and_maps_businesses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .and(query_param("location", "NYC"))
        .and(query_param("categories", "restaurants"))
        .and(query_param("open_now", "true"))
        .and(query_param("limit", "50"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [
                {
                    "id": "a1",
                    "name": "Cheap Eats",
                    "price": "$",
                    "rating": 4.8,
                    "review_count": 300,
                    "location": { "city": "New York" }
                },
                {
                    "id": "b2",
                    "name": "No Price",
                    "rating": 4.9,
                    "review_count": 500
                }
            ],
            "total": 2,
            "region": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let businesses = client.search(&query()).await.unwrap();

    assert_eq!(
        businesses,
        vec![
            Business::new("Cheap Eats", Some("$"), 4.8, 300),
            Business::new("No Price", None, 4.9, 500),
        ]
    );
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [],
            "total": 0
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    assert!(client.search(&query()).await.unwrap().is_empty());
}

#[tokio::test]
async fn null_fields_and_unnamed_entries_do_not_fail_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [
                { "name": "New Place", "price": "$", "rating": null, "review_count": null },
                { "name": "", "price": "$", "rating": 4.9, "review_count": 10 },
                { "price": "$", "rating": 4.7 },
                { "name": "Cheap Eats", "price": "$", "rating": 4.8, "review_count": 300 }
            ],
            "total": 4
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let businesses = client.search(&query()).await.unwrap();

    assert_eq!(
        businesses,
        vec![
            Business::new("New Place", Some("$"), 0.0, 0),
            Business::new("Cheap Eats", Some("$"), 4.8, 300),
        ]
    );
}

#[tokio::test]
async fn unauthorized_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "TOKEN_INVALID", "description": "Invalid access token" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client.search(&query()).await.unwrap_err();

    assert_eq!(err, SearchError::Unauthorized);
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client.search(&query()).await.unwrap_err();

    assert_eq!(err, SearchError::RateLimited);
}

#[tokio::test]
async fn error_envelope_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "LOCATION_NOT_FOUND",
                "description": "Could not execute search, try specifying a more exact location."
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client.search(&query()).await.unwrap_err();

    assert_eq!(
        err,
        SearchError::Provider {
            code: "LOCATION_NOT_FOUND".to_string(),
            message: "Could not execute search, try specifying a more exact location."
                .to_string(),
        }
    );
}

#[tokio::test]
async fn malformed_body_maps_to_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client.search(&query()).await.unwrap_err();

    assert!(matches!(err, SearchError::InvalidResponse { .. }));
}

#[tokio::test]
async fn slow_provider_maps_to_connection_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "businesses": [], "total": 0 }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_millis(200));
    let err = client.search(&query()).await.unwrap_err();

    assert!(matches!(err, SearchError::ConnectionError { .. }));
}

#[tokio::test]
async fn unreachable_provider_maps_to_connection_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = client_for(&format!("http://{addr}"), Duration::from_secs(2));
    let err = client.search(&query()).await.unwrap_err();

    assert!(matches!(err, SearchError::ConnectionError { .. }));
}
