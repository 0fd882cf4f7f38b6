// tests/engagement_http.rs
use daily_digest::engagement::fetch_engagement;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn likes_are_loaded_from_reaction_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exec"))
        .and(query_param("action", "likes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "likes": { "abc123def456": 10, "000000000000": "2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let base = format!("{}/exec", server.uri());
    let map = fetch_engagement(&client, Some(&base)).await;
    assert_eq!(map.count("abc123def456"), 10);
    assert_eq!(map.count("000000000000"), 2);
    assert_eq!(map.count("unknown"), 0);
}

#[tokio::test]
async fn server_error_yields_empty_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let map = fetch_engagement(&client, Some(&server.uri())).await;
    assert!(map.is_empty());
}

#[tokio::test]
async fn non_json_body_yields_empty_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let map = fetch_engagement(&client, Some(&server.uri())).await;
    assert!(map.is_empty());
}

#[tokio::test]
async fn unreachable_service_yields_empty_map() {
    let client = reqwest::Client::new();
    // Port 9 (discard) on localhost is closed in test environments.
    let map = fetch_engagement(&client, Some("http://127.0.0.1:9/exec")).await;
    assert!(map.is_empty());
}

#[tokio::test]
async fn no_endpoint_configured_yields_empty_map() {
    let client = reqwest::Client::new();
    assert!(fetch_engagement(&client, None).await.is_empty());
}
