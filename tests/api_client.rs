//! Content API client tests against a mock upstream server.
//!
//! Covers the pagination contract of the batch listing (terminate on empty
//! page, discard on auth failure, keep partials on other failures) and the
//! degrade-to-empty behavior of subject and content lookups.

use coursegrab::api::{ApiClient, ApiError};
use coursegrab::config::ApiSettings;
use coursegrab::domain::ContentType;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let settings = ApiSettings {
        base_url: server.uri(),
        ..Default::default()
    };
    ApiClient::new(&settings).unwrap()
}

fn batch_page(ids: &[&str]) -> serde_json::Value {
    json!({
        "data": ids
            .iter()
            .map(|id| json!({ "_id": id, "name": format!("Batch {id}") }))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn list_batches_walks_pages_until_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "1"))
        .and(query_param("mode", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_page(&["B1", "B2"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_page(&["B3"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_page(&[])))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let batches = api.list_batches("tok").await.unwrap();

    let ids: Vec<_> = batches.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["B1", "B2", "B3"]);
}

#[tokio::test]
async fn list_batches_sends_required_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(header("authorization", "Bearer tok"))
        .and(header("client-id", "5eb393ee95fab7468a79d189"))
        .and(header("user-agent", "Android"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_page(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server);
    let batches = api.list_batches("tok").await.unwrap();
    assert!(batches.is_empty());
}

#[tokio::test]
async fn list_batches_auth_failure_discards_partial_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_page(&["B1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.list_batches("expired").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth));
}

#[tokio::test]
async fn list_batches_keeps_partial_results_on_non_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_page(&["B1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let batches = api.list_batches("tok").await.unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].id, "B1");
}

#[tokio::test]
async fn list_batches_fails_when_first_page_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/my-batches"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.list_batches("tok").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn page_requests_are_idempotent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/batches/B1/subject/S1/contents"))
        .and(query_param("page", "1"))
        .and(query_param("contentType", "exercises-notes-videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "topic": "L1", "url": "https://v/1" }]
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let first = api
        .content_page("B1", "S1", 1, "tok", ContentType::ExercisesNotesVideos)
        .await;
    let second = api
        .content_page("B1", "S1", 1, "tok", ContentType::ExercisesNotesVideos)
        .await;

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].topic, second[0].topic);
    assert_eq!(first[0].url, second[0].url);
}

#[tokio::test]
async fn subjects_parses_batch_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/B1/details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "subjects": [
                    { "_id": "S1", "subject": "Physics" },
                    { "_id": "S2", "subject": "Chemistry" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let subjects = api.subjects("B1", "tok").await;

    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0].name, "Physics");
}

#[tokio::test]
async fn subjects_degrades_to_empty_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/batches/B1/details"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = client_for(&server);
    assert!(api.subjects("B1", "tok").await.is_empty());
}

#[tokio::test]
async fn content_page_degrades_to_empty_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/batches/B1/subject/S1/contents"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let items = api
        .content_page("B1", "S1", 1, "tok", ContentType::Notes)
        .await;
    assert!(items.is_empty());
}
