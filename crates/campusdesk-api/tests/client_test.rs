#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campusdesk_api::{ApiClient, Error, PageRequest, ResourceKind, RetryPolicy};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: u64,
    name: String,
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
    }
}

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    let client = ApiClient::from_reqwest(&base, reqwest::Client::new(), fast_retry()).unwrap();
    (server, client)
}

async fn authed() -> (MockServer, ApiClient) {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("tok-123".to_owned()));
    (server, client)
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_installs_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@aau.edu.et", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {
                "token": "tok-abc",
                "user": {"id": 1, "name": "Admin", "email": "admin@aau.edu.et",
                         "role": {"id": "2", "name": "Super Admin"}}
            }
        })))
        .mount(&server)
        .await;

    let session = client
        .login("admin@aau.edu.et", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();

    assert_eq!(session.user.name, "Admin");
    assert_eq!(session.user.role.unwrap().id, 2);
    assert!(client.has_token());
}

#[tokio::test]
async fn test_login_rejected_uses_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": false, "message": "Account disabled"})),
        )
        .mount(&server)
        .await;

    let err = client
        .login("x@y.z", &SecretString::from("pw".to_owned()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Account disabled");
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_login_without_token_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"user": {"id": 1, "name": "A", "email": "a@b.c"}}
        })))
        .mount(&server)
        .await;

    let err = client
        .login("a@b.c", &SecretString::from("pw".to_owned()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn test_login_401_is_invalid_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let err = client
        .login("a@b.c", &SecretString::from("bad".to_owned()))
        .await
        .unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(err.to_string(), "Invalid credentials");
}

// ── Lists ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_bearer_and_paging() {
    let (server, client) = authed().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/campuses"))
        .and(header("authorization", "Bearer tok-123"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": [{"id": 21, "name": "Sidist Kilo"}],
            "meta": {"total": 21, "last_page": 2, "current_page": 2, "per_page": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .list::<Row>(ResourceKind::Campus, PageRequest::new(2, 20), &[])
        .await
        .unwrap();

    assert_eq!(page.data, vec![Row { id: 21, name: "Sidist Kilo".into() }]);
    assert_eq!(page.meta.total, 21);
    assert!(!page.meta.has_next());
    assert!(page.meta.has_previous());
}

#[tokio::test]
async fn test_list_extra_filter_and_missing_meta() {
    let (server, client) = authed().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/rooms"))
        .and(query_param("buildingId", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "name": "R-101"}, {"id": 2, "name": "R-102"}]
        })))
        .mount(&server)
        .await;

    let page = client
        .list::<Row>(
            ResourceKind::Room,
            PageRequest::default(),
            &[("buildingId", "4".to_owned())],
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.meta.last_page, 1);
}

#[tokio::test]
async fn test_list_all_walks_pages() {
    let (server, client) = authed().await;

    for (p, name) in [(1, "A"), (2, "B")] {
        Mock::given(method("GET"))
            .and(path("/api/v1/roles"))
            .and(query_param("page", p.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": p, "name": name}],
                "meta": {"total": 2, "last_page": 2, "current_page": p, "per_page": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let rows: Vec<Row> = client.list_all(ResourceKind::Role, 1, &[]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].name, "B");
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_put_collection_merges_id() {
    let (server, client) = authed().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/campuses"))
        .and(body_json(json!({"name": "Main", "id": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true, "message": "updated", "data": {"id": 3, "name": "Main"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let saved = client
        .update::<_, Row>(ResourceKind::Campus, 3, &json!({"name": "Main"}))
        .await
        .unwrap();
    assert_eq!(saved.message.as_deref(), Some("updated"));
    assert_eq!(saved.data.unwrap().id, 3);
}

#[tokio::test]
async fn test_update_put_by_id_keeps_body() {
    let (server, client) = authed().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/room-types/5"))
        .and(body_json(json!({"name": "Lab"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .expect(1)
        .mount(&server)
        .await;

    let saved = client
        .update::<_, Value>(ResourceKind::RoomType, 5, &json!({"name": "Lab"}))
        .await
        .unwrap();
    assert!(saved.data.is_none());
}

#[tokio::test]
async fn test_update_patch_by_id() {
    let (server, client) = authed().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/9"))
        .and(body_json(json!({"name": "Abebe", "id": 9})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update::<_, Value>(ResourceKind::User, 9, &json!({"name": "Abebe"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_without_id_is_rejected_locally() {
    let (_server, client) = authed().await;

    let err = client
        .update::<_, Value>(ResourceKind::Role, 0, &json!({"name": "x"}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Role ID is required for updating");
}

#[tokio::test]
async fn test_delete_styles() {
    let (server, client) = authed().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/buildings"))
        .and(body_json(json!({"id": 7})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": true, "message": "gone"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/rooms/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.delete(ResourceKind::Building, 7).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("gone"));

    let ack = client.delete(ResourceKind::Room, 8).await.unwrap();
    assert!(ack.message.is_none());
}

// ── Errors & retries ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_retries_server_errors() {
    let (server, client) = authed().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/blocks/1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client
        .get::<Row>(ResourceKind::Block, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServerError), "got {err:?}");
    assert_eq!(err.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn test_post_is_not_retried() {
    let (server, client) = authed().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/blocks"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "busy"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .create::<_, Row>(ResourceKind::Block, &json!({"name": "B"}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "busy");
}

#[tokio::test]
async fn test_not_found_message() {
    let (server, client) = authed().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/departments/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client
        .get::<Row>(ResourceKind::Department, 42)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "Sorry! the data you are looking for could not be found"
    );
}

#[tokio::test]
async fn test_validation_errors_are_collected() {
    let (server, client) = authed().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"email": ["The email has already been taken."], "name": "Too short"}
        })))
        .mount(&server)
        .await;

    let err = client
        .create::<_, Row>(ResourceKind::User, &json!({"email": "dup@aau.edu.et"}))
        .await
        .unwrap_err();
    let fields = err.field_errors().unwrap();
    assert_eq!(fields["email"], vec!["The email has already been taken."]);
    assert_eq!(fields["name"], vec!["Too short"]);
    assert_eq!(err.to_string(), "The given data was invalid.");
}

#[tokio::test]
async fn test_field_errors_need_422() {
    let (server, client) = authed().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/rooms"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Bad request",
            "errors": {"code": ["Code is malformed"]}
        })))
        .mount(&server)
        .await;

    let err = client
        .create::<_, Row>(ResourceKind::Room, &json!({"name": "B-101"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 400, .. }), "got {err:?}");
    assert_eq!(err.status(), Some(400));
    assert!(err.field_errors().is_none());
    assert_eq!(err.to_string(), "Bad request");
}

// ── Envelope status ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_status_false_is_rejected() {
    let (server, client) = authed().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/campuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": false,
            "message": "Campus listing is disabled"
        })))
        .mount(&server)
        .await;

    let err = client
        .list::<Row>(ResourceKind::Campus, PageRequest::default(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rejected { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "Campus listing is disabled");
}

#[tokio::test]
async fn test_create_status_false_without_message() {
    let (server, client) = authed().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/blocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": false})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .create::<_, Row>(ResourceKind::Block, &json!({"name": "Block A"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rejected { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "Request was rejected");
}

#[tokio::test]
async fn test_unknown_status_without_message() {
    let (server, client) = authed().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = client.get::<Row>(ResourceKind::User, 1).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "An error occurred");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = ApiClient::from_reqwest(
        "http://127.0.0.1:1/api",
        reqwest::Client::new(),
        RetryPolicy::none(),
    )
    .unwrap();

    let err = client
        .list::<Row>(ResourceKind::Campus, PageRequest::default(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "got {err:?}");
}
