#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` and `ResourcePage` against wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campusdesk_api::{RetryPolicy, TransportConfig};
use campusdesk_core::menu::{CampusTree, LOGIN_REQUIRED};
use campusdesk_core::request::{FormMode, FormValues};
use campusdesk_core::{
    Building, Campus, Controller, ControllerConfig, CoreError, EntityId, PageRequest,
    ResourcePage, Role, SubmitOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> ControllerConfig {
    ControllerConfig::new(&format!("{}/api/", server.uri()))
        .unwrap()
        .with_retry(RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
        })
}

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let ctl = Controller::new(config(&server)).unwrap();
    (server, ctl)
}

async fn authed() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let cfg = config(&server).with_token(Some(SecretString::from("tok-1".to_owned())));
    (server, Controller::new(cfg).unwrap())
}

fn id(n: u64) -> EntityId {
    EntityId::new(n).unwrap()
}

fn page(data: Value, total: u64, current: u64, last: u64) -> Value {
    json!({
        "status": true,
        "data": data,
        "meta": {"total": total, "current_page": current, "last_page": last, "per_page": 10}
    })
}

async fn mount_list(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_records_user() {
    let (server, ctl) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"token": "t", "user": {"id": 3, "name": "Abebe", "email": "abebe@aau.edu.et"}}
        })))
        .mount(&server)
        .await;

    assert!(!ctl.is_authenticated());
    ctl.login("abebe@aau.edu.et", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert!(ctl.is_authenticated());
    assert_eq!(ctl.current_user().unwrap().name, "Abebe");

    ctl.logout();
    assert!(!ctl.is_authenticated());
    assert!(ctl.current_user().is_none());
}

#[tokio::test]
async fn test_refused_login_is_auth_error() {
    let (server, ctl) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": false, "message": "Wrong password"})),
        )
        .mount(&server)
        .await;

    let err = ctl
        .login("x@aau.edu.et", &SecretString::from("bad".to_owned()))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.to_string(), "Wrong password");
}

// ── Composite reads ─────────────────────────────────────────────────

#[tokio::test]
async fn test_rooms_of_building_sends_filter() {
    let (server, ctl) = authed().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rooms"))
        .and(query_param("buildingId", "4"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{"id": 1, "name": "R-101", "code": "101", "capacity": "40"}]),
            1,
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let rooms = ctl
        .rooms_of_building(id(4), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(rooms.data[0].capacity, Some(40));
}

#[tokio::test]
async fn test_permissions_from_roles() {
    let (server, ctl) = authed().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                {"id": 1, "name": "Admin", "permissions": [
                    {"id": 3, "name": "edit campus"}, {"id": 1, "name": "create campus"}
                ]},
                {"id": 2, "name": "Viewer", "permissions": [{"id": 1, "name": "create campus"}]}
            ]),
            2,
            1,
            1,
        )))
        .mount(&server)
        .await;

    let perms = ctl.permissions().await.unwrap();
    let ids: Vec<u64> = perms.iter().map(|p| p.id.get()).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_dashboard_totals() {
    let (server, ctl) = authed().await;
    mount_list(&server, "/api/v1/campuses", page(json!([]), 4, 1, 4)).await;
    mount_list(&server, "/api/v1/buildings", page(json!([]), 37, 1, 37)).await;
    mount_list(&server, "/api/v1/blocks", page(json!([]), 12, 1, 12)).await;

    let dashboard = ctl.dashboard().await;
    assert!(dashboard.notice.is_none());
    assert_eq!(dashboard.stats.campuses, 4);
    assert_eq!(dashboard.stats.buildings, 37);
    assert_eq!(dashboard.stats.blocks, 12);
}

#[tokio::test]
async fn test_dashboard_failure_zeroes_all() {
    let (server, ctl) = authed().await;
    mount_list(&server, "/api/v1/campuses", page(json!([]), 4, 1, 1)).await;
    mount_list(&server, "/api/v1/blocks", page(json!([]), 12, 1, 1)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dashboard = ctl.dashboard().await;
    assert_eq!(dashboard.stats.campuses, 0);
    assert_eq!(
        dashboard.notice.unwrap().message,
        "Failed to load dashboard statistics"
    );
}

#[tokio::test]
async fn test_menu_tree_and_pager() {
    let (server, ctl) = authed().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/campuses"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), 15, 2, 2)))
        .mount(&server)
        .await;
    mount_list(
        &server,
        "/api/v1/blocks",
        page(
            json!([{"id": 1, "name": "Block A", "campus": {"id": 9, "name": "Main"}}]),
            1,
            1,
            1,
        ),
    )
    .await;
    mount_list(
        &server,
        "/api/v1/buildings",
        page(json!([{"id": 5, "name": "Library", "block_id": 1}]), 1, 1, 1),
    )
    .await;

    let menu = ctl.menu(2).await;
    let CampusTree::Loaded(tree) = &menu.campuses else {
        panic!("expected a loaded tree, got {:?}", menu.campuses);
    };
    assert_eq!(tree[0].label, "Main");
    assert_eq!(tree[0].children[0].children[0].label, "Library");
    assert_eq!(menu.pager.next(), None);
    assert_eq!(menu.pager.previous(), Some(1));
}

#[tokio::test]
async fn test_menu_without_session() {
    let (_server, ctl) = setup().await;
    let menu = ctl.menu(1).await;
    assert_eq!(menu.campuses, CampusTree::Error(LOGIN_REQUIRED.to_owned()));
}

// ── Page workflow ───────────────────────────────────────────────────

#[tokio::test]
async fn test_page_load_and_resize() {
    let (server, ctl) = authed().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/campuses"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{"id": 1, "name": "Main"}, {"id": 2, "name": "Lideta"}]),
            22,
            1,
            3,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/campuses"))
        .and(query_param("limit", "20"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{"id": 1, "name": "Main"}]),
            22,
            1,
            2,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut list = ResourcePage::<Campus>::new();
    list.load(&ctl).await.unwrap();
    assert_eq!(list.view().footer(), "Showing 2 of 22 Results");
    assert_eq!(list.view().page_count, 3);

    list.resize(&ctl, 20).await.unwrap();
    let view = list.view();
    assert_eq!(view.page_count, 2);
    assert_eq!(view.page_size, 20);
}

#[tokio::test]
async fn test_submit_create_refetches() {
    let (server, ctl) = authed().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/buildings"))
        .and(body_json(json!({
            "name": "Science", "length": 20.0, "width": 0.0, "floors": 3,
            "basements": 0, "block_id": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": true, "message": "Created", "data": {"id": 9, "name": "Science"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{"id": 9, "name": "Science"}]),
            1,
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let values = FormValues::new()
        .with("name", "Science")
        .with("length", "20")
        .with("width", "")
        .with("floors", "3")
        .with("block_id", "2");
    let mut list = ResourcePage::<Building>::new();
    let outcome = list.submit(&ctl, FormMode::Create, &values).await;

    assert_eq!(
        outcome.notice().unwrap().message,
        "New building added successfully"
    );
    assert_eq!(list.rows().len(), 1);
}

#[tokio::test]
async fn test_submit_invalid_sends_nothing() {
    let (server, ctl) = authed().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut list = ResourcePage::<Building>::new();
    let outcome = list
        .submit(&ctl, FormMode::Create, &FormValues::new().with("name", "X"))
        .await;
    let SubmitOutcome::Invalid(fields) = outcome else {
        panic!("expected local validation failure");
    };
    assert!(fields.contains_key("block_id"));
}

#[tokio::test]
async fn test_update_failure_maps_fields() {
    let (server, ctl) = authed().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/roles/3"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The name has already been taken.",
            "errors": {"name": ["The name has already been taken."]}
        })))
        .mount(&server)
        .await;
    mount_list(&server, "/api/v1/roles", page(json!([]), 0, 1, 1)).await;

    let mut list = ResourcePage::<Role>::new();
    let values = FormValues::new().with("name", "Admin");
    let outcome = list.submit(&ctl, FormMode::Edit(id(3)), &values).await;

    let SubmitOutcome::Failed { notice, fields } = outcome else {
        panic!("expected a backend failure");
    };
    assert_eq!(notice.message, "The name has already been taken.");
    assert_eq!(fields["name"], "The name has already been taken.");
}

#[tokio::test]
async fn test_delete_notices() {
    let (server, ctl) = authed().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/campuses"))
        .and(body_json(json!({"id": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/campuses"))
        .and(body_json(json!({"id": 2})))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "In use"})))
        .mount(&server)
        .await;
    mount_list(&server, "/api/v1/campuses", page(json!([]), 0, 1, 1)).await;

    let mut list = ResourcePage::<Campus>::new();
    let ok = list.delete(&ctl, id(1)).await;
    assert_eq!(ok.message, "Campus deleted successfully");
    let failed = list.delete(&ctl, id(2)).await;
    assert!(failed.is_error());
    assert_eq!(failed.message, "Failed to delete campus");
}

#[tokio::test]
async fn test_get_not_found() {
    let (server, ctl) = authed().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/blocks/77"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = ctl
        .get::<campusdesk_core::Block>(id(77))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_transport_config_timeout_applies() {
    // A zero-retry controller against an unroutable port fails fast as a
    // connection error.
    let cfg = ControllerConfig::new("http://127.0.0.1:1/api/")
        .unwrap()
        .with_retry(RetryPolicy::none())
        .with_timeout(TransportConfig::default().timeout);
    let ctl = Controller::new(cfg).unwrap();
    let err = ctl
        .list::<Campus>(PageRequest::default(), &[])
        .await
        .unwrap_err();
    assert!(err.is_connection());
}
