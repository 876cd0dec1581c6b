//! Network Tests
//!
//! Tests verify:
//! - Handler wire behavior through an in-process service
//! - Operation failures answer 200 with a populated `error`
//! - Client end-to-end against a bound server
//! - Client error mapping (protocol vs transport vs deadline)

use std::sync::Arc;
use std::time::Duration;

use actix_web::{test, web, App};
use cellstore::config::BackendKind;
use cellstore::network::{configure_routes, AppState};
use cellstore::protocol::{
    self, GetLatestRequest, GetRequest, GetResponse, PartitionReadRequest, PartitionReadResponse,
    PutRequest, PutResponse,
};
use cellstore::{Catalog, Client, Config, Context, Server, StoreError};
use serde_json::Value;

// =============================================================================
// Helper Functions
// =============================================================================

fn memory_catalog() -> Arc<Catalog> {
    let config = Config::builder()
        .backend(BackendKind::Memory)
        .tables(["cell"])
        .shard_count(4)
        .build();
    Arc::new(Catalog::open(&config).unwrap())
}

fn app_state(catalog: Arc<Catalog>) -> web::Data<AppState> {
    web::Data::new(AppState::new(catalog, Duration::from_secs(5)))
}

fn put_request(row: &str, r: i64, body: &str) -> PutRequest {
    PutRequest {
        table: "cell".to_string(),
        row_key: row.to_string(),
        column_key: "BASE".to_string(),
        ref_key: r,
        body: body.to_string(),
    }
}

// =============================================================================
// Handler Tests
// =============================================================================

#[actix_web::test]
async fn test_handlers_end_to_end_scenario() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(memory_catalog()))
            .configure(configure_routes),
    )
    .await;

    for (r, body) in [(1, "x"), (2, "y"), (3, "z")] {
        let req = test::TestRequest::post()
            .uri(protocol::PUT_PATH)
            .set_json(put_request("A", r, body))
            .to_request();
        let resp: PutResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.error.is_none());
        assert_eq!(resp.ref_key, r);
    }

    let req = test::TestRequest::post()
        .uri(protocol::GET_LATEST_PATH)
        .set_json(GetLatestRequest {
            table: "cell".to_string(),
            row_key: "A".to_string(),
            column_key: "BASE".to_string(),
        })
        .to_request();
    let resp: GetResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.found);
    assert_eq!(resp.cell.unwrap().body, "z");

    let req = test::TestRequest::post()
        .uri(protocol::GET_PATH)
        .set_json(GetRequest {
            table: "cell".to_string(),
            row_key: "unknown-row".to_string(),
            column_key: "BASE".to_string(),
            ref_key: 1,
        })
        .to_request();
    let resp: GetResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!resp.found);
    assert!(resp.error.is_none());
}

#[actix_web::test]
async fn test_operation_errors_answer_200() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(memory_catalog()))
            .configure(configure_routes),
    )
    .await;

    // Unknown table
    let mut bad_table = put_request("A", 1, "x");
    bad_table.table = "missing".to_string();
    let req = test::TestRequest::post()
        .uri(protocol::PUT_PATH)
        .set_json(bad_table)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: PutResponse = test::read_body_json(resp).await;
    assert!(body.error.unwrap().contains("missing"));

    // Out-of-range partition
    let req = test::TestRequest::post()
        .uri(protocol::PARTITION_READ_PATH)
        .set_json(PartitionReadRequest {
            table: "cell".to_string(),
            partition_number: 9,
            location: "added".to_string(),
            value: 0,
            limit: 10,
        })
        .to_request();
    let resp: PartitionReadResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!resp.found);
    assert!(resp.error.is_some());

    // Unsupported location field
    let req = test::TestRequest::post()
        .uri(protocol::PARTITION_READ_PATH)
        .set_json(PartitionReadRequest {
            table: "cell".to_string(),
            partition_number: 0,
            location: "body".to_string(),
            value: 0,
            limit: 10,
        })
        .to_request();
    let resp: PartitionReadResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.error.unwrap().contains("body"));
}

#[actix_web::test]
async fn test_malformed_body_is_client_error() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(memory_catalog()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(protocol::GET_PATH)
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn test_healthcheck() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(memory_catalog()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri(protocol::HEALTHCHECK_PATH).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tables"][0], "cell");
}

#[actix_web::test]
async fn test_operation_paths_accept_post_only() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(memory_catalog()))
            .configure(configure_routes),
    )
    .await;

    let paths = [
        protocol::GET_PATH,
        protocol::GET_LATEST_PATH,
        protocol::PARTITION_READ_PATH,
        protocol::PUT_PATH,
    ];
    for path in paths {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(!resp.status().is_success(), "GET {} succeeded", path);
    }
}

// =============================================================================
// Client Tests
// =============================================================================

#[actix_web::test]
async fn test_client_against_running_server() {
    let config = Config::builder()
        .backend(BackendKind::Memory)
        .tables(["cell"])
        .shard_count(4)
        .listen_addr("127.0.0.1:0")
        .workers(1)
        .build();
    let catalog = Arc::new(Catalog::open(&config).unwrap());
    let running = Server::new(config, catalog).bind().unwrap();
    let addr = running.addrs[0];
    let handle = running.handle();
    actix_web::rt::spawn(running.server);

    let client = Client::builder()
        .base_url(format!("http://{}", addr))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let ctx = Context::background();

    client.put(&ctx, "cell", "A", "BASE", 1, "x").await.unwrap();
    client.put(&ctx, "cell", "A", "BASE", 2, "y").await.unwrap();
    let ack = client.put(&ctx, "cell", "A", "BASE", 3, "z").await.unwrap();
    assert_eq!(ack.row_key, "A");

    let latest = client.get_latest(&ctx, "cell", "A", "BASE").await.unwrap().unwrap();
    assert_eq!(latest.body, "z");
    let first = client.get(&ctx, "cell", "A", "BASE", 1).await.unwrap().unwrap();
    assert_eq!(first.body, "x");
    assert!(client
        .get(&ctx, "cell", "unknown-row", "BASE", 1)
        .await
        .unwrap()
        .is_none());

    let mut total = 0;
    for partition in 0..4 {
        total += client
            .partition_read(&ctx, "cell", partition, "added", 0, 100)
            .await
            .unwrap()
            .len();
    }
    assert_eq!(total, 3);

    // Server-declared errors surface as protocol errors
    let err = client
        .put(&ctx, "cell", "A", "BASE", 1, "changed")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Protocol(_)));

    let err = client
        .get(&ctx, "nope", "A", "BASE", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Protocol(_)));

    // Non-2xx is a transport error, not a miss
    let misrouted = Client::builder()
        .base_url(format!("http://{}/not-mounted", addr))
        .build()
        .unwrap();
    let err = misrouted
        .get(&ctx, "cell", "A", "BASE", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_client_unreachable_server_is_transport_error() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = client
        .get(&Context::background(), "cell", "A", "BASE", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport(_) | StoreError::DeadlineExceeded));
}

#[actix_web::test]
async fn test_client_checks_context_before_sending() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let ctx = Context::background();
    ctx.cancel();

    let err = client.get_latest(&ctx, "cell", "A", "BASE").await.unwrap_err();
    assert!(matches!(err, StoreError::Canceled));
}

#[actix_web::test]
async fn test_client_builder_rejects_empty_url() {
    assert!(matches!(
        Client::builder().base_url("").build(),
        Err(StoreError::InvalidConfiguration(_))
    ));
}

#[actix_web::test]
async fn test_client_deadline_applies_in_flight() {
    // Accepts connections at the TCP level but never answers
    let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let client = Client::builder()
        .base_url(format!("http://{}", silent.local_addr().unwrap()))
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap();

    let ctx = Context::with_timeout(Duration::from_millis(200));
    let err = client
        .get(&ctx, "cell", "A", "BASE", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DeadlineExceeded));
}
