//! Codec Tests
//!
//! Tests for the JSON wire shapes of requests and responses.

use cellstore::protocol::{
    decode, encode, GetRequest, GetResponse, PartitionReadRequest, PartitionReadResponse,
    PutRequest, PutResponse, MAX_BODY_SIZE,
};
use cellstore::{Cell, StoreError};
use serde_json::{json, Value};

fn to_value<T: serde::Serialize>(body: &T) -> Value {
    serde_json::from_slice(&encode(body).unwrap()).unwrap()
}

// =============================================================================
// Request Shape Tests
// =============================================================================

#[test]
fn test_get_request_field_names() {
    let request = GetRequest {
        table: "cell".to_string(),
        row_key: "A".to_string(),
        column_key: "BASE".to_string(),
        ref_key: -7,
    };
    assert_eq!(
        to_value(&request),
        json!({"table": "cell", "rowKey": "A", "columnKey": "BASE", "refKey": -7})
    );
}

#[test]
fn test_partition_read_request_from_wire() {
    let raw = br#"{"table":"cell","partitionNumber":2,"location":"added","value":0,"limit":50}"#;
    let request: PartitionReadRequest = decode(raw).unwrap();
    assert_eq!(request.partition_number, 2);
    assert_eq!(request.location, "added");
    assert_eq!(request.limit, 50);
}

#[test]
fn test_missing_request_field_is_rejected() {
    let raw = br#"{"table":"cell","rowKey":"A"}"#;
    let err = decode::<GetRequest>(raw).unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}

#[test]
fn test_non_json_is_rejected() {
    assert!(matches!(
        decode::<GetRequest>(b"<html>oops</html>"),
        Err(StoreError::Serialization(_))
    ));
}

#[test]
fn test_oversized_body_is_rejected() {
    let huge = vec![b' '; MAX_BODY_SIZE + 1];
    assert!(matches!(
        decode::<Value>(&huge),
        Err(StoreError::Serialization(_))
    ));
}

// =============================================================================
// Response Shape Tests
// =============================================================================

#[test]
fn test_get_response_hit() {
    let cell = Cell {
        added: 99,
        ..Cell::new("A", "BASE", 3, "z")
    };
    let response = GetResponse::from_result(Ok(Some(cell)));
    assert_eq!(
        to_value(&response),
        json!({
            "cell": {"rowKey": "A", "columnKey": "BASE", "refKey": 3, "body": "z", "added": 99},
            "found": true
        })
    );
}

#[test]
fn test_get_response_miss_omits_error() {
    let value = to_value(&GetResponse::from_result(Ok(None)));
    assert_eq!(value, json!({"cell": null, "found": false}));
}

#[test]
fn test_get_response_error_is_populated() {
    let response = GetResponse::from_result(Err(StoreError::Backend("disk gone".to_string())));
    assert!(!response.found);
    assert!(response.error.unwrap().contains("disk gone"));
}

#[test]
fn test_partition_response_found_tracks_cells() {
    let empty = PartitionReadResponse::from_result(Ok(Vec::new()));
    assert!(!empty.found);
    assert!(empty.error.is_none());

    let page = PartitionReadResponse::from_result(Ok(vec![Cell::new("a", "b", 1, "c")]));
    assert!(page.found);
    assert_eq!(page.cells.len(), 1);
}

#[test]
fn test_put_response_echoes_triple() {
    let request = PutRequest {
        table: "cell".to_string(),
        row_key: "A".to_string(),
        column_key: "BASE".to_string(),
        ref_key: 1,
        body: "x".to_string(),
    };
    let ok = PutResponse::for_request(&request, Ok(()));
    assert_eq!(
        to_value(&ok),
        json!({"table": "cell", "rowKey": "A", "columnKey": "BASE", "refKey": 1})
    );

    let failed = PutResponse::error(&request, "Data store is closed");
    assert_eq!(failed.row_key, "A");
    assert_eq!(failed.error.as_deref(), Some("Data store is closed"));
}

#[test]
fn test_cell_without_added_decodes() {
    let cell: Cell = decode(br#"{"rowKey":"r","columnKey":"c","refKey":1,"body":"b"}"#).unwrap();
    assert_eq!(cell.added, 0);
}
