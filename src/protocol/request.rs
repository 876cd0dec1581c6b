//! Request definitions
//!
//! Bodies clients POST to the store.

use serde::{Deserialize, Serialize};

/// `POST /api/get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRequest {
    pub table: String,
    pub row_key: String,
    pub column_key: String,
    pub ref_key: i64,
}

/// `POST /api/getLatest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLatestRequest {
    pub table: String,
    pub row_key: String,
    pub column_key: String,
}

/// `POST /api/partitionRead`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionReadRequest {
    pub table: String,
    pub partition_number: usize,
    /// Location field name, e.g. `added`
    pub location: String,
    /// Exclusive lower bound on the location field
    pub value: u64,
    pub limit: usize,
}

/// `POST /api/put`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRequest {
    pub table: String,
    pub row_key: String,
    pub column_key: String,
    pub ref_key: i64,
    pub body: String,
}
