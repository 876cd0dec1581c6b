//! Response definitions
//!
//! Bodies the store answers with. Operation failures travel in `error`, not
//! in the HTTP status.

use serde::{Deserialize, Serialize};

use super::PutRequest;
use crate::cell::Cell;
use crate::error::Result;

/// Answer to `get` and `getLatest`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(default)]
    pub cell: Option<Cell>,

    #[serde(default)]
    pub found: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GetResponse {
    /// Build from a store lookup
    pub fn from_result(result: Result<Option<Cell>>) -> Self {
        match result {
            Ok(Some(cell)) => Self {
                cell: Some(cell),
                found: true,
                error: None,
            },
            Ok(None) => Self::default(),
            Err(e) => Self::error(e.to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Answer to `partitionRead`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartitionReadResponse {
    #[serde(default)]
    pub cells: Vec<Cell>,

    #[serde(default)]
    pub found: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PartitionReadResponse {
    pub fn from_result(result: Result<Vec<Cell>>) -> Self {
        match result {
            Ok(cells) => Self {
                found: !cells.is_empty(),
                cells,
                error: None,
            },
            Err(e) => Self::error(e.to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Answer to `put`: echoes the addressed triple
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutResponse {
    #[serde(default)]
    pub table: String,

    #[serde(default)]
    pub row_key: String,

    #[serde(default)]
    pub column_key: String,

    #[serde(default)]
    pub ref_key: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PutResponse {
    pub fn for_request(request: &PutRequest, result: Result<()>) -> Self {
        Self {
            table: request.table.clone(),
            row_key: request.row_key.clone(),
            column_key: request.column_key.clone(),
            ref_key: request.ref_key,
            error: result.err().map(|e| e.to_string()),
        }
    }

    pub fn error(request: &PutRequest, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::for_request(request, Ok(()))
        }
    }
}
