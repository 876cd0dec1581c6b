//! Protocol Module
//!
//! JSON request/response schemas for the remote store protocol.
//!
//! ## Endpoints (all `POST`, `application/json`)
//! - `/api/get`           - [`GetRequest`] → [`GetResponse`]
//! - `/api/getLatest`     - [`GetLatestRequest`] → [`GetResponse`]
//! - `/api/partitionRead` - [`PartitionReadRequest`] → [`PartitionReadResponse`]
//! - `/api/put`           - [`PutRequest`] → [`PutResponse`]
//!
//! ### Error Convention
//! Every response carries an optional `error` string. Present and non-empty
//! means the operation failed; otherwise check `found` to tell a hit from a
//! miss.

mod request;
mod response;
mod codec;

pub use request::{GetLatestRequest, GetRequest, PartitionReadRequest, PutRequest};
pub use response::{GetResponse, PartitionReadResponse, PutResponse};
pub use codec::{decode, encode, MAX_BODY_SIZE};

/// Content type for every request and response
pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const GET_PATH: &str = "/api/get";
pub const GET_LATEST_PATH: &str = "/api/getLatest";
pub const PARTITION_READ_PATH: &str = "/api/partitionRead";
pub const PUT_PATH: &str = "/api/put";
pub const HEALTHCHECK_PATH: &str = "/api/healthcheck";
