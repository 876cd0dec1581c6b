//! Remote store client
//!
//! Issues one POST per operation against a `cellstore-server`.
//!
//! ## Error mapping
//! - connection failure, non-2xx status, undecodable body → `Transport`
//! - populated `error` field → `Protocol`
//! - expired deadline → `DeadlineExceeded`
//!
//! ## Cancellation
//! The `Context` is checked once, before a request is sent. After that only
//! its deadline applies, as the request timeout; a later `cancel()` does not
//! abort a request already in flight.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cell::Cell;
use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::protocol::{
    self, GetLatestRequest, GetRequest, GetResponse, PartitionReadRequest, PartitionReadResponse,
    PutRequest, PutResponse, CONTENT_TYPE_JSON,
};

/// Client for the remote protocol
///
/// # Examples
///
/// ```rust,no_run
/// use cellstore::{Client, Context};
///
/// # async fn example() -> cellstore::Result<()> {
/// let client = Client::builder()
///     .base_url("http://localhost:4444")
///     .build()?;
///
/// let ctx = Context::background();
/// client.put(&ctx, "cell", "user-1", "BASE", 1, r#"{"name":"x"}"#).await?;
/// let latest = client.get_latest(&ctx, "cell", "user-1", "BASE").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the cell designated (row key, column key, ref key)
    pub async fn get(
        &self,
        ctx: &Context,
        table: &str,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
    ) -> Result<Option<Cell>> {
        let request = GetRequest {
            table: table.to_string(),
            row_key: row_key.to_string(),
            column_key: column_key.to_string(),
            ref_key,
        };
        let response: GetResponse = self.post(ctx, protocol::GET_PATH, &request).await?;
        Self::into_cell(response)
    }

    /// Get the cell with the highest ref key for (row key, column key)
    pub async fn get_latest(
        &self,
        ctx: &Context,
        table: &str,
        row_key: &str,
        column_key: &str,
    ) -> Result<Option<Cell>> {
        let request = GetLatestRequest {
            table: table.to_string(),
            row_key: row_key.to_string(),
            column_key: column_key.to_string(),
        };
        let response: GetResponse = self.post(ctx, protocol::GET_LATEST_PATH, &request).await?;
        Self::into_cell(response)
    }

    /// Scan `limit` cells after `value` from shard `partition_number`
    pub async fn partition_read(
        &self,
        ctx: &Context,
        table: &str,
        partition_number: usize,
        location: &str,
        value: u64,
        limit: usize,
    ) -> Result<Vec<Cell>> {
        let request = PartitionReadRequest {
            table: table.to_string(),
            partition_number,
            location: location.to_string(),
            value,
            limit,
        };
        let response: PartitionReadResponse =
            self.post(ctx, protocol::PARTITION_READ_PATH, &request).await?;
        if let Some(message) = response.error.filter(|e| !e.is_empty()) {
            return Err(StoreError::Protocol(message));
        }
        if response.found == response.cells.is_empty() {
            return Err(StoreError::Transport(format!(
                "inconsistent partitionRead response: found={} with {} cells",
                response.found,
                response.cells.len()
            )));
        }
        Ok(response.cells)
    }

    /// Append a cell version
    pub async fn put(
        &self,
        ctx: &Context,
        table: &str,
        row_key: &str,
        column_key: &str,
        ref_key: i64,
        body: &str,
    ) -> Result<PutResponse> {
        let request = PutRequest {
            table: table.to_string(),
            row_key: row_key.to_string(),
            column_key: column_key.to_string(),
            ref_key,
            body: body.to_string(),
        };
        let response: PutResponse = self.post(ctx, protocol::PUT_PATH, &request).await?;
        if let Some(message) = response.error.clone().filter(|e| !e.is_empty()) {
            return Err(StoreError::Protocol(message));
        }
        Ok(response)
    }

    fn into_cell(response: GetResponse) -> Result<Option<Cell>> {
        if let Some(message) = response.error.filter(|e| !e.is_empty()) {
            return Err(StoreError::Protocol(message));
        }
        match (response.found, response.cell) {
            (true, Some(cell)) => Ok(Some(cell)),
            (true, None) => Err(StoreError::Transport(
                "response marked found without a cell".to_string(),
            )),
            (false, _) => Ok(None),
        }
    }

    async fn post<Req, Resp>(&self, ctx: &Context, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        ctx.check()?;
        let payload = protocol::encode(request)?;
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(payload);
        if let Some(remaining) = ctx.remaining() {
            builder = builder.timeout(remaining);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(Self::map_send_error)?;
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        if !status.is_success() {
            let preview: String = String::from_utf8_lossy(&body).chars().take(200).collect();
            return Err(StoreError::Transport(format!(
                "HTTP {} from {}: {}",
                status, path, preview
            )));
        }

        protocol::decode(&body).map_err(|e| {
            StoreError::Transport(format!("malformed response from {}: {}", path, e))
        })
    }

    fn map_send_error(err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::DeadlineExceeded
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    base_url: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: "http://127.0.0.1:4444".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Server base URL, e.g. `http://localhost:4444`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Upper bound on any request; a context deadline may shorten it
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Client> {
        if self.base_url.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "client base_url must not be empty".to_string(),
            ));
        }
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Client {
            base_url: self.base_url,
            http_client,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
