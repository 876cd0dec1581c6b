//! Request handlers
//!
//! One handler per protocol endpoint. Operation failures are answered with
//! HTTP 200 and a populated `error`; only a failed blocking task is a 500.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::cell::{Cell, Location};
use crate::catalog::Catalog;
use crate::context::Context;
use crate::protocol::{
    GetLatestRequest, GetRequest, GetResponse, PartitionReadRequest, PartitionReadResponse,
    PutRequest, PutResponse,
};

/// Shared state for every handler
pub struct AppState {
    pub catalog: Arc<Catalog>,

    /// Deadline given to each request's store call
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, request_timeout: Duration) -> Self {
        Self {
            catalog,
            request_timeout,
        }
    }

    fn context(&self) -> Context {
        Context::with_timeout(self.request_timeout)
    }
}

/// POST /api/get
pub async fn get(req: web::Json<GetRequest>, state: web::Data<AppState>) -> impl Responder {
    let request = req.into_inner();
    let store = match state.catalog.get(&request.table) {
        Ok(store) => store,
        Err(e) => return HttpResponse::Ok().json(GetResponse::error(e.to_string())),
    };

    let ctx = state.context();
    let started = Instant::now();
    let outcome = web::block(move || {
        store.get(&ctx, &request.row_key, &request.column_key, request.ref_key)
    })
    .await;

    match outcome {
        Ok(result) => {
            let response = GetResponse::from_result(result);
            tracing::debug!(found = response.found, elapsed = ?started.elapsed(), "get served");
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!("get task failed: {}", e);
            HttpResponse::InternalServerError().json(GetResponse::error(e.to_string()))
        }
    }
}

/// POST /api/getLatest
pub async fn get_latest(
    req: web::Json<GetLatestRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let request = req.into_inner();
    let store = match state.catalog.get(&request.table) {
        Ok(store) => store,
        Err(e) => return HttpResponse::Ok().json(GetResponse::error(e.to_string())),
    };

    let ctx = state.context();
    let started = Instant::now();
    let outcome =
        web::block(move || store.get_latest(&ctx, &request.row_key, &request.column_key)).await;

    match outcome {
        Ok(result) => {
            let response = GetResponse::from_result(result);
            tracing::debug!(found = response.found, elapsed = ?started.elapsed(), "getLatest served");
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!("getLatest task failed: {}", e);
            HttpResponse::InternalServerError().json(GetResponse::error(e.to_string()))
        }
    }
}

/// POST /api/partitionRead
pub async fn partition_read(
    req: web::Json<PartitionReadRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let request = req.into_inner();
    let store = match state.catalog.get(&request.table) {
        Ok(store) => store,
        Err(e) => return HttpResponse::Ok().json(PartitionReadResponse::error(e.to_string())),
    };
    let location: Location = match request.location.parse() {
        Ok(location) => location,
        Err(e) => return HttpResponse::Ok().json(PartitionReadResponse::error(e.to_string())),
    };

    let ctx = state.context();
    let started = Instant::now();
    let outcome = web::block(move || {
        store.partition_read(
            &ctx,
            request.partition_number,
            location,
            request.value,
            request.limit,
        )
    })
    .await;

    match outcome {
        Ok(result) => {
            let response = PartitionReadResponse::from_result(result);
            tracing::debug!(
                cells = response.cells.len(),
                elapsed = ?started.elapsed(),
                "partitionRead served"
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!("partitionRead task failed: {}", e);
            HttpResponse::InternalServerError().json(PartitionReadResponse::error(e.to_string()))
        }
    }
}

/// POST /api/put
pub async fn put(req: web::Json<PutRequest>, state: web::Data<AppState>) -> impl Responder {
    let request = req.into_inner();
    let store = match state.catalog.get(&request.table) {
        Ok(store) => store,
        Err(e) => return HttpResponse::Ok().json(PutResponse::error(&request, e.to_string())),
    };

    let ctx = state.context();
    let started = Instant::now();
    let task_request = request.clone();
    let outcome = web::block(move || {
        let cell = Cell::with_body(task_request.body);
        store.put(
            &ctx,
            &task_request.row_key,
            &task_request.column_key,
            task_request.ref_key,
            cell,
        )
    })
    .await;

    match outcome {
        Ok(result) => {
            if let Err(e) = &result {
                tracing::warn!(table = %request.table, "put failed: {}", e);
            } else {
                tracing::debug!(elapsed = ?started.elapsed(), "put served");
            }
            HttpResponse::Ok().json(PutResponse::for_request(&request, result))
        }
        Err(e) => {
            tracing::error!("put task failed: {}", e);
            HttpResponse::InternalServerError().json(PutResponse::error(&request, e.to_string()))
        }
    }
}

/// GET /api/healthcheck
pub async fn healthcheck(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "tables": state.catalog.tables(),
    }))
}
