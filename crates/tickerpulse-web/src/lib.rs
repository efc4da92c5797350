//! # Tickerpulse Web
//!
//! HTTP boundary of the quote proxy. The browser ticker posts a symbol list
//! and gets back one quote record per symbol, in request order.
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `OPTIONS` | `/`, `/get-stock-prices` | empty `200` (CORS preflight) |
//! | `POST` | `/`, `/get-stock-prices` | `200` JSON array of quote records, `500 {"error"}` on a malformed body |
//! | `GET` | `/health` | provider health snapshot |
//!
//! Every response carries `Access-Control-Allow-Origin: *` and the allowed
//! request headers list used by the site's client library.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tickerpulse_core::{CoreError, HealthStatus, QuoteRecord, QuoteService};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod cli;
pub mod error;
pub mod obs;

pub use error::{ApiError, ServerError};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<QuoteService>,
}

impl AppState {
    pub fn new(service: QuoteService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &QuoteService {
        &self.service
    }
}

/// `POST` body.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteBatchRequest {
    pub symbols: Vec<String>,
}

/// Builds the router with CORS, tracing and the request timeout applied.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", post(quote_batch).options(preflight))
        .route("/get-stock-prices", post(quote_batch).options(preflight))
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

// The body is taken as raw bytes so that a missing or wrong content type is
// treated like any other malformed body.
async fn quote_batch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<QuoteRecord>>, ApiError> {
    let request: QuoteBatchRequest = serde_json::from_slice(&body).map_err(CoreError::from)?;
    tracing::debug!(symbols = request.symbols.len(), "quote batch requested");
    Ok(Json(state.service.quote_batch(&request.symbols).await))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.service.health().await)
}
