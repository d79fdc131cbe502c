//! REST surface over [`AsyncAuctionResults`].
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /health` | liveness |
//! | `POST /api/auction-results` | search or grouped aggregation |
//! | `GET /api/makes` | distinct makes in the store |

pub mod error;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use crate::async_client::AsyncAuctionResults;
use crate::models::{SearchRequest, SearchResponse};

pub use error::AppError;

pub fn router(client: AsyncAuctionResults) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auction-results", post(search))
        .route("/api/makes", get(makes))
        .with_state(client)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// POST /api/auction-results
///
/// Body is a [`SearchRequest`]. Malformed JSON and invalid filters are 400s.
async fn search(
    State(client): State<AsyncAuctionResults>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let response = client.search(request).await?;
    Ok(Json(response))
}

/// GET /api/makes
async fn makes(State(client): State<AsyncAuctionResults>) -> Result<Json<Value>, AppError> {
    let makes = client.makes().await?;
    let count = makes.len();
    Ok(Json(json!({ "data": makes, "count": count })))
}
