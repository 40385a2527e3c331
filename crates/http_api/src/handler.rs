//! Request handler and router

use std::collections::HashMap;
use std::net::SocketAddr;

use aggregator::ContentService;
use axum::extract::{ConnectInfo, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use contracts::ContentItem;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{parse_content_params, ApiError};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: ContentService,
    /// Cancelled when the server gives up on in-flight requests
    pub abort: CancellationToken,
}

impl AppState {
    pub fn new(service: ContentService) -> Self {
        Self {
            service,
            abort: CancellationToken::new(),
        }
    }
}

/// `GET /` only; every other path or method is 404
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_content).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

/// Content for the `count` / `offset` query parameters
#[instrument(name = "http_get_content", skip_all, fields(remote = %remote))]
pub async fn get_content(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let params = parse_content_params(&query)?;
    let user_ip = remote.ip().to_string();

    let items = state
        .service
        .get_content_with_cancel(&user_ip, params.count, params.offset, state.abort.child_token())
        .await?;

    debug!(count = params.count, offset = params.offset, items = items.len(), "Responding");
    Ok(Json(items))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
