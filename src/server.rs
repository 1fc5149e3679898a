// ZIP Forecast Dashboard - HTTP routes
// Browser page plus a small JSON API over the same page model

use crate::data::DataCache;
use crate::error::DashboardResult;
use crate::filter::zip_options;
use crate::page::{build_page, PageState};
use crate::web::{render_load_error, render_page};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Arc<DataCache>,
}

impl AppState {
    pub fn new(cache: DataCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }
}

/// API Response wrapper
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub zip: Option<String>,
}

/// Run a cache read on the blocking pool; a cold cache reads the CSV files
async fn blocking<T, F>(f: F) -> DashboardResult<T>
where
    F: FnOnce() -> DashboardResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_err) => std::panic::resume_unwind(join_err.into_panic()),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - The dashboard page
#[instrument(skip(state))]
async fn dashboard(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let zip = query.zip.filter(|z| !z.trim().is_empty());
    let cache = state.cache.clone();

    match blocking(move || build_page(&cache, zip.as_deref())).await {
        Ok(page) => Html(render_page(&page)).into_response(),
        Err(e) => {
            error!("Error loading dashboard data: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_load_error(&e))).into_response()
        }
    }
}

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(serde_json::json!({
        "status": "OK",
        "version": crate::VERSION,
        "data_loaded": state.cache.is_loaded(),
    })))
}

/// GET /api/zips - Sorted ZIP options
#[instrument(skip(state))]
async fn list_zips(State(state): State<AppState>) -> Response {
    let cache = state.cache.clone();

    match blocking(move || cache.get()).await {
        Ok(dataset) => Json(ApiResponse::ok(zip_options(&dataset.timeseries))).into_response(),
        Err(e) => {
            error!("Error loading dashboard data: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<String>>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/zips/:zip - Page model for one ZIP
#[instrument(skip(state))]
async fn zip_page(State(state): State<AppState>, Path(zip): Path<String>) -> Response {
    let cache = state.cache.clone();

    match blocking(move || build_page(&cache, Some(&zip))).await {
        Ok(page @ PageState::Rendered(_)) => Json(ApiResponse::ok(page)).into_response(),
        Ok(PageState::NoZipMatch { message, .. }) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<PageState>::err(message)),
        )
            .into_response(),
        Ok(PageState::NoData { message }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::<PageState>::err(message)),
        )
            .into_response(),
        Err(e) => {
            error!("Error loading dashboard data: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<PageState>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// POST /api/cache/clear - Drop the cached tables; next request reloads
async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.cache.clear();
    info!("dataset cache cleared on request");
    Json(ApiResponse::ok("cache cleared"))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/zips", get(list_zips))
        .route("/zips/:zip", get(zip_page))
        .route("/cache/clear", post(clear_cache));

    Router::new()
        .route("/", get(dashboard))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
