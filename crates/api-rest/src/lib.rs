//! # API REST
//!
//! Read-only REST API for the medication catalog.
//!
//! Handles:
//! - HTTP endpoints with axum (`/medications/`, `/medications/{id}/`)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//!
//! The store is synchronous SQLite, so each handler runs its gateway call on
//! tokio's blocking pool.

#![warn(rust_2018_idioms)]

use api_shared::wire::{ApiRootRes, ErrorRes, HealthRes, MedicationRes};
use api_shared::HealthService;
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use medrec_core::{
    CoreConfig, MedicationError, MedicationGateway, MedicationId, SqliteMedicationStore,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type Gateway = MedicationGateway<SqliteMedicationStore>;

/// Application state for the REST API server
///
/// Holds the gateway shared by every handler. The gateway itself carries only
/// configuration; connections are opened per request.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            gateway: Arc::new(MedicationGateway::new(SqliteMedicationStore::new(cfg))),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(api_root, health, list_medications, get_medication),
    components(schemas(MedicationRes, HealthRes, ApiRootRes, ErrorRes))
)]
pub struct ApiDoc;

/// Builds the REST router with docs and CORS applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .route("/health", get(health))
        .route("/medications/", get(list_medications))
        .route("/medications/:id/", get(get_medication))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Failure responses produced by handlers.
///
/// Every route is a read, so a store failure other than a missing record is a
/// server fault.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(ErrorRes::not_found())).into_response()
            }
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorRes::internal())).into_response()
            }
        }
    }
}

impl From<MedicationError> for ApiError {
    fn from(err: MedicationError) -> Self {
        match err {
            MedicationError::NotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!("Medication store error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

/// Runs a gateway call on the blocking pool.
async fn with_gateway<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Gateway) -> Result<T, MedicationError> + Send + 'static,
{
    let gateway = state.gateway.clone();
    match tokio::task::spawn_blocking(move || f(&gateway)).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!("Blocking task failed: {:?}", e);
            Err(ApiError::Internal)
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "API root", body = ApiRootRes)
    )
)]
/// API root listing the available collections
async fn api_root() -> Json<ApiRootRes> {
    Json(ApiRootRes {
        medications: "/medications/".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Does not touch the
/// database.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/medications/",
    responses(
        (status = 200, description = "All medications, ordered by start_date then id", body = [MedicationRes]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List all medications
///
/// Returns every record ordered by `start_date` ascending, ties broken by `id`
/// ascending. No filtering or pagination.
///
/// # Errors
/// Returns `500 Internal Server Error` if the store cannot be read.
#[axum::debug_handler]
async fn list_medications(
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicationRes>>, ApiError> {
    let medications = with_gateway(&state, |gateway| gateway.list_medications()).await?;
    Ok(Json(medications))
}

#[utoipa::path(
    get,
    path = "/medications/{id}/",
    params(
        ("id" = i64, Path, description = "Medication id")
    ),
    responses(
        (status = 200, description = "Medication found", body = MedicationRes),
        (status = 404, description = "No medication with this id", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Retrieve one medication
///
/// # Errors
/// Returns `404 Not Found` if the id is unknown or not an integer, and
/// `500 Internal Server Error` if the store cannot be read.
#[axum::debug_handler]
async fn get_medication(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<MedicationRes>, ApiError> {
    let id: MedicationId = id.parse().map_err(|_| ApiError::NotFound)?;
    let medication = with_gateway(&state, move |gateway| gateway.get_medication(id)).await?;
    Ok(Json(medication))
}
