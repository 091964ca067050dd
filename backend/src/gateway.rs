//! ==============================================================================
//! gateway.rs - http routes for readings
//! ==============================================================================
//!
//! routes:
//!     GET  /              -> fixed liveness message
//!     GET  /api/readings  -> up to MAX_READINGS readings, ascending id
//!     POST /api/readings  -> store one reading, return it with its id
//!
//! degraded mode:
//!     when the store is disconnected, list returns [] and create returns
//!     {"error": "Database not connected"}, both with status 200. callers
//!     detect the condition from the payload shape, not the status code.
//!
//! ==============================================================================

use crate::domain::{NewReading, Reading};
use crate::error::ApiError;
use crate::store::{ReadingStore, MAX_READINGS};

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

// ==============================================================================
// shared state
// ==============================================================================
// the only thing shared between requests is the store handle built at
// startup. it is read-only, so no locking is needed here; the driver handles
// concurrent access underneath.

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Serialize)]
struct SoftError {
    error: &'static str,
}

/// body of a create call: the stored reading, or the degraded-mode notice
#[derive(Serialize)]
#[serde(untagged)]
enum CreateOutcome {
    Created(Reading),
    NotConnected(SoftError),
}

/// a posted reading body
///
/// with a content type this is plain `Json` (so non-json types still get
/// 415). microcontroller http clients often send no content type at all;
/// those bodies are parsed as json anyway.
struct ReadingBody(NewReading);

#[async_trait]
impl<S> FromRequest<S> for ReadingBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(header::CONTENT_TYPE) {
            let Json(reading) = Json::<NewReading>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(reading));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to deserialize the JSON body: {}", e),
            )
                .into_response()
        })
    }
}

// ==============================================================================
// router
// ==============================================================================

/// routes only, no middleware
pub fn router(store: Arc<dyn ReadingStore>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/readings", get(list_readings).post(create_reading))
        .with_state(AppState { store })
}

/// the full application: routes plus cors and request tracing
pub fn app(store: Arc<dyn ReadingStore>, allowed_origins: &[String]) -> anyhow::Result<Router> {
    Ok(router(store)
        .layer(cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http()))
}

/// cors for a fixed origin allow-list
///
/// credentials are allowed, which rules out wildcard methods and headers, so
/// both are mirrored from the preflight request instead.
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                anyhow::bail!("Wildcard cors origin cannot be combined with credentials");
            }
            HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("Invalid cors origin {:?}: {}", origin, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

// ==============================================================================
// handlers
// ==============================================================================

async fn health_handler() -> Json<Message> {
    Json(Message {
        message: "IoT Backend is running!",
    })
}

async fn list_readings(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, ApiError> {
    if !state.store.status().is_connected() {
        return Ok(Json(Vec::new()));
    }

    let readings = state.store.recent(MAX_READINGS).await?;
    tracing::debug!(count = readings.len(), "listed readings");
    Ok(Json(readings))
}

async fn create_reading(
    State(state): State<AppState>,
    ReadingBody(reading): ReadingBody,
) -> Result<Json<CreateOutcome>, ApiError> {
    if !state.store.status().is_connected() {
        return Ok(Json(CreateOutcome::NotConnected(SoftError {
            error: "Database not connected",
        })));
    }

    let created = state.store.insert(reading).await?;
    tracing::info!(id = %created.id, "stored reading");
    Ok(Json(CreateOutcome::Created(created)))
}
