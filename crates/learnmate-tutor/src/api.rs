//! HTTP API for the LearnMate tutor.
//!
//! # Endpoints
//!
//! - `GET /` - Service metadata and endpoint listing
//! - `GET /health` - Liveness check
//! - `POST /api/tutor/chat` - Ask the tutor a question
//! - `GET /api/tutor/subjects` - Subject catalog
//! - `GET /api/tutor/study-tips` - Study tips
//!
//! # Example
//!
//! ```no_run
//! use learnmate_tutor::{create_router, AppState, Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(Config::from_env()?)?;
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, Any as AnyCors, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::catalog::{StudyTip, SubjectCatalog, STUDY_TIPS};
use crate::engine::{trace_phase, RequestPhase, TutorEngine};
use crate::error::{Result, TutorError};
use crate::gate::{is_educational, redirect_response};
use crate::models::{ErrorResponse, TutorRequest, TutorResponse};
use crate::Config;

/// Service name reported by the metadata endpoints.
pub const SERVICE_NAME: &str = "LearnMate AI Tutor";

// ============================================================================
// Response Types
// ============================================================================

/// Paths of the public endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointListing {
    /// Chat endpoint.
    pub chat: String,
    /// Subject catalog endpoint.
    pub subjects: String,
    /// Study tips endpoint.
    pub study_tips: String,
    /// Health endpoint.
    pub health: String,
}

impl Default for EndpointListing {
    fn default() -> Self {
        Self {
            chat: "/api/tutor/chat".to_string(),
            subjects: "/api/tutor/subjects".to_string(),
            study_tips: "/api/tutor/study-tips".to_string(),
            health: "/health".to_string(),
        }
    }
}

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    /// Welcome line.
    pub message: String,
    /// One-sentence description of the service.
    pub description: String,
    /// Crate version.
    pub version: String,
    /// Public endpoints.
    pub endpoints: EndpointListing,
    /// Always `running`.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy`.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
    /// Service name.
    pub service: String,
}

/// Response body for `GET /api/tutor/subjects`.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectsResponse {
    /// Catalog keyed by subject identifier.
    pub subjects: SubjectCatalog,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Response body for `GET /api/tutor/study-tips`.
#[derive(Debug, Clone, Serialize)]
pub struct StudyTipsResponse {
    /// Tips in display order.
    pub tips: &'static [StudyTip],
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
///
/// Read-only after construction; handlers share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
    /// The tutoring engine.
    pub engine: TutorEngine,
}

impl AppState {
    /// Creates state whose engine calls the configured upstream API.
    pub fn new(config: Config) -> Result<Self> {
        let engine = TutorEngine::from_config(&config)?;
        Ok(Self { config, engine })
    }

    /// Creates state around an existing engine.
    #[must_use]
    pub const fn with_engine(config: Config, engine: TutorEngine) -> Self {
        Self { config, engine }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// The request was invalid.
    BadRequest(String),
    /// The service is misconfigured.
    Configuration(String),
    /// The body could not be extracted.
    Rejected { status: StatusCode, message: String },
    /// Anything else.
    Internal(String),
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else if err.is_configuration_error() {
            Self::Configuration(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Configuration(msg) | Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            Self::Rejected { status, message } => (status, message),
        };

        error_response(status, message)
    }
}

/// Renders an error body for the given status.
fn error_response(status: StatusCode, message: String) -> Response {
    let error = status.canonical_reason().unwrap_or("Error");
    let body = Json(ErrorResponse::new(error, message));
    (status, body).into_response()
}

/// Converts a handler panic into a 500 error body.
#[allow(clippy::needless_pass_by_value)]
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    error!(detail, "Handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, detail.to_string())
}

// ============================================================================
// Router Setup
// ============================================================================

/// Builds the CORS layer from the configured origins.
fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(AnyCors)
            .allow_methods(methods)
            .allow_headers(AnyCors);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Creates the HTTP router with all endpoints.
///
/// The router carries:
/// - tutor routes under `/api/tutor`
/// - panic recovery answering 500 with an error body
/// - tracing middleware for request logging
/// - CORS restricted to the configured origins
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let tutor_routes = Router::new()
        .route("/chat", post(handle_chat))
        .route("/subjects", get(handle_subjects))
        .route("/study-tips", get(handle_study_tips));

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .nest("/api/tutor", tutor_routes)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `GET /`.
async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "🎓 Welcome to LearnMate AI Tutor Backend!".to_string(),
        description: "AI-powered educational assistant backed by a chat-completion model"
            .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: EndpointListing::default(),
        status: "running".to_string(),
        timestamp: Utc::now(),
    })
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
    })
}

/// Handler for `GET /api/tutor/subjects`.
async fn handle_subjects() -> Json<SubjectsResponse> {
    Json(SubjectsResponse {
        subjects: SubjectCatalog,
        timestamp: Utc::now(),
    })
}

/// Handler for `GET /api/tutor/study-tips`.
async fn handle_study_tips() -> Json<StudyTipsResponse> {
    Json(StudyTipsResponse {
        tips: STUDY_TIPS,
        timestamp: Utc::now(),
    })
}

/// Handler for `POST /api/tutor/chat`.
///
/// Checks configuration and input, applies the educational gate, then
/// hands the request to the engine.
async fn handle_chat(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TutorRequest>, JsonRejection>,
) -> std::result::Result<Json<TutorResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected chat request body");
        ApiError::from(rejection)
    })?;

    info!(
        message_len = request.message.len(),
        history = request.conversation_history.len(),
        subject_hint = ?request.subject,
        "Received chat request"
    );

    if !state.config.has_api_key() {
        error!("Chat request refused: no upstream API key configured");
        return Err(TutorError::MissingApiKey.into());
    }

    if request.is_blank() {
        warn!("Chat request refused: empty message");
        return Err(TutorError::EmptyMessage.into());
    }

    let phase = trace_phase(RequestPhase::Received, RequestPhase::GateCheck);
    if !is_educational(&request.message) {
        let phase = trace_phase(phase, RequestPhase::Redirected);
        info!("Off-topic message redirected to education");
        trace_phase(phase, RequestPhase::Responded);
        return Ok(Json(redirect_response()));
    }

    Ok(Json(state.engine.respond(&request).await))
}

// ============================================================================
// Tests
// ============================================================================
