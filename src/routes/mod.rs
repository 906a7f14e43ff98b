// Route exports
pub mod matches;
pub mod reports;

use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::ErrorResponse;
use crate::services::{MatchStore, RadiusSearchService, ReportService};

/// Header carrying the authenticated user id, set by the gateway in front of us
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MatchStore>,
    pub reports: ReportService,
    pub search: RadiusSearchService,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(reports::configure)
            .configure(matches::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(crate::models::HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Errors returned from handlers, rendered as [`ErrorResponse`] JSON
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Service(ServiceError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized(message) => write!(f, "Unauthorized: {}", message),
            ApiError::Service(e) => write!(f, "{}", e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError::Service(value)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::Service(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let (error, message) = match self {
            ApiError::Unauthorized(message) => ("unauthorized", message.clone()),
            ApiError::Service(ServiceError::Store(e)) => {
                tracing::error!("Storage failure while handling request: {}", e);
                ("internal_error", "storage failure".to_string())
            }
            ApiError::Service(e) => (e.kind(), e.to_string()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error.to_string(),
            message,
            status_code: self.status_code().as_u16(),
        })
    }
}

/// Extract the requester's id from [`USER_ID_HEADER`]
pub fn requester_id(req: &HttpRequest) -> Result<Uuid, ApiError> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Unauthorized(format!("malformed {} header", USER_ID_HEADER)))
}

/// Turn `validator` failures into a 400
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    ApiError::Service(ServiceError::Validation(errors.to_string()))
}
