use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError, get};
use serde::Serialize;

use crate::routes::respond;
use crate::services::ServiceError;

#[derive(Debug, Serialize)]
struct HealthStatus {
    message: &'static str,
    timestamp: i64,
    pid: u32,
    version: &'static str,
}

#[get("/health")]
pub async fn health() -> impl Responder {
    respond(
        StatusCode::OK,
        "Healthy",
        HealthStatus {
            message: "OK",
            timestamp: chrono::Utc::now().timestamp_millis(),
            pid: std::process::id(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    ServiceError::not_found(format!("Route Not Found - {}", req.uri())).error_response()
}
