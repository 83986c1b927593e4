use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;

/// Landing route confirming the API is up.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Tareas API with authentication is running"
    }))
}

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}

/// Fallback for every unmatched method/path.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".into()))
}
