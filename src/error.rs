//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce maps onto one of its variants, and from there onto
//! an HTTP status with a JSON body of the form `{"error": "<message>"}`.
//!
//! `AppError` implements `actix_web::error::ResponseError`. `From` implementations for the
//! errors raised by file I/O, JSON handling, validation, JWT processing and bcrypt let
//! handlers and services use the `?` operator.
//!
//! Internal errors are additionally passed through [`render_internal_error`], the
//! centralized formatter that logs them and decides how much detail reaches the client.

use actix_web::{
    dev::ServiceResponse,
    error::{BlockingError, JsonPayloadError, PathError, QueryPayloadError, ResponseError},
    http::StatusCode,
    middleware::ErrorHandlerResponse,
    web, HttpRequest, HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::config::Config;

/// Represents all possible errors that can occur within the application.
///
/// Each variant carries a message. Client-facing variants expose it verbatim in the
/// response body; `InternalServerError` does not.
#[derive(Debug)]
pub enum AppError {
    /// Represents an unauthorized access attempt (HTTP 401).
    /// Bad credentials, or a missing or invalid bearer token.
    Unauthorized(String),
    /// Represents a client-side error due to a malformed or incomplete request (HTTP 400).
    BadRequest(String),
    /// The request collides with existing state, e.g. a taken username.
    /// Reported as HTTP 400 to match the public contract of the registration endpoint.
    Conflict(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg) => msg.as_str(),
            // Detail is only attached by `render_internal_error`.
            AppError::InternalServerError(_) => INTERNAL_ERROR_MESSAGE,
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Converts `std::io::Error` from the flat-file stores into `AppError::InternalServerError`.
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> AppError {
        AppError::InternalServerError(format!("I/O error: {}", error))
    }
}

/// Converts `serde_json::Error` into `AppError::InternalServerError`.
///
/// Request bodies are parsed by actix (see [`json_error_handler`]); a serde error reaching
/// this point comes from serializing a collection to disk.
impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> AppError {
        AppError::InternalServerError(format!("Serialization error: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::BadRequest`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::BadRequest(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}

/// Error handler for `web::JsonConfig`, so malformed bodies get the same JSON shape
/// as every other client error.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}

/// Error handler for `web::PathConfig`. Path segments only carry task ids, so an
/// unparseable one names a task that cannot exist.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Unparseable path segment: {}", err);
    AppError::NotFound("Task not found".into()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

/// Centralized formatter for 500 responses, installed through `middleware::ErrorHandlers`.
///
/// Logs the underlying error and rewrites the body to a generic message. The error detail
/// is added under `message` only when the application runs in development mode.
pub fn render_internal_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let detail = res
        .response()
        .error()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown error".to_string());
    let development = res
        .request()
        .app_data::<web::Data<Config>>()
        .map(|config| config.is_development())
        .unwrap_or(false);

    log::error!(
        "{} {} failed: {}",
        res.request().method(),
        res.request().path(),
        detail
    );

    let mut body = json!({ "error": INTERNAL_ERROR_MESSAGE });
    if development {
        body["message"] = json!(detail);
    }

    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError().json(body);
    let res = ServiceResponse::new(req, response).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
