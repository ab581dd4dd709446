//! Maps domain results onto HTTP responses.
//!
//! Handlers keep the `process` → inner `Result` shape and finish with
//! `respond`/`error_response`, so every failure reaches the client as an
//! `ErrorBody` with a status code matching its kind.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use common::requests::ErrorBody;
use common::Error;
use log::{error, warn};
use serde::Serialize;

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::InvalidTransition(_) => StatusCode::CONFLICT,
        Error::Storage(_)
        | Error::Malformed { .. }
        | Error::Serialization(_)
        | Error::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &Error) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    let field_errors = match err {
        Error::Validation(errors) => errors.clone(),
        _ => Vec::new(),
    };
    HttpResponse::build(status).json(ErrorBody {
        message: err.to_string(),
        field_errors,
    })
}

pub fn respond<T: Serialize>(result: common::Result<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(&err),
    }
}

pub fn bad_request(message: impl Into<String>) -> HttpResponse {
    let message = message.into();
    warn!("Bad request: {}", message);
    HttpResponse::BadRequest().json(ErrorBody {
        message,
        field_errors: Vec::new(),
    })
}
