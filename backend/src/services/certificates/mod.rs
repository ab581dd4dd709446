//! # Certificate Service Module
//!
//! Routes under `/api/certificates`: the certificate template designer's
//! storage, previews and batch issuance.
//!
//! ## Sub-modules:
//! - `templates`: list, create, read, save, move elements and publish.
//! - `layout`: maps a design from the logical canvas onto an A4 page.
//! - `pdf`: renders a planned page with genpdf.
//! - `issue`: background job issuing one PDF per approved applicant.

pub mod issue;
pub mod layout;
pub mod pdf;
pub mod templates;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/certificates";

/// # Registered Routes:
///
/// * `GET /templates`: every template, newest first, with a warning when the
///   stored list could not be read.
/// * `POST /templates`: `{name, description}` creates a draft (`201`).
/// * `GET /templates/{id}`
/// * `PUT /templates/{id}`: saves name, description and design.
/// * `PUT /templates/{id}/positions/{element}`: `{x, y}` in logical units.
/// * `POST /templates/{id}/publish`: `Draft → Published`.
/// * `GET /templates/{id}/pdf`: inline preview with placeholder texts.
/// * `POST /issue`: `{templateId, batchId, issueDate?}` starts an issuance
///   job and answers `202` with its id.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/templates", get().to(templates::list))
        .route("/templates", post().to(templates::create))
        .route("/templates/{id}", get().to(templates::get))
        .route("/templates/{id}", put().to(templates::save))
        .route(
            "/templates/{id}/positions/{element}",
            put().to(templates::move_element),
        )
        .route("/templates/{id}/publish", post().to(templates::publish))
        .route("/templates/{id}/pdf", get().to(pdf::process))
        .route("/issue", post().to(issue::process))
}
