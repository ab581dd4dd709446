//! `/api/applications`: student applications, their documents and review.

mod review;
mod upload;

use crate::services::records::{self, require, StoredRecord};
use actix_web::web::post;
use actix_web::Scope;
use chrono::Utc;
use common::model::application::{Application, ApplicationStatus};
use common::model::batch::Batch;
use common::store::Repository;
use common::Result;

const API_PATH: &str = "/api/applications";

impl StoredRecord for Application {
    fn check_references(&self, repo: &Repository) -> Result<()> {
        require::<Batch>(repo, "batchId", &self.batch_id)
    }

    fn on_create(&mut self) {
        self.status = ApplicationStatus::Pending;
        self.reviewed_at = None;
        self.attachment = None;
        self.submitted_at = Utc::now();
    }

    /// Review outcome and the uploaded document are owned by their own
    /// endpoints.
    fn preserve_from(&mut self, stored: &Self) -> Result<()> {
        self.status = stored.status;
        self.reviewed_at = stored.reviewed_at;
        self.attachment = stored.attachment.clone();
        self.submitted_at = stored.submitted_at;
        Ok(())
    }
}

/// * `GET|POST /api/applications`, `GET /api/applications/{id}`
/// * `POST /api/applications/{id}/review`: `ReviewRequest` body.
/// * `POST /api/applications/{id}/attachment`: multipart, one `file` part.
pub fn configure_routes() -> Scope {
    records::scope::<Application>(API_PATH)
        .route("/{id}/review", post().to(review::process))
        .route("/{id}/attachment", post().to(upload::process))
}
