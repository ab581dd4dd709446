//! `/api/evaluations`: teacher evaluation forms.

use crate::responses::respond;
use crate::services::records::{self, StoredRecord};
use crate::state::AppState;
use actix_web::web::post;
use actix_web::{web, HttpResponse, Scope};
use common::model::evaluation::{Evaluation, EvaluationStatus};
use common::{Error, Result};

const API_PATH: &str = "/api/evaluations";

impl StoredRecord for Evaluation {
    fn on_create(&mut self) {
        self.status = EvaluationStatus::Draft;
        self.submitted_at = None;
    }

    /// Submitted forms are final.
    fn preserve_from(&mut self, stored: &Self) -> Result<()> {
        if stored.status == EvaluationStatus::Submitted {
            return Err(Error::InvalidTransition(format!(
                "evaluation `{}` was already submitted",
                stored.id
            )));
        }
        self.status = stored.status;
        self.submitted_at = stored.submitted_at;
        Ok(())
    }
}

/// * `GET|POST /api/evaluations`, `GET /api/evaluations/{id}`
/// * `POST /api/evaluations/{id}/submit`
pub fn configure_routes() -> Scope {
    records::scope::<Evaluation>(API_PATH).route("/{id}/submit", post().to(submit))
}

async fn submit(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    respond(state.repo.update::<Evaluation, _>(&id, |evaluation| evaluation.submit()))
}
