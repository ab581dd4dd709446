use crate::responses::respond;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::application::{Application, ApplicationStatus};
use common::model::batch::Batch;
use common::requests::ReviewRequest;
use common::store::Repository;
use common::Result;
use log::info;

pub(crate) async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<ReviewRequest>,
) -> HttpResponse {
    respond(review_application(&state.repo, &id, payload.into_inner()))
}

/// Applies a decision and, for approvals, takes the batch seat in the same
/// write.
pub fn review_application(
    repo: &Repository,
    application_id: &str,
    request: ReviewRequest,
) -> Result<Application> {
    let batch_id = repo.find::<Application>(application_id)?.batch_id;
    let (application, batch) = repo.update_pair::<Application, Batch, _>(
        application_id,
        &batch_id,
        |application, batch| application.review(request.decision, batch),
    )?;
    if application.status == ApplicationStatus::Approved {
        info!(
            "Approved `{}` into batch `{}` ({}/{})",
            application.full_name, batch.name, batch.enrolled, batch.capacity
        );
    }
    Ok(application)
}
