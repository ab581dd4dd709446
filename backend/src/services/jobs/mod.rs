//! `GET /api/jobs/{job_id}`: status of a background job.

use crate::job_controller::state::JobsState;
use crate::responses::error_response;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use common::Error;

const API_PATH: &str = "/api/jobs";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{job_id}", get().to(process))
}

async fn process(jobs: web::Data<JobsState>, job_id: web::Path<String>) -> HttpResponse {
    match jobs.status(&job_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => error_response(&Error::not_found("jobs", job_id.as_str())),
    }
}
