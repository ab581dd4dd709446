//! `/api/exams`: multiple-choice exams attached to courses, plus grading.

use crate::responses::respond;
use crate::services::records::{self, require, StoredRecord};
use crate::state::AppState;
use actix_web::web::post;
use actix_web::{web, HttpResponse, Scope};
use common::model::course::Course;
use common::model::exam::{Exam, ExamResult, ExamSubmission};
use common::store::Repository;
use common::Result;
use log::info;

const API_PATH: &str = "/api/exams";

impl StoredRecord for Exam {
    fn check_references(&self, repo: &Repository) -> Result<()> {
        require::<Course>(repo, "courseId", &self.course_id)
    }
}

/// * `GET|POST /api/exams`, `GET /api/exams/{id}`
/// * `POST /api/exams/{id}/attempts`: grades an `ExamSubmission`. Attempts
///   are not stored.
pub fn configure_routes() -> Scope {
    records::scope::<Exam>(API_PATH).route("/{id}/attempts", post().to(attempt))
}

async fn attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<ExamSubmission>,
) -> HttpResponse {
    respond(grade_attempt(&state.repo, &id, &payload))
}

pub fn grade_attempt(repo: &Repository, exam_id: &str, submission: &ExamSubmission) -> Result<ExamResult> {
    let exam: Exam = repo.find(exam_id)?;
    let result = exam.grade(submission);
    info!(
        "Graded attempt on `{}`: {}/{} ({}%)",
        exam.title, result.correct, result.total, result.score_percent
    );
    Ok(result)
}
