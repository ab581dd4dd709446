//! CSV export of the approved applicants of a batch.

use crate::responses::error_response;
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use common::model::application::{Application, ApplicationStatus};
use common::model::batch::Batch;
use common::store::Repository;
use common::{Error, Result};

pub(crate) async fn process(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    match build_roster(&state.repo, &id) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"roster-{}.csv\"", id.as_str()),
            ))
            .body(bytes),
        Err(err) => error_response(&err),
    }
}

/// One row per approved applicant, ordered by name.
pub fn build_roster(repo: &Repository, batch_id: &str) -> Result<Vec<u8>> {
    let batch: Batch = repo.find(batch_id)?;
    let mut approved: Vec<Application> = repo
        .list::<Application>()?
        .into_iter()
        .filter(|a| a.batch_id == batch.id && a.status == ApplicationStatus::Approved)
        .collect();
    approved.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["full_name", "email", "phone", "experience_years", "submitted_at"])
        .map_err(csv_error)?;
    for application in &approved {
        writer
            .write_record([
                application.full_name.as_str(),
                application.email.as_str(),
                application.phone.as_str(),
                &application.experience_years.to_string(),
                &application.submitted_at.to_rfc3339(),
            ])
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::Render(format!("roster export failed: {e}")))
}

fn csv_error(err: csv::Error) -> Error {
    Error::Render(format!("roster export failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use common::model::application::ApplicationStatus;
    use common::store::MemoryStore;
    use std::sync::Arc;

    fn application(id: &str, name: &str, status: ApplicationStatus) -> Application {
        Application {
            id: id.into(),
            batch_id: "b-1".into(),
            full_name: name.into(),
            email: format!("{id}@example.com"),
            phone: "555 123 4567".into(),
            experience_years: 1,
            motivation: "Looking forward to the hands-on practice.".into(),
            attachment: None,
            status,
            submitted_at: Utc::now(),
            reviewed_at: None,
        }
    }

    #[test]
    fn only_approved_applicants_sorted_by_name() {
        let repo = Repository::new(Arc::new(MemoryStore::default()));
        repo.upsert(Batch {
            id: "b-1".into(),
            course_id: None,
            name: "Morning".into(),
            instructor: "Ravi".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            capacity: 5,
            enrolled: 2,
            schedule: String::new(),
        })
        .unwrap();
        repo.put_all(&[
            application("a1", "Zoe, Q.", ApplicationStatus::Approved),
            application("a2", "Bea", ApplicationStatus::Rejected),
            application("a3", "Ana", ApplicationStatus::Approved),
        ])
        .unwrap();

        let csv = String::from_utf8(build_roster(&repo, "b-1").unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("full_name,email"));
        assert!(lines[1].starts_with("Ana,a3@example.com"));
        assert!(lines[2].starts_with("\"Zoe, Q.\",a1@example.com"));
    }

    #[test]
    fn unknown_batch_is_not_found() {
        let repo = Repository::new(Arc::new(MemoryStore::default()));
        assert!(build_roster(&repo, "nope").unwrap_err().is_not_found());
    }
}
