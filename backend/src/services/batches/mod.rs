//! `/api/batches`: scheduled cohorts, seat management and roster export.

mod roster;

use crate::responses::respond;
use crate::services::records::{self, require, StoredRecord};
use crate::state::AppState;
use actix_web::web::{get, post};
use actix_web::{web, HttpResponse, Scope};
use common::model::batch::Batch;
use common::model::course::Course;
use common::store::Repository;
use common::Result;

const API_PATH: &str = "/api/batches";

impl StoredRecord for Batch {
    fn check_references(&self, repo: &Repository) -> Result<()> {
        match &self.course_id {
            Some(course_id) => require::<Course>(repo, "courseId", course_id),
            None => Ok(()),
        }
    }

    fn on_create(&mut self) {
        self.enrolled = 0;
    }

    /// Seats taken only change through enrolment.
    fn preserve_from(&mut self, stored: &Self) -> Result<()> {
        self.enrolled = stored.enrolled;
        Ok(())
    }
}

/// * `GET|POST /api/batches`, `GET /api/batches/{id}`
/// * `POST /api/batches/{id}/enroll`: takes one seat, `409` when full.
/// * `GET /api/batches/{id}/roster.csv`: approved applicants as CSV.
pub fn configure_routes() -> Scope {
    records::scope::<Batch>(API_PATH)
        .route("/{id}/enroll", post().to(enroll))
        .route("/{id}/roster.csv", get().to(roster::process))
}

async fn enroll(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    respond(state.repo.update::<Batch, _>(&id, |batch| batch.enroll()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::applications::fixtures::batch;
    use crate::state::testing::app_state;
    use actix_web::{test, App};
    use common::store::{Document, KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    type Hook = Box<dyn FnOnce() + Send>;

    /// Runs an armed hook the next time the batches collection is read.
    #[derive(Default)]
    struct InterleavingStore {
        inner: MemoryStore,
        hook: Mutex<Option<Hook>>,
    }

    impl KeyValueStore for InterleavingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if key == Batch::COLLECTION {
                let hook = self.hook.lock().unwrap().take();
                if let Some(hook) = hook {
                    hook();
                }
            }
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            self.inner.put(key, value)
        }
    }

    fn batch_json(course_id: Option<&str>, capacity: u32) -> serde_json::Value {
        json!({
            "courseId": course_id,
            "name": "Weekend cohort",
            "instructor": "Noor",
            "startDate": "2025-04-05",
            "endDate": "2025-06-28",
            "capacity": capacity,
            "enrolled": 0
        })
    }

    #[actix_web::test]
    async fn enroll_until_full() {
        let (state, _dir) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/batches")
            .set_json(batch_json(None, 1))
            .to_request();
        let batch: Batch = test::call_and_read_body_json(&app, req).await;

        let enroll = || {
            test::TestRequest::post()
                .uri(&format!("/api/batches/{}/enroll", batch.id))
                .to_request()
        };
        let taken: Batch = test::call_and_read_body_json(&app, enroll()).await;
        assert_eq!(taken.enrolled, 1);
        assert_eq!(test::call_service(&app, enroll()).await.status(), 409);
    }

    #[actix_web::test]
    async fn dangling_course_reference_is_a_field_error() {
        let (state, _dir) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/batches")
            .set_json(batch_json(Some("no-such-course"), 10))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn clients_cannot_overwrite_seat_counts() {
        let (state, _dir) = app_state();
        let repo = state.repo.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/batches")
            .set_json(batch_json(None, 10))
            .to_request();
        let batch: Batch = test::call_and_read_body_json(&app, req).await;
        repo.update::<Batch, _>(&batch.id, |b| b.enroll()).unwrap();

        let mut edited = batch_json(None, 12);
        edited["id"] = json!(batch.id);
        edited["enrolled"] = json!(0);
        let req = test::TestRequest::post()
            .uri("/api/batches")
            .set_json(edited)
            .to_request();
        let saved: Batch = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.capacity, 12);
        assert_eq!(saved.enrolled, 1);
    }

    #[::core::prelude::v1::test]
    fn saving_keeps_an_enrolment_made_while_it_runs() {
        let store = Arc::new(InterleavingStore::default());
        let repo = Repository::new(store.clone());
        let stored = repo.upsert(batch("b-1", 10)).unwrap();

        let enroller: Arc<Mutex<Option<JoinHandle<Result<Batch>>>>> = Arc::default();
        let (other, slot) = (repo.clone(), enroller.clone());
        *store.hook.lock().unwrap() = Some(Box::new(move || {
            let handle = thread::spawn(move || other.update::<Batch, _>("b-1", |b| b.enroll()));
            thread::sleep(Duration::from_millis(50));
            *slot.lock().unwrap() = Some(handle);
        }));

        let mut edited = stored.clone();
        edited.capacity = 12;
        let saved = records::save_record(&repo, edited).unwrap();
        assert_eq!(saved.capacity, 12);

        let handle = enroller.lock().unwrap().take().unwrap();
        handle.join().unwrap().unwrap();
        let after: Batch = repo.find("b-1").unwrap();
        assert_eq!(after.capacity, 12);
        assert_eq!(after.enrolled, 1);
    }

    #[actix_web::test]
    async fn client_ids_must_be_file_name_safe() {
        let (state, _dir) = app_state();
        let repo = state.repo.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        for id in ["../../etc/passwd", "a/b", "with space"] {
            let mut body = batch_json(None, 10);
            body["id"] = json!(id);
            let req = test::TestRequest::post()
                .uri("/api/batches")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400, "{id}");
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["fieldErrors"][0]["field"], "id");
        }
        assert!(repo.list::<Batch>().unwrap().is_empty());

        let mut body = batch_json(None, 10);
        body["id"] = json!("spring-2025_b");
        let req = test::TestRequest::post()
            .uri("/api/batches")
            .set_json(body)
            .to_request();
        let saved: Batch = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.id, "spring-2025_b");
    }
}
