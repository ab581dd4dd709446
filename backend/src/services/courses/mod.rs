//! `/api/courses`: course catalogue CRUD.

use crate::services::records::{self, StoredRecord};
use actix_web::Scope;
use common::model::course::Course;

const API_PATH: &str = "/api/courses";

impl StoredRecord for Course {}

/// * `GET /api/courses`: every course, with a warning when stored data was unreadable.
/// * `GET /api/courses/{id}`
/// * `POST /api/courses`: create or update; an empty id creates.
pub fn configure_routes() -> Scope {
    records::scope::<Course>(API_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::app_state;
    use actix_web::{test, web, App};
    use common::requests::{ErrorBody, ListResponse};
    use serde_json::json;

    #[actix_web::test]
    async fn create_then_list() {
        let (state, _dir) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/courses")
            .set_json(json!({ "title": "Lomi lomi", "durationHours": 24, "price": 300.0 }))
            .to_request();
        let created: Course = test::call_and_read_body_json(&app, req).await;
        assert!(!created.id.is_empty());

        let req = test::TestRequest::get().uri("/api/courses").to_request();
        let listed: ListResponse<Course> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.items, vec![created.clone()]);
        assert!(listed.warning.is_none());

        let req = test::TestRequest::get()
            .uri(&format!("/api/courses/{}", created.id))
            .to_request();
        let fetched: Course = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn invalid_course_is_rejected_with_field_errors() {
        let (state, _dir) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/courses")
            .set_json(json!({ "title": "", "durationHours": 0, "price": 10.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: ErrorBody = test::read_body_json(resp).await;
        let fields: Vec<String> = body.field_errors.into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["durationHours", "title"]);
    }

    #[actix_web::test]
    async fn unknown_course_is_404() {
        let (state, _dir) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/courses/missing").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
