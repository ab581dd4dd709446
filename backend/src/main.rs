mod config;
mod job_controller;
mod responses;
mod services;
mod state;
mod store;

use crate::config::Config;
use crate::job_controller::state::JobsState;
use crate::state::AppState;
use crate::store::SqliteStore;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use common::store::Repository;
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Arc::new(Config::from_env());
    let url = config.url();

    let store = SqliteStore::open(&config.database).map_err(|e| {
        error!("Cannot open {}: {}", config.database.display(), e);
        std::io::Error::other(e.to_string())
    })?;
    std::fs::create_dir_all(&config.issued_dir)?;
    std::fs::create_dir_all(&config.uploads_dir)?;

    let app_state = AppState {
        repo: Repository::new(Arc::new(store)),
        config: config.clone(),
    };

    if config.open_browser {
        let url_clone = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url_clone);
        });
    }

    let (jobs_state, rx) = JobsState::new();
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    info!("Server running at {}", url);

    let issued_dir = config.issued_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::certificates::configure_routes())
            .service(services::courses::configure_routes())
            .service(services::batches::configure_routes())
            .service(services::applications::configure_routes())
            .service(services::exams::configure_routes())
            .service(services::evaluations::configure_routes())
            .service(services::jobs::configure_routes())
            .service(actix_files::Files::new("/issued", &issued_dir).show_files_listing())
            .default_service(web::route().to(serve_embedded))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
