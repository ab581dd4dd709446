//! Generic list / get / save endpoints shared by the back-office entities.
//!
//! Each entity module builds its scope with `scope::<T>(path)` and adds its own
//! action routes on top.

use crate::responses::{error_response, respond};
use crate::state::AppState;
use actix_web::web::{get, post, scope as web_scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::{new_id, Record};
use common::requests::ListResponse;
use common::store::Repository;
use common::validation;
use common::{Error, Result};
use log::{info, warn};

/// Storage-boundary rules an entity adds on top of its own validation.
pub trait StoredRecord: Record + 'static {
    /// Checks that ids pointing at other collections resolve.
    fn check_references(&self, _repo: &Repository) -> Result<()> {
        Ok(())
    }

    /// Resets server-owned fields on a record the client is creating.
    fn on_create(&mut self) {}

    /// Carries over fields only the server may change when a client saves over
    /// an existing record.
    fn preserve_from(&mut self, _stored: &Self) -> Result<()> {
        Ok(())
    }
}

/// `GET ""`, `POST ""` and `GET /{id}` for `R` under `path`.
pub fn scope<R: StoredRecord>(path: &str) -> Scope {
    web_scope(path)
        .route("", get().to(list::<R>))
        .route("", post().to(save::<R>))
        .route("/{id}", get().to(get_one::<R>))
}

pub async fn list<R: StoredRecord>(state: web::Data<AppState>) -> HttpResponse {
    match state.repo.load::<R>() {
        Ok(loaded) => {
            if let Some(warning) = &loaded.warning {
                warn!("{}: {}", R::COLLECTION, warning);
            }
            HttpResponse::Ok().json(ListResponse {
                items: loaded.items,
                warning: loaded.warning,
            })
        }
        Err(err) => error_response(&err),
    }
}

pub async fn get_one<R: StoredRecord>(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    respond(state.repo.find::<R>(&id))
}

pub async fn save<R: StoredRecord>(
    state: web::Data<AppState>,
    payload: web::Json<R>,
) -> HttpResponse {
    respond(save_record(&state.repo, payload.into_inner()))
}

/// Assigns an id to new records, validates, and writes.
///
/// Looking up the stored record and writing the new one happen under the
/// repository's write lock, so server-owned fields changed by another request
/// in between are not overwritten with stale values.
pub fn save_record<R: StoredRecord>(repo: &Repository, mut record: R) -> Result<R> {
    let created = record.id().trim().is_empty();
    if created {
        record.set_id(new_id());
    } else {
        validation::check_id(record.id())?;
    }
    let id = record.id().to_string();
    let saved = repo.save_with::<R, _>(&id, |stored| {
        match stored {
            Some(stored) if !created => record.preserve_from(stored)?,
            _ => record.on_create(),
        }
        record.check()?;
        record.check_references(repo)?;
        Ok(record)
    })?;
    info!("Saved {} `{}`", R::COLLECTION, saved.id());
    Ok(saved)
}

/// Turns a dangling reference into a field error on `field`.
pub fn require<D: common::store::Document>(
    repo: &Repository,
    field: &str,
    id: &str,
) -> Result<()> {
    match repo.find::<D>(id) {
        Ok(_) => Ok(()),
        Err(err) if err.is_not_found() => Err(Error::Validation(vec![
            validation::FieldError::new(field, format!("unknown id `{id}`")),
        ])),
        Err(err) => Err(err),
    }
}
