use crate::responses::{bad_request, error_response, respond};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::canvas::Point;
use common::model::certificate::ElementName;
use common::model::template::CertificateTemplate;
use common::requests::{CreateTemplateRequest, ListResponse};
use common::store::Repository;
use common::validation;
use common::Result;
use log::{info, warn};

/// Newest first, with the load warning when the stored list was unreadable.
pub(crate) async fn list(state: web::Data<AppState>) -> HttpResponse {
    respond(list_templates(&state.repo))
}

pub fn list_templates(repo: &Repository) -> Result<ListResponse<CertificateTemplate>> {
    let mut loaded = repo.load::<CertificateTemplate>()?;
    if let Some(warning) = &loaded.warning {
        warn!("Certificate templates: {}", warning);
    }
    loaded
        .items
        .sort_by_key(|template| std::cmp::Reverse(template.updated_at()));
    Ok(ListResponse {
        items: loaded.items,
        warning: loaded.warning,
    })
}

pub(crate) async fn create(
    state: web::Data<AppState>,
    payload: web::Json<CreateTemplateRequest>,
) -> HttpResponse {
    match create_template(&state.repo, payload.into_inner()) {
        Ok(template) => HttpResponse::Created().json(template),
        Err(err) => error_response(&err),
    }
}

/// A new draft with the default design.
pub fn create_template(repo: &Repository, request: CreateTemplateRequest) -> Result<CertificateTemplate> {
    let template = CertificateTemplate::new(request.name.trim(), request.description);
    validation::check(&template)?;
    let template = repo.upsert(template)?;
    info!("Created certificate template `{}`", template.id());
    Ok(template)
}

pub(crate) async fn get(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    respond(state.repo.find::<CertificateTemplate>(&id))
}

pub(crate) async fn save(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<CertificateTemplate>,
) -> HttpResponse {
    respond(save_template(&state.repo, &id, payload.into_inner()))
}

/// Replaces the editable content of template `id` with `incoming`. The id in
/// the path wins over the body; identity, status and `createdAt` stay.
pub fn save_template(
    repo: &Repository,
    id: &str,
    incoming: CertificateTemplate,
) -> Result<CertificateTemplate> {
    repo.update::<CertificateTemplate, _>(id, |template| {
        template.apply_edit(incoming);
        validation::check(template)
    })
}

pub(crate) async fn move_element(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<Point>,
) -> HttpResponse {
    let (id, element) = path.into_inner();
    let element: ElementName = match element.parse() {
        Ok(element) => element,
        Err(err) => return bad_request(format!("{err}")),
    };
    respond(move_template_element(&state.repo, &id, element, payload.into_inner()))
}

/// Moves one element of a stored template. Moving the logo is accepted and
/// leaves the template as it was.
pub fn move_template_element(
    repo: &Repository,
    id: &str,
    element: ElementName,
    point: Point,
) -> Result<CertificateTemplate> {
    repo.update::<CertificateTemplate, _>(id, |template| {
        template.set_element_position(element, point);
        Ok(())
    })
}

pub(crate) async fn publish(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let result = state
        .repo
        .update::<CertificateTemplate, _>(&id, |template| template.publish());
    if let Ok(template) = &result {
        info!("Published certificate template `{}`", template.name());
    }
    respond(result)
}
