//! `POST /api/certificates/issue`: renders one certificate per approved
//! applicant of a batch in the background.
//!
//! The request is checked up front (published template, known batch, at least
//! one approved applicant) so mistakes come back as HTTP errors. The job then
//! runs like any other background job: a per-job channel carries
//! `IssueUpdate`s from the blocking worker to a forwarding task, which turns
//! them into `JobUpdate`s for the central updater. Rendering fans out over
//! rayon; every PDF lands in `<issued_dir>/<job_id>/`.

use super::layout::Recipient;
use super::pdf::render_certificate;
use crate::config::Config;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::responses::error_response;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use common::jobs::JobStatus;
use common::model::application::{Application, ApplicationStatus};
use common::model::batch::Batch;
use common::model::certificate::DesignElements;
use common::model::course::Course;
use common::model::template::CertificateTemplate;
use common::requests::{IssueCertificatesRequest, JobStarted};
use common::store::Repository;
use common::{Error, Result};
use log::{error, info};
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progress reported by the blocking worker.
#[derive(Debug)]
pub enum IssueUpdate {
    Job(JobStatus),
    /// `done` of `total` certificates written.
    Task { done: usize, total: usize },
}

/// Everything the worker needs, resolved before the job starts.
#[derive(Debug, Clone)]
pub struct IssuePlan {
    pub template_name: String,
    pub design: DesignElements,
    pub recipients: Vec<Recipient>,
}

pub(crate) async fn process(
    state: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<IssueCertificatesRequest>,
) -> HttpResponse {
    let request = payload.into_inner();
    let today = Utc::now().date_naive();
    let plan = match plan_issue(&state.repo, &request, today) {
        Ok(plan) => plan,
        Err(err) => return error_response(&err),
    };
    let job_id = schedule_issue_job(&jobs, state.config.clone(), plan).await;
    HttpResponse::Accepted().json(JobStarted { job_id })
}

/// Resolves the template, the batch and its approved applicants.
pub fn plan_issue(
    repo: &Repository,
    request: &IssueCertificatesRequest,
    today: NaiveDate,
) -> Result<IssuePlan> {
    let template: CertificateTemplate = repo.find(&request.template_id)?;
    if !template.is_published() {
        return Err(Error::InvalidTransition(format!(
            "template `{}` has to be published before issuing",
            template.name()
        )));
    }
    let batch: Batch = repo.find(&request.batch_id)?;
    let course_name = match &batch.course_id {
        Some(course_id) => repo.find::<Course>(course_id)?.title,
        None => batch.name.clone(),
    };

    let issue_date = format_issue_date(request.issue_date.unwrap_or(today));
    let mut approved: Vec<Application> = repo
        .list::<Application>()?
        .into_iter()
        .filter(|a| a.batch_id == batch.id && a.status == ApplicationStatus::Approved)
        .collect();
    if approved.is_empty() {
        return Err(Error::InvalidTransition(format!(
            "batch `{}` has no approved applicants",
            batch.name
        )));
    }
    approved.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    Ok(IssuePlan {
        template_name: template.name().to_string(),
        design: template.design().clone(),
        recipients: approved
            .into_iter()
            .map(|application| Recipient {
                student_name: application.full_name,
                course_name: course_name.clone(),
                issue_date: issue_date.clone(),
            })
            .collect(),
    })
}

pub fn format_issue_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Registers the job as `Pending`, starts it and returns its id.
pub async fn schedule_issue_job(jobs: &JobsState, config: std::sync::Arc<Config>, plan: IssuePlan) -> String {
    let job_id = Uuid::new_v4().to_string();
    jobs.register(&job_id).await;

    let tx = jobs.tx.clone();
    let job_id_for_task = job_id.clone();
    tokio::spawn(async move {
        let (issue_tx, mut issue_rx) = mpsc::channel::<IssueUpdate>(100);

        let forward_tx = tx.clone();
        let forward_id = job_id_for_task.clone();
        tokio::spawn(async move {
            while let Some(update) = issue_rx.recv().await {
                let status = match update {
                    IssueUpdate::Job(status) => status,
                    IssueUpdate::Task { done, total } => JobStatus::InProgress(percent(done, total)),
                };
                let _ = forward_tx.send(JobUpdate::new(forward_id.clone(), status)).await;
            }
        });

        let output_dir = config.issued_dir.join(&job_id_for_task);
        let blocking_config = config.clone();
        let handle = tokio::task::spawn_blocking(move || {
            issue_blocking(issue_tx, &blocking_config, &output_dir, &plan)
        });

        let status = match handle.await {
            Ok(Ok(summary)) => JobStatus::Completed(summary),
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        if let JobStatus::Failed(reason) = &status {
            error!("Issuance job `{}` failed: {}", job_id_for_task, reason);
        }
        let _ = tx.send(JobUpdate::new(job_id_for_task, status)).await;
    });

    job_id
}

fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (done as f64 / total as f64 * 100.0) as u32
    }
}

/// Renders every certificate of `plan` into `output_dir`. Returns the summary
/// shown when the job completes.
fn issue_blocking(
    tx: mpsc::Sender<IssueUpdate>,
    config: &Config,
    output_dir: &Path,
    plan: &IssuePlan,
) -> std::result::Result<String, String> {
    let _ = tx.blocking_send(IssueUpdate::Job(JobStatus::InProgress(0)));
    fs::create_dir_all(output_dir).map_err(|e| e.to_string())?;
    let file_name_re = Regex::new(r"[^\p{L}\p{N}]+").map_err(|e| e.to_string())?;

    let total = plan.recipients.len();
    let done = AtomicUsize::new(0);
    plan.recipients
        .par_iter()
        .enumerate()
        .try_for_each(|(index, recipient)| {
            let path = output_dir.join(certificate_file_name(&file_name_re, index, recipient));
            render_to_file(config, plan, recipient, &path).map_err(|e| {
                format!(
                    "Failed to render the certificate of {}: {}",
                    recipient.student_name, e
                )
            })?;
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = tx.blocking_send(IssueUpdate::Task {
                done: finished,
                total,
            });
            Ok::<(), String>(())
        })?;

    info!("Issued {} certificates into {}", total, output_dir.display());
    Ok(format!("Issued {} certificates into {}", total, output_dir.display()))
}

fn render_to_file(config: &Config, plan: &IssuePlan, recipient: &Recipient, path: &Path) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| Error::Render(e.to_string()))?;
    let title = format!("{}: {}", plan.template_name, recipient.student_name);
    render_certificate(&plan.design, Some(recipient), config, &title, file)
}

/// `007_Ana_Souza.pdf`: position in the batch plus the recipient's name.
fn certificate_file_name(re: &Regex, index: usize, recipient: &Recipient) -> String {
    let name = re.replace_all(&recipient.student_name, "_");
    let name = name.trim_matches('_');
    if name.is_empty() {
        format!("{:03}.pdf", index + 1)
    } else {
        format!("{:03}_{}.pdf", index + 1, name)
    }
}
