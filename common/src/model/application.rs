//! Student applications to a batch and their review workflow.

use crate::error::{Error, Result};
use crate::model::batch::Batch;
use crate::model::Record;
use crate::store::Document;
use crate::validation::{phone_number, FieldError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upload ceiling for application documents.
pub const MAX_ATTACHMENT_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Waitlisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Approve,
    Reject,
    Waitlist,
}

/// Metadata of a document attached to an application. The bytes live in the
/// backend's upload directory under `stored_as`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Hex MD5 of the content.
    pub checksum: String,
    pub stored_as: String,
}

/// Accepts images and PDFs up to `MAX_ATTACHMENT_BYTES`.
pub fn check_attachment(content_type: &str, size_bytes: u64) -> Result<()> {
    let mut errors = Vec::new();
    let accepted = content_type.starts_with("image/") || content_type == "application/pdf";
    if !accepted {
        errors.push(FieldError::new(
            "attachment",
            format!("must be an image or a PDF, got `{content_type}`"),
        ));
    }
    if size_bytes > MAX_ATTACHMENT_BYTES {
        errors.push(FieldError::new("attachment", "must be at most 2 MB"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1))]
    pub batch_id: String,
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "phone_number"))]
    pub phone: String,
    #[serde(default)]
    #[validate(range(max = 60))]
    pub experience_years: u8,
    #[validate(length(min = 20, max = 2000))]
    pub motivation: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Applies a review decision. Approval takes a seat in `batch`, so it fails
    /// when the batch is full or is not the one applied to.
    ///
    /// Allowed: `Pending → Approved | Rejected | Waitlisted` and
    /// `Waitlisted → Approved | Rejected`.
    pub fn review(&mut self, decision: ReviewDecision, batch: &mut Batch) -> Result<()> {
        let next = match (self.status, decision) {
            (ApplicationStatus::Pending, ReviewDecision::Approve)
            | (ApplicationStatus::Waitlisted, ReviewDecision::Approve) => {
                ApplicationStatus::Approved
            }
            (ApplicationStatus::Pending, ReviewDecision::Reject)
            | (ApplicationStatus::Waitlisted, ReviewDecision::Reject) => {
                ApplicationStatus::Rejected
            }
            (ApplicationStatus::Pending, ReviewDecision::Waitlist) => ApplicationStatus::Waitlisted,
            (status, decision) => {
                return Err(Error::InvalidTransition(format!(
                    "cannot {decision:?} an application that is {status:?}"
                )));
            }
        };
        if next == ApplicationStatus::Approved {
            if batch.id != self.batch_id {
                return Err(Error::InvalidTransition(format!(
                    "application `{}` is for batch `{}`, not `{}`",
                    self.id, self.batch_id, batch.id
                )));
            }
            batch.enroll()?;
        }
        self.status = next;
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }
}

impl Document for Application {
    const COLLECTION: &'static str = "applications";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Application {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
