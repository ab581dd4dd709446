use serde::{Deserialize, Serialize};

/// Progress of a background job, as polled by clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percent of the work done.
    InProgress(u32),
    /// Summary message, for issuance jobs the folder holding the PDFs.
    Completed(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }
}
