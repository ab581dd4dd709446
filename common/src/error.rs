use crate::validation::FieldError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every recoverable failure the domain layer can report.
///
/// None of these are fatal: callers turn them into a user-visible message and
/// either block the action (validation, transitions) or redirect (not found).
#[derive(Error, Debug)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed data under key `{key}`: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{collection} `{id}` not found")]
    NotFound { collection: &'static str, id: String },

    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Producing a document (PDF, export) failed.
    #[error("rendering failed: {0}")]
    Render(String),
}

impl Error {
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
