//! Multipart upload of the document attached to an application.

use crate::responses::{bad_request, respond};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::application::{check_attachment, Application, Attachment, MAX_ATTACHMENT_BYTES};
use common::store::Repository;
use common::validation;
use common::{Error, Result};
use futures_util::StreamExt;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// A file part read off the wire.
struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

pub(crate) async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: Multipart,
) -> HttpResponse {
    let upload = match read_file_part(payload).await {
        Ok(upload) => upload,
        Err(message) => return bad_request(message),
    };
    respond(attach(
        &state.repo,
        &state.config.uploads_dir,
        &id,
        &upload.file_name,
        &upload.content_type,
        &upload.bytes,
    ))
}

/// Reads the `file` part. Reading stops one byte past the size limit so an
/// oversized upload is still reported as such without buffering all of it.
async fn read_file_part(mut payload: Multipart) -> std::result::Result<Upload, String> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .filter(|mime| mime != "application/octet-stream")
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        let limit = MAX_ATTACHMENT_BYTES as usize + 1;
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            let room = limit - bytes.len();
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if bytes.len() == limit {
                break;
            }
        }
        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err("Missing `file` part".to_string())
}

/// Checks and stores `bytes` as the document of application `id`, replacing
/// any earlier one.
///
/// The file is written while the application is being updated and removed
/// again if the update does not go through.
pub fn attach(
    repo: &Repository,
    uploads_dir: &Path,
    id: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<Application> {
    repo.find::<Application>(id)?;
    check_attachment(content_type, bytes.len() as u64)?;

    let checksum = format!("{:x}", md5::compute(bytes));

    let extension = mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first().copied())
        .unwrap_or("bin");
    let stored_as = format!("{}_{checksum}.{extension}", file_stem(id));
    let path = uploads_dir.join(&stored_as);

    let attachment = Attachment {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
        size_bytes: bytes.len() as u64,
        checksum,
        stored_as,
    };
    let mut created_file = false;
    let updated = repo.update::<Application, _>(id, |application| {
        fs::create_dir_all(uploads_dir).map_err(io_error)?;
        created_file = !path.exists();
        fs::write(&path, bytes).map_err(io_error)?;
        application.attachment = Some(attachment);
        Ok(())
    });
    match updated {
        Ok(application) => {
            info!("Stored attachment for application `{}`", id);
            Ok(application)
        }
        Err(err) => {
            if created_file {
                if let Err(cleanup) = fs::remove_file(&path) {
                    warn!("Could not remove {}: {}", path.display(), cleanup);
                }
            }
            Err(err)
        }
    }
}

/// `id` reduced to characters that are safe in a file name.
fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(validation::MAX_ID_LEN)
        .collect();
    if stem.is_empty() {
        "application".to_string()
    } else {
        stem
    }
}

fn io_error(err: std::io::Error) -> Error {
    Error::Storage(format!("could not store attachment: {err}"))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::batch;
    use super::*;
    use crate::state::testing::app_state;
    use chrono::Utc;
    use common::model::application::ApplicationStatus;
    use common::store::{Document, KeyValueStore, MemoryStore};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Fails every write to the applications collection once armed.
    #[derive(Default)]
    struct ReadOnlyApplications {
        inner: MemoryStore,
        armed: AtomicBool,
    }

    impl KeyValueStore for ReadOnlyApplications {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            if key == Application::COLLECTION && self.armed.load(Ordering::SeqCst) {
                return Err(Error::Storage("disk full".into()));
            }
            self.inner.put(key, value)
        }
    }

    fn seed(repo: &Repository) {
        seed_as(repo, "a-1");
    }

    fn seed_as(repo: &Repository, id: &str) {
        repo.upsert(batch("b-1", 5)).unwrap();
        repo.upsert(Application {
            id: id.into(),
            batch_id: "b-1".into(),
            full_name: "Ana Souza".into(),
            email: "ana@example.com".into(),
            phone: "+55 11 91234-5678".into(),
            experience_years: 0,
            motivation: "Switching careers into wellness.".into(),
            attachment: None,
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
        })
        .unwrap();
    }

    #[test]
    fn stores_pdfs_under_a_checksum_name() {
        let (state, _dir) = app_state();
        seed(&state.repo);
        let uploads = &state.config.uploads_dir;

        let app = attach(
            &state.repo,
            uploads,
            "a-1",
            "id.pdf",
            "application/pdf",
            b"%PDF-1.4 test",
        )
        .unwrap();
        let attachment = app.attachment.unwrap();
        assert_eq!(attachment.size_bytes, 13);
        assert_eq!(attachment.checksum.len(), 32);
        assert_eq!(attachment.stored_as, format!("a-1_{}.pdf", attachment.checksum));
        assert_eq!(
            fs::read(uploads.join(&attachment.stored_as)).unwrap(),
            b"%PDF-1.4 test"
        );
    }

    #[test]
    fn rejects_other_types_and_oversized_files() {
        let (state, _dir) = app_state();
        seed(&state.repo);
        let uploads = &state.config.uploads_dir;

        let err = attach(&state.repo, uploads, "a-1", "x.exe", "application/x-msdownload", b"MZ")
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let big = vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1];
        let err = attach(&state.repo, uploads, "a-1", "big.png", "image/png", &big).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let stored: Application = state.repo.find("a-1").unwrap();
        assert!(stored.attachment.is_none());
    }

    #[test]
    fn unknown_application_is_not_found() {
        let (state, _dir) = app_state();
        let err = attach(
            &state.repo,
            &state.config.uploads_dir,
            "nope",
            "a.png",
            "image/png",
            b"png",
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn stored_names_never_leave_the_uploads_dir() {
        let (state, dir) = app_state();
        seed_as(&state.repo, "../../escape");
        let uploads = &state.config.uploads_dir;

        let app = attach(
            &state.repo,
            uploads,
            "../../escape",
            "id.png",
            "image/png",
            b"png bytes",
        )
        .unwrap();
        let attachment = app.attachment.unwrap();
        assert_eq!(attachment.stored_as, format!("escape_{}.png", attachment.checksum));
        assert!(uploads.join(&attachment.stored_as).is_file());
        let outside = dir.path().parent().unwrap().join(&attachment.stored_as);
        assert!(!outside.exists());
        assert_eq!(file_stem("/.."), "application");
    }

    #[test]
    fn failed_updates_leave_no_file_behind() {
        let store = Arc::new(ReadOnlyApplications::default());
        let repo = Repository::new(store.clone());
        seed(&repo);
        store.armed.store(true, Ordering::SeqCst);
        let uploads = tempfile::tempdir().unwrap();

        let err = attach(&repo, uploads.path(), "a-1", "id.pdf", "application/pdf", b"%PDF")
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(fs::read_dir(uploads.path()).unwrap().count(), 0);
        let stored: Application = repo.find("a-1").unwrap();
        assert!(stored.attachment.is_none());
    }
}
