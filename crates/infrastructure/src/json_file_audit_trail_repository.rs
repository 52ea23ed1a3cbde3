use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use proptrack_application::AuditTrailRepository;
use proptrack_core::{AppError, AppResult, RecordId};
use proptrack_domain::AuditTrail;
use sha2::{Digest, Sha256};
use tokio::fs;

const MAX_PLAIN_STEM_LEN: usize = 128;
const MAX_HEX_ENCODED_ID_LEN: usize = 100;

/// File-backed audit trails, one JSON document per document id.
#[derive(Debug, Clone)]
pub struct JsonFileAuditTrailRepository {
    directory: PathBuf,
}

impl JsonFileAuditTrailRepository {
    /// Creates a repository storing trails under `directory`.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn trail_path(&self, document_id: &RecordId) -> PathBuf {
        self.directory.join(trail_file_name(document_id))
    }
}

/// Maps a document id to a file name that cannot escape the directory and
/// keeps numeric and text ids apart.
///
/// Names stay well under the usual 255-byte limit: ids too long to hex-encode
/// are stored under their SHA-256 digest, and the full id lives in the JSON.
fn trail_file_name(document_id: &RecordId) -> String {
    match document_id {
        RecordId::Number(value) => format!("number-{value}.json"),
        RecordId::Text(value) if is_plain_file_stem(value) => format!("text-{value}.json"),
        RecordId::Text(value) if value.len() <= MAX_HEX_ENCODED_ID_LEN => {
            format!("hex-{}.json", hex::encode(value.as_bytes()))
        }
        RecordId::Text(value) => {
            format!("sha256-{}.json", hex::encode(Sha256::digest(value.as_bytes())))
        }
    }
}

fn is_plain_file_stem(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_PLAIN_STEM_LEN
        && value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_'))
}

#[async_trait]
impl AuditTrailRepository for JsonFileAuditTrailRepository {
    async fn find_trail(&self, document_id: &RecordId) -> AppResult<Option<AuditTrail>> {
        let path = self.trail_path(document_id);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read '{}': {error}",
                    path.display()
                )));
            }
        };

        let trail: AuditTrail = serde_json::from_str(contents.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to parse audit trail for document '{document_id}': {error}"
            ))
        })?;

        if trail.document_id() != document_id {
            return Err(AppError::Internal(format!(
                "'{}' holds the trail of document '{}', not '{document_id}'",
                path.display(),
                trail.document_id()
            )));
        }

        Ok(Some(trail))
    }

    async fn save_trail(&self, trail: &AuditTrail) -> AppResult<()> {
        fs::create_dir_all(&self.directory).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to create '{}': {error}",
                self.directory.display()
            ))
        })?;

        let payload = serde_json::to_vec_pretty(trail).map_err(|error| {
            AppError::Internal(format!(
                "failed to serialize audit trail for document '{}': {error}",
                trail.document_id()
            ))
        })?;

        let path = self.trail_path(trail.document_id());
        let staging_path = path.with_extension("json.tmp");
        fs::write(&staging_path, payload).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to write '{}': {error}",
                staging_path.display()
            ))
        })?;
        fs::rename(&staging_path, &path).await.map_err(|error| {
            AppError::Internal(format!("failed to replace '{}': {error}", path.display()))
        })
    }
}
