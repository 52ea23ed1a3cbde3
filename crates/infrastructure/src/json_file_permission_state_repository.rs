use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use proptrack_application::PermissionStateRepository;
use proptrack_core::{AppError, AppResult};
use proptrack_domain::PermissionState;
use tracing::{debug, warn};

/// Storage key of the persisted authorization state.
pub const PERMISSION_STORAGE_KEY: &str = "rbac-storage";

/// File-backed permission state stored as `<data_dir>/rbac-storage.json`.
#[derive(Debug, Clone)]
pub struct JsonFilePermissionStateRepository {
    path: PathBuf,
}

impl JsonFilePermissionStateRepository {
    /// Creates a repository rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir
                .as_ref()
                .join(format!("{PERMISSION_STORAGE_KEY}.json")),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl PermissionStateRepository for JsonFilePermissionStateRepository {
    fn load_state(&self) -> AppResult<Option<PermissionState>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted permission state");
                return Ok(None);
            }
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read '{}': {error}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(contents.as_str())
            .map(Some)
            .map_err(|error| {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "persisted permission state is unreadable"
                );
                AppError::Internal(format!(
                    "failed to parse '{}': {error}",
                    self.path.display()
                ))
            })
    }

    fn save_state(&self, state: &PermissionState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                AppError::Internal(format!(
                    "failed to create '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let payload = serde_json::to_vec_pretty(state).map_err(|error| {
            AppError::Internal(format!("failed to serialize permission state: {error}"))
        })?;

        let staging_path = self.path.with_extension("json.tmp");
        fs::write(&staging_path, payload)
            .and_then(|()| fs::rename(&staging_path, &self.path))
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write '{}': {error}",
                    self.path.display()
                ))
            })
    }
}
