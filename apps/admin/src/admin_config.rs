use std::env;
use std::path::PathBuf;

use proptrack_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub data_dir: PathBuf,
    pub seed_default_roles: bool,
}

impl AdminConfig {
    pub fn load() -> AppResult<Self> {
        let data_dir = env::var("PROPTRACK_DATA_DIR")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "./data".to_owned());

        let seed_default_roles = match env::var("PROPTRACK_SEED_DEFAULT_ROLES")
            .unwrap_or_else(|_| "true".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(AppError::Validation(format!(
                    "PROPTRACK_SEED_DEFAULT_ROLES must be 'true' or 'false', got '{other}'"
                )));
            }
        };

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            seed_default_roles,
        })
    }

    pub fn audit_trail_dir(&self) -> PathBuf {
        self.data_dir.join("audit-trails")
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
