use std::sync::RwLock;

use proptrack_application::PermissionStateRepository;
use proptrack_core::{AppError, AppResult};
use proptrack_domain::PermissionState;

/// In-memory permission state repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStateRepository {
    state: RwLock<Option<PermissionState>>,
}

impl InMemoryPermissionStateRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }
}

impl PermissionStateRepository for InMemoryPermissionStateRepository {
    fn load_state(&self) -> AppResult<Option<PermissionState>> {
        self.state
            .read()
            .map(|state| state.clone())
            .map_err(|_| AppError::Internal("permission state lock poisoned".to_owned()))
    }

    fn save_state(&self, state: &PermissionState) -> AppResult<()> {
        let mut stored = self
            .state
            .write()
            .map_err(|_| AppError::Internal("permission state lock poisoned".to_owned()))?;
        *stored = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptrack_application::PermissionStore;
    use proptrack_domain::{Action, NewRole, Permission, default_roles};

    use super::InMemoryPermissionStateRepository;

    #[test]
    fn store_state_survives_reload_from_same_repository() {
        let repository = Arc::new(InMemoryPermissionStateRepository::new());
        let seeded = PermissionStore::load_or_seed(repository.clone(), default_roles());
        let Ok(mut store) = seeded else {
            panic!("store should seed");
        };

        let added = store.add_role(
            NewRole::new("Inspector", "Reads maintenance")
                .with_permission("maintenance", Permission::read_only()),
        );
        let Ok(role_id) = added else {
            panic!("role should be added");
        };
        assert!(store.set_active_role(Some(role_id)).is_ok());

        let reloaded = PermissionStore::load(repository);
        let Ok(reloaded) = reloaded else {
            panic!("store should reload");
        };
        assert_eq!(reloaded.active_role_id(), Some(role_id));
        assert!(reloaded.has_access("maintenance"));
        assert!(!reloaded.can(Action::Update, "maintenance"));
    }
}
