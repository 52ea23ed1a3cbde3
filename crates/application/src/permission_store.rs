use std::sync::Arc;

use proptrack_core::AppResult;
use proptrack_domain::{Action, NewRole, Permission, PermissionState, Role, RolePatch};
use tracing::{debug, info, warn};

use crate::PermissionStateRepository;

/// Single source of truth for role definitions and the session's active role.
///
/// Lookups are total and fail closed. Every mutation saves the candidate state
/// through the repository first and only replaces the in-memory state once the
/// save succeeded.
pub struct PermissionStore {
    state: PermissionState,
    repository: Arc<dyn PermissionStateRepository>,
}

impl PermissionStore {
    /// Loads the persisted state, starting empty when nothing was saved yet.
    pub fn load(repository: Arc<dyn PermissionStateRepository>) -> AppResult<Self> {
        let state = repository.load_state()?.unwrap_or_default();
        Ok(Self::from_loaded(state, repository))
    }

    /// Loads the persisted state, seeding `roles` when nothing was saved yet.
    ///
    /// A freshly seeded store activates its first role and persists at once.
    pub fn load_or_seed(
        repository: Arc<dyn PermissionStateRepository>,
        roles: Vec<Role>,
    ) -> AppResult<Self> {
        if let Some(state) = repository.load_state()? {
            return Ok(Self::from_loaded(state, repository));
        }

        let mut state = PermissionState::with_roles(roles);
        state.active_role_id = state.roles.first().map(|role| role.id);
        repository.save_state(&state)?;

        info!(
            role_count = state.roles.len(),
            active_role_id = ?state.active_role_id,
            "seeded permission store"
        );

        Ok(Self { state, repository })
    }

    fn from_loaded(state: PermissionState, repository: Arc<dyn PermissionStateRepository>) -> Self {
        if let Some(role_id) = state.active_role_id
            && state.find_role(role_id).is_none()
        {
            warn!(
                active_role_id = role_id,
                "active role does not exist; all permission checks will deny"
            );
        }

        debug!(role_count = state.roles.len(), "loaded permission store");
        Self { state, repository }
    }

    /// Returns whether the active role allows `action` on `resource`.
    #[must_use]
    pub fn can(&self, action: Action, resource: &str) -> bool {
        let allowed = self.state.can(action, resource);
        if !allowed {
            debug!(
                action = action.as_str(),
                resource = resource,
                active_role_id = ?self.state.active_role_id,
                "permission denied"
            );
        }
        allowed
    }

    /// Returns whether the active role may read `resource`.
    #[must_use]
    pub fn has_access(&self, resource: &str) -> bool {
        self.can(Action::Read, resource)
    }

    /// Returns the active role's effective permission for a resource.
    #[must_use]
    pub fn permissions_for(&self, resource: &str) -> Permission {
        self.state
            .active_role()
            .map(|role| role.permission(resource))
            .unwrap_or_default()
    }

    /// Lists resources the active role can read, sorted by name.
    #[must_use]
    pub fn accessible_resources(&self) -> Vec<String> {
        self.state
            .active_role()
            .map(|role| {
                role.permissions
                    .iter()
                    .filter_map(|(resource, permission)| {
                        permission.read.then(|| resource.clone())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the role catalogue.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.state.roles
    }

    /// Finds a role by identifier.
    #[must_use]
    pub fn role(&self, role_id: i64) -> Option<&Role> {
        self.state.find_role(role_id)
    }

    /// Returns the active role reference, which may point to a deleted role.
    #[must_use]
    pub fn active_role_id(&self) -> Option<i64> {
        self.state.active_role_id
    }

    /// Returns the active role when it exists.
    #[must_use]
    pub fn active_role(&self) -> Option<&Role> {
        self.state.active_role()
    }

    /// Returns the full state as persisted.
    #[must_use]
    pub fn state(&self) -> &PermissionState {
        &self.state
    }

    /// Replaces the active role reference without checking that it exists.
    pub fn set_active_role(&mut self, role_id: Option<i64>) -> AppResult<()> {
        let mut next = self.state.clone();
        next.active_role_id = role_id;
        self.commit(next)?;

        info!(active_role_id = ?role_id, "active role changed");
        Ok(())
    }

    /// Adds a role and returns its assigned identifier.
    ///
    /// Fails with `Conflict` when no identifier above the current maximum
    /// remains.
    pub fn add_role(&mut self, role: NewRole) -> AppResult<i64> {
        let mut next = self.state.clone();
        let role_name = role.name.clone();
        let role_id = next.insert_role(role)?;
        self.commit(next)?;

        info!(role_id, role_name = %role_name, "role added");
        Ok(role_id)
    }

    /// Merges `patch` onto the role. Unknown ids are a no-op.
    pub fn update_role(&mut self, role_id: i64, patch: RolePatch) -> AppResult<()> {
        let mut next = self.state.clone();
        let matched = next.patch_role(role_id, patch);
        self.commit(next)?;

        if matched {
            info!(role_id, "role updated");
        } else {
            debug!(role_id, "update skipped for unknown role");
        }
        Ok(())
    }

    /// Removes the role. Unknown ids are a no-op.
    ///
    /// System roles are not protected here; callers check `is_system` first.
    pub fn delete_role(&mut self, role_id: i64) -> AppResult<()> {
        let mut next = self.state.clone();
        let removed = next.remove_role(role_id);
        self.commit(next)?;

        if !removed {
            debug!(role_id, "delete skipped for unknown role");
            return Ok(());
        }

        info!(role_id, "role deleted");
        if self.state.active_role_id == Some(role_id) {
            warn!(
                role_id,
                "deleted the active role; all permission checks will deny"
            );
        }
        Ok(())
    }

    fn commit(&mut self, next: PermissionState) -> AppResult<()> {
        self.repository.save_state(&next)?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
