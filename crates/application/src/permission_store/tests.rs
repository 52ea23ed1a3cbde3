use std::sync::{Arc, Mutex};

use proptrack_core::{AppError, AppResult};
use proptrack_domain::{
    Action, NewRole, Permission, PermissionState, Resource, RolePatch, default_roles,
};

use crate::PermissionStateRepository;

use super::PermissionStore;

#[derive(Default)]
struct FakePermissionStateRepository {
    state: Mutex<Option<PermissionState>>,
    saves: Mutex<usize>,
}

impl FakePermissionStateRepository {
    fn with_state(state: PermissionState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    fn saved_state(&self) -> Option<PermissionState> {
        self.state.lock().ok().and_then(|state| state.clone())
    }

    fn save_count(&self) -> usize {
        self.saves.lock().map(|saves| *saves).unwrap_or_default()
    }
}

impl PermissionStateRepository for FakePermissionStateRepository {
    fn load_state(&self) -> AppResult<Option<PermissionState>> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| AppError::Internal("state lock poisoned".to_owned()))
    }

    fn save_state(&self, state: &PermissionState) -> AppResult<()> {
        let mut stored = self
            .state
            .lock()
            .map_err(|_| AppError::Internal("state lock poisoned".to_owned()))?;
        *stored = Some(state.clone());

        let mut saves = self
            .saves
            .lock()
            .map_err(|_| AppError::Internal("save counter lock poisoned".to_owned()))?;
        *saves += 1;
        Ok(())
    }
}

struct FailingPermissionStateRepository;

impl PermissionStateRepository for FailingPermissionStateRepository {
    fn load_state(&self) -> AppResult<Option<PermissionState>> {
        Ok(Some(PermissionState::with_roles(default_roles())))
    }

    fn save_state(&self, _state: &PermissionState) -> AppResult<()> {
        Err(AppError::Internal("disk full".to_owned()))
    }
}

fn load_store(repository: Arc<FakePermissionStateRepository>) -> PermissionStore {
    match PermissionStore::load(repository) {
        Ok(store) => store,
        Err(error) => panic!("store should load: {error}"),
    }
}

fn seeded_store() -> (PermissionStore, Arc<FakePermissionStateRepository>) {
    let repository = Arc::new(FakePermissionStateRepository::default());
    match PermissionStore::load_or_seed(repository.clone(), default_roles()) {
        Ok(store) => (store, repository),
        Err(error) => panic!("store should seed: {error}"),
    }
}

#[test]
fn empty_repository_loads_empty_store_that_denies() {
    let store = load_store(Arc::new(FakePermissionStateRepository::default()));

    assert!(store.roles().is_empty());
    assert_eq!(store.active_role_id(), None);
    for action in Action::all() {
        assert!(!store.can(*action, "properties"));
    }
}

#[test]
fn seeding_activates_first_role_and_persists() {
    let (store, repository) = seeded_store();

    assert_eq!(store.active_role_id(), Some(1));
    assert!(store.can(Action::Delete, Resource::Banking.as_str()));
    assert_eq!(repository.save_count(), 1);
    assert_eq!(repository.saved_state().as_ref(), Some(store.state()));
}

#[test]
fn seeding_is_skipped_when_state_exists() {
    let existing = PermissionState::with_roles(Vec::new());
    let repository = Arc::new(FakePermissionStateRepository::with_state(existing));

    let store = PermissionStore::load_or_seed(repository.clone(), default_roles());

    assert!(matches!(store, Ok(store) if store.roles().is_empty()));
    assert_eq!(repository.save_count(), 0);
}

#[test]
fn can_follows_active_role_flags() {
    let (mut store, _) = seeded_store();
    let viewer_id = store
        .roles()
        .iter()
        .find(|role| role.name == "Viewer")
        .map(|role| role.id);

    assert!(store.set_active_role(viewer_id).is_ok());

    assert!(store.has_access("properties"));
    assert!(!store.can(Action::Update, "properties"));
    assert!(!store.has_access("banking"));
    assert!(!store.has_access("unknown_resource"));
}

#[test]
fn clearing_active_role_denies_everything() {
    let (mut store, repository) = seeded_store();

    assert!(store.set_active_role(None).is_ok());

    assert!(!store.has_access("properties"));
    assert!(store.accessible_resources().is_empty());
    assert_eq!(
        repository.saved_state().and_then(|state| state.active_role_id),
        None
    );
}

#[test]
fn unknown_active_role_fails_closed() {
    let (mut store, _) = seeded_store();

    assert!(store.set_active_role(Some(404)).is_ok());

    assert_eq!(store.active_role_id(), Some(404));
    assert!(store.active_role().is_none());
    assert!(!store.can(Action::Read, "properties"));
    assert_eq!(store.permissions_for("properties"), Permission::default());
}

#[test]
fn add_role_assigns_increasing_ids_and_persists() {
    let (mut store, repository) = seeded_store();
    let max_before = store.roles().iter().map(|role| role.id).max().unwrap_or(0);

    let first = store.add_role(NewRole::new("Leasing Agent", "Handles leases"));
    let second = store.add_role(NewRole::new("Bookkeeper", "Handles banking"));

    let (Ok(first), Ok(second)) = (first, second) else {
        panic!("roles should be added");
    };
    assert!(first > max_before);
    assert!(second > first);
    assert_eq!(repository.saved_state().as_ref(), Some(store.state()));
}

#[test]
fn add_role_conflicts_when_ids_are_exhausted() {
    let repository = Arc::new(FakePermissionStateRepository::with_state(
        PermissionState::with_roles(vec![NewRole::new("Last", "").into_role(i64::MAX)]),
    ));
    let mut store = load_store(repository.clone());

    let added = store.add_role(NewRole::new("Overflow", ""));

    assert!(matches!(added, Err(AppError::Conflict(_))));
    assert_eq!(store.roles().len(), 1);
    assert_eq!(repository.save_count(), 0);
}

#[test]
fn update_role_changes_only_given_fields() {
    let (mut store, _) = seeded_store();
    let before = store.role(2).cloned();

    let result = store.update_role(
        2,
        RolePatch {
            name: Some("Portfolio Manager".to_owned()),
            ..RolePatch::default()
        },
    );

    assert!(result.is_ok());
    let (Some(before), Some(after)) = (before, store.role(2)) else {
        panic!("role 2 should exist");
    };
    assert_eq!(after.name, "Portfolio Manager");
    assert_eq!(after.permissions, before.permissions);
    assert_eq!(after.description, before.description);
    assert_eq!(after.is_system, before.is_system);
}

#[test]
fn update_and_delete_of_unknown_role_leave_roles_untouched() {
    let (mut store, _) = seeded_store();
    let before = store.roles().to_vec();

    assert!(
        store
            .update_role(
                99,
                RolePatch {
                    name: Some("ghost".to_owned()),
                    ..RolePatch::default()
                }
            )
            .is_ok()
    );
    assert!(store.delete_role(99).is_ok());

    assert_eq!(store.roles(), before.as_slice());
}

#[test]
fn delete_role_does_not_guard_system_roles() {
    let (mut store, _) = seeded_store();

    assert!(store.delete_role(1).is_ok());

    assert!(store.role(1).is_none());
    assert!(!store.can(Action::Read, "properties"));
}

#[test]
fn failed_save_leaves_memory_unchanged() {
    let loaded = PermissionStore::load(Arc::new(FailingPermissionStateRepository));
    let Ok(mut store) = loaded else {
        panic!("store should load");
    };
    let before = store.state().clone();

    assert!(store.add_role(NewRole::new("Temp", "")).is_err());
    assert!(store.set_active_role(Some(1)).is_err());

    assert_eq!(store.state(), &before);
}

#[test]
fn reloaded_store_answers_identically() {
    let (mut store, repository) = seeded_store();
    let custom = store.add_role(
        NewRole::new("Tenant Desk", "Front desk")
            .with_permission("tenants", Permission::read_write())
            .with_permission("documents", Permission::read_only()),
    );
    let Ok(custom) = custom else {
        panic!("role should be added");
    };
    assert!(store.set_active_role(Some(custom)).is_ok());

    let reloaded = load_store(repository);

    for resource in ["tenants", "documents", "banking", "not_a_resource"] {
        for action in Action::all() {
            assert_eq!(
                reloaded.can(*action, resource),
                store.can(*action, resource)
            );
        }
    }
    assert_eq!(
        reloaded.accessible_resources(),
        vec!["documents".to_owned(), "tenants".to_owned()]
    );
}
