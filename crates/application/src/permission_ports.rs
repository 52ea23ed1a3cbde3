use proptrack_core::AppResult;
use proptrack_domain::PermissionState;

/// Repository port for the durable authorization state record.
///
/// Calls are synchronous: the store writes through on every mutation before
/// the in-memory state changes.
pub trait PermissionStateRepository: Send + Sync {
    /// Loads the last persisted state, or `None` when nothing was written yet.
    fn load_state(&self) -> AppResult<Option<PermissionState>>;

    /// Replaces the persisted state.
    fn save_state(&self, state: &PermissionState) -> AppResult<()>;
}
