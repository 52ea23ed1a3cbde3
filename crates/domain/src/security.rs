use std::collections::BTreeMap;
use std::str::FromStr;

use proptrack_core::AppError;
use serde::{Deserialize, Serialize};

/// Operations a role can be allowed to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Allows creating records.
    Create,
    /// Allows viewing records.
    Read,
    /// Allows editing records.
    Update,
    /// Allows removing records.
    Delete,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown permission action '{value}'"
            ))),
        }
    }
}

/// Protected areas of the property-management dashboard.
///
/// Role permission maps are keyed by free-form strings; this catalogue lists
/// the keys the dashboard itself checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Property portfolio.
    Properties,
    /// Tenant records.
    Tenants,
    /// Lease agreements.
    Leases,
    /// Maintenance requests.
    Maintenance,
    /// Banking and accounting records.
    Banking,
    /// Contact directory.
    Contacts,
    /// Companies and vendors.
    Companies,
    /// Stored documents and signing workflows.
    Documents,
    /// Task board.
    Tasks,
    /// Dashboard reports.
    Reports,
    /// Workspace settings, including role administration.
    Settings,
}

impl Resource {
    /// Returns a stable storage value for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Tenants => "tenants",
            Self::Leases => "leases",
            Self::Maintenance => "maintenance",
            Self::Banking => "banking",
            Self::Contacts => "contacts",
            Self::Companies => "companies",
            Self::Documents => "documents",
            Self::Tasks => "tasks",
            Self::Reports => "reports",
            Self::Settings => "settings",
        }
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Properties,
            Resource::Tenants,
            Resource::Leases,
            Resource::Maintenance,
            Resource::Banking,
            Resource::Contacts,
            Resource::Companies,
            Resource::Documents,
            Resource::Tasks,
            Resource::Reports,
            Resource::Settings,
        ];

        ALL
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource '{value}'")))
    }
}

/// Allowed operations on one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Create flag.
    #[serde(default)]
    pub create: bool,
    /// Read flag.
    #[serde(default)]
    pub read: bool,
    /// Update flag.
    #[serde(default)]
    pub update: bool,
    /// Delete flag.
    #[serde(default)]
    pub delete: bool,
}

impl Permission {
    /// Grants every operation.
    #[must_use]
    pub fn full() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
        }
    }

    /// Grants read only.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    /// Grants everything except delete.
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: false,
        }
    }

    /// Returns whether the flag for `action` is set.
    #[must_use]
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Create => self.create,
            Action::Read => self.read,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }
}

/// Named set of per-resource permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Built-in role that end users should not delete.
    #[serde(default)]
    pub is_system: bool,
    /// Permissions keyed by resource name.
    #[serde(default)]
    pub permissions: BTreeMap<String, Permission>,
}

impl Role {
    /// Returns the permission entry for a resource, all-false when absent.
    #[must_use]
    pub fn permission(&self, resource: &str) -> Permission {
        self.permissions.get(resource).copied().unwrap_or_default()
    }

    /// Returns whether this role allows `action` on `resource`.
    #[must_use]
    pub fn can(&self, action: Action, resource: &str) -> bool {
        self.permission(resource).allows(action)
    }
}

/// Role payload before an identifier is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    /// Display name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Built-in role flag.
    #[serde(default)]
    pub is_system: bool,
    /// Permissions keyed by resource name.
    #[serde(default)]
    pub permissions: BTreeMap<String, Permission>,
}

impl NewRole {
    /// Starts a custom role with no grants.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_system: false,
            permissions: BTreeMap::new(),
        }
    }

    /// Marks the role as built-in.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Sets the permission for one resource.
    #[must_use]
    pub fn with_permission(mut self, resource: impl Into<String>, permission: Permission) -> Self {
        self.permissions.insert(resource.into(), permission);
        self
    }

    /// Converts the payload into a role with the given identifier.
    #[must_use]
    pub fn into_role(self, id: i64) -> Role {
        Role {
            id,
            name: self.name,
            description: self.description,
            is_system: self.is_system,
            permissions: self.permissions,
        }
    }
}

/// Partial role update merged field-by-field onto an existing role.
///
/// `permissions`, when present, replaces the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePatch {
    /// Replacement name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement built-in flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_system: Option<bool>,
    /// Replacement permission map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, Permission>>,
}

impl RolePatch {
    /// Applies the present fields onto `role`. The role id never changes.
    pub fn apply_to(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.name = name;
        }
        if let Some(description) = self.description {
            role.description = description;
        }
        if let Some(is_system) = self.is_system {
            role.is_system = is_system;
        }
        if let Some(permissions) = self.permissions {
            role.permissions = permissions;
        }
    }
}

/// Persisted authorization state: the role catalogue and the session's role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionState {
    /// Role catalogue.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Role used for permission checks, if any.
    #[serde(default)]
    pub active_role_id: Option<i64>,
}

impl PermissionState {
    /// Creates a state from a role catalogue with no active role.
    #[must_use]
    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles,
            active_role_id: None,
        }
    }

    /// Returns the identifier the next added role receives.
    ///
    /// Fails with [`AppError::Conflict`] once the largest stored id is
    /// `i64::MAX`.
    pub fn next_role_id(&self) -> Result<i64, AppError> {
        let max_role_id = self.roles.iter().map(|role| role.id).max().unwrap_or(0);
        max_role_id.checked_add(1).ok_or_else(|| {
            AppError::Conflict(format!("role ids are exhausted: largest id is {max_role_id}"))
        })
    }

    /// Finds a role by identifier.
    #[must_use]
    pub fn find_role(&self, role_id: i64) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == role_id)
    }

    /// Returns the active role when it is set and still exists.
    #[must_use]
    pub fn active_role(&self) -> Option<&Role> {
        self.active_role_id.and_then(|role_id| self.find_role(role_id))
    }

    /// Fail-closed permission check against the active role.
    #[must_use]
    pub fn can(&self, action: Action, resource: &str) -> bool {
        self.active_role().is_some_and(|role| role.can(action, resource))
    }

    /// Appends a role and returns its assigned identifier.
    pub fn insert_role(&mut self, role: NewRole) -> Result<i64, AppError> {
        let role_id = self.next_role_id()?;
        self.roles.push(role.into_role(role_id));
        Ok(role_id)
    }

    /// Merges `patch` onto the matching role. Returns whether a role matched.
    pub fn patch_role(&mut self, role_id: i64, patch: RolePatch) -> bool {
        match self.roles.iter_mut().find(|role| role.id == role_id) {
            Some(role) => {
                patch.apply_to(role);
                true
            }
            None => false,
        }
    }

    /// Removes the matching role. Returns whether a role was removed.
    pub fn remove_role(&mut self, role_id: i64) -> bool {
        let before = self.roles.len();
        self.roles.retain(|role| role.id != role_id);
        self.roles.len() != before
    }
}

/// Built-in roles seeded into a fresh workspace.
#[must_use]
pub fn default_roles() -> Vec<Role> {
    let administrator = Resource::all().iter().fold(
        NewRole::new("Administrator", "Full access to every area of the dashboard").system(),
        |role, resource| role.with_permission(resource.as_str(), Permission::full()),
    );

    let property_manager = NewRole::new(
        "Property Manager",
        "Manages properties, tenants, leases and maintenance",
    )
    .system()
    .with_permission(Resource::Properties.as_str(), Permission::full())
    .with_permission(Resource::Tenants.as_str(), Permission::full())
    .with_permission(Resource::Leases.as_str(), Permission::full())
    .with_permission(Resource::Maintenance.as_str(), Permission::full())
    .with_permission(Resource::Contacts.as_str(), Permission::read_write())
    .with_permission(Resource::Companies.as_str(), Permission::read_write())
    .with_permission(Resource::Documents.as_str(), Permission::read_write())
    .with_permission(Resource::Tasks.as_str(), Permission::full())
    .with_permission(Resource::Banking.as_str(), Permission::read_only())
    .with_permission(Resource::Reports.as_str(), Permission::read_only());

    let accountant = NewRole::new("Accountant", "Maintains banking and accounting records")
        .system()
        .with_permission(Resource::Banking.as_str(), Permission::full())
        .with_permission(Resource::Reports.as_str(), Permission::read_write())
        .with_permission(Resource::Properties.as_str(), Permission::read_only())
        .with_permission(Resource::Tenants.as_str(), Permission::read_only())
        .with_permission(Resource::Leases.as_str(), Permission::read_only())
        .with_permission(Resource::Companies.as_str(), Permission::read_only())
        .with_permission(Resource::Documents.as_str(), Permission::read_only());

    let maintenance_staff =
        NewRole::new("Maintenance Staff", "Works maintenance requests and tasks")
            .system()
            .with_permission(Resource::Maintenance.as_str(), Permission::read_write())
            .with_permission(Resource::Tasks.as_str(), Permission::read_write())
            .with_permission(Resource::Properties.as_str(), Permission::read_only())
            .with_permission(Resource::Contacts.as_str(), Permission::read_only());

    let viewer = Resource::all()
        .iter()
        .filter(|resource| !matches!(resource, Resource::Banking | Resource::Settings))
        .fold(
            NewRole::new("Viewer", "Read-only access to operational data").system(),
            |role, resource| role.with_permission(resource.as_str(), Permission::read_only()),
        );

    [
        administrator,
        property_manager,
        accountant,
        maintenance_staff,
        viewer,
    ]
    .into_iter()
    .zip(1_i64..)
    .map(|(role, id)| role.into_role(id))
    .collect()
}
