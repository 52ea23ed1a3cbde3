//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod certificate;
mod compliance;
mod security;

pub use certificate::{render_certificate, render_certificate_at};
pub use compliance::{
    AuditTrail, ComplianceAction, ComplianceEvent, DEFAULT_VERIFICATION_METHOD, DeliveryMethod,
    Signer,
};
pub use security::{
    Action, NewRole, Permission, PermissionState, Resource, Role, RolePatch, default_roles,
};
