//! Application services and ports.

#![forbid(unsafe_code)]

mod document_signing_service;
mod permission_ports;
mod permission_store;
mod signing_ports;

pub use document_signing_service::DocumentSigningService;
pub use permission_ports::PermissionStateRepository;
pub use permission_store::PermissionStore;
pub use signing_ports::{AuditTrailRepository, DocumentDelivery, DocumentDeliveryService};
