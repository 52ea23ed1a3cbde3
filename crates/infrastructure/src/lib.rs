//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_document_delivery_service;
mod in_memory_audit_trail_repository;
mod in_memory_permission_state_repository;
mod json_file_audit_trail_repository;
mod json_file_permission_state_repository;

pub use console_document_delivery_service::ConsoleDocumentDeliveryService;
pub use in_memory_audit_trail_repository::InMemoryAuditTrailRepository;
pub use in_memory_permission_state_repository::InMemoryPermissionStateRepository;
pub use json_file_audit_trail_repository::JsonFileAuditTrailRepository;
pub use json_file_permission_state_repository::{
    JsonFilePermissionStateRepository, PERMISSION_STORAGE_KEY,
};
