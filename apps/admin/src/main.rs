//! Proptrack administration tool for roles and signing audit trails.

#![forbid(unsafe_code)]

mod admin_config;
mod command;

use std::env;
use std::sync::Arc;

use proptrack_application::{DocumentDelivery, DocumentSigningService, PermissionStore};
use proptrack_core::{AppError, AppResult};
use proptrack_domain::{AuditTrail, default_roles};
use proptrack_infrastructure::{
    ConsoleDocumentDeliveryService, JsonFileAuditTrailRepository,
    JsonFilePermissionStateRepository,
};
use tracing::info;

use admin_config::{AdminConfig, init_tracing};
use command::Command;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AdminConfig::load()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    info!(
        data_dir = %config.data_dir.display(),
        seed_default_roles = config.seed_default_roles,
        "proptrack-admin started"
    );

    match command {
        Command::ListRoles
        | Command::Can { .. }
        | Command::UseRole(_)
        | Command::DeleteRole(_) => run_role_command(&config, command),
        _ => run_trail_command(&config, command).await,
    }
}

fn load_permission_store(config: &AdminConfig) -> AppResult<PermissionStore> {
    let repository = Arc::new(JsonFilePermissionStateRepository::new(&config.data_dir));

    if config.seed_default_roles {
        PermissionStore::load_or_seed(repository, default_roles())
    } else {
        PermissionStore::load(repository)
    }
}

fn run_role_command(config: &AdminConfig, command: Command) -> AppResult<()> {
    let mut store = load_permission_store(config)?;

    match command {
        Command::ListRoles => {
            for role in store.roles() {
                let marker = if store.active_role_id() == Some(role.id) {
                    "*"
                } else {
                    " "
                };
                let kind = if role.is_system { "system" } else { "custom" };
                println!(
                    "{marker} {:>3}  {:<20} {kind:<6}  {}",
                    role.id, role.name, role.description
                );
            }
            Ok(())
        }
        Command::Can { action, resource } => {
            println!("{}", store.can(action, resource.as_str()));
            Ok(())
        }
        Command::UseRole(role_id) => store.set_active_role(role_id),
        Command::DeleteRole(role_id) => {
            if store.role(role_id).is_some_and(|role| role.is_system) {
                return Err(AppError::Forbidden(format!(
                    "role '{role_id}' is a system role and cannot be deleted"
                )));
            }
            store.delete_role(role_id)
        }
        _ => Err(AppError::Internal(
            "trail command routed to role handler".to_owned(),
        )),
    }
}

async fn run_trail_command(config: &AdminConfig, command: Command) -> AppResult<()> {
    let service = DocumentSigningService::new(
        Arc::new(JsonFileAuditTrailRepository::new(config.audit_trail_dir())),
        Arc::new(ConsoleDocumentDeliveryService::new()),
    );

    let trail = match command {
        Command::StartTrail(document_id) => service.start_trail(document_id).await?,
        Command::AddSigner {
            document_id,
            signer_id,
            name,
            email,
        } => {
            service
                .add_signer(&document_id, signer_id, name.as_str(), email.as_str())
                .await?
        }
        Command::RecordConsent {
            document_id,
            signer_id,
            ip_address,
        } => {
            service
                .record_consent(&document_id, &signer_id, ip_address, None)
                .await?
        }
        Command::RecordSignature {
            document_id,
            signer_id,
            ip_address,
        } => {
            service
                .record_signature(&document_id, &signer_id, ip_address, None)
                .await?
        }
        Command::SendDocument {
            document_id,
            method,
            recipient,
            message,
        } => {
            service
                .send_document(DocumentDelivery {
                    document_id,
                    method,
                    recipient,
                    message,
                })
                .await?
        }
        Command::CompleteTrail(document_id) => service.complete(&document_id).await?,
        Command::Certificate { document_id, title } => {
            let certificate = service.certificate(&document_id, title.as_str()).await?;
            println!("{certificate}");
            return Ok(());
        }
        _ => {
            return Err(AppError::Internal(
                "role command routed to trail handler".to_owned(),
            ));
        }
    };

    print_trail_summary(&trail);
    Ok(())
}

fn print_trail_summary(trail: &AuditTrail) {
    println!(
        "document {}: {} signer(s), {} action(s), {}",
        trail.document_id(),
        trail.signers().len(),
        trail.actions().len(),
        if trail.is_completed() {
            "completed"
        } else {
            "open"
        }
    );
}
