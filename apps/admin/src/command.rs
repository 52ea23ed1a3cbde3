use proptrack_core::{AppError, AppResult, RecordId};
use proptrack_domain::{Action, DeliveryMethod};

pub const USAGE: &str = "usage: proptrack-admin <command>

  roles
  can <action> <resource>
  use-role <role-id|none>
  delete-role <role-id>
  trail-start <document-id>
  trail-signer <document-id> <signer-id> <name> <email>
  trail-consent <document-id> <signer-id> [ip]
  trail-sign <document-id> <signer-id> [ip]
  trail-send <document-id> <email|sms|whatsapp> <recipient> [message]
  trail-complete <document-id>
  certificate <document-id> <title>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListRoles,
    Can {
        action: Action,
        resource: String,
    },
    UseRole(Option<i64>),
    DeleteRole(i64),
    StartTrail(RecordId),
    AddSigner {
        document_id: RecordId,
        signer_id: RecordId,
        name: String,
        email: String,
    },
    RecordConsent {
        document_id: RecordId,
        signer_id: RecordId,
        ip_address: Option<String>,
    },
    RecordSignature {
        document_id: RecordId,
        signer_id: RecordId,
        ip_address: Option<String>,
    },
    SendDocument {
        document_id: RecordId,
        method: DeliveryMethod,
        recipient: String,
        message: String,
    },
    CompleteTrail(RecordId),
    Certificate {
        document_id: RecordId,
        title: String,
    },
}

impl Command {
    pub fn parse(args: &[String]) -> AppResult<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Err(usage_error("missing command"));
        };

        match (name.as_str(), rest) {
            ("roles", []) => Ok(Self::ListRoles),
            ("can", [action, resource]) => Ok(Self::Can {
                action: action.parse()?,
                resource: resource.clone(),
            }),
            ("use-role", [role_id]) if role_id == "none" => Ok(Self::UseRole(None)),
            ("use-role", [role_id]) => Ok(Self::UseRole(Some(parse_role_id(role_id)?))),
            ("delete-role", [role_id]) => Ok(Self::DeleteRole(parse_role_id(role_id)?)),
            ("trail-start", [document_id]) => Ok(Self::StartTrail(RecordId::parse(document_id))),
            ("trail-signer", [document_id, signer_id, name, email]) => Ok(Self::AddSigner {
                document_id: RecordId::parse(document_id),
                signer_id: RecordId::parse(signer_id),
                name: name.clone(),
                email: email.clone(),
            }),
            ("trail-consent", [document_id, signer_id, optional @ ..]) if optional.len() <= 1 => {
                Ok(Self::RecordConsent {
                    document_id: RecordId::parse(document_id),
                    signer_id: RecordId::parse(signer_id),
                    ip_address: optional.first().cloned(),
                })
            }
            ("trail-sign", [document_id, signer_id, optional @ ..]) if optional.len() <= 1 => {
                Ok(Self::RecordSignature {
                    document_id: RecordId::parse(document_id),
                    signer_id: RecordId::parse(signer_id),
                    ip_address: optional.first().cloned(),
                })
            }
            ("trail-send", [document_id, method, recipient, optional @ ..])
                if optional.len() <= 1 =>
            {
                Ok(Self::SendDocument {
                    document_id: RecordId::parse(document_id),
                    method: method.parse()?,
                    recipient: recipient.clone(),
                    message: optional
                        .first()
                        .cloned()
                        .unwrap_or_else(|| "Please review and sign the attached document.".to_owned()),
                })
            }
            ("trail-complete", [document_id]) => {
                Ok(Self::CompleteTrail(RecordId::parse(document_id)))
            }
            ("certificate", [document_id, title]) => Ok(Self::Certificate {
                document_id: RecordId::parse(document_id),
                title: title.clone(),
            }),
            (other, _) => Err(usage_error(&format!(
                "unknown command or wrong arguments for '{other}'"
            ))),
        }
    }
}

fn parse_role_id(value: &str) -> AppResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|error| AppError::Validation(format!("invalid role id '{value}': {error}")))
}

fn usage_error(reason: &str) -> AppError {
    AppError::Validation(format!("{reason}\n\n{USAGE}"))
}
