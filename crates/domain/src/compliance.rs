//! E-signature audit trail values.
//!
//! Every operation consumes the trail and returns the next value, so a trail
//! can be handed between request handlers without shared mutable state. The
//! action log only ever grows.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use proptrack_core::{AppError, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Verification method recorded when consent is given without one.
pub const DEFAULT_VERIFICATION_METHOD: &str = "self-attestation";

/// Well-known action tags written by the signing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceEvent {
    /// A signer consented to electronic records.
    ConsentRecorded,
    /// A signer applied a signature.
    SignatureRecorded,
    /// The signing workflow finished.
    DocumentCompleted,
    /// The document was delivered to a recipient.
    DocumentSent,
    /// A recipient opened the document.
    DocumentViewed,
}

impl ComplianceEvent {
    /// Returns a stable storage value for this event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConsentRecorded => "consent_recorded",
            Self::SignatureRecorded => "signature_recorded",
            Self::DocumentCompleted => "document_completed",
            Self::DocumentSent => "document_sent",
            Self::DocumentViewed => "document_viewed",
        }
    }
}

/// Channel used to deliver a document to a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Email delivery.
    Email,
    /// Text message delivery.
    Sms,
    /// WhatsApp delivery.
    WhatsApp,
}

impl DeliveryMethod {
    /// Returns a stable storage value for this method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "whatsapp" => Ok(Self::WhatsApp),
            _ => Err(AppError::Validation(format!(
                "delivery method must be one of 'email', 'sms' or 'whatsapp', got '{value}'"
            ))),
        }
    }
}

/// One entry of the action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAction {
    action: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Map<String, Value>>,
}

impl ComplianceAction {
    /// Returns the free-form action tag.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns when the action was recorded.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the originating IP address, if captured.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Returns the originating user agent, if captured.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Returns structured event details.
    #[must_use]
    pub fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }
}

/// Participant expected to sign the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    id: RecordId,
    name: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    consent_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    verification_method: Option<String>,
}

impl Signer {
    /// Returns the signer identifier.
    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the signer name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the signer email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns when consent was given.
    #[must_use]
    pub fn consent_timestamp(&self) -> Option<DateTime<Utc>> {
        self.consent_timestamp
    }

    /// Returns when the signature was applied.
    #[must_use]
    pub fn signature_timestamp(&self) -> Option<DateTime<Utc>> {
        self.signature_timestamp
    }

    /// Returns the IP address captured on the last consent or signature.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Returns how the signer's identity was verified.
    #[must_use]
    pub fn verification_method(&self) -> Option<&str> {
        self.verification_method.as_deref()
    }

    /// Returns whether the signer has signed.
    #[must_use]
    pub fn has_signed(&self) -> bool {
        self.signature_timestamp.is_some()
    }
}

/// Append-only record of one document's signing workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    document_id: RecordId,
    #[serde(default)]
    actions: Vec<ComplianceAction>,
    start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    signers: Vec<Signer>,
}

impl AuditTrail {
    /// Starts an empty trail for a document.
    #[must_use]
    pub fn new(document_id: impl Into<RecordId>) -> Self {
        Self::started_at(document_id, Utc::now())
    }

    /// Starts an empty trail with an explicit start time.
    #[must_use]
    pub fn started_at(document_id: impl Into<RecordId>, start_time: DateTime<Utc>) -> Self {
        Self {
            document_id: document_id.into(),
            actions: Vec::new(),
            start_time,
            completion_time: None,
            signers: Vec::new(),
        }
    }

    /// Returns the document identifier.
    #[must_use]
    pub fn document_id(&self) -> &RecordId {
        &self.document_id
    }

    /// Returns the action log in recording order.
    #[must_use]
    pub fn actions(&self) -> &[ComplianceAction] {
        &self.actions
    }

    /// Returns registered signers in registration order.
    #[must_use]
    pub fn signers(&self) -> &[Signer] {
        &self.signers
    }

    /// Returns the first signer registered under `signer_id`.
    #[must_use]
    pub fn signer(&self, signer_id: &RecordId) -> Option<&Signer> {
        self.signers.iter().find(|signer| &signer.id == signer_id)
    }

    /// Returns when the workflow started.
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns when the workflow was completed.
    #[must_use]
    pub fn completion_time(&self) -> Option<DateTime<Utc>> {
        self.completion_time
    }

    /// Returns whether the workflow was completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Returns whether at least one signer exists and every signer has signed.
    #[must_use]
    pub fn all_signed(&self) -> bool {
        !self.signers.is_empty() && self.signers.iter().all(Signer::has_signed)
    }

    /// Registers a signer. Duplicate identifiers are accepted as-is.
    #[must_use]
    pub fn add_signer(
        mut self,
        signer_id: impl Into<RecordId>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.signers.push(Signer {
            id: signer_id.into(),
            name: name.into(),
            email: email.into(),
            consent_timestamp: None,
            signature_timestamp: None,
            ip_address: None,
            verification_method: None,
        });
        self
    }

    /// Appends a free-form action stamped with the current time.
    #[must_use]
    pub fn record_action(
        mut self,
        action: impl Into<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        details: Option<Map<String, Value>>,
    ) -> Self {
        self.push_action(action.into(), Utc::now(), ip_address, user_agent, details);
        self
    }

    /// Records signer consent.
    ///
    /// The `consent_recorded` action is appended even when no signer matches
    /// `signer_id`; only the signer update is skipped.
    #[must_use]
    pub fn record_consent(
        mut self,
        signer_id: &RecordId,
        ip_address: Option<String>,
        verification_method: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let verification_method =
            verification_method.unwrap_or_else(|| DEFAULT_VERIFICATION_METHOD.to_owned());

        if let Some(signer) = self.signer_mut(signer_id) {
            signer.consent_timestamp = Some(now);
            signer.ip_address = ip_address.clone();
            signer.verification_method = Some(verification_method.clone());
        }

        let mut details = Map::new();
        details.insert("signerId".to_owned(), signer_id_value(signer_id));
        details.insert(
            "verificationMethod".to_owned(),
            Value::String(verification_method),
        );

        self.push_action(
            ComplianceEvent::ConsentRecorded.as_str().to_owned(),
            now,
            ip_address,
            None,
            Some(details),
        );
        self
    }

    /// Records a signature.
    ///
    /// Caller-supplied `details` are kept and tagged with the signer id. As
    /// with consent, the action is appended even for an unknown signer.
    #[must_use]
    pub fn record_signature(
        mut self,
        signer_id: &RecordId,
        ip_address: Option<String>,
        details: Option<Map<String, Value>>,
    ) -> Self {
        let now = Utc::now();

        if let Some(signer) = self.signer_mut(signer_id) {
            signer.signature_timestamp = Some(now);
            signer.ip_address = ip_address.clone();
        }

        let mut details = details.unwrap_or_default();
        details.insert("signerId".to_owned(), signer_id_value(signer_id));

        self.push_action(
            ComplianceEvent::SignatureRecorded.as_str().to_owned(),
            now,
            ip_address,
            None,
            Some(details),
        );
        self
    }

    /// Marks the workflow complete and appends `document_completed`.
    ///
    /// Calling this again overwrites the completion time and appends a second
    /// `document_completed` action.
    #[must_use]
    pub fn complete(mut self) -> Self {
        let now = Utc::now();
        self.completion_time = Some(now);
        self.push_action(
            ComplianceEvent::DocumentCompleted.as_str().to_owned(),
            now,
            None,
            None,
            None,
        );
        self
    }

    fn signer_mut(&mut self, signer_id: &RecordId) -> Option<&mut Signer> {
        self.signers
            .iter_mut()
            .find(|signer| &signer.id == signer_id)
    }

    fn push_action(
        &mut self,
        action: String,
        timestamp: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        details: Option<Map<String, Value>>,
    ) {
        self.actions.push(ComplianceAction {
            action,
            timestamp,
            ip_address,
            user_agent,
            details,
        });
    }
}

fn signer_id_value(signer_id: &RecordId) -> Value {
    match signer_id {
        RecordId::Number(value) => Value::from(*value),
        RecordId::Text(value) => Value::String(value.clone()),
    }
}
