use chrono::{DateTime, SecondsFormat, Utc};

use crate::compliance::{AuditTrail, Signer};

const COMPLIANCE_STATEMENT: &str = "This certificate documents the electronic signature process \
for the referenced document and is retained as an electronic record under the Electronic \
Signatures in Global and National Commerce Act (ESIGN, 15 U.S.C. 7001 et seq.) and the \
Uniform Electronic Transactions Act (UETA).";

/// Renders the plain-text certificate of completion for a trail.
#[must_use]
pub fn render_certificate(trail: &AuditTrail, document_title: &str) -> String {
    render_certificate_at(trail, document_title, Utc::now())
}

/// Renders the certificate with an explicit generation timestamp.
#[must_use]
pub fn render_certificate_at(
    trail: &AuditTrail,
    document_title: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        "CERTIFICATE OF COMPLETION".to_owned(),
        "=========================".to_owned(),
        format!("Document ID: {}", trail.document_id()),
        format!("Document Title: {document_title}"),
        format!("Started: {}", format_timestamp(trail.start_time())),
        format!(
            "Completed: {}",
            trail
                .completion_time()
                .map(format_timestamp)
                .unwrap_or_else(|| "Not completed".to_owned())
        ),
        String::new(),
        "Signers".to_owned(),
        "-------".to_owned(),
    ];

    if trail.signers().is_empty() {
        lines.push("No signers registered".to_owned());
    }
    lines.extend(
        trail
            .signers()
            .iter()
            .enumerate()
            .map(|(index, signer)| signer_line(index + 1, signer)),
    );

    lines.push(String::new());
    lines.push("Audit Trail".to_owned());
    lines.push("-----------".to_owned());

    if trail.actions().is_empty() {
        lines.push("No actions recorded".to_owned());
    }
    lines.extend(trail.actions().iter().map(|action| {
        format!(
            "{} - {}",
            format_timestamp(action.timestamp()),
            action.action()
        )
    }));

    lines.push(String::new());
    lines.push(COMPLIANCE_STATEMENT.to_owned());
    lines.push(format!(
        "Certificate generated: {}",
        format_timestamp(generated_at)
    ));

    lines.join("\n")
}

fn signer_line(position: usize, signer: &Signer) -> String {
    format!(
        "{position}. {} <{}> | Consent: {} | Signature: {} | Verification: {}",
        signer.name(),
        signer.email(),
        signer
            .consent_timestamp()
            .map(format_timestamp)
            .unwrap_or_else(|| "Not given".to_owned()),
        signer
            .signature_timestamp()
            .map(format_timestamp)
            .unwrap_or_else(|| "Not signed".to_owned()),
        signer.verification_method().unwrap_or("N/A"),
    )
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
