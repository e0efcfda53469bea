//! Terminal rendering for workflow state and history

use crate::extraction::{ExtractionResult, TrackedField};
use crate::history::{HistoryView, VerificationRecord};
use crate::workflow::{
    annotate_fields, CompanyCheck, ContactLookup, FieldAnnotation, PendingSend, WorkflowSnapshot,
};

const NOT_PROVIDED: &str = "(not provided)";

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn dash(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => "-",
    }
}

fn field_line(annotation: &FieldAnnotation) -> String {
    let value = if annotation.value.is_empty() {
        "(empty)"
    } else {
        annotation.value.as_str()
    };
    format!(
        "   {} {}: {} ({})",
        annotation.badge.color.emoji(),
        annotation.field.label(),
        value,
        annotation.badge.label
    )
}

pub fn extraction_lines(extraction: &ExtractionResult, raw_text: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &extraction.error {
        lines.push(format!("❌ Extraction error: {error}"));
    }
    if let Some(warning) = &extraction.ocr_warning {
        lines.push(format!("⚠️  OCR warning: {warning}"));
    }
    if let Some(company) = extraction.company_name() {
        lines.push(format!("🏢 Company: {company}"));
    }
    if extraction.has_suspicious_features() {
        lines.push("🚩 Suspicious features:".to_string());
        for feature in &extraction.suspicious_features {
            lines.push(format!("   • {feature}"));
        }
    } else {
        lines.push("✅ No suspicious features detected".to_string());
    }
    if raw_text && !extraction.raw_text.is_empty() {
        lines.push(String::new());
        lines.push("📜 Raw text:".to_string());
        lines.extend(extraction.raw_text.lines().map(|line| format!("   {line}")));
    }
    lines
}

pub fn company_lines(company: &CompanyCheck) -> Vec<String> {
    match company {
        CompanyCheck::NotStarted => vec!["🏢 Company not cross-checked yet".to_string()],
        CompanyCheck::Checking => vec!["🔄 Cross-checking company...".to_string()],
        CompanyCheck::NotFound { message } => vec![format!("❌ {message}")],
        CompanyCheck::Unresolved { reason } => vec![format!("❌ {reason}")],
        CompanyCheck::Resolved { website, contacts } => {
            let mut lines = vec![format!("🔗 Official website: {website}")];
            lines.extend(contact_lines(contacts));
            lines
        }
    }
}

fn contact_lines(contacts: &ContactLookup) -> Vec<String> {
    match contacts {
        ContactLookup::NotRequested => Vec::new(),
        ContactLookup::Searching => vec!["🔄 Looking up contacts...".to_string()],
        ContactLookup::Failed { reason } => vec![format!("❌ {reason}")],
        ContactLookup::Found(found) => {
            let mut lines = Vec::new();
            if found.emails.is_empty() {
                lines.push("📧 Emails: none found".to_string());
            } else {
                lines.push("📧 Emails:".to_string());
                lines.extend(found.emails.iter().map(|email| format!("   • {email}")));
            }
            if found.phones.is_empty() {
                lines.push("📞 Phones: none found".to_string());
            } else {
                lines.push("📞 Phones:".to_string());
                lines.extend(found.phones.iter().map(|phone| format!("   • {phone}")));
            }
            lines
        }
    }
}

pub fn snapshot_lines(snapshot: &WorkflowSnapshot, raw_text: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &snapshot.upload_error {
        lines.push(format!("❌ {error}"));
    }

    let Some(loaded) = &snapshot.extraction else {
        lines.push("📭 No certificate uploaded yet".to_string());
        lines.push("   💡 Run 'employment-verifier upload <file>' to start".to_string());
        return lines;
    };

    lines.push(format!("📄 EXTRACTION (upload #{})", loaded.version.0));
    lines.extend(extraction_lines(&loaded.result, raw_text));
    lines.push(String::new());
    lines.push("📝 FIELDS:".to_string());
    lines.extend(snapshot.annotations.iter().map(field_line));
    lines.push(String::new());
    lines.extend(company_lines(&snapshot.company));
    if let Some(message) = &snapshot.dispatch_message {
        lines.push(String::new());
        lines.push(format!("✉️  {message}"));
    }
    lines
}

/// Summary shown while a send awaits confirmation
pub fn confirmation_lines(pending: &PendingSend, extraction: Option<&ExtractionResult>) -> Vec<String> {
    let mut lines = vec![
        "📨 CONFIRM VERIFICATION EMAIL".to_string(),
        format!("   To: {}", pending.to_email),
    ];
    for annotation in annotate_fields(extraction, &pending.fields) {
        if annotation.field == TrackedField::IdNo && annotation.value.is_empty() {
            lines.push(format!(
                "   {} {}: {}",
                annotation.badge.color.emoji(),
                annotation.field.label(),
                NOT_PROVIDED
            ));
        } else {
            lines.push(field_line(&annotation));
        }
    }
    lines.push("   💡 Type 'confirm' to send or 'cancel' to go back".to_string());
    lines
}

fn record_line(record: &VerificationRecord) -> String {
    format!(
        "#{:<4} {:<28} {:<20} {:<10} {:<12} {:<10} {:<19} {}",
        record.id,
        record.to_email,
        dash(record.employee_name.as_deref()),
        dash(record.id_no.as_deref()),
        dash(record.department.as_deref()),
        record.status,
        dash(Some(record.sent_at_display().as_str())),
        dash(record.hr_reply.as_deref()),
    )
}

pub fn history_lines(view: HistoryView<'_>) -> Vec<String> {
    match view {
        HistoryView::Loading => vec!["🔄 Loading verification history...".to_string()],
        HistoryView::Error(message) => vec![format!("❌ {message}")],
        HistoryView::Empty => vec!["📭 No verification requests yet".to_string()],
        HistoryView::Records(records) => {
            let mut lines = vec![
                format!(
                    "{:<5} {:<28} {:<20} {:<10} {:<12} {:<10} {:<19} {}",
                    "ID", "TO", "EMPLOYEE", "ID NO", "DEPARTMENT", "STATUS", "SENT AT", "HR REPLY"
                ),
                "─".repeat(120),
            ];
            lines.extend(records.iter().map(record_line));
            lines
        }
    }
}
