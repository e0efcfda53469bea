//! Field reconciliation
//!
//! Extracted values seed the four editable fields. Seeding is keyed by upload
//! version: a new upload always re-seeds (replacing manual edits), while
//! re-applying the upload the fields were already seeded from leaves them alone.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::extraction::{ExtractionResult, TrackedField};

/// Fields the confirmation gate requires before a send can be requested
pub const SEND_REQUIRED_FIELDS: [TrackedField; 3] = [
    TrackedField::EmployeeName,
    TrackedField::Department,
    TrackedField::Designation,
];

/// Fields the discovered-contact action requires before it is offered.
/// Stricter than the gate: it also wants the ID number.
pub const CONTACT_ACTION_REQUIRED_FIELDS: [TrackedField; 4] = [
    TrackedField::EmployeeName,
    TrackedField::IdNo,
    TrackedField::Department,
    TrackedField::Designation,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", join_labels(.fields))]
    MissingFields { fields: Vec<TrackedField> },
}

fn join_labels(fields: &[TrackedField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciledFields {
    pub employee_name: String,
    pub id_no: String,
    pub department: String,
    pub designation: String,
}

impl ReconciledFields {
    /// Seed every tracked field from an extraction, empty when absent
    pub fn seeded_from(result: &ExtractionResult) -> Self {
        Self {
            employee_name: result.tracked_value(TrackedField::EmployeeName),
            id_no: result.tracked_value(TrackedField::IdNo),
            department: result.tracked_value(TrackedField::Department),
            designation: result.tracked_value(TrackedField::Designation),
        }
    }

    pub fn get(&self, field: TrackedField) -> &str {
        match field {
            TrackedField::EmployeeName => &self.employee_name,
            TrackedField::IdNo => &self.id_no,
            TrackedField::Department => &self.department,
            TrackedField::Designation => &self.designation,
        }
    }

    pub fn set(&mut self, field: TrackedField, value: impl Into<String>) {
        let slot = match field {
            TrackedField::EmployeeName => &mut self.employee_name,
            TrackedField::IdNo => &mut self.id_no,
            TrackedField::Department => &mut self.department,
            TrackedField::Designation => &mut self.designation,
        };
        *slot = value.into();
    }

    pub fn missing(&self, required: &[TrackedField]) -> Vec<TrackedField> {
        required
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    fn require(&self, required: &[TrackedField]) -> Result<(), ValidationError> {
        let fields = self.missing(required);
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields { fields })
        }
    }

    /// Guard of the `Idle -> AwaitingConfirmation` transition
    pub fn validate_for_send(&self) -> Result<(), ValidationError> {
        self.require(&SEND_REQUIRED_FIELDS)
    }

    /// Enable condition of the discovered-contact send action
    pub fn validate_for_contact_action(&self) -> Result<(), ValidationError> {
        self.require(&CONTACT_ACTION_REQUIRED_FIELDS)
    }

    /// `base` with the four reconciled values written over it
    pub fn overlay_onto(&self, base: &Map<String, Value>) -> Map<String, Value> {
        let mut fields = base.clone();
        for field in TrackedField::ALL {
            fields.insert(field.key().to_string(), Value::String(self.get(field).to_string()));
        }
        fields
    }
}

/// Identity of an accepted upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UploadVersion(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Reseeded,
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct FieldReconciler {
    fields: ReconciledFields,
    seeded_from: Option<UploadVersion>,
}

impl FieldReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the fields in line with `incoming`.
    ///
    /// Replaces all four fields when `version` differs from the one they were
    /// last seeded from; otherwise manual edits are kept.
    pub fn reconcile(&mut self, version: UploadVersion, incoming: &ExtractionResult) -> ReconcileOutcome {
        if self.seeded_from == Some(version) {
            debug!(version = version.0, "Fields already seeded from this upload");
            return ReconcileOutcome::Unchanged;
        }

        self.fields = ReconciledFields::seeded_from(incoming);
        self.seeded_from = Some(version);
        info!(
            version = version.0,
            missing = ?self.fields.missing(&TrackedField::ALL),
            "Reconciled fields re-seeded from extraction"
        );
        ReconcileOutcome::Reseeded
    }

    pub fn edit(&mut self, field: TrackedField, value: impl Into<String>) {
        let value = value.into();
        debug!(field = field.key(), "Manual field edit");
        self.fields.set(field, value);
    }

    pub fn fields(&self) -> &ReconciledFields {
        &self.fields
    }

    pub fn seeded_from(&self) -> Option<UploadVersion> {
        self.seeded_from
    }
}
