//! Confidence badges for reviewed fields

use serde::Serialize;
use std::fmt;

use crate::extraction::{ConfidenceTag, ExtractionResult, TrackedField};
use crate::workflow::reconcile::ReconciledFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Red,
    Green,
    Amber,
    Gray,
}

impl BadgeColor {
    pub fn emoji(self) -> &'static str {
        match self {
            BadgeColor::Red => "🔴",
            BadgeColor::Green => "🟢",
            BadgeColor::Amber => "🟠",
            BadgeColor::Gray => "⚪",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConfidenceBadge {
    pub color: BadgeColor,
    pub label: &'static str,
}

impl fmt::Display for ConfidenceBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color.emoji(), self.label)
    }
}

/// Classify a field for display.
///
/// An empty value is always `Missing`, whatever the tag says; otherwise the
/// tag decides. Used by field review and by the confirmation summary.
pub fn annotate(tag: Option<&ConfidenceTag>, value: &str) -> ConfidenceBadge {
    if value.is_empty() {
        return ConfidenceBadge { color: BadgeColor::Red, label: "Missing" };
    }
    match tag {
        Some(ConfidenceTag::Ai) => ConfidenceBadge { color: BadgeColor::Green, label: "AI extracted" },
        Some(ConfidenceTag::Pattern) => ConfidenceBadge { color: BadgeColor::Amber, label: "Pattern extracted" },
        Some(ConfidenceTag::Other(_)) | None => ConfidenceBadge {
            color: BadgeColor::Gray,
            label: "Manual or uncertain",
        },
    }
}

/// A tracked field with its current value and badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldAnnotation {
    pub field: TrackedField,
    pub value: String,
    pub badge: ConfidenceBadge,
}

/// Annotate all tracked fields against the extraction they were seeded from
pub fn annotate_fields(
    extraction: Option<&ExtractionResult>,
    fields: &ReconciledFields,
) -> Vec<FieldAnnotation> {
    TrackedField::ALL
        .iter()
        .map(|&field| {
            let value = fields.get(field).to_string();
            let tag = extraction.and_then(|result| result.confidence_for(field));
            FieldAnnotation {
                field,
                badge: annotate(tag, &value),
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_missing_regardless_of_tag() {
        for tag in [
            None,
            Some(ConfidenceTag::Ai),
            Some(ConfidenceTag::Pattern),
            Some(ConfidenceTag::Other("manual".into())),
        ] {
            let badge = annotate(tag.as_ref(), "");
            assert_eq!(badge.color, BadgeColor::Red);
            assert_eq!(badge.label, "Missing");
        }
    }

    #[test]
    fn present_value_follows_tag() {
        assert_eq!(annotate(Some(&ConfidenceTag::Ai), "Jane").color, BadgeColor::Green);
        assert_eq!(annotate(Some(&ConfidenceTag::Pattern), "Jane").color, BadgeColor::Amber);
        assert_eq!(annotate(Some(&ConfidenceTag::Other("x".into())), "Jane").color, BadgeColor::Gray);
        assert_eq!(annotate(None, "Jane").label, "Manual or uncertain");
    }

    #[test]
    fn whitespace_counts_as_present() {
        assert_eq!(annotate(None, " ").color, BadgeColor::Gray);
    }

    #[test]
    fn annotate_fields_without_extraction_is_all_gray_or_red() {
        let mut fields = ReconciledFields::default();
        fields.set(TrackedField::EmployeeName, "Jane Doe");

        let annotations = annotate_fields(None, &fields);
        assert_eq!(annotations.len(), 4);
        assert_eq!(annotations[0].badge.color, BadgeColor::Gray);
        assert!(annotations[1..].iter().all(|a| a.badge.color == BadgeColor::Red));
    }
}
