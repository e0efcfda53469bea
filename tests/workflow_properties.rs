// Property-based tests for field annotation and reconciliation

use employment_verifier::extraction::{ConfidenceTag, ExtractionResult, TrackedField};
use employment_verifier::workflow::{
    annotate, BadgeColor, FieldReconciler, ReconcileOutcome, UploadVersion,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn tag_strategy() -> impl Strategy<Value = Option<ConfidenceTag>> {
    prop_oneof![
        Just(None),
        Just(Some(ConfidenceTag::Ai)),
        Just(Some(ConfidenceTag::Pattern)),
        "[a-z]{1,8}".prop_map(|other| Some(ConfidenceTag::from(other))),
    ]
}

fn field_strategy() -> impl Strategy<Value = TrackedField> {
    prop_oneof![
        Just(TrackedField::EmployeeName),
        Just(TrackedField::IdNo),
        Just(TrackedField::Department),
        Just(TrackedField::Designation),
    ]
}

fn extraction_strategy() -> impl Strategy<Value = ExtractionResult> {
    proptest::collection::vec(proptest::option::of("[A-Za-z ]{0,12}"), 4).prop_map(|values| {
        let mut extracted_fields = Map::new();
        for (field, value) in TrackedField::ALL.iter().zip(values) {
            if let Some(value) = value {
                extracted_fields.insert(field.key().to_string(), Value::String(value));
            }
        }
        ExtractionResult {
            extracted_fields,
            ..Default::default()
        }
    })
}

proptest! {
    #[test]
    fn empty_value_is_always_red(tag in tag_strategy()) {
        let badge = annotate(tag.as_ref(), "");
        prop_assert_eq!(badge.color, BadgeColor::Red);
        prop_assert_eq!(badge.label, "Missing");
    }

    #[test]
    fn present_value_follows_tag(tag in tag_strategy(), value in "[A-Za-z0-9]{1,16}") {
        let badge = annotate(tag.as_ref(), &value);
        let expected = match &tag {
            Some(ConfidenceTag::Ai) => BadgeColor::Green,
            Some(ConfidenceTag::Pattern) => BadgeColor::Amber,
            _ => BadgeColor::Gray,
        };
        prop_assert_eq!(badge.color, expected);
        prop_assert_eq!(annotate(tag.as_ref(), &value), badge);
    }

    #[test]
    fn reapplying_same_upload_keeps_edits(
        extraction in extraction_strategy(),
        field in field_strategy(),
        edit in "[A-Za-z]{1,10}",
    ) {
        let mut reconciler = FieldReconciler::new();
        prop_assert_eq!(reconciler.reconcile(UploadVersion(1), &extraction), ReconcileOutcome::Reseeded);
        reconciler.edit(field, edit.clone());

        prop_assert_eq!(reconciler.reconcile(UploadVersion(1), &extraction), ReconcileOutcome::Unchanged);
        prop_assert_eq!(reconciler.fields().get(field), edit.as_str());
    }

    #[test]
    fn new_upload_reseeds_every_field(
        extraction in extraction_strategy(),
        field in field_strategy(),
        edit in "[A-Za-z]{1,10}",
    ) {
        let mut reconciler = FieldReconciler::new();
        reconciler.reconcile(UploadVersion(1), &extraction);
        reconciler.edit(field, edit);

        reconciler.reconcile(UploadVersion(2), &extraction);
        for tracked in TrackedField::ALL {
            prop_assert_eq!(reconciler.fields().get(tracked), extraction.tracked_value(tracked));
        }
    }
}
