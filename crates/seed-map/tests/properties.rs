use proptest::prelude::*;
use seed_map::{MappingEngine, conflict, validate};
use seed_model::{FieldSchema, FieldType, RawColumn, Validity};

fn sample_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[0-9]{1,6}",
        "[0-9]{1,3},[0-9]{3}",
        "[a-z]{1,8}",
        "(0[1-9]|1[0-2])/(0[1-9]|1[0-9])/20[0-9]{2}",
    ]
}

fn field_type() -> impl Strategy<Value = Option<FieldType>> {
    prop_oneof![
        Just(None),
        Just(Some(FieldType::Numeric)),
        Just(Some(FieldType::String)),
        Just(Some(FieldType::Date)),
        Just(Some(FieldType::Popover)),
    ]
}

fn suggestion() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("city".to_string())),
        Just(Some("gross_floor_area".to_string())),
        Just(Some("year_built".to_string())),
        Just(Some("release_date".to_string())),
    ]
}

/// Whether `sub` can be obtained from `full` by deleting elements.
fn is_subsequence(sub: &[String], full: &[String]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|wanted| rest.any(|v| v == wanted))
}

proptest! {
    #[test]
    fn validate_returns_ordered_subset(
        samples in prop::collection::vec(sample_value(), 0..12),
        ty in field_type(),
    ) {
        let invalid = validate(&samples, ty);
        prop_assert!(is_subsequence(&invalid, &samples));
        if ty.is_none() {
            prop_assert!(invalid.is_empty());
        }
        prop_assert!(validate(&[], ty).is_empty());
    }

    #[test]
    fn validity_tracks_invalid_counts(
        samples in prop::collection::vec(sample_value(), 0..8),
        field in suggestion(),
    ) {
        let engine = MappingEngine::new(FieldSchema::standard());
        let mut column = RawColumn::new("C", 1, samples);
        column.suggestion = field;
        engine.validate_column(&mut column);

        if column.target().is_none() {
            prop_assert_eq!(column.validity, Validity::Unset);
            prop_assert!(column.invalid_samples.is_empty());
        } else {
            let invalid = column.invalid_samples.len();
            let total = column.sample_values.len();
            prop_assert_eq!(column.validity == Validity::Valid, invalid == 0);
            prop_assert_eq!(
                column.validity == Validity::Invalid,
                invalid > 0 && invalid == total
            );
            prop_assert_eq!(
                column.validity == Validity::Semivalid,
                invalid > 0 && invalid < total
            );
        }
    }

    #[test]
    fn duplicate_flags_hold_for_whole_set(
        suggestions in prop::collection::vec(suggestion(), 1..8),
        changed in any::<prop::sample::Index>(),
        replacement in suggestion(),
    ) {
        let engine = MappingEngine::new(FieldSchema::standard());
        let mut columns: Vec<RawColumn> = suggestions
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let mut c = RawColumn::new(format!("C{idx}"), idx + 1, Vec::new());
                c.suggestion = s.clone();
                c
            })
            .collect();
        conflict::detect(&mut columns);
        assert_duplicate_invariant(&columns)?;

        let index = changed.index(columns.len());
        engine
            .set_suggestion(&mut columns, index, replacement.as_deref(), false)
            .expect("index in range");
        assert_duplicate_invariant(&columns)?;
    }
}

fn assert_duplicate_invariant(columns: &[RawColumn]) -> Result<(), TestCaseError> {
    for (i, column) in columns.iter().enumerate() {
        let shared = column.target().is_some_and(|target| {
            columns
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.target() == Some(target))
        });
        prop_assert_eq!(column.is_duplicate, shared, "column {}", column.name);
    }
    Ok(())
}
