use seed_map::{MappingEngine, conflict};
use seed_model::{
    ConfidenceThresholds, FieldSchema, FieldType, PriorSuggestion, RawColumn, SuggestionTable,
    Validity,
};

fn column(name: &str, row: usize, samples: &[&str]) -> RawColumn {
    RawColumn::new(
        name,
        row,
        samples.iter().map(|s| (*s).to_string()).collect(),
    )
}

#[test]
fn duplicate_headers_all_flagged_with_tiers() {
    // The suggestion table is keyed by header, so a repeated header cannot
    // carry two confidences through it; the columns arrive pre-suggested.
    let engine = MappingEngine::new(FieldSchema::standard());
    let thresholds = ConfidenceThresholds::default();
    let mut columns: Vec<RawColumn> = [("Address", 80.0), ("GFA", 80.0), ("Address", 10.0)]
        .iter()
        .enumerate()
        .map(|(idx, (name, confidence))| {
            let mut c = column(name, idx + 1, &["1200"]);
            c.suggestion = Some("gross_floor_area".to_string());
            c.confidence = Some(*confidence);
            engine.validate_column(&mut c);
            c
        })
        .collect();

    conflict::detect(&mut columns);

    assert!(columns.iter().all(|c| c.is_duplicate));
    let labels: Vec<&str> = columns
        .iter()
        .filter_map(|c| c.confidence_level(&thresholds))
        .map(|level| level.label())
        .collect();
    assert_eq!(labels, vec!["high", "high", "low"]);
    assert!(columns.iter().all(|c| c.validity == Validity::Valid));
}

#[test]
fn suggest_with_schema_from_wire_tags() {
    let fields = vec!["site_eui".to_string(), "release_date".to_string()];
    let tags = [
        ("site_eui".to_string(), "float".to_string()),
        ("release_date".to_string(), "date".to_string()),
    ];
    let schema = FieldSchema::from_tags(fields, tags.iter().map(|(f, t)| (f, t)));
    let engine = MappingEngine::new(schema);

    let mut columns = vec![
        column("Site EUI", 1, &["45.1", "bad", "bad"]),
        column("Released", 2, &["soon", "later"]),
    ];
    let mut prior = SuggestionTable::new();
    prior.insert("Site EUI".into(), PriorSuggestion::new("site_eui", 76.0));
    prior.insert("Released".into(), PriorSuggestion::new("release_date", 39.0));
    engine.suggest(&mut columns, &prior);

    assert_eq!(columns[0].suggestion_type, Some(FieldType::Numeric));
    assert_eq!(columns[0].invalid_samples, vec!["bad", "bad"]);
    assert_eq!(columns[0].validity, Validity::Semivalid);
    assert_eq!(columns[1].validity, Validity::Invalid);
    assert!(!columns[0].is_duplicate);
}
