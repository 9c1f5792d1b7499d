use seed_map::MappingRepository;
use seed_model::{ColumnMapping, MappingSource, OrgId, SourceType};
use tempfile::TempDir;

fn header(field: Option<&str>, header: &str) -> ColumnMapping {
    ColumnMapping {
        field: field.map(str::to_string),
        source: MappingSource::Header(header.to_string()),
    }
}

#[test]
fn repository_save_and_load() {
    let dir = TempDir::new().expect("temp dir");
    let repo = MappingRepository::new(dir.path()).expect("create repo");
    let org = OrgId::new(7);

    let path = repo
        .save(
            org,
            SourceType::AssessedRaw,
            &[header(Some("city"), "City"), header(Some("tax_lot_id"), "BBL")],
        )
        .expect("save mapping");

    assert!(path.exists());
    assert!(path.to_string_lossy().ends_with("org_7_assessed_raw.json"));

    let loaded = repo
        .load(org, SourceType::AssessedRaw)
        .expect("load mapping")
        .expect("mapping should exist");
    assert_eq!(loaded.mappings.len(), 2);
    assert!(loaded.saved_at.is_some());
    assert_eq!(loaded.version, "1.0");
}

#[test]
fn repository_load_nonexistent() {
    let dir = TempDir::new().expect("temp dir");
    let repo = MappingRepository::new(dir.path()).expect("create repo");

    let loaded = repo
        .load(OrgId::new(1), SourceType::PortfolioRaw)
        .expect("load attempt");
    assert!(loaded.is_none());
    assert!(
        repo.previous_mapping(OrgId::new(1), SourceType::PortfolioRaw)
            .expect("previous")
            .is_empty()
    );
}

#[test]
fn repository_merges_by_source() {
    let dir = TempDir::new().expect("temp dir");
    let repo = MappingRepository::new(dir.path()).expect("create repo");
    let org = OrgId::new(3);

    repo.save(
        org,
        SourceType::PortfolioRaw,
        &[header(Some("city"), "City"), header(Some("owner"), "Owner")],
    )
    .expect("first save");
    repo.save(
        org,
        SourceType::PortfolioRaw,
        &[
            header(Some("property_name"), "City"),
            header(None, "Owner"),
            ColumnMapping {
                field: Some("address_line_1".to_string()),
                source: MappingSource::Concatenated(vec!["Number".into(), "Street".into()]),
            },
        ],
    )
    .expect("second save");

    let previous = repo
        .previous_mapping(org, SourceType::PortfolioRaw)
        .expect("previous");
    assert_eq!(previous.len(), 1);
    assert_eq!(previous["City"], "property_name");

    let stored = repo
        .load(org, SourceType::PortfolioRaw)
        .expect("load")
        .expect("exists");
    assert_eq!(stored.mappings.len(), 2);
}

#[test]
fn repository_list_exists_delete() {
    let dir = TempDir::new().expect("temp dir");
    let repo = MappingRepository::new(dir.path()).expect("create repo");

    repo.save(OrgId::new(2), SourceType::AssessedRaw, &[header(Some("city"), "City")])
        .expect("save");
    repo.save(OrgId::new(1), SourceType::PortfolioRaw, &[header(Some("city"), "City")])
        .expect("save");

    let listed = repo.list().expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].organization_id, OrgId::new(1));
    assert_eq!(listed[1].mapping_count, 1);

    assert!(repo.exists(OrgId::new(2), SourceType::AssessedRaw));
    assert!(repo.delete(OrgId::new(2), SourceType::AssessedRaw).expect("delete"));
    assert!(!repo.exists(OrgId::new(2), SourceType::AssessedRaw));
    assert!(!repo.delete(OrgId::new(2), SourceType::AssessedRaw).expect("delete again"));
}
