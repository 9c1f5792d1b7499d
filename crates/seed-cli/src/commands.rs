//! Command implementations, independent of terminal output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use seed_map::{MappingEngine, MappingRepository, MappingSession, ScoringEngine};
use seed_model::{
    BuildingId, BuildingRecord, ColumnMapping, FieldSchema, OrgId, SourceType, SuggestionTable,
};
use seed_reconcile::ProvenanceSession;
use tracing::{debug, info, info_span};

use crate::cli::{MapArgs, MergeArgs};
use crate::config::Config;
use crate::input::{read_json, read_sample, write_json};
use crate::logging::redact_value;

/// Result of `seed map`.
#[derive(Debug)]
pub struct MapOutcome {
    pub session: MappingSession,
    /// Committed mapping list; `None` while conflicts block progression.
    pub committed: Option<Vec<ColumnMapping>>,
    pub saved_to: Option<PathBuf>,
}

pub fn load_schema(types: Option<&Path>) -> Result<FieldSchema> {
    match types {
        Some(path) => {
            let tags: BTreeMap<String, String> = read_json(path)?;
            Ok(FieldSchema::from_tags(tags.keys().cloned(), &tags))
        }
        None => Ok(FieldSchema::standard()),
    }
}

pub fn run_map(args: &MapArgs, config: &Config) -> Result<MapOutcome> {
    let span = info_span!("map", file = %args.csv.display());
    let _guard = span.enter();

    let sample = read_sample(&args.csv, config.mapping.sample_rows)?;
    let schema = load_schema(args.types.as_deref())?;
    let source_type = SourceType::from_label(&args.source_type);
    let repository = args
        .repository
        .as_ref()
        .map(MappingRepository::new)
        .transpose()?;
    let org = args.org.map(OrgId::new);

    let engine = MappingEngine::new(schema.clone());
    let mut session = MappingSession::from_samples(
        &sample.headers,
        &sample.rows,
        engine,
        config.mapping.thresholds(),
    );

    let table: SuggestionTable = match &args.suggestions {
        Some(path) => read_json(path)?,
        None => {
            let previous = match (&repository, org) {
                (Some(repository), Some(org)) => repository.previous_mapping(org, source_type)?,
                _ => BTreeMap::new(),
            };
            debug!(previous = previous.len(), "scoring headers");
            ScoringEngine::new(schema.clone())
                .with_previous(previous)
                .with_threshold(config.mapping.fuzzy_threshold)
                .build_table(session.columns())
        }
    };
    session.suggest(&table);

    for assignment in &args.set {
        let is_extra = assignment
            .field
            .as_deref()
            .is_some_and(|field| !schema.contains(field));
        session
            .set_suggestion_by_header(&assignment.header, assignment.field.as_deref(), is_extra)
            .with_context(|| format!("Cannot map column '{}'", assignment.header))?;
    }
    for concat in &args.concat {
        session
            .concatenate(&concat.headers, Some(concat.field.as_str()))
            .with_context(|| format!("Cannot build '{}'", concat.field))?;
    }

    for column in session.columns() {
        if let Some(value) = column.invalid_samples.first() {
            debug!(
                header = %column.name,
                validity = column.validity.as_str(),
                first_invalid = redact_value(value),
                "column has invalid samples"
            );
        }
    }

    if session.has_conflicts() {
        return Ok(MapOutcome {
            session,
            committed: None,
            saved_to: None,
        });
    }

    let committed = session.commit()?;
    if let Some(path) = &args.output {
        write_json(path, &committed)?;
    }
    let saved_to = match (args.save, &repository, org) {
        (true, Some(repository), Some(org)) => {
            Some(repository.save(org, source_type, &committed)?)
        }
        _ => None,
    };
    info!(
        mappings = committed.len(),
        saved = saved_to.is_some(),
        "mapping committed"
    );
    Ok(MapOutcome {
        session,
        committed: Some(committed),
        saved_to,
    })
}

pub fn run_merge(args: &MergeArgs) -> Result<ProvenanceSession> {
    let target: BuildingRecord = read_json(&args.canonical)?;
    let sources = args
        .sources
        .iter()
        .map(|path| read_json::<BuildingRecord>(path))
        .collect::<Result<Vec<_>>>()?;
    let span = info_span!("merge", building = %target.id);
    let _guard = span.enter();
    let mut session = ProvenanceSession::new(target, sources)?;

    if let Some(id) = args.default {
        let copied = session.adopt_all(BuildingId::new(id))?;
        info!(source = id, copied, "default source set");
    }
    for adoption in &args.adopt {
        session.adopt_field(adoption.source, &adoption.key, false)?;
    }
    for adoption in &args.adopt_extra {
        session.adopt_field(adoption.source, &adoption.key, true)?;
    }
    for edit in &args.edit {
        let is_extra = !session.target().fields.contains_key(&edit.field)
            && session.target().extra_data.contains_key(&edit.field);
        session.edit_field(&edit.field, edit.value.clone(), is_extra);
    }

    if let Some(path) = &args.output {
        write_json(path, session.target())?;
    }
    Ok(session)
}
