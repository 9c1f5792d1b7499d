//! Field-level provenance of canonical buildings.
//!
//! A canonical building remembers, per field, which source record supplied
//! the current value. At most one source is the master: the default for
//! every field nobody picked by hand.

use std::collections::BTreeMap;

use seed_model::{BuildingId, BuildingRecord};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Keys that are identifiers, audit fields or match bookkeeping and never
/// business values.
pub const EXCLUDED_KEYS: [&str; 20] = [
    "best_guess_confidence",
    "best_guess_canonical_building",
    "canonical_building",
    "canonical_for_ds",
    "children",
    "confidence",
    "created",
    "extra_data",
    "extra_data_sources",
    "id",
    "is_master",
    "import_file",
    "import_file_name",
    "last_modified_by",
    "match_type",
    "modified",
    "model",
    "pk",
    "seed_org",
    "source_type",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProvenanceError {
    #[error("building {0} is not a source of this canonical building")]
    SourceNotFound(BuildingId),
    #[error("more than one source is marked as master: {0:?}")]
    SeveralMasters(Vec<BuildingId>),
}

/// Whether `key` names a business field that may be copied between records.
pub fn is_copyable_key(key: &str) -> bool {
    !key.ends_with("_source")
        && !key.contains("extra_data")
        && !key.contains("$$")
        && !EXCLUDED_KEYS.contains(&key)
}

/// Copies one field (or extra-data key) from `source` and records `source`
/// as its contributor. A field missing on the source is copied as null.
pub fn adopt_field(
    target: &mut BuildingRecord,
    source: &BuildingRecord,
    field: &str,
    is_extra: bool,
) {
    let value = source
        .value(field, is_extra)
        .cloned()
        .unwrap_or(Value::Null);
    let (values, sources) = slots(target, is_extra);
    values.insert(field.to_string(), value);
    sources.insert(field.to_string(), source.id);
}

/// Copies every non-null copyable field and every non-null extra-data key
/// from `source`. Returns the number of values copied.
fn copy_all(target: &mut BuildingRecord, source: &BuildingRecord) -> usize {
    let mut copied = 0;
    for (key, value) in &source.fields {
        if value.is_null() || !is_copyable_key(key) {
            continue;
        }
        target.fields.insert(key.clone(), value.clone());
        target.field_sources.insert(key.clone(), source.id);
        copied += 1;
    }
    for (key, value) in &source.extra_data {
        if value.is_null() {
            continue;
        }
        target.extra_data.insert(key.clone(), value.clone());
        target.extra_data_sources.insert(key.clone(), source.id);
        copied += 1;
    }
    copied
}

/// Extra-data keys with a non-null value on any record, first-seen order.
pub fn extra_data_keys<'a>(records: impl IntoIterator<Item = &'a BuildingRecord>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for (key, value) in &record.extra_data {
            if !value.is_null() && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

fn slots(
    record: &mut BuildingRecord,
    is_extra: bool,
) -> (&mut BTreeMap<String, Value>, &mut BTreeMap<String, BuildingId>) {
    if is_extra {
        (&mut record.extra_data, &mut record.extra_data_sources)
    } else {
        (&mut record.fields, &mut record.field_sources)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Checkpoint {
    target: BuildingRecord,
    masters: Vec<bool>,
}

/// A canonical building being edited together with its source records.
///
/// The session is the only place the target's field and source maps change,
/// and it keeps the at-most-one-master rule across the sources.
#[derive(Debug, Clone)]
pub struct ProvenanceSession {
    target: BuildingRecord,
    sources: Vec<BuildingRecord>,
    checkpoint: Option<Checkpoint>,
}

impl ProvenanceSession {
    /// Fails when more than one source is already marked as master.
    pub fn new(
        target: BuildingRecord,
        sources: Vec<BuildingRecord>,
    ) -> Result<Self, ProvenanceError> {
        let masters: Vec<BuildingId> = sources
            .iter()
            .filter(|s| s.is_master)
            .map(|s| s.id)
            .collect();
        if masters.len() > 1 {
            return Err(ProvenanceError::SeveralMasters(masters));
        }
        Ok(Self {
            target,
            sources,
            checkpoint: None,
        })
    }

    pub fn target(&self) -> &BuildingRecord {
        &self.target
    }

    pub fn sources(&self) -> &[BuildingRecord] {
        &self.sources
    }

    pub fn source(&self, id: BuildingId) -> Option<&BuildingRecord> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Current master source, if any.
    pub fn master(&self) -> Option<BuildingId> {
        self.sources.iter().find(|s| s.is_master).map(|s| s.id)
    }

    /// Makes `source_id` the default source for every value it has.
    pub fn adopt_all(&mut self, source_id: BuildingId) -> Result<usize, ProvenanceError> {
        let index = self.index_of(source_id)?;
        let copied = copy_all(&mut self.target, &self.sources[index]);
        for (i, source) in self.sources.iter_mut().enumerate() {
            source.is_master = i == index;
        }
        debug!(
            building = %self.target.id,
            source = %source_id,
            copied,
            "made source the default"
        );
        Ok(copied)
    }

    /// Takes one value from `source_id`.
    ///
    /// Picking a value from a non-master source means no single source is
    /// the default any more, so every master flag is cleared.
    pub fn adopt_field(
        &mut self,
        source_id: BuildingId,
        field: &str,
        is_extra: bool,
    ) -> Result<(), ProvenanceError> {
        let index = self.index_of(source_id)?;
        adopt_field(&mut self.target, &self.sources[index], field, is_extra);
        if !self.sources[index].is_master {
            self.clear_masters();
        }
        debug!(
            building = %self.target.id,
            source = %source_id,
            field,
            is_extra,
            "adopted field"
        );
        Ok(())
    }

    /// Records a hand-edited value: the canonical building becomes the
    /// contributor of `field` and no source stays master.
    pub fn set_self_as_source(&mut self, field: &str, is_extra: bool) {
        let id = self.target.id;
        let (_, sources) = slots(&mut self.target, is_extra);
        sources.insert(field.to_string(), id);
        self.clear_masters();
    }

    /// Sets a value by hand and marks the canonical building as its source.
    pub fn edit_field(&mut self, field: &str, value: Value, is_extra: bool) {
        let (values, _) = slots(&mut self.target, is_extra);
        values.insert(field.to_string(), value);
        self.set_self_as_source(field, is_extra);
    }

    /// Remembers the current state so an edit can be cancelled.
    pub fn checkpoint(&mut self) {
        self.checkpoint = Some(Checkpoint {
            target: self.target.clone(),
            masters: self.sources.iter().map(|s| s.is_master).collect(),
        });
    }

    /// Rolls back to the last checkpoint. Returns `false` without one.
    pub fn restore(&mut self) -> bool {
        let Some(checkpoint) = self.checkpoint.take() else {
            return false;
        };
        self.target = checkpoint.target;
        for (source, was_master) in self.sources.iter_mut().zip(checkpoint.masters) {
            source.is_master = was_master;
        }
        true
    }

    /// Union of extra-data keys over the target and every source.
    pub fn extra_data_keys(&self) -> Vec<String> {
        extra_data_keys(std::iter::once(&self.target).chain(self.sources.iter()))
    }

    fn index_of(&self, id: BuildingId) -> Result<usize, ProvenanceError> {
        self.sources
            .iter()
            .position(|s| s.id == id)
            .ok_or(ProvenanceError::SourceNotFound(id))
    }

    fn clear_masters(&mut self) {
        for source in &mut self.sources {
            source.is_master = false;
        }
    }
}
