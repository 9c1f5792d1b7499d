//! Building records with field-level provenance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::BuildingId;

/// A building record: either a canonical building or one of its sources.
///
/// `field_sources` and `extra_data_sources` record which source record
/// contributed the current value of each field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub id: BuildingId,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub field_sources: BTreeMap<String, BuildingId>,
    #[serde(default)]
    pub extra_data: BTreeMap<String, Value>,
    #[serde(default)]
    pub extra_data_sources: BTreeMap<String, BuildingId>,
    #[serde(default)]
    pub is_master: bool,
}

impl BuildingRecord {
    pub fn new(id: BuildingId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }

    /// Value of a fixed-schema field or an extra-data key.
    pub fn value(&self, key: &str, is_extra: bool) -> Option<&Value> {
        if is_extra {
            self.extra_data.get(key)
        } else {
            self.fields.get(key)
        }
    }

    /// Record that contributed the current value of a field or extra-data key.
    pub fn source_of(&self, key: &str, is_extra: bool) -> Option<BuildingId> {
        if is_extra {
            self.extra_data_sources.get(key).copied()
        } else {
            self.field_sources.get(key).copied()
        }
    }
}
