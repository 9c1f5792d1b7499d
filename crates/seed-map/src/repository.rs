//! Mapping repository for persisting and reusing committed mappings.
//!
//! Committed mapping lists are stored per organization and source type so
//! later uploads of the same kind can be suggested from them.
//!
//! One pretty-printed JSON file per pair, named
//! `org_{organization_id}_{source_type}.json`.
//!
//! Saving merges by raw source: a new entry for a header replaces the stored
//! one, and an ignored column removes whatever was stored for it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use seed_model::{ColumnMapping, MappingSource, OrgId, SourceType};

/// Directory of stored mapping lists.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    base_dir: PathBuf,
}

/// Summary of one stored mapping file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingMetadata {
    pub organization_id: OrgId,
    pub source_type: SourceType,
    pub file_path: PathBuf,
    pub mapping_count: usize,
    pub saved_at: Option<String>,
}

/// A stored mapping list with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMapping {
    pub organization_id: OrgId,
    pub source_type: SourceType,
    pub mappings: Vec<ColumnMapping>,
    /// RFC 3339 timestamp of the last save.
    pub saved_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn is_mapping_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("org_") && name.ends_with(".json"))
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredMapping {
    pub fn new(organization_id: OrgId, source_type: SourceType) -> Self {
        Self {
            organization_id,
            source_type,
            mappings: Vec::new(),
            saved_at: None,
            version: default_version(),
        }
    }

    /// Replaces entries with the same raw source; ignored columns drop theirs.
    pub fn merge(&mut self, mappings: &[ColumnMapping]) {
        for mapping in mappings {
            self.mappings.retain(|m| m.source != mapping.source);
            if mapping.field.is_some() {
                self.mappings.push(mapping.clone());
            }
        }
    }
}

impl MappingRepository {
    /// Opens the repository at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Merge a committed mapping list into the stored one and write it back.
    pub fn save(
        &self,
        organization_id: OrgId,
        source_type: SourceType,
        mappings: &[ColumnMapping],
    ) -> Result<PathBuf> {
        let mut stored = self
            .load(organization_id, source_type)?
            .unwrap_or_else(|| StoredMapping::new(organization_id, source_type));
        stored.merge(mappings);
        stored.saved_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        let path = self.path_for(organization_id, source_type);
        let json = serde_json::to_string_pretty(&stored)
            .with_context(|| format!("Failed to serialize mapping for {}", path.display()))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write mapping to {}", path.display()))?;
        debug!(
            path = %path.display(),
            mappings = stored.mappings.len(),
            "saved mapping"
        );
        Ok(path)
    }

    /// Stored mapping of an organization and source type, if any.
    pub fn load(
        &self,
        organization_id: OrgId,
        source_type: SourceType,
    ) -> Result<Option<StoredMapping>> {
        let path = self.path_for(organization_id, source_type);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read mapping from {}", path.display()))?;
        let stored: StoredMapping = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse mapping from {}", path.display()))?;
        Ok(Some(stored))
    }

    /// Header to field mappings saved before, as scoring input.
    ///
    /// Concatenated sources have no single header and are left out.
    pub fn previous_mapping(
        &self,
        organization_id: OrgId,
        source_type: SourceType,
    ) -> Result<BTreeMap<String, String>> {
        let Some(stored) = self.load(organization_id, source_type)? else {
            return Ok(BTreeMap::new());
        };
        Ok(stored
            .mappings
            .into_iter()
            .filter_map(|m| match (m.source, m.field) {
                (MappingSource::Header(header), Some(field)) => Some((header, field)),
                _ => None,
            })
            .collect())
    }

    /// Every stored mapping, ordered by organization then source type.
    ///
    /// Files that are not mapping files, or no longer parse, are skipped.
    pub fn list(&self) -> Result<Vec<MappingMetadata>> {
        let entries = fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read repository: {}", self.base_dir.display()))?;
        let mut metadata: Vec<MappingMetadata> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_mapping_file(path))
            .filter_map(|path| {
                let stored = fs::read_to_string(&path)
                    .ok()
                    .and_then(|json| serde_json::from_str::<StoredMapping>(&json).ok());
                if stored.is_none() {
                    warn!(path = %path.display(), "skipping unreadable mapping file");
                }
                stored.map(|stored| MappingMetadata {
                    organization_id: stored.organization_id,
                    source_type: stored.source_type,
                    mapping_count: stored.mappings.len(),
                    saved_at: stored.saved_at,
                    file_path: path,
                })
            })
            .collect();
        metadata.sort_by_key(|m| (m.organization_id, m.source_type.as_str()));
        Ok(metadata)
    }

    /// Removes a stored mapping. Returns `false` when there was none.
    pub fn delete(&self, organization_id: OrgId, source_type: SourceType) -> Result<bool> {
        let path = self.path_for(organization_id, source_type);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to delete mapping: {}", path.display())),
        }
    }

    pub fn exists(&self, organization_id: OrgId, source_type: SourceType) -> bool {
        self.path_for(organization_id, source_type).exists()
    }

    fn path_for(&self, organization_id: OrgId, source_type: SourceType) -> PathBuf {
        self.base_dir
            .join(format!("org_{}_{}.json", organization_id, source_type.as_str()))
    }
}
