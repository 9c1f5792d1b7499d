//! Collaborator interface of the reconciliation engine.
//!
//! Everything the engine needs from the outside world (storage, the
//! mapping and matching jobs, exports) goes through [`SeedBackend`]. The
//! transport behind it is not the engine's concern.

use std::collections::BTreeMap;

use async_trait::async_trait;
use seed_model::{
    BuildingId, BuildingPage, BuildingQuery, ColumnMapping, FieldSchema, FileId, JobKey,
    OrgContext, SuggestionTable, TransportError,
};
use seed_reconcile::MatchService;
use serde::{Deserialize, Serialize};

use crate::progress::ProgressSource;

/// Saved suggestions and the canonical schema for one import file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestedMappings {
    /// Header to `[field, confidence]`.
    pub suggestions: SuggestionTable,
    /// Field to wire type-tag.
    pub field_types: BTreeMap<String, String>,
    pub building_fields: Vec<String>,
}

impl SuggestedMappings {
    pub fn schema(&self) -> FieldSchema {
        FieldSchema::from_tags(self.building_fields.iter().cloned(), &self.field_types)
    }
}

/// Header row and the first data rows of an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSamples {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemapStatus {
    #[serde(alias = "success")]
    Ok,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapResponse {
    pub status: RemapStatus,
    #[serde(default)]
    pub progress_key: Option<JobKey>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xls,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xls => "xls",
        }
    }
}

/// Buildings to export and the file to produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub export_name: String,
    pub export_format: ExportFormat,
    /// Explicit selection, ignored when `select_all` is set.
    pub selected_buildings: Vec<BuildingId>,
    pub select_all: bool,
    /// Search the selection was made from.
    pub filters: BuildingQuery,
}

impl ExportRequest {
    /// File name with the extension of the export format, unless the
    /// operator already typed it.
    pub fn file_name(&self) -> String {
        let extension = self.export_format.extension();
        let name = self.export_name.trim();
        let name = if name.is_empty() { "export" } else { name };
        if name
            .to_ascii_lowercase()
            .ends_with(&format!(".{extension}"))
        {
            name.to_string()
        } else {
            format!("{name}.{extension}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTicket {
    pub export_id: String,
    pub total_buildings: u64,
}

/// All collaborator calls of the engine.
#[async_trait]
pub trait SeedBackend: ProgressSource + MatchService {
    async fn fetch_suggested_mappings(
        &self,
        ctx: &OrgContext,
        file_id: FileId,
    ) -> Result<SuggestedMappings, TransportError>;

    async fn fetch_column_samples(
        &self,
        ctx: &OrgContext,
        file_id: FileId,
    ) -> Result<ColumnSamples, TransportError>;

    async fn save_mappings(
        &self,
        ctx: &OrgContext,
        file_id: FileId,
        mappings: &[ColumnMapping],
    ) -> Result<(), TransportError>;

    async fn start_mapping(&self, ctx: &OrgContext, file_id: FileId)
    -> Result<JobKey, TransportError>;

    async fn remap(&self, ctx: &OrgContext, file_id: FileId)
    -> Result<RemapResponse, TransportError>;

    async fn start_system_matching(
        &self,
        ctx: &OrgContext,
        file_id: FileId,
    ) -> Result<JobKey, TransportError>;

    async fn fetch_buildings(
        &self,
        ctx: &OrgContext,
        query: &BuildingQuery,
    ) -> Result<BuildingPage, TransportError>;

    async fn start_export(
        &self,
        ctx: &OrgContext,
        request: &ExportRequest,
    ) -> Result<ExportTicket, TransportError>;

    /// Number of buildings written so far.
    async fn fetch_export_progress(&self, export_id: &str) -> Result<u64, TransportError>;

    /// Download location of a finished export.
    async fn fetch_export_download(&self, export_id: &str) -> Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_response_parses_wire_statuses() {
        let ok: RemapResponse =
            serde_json::from_str(r#"{"status":"success","progress_key":"remap:4"}"#)
                .expect("parse");
        assert_eq!(ok.status, RemapStatus::Ok);
        assert_eq!(ok.progress_key.map(|k| k.to_string()).as_deref(), Some("remap:4"));

        let warning: RemapResponse =
            serde_json::from_str(r#"{"status":"warning","message":"unmatched duplicates"}"#)
                .expect("parse");
        assert_eq!(warning.status, RemapStatus::Warning);
        assert_eq!(warning.progress_key, None);
    }

    #[test]
    fn export_file_name_gets_extension() {
        let mut request = ExportRequest {
            export_name: "May buildings".into(),
            ..ExportRequest::default()
        };
        assert_eq!(request.file_name(), "May buildings.csv");
        request.export_name = "report.XLS".into();
        request.export_format = ExportFormat::Xls;
        assert_eq!(request.file_name(), "report.XLS");
        request.export_name = "  ".into();
        assert_eq!(request.file_name(), "export.xls");
    }

    #[test]
    fn suggested_mappings_build_schema() {
        let payload: SuggestedMappings = serde_json::from_str(
            r#"{
                "suggestions": {"GFA": ["gross_floor_area", 90]},
                "field_types": {"gross_floor_area": "float", "city": "string", "pk": ""},
                "building_fields": ["gross_floor_area", "city", "pk"]
            }"#,
        )
        .expect("parse");
        let schema = payload.schema();
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(
            schema.field_type("gross_floor_area"),
            Some(seed_model::FieldType::Numeric)
        );
        assert_eq!(schema.field_type("pk"), None);
        assert_eq!(payload.suggestions["GFA"].confidence, 90.0);
    }
}
