//! Canonical building schema and declared field types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Numeric,
    String,
    Date,
    /// Categorical value rendered as a fixed alert popover.
    Popover,
}

impl FieldType {
    /// Parse a wire type-tag.
    ///
    /// Returns `None` for empty or unknown tags, meaning no target type is
    /// declared and nothing is considered invalid.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" | "float" | "integer" | "decimal" => Some(Self::Numeric),
            "string" | "char" | "text" => Some(Self::String),
            "date" | "datetime" => Some(Self::Date),
            "popover" => Some(Self::Popover),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Date => "date",
            Self::Popover => "popover",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Canonical fields a raw column can be mapped to, with their types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Ordered list of mappable building fields.
    pub fields: Vec<String>,
    /// Declared type per field. Fields without a known type are absent.
    pub types: BTreeMap<String, FieldType>,
}

const STANDARD_FIELDS: &[(&str, Option<FieldType>)] = &[
    ("tax_lot_id", Some(FieldType::String)),
    ("pm_property_id", Some(FieldType::String)),
    ("custom_id_1", Some(FieldType::String)),
    ("lot_number", Some(FieldType::String)),
    ("block_number", Some(FieldType::String)),
    ("district", Some(FieldType::String)),
    ("property_name", Some(FieldType::String)),
    ("property_notes", Some(FieldType::String)),
    ("use_description", Some(FieldType::String)),
    ("address_line_1", Some(FieldType::String)),
    ("address_line_2", Some(FieldType::String)),
    ("city", Some(FieldType::String)),
    ("state_province", Some(FieldType::String)),
    ("postal_code", Some(FieldType::String)),
    ("year_built", Some(FieldType::Numeric)),
    ("building_count", Some(FieldType::Numeric)),
    ("gross_floor_area", Some(FieldType::Numeric)),
    ("conditioned_floor_area", Some(FieldType::Numeric)),
    ("occupied_floor_area", Some(FieldType::Numeric)),
    ("site_eui", Some(FieldType::Numeric)),
    ("site_eui_weather_normalized", Some(FieldType::Numeric)),
    ("source_eui", Some(FieldType::Numeric)),
    ("source_eui_weather_normalized", Some(FieldType::Numeric)),
    ("energy_score", Some(FieldType::Numeric)),
    ("energy_alerts", Some(FieldType::Popover)),
    ("space_alerts", Some(FieldType::Popover)),
    ("building_certification", Some(FieldType::String)),
    ("generation_date", Some(FieldType::Date)),
    ("release_date", Some(FieldType::Date)),
    ("year_ending", Some(FieldType::Date)),
    ("recent_sale_date", Some(FieldType::Date)),
    ("owner", Some(FieldType::String)),
    ("owner_email", Some(FieldType::String)),
    ("owner_telephone", Some(FieldType::String)),
    ("owner_address", Some(FieldType::String)),
    ("owner_city_state", Some(FieldType::String)),
    ("owner_postal_code", Some(FieldType::String)),
    ("complied_with_benchmarking", None),
];

impl FieldSchema {
    /// Build a schema from wire type-tags (`field -> tag`).
    ///
    /// `fields` keeps the collaborator's ordering; tags that do not parse
    /// leave the field untyped.
    pub fn from_tags<'a>(
        fields: impl IntoIterator<Item = String>,
        tags: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        let types = tags
            .into_iter()
            .filter_map(|(field, tag)| FieldType::from_tag(tag).map(|t| (field.clone(), t)))
            .collect();
        Self {
            fields: fields.into_iter().collect(),
            types,
        }
    }

    /// The canonical building schema shipped with the application.
    pub fn standard() -> Self {
        let mut fields = Vec::with_capacity(STANDARD_FIELDS.len());
        let mut types = BTreeMap::new();
        for (name, field_type) in STANDARD_FIELDS {
            fields.push((*name).to_string());
            if let Some(field_type) = field_type {
                types.insert((*name).to_string(), *field_type);
            }
        }
        Self { fields, types }
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.types.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}
