use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;

use seed_map::MappingSession;
use seed_model::{BuildingId, BuildingRecord, ConfidenceLevel, FieldSchema, RawColumn, Validity};
use seed_reconcile::ProvenanceSession;

use seed_cli::commands::MapOutcome;

pub fn print_fields(schema: &FieldSchema) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Type")]);
    apply_table_style(&mut table);
    for field in &schema.fields {
        let type_cell = match schema.field_type(field) {
            Some(field_type) => Cell::new(field_type.as_tag()),
            None => dim_cell("-"),
        };
        table.add_row(vec![Cell::new(field), type_cell]);
    }
    println!("{table}");
}

pub fn print_mapping(outcome: &MapOutcome) {
    let session = &outcome.session;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Header"),
        header_cell("Field"),
        header_cell("Confidence"),
        header_cell("Validity"),
        header_cell("Flags"),
    ]);
    apply_mapping_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Center);
    for column in session.columns() {
        if column.is_concat_parameter {
            continue;
        }
        table.add_row(vec![
            dim_cell(column.row_index),
            Cell::new(&column.name),
            field_cell(column),
            confidence_cell(session, column),
            validity_cell(column.validity),
            dim_cell(flags(column)),
        ]);
    }
    println!("{table}");

    let summary = session.summary();
    println!(
        "{} columns: {} mapped, {} ignored, {} merged, {} invalid, {} partially valid",
        summary.total,
        summary.mapped,
        summary.ignored,
        summary.merged,
        summary.invalid,
        summary.semivalid
    );
    if let Some(path) = &outcome.saved_to {
        println!("Saved mapping: {}", path.display());
    }
    if outcome.committed.is_none() {
        eprintln!(
            "Fields mapped by more than one column: {}",
            session.conflicting_fields().join(", ")
        );
        eprintln!("Resolve the duplicates with --set to continue.");
    }
}

pub fn print_provenance(session: &ProvenanceSession) {
    let target = session.target();
    println!("Building: {}", target.id);
    if let Some(master) = session.master() {
        println!("Default source: {master}");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Value"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut table);
    for (field, value) in &target.fields {
        table.add_row(vec![
            Cell::new(field),
            value_cell(value),
            source_cell(target, target.source_of(field, false)),
        ]);
    }
    for key in session.extra_data_keys() {
        let value = target.value(&key, true).unwrap_or(&Value::Null);
        table.add_row(vec![
            Cell::new(&key).fg(Color::DarkCyan),
            value_cell(value),
            source_cell(target, target.source_of(&key, true)),
        ]);
    }
    println!("{table}");
}

fn field_cell(column: &RawColumn) -> Cell {
    match column.target() {
        Some(field) if column.is_duplicate => Cell::new(field)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Some(field) if column.is_extra_data => Cell::new(field).fg(Color::DarkCyan),
        Some(field) => Cell::new(field),
        None => dim_cell("(ignored)"),
    }
}

fn confidence_cell(session: &MappingSession, column: &RawColumn) -> Cell {
    match column.confidence_level(session.thresholds()) {
        Some(level) => {
            let color = match level {
                ConfidenceLevel::High => Color::Green,
                ConfidenceLevel::Medium => Color::Yellow,
                ConfidenceLevel::Low => Color::Red,
            };
            Cell::new(level.label()).fg(color)
        }
        None => dim_cell("-"),
    }
}

fn validity_cell(validity: Validity) -> Cell {
    match validity {
        Validity::Unset => dim_cell("-"),
        Validity::Valid => Cell::new(validity.as_str()).fg(Color::Green),
        Validity::Semivalid => Cell::new(validity.as_str()).fg(Color::Yellow),
        Validity::Invalid => Cell::new(validity.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn flags(column: &RawColumn) -> String {
    let mut flags = Vec::new();
    if column.is_duplicate {
        flags.push("duplicate");
    }
    if column.is_concatenated {
        flags.push("merged");
    }
    if column.is_extra_data {
        flags.push("extra");
    }
    if column.user_suggestion {
        flags.push("edited");
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(", ")
    }
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => dim_cell("null"),
        Value::String(text) => Cell::new(text),
        other => Cell::new(other),
    }
}

fn source_cell(target: &BuildingRecord, source: Option<BuildingId>) -> Cell {
    match source {
        Some(id) if id == target.id => Cell::new("edited").fg(Color::Magenta),
        Some(id) => Cell::new(id),
        None => dim_cell("-"),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_mapping_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
