//! Serializing record lists back into region text.

use cabbage_widgets::WidgetRecord;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

const REGION_INDENT: usize = 4;

/// Layout of the JSON written into a `<Cabbage>` region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    /// One object per line, `type` first.
    #[default]
    Compact,
    /// Multi-line pretty print.
    Expanded,
}

pub fn format_records(records: &[WidgetRecord], format: JsonFormat) -> String {
    match format {
        JsonFormat::Compact => compact(records),
        JsonFormat::Expanded => pretty(&array(records), REGION_INDENT),
    }
}

/// Layout for a linked external JSON file.
pub fn format_external(records: &[WidgetRecord], indent: usize) -> String {
    let mut text = pretty(&array(records), indent);
    text.push('\n');
    text
}

fn array(records: &[WidgetRecord]) -> Value {
    Value::Array(records.iter().map(WidgetRecord::to_value).collect())
}

fn compact(records: &[WidgetRecord]) -> String {
    if records.is_empty() {
        return "[]".to_string();
    }
    let indent = " ".repeat(REGION_INDENT);
    let lines: Vec<String> = records
        .iter()
        .map(|record| format!("{indent}{}", record.to_value()))
        .collect();
    format!("[\n{}\n]", lines.join(",\n"))
}

fn pretty(value: &Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}
