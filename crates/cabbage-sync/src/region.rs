//! Locating and decoding the `<Cabbage>` region of a document.

use std::path::PathBuf;

use cabbage_widgets::WidgetRecord;
use serde_json::Value;
use text_size::{TextRange, TextSize};

use crate::error::SyncError;

pub const REGION_START: &str = "<Cabbage>";
pub const REGION_END: &str = "</Cabbage>";

const INCLUDE_DIRECTIVE: &str = "#include";

/// Byte range of the text between the region tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub content: TextRange,
}

impl Region {
    /// Find the first `<Cabbage>` tag and the `</Cabbage>` tag after it.
    pub fn find(text: &str) -> Result<Self, SyncError> {
        let start = text.find(REGION_START).ok_or(SyncError::MissingRegion)? + REGION_START.len();
        let end = text[start..]
            .find(REGION_END)
            .ok_or(SyncError::MissingRegion)?
            + start;
        Ok(Self {
            content: TextRange::new(text_size(start), text_size(end)),
        })
    }

    pub fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.content]
    }

    /// Replace the region content, keeping everything outside the tags.
    pub fn replace(&self, text: &str, formatted: &str) -> String {
        let start = usize::from(self.content.start());
        let end = usize::from(self.content.end());
        let mut result = String::with_capacity(text.len() + formatted.len());
        result.push_str(&text[..start]);
        result.push('\n');
        result.push_str(formatted);
        result.push('\n');
        result.push_str(&text[end..]);
        result
    }
}

pub(crate) fn text_size(offset: usize) -> TextSize {
    TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
}

/// Decoded region content.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionContent {
    /// Inline JSON array of records.
    Records(Vec<WidgetRecord>),
    /// `#include "path"` pointing at an external JSON file.
    Include(PathBuf),
}

impl RegionContent {
    pub fn parse(content: &str) -> Result<Self, SyncError> {
        match include_path(content) {
            Some(path) => Ok(Self::Include(PathBuf::from(path))),
            None => parse_records(content).map(Self::Records),
        }
    }

    pub fn has_form(&self) -> bool {
        match self {
            Self::Records(records) => records.iter().any(WidgetRecord::is_form),
            Self::Include(_) => false,
        }
    }
}

/// Decode a JSON array of widget records. Blank content is an empty list.
pub fn parse_records(json: &str) -> Result<Vec<WidgetRecord>, SyncError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(json).map_err(|error| SyncError::InvalidJson(error.to_string()))?;
    let Value::Array(items) = value else {
        return Err(SyncError::NotAnArray);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            WidgetRecord::from_value(item)
                .map_err(|source| SyncError::InvalidRecord { index, source })
        })
        .collect()
}

/// Path named by a region that holds nothing but an include directive.
fn include_path(content: &str) -> Option<&str> {
    let rest = content.trim().strip_prefix(INCLUDE_DIRECTIVE)?;
    let quoted = rest.trim_start().strip_prefix('"')?;
    let (path, tail) = quoted.split_once('"')?;
    (tail.trim().is_empty() && !path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabbage_widgets::{RecordError, WidgetKind};

    #[test]
    fn finds_content_between_tags() {
        let text = "<Cabbage>[]</Cabbage>\n<CsoundSynthesizer>";
        let region = Region::find(text).unwrap();
        assert_eq!(region.content(text), "[]");
        assert_eq!(region.content, TextRange::new(9.into(), 11.into()));
    }

    #[test]
    fn missing_tags_are_reported() {
        assert_eq!(Region::find("<CsInstruments>"), Err(SyncError::MissingRegion));
        assert_eq!(Region::find("<Cabbage>[]"), Err(SyncError::MissingRegion));
        assert_eq!(Region::find("</Cabbage><Cabbage>"), Err(SyncError::MissingRegion));
    }

    #[test]
    fn replace_keeps_surrounding_text() {
        let text = "before <Cabbage>  [ ]  </Cabbage> after";
        let region = Region::find(text).unwrap();
        assert_eq!(
            region.replace(text, "[]"),
            "before <Cabbage>\n[]\n</Cabbage> after"
        );
    }

    #[test]
    fn include_directive_is_recognized() {
        assert_eq!(
            RegionContent::parse("\n#include \"ui/panel.json\"\n").unwrap(),
            RegionContent::Include(PathBuf::from("ui/panel.json"))
        );
        assert_eq!(include_path("#include\"a.json\""), Some("a.json"));
        assert_eq!(include_path("#include \"\""), None);
        assert_eq!(include_path("#include \"a.json\" [1]"), None);
    }

    #[test]
    fn decodes_records_in_order() {
        let content = RegionContent::parse(
            r#"[{"type":"form","caption":"Synth"},{"type":"button","channel":"b1"}]"#,
        )
        .unwrap();
        assert!(content.has_form());
        let RegionContent::Records(records) = content else {
            panic!("expected inline records");
        };
        let kinds: Vec<_> = records.iter().map(|record| record.kind).collect();
        assert_eq!(kinds, vec![WidgetKind::Form, WidgetKind::Button]);
    }

    #[test]
    fn unrecognized_types_decode_as_opaque_records() {
        let records = parse_records(r#"[{"type":"form"},{"type":"dial","channel":"d","x":1}]"#).unwrap();
        assert_eq!(records[1].kind, WidgetKind::Unknown);
        assert_eq!(records[1].tag(), "dial");
        assert_eq!(records[1].get("x"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn rejects_malformed_content() {
        assert!(matches!(parse_records("[{"), Err(SyncError::InvalidJson(_))));
        assert_eq!(parse_records("{}"), Err(SyncError::NotAnArray));
        assert_eq!(
            parse_records(r#"[{"type":"form"},{"type":"button"}]"#),
            Err(SyncError::InvalidRecord {
                index: 1,
                source: RecordError::MissingChannel("button".into()),
            })
        );
        assert_eq!(parse_records("  \n"), Ok(Vec::new()));
    }
}
