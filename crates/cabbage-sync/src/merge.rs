//! Merging property updates into a record list by channel.

use cabbage_widgets::schema::{schema, BOUNDS_KEYS, RANGE_KEYS};
use cabbage_widgets::{RecordError, WidgetKind, WidgetRecord};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

/// Where a merged update landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// An existing record at this index was updated.
    Updated(usize),
    /// A new record was appended at this index.
    Appended(usize),
    /// A form update for a document without a form.
    Skipped,
}

impl MergeOutcome {
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Updated(index) | Self::Appended(index) => Some(index),
            Self::Skipped => None,
        }
    }
}

/// Merge one partial record into `records`.
///
/// The first record with the same channel is updated in place; later
/// duplicates are left untouched. Unknown channels are appended, except
/// forms. Records of an unrecognized type are never written to, and no
/// update may introduce one.
pub fn merge_update(
    records: &mut Vec<WidgetRecord>,
    mut update: Map<String, Value>,
) -> Result<MergeOutcome, RecordError> {
    let retype = match update.shift_remove("type") {
        Some(Value::String(tag)) => Some((tag.parse::<WidgetKind>()?, tag)),
        Some(_) => {
            return Err(RecordError::InvalidValue {
                key: "type".into(),
                expected: "a string",
            })
        }
        None => None,
    };
    let kind = retype.as_ref().map(|(kind, _)| *kind);
    let channel = match update.shift_remove("channel") {
        Some(Value::String(channel)) => channel,
        Some(_) => {
            return Err(RecordError::InvalidValue {
                key: "channel".into(),
                expected: "a string",
            })
        }
        None => match kind {
            Some(WidgetKind::Form) => schema(WidgetKind::Form).default_channel.to_string(),
            Some(kind) => return Err(RecordError::MissingChannel(kind.as_str().into())),
            None => return Err(RecordError::MissingChannel("unknown".into())),
        },
    };

    if let Some(index) = records.iter().position(|record| record.channel == channel) {
        let existing = &mut records[index];
        if existing.is_unknown() {
            return Err(RecordError::UnknownType(existing.tag().into()));
        }
        if let Some((kind, tag)) = &retype {
            existing.retag(*kind, tag);
        }
        for (key, value) in update {
            merge_property(&mut existing.properties, key, value);
        }
        existing.strip_defaults();
        existing.sort_properties();
        return Ok(MergeOutcome::Updated(index));
    }

    match kind {
        Some(WidgetKind::Form) => {
            debug!("ignoring form update for a document without a form");
            Ok(MergeOutcome::Skipped)
        }
        Some(kind) => {
            let mut record = WidgetRecord::new(kind, channel);
            if let Some((_, tag)) = &retype {
                record.retag(kind, tag);
            }
            record.properties = update.into_iter().collect();
            record.collapse_groups();
            record.strip_defaults();
            record.sort_properties();
            records.push(record);
            Ok(MergeOutcome::Appended(records.len() - 1))
        }
        None => Err(RecordError::MissingType),
    }
}

/// Shallow merge of one key. Flat geometry and range keys are written into
/// an existing `bounds`/`range` group; a whole group replaces its flat keys.
fn merge_property(properties: &mut IndexMap<String, Value>, key: String, value: Value) {
    for (group, keys) in [("bounds", &BOUNDS_KEYS[..]), ("range", &RANGE_KEYS[..])] {
        if key == group {
            for flat in keys {
                properties.shift_remove(*flat);
            }
            break;
        }
        let Some(slot) = keys.iter().position(|flat| *flat == key) else {
            continue;
        };
        // a top-level value beside a range group stays top-level
        if key == "value" && properties.contains_key("value") {
            break;
        }
        match properties.get_mut(group) {
            Some(Value::Array(values)) if slot < values.len() => {
                values[slot] = value;
                return;
            }
            Some(Value::Object(values)) => {
                values.insert(key, value);
                return;
            }
            _ => break,
        }
    }
    properties.insert(key, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Value) -> Vec<WidgetRecord> {
        serde_json::from_value(values).unwrap()
    }

    fn update(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("update must be an object"),
        }
    }

    fn render(records: &[WidgetRecord]) -> String {
        serde_json::to_string(records).unwrap()
    }

    #[test]
    fn known_channel_updates_in_place() {
        let mut list = records(json!([
            {"type": "form"},
            {"type": "rotarySlider", "channel": "rslider3", "colour": "#ff0000"},
            {"type": "button", "channel": "b1"}
        ]));
        let outcome = merge_update(&mut list, update(json!({"channel": "rslider3", "value": 0.5})));
        assert_eq!(outcome, Ok(MergeOutcome::Updated(1)));
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].get("value"), Some(&json!(0.5)));
        assert_eq!(list[1].get("colour"), Some(&json!("#ff0000")));
        assert_eq!(list[2].properties.len(), 0);
    }

    #[test]
    fn unknown_channel_appends_with_collapsed_groups() {
        let mut list = records(json!([{"type": "form"}]));
        let outcome = merge_update(
            &mut list,
            update(json!({
                "type": "button", "channel": "new1",
                "left": 1, "top": 2, "width": 3, "height": 4,
                "colourOn": "#ff0000", "corners": 2
            })),
        );
        assert_eq!(outcome, Ok(MergeOutcome::Appended(1)));
        assert_eq!(
            render(&list[1..]),
            r##"[{"type":"button","channel":"new1","bounds":[1,2,3,4],"colourOn":"#ff0000"}]"##
        );
    }

    #[test]
    fn defaults_are_suppressed_but_type_and_channel_stay() {
        let mut list = records(json!([{"type": "checkBox", "channel": "c", "corners": 10}]));
        merge_update(&mut list, update(json!({"channel": "c", "corners": 2}))).unwrap();
        assert_eq!(render(&list), r#"[{"type":"checkBox","channel":"c"}]"#);
    }

    #[test]
    fn flat_keys_fill_existing_groups() {
        let mut list = records(json!([{
            "type": "rotarySlider", "channel": "gain",
            "bounds": [10, 10, 60, 60], "range": [0, 1, 0, 1, 0.01]
        }]));
        merge_update(
            &mut list,
            update(json!({"channel": "gain", "left": 25, "top": 40, "value": 0.5})),
        )
        .unwrap();
        assert_eq!(
            render(&list),
            r#"[{"type":"rotarySlider","channel":"gain","bounds":[25,40,60,60],"range":[0,1,0.5,1,0.01]}]"#
        );
    }

    #[test]
    fn whole_group_replaces_flat_keys() {
        let mut list = records(json!([{
            "type": "label", "channel": "l", "left": 5, "top": 6, "width": 7, "height": 8, "text": "Hi"
        }]));
        merge_update(
            &mut list,
            update(json!({"channel": "l", "bounds": {"left": 1, "top": 2, "width": 3, "height": 4}})),
        )
        .unwrap();
        assert_eq!(
            render(&list),
            r#"[{"type":"label","channel":"l","bounds":{"left":1,"top":2,"width":3,"height":4},"text":"Hi"}]"#
        );
    }

    #[test]
    fn first_duplicate_wins() {
        let mut list = records(json!([
            {"type": "button", "channel": "dup", "text": "a"},
            {"type": "button", "channel": "dup", "text": "b"}
        ]));
        merge_update(&mut list, update(json!({"channel": "dup", "text": "c"}))).unwrap();
        assert_eq!(list[0].text("text"), "c");
        assert_eq!(list[1].text("text"), "b");
    }

    #[test]
    fn forms_are_never_appended() {
        let mut list = records(json!([{"type": "button", "channel": "b1"}]));
        let outcome = merge_update(&mut list, update(json!({"type": "form", "caption": "X"})));
        assert_eq!(outcome, Ok(MergeOutcome::Skipped));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn invalid_updates_are_rejected() {
        let mut list = records(json!([]));
        assert_eq!(
            merge_update(&mut list, update(json!({"type": "xyPad", "channel": "xy"}))),
            Err(RecordError::UnknownType("xyPad".into()))
        );
        assert_eq!(
            merge_update(&mut list, update(json!({"channel": "nobody"}))),
            Err(RecordError::MissingType)
        );
        assert_eq!(
            merge_update(&mut list, update(json!({"type": "button"}))),
            Err(RecordError::MissingChannel("button".into()))
        );
        assert!(list.is_empty());
    }

    #[test]
    fn unknown_records_pass_through_but_refuse_updates() {
        let mut list = records(json!([
            {"type": "form"},
            {"type": "xyPad", "channel": "xy", "rangeX": [0, 1, 0]},
            {"type": "button", "channel": "b1"}
        ]));
        assert_eq!(
            merge_update(&mut list, update(json!({"channel": "b1", "text": "Go"}))),
            Ok(MergeOutcome::Updated(2))
        );
        assert_eq!(
            merge_update(&mut list, update(json!({"channel": "xy", "left": 4}))),
            Err(RecordError::UnknownType("xyPad".into()))
        );
        assert_eq!(
            render(&list[1..]),
            r#"[{"type":"xyPad","channel":"xy","rangeX":[0,1,0]},{"type":"button","channel":"b1","text":"Go"}]"#
        );
    }

    #[test]
    fn legacy_tags_survive_merges_elsewhere() {
        let mut list = records(json!([
            {"type": "rslider", "channel": "a"},
            {"type": "button", "channel": "b1"}
        ]));
        merge_update(&mut list, update(json!({"channel": "b1", "text": "Go"}))).unwrap();
        merge_update(&mut list, update(json!({"channel": "a", "value": 0.5}))).unwrap();
        assert_eq!(
            render(&list),
            r#"[{"type":"rslider","channel":"a","value":0.5},{"type":"button","channel":"b1","text":"Go"}]"#
        );
    }

    #[test]
    fn update_keeps_key_order_when_type_is_last() {
        let mut list = records(json!([{"type": "label", "channel": "l"}]));
        merge_update(
            &mut list,
            update(json!({"channel": "l", "text": "Hi", "fontSize": 12, "align": "left", "type": "label"})),
        )
        .unwrap();
        let keys: Vec<_> = list[0].properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["text", "fontSize", "align"]);
    }

    #[test]
    fn type_change_applies_new_defaults() {
        let mut list = records(json!([{"type": "button", "channel": "x", "corners": 2}]));
        merge_update(&mut list, update(json!({"channel": "x", "type": "checkBox"}))).unwrap();
        assert_eq!(list[0].kind, WidgetKind::CheckBox);
        assert!(list[0].get("corners").is_none());
    }
}
