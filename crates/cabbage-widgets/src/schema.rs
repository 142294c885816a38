//! Per-kind default properties and editor property sections.
//!
//! Defaults use the flattened key layout (`left`, `top`, `min`, `value`, ...).
//! The document engine compares record keys against these tables to drop
//! values equal to their default before writing.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::kind::WidgetKind;

/// Geometry keys grouped under `bounds`.
pub const BOUNDS_KEYS: [&str; 4] = ["left", "top", "width", "height"];

/// Range keys grouped under `range`.
pub const RANGE_KEYS: [&str; 5] = ["min", "max", "value", "skew", "increment"];

/// Named group of properties shown together in a property editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySection {
    pub title: &'static str,
    pub keys: Vec<&'static str>,
}

/// Immutable schema for one widget kind.
#[derive(Debug, Clone)]
pub struct WidgetSchema {
    pub kind: WidgetKind,
    /// Channel a freshly added widget is named after.
    pub default_channel: &'static str,
    defaults: IndexMap<String, Value>,
    sections: Vec<PropertySection>,
}

impl WidgetSchema {
    /// Default values keyed by property name. Never contains `type` or `channel`.
    pub fn defaults(&self) -> &IndexMap<String, Value> {
        &self.defaults
    }

    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    pub fn sections(&self) -> &[PropertySection] {
        &self.sections
    }

    /// Numeric default for `key`, if the schema declares one.
    pub fn default_f64(&self, key: &str) -> Option<f64> {
        self.defaults.get(key).and_then(Value::as_f64)
    }
}

/// Schema for `kind`.
pub fn schema(kind: WidgetKind) -> &'static WidgetSchema {
    &SCHEMAS[kind_index(kind)]
}

// `Unknown` sits after every listed kind
fn kind_index(kind: WidgetKind) -> usize {
    WidgetKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or(WidgetKind::ALL.len())
}

static SCHEMAS: Lazy<Vec<WidgetSchema>> = Lazy::new(|| {
    WidgetKind::ALL
        .iter()
        .copied()
        .chain([WidgetKind::Unknown])
        .map(build)
        .collect()
});

fn build(kind: WidgetKind) -> WidgetSchema {
    let (default_channel, defaults) = defaults_for(kind);
    let defaults = match defaults {
        Value::Object(map) => map.into_iter().collect(),
        _ => IndexMap::new(),
    };
    WidgetSchema {
        kind,
        default_channel,
        defaults,
        sections: sections_for(kind),
    }
}

fn section(title: &'static str, keys: &[&'static str]) -> PropertySection {
    PropertySection {
        title,
        keys: keys.to_vec(),
    }
}

fn sections_for(kind: WidgetKind) -> Vec<PropertySection> {
    let properties = section("Properties", &["type", "channel"]);
    let bounds = section("Bounds", &BOUNDS_KEYS);
    let range = section("Range", &RANGE_KEYS);
    let text = section(
        "Text",
        &["text", "fontColour", "fontSize", "fontFamily", "align"],
    );
    match kind {
        WidgetKind::RotarySlider
        | WidgetKind::HorizontalSlider
        | WidgetKind::VerticalSlider => vec![
            properties,
            bounds,
            range,
            section(
                "Text",
                &[
                    "text",
                    "fontColour",
                    "fontSize",
                    "fontFamily",
                    "align",
                    "valuePrefix",
                    "valuePostfix",
                ],
            ),
            section(
                "Colours",
                &[
                    "colour",
                    "trackerColour",
                    "trackerBackgroundColour",
                    "trackerOutlineColour",
                    "outlineColour",
                    "textBoxColour",
                ],
            ),
        ],
        WidgetKind::HorizontalRangeSlider => vec![
            properties,
            bounds,
            section(
                "Range",
                &["min", "max", "minValue", "maxValue", "skew", "increment"],
            ),
            text,
            section("Colours", &["colour", "trackerColour", "trackerBackgroundColour"]),
        ],
        WidgetKind::NumberSlider => vec![
            properties,
            bounds,
            range,
            text,
            section("Colours", &["colour", "outlineColour"]),
        ],
        WidgetKind::Button | WidgetKind::FileButton | WidgetKind::OptionButton => vec![
            properties,
            bounds,
            section(
                "Text",
                &["text", "textOff", "fontFamily", "fontSize", "align"],
            ),
            section(
                "Colours",
                &[
                    "colourOn",
                    "colourOff",
                    "fontColourOn",
                    "fontColourOff",
                    "outlineColour",
                ],
            ),
        ],
        WidgetKind::CheckBox => vec![
            properties,
            bounds,
            text,
            section("Colours", &["colourOn", "colourOff", "outlineColour"]),
        ],
        WidgetKind::ComboBox | WidgetKind::ListBox => vec![
            properties,
            bounds,
            section("Items", &["items", "channelType"]),
            text,
            section("Colours", &["colour", "backgroundColour", "outlineColour"]),
        ],
        WidgetKind::MidiKeyboard => vec![
            properties,
            bounds,
            section("Keys", &["value", "octaves"]),
            section(
                "Colours",
                &[
                    "whiteNoteColour",
                    "blackNoteColour",
                    "keydownColour",
                    "outlineColour",
                ],
            ),
        ],
        WidgetKind::GenTable => vec![
            properties,
            bounds,
            section("Table", &["tableNumber", "startSample", "endSample", "file"]),
            section("Colours", &["colour", "backgroundColour", "outlineColour"]),
        ],
        WidgetKind::Form => vec![
            section("Properties", &["type", "caption"]),
            section("Size", &["width", "height"]),
            section("Colours", &["colour"]),
        ],
        WidgetKind::Label
        | WidgetKind::GroupBox
        | WidgetKind::Image
        | WidgetKind::CsoundOutput
        | WidgetKind::TextEditor => vec![
            properties,
            bounds,
            text,
            section("Colours", &["colour", "outlineColour"]),
        ],
        WidgetKind::Unknown => vec![properties, bounds],
    }
}

fn slider_defaults(width: u32, height: u32) -> Value {
    json!({
        "left": 10,
        "top": 10,
        "width": width,
        "height": height,
        "min": 0,
        "max": 1,
        "value": 0,
        "skew": 1,
        "increment": 0.001,
        "text": "",
        "fontFamily": "Verdana",
        "fontSize": 0,
        "fontColour": "#dddddd",
        "align": "centre",
        "valueTextBox": 0,
        "colour": "#0295cf",
        "trackerColour": "#93d200",
        "trackerBackgroundColour": "#ffffff",
        "trackerOutlineColour": "#525252",
        "outlineColour": "#525252",
        "textBoxColour": "#555555",
        "trackerOutlineWidth": 3,
        "trackerWidth": 20,
        "outlineWidth": 2,
        "decimalPlaces": 1,
        "velocity": 0,
        "popup": 1,
        "visible": 1,
        "automatable": 1,
        "valuePrefix": "",
        "valuePostfix": "",
        "presetIgnore": 0
    })
}

fn defaults_for(kind: WidgetKind) -> (&'static str, Value) {
    match kind {
        WidgetKind::RotarySlider => ("rslider", slider_defaults(60, 60)),
        WidgetKind::HorizontalSlider => ("hslider", slider_defaults(160, 20)),
        WidgetKind::VerticalSlider => ("vslider", slider_defaults(20, 160)),
        WidgetKind::NumberSlider => (
            "nslider",
            json!({
                "left": 10,
                "top": 10,
                "width": 60,
                "height": 60,
                "min": 0,
                "max": 1,
                "value": 0,
                "skew": 1,
                "increment": 0.001,
                "text": "",
                "fontFamily": "Verdana",
                "fontSize": 0,
                "fontColour": "#dddddd",
                "align": "centre",
                "colour": "#93d200",
                "outlineColour": "#525252",
                "outlineWidth": 2,
                "velocity": 0,
                "popup": 1,
                "visible": 1,
                "automatable": 1,
                "valuePrefix": "",
                "valuePostfix": "",
                "presetIgnore": 0
            }),
        ),
        WidgetKind::HorizontalRangeSlider => (
            "hrange",
            json!({
                "left": 10,
                "top": 10,
                "width": 160,
                "height": 40,
                "min": 0,
                "max": 1,
                "minValue": 0,
                "maxValue": 1,
                "skew": 1,
                "increment": 0.001,
                "text": "",
                "fontFamily": "Verdana",
                "fontSize": 0,
                "fontColour": "#dddddd",
                "colour": "#0295cf",
                "trackerColour": "#93d200",
                "trackerBackgroundColour": "#ffffff",
                "thumbWidth": 8,
                "popup": 1,
                "visible": 1,
                "automatable": 1,
                "presetIgnore": 0
            }),
        ),
        WidgetKind::Button => ("button", button_defaults("On", "Off", 1)),
        WidgetKind::FileButton => ("filebutton", button_defaults("Choose File", "Choose File", 0)),
        WidgetKind::OptionButton => {
            let mut defaults = button_defaults("One", "One", 1);
            if let Value::Object(map) = &mut defaults {
                map.insert("items".into(), json!("One, Two, Three"));
                map.insert("max".into(), json!(3));
            }
            ("optionbutton", defaults)
        }
        WidgetKind::CheckBox => (
            "checkbox",
            json!({
                "left": 10,
                "top": 10,
                "width": 100,
                "height": 30,
                "corners": 2,
                "min": 0,
                "max": 1,
                "value": 0,
                "text": "On/Off",
                "fontFamily": "Verdana",
                "fontColour": "#dddddd",
                "fontSize": 0,
                "align": "left",
                "colourOn": "#93d200",
                "colourOff": "#ffffff",
                "outlineColour": "#999999",
                "outlineWidth": 1,
                "visible": 1,
                "automatable": 1,
                "presetIgnore": 0
            }),
        ),
        WidgetKind::ComboBox => (
            "combobox",
            json!({
                "left": 10,
                "top": 10,
                "width": 100,
                "height": 30,
                "corners": 2,
                "fontFamily": "Verdana",
                "fontSize": 14,
                "align": "center",
                "colour": "#0295cf",
                "items": "One, Two, Three",
                "fontColour": "#dddddd",
                "outlineColour": "#dddddd",
                "outlineWidth": 0,
                "min": 0,
                "max": 3,
                "value": 0,
                "visible": 1,
                "automatable": 1,
                "active": 1,
                "channelType": "number",
                "presetIgnore": 0
            }),
        ),
        WidgetKind::ListBox => (
            "listbox",
            json!({
                "left": 0,
                "top": 0,
                "width": 200,
                "height": 300,
                "backgroundColour": "#ffffff",
                "fontColour": "#000000",
                "highlightedItemColour": "#dddddd",
                "items": "item1, item2, item3",
                "selectedIndex": -1,
                "min": 0,
                "max": 3,
                "visible": 1,
                "automatable": 1,
                "channelType": "number",
                "presetIgnore": 0
            }),
        ),
        WidgetKind::Label => (
            "label",
            json!({
                "left": 0,
                "top": 0,
                "width": 100,
                "height": 30,
                "colour": "#88888800",
                "fontColour": "#dddddd",
                "fontFamily": "Verdana",
                "fontSize": 0,
                "corners": 4,
                "align": "centre",
                "text": "Default Label",
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::GroupBox => (
            "groupbox",
            json!({
                "left": 0,
                "top": 0,
                "width": 100,
                "height": 30,
                "text": "Hello",
                "fontFamily": "Verdana",
                "fontSize": 0,
                "align": "centre",
                "fontColour": "#dddddd",
                "colour": "#888888",
                "outlineColour": "#000000",
                "outlineWidth": 1,
                "corners": 4,
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::Image => (
            "image",
            json!({
                "left": 0,
                "top": 0,
                "width": 100,
                "height": 30,
                "colour": "#888888",
                "outlineWidth": 1,
                "outlineColour": "#000000",
                "corners": 4,
                "file": "",
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::CsoundOutput => (
            "csoundoutput",
            json!({
                "left": 0,
                "top": 0,
                "width": 200,
                "height": 300,
                "colour": "#000000",
                "fontColour": "#dddddd",
                "fontFamily": "Verdana",
                "fontSize": 14,
                "align": "left",
                "corners": 4,
                "text": "Csound Output\n",
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::TextEditor => (
            "texteditor",
            json!({
                "left": 0,
                "top": 0,
                "width": 200,
                "height": 300,
                "colour": "#dddddd",
                "fontColour": "#222222",
                "fontFamily": "Verdana",
                "fontSize": 14,
                "align": "left",
                "corners": 4,
                "text": "",
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::MidiKeyboard => (
            "keyboard",
            json!({
                "left": 10,
                "top": 10,
                "width": 600,
                "height": 100,
                "value": 36,
                "octaves": 5,
                "blackNoteColour": "#000000",
                "whiteNoteColour": "#ffffff",
                "keydownColour": "#93d200",
                "outlineColour": "#434343",
                "fontFamily": "Verdana",
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::GenTable => (
            "gentable",
            json!({
                "left": 0,
                "top": 0,
                "width": 200,
                "height": 100,
                "colour": "#888888",
                "outlineColour": "#dddddd",
                "outlineWidth": 1,
                "backgroundColour": "#a8d388",
                "fontColour": "#dddddd",
                "fontFamily": "Verdana",
                "fontSize": 0,
                "tableNumber": 1,
                "startSample": -1,
                "endSample": -1,
                "file": "",
                "samples": [],
                "visible": 1,
                "automatable": 0
            }),
        ),
        WidgetKind::Form => (
            "MainForm",
            json!({
                "width": 600,
                "height": 300,
                "caption": "",
                "colour": "#888888"
            }),
        ),
        // no defaults, so nothing is ever stripped from an unrecognized record
        WidgetKind::Unknown => ("widget", json!({})),
    }
}

fn button_defaults(text_on: &str, text_off: &str, automatable: u8) -> Value {
    json!({
        "left": 10,
        "top": 10,
        "width": 80,
        "height": 30,
        "corners": 2,
        "min": 0,
        "max": 1,
        "value": 0,
        "text": text_on,
        "textOff": text_off,
        "fontFamily": "Verdana",
        "fontSize": 0,
        "align": "centre",
        "colourOn": "#0295cf",
        "colourOff": "#0295cf",
        "fontColourOn": "#dddddd",
        "fontColourOff": "#dddddd",
        "outlineColour": "#dddddd",
        "outlineWidth": 2,
        "visible": 1,
        "automatable": automatable,
        "presetIgnore": 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_schema_without_identity_keys() {
        for kind in WidgetKind::ALL {
            let schema = schema(kind);
            assert_eq!(schema.kind, kind);
            assert!(!schema.defaults().contains_key("type"), "{kind}");
            assert!(!schema.defaults().contains_key("channel"), "{kind}");
            assert!(!schema.default_channel.is_empty(), "{kind}");
        }
    }

    #[test]
    fn unknown_kind_has_an_empty_schema() {
        let schema = schema(WidgetKind::Unknown);
        assert_eq!(schema.kind, WidgetKind::Unknown);
        assert!(schema.defaults().is_empty());
        assert_eq!(super::schema(WidgetKind::RotarySlider).kind, WidgetKind::RotarySlider);
    }

    #[test]
    fn file_button_is_never_automatable() {
        let schema = schema(WidgetKind::FileButton);
        assert_eq!(schema.default_value("automatable"), Some(&json!(0)));
        assert_eq!(schema.default_value("text"), Some(&json!("Choose File")));
    }

    #[test]
    fn slider_sections_list_range_keys() {
        let sections = schema(WidgetKind::RotarySlider).sections();
        let range = sections
            .iter()
            .find(|section| section.title == "Range")
            .unwrap();
        assert_eq!(range.keys, RANGE_KEYS.to_vec());
        assert_eq!(
            schema(WidgetKind::RotarySlider).default_f64("increment"),
            Some(0.001)
        );
    }
}
