//! Typed widget record with an open property map.
//!
//! `type` and `channel` are held as fields; every other key lives in
//! `properties` in document order, so unknown keys survive a round trip.
//! The `type` string is written back as it was read: legacy tags stay
//! legacy and tags outside the known set decode as [`WidgetKind::Unknown`].

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::kind::WidgetKind;
use crate::normalize::parse_items;
use crate::schema::{schema, WidgetSchema, BOUNDS_KEYS, RANGE_KEYS};

/// Widget position and size in panel pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Value range of a continuous widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub skew: f64,
    pub increment: f64,
}

/// One widget entry of a `<Cabbage>` region.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetRecord {
    pub kind: WidgetKind,
    pub channel: String,
    pub properties: IndexMap<String, Value>,
    /// Source tag when it differs from `kind.as_str()`.
    tag: Option<String>,
}

impl WidgetRecord {
    pub fn new(kind: WidgetKind, channel: impl Into<String>) -> Self {
        Self {
            kind,
            channel: channel.into(),
            properties: IndexMap::new(),
            tag: None,
        }
    }

    /// Record seeded with every schema default for `kind`.
    pub fn with_defaults(kind: WidgetKind, channel: impl Into<String>) -> Self {
        Self {
            properties: schema(kind).defaults().clone(),
            ..Self::new(kind, channel)
        }
    }

    /// The `type` string written for this record.
    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Change the kind, keeping `tag` as the written spelling.
    pub fn retag(&mut self, kind: WidgetKind, tag: &str) {
        self.kind = kind;
        self.tag = (tag != kind.as_str()).then(|| tag.to_string());
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == WidgetKind::Unknown
    }

    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(object) => Self::from_object(object),
            _ => Err(RecordError::NotAnObject),
        }
    }

    /// Decode one record. A tag outside the known set is not an error here;
    /// the record comes back as [`WidgetKind::Unknown`] with its tag kept.
    pub fn from_object(mut object: Map<String, Value>) -> Result<Self, RecordError> {
        let tag = match object.shift_remove("type") {
            Some(Value::String(tag)) => tag,
            Some(_) => {
                return Err(RecordError::InvalidValue {
                    key: "type".into(),
                    expected: "a string",
                })
            }
            None => return Err(RecordError::MissingType),
        };
        let kind = tag.parse::<WidgetKind>().unwrap_or(WidgetKind::Unknown);
        let channel = match object.shift_remove("channel") {
            Some(Value::String(channel)) => channel,
            Some(_) => {
                return Err(RecordError::InvalidValue {
                    key: "channel".into(),
                    expected: "a string",
                })
            }
            None if kind == WidgetKind::Form => schema(kind).default_channel.to_string(),
            None => return Err(RecordError::MissingChannel(tag.as_str().into())),
        };
        let mut record = Self::new(kind, channel);
        record.retag(kind, &tag);
        record.properties = object.into_iter().collect();
        Ok(record)
    }

    /// JSON object with `type` first, then `channel`, then properties.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::String(self.tag().into()));
        object.insert("channel".into(), Value::String(self.channel.clone()));
        for (key, value) in &self.properties {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    pub fn schema(&self) -> &'static WidgetSchema {
        schema(self.kind)
    }

    pub fn is_form(&self) -> bool {
        self.kind == WidgetKind::Form
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Property value, falling back to the schema default.
    pub fn effective(&self, key: &str) -> Option<&Value> {
        self.properties
            .get(key)
            .or_else(|| self.schema().default_value(key))
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.effective(key).and_then(as_number)
    }

    pub fn number_or(&self, key: &str, fallback: f64) -> f64 {
        self.number(key).unwrap_or(fallback)
    }

    pub fn text(&self, key: &str) -> String {
        match self.effective(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        }
    }

    /// Boolean-as-int flag such as `visible` or `automatable`.
    pub fn flag(&self, key: &str) -> bool {
        match self.effective(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(value) => as_number(value).is_some_and(|number| number != 0.0),
            None => false,
        }
    }

    pub fn visible(&self) -> bool {
        self.effective("visible").is_none() || self.flag("visible")
    }

    pub fn automatable(&self) -> bool {
        self.flag("automatable")
    }

    /// Entries of the `items` property, given as a comma list or an array.
    pub fn items(&self) -> Vec<String> {
        match self.effective("items") {
            Some(Value::String(items)) => parse_items(items),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.trim().to_string()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Geometry from a `bounds` array, a `bounds` object or flat keys.
    pub fn bounds(&self) -> Bounds {
        let defaults = self.schema();
        let fallback = |key: &str| defaults.default_f64(key).unwrap_or_default();
        let flat = |key: &str| self.number(key).unwrap_or_else(|| fallback(key));
        let mut bounds = Bounds {
            left: flat("left"),
            top: flat("top"),
            width: flat("width"),
            height: flat("height"),
        };
        match self.properties.get("bounds") {
            Some(Value::Array(values)) => {
                let slots = [
                    &mut bounds.left,
                    &mut bounds.top,
                    &mut bounds.width,
                    &mut bounds.height,
                ];
                for (slot, value) in slots.into_iter().zip(values) {
                    if let Some(number) = as_number(value) {
                        *slot = number;
                    }
                }
            }
            Some(Value::Object(values)) => {
                let slots = [
                    ("left", &mut bounds.left),
                    ("top", &mut bounds.top),
                    ("width", &mut bounds.width),
                    ("height", &mut bounds.height),
                ];
                for (key, slot) in slots {
                    if let Some(number) = values.get(key).and_then(as_number) {
                        *slot = number;
                    }
                }
            }
            _ => {
                if let Some(Value::Object(size)) = self.properties.get("size") {
                    if let Some(width) = size.get("width").and_then(as_number) {
                        bounds.width = width;
                    }
                    if let Some(height) = size.get("height").and_then(as_number) {
                        bounds.height = height;
                    }
                }
            }
        }
        bounds
    }

    /// Write geometry back using whichever layout the record already has.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        let values = [bounds.left, bounds.top, bounds.width, bounds.height];
        match self.properties.get_mut("bounds") {
            Some(Value::Array(slots)) => {
                *slots = values.iter().map(|value| number_value(*value)).collect();
            }
            Some(Value::Object(slots)) => {
                for (key, value) in BOUNDS_KEYS.iter().zip(values) {
                    slots.insert((*key).to_string(), number_value(value));
                }
            }
            _ => {
                for (key, value) in BOUNDS_KEYS.iter().zip(values) {
                    self.properties
                        .insert((*key).to_string(), number_value(value));
                }
            }
        }
    }

    /// Range from a `range` array, a `range` object or flat keys.
    pub fn range(&self) -> Range {
        let flat = |key: &str, fallback: f64| self.number(key).unwrap_or(fallback);
        let mut range = Range {
            min: flat("min", 0.0),
            max: flat("max", 1.0),
            value: flat("value", 0.0),
            skew: flat("skew", 1.0),
            increment: flat("increment", 0.001),
        };
        match self.properties.get("range") {
            Some(Value::Array(values)) => {
                let slots = [
                    &mut range.min,
                    &mut range.max,
                    &mut range.value,
                    &mut range.skew,
                    &mut range.increment,
                ];
                for (slot, value) in slots.into_iter().zip(values) {
                    if let Some(number) = as_number(value) {
                        *slot = number;
                    }
                }
            }
            Some(Value::Object(values)) => {
                let slots = [
                    ("min", &mut range.min),
                    ("max", &mut range.max),
                    ("skew", &mut range.skew),
                    ("increment", &mut range.increment),
                ];
                for (key, slot) in slots {
                    if let Some(number) = values.get(key).and_then(as_number) {
                        *slot = number;
                    }
                }
                if !self.properties.contains_key("value") {
                    if let Some(number) = values
                        .get("value")
                        .or_else(|| values.get("defaultValue"))
                        .and_then(as_number)
                    {
                        range.value = number;
                    }
                }
            }
            _ => {}
        }
        if let Some(number) = self.properties.get("value").and_then(as_number) {
            range.value = number;
        }
        range
    }

    pub fn value(&self) -> f64 {
        self.range().value
    }

    /// Store `value`, inside a `range` array when that is where it lives.
    pub fn set_value(&mut self, value: f64) {
        if !self.properties.contains_key("value") {
            if let Some(Value::Array(slots)) = self.properties.get_mut("range") {
                if slots.len() > 2 {
                    slots[2] = number_value(value);
                    return;
                }
            }
        }
        self.properties.insert("value".into(), number_value(value));
    }

    /// Collapse complete flat geometry and range groups into arrays.
    pub fn collapse_groups(&mut self) {
        collapse(&mut self.properties, "bounds", &BOUNDS_KEYS);
        collapse(&mut self.properties, "range", &RANGE_KEYS);
    }

    /// Drop every property equal to its schema default.
    pub fn strip_defaults(&mut self) {
        let defaults = self.schema().defaults();
        self.properties.retain(|key, value| {
            defaults
                .get(key)
                .is_none_or(|default| !values_equal(value, default))
        });
    }

    /// Order properties as `bounds`, other keys, then `range`.
    pub fn sort_properties(&mut self) {
        let rank = |key: &str| match key {
            "bounds" => 0,
            "range" => 2,
            _ => 1,
        };
        // stable, so the relative order of other keys is kept
        self.properties
            .sort_by(|left, _, right, _| rank(left.as_str()).cmp(&rank(right.as_str())));
    }
}

fn collapse(properties: &mut IndexMap<String, Value>, group: &str, keys: &[&str]) {
    if properties.contains_key(group) || !keys.iter().all(|key| properties.contains_key(*key)) {
        return;
    }
    let values = keys
        .iter()
        .filter_map(|key| properties.shift_remove(*key))
        .collect();
    properties.insert(group.to_string(), Value::Array(values));
}

/// Numeric view of a JSON value; numeric strings and booleans included.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(f64::from(u8::from(*flag))),
        _ => None,
    }
}

/// JSON number, written as an integer when the value has no fraction.
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Structural equality that treats `1` and `1.0` as the same number.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs()).max(1.0),
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
        }
        _ => left == right,
    }
}

impl Serialize for WidgetRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 2))?;
        map.serialize_entry("type", self.tag())?;
        map.serialize_entry("channel", &self.channel)?;
        for (key, value) in &self.properties {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WidgetRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> WidgetRecord {
        WidgetRecord::from_value(value).expect("valid record")
    }

    #[test]
    fn decodes_type_and_channel_out_of_properties() {
        let record = record(json!({"channel": "gain", "type": "rotarySlider", "colour": "#fff"}));
        assert_eq!(record.kind, WidgetKind::RotarySlider);
        assert_eq!(record.channel, "gain");
        assert_eq!(record.properties.len(), 1);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r##"{"type":"rotarySlider","channel":"gain","colour":"#fff"}"##
        );
    }

    #[test]
    fn form_without_channel_gets_main_form() {
        let form = record(json!({"type": "form", "caption": "Synth"}));
        assert_eq!(form.channel, "MainForm");
    }

    #[test]
    fn keeps_key_order_when_type_is_not_first() {
        let source = json!({"caption": "Synth", "type": "form", "size": [400, 200], "colour": "#222"});
        let form = record(source);
        let keys: Vec<_> = form.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["caption", "size", "colour"]);

        let again = record(form.to_value());
        assert_eq!(again, form);
        assert_eq!(
            serde_json::to_string(&again).unwrap(),
            serde_json::to_string(&form).unwrap()
        );
    }

    #[test]
    fn legacy_and_unknown_tags_are_written_back_verbatim() {
        let legacy = record(json!({"type": "rslider", "channel": "a", "colour": "#fff"}));
        assert_eq!(legacy.kind, WidgetKind::RotarySlider);
        assert_eq!(legacy.tag(), "rslider");
        assert_eq!(legacy.to_value()["type"], json!("rslider"));

        let unknown = record(json!({"type": "xyPad", "channel": "xy", "rangeX": [0, 1, 0]}));
        assert!(unknown.is_unknown());
        assert_eq!(
            serde_json::to_string(&unknown).unwrap(),
            r#"{"type":"xyPad","channel":"xy","rangeX":[0,1,0]}"#
        );

        let mut retyped = legacy;
        retyped.retag(WidgetKind::HorizontalSlider, "horizontalSlider");
        assert_eq!(retyped.tag(), "horizontalSlider");
    }

    #[test]
    fn rejects_missing_channel_and_non_objects() {
        assert_eq!(
            WidgetRecord::from_value(json!({"type": "xyPad"})),
            Err(RecordError::MissingChannel("xyPad".into()))
        );
        assert_eq!(
            WidgetRecord::from_value(json!({"type": "button"})),
            Err(RecordError::MissingChannel("button".into()))
        );
        assert_eq!(
            WidgetRecord::from_value(json!([1, 2])),
            Err(RecordError::NotAnObject)
        );
    }

    #[test]
    fn bounds_read_every_layout() {
        let array = record(json!({"type": "button", "channel": "a", "bounds": [1, 2, 3, 4]}));
        let object = record(json!({
            "type": "button",
            "channel": "b",
            "bounds": {"left": 1, "top": 2, "width": 3, "height": 4}
        }));
        let flat = record(json!({
            "type": "button", "channel": "c", "left": 1, "top": 2, "width": 3, "height": 4
        }));
        let expected = Bounds {
            left: 1.0,
            top: 2.0,
            width: 3.0,
            height: 4.0,
        };
        assert_eq!(array.bounds(), expected);
        assert_eq!(object.bounds(), expected);
        assert_eq!(flat.bounds(), expected);

        let defaulted = record(json!({"type": "button", "channel": "d"}));
        assert_eq!(defaulted.bounds().width, 80.0);
    }

    #[test]
    fn set_bounds_keeps_existing_layout() {
        let mut array = record(json!({"type": "button", "channel": "a", "bounds": [1, 2, 3, 4]}));
        array.set_bounds(Bounds {
            left: 10.0,
            top: 20.0,
            width: 3.0,
            height: 4.0,
        });
        assert_eq!(array.get("bounds"), Some(&json!([10, 20, 3, 4])));
        assert!(array.get("left").is_none());
    }

    #[test]
    fn range_prefers_top_level_value() {
        let nested = record(json!({
            "type": "rotarySlider",
            "channel": "gain",
            "range": {"min": 0, "max": 10, "defaultValue": 2, "skew": 1, "increment": 0.5},
            "value": 4
        }));
        let range = nested.range();
        assert_eq!((range.min, range.max, range.value), (0.0, 10.0, 4.0));
        assert_eq!(range.increment, 0.5);

        let mut tuple = record(json!({
            "type": "rotarySlider", "channel": "cut", "range": [20, 20000, 1000, 0.5, 1]
        }));
        assert_eq!(tuple.value(), 1000.0);
        tuple.set_value(440.0);
        assert_eq!(tuple.get("range"), Some(&json!([20, 20000, 440, 0.5, 1])));
    }

    #[test]
    fn collapse_and_strip_defaults() {
        let mut rec = record(json!({
            "type": "button",
            "channel": "b1",
            "left": 1, "top": 2, "width": 3, "height": 4,
            "corners": 2.0,
            "colourOn": "#ff0000"
        }));
        rec.collapse_groups();
        rec.strip_defaults();
        rec.sort_properties();
        assert_eq!(
            serde_json::to_string(&rec).unwrap(),
            r##"{"type":"button","channel":"b1","bounds":[1,2,3,4],"colourOn":"#ff0000"}"##
        );
    }

    #[test]
    fn numeric_equality_ignores_representation() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!({"a": [0, 1]}), &json!({"a": [0.0, 1.0]})));
        assert!(!values_equal(&json!("1"), &json!(1)));
        assert!(!values_equal(&json!(0.001), &json!(0.002)));
    }

    #[test]
    fn items_accept_list_or_array() {
        let combo = record(json!({"type": "comboBox", "channel": "wave"}));
        assert_eq!(combo.items(), vec!["One", "Two", "Three"]);
        let custom = record(json!({"type": "comboBox", "channel": "w", "items": ["Saw", "Sine"]}));
        assert_eq!(custom.items(), vec!["Saw", "Sine"]);
    }
}
