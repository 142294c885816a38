//! Integration tests for document synchronization.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use cabbage_sync::{JsonFormat, RecordSource, Region, SyncEngine, SyncError, SyncOptions};
use serde_json::{json, Value};

const SYNTH: &str = r##"<Cabbage>
[
    {"type":"form","caption":"Synth","size":[400,200],"colour":"#888888"},
    {"type":"rotarySlider","channel":"rslider1","bounds":[10,10,60,60]},
    {"type":"rotarySlider","channel":"rslider2","bounds":[80,10,60,60]},
    {"type":"rotarySlider","channel":"rslider3","bounds":[150,10,60,60],"range":[0,1,0,1,0.01]},
    {"type":"button","channel":"mute","presetIgnore":1,"// comment":"kept"}
]
</Cabbage>
<CsoundSynthesizer>
<CsInstruments>
instr 1
  a1 oscili chnget:k("rslider1"), 440
  out a1
endin
</CsInstruments>
</CsoundSynthesizer>
"##;

fn temp_dir(prefix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let dir = std::env::temp_dir().join(format!("{prefix}-{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn setup(format: JsonFormat) -> SyncEngine {
    SyncEngine::new(SyncOptions {
        format,
        ..SyncOptions::default()
    })
}

fn document() -> &'static Path {
    Path::new("/tmp/cabbage-sync-inline/synth.csd")
}

fn region_records(text: &str) -> Vec<Value> {
    let region = Region::find(text).unwrap();
    serde_json::from_str(region.content(text)).unwrap()
}

fn apply(engine: &SyncEngine, text: &str, update: Value) -> String {
    engine
        .apply_update(document(), text, update)
        .unwrap()
        .edit
        .expect("document edit")
        .text
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_round_trip_is_idempotent() {
    for format in [JsonFormat::Compact, JsonFormat::Expanded] {
        let engine = setup(format);
        let once = engine.format_document(SYNTH, format).unwrap().unwrap_or_else(|| SYNTH.to_string());
        let twice = engine.format_document(&once, format).unwrap();
        assert_eq!(twice, None, "{format:?} changed on the second pass");
    }
}

#[test]
fn test_type_after_other_keys_formats_stably() {
    let text = r##"<Cabbage>[
{"caption":"Pad","size":[300,200],"type":"form","colour":"#202020"},
{"channel":"level","bounds":[10,10,20,160],"text":"Level","type":"vslider"}
]</Cabbage>"##;
    for format in [JsonFormat::Compact, JsonFormat::Expanded] {
        let engine = setup(format);
        let once = engine.format_document(text, format).unwrap().unwrap();
        let twice = engine
            .format_document(&once, format)
            .unwrap()
            .unwrap_or_else(|| once.clone());
        assert_eq!(twice, once, "{format:?}");
    }
    let engine = setup(JsonFormat::Compact);
    let once = engine.format_document(text, JsonFormat::Compact).unwrap().unwrap();
    assert!(once.contains(
        r##"{"type":"form","channel":"MainForm","caption":"Pad","size":[300,200],"colour":"#202020"}"##
    ));
    assert!(once.contains(r#"{"type":"vslider","channel":"level","bounds":[10,10,20,160],"text":"Level"}"#));
}

#[test]
fn test_repeated_update_and_missing_removal_leave_text_alone() {
    let engine = setup(JsonFormat::Compact);
    let update = json!({"channel": "rslider2", "value": 0.75});
    let first = apply(&engine, SYNTH, update.clone());
    let second = engine.apply_update(document(), &first, update).unwrap();
    assert_eq!(second.edit, None);
    assert_eq!(engine.remove_widget(document(), &first, "nobody").unwrap(), None);
}

#[test]
fn test_text_outside_region_is_preserved() {
    let engine = setup(JsonFormat::Compact);
    let updated = apply(&engine, SYNTH, json!({"channel": "mute", "text": "Mute"}));
    let tail = &SYNTH[SYNTH.find("</Cabbage>").unwrap()..];
    assert!(updated.ends_with(tail));
    assert!(updated.starts_with("<Cabbage>\n[\n"));
}

#[test]
fn test_unknown_keys_survive_round_trip() {
    let engine = setup(JsonFormat::Compact);
    let updated = apply(&engine, SYNTH, json!({"channel": "rslider1", "value": 0.3}));
    let records = region_records(&updated);
    assert_eq!(records[4]["presetIgnore"], json!(1));
    assert_eq!(records[4]["// comment"], json!("kept"));
}

// =============================================================================
// Merge By Channel
// =============================================================================

#[test]
fn test_known_channel_keeps_list_length() {
    let engine = setup(JsonFormat::Compact);
    let updated = apply(&engine, SYNTH, json!({"channel": "rslider3", "value": 0.5}));
    let records = region_records(&updated);
    assert_eq!(records.len(), 5);
    assert_eq!(records[3]["range"], json!([0, 1, 0.5, 1, 0.01]));
    assert_eq!(records[1], region_records(SYNTH)[1]);
}

#[test]
fn test_new_channel_appends_one_record() {
    let engine = setup(JsonFormat::Compact);
    let updated = apply(&engine, SYNTH, json!({"channel": "new1", "type": "button"}));
    let records = region_records(&updated);
    assert_eq!(records.len(), 6);
    assert_eq!(records[5], json!({"type": "button", "channel": "new1"}));
}

#[test]
fn test_geometry_collapses_on_insert() {
    let engine = setup(JsonFormat::Compact);
    let updated = apply(
        &engine,
        SYNTH,
        json!({"channel": "lbl", "type": "label", "left": 1, "top": 2, "width": 3, "height": 4}),
    );
    let records = region_records(&updated);
    assert_eq!(
        records[5],
        json!({"type": "label", "channel": "lbl", "bounds": [1, 2, 3, 4]})
    );
}

#[test]
fn test_defaults_are_suppressed() {
    let engine = setup(JsonFormat::Compact);
    let updated = apply(
        &engine,
        SYNTH,
        json!({"channel": "mute", "colourOn": "#0295cf", "outlineWidth": 2, "text": "Mute"}),
    );
    let records = region_records(&updated);
    assert_eq!(
        records[4],
        json!({"type": "button", "channel": "mute", "presetIgnore": 1, "// comment": "kept", "text": "Mute"})
    );
}

#[test]
fn test_added_widget_gets_next_free_channel() {
    let engine = setup(JsonFormat::Compact);
    let (channel, _) = engine
        .add_widget(document(), SYNTH, cabbage_widgets::WidgetKind::RotarySlider, None)
        .unwrap();
    // five records, and rslider1..3 are taken
    assert_eq!(channel, "rslider6");
}

#[test]
fn test_unrecognized_and_legacy_records_pass_through() {
    let text = r#"<Cabbage>[
{"type":"form","caption":"Pad"},
{"type":"rslider","channel":"a","bounds":[0,0,60,60]},
{"type":"xyPad","channel":"xy","bounds":[70,0,200,200]},
{"type":"button","channel":"b1"}
]</Cabbage>"#;
    let engine = setup(JsonFormat::Compact);
    let outcome = engine
        .apply_update(document(), text, json!({"channel": "b1", "text": "Go"}))
        .unwrap();
    assert!(outcome.rejected.is_empty());
    let records = region_records(&outcome.edit.unwrap().text);
    assert_eq!(records[1]["type"], json!("rslider"));
    assert_eq!(
        records[2],
        json!({"type": "xyPad", "channel": "xy", "bounds": [70, 0, 200, 200]})
    );
    assert_eq!(records[3], json!({"type": "button", "channel": "b1", "text": "Go"}));

    let outcome = engine
        .apply_update(document(), text, json!({"channel": "xy", "left": 5}))
        .unwrap();
    assert_eq!(outcome.rejected.len(), 1);
    let records = region_records(&outcome.edit.unwrap().text);
    assert_eq!(records[2]["bounds"], json!([70, 0, 200, 200]));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_malformed_region_is_not_written() {
    let engine = setup(JsonFormat::Compact);
    let broken = SYNTH.replace("\"mute\",", "\"mute\"");
    let result = engine.apply_update(document(), &broken, json!({"channel": "mute", "text": "x"}));
    assert!(matches!(result, Err(SyncError::InvalidJson(_))));
}

#[test]
fn test_missing_region_is_reported() {
    let engine = setup(JsonFormat::Compact);
    let result = engine.apply_update(document(), "<CsoundSynthesizer/>", json!({}));
    assert_eq!(result, Err(SyncError::MissingRegion));
}

// =============================================================================
// External Files
// =============================================================================

#[test]
fn test_sibling_json_file_receives_updates() {
    let dir = temp_dir("cabbage-sync-sibling");
    let csd = dir.join("synth.csd");
    let json_path = dir.join("synth.json");
    fs::write(&json_path, r#"[{"type":"rotarySlider","channel":"gain"}]"#).unwrap();
    let text = "<Cabbage>[]</Cabbage>\n<CsoundSynthesizer/>\n";
    fs::write(&csd, text).unwrap();

    let engine = setup(JsonFormat::Compact);
    let outcome = engine
        .apply_update(&csd, text, json!({"channel": "gain", "colour": "#ff0000"}))
        .unwrap();
    let edit = outcome.edit.unwrap();
    assert!(edit.external);
    assert_eq!(edit.path, json_path);

    let written = fs::read_to_string(&json_path).unwrap();
    assert_eq!(written, edit.text);
    assert_eq!(
        serde_json::from_str::<Value>(&written).unwrap(),
        json!([{"type": "rotarySlider", "channel": "gain", "colour": "#ff0000"}])
    );
    assert_eq!(fs::read_to_string(&csd).unwrap(), text);

    let loaded = engine.load(&csd, text).unwrap();
    assert_eq!(loaded.source, RecordSource::External(json_path));
    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_inline_form_ignores_sibling_file() {
    let dir = temp_dir("cabbage-sync-form");
    let csd = dir.join("synth.csd");
    fs::write(dir.join("synth.json"), "[]").unwrap();
    let text = "<Cabbage>[{\"type\":\"form\"}]</Cabbage>";

    let engine = setup(JsonFormat::Compact);
    let loaded = engine.load(&csd, text).unwrap();
    assert_eq!(loaded.source, RecordSource::Inline);
    fs::remove_dir_all(dir).ok();
}
