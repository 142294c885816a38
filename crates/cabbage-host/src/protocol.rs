//! Message contract between the editor, the host and the panel.
//!
//! Every message is a JSON object tagged by `command`. Field names are
//! camelCase on the wire; a few legacy spellings are accepted on input.

use std::path::PathBuf;

use cabbage_sync::LineRange;
use cabbage_widgets::{ParameterUpdate, WidgetKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether the panel is being edited or played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Edit,
    #[serde(alias = "performance")]
    Play,
}

/// Messages received by the host, from the editor or from the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Inbound {
    OpenDocument {
        path: PathBuf,
        text: String,
    },
    CloseDocument {
        path: PathBuf,
    },
    /// The editor saved or reloaded a document.
    OnFileChanged {
        path: PathBuf,
        text: String,
    },
    SetMode {
        mode: Mode,
    },
    OnEnterEditMode,
    OnEnterPerformanceMode,
    /// The panel finished loading and wants the current widgets.
    CabbageSetupComplete,
    SnapToSize {
        size: f64,
    },
    ParameterChange(ParameterUpdate),
    /// Partial records edited in the panel. `data` is a JSON string, an
    /// object, or an array of objects.
    WidgetUpdate {
        #[serde(default)]
        path: Option<PathBuf>,
        #[serde(alias = "text")]
        data: Value,
    },
    MidiMessage {
        channel: String,
        message: [u8; 3],
    },
    FileOpen {
        channel: String,
    },
    #[serde(rename = "fileOpenFromVSCode")]
    FileOpenFromVsCode {
        file_name: String,
        channel: String,
    },
    AddWidget {
        path: PathBuf,
        #[serde(rename = "type")]
        kind: WidgetKind,
        #[serde(default)]
        left: Option<f64>,
        #[serde(default)]
        top: Option<f64>,
    },
    RemoveWidget {
        path: PathBuf,
        channel: String,
    },
    FormatDocument {
        path: PathBuf,
    },
    ExpandDocument {
        path: PathBuf,
    },
    ReorderWidgets {
        path: PathBuf,
    },
    CopyWidgets {
        path: PathBuf,
        channels: Vec<String>,
    },
    PasteWidgets {
        path: PathBuf,
    },
    Exit,
}

/// Messages sent by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outbound {
    /// Replace the whole text of `path`. External files are already saved.
    DocumentEdit {
        path: PathBuf,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        highlight: Option<LineRange>,
        #[serde(default)]
        external: bool,
    },
    /// A full record in `data` or a bare value for the panel.
    WidgetUpdate {
        channel: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    ParameterChange(ParameterUpdate),
    MidiMessage {
        channel: String,
        message: [u8; 3],
    },
    FileOpen {
        channel: String,
    },
    #[serde(rename = "fileOpenFromVSCode")]
    FileOpenFromVsCode {
        file_name: String,
        channel: String,
    },
    OnFileChanged,
    OnEnterEditMode {
        snap_size: f64,
    },
    OnEnterPerformanceMode,
    SnapToSize {
        size: f64,
    },
    Diagnostic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
        message: String,
    },
}

impl Outbound {
    pub fn diagnostic(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::Diagnostic {
            path,
            message: message.into(),
        }
    }

    /// Messages for the audio engine rather than the editor or the panel.
    pub fn is_engine_bound(&self) -> bool {
        matches!(self, Self::ParameterChange(_) | Self::MidiMessage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabbage_widgets::{ChannelType, ParameterValue};
    use expect_test::expect;
    use serde_json::json;

    fn inbound(value: Value) -> Inbound {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn inbound_commands_use_camel_case_tags() {
        assert_eq!(
            inbound(json!({"command": "openDocument", "path": "a.csd", "text": "x"})),
            Inbound::OpenDocument {
                path: "a.csd".into(),
                text: "x".into()
            }
        );
        assert_eq!(
            inbound(json!({"command": "cabbageSetupComplete"})),
            Inbound::CabbageSetupComplete
        );
        assert_eq!(
            inbound(json!({"command": "fileOpenFromVSCode", "fileName": "kick.wav", "channel": "open"})),
            Inbound::FileOpenFromVsCode {
                file_name: "kick.wav".into(),
                channel: "open".into()
            }
        );
        assert_eq!(
            inbound(json!({"command": "addWidget", "path": "a.csd", "type": "rotarySlider"})),
            Inbound::AddWidget {
                path: "a.csd".into(),
                kind: WidgetKind::RotarySlider,
                left: None,
                top: None
            }
        );
    }

    #[test]
    fn parameter_change_accepts_legacy_index_name() {
        let message = inbound(json!({
            "command": "parameterChange",
            "paramIdx": 2,
            "channel": "gain",
            "value": 0.25
        }));
        assert_eq!(
            message,
            Inbound::ParameterChange(ParameterUpdate {
                parameter_index: Some(2),
                channel: "gain".into(),
                value: ParameterValue::Number(0.25),
                channel_type: ChannelType::Number,
            })
        );
    }

    #[test]
    fn performance_is_an_alias_for_play() {
        assert_eq!(
            inbound(json!({"command": "setMode", "mode": "performance"})),
            Inbound::SetMode { mode: Mode::Play }
        );
    }

    #[test]
    fn outbound_skips_absent_fields() {
        let update = Outbound::WidgetUpdate {
            channel: "gain".into(),
            data: None,
            value: Some(json!(0.5)),
        };
        expect![[r#"{"command":"widgetUpdate","channel":"gain","value":0.5}"#]]
            .assert_eq(&serde_json::to_string(&update).unwrap());
        let edit = Outbound::OnEnterEditMode { snap_size: 4.0 };
        expect![[r#"{"command":"onEnterEditMode","snapSize":4.0}"#]]
            .assert_eq(&serde_json::to_string(&edit).unwrap());
    }

    #[test]
    fn unknown_command_is_an_error() {
        let result: Result<Inbound, _> = serde_json::from_value(json!({"command": "explode"}));
        assert!(result.is_err());
    }
}
