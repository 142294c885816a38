//! Closed set of widget types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RecordError;

/// Widget variant tag.
///
/// Serialized with the camelCase tags used inside `<Cabbage>` regions. Parsing
/// also accepts the hyphenated names and the short legacy tags (`rslider`,
/// `hslider`, ...) found in older instruments.
///
/// `Unknown` marks a record whose tag is outside the set. It never parses
/// from a string and is not part of [`WidgetKind::ALL`]; such records are
/// carried through a document untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    RotarySlider,
    HorizontalSlider,
    HorizontalRangeSlider,
    VerticalSlider,
    NumberSlider,
    Button,
    FileButton,
    OptionButton,
    CheckBox,
    ComboBox,
    Label,
    GroupBox,
    Image,
    ListBox,
    CsoundOutput,
    MidiKeyboard,
    GenTable,
    TextEditor,
    Form,
    Unknown,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 19] = [
        Self::RotarySlider,
        Self::HorizontalSlider,
        Self::HorizontalRangeSlider,
        Self::VerticalSlider,
        Self::NumberSlider,
        Self::Button,
        Self::FileButton,
        Self::OptionButton,
        Self::CheckBox,
        Self::ComboBox,
        Self::Label,
        Self::GroupBox,
        Self::Image,
        Self::ListBox,
        Self::CsoundOutput,
        Self::MidiKeyboard,
        Self::GenTable,
        Self::TextEditor,
        Self::Form,
    ];

    /// Tag written to documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RotarySlider => "rotarySlider",
            Self::HorizontalSlider => "horizontalSlider",
            Self::HorizontalRangeSlider => "horizontalRangeSlider",
            Self::VerticalSlider => "verticalSlider",
            Self::NumberSlider => "numberSlider",
            Self::Button => "button",
            Self::FileButton => "fileButton",
            Self::OptionButton => "optionButton",
            Self::CheckBox => "checkBox",
            Self::ComboBox => "comboBox",
            Self::Label => "label",
            Self::GroupBox => "groupBox",
            Self::Image => "image",
            Self::ListBox => "listBox",
            Self::CsoundOutput => "csoundOutput",
            Self::MidiKeyboard => "keyboard",
            Self::GenTable => "gentable",
            Self::TextEditor => "textEditor",
            Self::Form => "form",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable name for widget palettes.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::RotarySlider => "Rotary Slider",
            Self::HorizontalSlider => "Horizontal Slider",
            Self::HorizontalRangeSlider => "Horizontal Range Slider",
            Self::VerticalSlider => "Vertical Slider",
            Self::NumberSlider => "Number Slider",
            Self::Button => "Button",
            Self::FileButton => "File Button",
            Self::OptionButton => "Option Button",
            Self::CheckBox => "Checkbox",
            Self::ComboBox => "Combo Box",
            Self::Label => "Label",
            Self::GroupBox => "Group Box",
            Self::Image => "Image",
            Self::ListBox => "List Box",
            Self::CsoundOutput => "Csound Output",
            Self::MidiKeyboard => "MIDI Keyboard",
            Self::GenTable => "Function Table",
            Self::TextEditor => "Text Editor",
            Self::Form => "Form",
            Self::Unknown => "Unknown",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "rotarySlider" | "rotary-slider" | "rslider" => Self::RotarySlider,
            "horizontalSlider" | "horizontal-slider" | "hslider" => Self::HorizontalSlider,
            "horizontalRangeSlider" | "horizontal-range-slider" | "hrange" => {
                Self::HorizontalRangeSlider
            }
            "verticalSlider" | "vertical-slider" | "vslider" => Self::VerticalSlider,
            "numberSlider" | "number-slider" | "nslider" => Self::NumberSlider,
            "button" => Self::Button,
            "fileButton" | "file-button" | "filebutton" => Self::FileButton,
            "optionButton" | "option-button" | "optionbutton" => Self::OptionButton,
            "checkBox" | "checkbox" => Self::CheckBox,
            "comboBox" | "combo-box" | "combobox" => Self::ComboBox,
            "label" => Self::Label,
            "groupBox" | "group-box" | "groupbox" => Self::GroupBox,
            "image" => Self::Image,
            "listBox" | "list-box" | "listbox" => Self::ListBox,
            "csoundOutput" | "csound-output" | "csoundoutput" => Self::CsoundOutput,
            "keyboard" | "midi-keyboard" | "midiKeyboard" => Self::MidiKeyboard,
            "gentable" | "gen-table" | "genTable" => Self::GenTable,
            "textEditor" | "text-editor" | "texteditor" => Self::TextEditor,
            "form" => Self::Form,
            _ => return None,
        };
        Some(kind)
    }

    /// Sliders whose value moves over a continuous `[min, max]` range.
    pub const fn is_continuous(self) -> bool {
        matches!(
            self,
            Self::RotarySlider
                | Self::HorizontalSlider
                | Self::HorizontalRangeSlider
                | Self::VerticalSlider
                | Self::NumberSlider
        )
    }

    /// Widgets whose value steps through a finite set.
    pub const fn is_discrete(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::FileButton
                | Self::OptionButton
                | Self::CheckBox
                | Self::ComboBox
                | Self::ListBox
        )
    }

    /// Widgets that never emit parameter updates.
    pub const fn is_display_only(self) -> bool {
        matches!(
            self,
            Self::Label
                | Self::GroupBox
                | Self::Image
                | Self::CsoundOutput
                | Self::GenTable
                | Self::TextEditor
                | Self::Form
                | Self::Unknown
        )
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s.trim()).ok_or_else(|| RecordError::UnknownType(s.into()))
    }
}

impl Serialize for WidgetKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WidgetKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
