//! Interactive widget variants.
//! - common: shared render and emission helpers
//! - slider: rotary, horizontal, vertical, number and range sliders
//! - button: button, file button, option button, checkbox
//! - menu: combo box and list box
//! - keyboard: MIDI keyboard
//! - table: function table with its raster surface
//! - display: label, group box, image, text editor, csound output
//! - form: root canvas

mod button;
mod common;
mod display;
mod form;
mod keyboard;
mod menu;
mod slider;
mod table;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::WidgetKind;
use crate::markup::Markup;
use crate::record::WidgetRecord;
use crate::schema::schema;

pub use self::button::{Button, ButtonRole};
pub use self::display::Display;
pub use self::form::Form;
pub use self::keyboard::MidiKeyboard;
pub use self::menu::{ComboBox, ListBox};
pub use self::slider::{RangeSlider, Slider, SliderStyle};
pub use self::table::{GenTable, RasterSurface};

/// Pointer position in widget-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Transient interaction state. Never written to documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub pressed: bool,
    pub hovered: bool,
    pub open: bool,
    pub decimal_places: usize,
    pub drag_origin: Option<PointerEvent>,
    pub drag_start_value: f64,
    pub last_pointer: PointerEvent,
    pub last_emitted: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[default]
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

/// Parameter update sent towards the audio engine.
///
/// Numeric values are normalized to `[0, 1]`, except index-valued list
/// channels which carry the raw index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdate {
    #[serde(alias = "paramIdx", default, skip_serializing_if = "Option::is_none")]
    pub parameter_index: Option<usize>,
    pub channel: String,
    pub value: ParameterValue,
    #[serde(default)]
    pub channel_type: ChannelType,
}

/// Side effect requested by a widget interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetOutput {
    Parameter(ParameterUpdate),
    /// Ask the host for a native file picker.
    FileOpen { channel: String },
    /// Raw MIDI message from the on-screen keyboard.
    Midi { channel: String, message: [u8; 3] },
}

/// Record plus the state shared by every variant.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetCore {
    pub record: WidgetRecord,
    pub ui: UiState,
    pub parameter_index: Option<usize>,
}

impl WidgetCore {
    pub fn new(record: WidgetRecord) -> Self {
        let mut core = Self {
            record,
            ui: UiState::default(),
            parameter_index: None,
        };
        core.refresh_cache();
        core
    }

    /// Recompute cached values derived from properties.
    pub fn refresh_cache(&mut self) {
        self.ui.decimal_places = crate::normalize::decimal_places(self.record.range().increment);
    }

    pub fn channel(&self) -> &str {
        &self.record.channel
    }
}

/// Capability contract shared by every widget variant.
pub trait Widget: fmt::Debug + Send {
    fn core(&self) -> &WidgetCore;
    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Markup for the current properties; empty when `visible` is 0.
    fn render(&self) -> Markup;

    fn kind(&self) -> WidgetKind {
        self.core().record.kind
    }

    fn record(&self) -> &WidgetRecord {
        &self.core().record
    }

    fn channel(&self) -> &str {
        self.core().channel()
    }

    fn default_properties(&self) -> &'static IndexMap<String, Value> {
        schema(self.kind()).defaults()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        let ui = &mut self.core_mut().ui;
        ui.pressed = true;
        ui.last_pointer = event;
        Vec::new()
    }

    fn pointer_move(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core_mut().ui.last_pointer = event;
        Vec::new()
    }

    fn pointer_up(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        let ui = &mut self.core_mut().ui;
        ui.pressed = false;
        ui.drag_origin = None;
        ui.last_pointer = event;
        Vec::new()
    }

    fn pointer_enter(&mut self) {
        self.core_mut().ui.hovered = true;
    }

    fn pointer_leave(&mut self) {
        self.core_mut().ui.hovered = false;
    }

    /// Pointer capture was lost mid-interaction; behaves like pointer-up.
    fn capture_lost(&mut self) -> Vec<WidgetOutput> {
        let last = self.core().ui.last_pointer;
        self.pointer_up(last)
    }

    /// A pointer-down landed somewhere else in the panel.
    fn click_outside(&mut self) {}

    /// Replace properties from a record pushed by the host.
    fn replace_record(&mut self, record: WidgetRecord) {
        let core = self.core_mut();
        core.record = record;
        core.refresh_cache();
    }

    /// Set the current value from a host update.
    fn set_value(&mut self, value: &Value) {
        if let Some(number) = crate::record::as_number(value) {
            self.core_mut().record.set_value(number);
        } else {
            self.core_mut().record.set("value", value.clone());
        }
    }

    /// Markup that replaces the widget's node in place. Only the form uses it.
    fn refresh(&self) -> Option<Markup> {
        None
    }
}

/// Build the widget variant for `record`.
pub fn instantiate(record: WidgetRecord) -> Box<dyn Widget> {
    let core = WidgetCore::new(record);
    match core.record.kind {
        WidgetKind::RotarySlider => Box::new(Slider::new(core, SliderStyle::Rotary)),
        WidgetKind::HorizontalSlider => Box::new(Slider::new(core, SliderStyle::Horizontal)),
        WidgetKind::VerticalSlider => Box::new(Slider::new(core, SliderStyle::Vertical)),
        WidgetKind::NumberSlider => Box::new(Slider::new(core, SliderStyle::Number)),
        WidgetKind::HorizontalRangeSlider => Box::new(RangeSlider::new(core)),
        WidgetKind::Button => Box::new(Button::new(core, ButtonRole::Toggle)),
        WidgetKind::CheckBox => Box::new(Button::new(core, ButtonRole::Check)),
        WidgetKind::FileButton => Box::new(Button::new(core, ButtonRole::File)),
        WidgetKind::OptionButton => Box::new(Button::new(core, ButtonRole::Option)),
        WidgetKind::ComboBox => Box::new(ComboBox::new(core)),
        WidgetKind::ListBox => Box::new(ListBox::new(core)),
        WidgetKind::MidiKeyboard => Box::new(MidiKeyboard::new(core)),
        WidgetKind::GenTable => Box::new(GenTable::new(core)),
        WidgetKind::Form => Box::new(Form::new(core)),
        WidgetKind::Label
        | WidgetKind::GroupBox
        | WidgetKind::Image
        | WidgetKind::CsoundOutput
        | WidgetKind::TextEditor
        | WidgetKind::Unknown => Box::new(Display::new(core)),
    }
}
