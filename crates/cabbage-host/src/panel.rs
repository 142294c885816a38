//! Rendering-side endpoint of the bridge.
//!
//! A [`Panel`] owns the live widget graph. It applies the messages the host
//! sends and turns widget interactions into messages for the host. It never
//! touches document text.

use cabbage_widgets::{
    ChannelType, LiveGraph, ParameterUpdate, ParameterValue, PointerEvent, WidgetOutput,
    WidgetRecord,
};
use tracing::{debug, warn};

use crate::protocol::{Inbound, Mode, Outbound};

#[derive(Debug, Default)]
pub struct Panel {
    graph: LiveGraph,
    mode: Mode,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &LiveGraph {
        &self.graph
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Apply one host message. Returns the replies it triggers.
    pub fn receive(&mut self, message: &Outbound) -> Vec<Inbound> {
        match message {
            Outbound::OnFileChanged => {
                self.graph.reset();
                Vec::new()
            }
            Outbound::WidgetUpdate {
                channel,
                data: Some(data),
                ..
            } => {
                let record = serde_json::from_str::<serde_json::Value>(data)
                    .map_err(|error| error.to_string())
                    .and_then(|value| WidgetRecord::from_value(value).map_err(|error| error.to_string()));
                match record {
                    Ok(record) => {
                        self.graph.apply_record(record);
                    }
                    Err(error) => warn!("dropping update for '{channel}': {error}"),
                }
                Vec::new()
            }
            Outbound::WidgetUpdate {
                channel,
                value: Some(value),
                ..
            } => {
                self.graph.set_value(channel, value);
                Vec::new()
            }
            Outbound::OnEnterEditMode { snap_size } => {
                self.graph.set_grid_size(*snap_size);
                let released = self.graph.release_all();
                self.mode = Mode::Edit;
                forward(released)
            }
            Outbound::OnEnterPerformanceMode => {
                self.mode = Mode::Play;
                Vec::new()
            }
            Outbound::SnapToSize { size } => {
                self.graph.set_grid_size(*size);
                Vec::new()
            }
            Outbound::FileOpenFromVsCode { file_name, channel } => {
                if !self.graph.file_selected(channel) {
                    debug!("no file button '{channel}'");
                    return Vec::new();
                }
                vec![Inbound::ParameterChange(ParameterUpdate {
                    parameter_index: None,
                    channel: channel.clone(),
                    value: ParameterValue::Text(file_name.clone()),
                    channel_type: ChannelType::String,
                })]
            }
            _ => Vec::new(),
        }
    }

    pub fn pointer_down(&mut self, channel: &str, event: PointerEvent) -> Vec<Inbound> {
        if self.mode == Mode::Edit {
            return Vec::new();
        }
        let outputs = self.graph.pointer_down(channel, event);
        forward(outputs)
    }

    pub fn pointer_move(&mut self, channel: &str, event: PointerEvent) -> Vec<Inbound> {
        if self.mode == Mode::Edit {
            return Vec::new();
        }
        let outputs = self.graph.pointer_move(channel, event);
        forward(outputs)
    }

    pub fn pointer_up(&mut self, channel: &str, event: PointerEvent) -> Vec<Inbound> {
        if self.mode == Mode::Edit {
            return Vec::new();
        }
        let outputs = self.graph.pointer_up(channel, event);
        forward(outputs)
    }

    /// The window lost focus.
    pub fn blur(&mut self) -> Vec<Inbound> {
        let outputs = self.graph.release_all();
        forward(outputs)
    }

    /// Drop a dragged widget at a new position while editing. The snapped
    /// record goes back to the host as a widget update.
    pub fn drop_widget(&mut self, channel: &str, left: f64, top: f64) -> Option<Inbound> {
        if self.mode != Mode::Edit {
            return None;
        }
        let record = self.graph.move_widget(channel, left, top)?;
        Some(Inbound::WidgetUpdate {
            path: None,
            data: record.to_value(),
        })
    }
}

fn forward(outputs: Vec<WidgetOutput>) -> Vec<Inbound> {
    outputs
        .into_iter()
        .map(|output| match output {
            WidgetOutput::Parameter(update) => Inbound::ParameterChange(update),
            WidgetOutput::FileOpen { channel } => Inbound::FileOpen { channel },
            WidgetOutput::Midi { channel, message } => Inbound::MidiMessage { channel, message },
        })
        .collect()
}
