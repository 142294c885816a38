//! Live widget collection on the rendering side.
//!
//! The graph owns one widget instance per record, in document order. It is
//! driven by host messages (full records, value updates, file reloads) and
//! by pointer events routed to a channel.

use serde_json::Value;
use tracing::debug;

use crate::kind::WidgetKind;
use crate::markup::Markup;
use crate::record::{number_value, WidgetRecord};
use crate::widget::{instantiate, PointerEvent, Widget, WidgetOutput};

/// How a pushed record landed in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphChange {
    Replaced(usize),
    Inserted(usize),
    /// The record has an unrecognized type and was not instantiated.
    Skipped,
}

#[derive(Debug, Default)]
pub struct LiveGraph {
    widgets: Vec<Box<dyn Widget>>,
    grid_size: f64,
}

impl LiveGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every instance with `records`, keeping their order.
    pub fn load(&mut self, records: impl IntoIterator<Item = WidgetRecord>) {
        self.widgets = records
            .into_iter()
            .filter(|record| !record.is_unknown())
            .map(instantiate)
            .collect();
        self.reindex();
    }

    /// Drop every instance, as on a file reload.
    pub fn reset(&mut self) {
        self.widgets.clear();
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn widgets(&self) -> impl Iterator<Item = &dyn Widget> {
        self.widgets.iter().map(|widget| -> &dyn Widget { widget.as_ref() })
    }

    pub fn channels(&self) -> Vec<&str> {
        self.widgets.iter().map(|widget| widget.channel()).collect()
    }

    pub fn get(&self, channel: &str) -> Option<&dyn Widget> {
        let index = self.position(channel)?;
        Some(self.widgets[index].as_ref())
    }

    pub fn form(&self) -> Option<&dyn Widget> {
        self.widgets()
            .find(|widget| widget.kind() == WidgetKind::Form)
    }

    /// Instances other than the form, in order.
    pub fn controls(&self) -> impl Iterator<Item = &dyn Widget> {
        self.widgets()
            .filter(|widget| widget.kind() != WidgetKind::Form)
    }

    fn position(&self, channel: &str) -> Option<usize> {
        self.widgets
            .iter()
            .position(|widget| widget.channel() == channel)
    }

    /// Assign automation indices by ordinal among automatable records.
    fn reindex(&mut self) {
        let mut next = 0;
        for widget in &mut self.widgets {
            let record = widget.record();
            let automatable = record.automatable() && record.kind != WidgetKind::FileButton;
            let index = automatable.then(|| {
                next += 1;
                next - 1
            });
            widget.core_mut().parameter_index = index;
        }
    }

    /// Apply a full record pushed by the host: replace the instance on the
    /// same channel or add a new one. A new form always goes first.
    pub fn apply_record(&mut self, record: WidgetRecord) -> GraphChange {
        if record.is_unknown() {
            debug!("skipping '{}' with unknown type '{}'", record.channel, record.tag());
            return GraphChange::Skipped;
        }
        let change = match self.position(&record.channel) {
            Some(index) if self.widgets[index].kind() == record.kind => {
                self.widgets[index].replace_record(record);
                GraphChange::Replaced(index)
            }
            Some(index) => {
                self.widgets[index] = instantiate(record);
                GraphChange::Replaced(index)
            }
            None if record.kind == WidgetKind::Form => {
                self.widgets.insert(0, instantiate(record));
                GraphChange::Inserted(0)
            }
            None => {
                debug!("adding widget '{}'", record.channel);
                self.widgets.push(instantiate(record));
                GraphChange::Inserted(self.widgets.len() - 1)
            }
        };
        self.reindex();
        change
    }

    /// Set the value of an existing instance. Unknown channels are ignored.
    pub fn set_value(&mut self, channel: &str, value: &Value) -> bool {
        let Some(index) = self.position(channel) else {
            debug!("value update for unknown channel '{channel}'");
            return false;
        };
        self.widgets[index].set_value(value);
        true
    }

    pub fn remove(&mut self, channel: &str) -> bool {
        let Some(index) = self.position(channel) else {
            return false;
        };
        self.widgets.remove(index);
        self.reindex();
        true
    }

    /// Route a press; every other widget sees it as a click outside.
    pub fn pointer_down(&mut self, channel: &str, event: PointerEvent) -> Vec<WidgetOutput> {
        let target = self.position(channel);
        for (index, widget) in self.widgets.iter_mut().enumerate() {
            if Some(index) != target {
                widget.click_outside();
            }
        }
        match target {
            Some(index) => self.widgets[index].pointer_down(event),
            None => Vec::new(),
        }
    }

    pub fn pointer_move(&mut self, channel: &str, event: PointerEvent) -> Vec<WidgetOutput> {
        self.with_widget(channel, |widget| widget.pointer_move(event))
    }

    pub fn pointer_up(&mut self, channel: &str, event: PointerEvent) -> Vec<WidgetOutput> {
        self.with_widget(channel, |widget| widget.pointer_up(event))
    }

    pub fn pointer_enter(&mut self, channel: &str) {
        self.with_widget(channel, |widget| {
            widget.pointer_enter();
            Vec::new()
        });
    }

    pub fn pointer_leave(&mut self, channel: &str) {
        self.with_widget(channel, |widget| {
            widget.pointer_leave();
            Vec::new()
        });
    }

    /// Window lost focus: end every interaction still in progress.
    pub fn release_all(&mut self) -> Vec<WidgetOutput> {
        self.widgets
            .iter_mut()
            .filter(|widget| widget.core().ui.pressed)
            .flat_map(|widget| widget.capture_lost())
            .collect()
    }

    fn with_widget(
        &mut self,
        channel: &str,
        action: impl FnOnce(&mut dyn Widget) -> Vec<WidgetOutput>,
    ) -> Vec<WidgetOutput> {
        match self.position(channel) {
            Some(index) => action(self.widgets[index].as_mut()),
            None => Vec::new(),
        }
    }

    /// The host finished a file picker opened by a file button.
    pub fn file_selected(&mut self, channel: &str) -> bool {
        let Some(index) = self.position(channel) else {
            return false;
        };
        let widget = &mut self.widgets[index];
        if widget.kind() != WidgetKind::FileButton {
            return false;
        }
        let range = widget.record().range();
        let next = if (range.value - range.min).abs() > f64::EPSILON {
            range.min
        } else {
            range.max
        };
        widget.set_value(&number_value(next));
        true
    }

    /// Append engine console output to every output widget.
    pub fn append_console(&mut self, text: &str) {
        for widget in &mut self.widgets {
            if widget.kind() == WidgetKind::CsoundOutput {
                let record = &mut widget.core_mut().record;
                let mut content = record.text("text");
                content.push_str(text);
                record.set("text", Value::String(content));
            }
        }
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn set_grid_size(&mut self, size: f64) {
        self.grid_size = size.max(0.0);
    }

    pub fn snap(&self, position: f64) -> f64 {
        if self.grid_size <= 0.0 {
            return position;
        }
        (position / self.grid_size).round() * self.grid_size
    }

    /// Move a widget while editing. Returns the updated record so the host
    /// can merge it into the document.
    pub fn move_widget(&mut self, channel: &str, left: f64, top: f64) -> Option<WidgetRecord> {
        let (left, top) = (self.snap(left), self.snap(top));
        let index = self.position(channel)?;
        let widget = &mut self.widgets[index];
        let mut bounds = widget.record().bounds();
        bounds.left = left;
        bounds.top = top;
        let mut record = widget.record().clone();
        record.set_bounds(bounds);
        widget.replace_record(record.clone());
        Some(record)
    }

    /// Markup per channel in document order.
    pub fn render_all(&self) -> Vec<(String, Markup)> {
        self.widgets
            .iter()
            .map(|widget| (widget.channel().to_string(), widget.render()))
            .collect()
    }
}
