//! Continuous sliders.

use serde_json::Value;

use super::common::{emit_normalized, font_size, parameter, rect, svg_frame, text, value_text};
use super::{ChannelType, ParameterValue, PointerEvent, Widget, WidgetCore, WidgetOutput};
use crate::markup::{Element, Markup};
use crate::normalize::{clamp, normalize, remap, snap_to_increment};
use crate::record::{as_number, number_value, Range};

/// Vertical drag distance, in pixels, that sweeps a rotary slider's full range.
const ROTARY_DRAG_STEPS: f64 = 200.0;
/// Pixels of vertical drag per increment on a number slider.
const NUMBER_DRAG_PIXELS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderStyle {
    Rotary,
    Horizontal,
    Vertical,
    Number,
}

#[derive(Debug)]
pub struct Slider {
    core: WidgetCore,
    style: SliderStyle,
}

impl Slider {
    pub fn new(core: WidgetCore, style: SliderStyle) -> Self {
        Self { core, style }
    }

    pub fn style(&self) -> SliderStyle {
        self.style
    }

    fn value_at(&self, event: PointerEvent) -> f64 {
        let range = self.core.record.range();
        let bounds = self.core.record.bounds();
        match self.style {
            SliderStyle::Horizontal => {
                if bounds.width <= 0.0 {
                    return range.value;
                }
                let x = clamp(event.x, 0.0, bounds.width);
                remap(x, 0.0, bounds.width, range.min, range.max)
            }
            SliderStyle::Vertical => {
                if bounds.height <= 0.0 {
                    return range.value;
                }
                let y = clamp(bounds.height - event.y, 0.0, bounds.height);
                remap(y, 0.0, bounds.height, range.min, range.max)
            }
            SliderStyle::Rotary => {
                let origin = self.core.ui.drag_origin.unwrap_or(event);
                let diff = (range.max - range.min) * (event.y - origin.y) / ROTARY_DRAG_STEPS;
                self.core.ui.drag_start_value - diff
            }
            SliderStyle::Number => {
                let origin = self.core.ui.drag_origin.unwrap_or(event);
                let steps = (event.y - origin.y) / NUMBER_DRAG_PIXELS;
                self.core.ui.drag_start_value - steps * range.increment
            }
        }
    }

    /// Snap, clamp and store; emit when the stored value changed.
    fn commit(&mut self, raw: f64) -> Vec<WidgetOutput> {
        let range = self.core.record.range();
        let value = clamp(
            snap_to_increment(clamp(raw, range.min, range.max), range.increment),
            range.min,
            range.max,
        );
        if self.core.ui.last_emitted == Some(value) {
            return Vec::new();
        }
        self.core.record.set_value(value);
        emit_normalized(&mut self.core, value)
    }

    fn popup_visible(&self) -> bool {
        (self.core.ui.hovered || self.core.ui.pressed) && self.core.record.flag("popup")
    }

    fn render_rotary(&self, range: &Range, normal: f64) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let (cx, cy) = (bounds.width / 2.0, bounds.height / 2.0);
        let radius = bounds.width.min(bounds.height) / 2.0 * 0.85;
        let tracker_width = record.number_or("trackerWidth", 20.0) / 100.0 * radius;
        let mut svg = svg_frame(&bounds)
            .child(arc(cx, cy, radius, 0.0, 1.0, &record.text("trackerBackgroundColour"), tracker_width))
            .child(arc(cx, cy, radius, 0.0, normal, &record.text("trackerColour"), tracker_width))
            .child(
                Element::new("circle")
                    .attr("cx", cx)
                    .attr("cy", cy)
                    .attr("r", (radius - tracker_width).max(0.0))
                    .attr("fill", record.text("colour"))
                    .attr("stroke", record.text("outlineColour"))
                    .attr("stroke-width", record.number_or("outlineWidth", 2.0)),
            );
        let label = record.text("text");
        if !label.is_empty() {
            let size = font_size(record, bounds.height * 0.15);
            svg = svg.child(text(cx, bounds.height - size / 2.0, &label, record, size));
        }
        if self.popup_visible() {
            let size = font_size(record, bounds.height * 0.2);
            svg = svg.child(text(cx, cy, &value_text(&self.core, range.value), record, size));
        }
        svg
    }

    fn render_linear(&self, range: &Range, normal: f64) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let thumb = 8.0_f64.min(bounds.width.min(bounds.height));
        let mut svg = svg_frame(&bounds);
        if self.style == SliderStyle::Horizontal {
            let track_height = bounds.height / 3.0;
            let track_y = (bounds.height - track_height) / 2.0;
            let position = normal * (bounds.width - thumb);
            svg = svg
                .child(rect(0.0, track_y, bounds.width, track_height, 2.0, &record.text("trackerBackgroundColour")))
                .child(rect(0.0, track_y, position, track_height, 2.0, &record.text("trackerColour")))
                .child(rect(position, 0.0, thumb, bounds.height, 2.0, &record.text("colour")));
        } else {
            let track_width = bounds.width / 3.0;
            let track_x = (bounds.width - track_width) / 2.0;
            let position = (1.0 - normal) * (bounds.height - thumb);
            svg = svg
                .child(rect(track_x, 0.0, track_width, bounds.height, 2.0, &record.text("trackerBackgroundColour")))
                .child(rect(track_x, position, track_width, bounds.height - position, 2.0, &record.text("trackerColour")))
                .child(rect(0.0, position, bounds.width, thumb, 2.0, &record.text("colour")));
        }
        if self.popup_visible() {
            let size = font_size(record, bounds.height.min(bounds.width) * 0.6);
            svg = svg.child(text(
                bounds.width / 2.0,
                bounds.height / 2.0,
                &value_text(&self.core, range.value),
                record,
                size,
            ));
        }
        svg
    }

    fn render_number(&self, range: &Range) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let size = font_size(record, bounds.height * 0.5);
        svg_frame(&bounds)
            .child(
                rect(0.0, 0.0, bounds.width, bounds.height, 4.0, &record.text("colour"))
                    .attr("stroke", record.text("outlineColour"))
                    .attr("stroke-width", record.number_or("outlineWidth", 2.0)),
            )
            .child(text(
                bounds.width / 2.0,
                bounds.height / 2.0,
                &value_text(&self.core, range.value),
                record,
                size,
            ))
    }
}

/// Arc of a rotary track covering `[from, to]` of the 270 degree sweep.
fn arc(cx: f64, cy: f64, radius: f64, from: f64, to: f64, colour: &str, width: f64) -> Element {
    let angle = |normal: f64| (-135.0 + 270.0 * normal).to_radians();
    let point = |theta: f64| (cx + radius * theta.sin(), cy - radius * theta.cos());
    let (x0, y0) = point(angle(from));
    let (x1, y1) = point(angle(to));
    let large_arc = u8::from((to - from) * 270.0 > 180.0);
    Element::new("path")
        .attr(
            "d",
            format!("M {x0:.2} {y0:.2} A {radius:.2} {radius:.2} 0 {large_arc} 1 {x1:.2} {y1:.2}"),
        )
        .attr("stroke", colour)
        .attr("stroke-width", format!("{width:.2}"))
        .attr("fill", "none")
}

impl Widget for Slider {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&self) -> Markup {
        let record = &self.core.record;
        if !record.visible() {
            return Markup::Empty;
        }
        let range = record.range();
        let normal = normalize(range.value, range.min, range.max).map_or(0.0, |n| clamp(n, 0.0, 1.0));
        let svg = match self.style {
            SliderStyle::Rotary => self.render_rotary(&range, normal),
            SliderStyle::Horizontal | SliderStyle::Vertical => self.render_linear(&range, normal),
            SliderStyle::Number => self.render_number(&range),
        };
        svg.into()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        let ui = &mut self.core.ui;
        ui.pressed = true;
        ui.last_pointer = event;
        ui.drag_origin = Some(event);
        ui.drag_start_value = self.core.record.value();
        ui.last_emitted = Some(ui.drag_start_value);
        match self.style {
            SliderStyle::Horizontal | SliderStyle::Vertical => {
                let raw = self.value_at(event);
                self.commit(raw)
            }
            SliderStyle::Rotary | SliderStyle::Number => Vec::new(),
        }
    }

    fn pointer_move(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.last_pointer = event;
        if !self.core.ui.pressed {
            return Vec::new();
        }
        let raw = self.value_at(event);
        self.commit(raw)
    }

    fn pointer_up(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        let was_pressed = self.core.ui.pressed;
        let ui = &mut self.core.ui;
        ui.pressed = false;
        ui.drag_origin = None;
        ui.last_pointer = event;
        let value = self.core.record.value();
        if was_pressed && self.core.ui.last_emitted != Some(value) {
            return emit_normalized(&mut self.core, value);
        }
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Thumb {
    Low,
    High,
}

impl Thumb {
    const fn key(self) -> &'static str {
        match self {
            Self::Low => "minValue",
            Self::High => "maxValue",
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Low => "_min",
            Self::High => "_max",
        }
    }
}

/// Two-thumb horizontal slider selecting a sub-range.
///
/// Each thumb reports on its own channel, `<channel>_min` and `<channel>_max`.
#[derive(Debug)]
pub struct RangeSlider {
    core: WidgetCore,
    active: Option<Thumb>,
}

impl RangeSlider {
    pub fn new(core: WidgetCore) -> Self {
        Self { core, active: None }
    }

    pub fn values(&self) -> (f64, f64) {
        let range = self.core.record.range();
        (
            self.core.record.number_or("minValue", range.min),
            self.core.record.number_or("maxValue", range.max),
        )
    }

    fn value_at(&self, x: f64) -> f64 {
        let range = self.core.record.range();
        let width = self.core.record.bounds().width;
        if width <= 0.0 {
            return range.min;
        }
        let raw = remap(clamp(x, 0.0, width), 0.0, width, range.min, range.max);
        clamp(snap_to_increment(raw, range.increment), range.min, range.max)
    }

    fn move_thumb(&mut self, thumb: Thumb, value: f64) -> Vec<WidgetOutput> {
        let (low, high) = self.values();
        let value = match thumb {
            Thumb::Low => value.min(high),
            Thumb::High => value.max(low),
        };
        let current = match thumb {
            Thumb::Low => low,
            Thumb::High => high,
        };
        #[allow(clippy::float_cmp)]
        let unchanged = current == value;
        if unchanged {
            return Vec::new();
        }
        self.core.record.set(thumb.key(), number_value(value));
        let range = self.core.record.range();
        let Ok(normal) = normalize(value, range.min, range.max) else {
            tracing::warn!("channel '{}': degenerate range", self.core.record.channel);
            return Vec::new();
        };
        let mut output = parameter(&self.core, ParameterValue::Number(normal), ChannelType::Number);
        if let WidgetOutput::Parameter(update) = &mut output {
            update.channel.push_str(thumb.suffix());
        }
        vec![output]
    }
}

impl Widget for RangeSlider {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&self) -> Markup {
        let record = &self.core.record;
        if !record.visible() {
            return Markup::Empty;
        }
        let bounds = record.bounds();
        let range = record.range();
        let (low, high) = self.values();
        let thumb = record.number_or("thumbWidth", 8.0);
        let span = (bounds.width - thumb).max(0.0);
        let position = |value: f64| normalize(value, range.min, range.max).map_or(0.0, |n| clamp(n, 0.0, 1.0)) * span;
        let (x0, x1) = (position(low), position(high));
        let track_height = bounds.height / 3.0;
        let track_y = (bounds.height - track_height) / 2.0;
        svg_frame(&bounds)
            .child(rect(0.0, track_y, bounds.width, track_height, 2.0, &record.text("trackerBackgroundColour")))
            .child(rect(x0, track_y, x1 - x0 + thumb, track_height, 0.0, &record.text("trackerColour")))
            .child(rect(x0, 0.0, thumb, bounds.height, 2.0, &record.text("colour")))
            .child(rect(x1, 0.0, thumb, bounds.height, 2.0, &record.text("colour")))
            .into()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.pressed = true;
        self.core.ui.last_pointer = event;
        let value = self.value_at(event.x);
        let (low, high) = self.values();
        let thumb = if (value - low).abs() <= (value - high).abs() && value <= high {
            Thumb::Low
        } else {
            Thumb::High
        };
        self.active = Some(thumb);
        self.move_thumb(thumb, value)
    }

    fn pointer_move(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.last_pointer = event;
        match self.active {
            Some(thumb) if self.core.ui.pressed => {
                let value = self.value_at(event.x);
                self.move_thumb(thumb, value)
            }
            _ => Vec::new(),
        }
    }

    fn pointer_up(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.active = None;
        self.core.ui.pressed = false;
        self.core.ui.last_pointer = event;
        Vec::new()
    }

    fn set_value(&mut self, value: &Value) {
        if let Value::Array(pair) = value {
            for (thumb, entry) in [Thumb::Low, Thumb::High].into_iter().zip(pair) {
                if let Some(number) = as_number(entry) {
                    self.core.record.set(thumb.key(), number_value(number));
                }
            }
        }
    }
}
