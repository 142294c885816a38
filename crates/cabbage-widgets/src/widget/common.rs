//! Helpers shared across widget variants.

use tracing::warn;

use super::{ChannelType, ParameterUpdate, ParameterValue, WidgetCore, WidgetOutput};
use crate::markup::Element;
use crate::normalize::{format_value, normalize};
use crate::record::{Bounds, WidgetRecord};

/// Normalize `value` into `[0, 1]` and wrap it in a parameter update.
///
/// A zero-width range is a configuration error in the record; the update is
/// dropped and logged rather than propagated into the render loop.
pub(super) fn emit_normalized(core: &mut WidgetCore, value: f64) -> Vec<WidgetOutput> {
    let range = core.record.range();
    match normalize(value, range.min, range.max) {
        Ok(normal) => {
            core.ui.last_emitted = Some(value);
            vec![parameter(core, ParameterValue::Number(normal), ChannelType::Number)]
        }
        Err(err) => {
            warn!("channel '{}': {err}", core.record.channel);
            Vec::new()
        }
    }
}

pub(super) fn parameter(
    core: &WidgetCore,
    value: ParameterValue,
    channel_type: ChannelType,
) -> WidgetOutput {
    WidgetOutput::Parameter(ParameterUpdate {
        parameter_index: core.parameter_index,
        channel: core.record.channel.clone(),
        value,
        channel_type,
    })
}

pub(super) fn channel_type(record: &WidgetRecord) -> ChannelType {
    if record.text("channelType").eq_ignore_ascii_case("string") {
        ChannelType::String
    } else {
        ChannelType::Number
    }
}

/// Text shown for a value, with prefix and postfix.
pub(super) fn value_text(core: &WidgetCore, value: f64) -> String {
    let record = &core.record;
    format!(
        "{}{}{}",
        record.text("valuePrefix"),
        format_value(value, record.range().increment),
        record.text("valuePostfix")
    )
}

pub(super) fn svg_frame(bounds: &Bounds) -> Element {
    Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("viewBox", format!("0 0 {} {}", bounds.width, bounds.height))
        .attr("width", "100%")
        .attr("height", "100%")
        .attr("preserveAspectRatio", "none")
}

pub(super) fn rect(x: f64, y: f64, width: f64, height: f64, corners: f64, fill: &str) -> Element {
    Element::new("rect")
        .attr("x", x)
        .attr("y", y)
        .attr("width", width.max(0.0))
        .attr("height", height.max(0.0))
        .attr("rx", corners)
        .attr("ry", corners)
        .attr("fill", fill)
}

/// Font size from the record, or `fallback` when it is 0.
pub(super) fn font_size(record: &WidgetRecord, fallback: f64) -> f64 {
    let size = record.number_or("fontSize", 0.0);
    if size > 0.0 {
        size
    } else {
        fallback.max(12.0)
    }
}

pub(super) fn text_anchor(align: &str) -> &'static str {
    match align {
        "left" => "start",
        "right" => "end",
        _ => "middle",
    }
}

pub(super) fn text(x: f64, y: f64, content: &str, record: &WidgetRecord, size: f64) -> Element {
    Element::new("text")
        .attr("x", x)
        .attr("y", y)
        .attr("font-family", record.text("fontFamily"))
        .attr("font-size", size)
        .attr("fill", record.text("fontColour"))
        .attr("text-anchor", text_anchor(&record.text("align")))
        .attr("dominant-baseline", "middle")
        .text(content)
}
