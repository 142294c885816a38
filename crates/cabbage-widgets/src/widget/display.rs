//! Display-only widgets. They never emit parameter updates.

use super::common::{font_size, rect, svg_frame, text, text_anchor};
use super::{Widget, WidgetCore};
use crate::kind::WidgetKind;
use crate::markup::{Element, Markup};

#[derive(Debug)]
pub struct Display {
    core: WidgetCore,
}

impl Display {
    pub fn new(core: WidgetCore) -> Self {
        Self { core }
    }

    fn render_label(&self) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let x = match record.text("align").as_str() {
            "left" => bounds.width * 0.1,
            "right" => bounds.width * 0.9,
            _ => bounds.width / 2.0,
        };
        svg_frame(&bounds)
            .child(rect(
                0.0,
                0.0,
                bounds.width,
                bounds.height,
                record.number_or("corners", 4.0),
                &record.text("colour"),
            ))
            .child(text(
                x,
                bounds.height / 2.0,
                &record.text("text"),
                record,
                font_size(record, bounds.height),
            ))
    }

    fn render_group(&self) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let stroke = record.text("outlineColour");
        let stroke_width = record.number_or("outlineWidth", 1.0);
        let size = font_size(record, bounds.height * 0.3).min(bounds.height);
        let caption = record.text("text");
        let line_y = stroke_width / 2.0 + size / 2.0;
        // the top border leaves a gap around the caption
        #[allow(clippy::cast_precision_loss)]
        let caption_width = caption.chars().count() as f64 * size / 2.0;
        let gap_start = (bounds.width - caption_width) / 2.0 - 5.0;
        let gap_end = (bounds.width + caption_width) / 2.0 + 5.0;
        let line = |x1: f64, y1: f64, x2: f64, y2: f64| {
            Element::new("line")
                .attr("x1", x1)
                .attr("y1", y1)
                .attr("x2", x2)
                .attr("y2", y2)
                .attr("stroke", &stroke)
                .attr("stroke-width", stroke_width)
        };
        let edge = bounds.height - stroke_width / 2.0;
        svg_frame(&bounds)
            .child(line(0.0, line_y, gap_start.max(0.0), line_y))
            .child(line(gap_end.min(bounds.width), line_y, bounds.width, line_y))
            .child(line(0.0, edge, bounds.width, edge))
            .child(line(stroke_width / 2.0, line_y, stroke_width / 2.0, edge))
            .child(line(bounds.width - stroke_width / 2.0, line_y, bounds.width - stroke_width / 2.0, edge))
            .child(text(bounds.width / 2.0, size / 2.0, &caption, record, size))
    }

    fn render_image(&self) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let outline = record.number_or("outlineWidth", 1.0);
        let mut svg = svg_frame(&bounds).child(
            rect(
                outline / 2.0,
                outline / 2.0,
                bounds.width - outline,
                bounds.height - outline,
                record.number_or("corners", 4.0),
                &record.text("colour"),
            )
            .attr("stroke", record.text("outlineColour"))
            .attr("stroke-width", outline),
        );
        let file = record.text("file");
        if !file.is_empty() {
            svg = svg.child(
                Element::new("image")
                    .attr("href", file)
                    .attr("width", bounds.width)
                    .attr("height", bounds.height)
                    .attr("preserveAspectRatio", "none"),
            );
        }
        svg
    }

    fn render_text_area(&self) -> Element {
        let record = &self.core.record;
        let bounds = record.bounds();
        let readonly = record.kind == WidgetKind::CsoundOutput;
        let mut area = Element::new("textarea")
            .attr(
                "style",
                format!(
                    "width: 100%; height: 100%; background-color: {}; color: {}; \
                     font-family: {}; font-size: {}px; text-align: {}",
                    record.text("colour"),
                    record.text("fontColour"),
                    record.text("fontFamily"),
                    font_size(record, bounds.height * 0.1),
                    text_anchor(&record.text("align")),
                ),
            )
            .text(record.text("text"));
        if readonly {
            area = area.attr("readonly", "readonly");
        }
        area
    }
}

impl Widget for Display {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&self) -> Markup {
        if !self.core.record.visible() {
            return Markup::Empty;
        }
        match self.core.record.kind {
            WidgetKind::GroupBox => self.render_group(),
            WidgetKind::Image => self.render_image(),
            WidgetKind::CsoundOutput | WidgetKind::TextEditor => self.render_text_area(),
            _ => self.render_label(),
        }
        .into()
    }
}
