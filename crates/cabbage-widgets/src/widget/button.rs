//! Buttons, checkbox and option button.

use super::common::{emit_normalized, font_size, rect, svg_frame};
use super::{PointerEvent, Widget, WidgetCore, WidgetOutput};
use crate::markup::{Element, Markup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    /// On/off push button.
    Toggle,
    /// Checkbox with a label beside the box.
    Check,
    /// Requests a file picker instead of toggling.
    File,
    /// Cycles through `items`.
    Option,
}

#[derive(Debug)]
pub struct Button {
    core: WidgetCore,
    role: ButtonRole,
}

impl Button {
    pub fn new(core: WidgetCore, role: ButtonRole) -> Self {
        Self { core, role }
    }

    pub fn role(&self) -> ButtonRole {
        self.role
    }

    pub fn is_on(&self) -> bool {
        let range = self.core.record.range();
        (range.value - range.min).abs() > f64::EPSILON
    }

    /// Host reported the outcome of a file picker opened by this button.
    pub fn file_selected(&mut self) {
        self.toggle();
    }

    fn toggle(&mut self) -> f64 {
        let range = self.core.record.range();
        let next = if self.is_on() { range.min } else { range.max };
        self.core.record.set_value(next);
        next
    }

    fn next_option(&mut self) -> f64 {
        let count = self.core.record.items().len();
        let current = self.core.record.value().max(0.0);
        #[allow(clippy::cast_precision_loss)]
        let last = count.saturating_sub(1) as f64;
        let next = if current < last { current.floor() + 1.0 } else { 0.0 };
        self.core.record.set_value(next);
        next
    }

    fn caption(&self) -> String {
        let record = &self.core.record;
        match self.role {
            ButtonRole::Option => {
                let items = record.items();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let index = record.value().max(0.0) as usize;
                items.get(index).cloned().unwrap_or_default()
            }
            ButtonRole::Toggle if !self.is_on() => record.text("textOff"),
            _ => record.text("text"),
        }
    }
}

impl Widget for Button {
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
        let on = self.is_on();
        let (fill, font) = if on {
            (record.text("colourOn"), record.text("fontColourOn"))
        } else {
            (record.text("colourOff"), record.text("fontColourOff"))
        };
        let corners = record.number_or("corners", 2.0);
        let outline = record.text("outlineColour");
        let outline_width = record.number_or("outlineWidth", 1.0);

        if self.role == ButtonRole::Check {
            let side = bounds.height.min(bounds.width);
            let size = font_size(record, bounds.height * 0.6);
            return svg_frame(&bounds)
                .child(
                    rect(0.0, 0.0, side, side, corners, &fill)
                        .attr("stroke", &outline)
                        .attr("stroke-width", outline_width),
                )
                .child(
                    Element::new("text")
                        .attr("x", side + 4.0)
                        .attr("y", bounds.height / 2.0)
                        .attr("font-family", record.text("fontFamily"))
                        .attr("font-size", size)
                        .attr("fill", record.text("fontColour"))
                        .attr("dominant-baseline", "middle")
                        .text(record.text("text")),
                )
                .into();
        }

        // a pressed button is drawn slightly dimmed
        let opacity = if self.core.ui.pressed { 0.8 } else { 1.0 };
        let size = font_size(record, bounds.height * 0.5);
        svg_frame(&bounds)
            .child(
                rect(0.0, 0.0, bounds.width, bounds.height, corners, &fill)
                    .attr("stroke", &outline)
                    .attr("stroke-width", outline_width)
                    .attr("opacity", opacity),
            )
            .child(
                Element::new("text")
                    .attr("x", bounds.width / 2.0)
                    .attr("y", bounds.height / 2.0)
                    .attr("font-family", record.text("fontFamily"))
                    .attr("font-size", size)
                    .attr("fill", font)
                    .attr("text-anchor", "middle")
                    .attr("dominant-baseline", "middle")
                    .text(self.caption()),
            )
            .into()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.pressed = true;
        self.core.ui.last_pointer = event;
        match self.role {
            ButtonRole::File => vec![WidgetOutput::FileOpen {
                channel: self.core.record.channel.clone(),
            }],
            ButtonRole::Toggle | ButtonRole::Check => {
                let value = self.toggle();
                emit_normalized(&mut self.core, value)
            }
            ButtonRole::Option => {
                let value = self.next_option();
                emit_normalized(&mut self.core, value)
            }
        }
    }
}
