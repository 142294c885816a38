//! Item-selection widgets.

use serde_json::Value;

use super::common::{channel_type, font_size, parameter, rect, svg_frame};
use super::{ChannelType, ParameterValue, PointerEvent, Widget, WidgetCore, WidgetOutput};
use crate::markup::{Element, Markup};
use crate::normalize::remap;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_at(offset: f64, row_height: f64, rows: usize) -> Option<usize> {
    if offset < 0.0 || row_height <= 0.0 {
        return None;
    }
    let index = (offset / row_height).floor() as usize;
    (index < rows).then_some(index)
}

fn item_label(record_items: &[String], index: usize, x: f64, y: f64, size: f64) -> Element {
    Element::new("text")
        .attr("x", x)
        .attr("y", y)
        .attr("font-size", size)
        .attr("dominant-baseline", "middle")
        .text(record_items.get(index).cloned().unwrap_or_default())
}

/// Drop-down list; opens on press and closes after a selection or a click
/// anywhere else in the panel.
#[derive(Debug)]
pub struct ComboBox {
    core: WidgetCore,
}

impl ComboBox {
    pub fn new(core: WidgetCore) -> Self {
        Self { core }
    }

    pub fn is_open(&self) -> bool {
        self.core.ui.open
    }

    /// Currently selected item text.
    pub fn current_item(&self) -> String {
        let record = &self.core.record;
        match record.get("value") {
            Some(Value::String(item)) => item.clone(),
            _ => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let index = record.value().max(0.0) as usize;
                record.items().get(index).cloned().unwrap_or_default()
            }
        }
    }

    fn select(&mut self, index: usize) -> Vec<WidgetOutput> {
        let items = self.core.record.items();
        let Some(item) = items.get(index).cloned() else {
            return Vec::new();
        };
        if channel_type(&self.core.record) == ChannelType::String {
            self.core.record.set("value", Value::String(item.clone()));
            return vec![parameter(&self.core, ParameterValue::Text(item), ChannelType::String)];
        }
        #[allow(clippy::cast_precision_loss)]
        let (position, count) = (index as f64, items.len() as f64);
        self.core.record.set_value(position);
        let normal = remap(position, 0.0, count, 0.0, 1.0);
        vec![parameter(&self.core, ParameterValue::Number(normal), ChannelType::Number)]
    }
}

impl Widget for ComboBox {
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
        let size = font_size(record, bounds.height * 0.5);
        let corners = record.number_or("corners", 2.0);
        let colour = record.text("colour");
        let arrow_x = bounds.width - bounds.height * 0.6;
        let mut svg = svg_frame(&bounds)
            .child(rect(0.0, 0.0, bounds.width, bounds.height, corners, &colour))
            .child(
                Element::new("text")
                    .attr("x", bounds.width / 2.0)
                    .attr("y", bounds.height / 2.0)
                    .attr("font-family", record.text("fontFamily"))
                    .attr("font-size", size)
                    .attr("fill", record.text("fontColour"))
                    .attr("text-anchor", "middle")
                    .attr("dominant-baseline", "middle")
                    .text(self.current_item()),
            )
            .child(
                Element::new("polygon")
                    .attr(
                        "points",
                        format!(
                            "{arrow_x},{top} {right},{top} {mid},{bottom}",
                            top = bounds.height * 0.4,
                            right = arrow_x + bounds.height * 0.3,
                            mid = arrow_x + bounds.height * 0.15,
                            bottom = bounds.height * 0.6,
                        ),
                    )
                    .attr("fill", record.text("fontColour")),
            );
        if self.core.ui.open {
            let items = record.items();
            let mut list = Element::new("g").attr("class", "combo-items");
            for (index, _) in items.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let top = bounds.height * (index as f64 + 1.0);
                list = list
                    .child(rect(0.0, top, bounds.width, bounds.height, 0.0, &colour))
                    .child(item_label(&items, index, 8.0, top + bounds.height / 2.0, size));
            }
            svg = svg.child(list);
        }
        svg.into()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.pressed = true;
        self.core.ui.last_pointer = event;
        if !self.core.ui.open {
            self.core.ui.open = true;
            return Vec::new();
        }
        let height = self.core.record.bounds().height;
        let rows = self.core.record.items().len();
        self.core.ui.open = false;
        match row_at(event.y - height, height, rows) {
            Some(index) => self.select(index),
            None => Vec::new(),
        }
    }

    fn click_outside(&mut self) {
        self.core.ui.open = false;
    }
}

/// Always-open list; each row press selects that row.
#[derive(Debug)]
pub struct ListBox {
    core: WidgetCore,
}

impl ListBox {
    pub fn new(core: WidgetCore) -> Self {
        Self { core }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn selected_index(&self) -> Option<usize> {
        let index = self.core.record.number("selectedIndex")?;
        (index >= 0.0).then_some(index as usize)
    }

    fn row_height(&self) -> f64 {
        let rows = self.core.record.items().len().max(1);
        #[allow(clippy::cast_precision_loss)]
        let rows = rows as f64;
        self.core.record.bounds().height / rows
    }
}

impl Widget for ListBox {
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
        let items = record.items();
        let row_height = self.row_height();
        let size = font_size(record, row_height * 0.6);
        let selected = self.selected_index();
        let mut svg = svg_frame(&bounds).child(rect(
            0.0,
            0.0,
            bounds.width,
            bounds.height,
            0.0,
            &record.text("backgroundColour"),
        ));
        for index in 0..items.len() {
            #[allow(clippy::cast_precision_loss)]
            let top = row_height * index as f64;
            if selected == Some(index) {
                svg = svg.child(rect(
                    0.0,
                    top,
                    bounds.width,
                    row_height,
                    0.0,
                    &record.text("highlightedItemColour"),
                ));
            }
            svg = svg.child(
                item_label(&items, index, 4.0, top + row_height / 2.0, size)
                    .attr("fill", record.text("fontColour")),
            );
        }
        svg.into()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.pressed = true;
        self.core.ui.last_pointer = event;
        let items = self.core.record.items();
        let Some(index) = row_at(event.y, self.row_height(), items.len()) else {
            return Vec::new();
        };
        self.core.record.set("selectedIndex", Value::from(index));
        if channel_type(&self.core.record) == ChannelType::String {
            let item = items[index].clone();
            return vec![parameter(&self.core, ParameterValue::Text(item), ChannelType::String)];
        }
        #[allow(clippy::cast_precision_loss)]
        let raw = index as f64;
        vec![parameter(&self.core, ParameterValue::Number(raw), ChannelType::Number)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WidgetRecord;
    use crate::widget::ParameterUpdate;
    use serde_json::json;

    fn combo(extra: &[(&str, Value)]) -> ComboBox {
        let mut record = WidgetRecord::from_value(json!({"type": "comboBox", "channel": "wave"})).unwrap();
        for (key, value) in extra {
            record.set(*key, value.clone());
        }
        ComboBox::new(WidgetCore::new(record))
    }

    fn update(outputs: Vec<WidgetOutput>) -> ParameterUpdate {
        match outputs.as_slice() {
            [WidgetOutput::Parameter(update)] => update.clone(),
            other => panic!("unexpected outputs {other:?}"),
        }
    }

    #[test]
    fn selecting_second_item_emits_one_third() {
        let mut wave = combo(&[]);
        assert!(wave.pointer_down(PointerEvent::at(10.0, 10.0)).is_empty());
        assert!(wave.is_open());
        // rows are 30px high and start below the 30px header
        let selected = update(wave.pointer_down(PointerEvent::at(10.0, 75.0)));
        assert_eq!(selected.value, ParameterValue::Number(1.0 / 3.0));
        assert_eq!(selected.channel_type, ChannelType::Number);
        assert!(!wave.is_open());
        assert_eq!(wave.current_item(), "Two");
    }

    #[test]
    fn string_channel_sends_item_text() {
        let mut wave = combo(&[("channelType", json!("string"))]);
        wave.pointer_down(PointerEvent::at(0.0, 0.0));
        let selected = update(wave.pointer_down(PointerEvent::at(0.0, 100.0)));
        assert_eq!(selected.value, ParameterValue::Text("Three".into()));
        assert_eq!(selected.channel_type, ChannelType::String);
        assert_eq!(wave.current_item(), "Three");
    }

    #[test]
    fn header_click_and_outside_click_close() {
        let mut wave = combo(&[]);
        wave.pointer_down(PointerEvent::at(0.0, 0.0));
        assert!(wave.pointer_down(PointerEvent::at(0.0, 5.0)).is_empty());
        assert!(!wave.is_open());

        wave.pointer_down(PointerEvent::at(0.0, 0.0));
        assert!(wave.render().find("g").is_some());
        wave.click_outside();
        assert!(!wave.is_open());
        assert!(wave.render().find("g").is_none());
    }

    #[test]
    fn list_box_sends_raw_index() {
        let record = WidgetRecord::from_value(json!({
            "type": "listBox",
            "channel": "preset",
            "height": 90,
            "items": "Warm, Bright, Dark"
        }))
        .unwrap();
        let mut list = ListBox::new(WidgetCore::new(record));
        assert_eq!(list.selected_index(), None);
        let selected = update(list.pointer_down(PointerEvent::at(5.0, 65.0)));
        assert_eq!(selected.value, ParameterValue::Number(2.0));
        assert_eq!(list.selected_index(), Some(2));
        assert!(list.pointer_down(PointerEvent::at(5.0, 95.0)).is_empty());
    }
}
