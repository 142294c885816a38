//! Reordering records by visual hierarchy.
//!
//! Forms come first. Every other record is attached to the smallest group
//! box containing its centre, and each level is sorted into rows (top to
//! bottom, then left to right) with group children following their group.

use cabbage_widgets::{Bounds, WidgetKind, WidgetRecord};

/// Default distance in pixels within which two tops share a row.
pub const ROW_TOLERANCE: f64 = 5.0;

pub fn reorder(records: Vec<WidgetRecord>, row_tolerance: f64) -> Vec<WidgetRecord> {
    let bounds: Vec<Bounds> = records.iter().map(WidgetRecord::bounds).collect();
    let groups: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.kind == WidgetKind::GroupBox)
        .map(|(index, _)| index)
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();
    let mut forms = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if record.is_form() {
            forms.push(index);
            continue;
        }
        match parent_group(index, &bounds, &groups) {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let mut order = forms;
    flatten(roots, &children, &bounds, row_tolerance, &mut order);

    let mut slots: Vec<Option<WidgetRecord>> = records.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

/// Smallest group box holding the centre of `index`. A group may only sit
/// inside a larger one (or an equal one listed earlier), so nesting is acyclic.
fn parent_group(index: usize, bounds: &[Bounds], groups: &[usize]) -> Option<usize> {
    let (x, y) = bounds[index].center();
    let rank = |candidate: usize| (bounds[candidate].area(), candidate);
    groups
        .iter()
        .copied()
        .filter(|&group| group != index && bounds[group].contains(x, y))
        .filter(|&group| {
            !groups.contains(&index) || {
                let (area, position) = rank(group);
                let (own_area, own_position) = rank(index);
                area > own_area || (area == own_area && position < own_position)
            }
        })
        .min_by(|&left, &right| {
            bounds[left]
                .area()
                .total_cmp(&bounds[right].area())
                .then(left.cmp(&right))
        })
}

fn flatten(
    mut level: Vec<usize>,
    children: &[Vec<usize>],
    bounds: &[Bounds],
    row_tolerance: f64,
    order: &mut Vec<usize>,
) {
    sort_by_rows(&mut level, bounds, row_tolerance);
    for index in level {
        order.push(index);
        if !children[index].is_empty() {
            flatten(children[index].clone(), children, bounds, row_tolerance, order);
        }
    }
}

/// Sort by top, group tops within `row_tolerance` of a row's first entry,
/// then sort each row by left.
fn sort_by_rows(level: &mut [usize], bounds: &[Bounds], row_tolerance: f64) {
    level.sort_by(|&a, &b| bounds[a].top.total_cmp(&bounds[b].top));
    let mut start = 0;
    while start < level.len() {
        let row_top = bounds[level[start]].top;
        let end = level[start..]
            .iter()
            .position(|&index| bounds[index].top - row_top > row_tolerance)
            .map_or(level.len(), |offset| start + offset);
        level[start..end].sort_by(|&a, &b| bounds[a].left.total_cmp(&bounds[b].left));
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channels(records: &[WidgetRecord]) -> Vec<&str> {
        records.iter().map(|record| record.channel.as_str()).collect()
    }

    fn records(value: serde_json::Value) -> Vec<WidgetRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rows_then_columns_with_tolerance() {
        let list = records(json!([
            {"type": "button", "channel": "c", "bounds": [200, 12, 10, 10]},
            {"type": "form"},
            {"type": "button", "channel": "a", "bounds": [10, 50, 10, 10]},
            {"type": "button", "channel": "b", "bounds": [100, 10, 10, 10]},
            {"type": "button", "channel": "d", "bounds": [5, 14, 10, 10]}
        ]));
        let sorted = reorder(list, ROW_TOLERANCE);
        assert_eq!(channels(&sorted), vec!["MainForm", "d", "b", "c", "a"]);
    }

    #[test]
    fn group_children_follow_their_smallest_group() {
        let list = records(json!([
            {"type": "rotarySlider", "channel": "inner_knob", "bounds": [60, 60, 20, 20]},
            {"type": "groupBox", "channel": "outer", "bounds": [0, 0, 300, 300]},
            {"type": "label", "channel": "free", "bounds": [400, 0, 50, 20]},
            {"type": "groupBox", "channel": "inner", "bounds": [50, 50, 100, 100]},
            {"type": "button", "channel": "outer_button", "bounds": [200, 200, 20, 20]},
            {"type": "form"}
        ]));
        let sorted = reorder(list, ROW_TOLERANCE);
        assert_eq!(
            channels(&sorted),
            vec!["MainForm", "outer", "inner", "inner_knob", "outer_button", "free"]
        );
    }

    #[test]
    fn identical_groups_do_not_swallow_each_other() {
        let list = records(json!([
            {"type": "groupBox", "channel": "g1", "bounds": [0, 0, 100, 100]},
            {"type": "groupBox", "channel": "g2", "bounds": [0, 0, 100, 100]},
            {"type": "button", "channel": "b", "bounds": [10, 10, 10, 10]}
        ]));
        let sorted = reorder(list, ROW_TOLERANCE);
        assert_eq!(channels(&sorted), vec!["g1", "g2", "b"]);
    }
}
