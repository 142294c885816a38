//! Copy and paste of widget records.

use cabbage_widgets::normalize::unique_channel;
use cabbage_widgets::WidgetRecord;
use tracing::debug;

/// Default paste offset in pixels along both axes.
pub const PASTE_OFFSET: f64 = 20.0;

/// Key prefix for comment entries, which are not copied.
const COMMENT_PREFIX: &str = "//";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    records: Vec<WidgetRecord>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Copy the records named by `channels`, in document order. Forms and
    /// records of an unrecognized type are never copied.
    pub fn copy(&mut self, records: &[WidgetRecord], channels: &[String]) -> usize {
        self.records = records
            .iter()
            .filter(|record| {
                !record.is_form() && !record.is_unknown() && channels.contains(&record.channel)
            })
            .cloned()
            .map(|mut record| {
                record
                    .properties
                    .retain(|key, _| !key.starts_with(COMMENT_PREFIX));
                record
            })
            .collect();
        debug!("copied {} widget(s)", self.records.len());
        self.records.len()
    }

    /// Clipboard records with fresh channels, moved by `offset`.
    pub fn prepare_paste(&self, existing: &[WidgetRecord], offset: (f64, f64)) -> Vec<WidgetRecord> {
        let mut taken: Vec<String> = existing.iter().map(|record| record.channel.clone()).collect();
        let mut pasted = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut record = record.clone();
            let channel = unique_channel(channel_stem(&record.channel), &taken);
            taken.push(channel.clone());
            record.channel = channel;
            let mut bounds = record.bounds();
            bounds.left += offset.0;
            bounds.top += offset.1;
            record.set_bounds(bounds);
            pasted.push(record);
        }
        pasted
    }
}

/// Channel with its numeric suffix removed, so `gain2` pastes as `gainN`.
fn channel_stem(channel: &str) -> &str {
    let stem = channel.trim_end_matches(|ch: char| ch.is_ascii_digit());
    if stem.is_empty() {
        channel
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<WidgetRecord> {
        serde_json::from_value(json!([
            {"type": "form"},
            {"type": "rotarySlider", "channel": "gain1", "bounds": [10, 10, 60, 60], "// note": "x"},
            {"type": "button", "channel": "mute", "left": 100, "top": 20}
        ]))
        .unwrap()
    }

    #[test]
    fn copy_skips_forms_and_comment_keys() {
        let mut clipboard = Clipboard::new();
        let copied = clipboard.copy(
            &records(),
            &["mute".to_string(), "gain1".to_string(), "MainForm".to_string()],
        );
        assert_eq!(copied, 2);
        assert!(clipboard.records[0].get("// note").is_none());
        assert_eq!(clipboard.records[1].channel, "mute");
    }

    #[test]
    fn copy_skips_unrecognized_records() {
        let records: Vec<WidgetRecord> = serde_json::from_value(json!([
            {"type": "xyPad", "channel": "xy"},
            {"type": "hslider", "channel": "pan"}
        ]))
        .unwrap();
        let mut clipboard = Clipboard::new();
        assert_eq!(clipboard.copy(&records, &["xy".to_string(), "pan".to_string()]), 1);
        assert_eq!(clipboard.records[0].tag(), "hslider");
    }

    #[test]
    fn paste_generates_channels_and_offsets() {
        let existing = records();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&existing, &["gain1".to_string(), "mute".to_string()]);
        let pasted = clipboard.prepare_paste(&existing, (PASTE_OFFSET, PASTE_OFFSET));
        let summary: Vec<_> = pasted
            .iter()
            .map(|record| (record.channel.as_str(), record.bounds().left, record.bounds().top))
            .collect();
        assert_eq!(summary, vec![("gain4", 30.0, 30.0), ("mute5", 120.0, 40.0)]);
        assert_eq!(pasted[0].get("bounds"), Some(&json!([30, 30, 60, 60])));
    }

    #[test]
    fn numeric_channels_keep_their_name_as_stem() {
        assert_eq!(channel_stem("42"), "42");
        assert_eq!(channel_stem("osc2freq3"), "osc2freq");
    }
}
