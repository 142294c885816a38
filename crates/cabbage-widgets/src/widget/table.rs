//! Function-table display backed by an offscreen raster.

use serde_json::Value;

use super::{Widget, WidgetCore};
use crate::markup::{Element, Markup};
use crate::normalize::remap;
use crate::record::{as_number, WidgetRecord};

const MAX_SURFACE_SIDE: usize = 4096;

pub type Rgba = [u8; 4];

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`; anything else is opaque black.
pub fn parse_colour(text: &str) -> Rgba {
    let hex = text.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };
    let parsed = match hex.len() {
        3 => {
            let short = |index: usize| channel(index..index + 1).map(|value| value * 17);
            short(0)
                .zip(short(1))
                .zip(short(2))
                .map(|((r, g), b)| [r, g, b, 255])
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 { channel(6..8) } else { Some(255) };
            channel(0..2)
                .zip(channel(2..4))
                .zip(channel(4..6))
                .zip(alpha)
                .map(|(((r, g), b), a)| [r, g, b, a])
        }
        _ => None,
    };
    parsed.unwrap_or([0, 0, 0, 255])
}

/// Row-major RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl RasterSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn fill(&mut self, colour: Rgba) {
        self.pixels.fill(colour);
    }

    /// Vertical span between two rows, inclusive.
    pub fn vertical_line(&mut self, x: usize, from: usize, to: usize, colour: Rgba) {
        if x >= self.width || self.height == 0 {
            return;
        }
        let (top, bottom) = (from.min(to), from.max(to).min(self.height - 1));
        for y in top..=bottom {
            self.pixels[y * self.width + x] = colour;
        }
    }
}

/// Table widget. Redraws its surface whenever the samples or size change.
#[derive(Debug)]
pub struct GenTable {
    core: WidgetCore,
    surface: RasterSurface,
}

impl GenTable {
    pub fn new(core: WidgetCore) -> Self {
        let mut table = Self {
            core,
            surface: RasterSurface::new(0, 0),
        };
        table.redraw();
        table
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Samples inside the `startSample..=endSample` window.
    pub fn samples(&self) -> Vec<f64> {
        let all: Vec<f64> = match self.core.record.get("samples") {
            Some(Value::Array(values)) => values.iter().filter_map(as_number).collect(),
            _ => Vec::new(),
        };
        window(&self.core.record, all)
    }

    pub fn set_samples(&mut self, samples: &[f64]) {
        let values = samples.iter().map(|sample| Value::from(*sample)).collect();
        self.core.record.set("samples", Value::Array(values));
        self.redraw();
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn redraw(&mut self) {
        let record = &self.core.record;
        let bounds = record.bounds();
        let width = (bounds.width.max(0.0).round() as usize).min(MAX_SURFACE_SIDE);
        let height = (bounds.height.max(0.0).round() as usize).min(MAX_SURFACE_SIDE);
        let mut surface = RasterSurface::new(width, height);
        surface.fill(parse_colour(&record.text("backgroundColour")));

        let samples = self.samples();
        if samples.is_empty() || width == 0 || height == 0 {
            self.surface = surface;
            return;
        }
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bottom = (height - 1) as f64;
        let row = |sample: f64| -> usize {
            if (max - min).abs() < f64::EPSILON {
                return height / 2;
            }
            remap(sample, min, max, bottom, 0.0).round().clamp(0.0, bottom) as usize
        };
        let baseline = if min <= 0.0 && max >= 0.0 {
            row(0.0)
        } else {
            height - 1
        };
        let colour = parse_colour(&record.text("colour"));
        for x in 0..width {
            let index = x * samples.len() / width;
            surface.vertical_line(x, baseline, row(samples[index]), colour);
        }
        self.surface = surface;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn window(record: &WidgetRecord, samples: Vec<f64>) -> Vec<f64> {
    let start = record.number_or("startSample", -1.0);
    let end = record.number_or("endSample", -1.0);
    if start < 0.0 && end < 0.0 {
        return samples;
    }
    let first = if start < 0.0 { 0 } else { start as usize };
    let last = if end < 0.0 {
        samples.len()
    } else {
        (end as usize + 1).min(samples.len())
    };
    samples.get(first..last).map(<[f64]>::to_vec).unwrap_or_default()
}

impl Widget for GenTable {
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
        Element::new("canvas")
            .attr("data-channel", &record.channel)
            .attr("width", self.surface.width())
            .attr("height", self.surface.height())
            .attr(
                "style",
                format!(
                    "border: {}px solid {}",
                    record.number_or("outlineWidth", 1.0),
                    record.text("outlineColour")
                ),
            )
            .into()
    }

    fn replace_record(&mut self, record: WidgetRecord) {
        self.core.record = record;
        self.core.refresh_cache();
        self.redraw();
    }

    fn set_value(&mut self, value: &Value) {
        if let Value::Array(values) = value {
            let samples: Vec<f64> = values.iter().filter_map(as_number).collect();
            self.set_samples(&samples);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(samples: Value) -> GenTable {
        let record = WidgetRecord::from_value(json!({
            "type": "gentable",
            "channel": "table1",
            "width": 4,
            "height": 5,
            "colour": "#ff0000",
            "backgroundColour": "#000000",
            "samples": samples
        }))
        .unwrap();
        GenTable::new(WidgetCore::new(record))
    }

    const RED: Rgba = [255, 0, 0, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    #[test]
    fn colours_parse_in_all_lengths() {
        assert_eq!(parse_colour("#0295cf"), [0x02, 0x95, 0xcf, 255]);
        assert_eq!(parse_colour("#88888800"), [0x88, 0x88, 0x88, 0]);
        assert_eq!(parse_colour("#fff"), [255, 255, 255, 255]);
        assert_eq!(parse_colour("green"), [0, 0, 0, 255]);
    }

    #[test]
    fn samples_are_scaled_between_their_min_and_max() {
        // min 2 maps to the bottom row, max 10 to the top row
        let table = table(json!([2, 10, 6, 2]));
        let surface = table.surface();
        assert_eq!((surface.width(), surface.height()), (4, 5));
        assert_eq!(surface.pixel(0, 4), Some(RED));
        assert_eq!(surface.pixel(0, 3), Some(BLACK));
        assert_eq!(surface.pixel(1, 0), Some(RED));
        assert_eq!(surface.pixel(2, 2), Some(RED));
        assert_eq!(surface.pixel(2, 1), Some(BLACK));
    }

    #[test]
    fn bipolar_samples_draw_from_zero_line() {
        let table = table(json!([-1, 1, 0, 1]));
        let surface = table.surface();
        // zero sits on row 2
        assert_eq!(surface.pixel(0, 4), Some(RED));
        assert_eq!(surface.pixel(0, 1), Some(BLACK));
        assert_eq!(surface.pixel(1, 0), Some(RED));
        assert_eq!(surface.pixel(1, 3), Some(BLACK));
    }

    #[test]
    fn new_samples_trigger_redraw() {
        let mut table = table(json!([]));
        assert_eq!(table.surface().pixel(0, 4), Some(BLACK));
        table.set_value(&json!([0, 1, 1, 0]));
        assert_eq!(table.surface().pixel(1, 0), Some(RED));
        assert_eq!(table.samples(), vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn sample_window_limits_range() {
        let mut record = WidgetRecord::new(crate::kind::WidgetKind::GenTable, "t");
        record.set("startSample", json!(1));
        record.set("endSample", json!(2));
        assert_eq!(window(&record, vec![0.0, 1.0, 2.0, 3.0]), vec![1.0, 2.0]);
    }
}
