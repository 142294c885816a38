//! On-screen MIDI keyboard.

use super::common::{rect, svg_frame};
use super::{PointerEvent, Widget, WidgetCore, WidgetOutput};
use crate::markup::{Element, Markup};

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
const WHITE_SEMITONES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Black key semitone and the white key index it sits after.
const BLACK_KEYS: [(u8, usize); 5] = [(1, 0), (3, 1), (6, 3), (8, 4), (10, 5)];
const BLACK_HEIGHT: f64 = 0.6;
const BLACK_WIDTH: f64 = 0.6;

/// Keyboard whose leftmost key is the note held in `value`.
#[derive(Debug)]
pub struct MidiKeyboard {
    core: WidgetCore,
    held: Option<u8>,
}

impl MidiKeyboard {
    pub fn new(core: WidgetCore) -> Self {
        Self { core, held: None }
    }

    pub fn held_note(&self) -> Option<u8> {
        self.held
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn octaves(&self) -> usize {
        self.core.record.number_or("octaves", 5.0).max(1.0) as usize
    }

    #[allow(clippy::cast_precision_loss)]
    fn white_width(&self) -> f64 {
        self.core.record.bounds().width / (self.octaves() * 7) as f64
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn base_note(&self) -> u32 {
        self.core.record.value().clamp(0.0, 127.0) as u32
    }

    fn note(&self, octave: usize, semitone: u8) -> Option<u8> {
        let offset = u32::try_from(octave * 12).ok()? + u32::from(semitone);
        u8::try_from(self.base_note() + offset)
            .ok()
            .filter(|note| *note <= 127)
    }

    #[allow(clippy::cast_precision_loss)]
    fn black_key_x(&self, octave: usize, after_white: usize) -> f64 {
        let white = self.white_width();
        (octave * 7 + after_white + 1) as f64 * white - white * BLACK_WIDTH / 2.0
    }

    /// Note under the pointer; black keys take priority in their upper area.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn note_at(&self, event: PointerEvent) -> Option<u8> {
        let bounds = self.core.record.bounds();
        if event.x < 0.0 || event.x >= bounds.width || event.y < 0.0 || event.y > bounds.height {
            return None;
        }
        let white = self.white_width();
        if event.y < bounds.height * BLACK_HEIGHT {
            for octave in 0..self.octaves() {
                for (semitone, after) in BLACK_KEYS {
                    let x = self.black_key_x(octave, after);
                    if event.x >= x && event.x < x + white * BLACK_WIDTH {
                        return self.note(octave, semitone);
                    }
                }
            }
        }
        let index = (event.x / white).floor() as usize;
        self.note(index / 7, WHITE_SEMITONES[index % 7])
    }

    fn message(&self, status: u8, note: u8, velocity: u8) -> WidgetOutput {
        WidgetOutput::Midi {
            channel: self.core.record.channel.clone(),
            message: [status, note, velocity],
        }
    }

    fn release(&mut self) -> Vec<WidgetOutput> {
        match self.held.take() {
            Some(note) => vec![self.message(NOTE_OFF, note, 0)],
            None => Vec::new(),
        }
    }
}

impl Widget for MidiKeyboard {
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
        let white = self.white_width();
        let outline = record.text("outlineColour");
        let keydown = record.text("keydownColour");
        let fill_for = |note: Option<u8>, idle: String| {
            if note.is_some() && note == self.held {
                keydown.clone()
            } else {
                idle
            }
        };
        let mut whites = Element::new("g").attr("class", "white-keys");
        let mut blacks = Element::new("g").attr("class", "black-keys");
        for octave in 0..self.octaves() {
            for (index, semitone) in WHITE_SEMITONES.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let x = (octave * 7 + index) as f64 * white;
                let fill = fill_for(self.note(octave, *semitone), record.text("whiteNoteColour"));
                whites = whites.child(
                    rect(x, 0.0, white, bounds.height, 0.0, &fill)
                        .attr("stroke", &outline)
                        .attr("stroke-width", 1),
                );
            }
            for (semitone, after) in BLACK_KEYS {
                let fill = fill_for(self.note(octave, semitone), record.text("blackNoteColour"));
                blacks = blacks.child(rect(
                    self.black_key_x(octave, after),
                    0.0,
                    white * BLACK_WIDTH,
                    bounds.height * BLACK_HEIGHT,
                    0.0,
                    &fill,
                ));
            }
        }
        svg_frame(&bounds).child(whites).child(blacks).into()
    }

    fn pointer_down(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.pressed = true;
        self.core.ui.last_pointer = event;
        let mut outputs = self.release();
        if let Some(note) = self.note_at(event) {
            self.held = Some(note);
            outputs.push(self.message(NOTE_ON, note, 127));
        }
        outputs
    }

    fn pointer_move(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.last_pointer = event;
        if !self.core.ui.pressed {
            return Vec::new();
        }
        let note = self.note_at(event);
        if note == self.held {
            return Vec::new();
        }
        let mut outputs = self.release();
        if let Some(note) = note {
            self.held = Some(note);
            outputs.push(self.message(NOTE_ON, note, 127));
        }
        outputs
    }

    fn pointer_up(&mut self, event: PointerEvent) -> Vec<WidgetOutput> {
        self.core.ui.pressed = false;
        self.core.ui.last_pointer = event;
        self.release()
    }
}
