//! Locating a record in written text so the editor can reveal it.

use serde::{Deserialize, Serialize};
use text_size::{TextRange, TextSize};

use crate::format::JsonFormat;
use crate::region::text_size;

/// Zero-based line and character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineCol {
    pub line: u32,
    pub character: u32,
}

/// Line/character span of a highlighted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineRange {
    pub start: LineCol,
    pub end: LineCol,
}

/// Range of the record for `channel` inside `within`.
///
/// Compact output highlights the whole line holding the channel; expanded
/// output highlights the enclosing object. `None` when the channel is not
/// present.
pub fn highlight_range(
    text: &str,
    within: TextRange,
    channel: &str,
    format: JsonFormat,
) -> Option<TextRange> {
    let base = usize::from(within.start());
    let scope = &text[within];
    let key = channel_key_offset(scope, channel)?;
    let (start, end) = match format {
        JsonFormat::Compact => {
            let start = scope[..key].rfind('\n').map_or(0, |offset| offset + 1);
            let end = scope[key..].find('\n').map_or(scope.len(), |offset| key + offset);
            (start, end)
        }
        JsonFormat::Expanded => enclosing_object(scope, key)?,
    };
    Some(TextRange::new(text_size(base + start), text_size(base + end)))
}

/// Offset of the first `"channel"` key whose value is `channel`.
fn channel_key_offset(scope: &str, channel: &str) -> Option<usize> {
    let quoted = serde_json::to_string(channel).ok()?;
    let mut from = 0;
    while let Some(found) = scope[from..].find("\"channel\"") {
        let key = from + found;
        let rest = scope[key + "\"channel\"".len()..].trim_start();
        if let Some(value) = rest.strip_prefix(':') {
            if value.trim_start().starts_with(&quoted) {
                return Some(key);
            }
        }
        from = key + 1;
    }
    None
}

/// Start and end (exclusive) of the innermost object around `offset`.
fn enclosing_object(scope: &str, offset: usize) -> Option<(usize, usize)> {
    let mut opens: Vec<usize> = Vec::new();
    let mut target_depth = None;
    let mut in_string = false;
    let mut escaped = false;
    for (index, byte) in scope.bytes().enumerate() {
        if index == offset {
            target_depth = Some(opens.len());
        }
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => opens.push(index),
            b'}' => {
                let start = opens.pop()?;
                if target_depth == Some(opens.len() + 1) {
                    return Some((start, index + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Line and character (in chars) of a byte offset.
pub fn offset_to_position(content: &str, offset: TextSize) -> LineCol {
    let offset = usize::from(offset);
    let mut line = 0u32;
    let mut character = 0u32;
    for (index, ch) in content.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += 1;
        }
    }
    LineCol { line, character }
}

pub fn line_range(content: &str, range: TextRange) -> LineRange {
    LineRange {
        start: offset_to_position(content, range.start()),
        end: offset_to_position(content, range.end()),
    }
}
