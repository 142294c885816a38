//! JSON-lines framing.
//! - read_message: next non-blank line
//! - write_message: one payload per line

use std::io::{self, BufRead, Write};

pub(crate) fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}

pub(crate) fn write_message<W: Write>(writer: &mut W, payload: &str) -> io::Result<()> {
    if payload.contains('\n') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "payload spans several lines",
        ));
    }
    writer.write_all(payload.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_blank_lines_and_stops_at_eof() {
        let mut reader = Cursor::new("\n{\"a\":1}\r\n\n  \n{\"b\":2}");
        assert_eq!(read_message(&mut reader).unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(read_message(&mut reader).unwrap().as_deref(), Some("{\"b\":2}"));
        assert_eq!(read_message(&mut reader).unwrap(), None);
    }

    #[test]
    fn writes_one_line_per_payload() {
        let mut out = Vec::new();
        write_message(&mut out, "{}").unwrap();
        write_message(&mut out, "[]").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{}\n[]\n");
        assert!(write_message(&mut Vec::new(), "{\n}").is_err());
    }
}
