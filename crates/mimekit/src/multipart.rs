//! Multipart body assembly and disassembly.
//!
//! Wire format, for a boundary `B` and line ending `EOL`:
//!
//! ```text
//! <preamble>EOL
//! --B EOL
//! <part 1 headers> EOL
//! EOL
//! <part 1 content> EOL
//! --B EOL
//! ...
//! <part n content> EOL
//! --B--
//! ```
//!
//! A delimiter only counts at the start of a line. The line break in front
//! of a delimiter belongs to the delimiter, so part content round-trips
//! exactly (RFC 2046, section 5.1.1).

use crate::boundary::BoundaryProvider;
use crate::error::{Error, Result};
use crate::field::build_part;
use crate::header;
use crate::part::Part;

/// Notice placed before the first delimiter for non-MIME readers.
pub const PREAMBLE: &str = concat!(
    "This is a message in Mime Format.  ",
    "If you see this, your mail reader does not support this format."
);

/// Assembles parts into a multipart body.
///
/// No parts yield an empty string. A single part yields only its content,
/// with no delimiters and no headers. The result is trimmed of surrounding
/// whitespace, which also applies to a single part's content.
///
/// Part content is trusted: a boundary occurring inside a part is not
/// detected.
#[must_use]
pub fn generate_message<B>(parts: &[Part], boundary: &B, eol: &str) -> String
where
    B: BoundaryProvider + ?Sized,
{
    tracing::trace!(parts = parts.len(), "Generating message");

    let body = match parts {
        [] => return String::new(),
        [single] => single.content(eol),
        _ => {
            let boundary_line = boundary.boundary_line(eol);
            let mut body = String::from(PREAMBLE);
            body.push_str(eol);

            for part in parts {
                body.push_str(&boundary_line);
                body.push_str(&part.headers(eol));
                body.push_str(eol);
                body.push_str(&part.content(eol));
            }

            body.push_str(&boundary.mime_end(eol));
            body
        }
    };

    body.trim().to_string()
}

/// One part of a multipart body, split into its header block and body but
/// not yet interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPartBlock<'a> {
    headers: &'a str,
    body: &'a str,
}

impl<'a> RawPartBlock<'a> {
    /// Splits the text between two delimiters into header block and body.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let (headers, body) = header::split_block(text);
        Self { headers, body }
    }

    /// Returns the raw header block.
    #[must_use]
    pub const fn headers(&self) -> &'a str {
        self.headers
    }

    /// Returns the raw body.
    #[must_use]
    pub const fn body(&self) -> &'a str {
        self.body
    }

    /// Tokenizes the header block into ordered `(name, value)` pairs.
    #[must_use]
    pub fn fields(&self) -> Vec<(String, String)> {
        header::parse(self.headers)
    }

    /// Builds a [`Part`] from this block, with body line breaks rewritten
    /// to `eol`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHeader`] if the header block carries a field
    /// a part cannot hold.
    pub fn to_part(&self, eol: &str) -> Result<Part> {
        build_part(self.fields(), crate::part::normalize_eol(self.body, eol))
    }
}

/// Splits a multipart body into its raw parts.
///
/// The preamble before the first delimiter and the epilogue after the
/// closing delimiter are discarded. A body with no `--boundary` line yields
/// an empty list.
///
/// # Errors
///
/// Returns [`Error::MalformedMessage`] if there is at least one delimiter but
/// no closing `--boundary--` after the last one. No partial result is
/// returned.
pub fn disassemble<'a>(body: &'a str, boundary: &str) -> Result<Vec<RawPartBlock<'a>>> {
    let marker = format!("--{boundary}");

    let Some((_, mut start)) = find_delimiter(body, &marker, 0) else {
        tracing::debug!(boundary, "No boundary found, message has no parts");
        return Ok(Vec::new());
    };

    let mut blocks = Vec::new();

    while let Some((delimiter_start, delimiter_end)) = find_delimiter(body, &marker, start) {
        tracing::trace!(offset = delimiter_start, "Found boundary");
        blocks.push(RawPartBlock::new(strip_line_break(&body[start..delimiter_start])));
        start = delimiter_end;
    }

    let Some(end) = find_closing(body, &marker, start) else {
        tracing::warn!(boundary, parts = blocks.len() + 1, "Closing boundary missing");
        return Err(Error::MalformedMessage(format!(
            "closing boundary --{boundary}-- missing"
        )));
    };

    blocks.push(RawPartBlock::new(strip_line_break(&body[start..end])));
    tracing::debug!(parts = blocks.len(), "Disassembled multipart body");

    Ok(blocks)
}

/// Finds the next interior delimiter line at or after `from`.
///
/// Returns the offset of the leading `--` and the offset just past the
/// line terminator. Transport padding (spaces or tabs) may precede the
/// terminator.
fn find_delimiter(body: &str, marker: &str, from: usize) -> Option<(usize, usize)> {
    let mut search = from;

    while let Some(offset) = body[search..].find(marker) {
        let start = search + offset;
        if is_line_start(body, start) {
            let rest = &body[start + marker.len()..];
            let padded = rest.trim_start_matches([' ', '\t']);
            let line_break = if padded.starts_with("\r\n") {
                Some(2)
            } else if padded.starts_with('\n') {
                Some(1)
            } else {
                None
            };

            if let Some(len) = line_break {
                let end = start + marker.len() + (rest.len() - padded.len()) + len;
                return Some((start, end));
            }
        }
        // The marker starts with ASCII '-', so this stays on a char boundary.
        search = start + 1;
    }

    None
}

/// Finds the closing `--boundary--` at or after `from`, returning its offset.
fn find_closing(body: &str, marker: &str, from: usize) -> Option<usize> {
    let closing = format!("{marker}--");
    let mut search = from;

    while let Some(offset) = body[search..].find(&closing) {
        let start = search + offset;
        if is_line_start(body, start) {
            return Some(start);
        }
        search = start + 1;
    }

    None
}

fn is_line_start(body: &str, index: usize) -> bool {
    index == 0 || body.as_bytes()[index - 1] == b'\n'
}

/// Removes the line break that belongs to the following delimiter.
fn strip_line_break(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;

    fn two_parts() -> Vec<Part> {
        vec![
            Part::new("A").with_type("text/plain"),
            Part::new("B").with_type("text/html"),
        ]
    }

    #[test]
    fn test_generate_empty() {
        assert_eq!(generate_message(&[], &Boundary::new("XYZ"), "\r\n"), "");
    }

    #[test]
    fn test_generate_single_part_is_content_only() {
        let part = Part::new("Hello")
            .with_type("text/plain")
            .with_id("x@y");
        assert_eq!(generate_message(&[part], &Boundary::new("XYZ"), "\r\n"), "Hello");
    }

    #[test]
    fn test_generate_single_part_is_trimmed() {
        let part = Part::new("\n  Hello \r\n");
        assert_eq!(generate_message(&[part], &Boundary::new("XYZ"), "\n"), "Hello");
    }

    #[test]
    fn test_generate_two_parts_exact() {
        let message = generate_message(&two_parts(), &Boundary::new("XYZ"), "\n");
        let expected = format!(
            "{PREAMBLE}\n\
             \n--XYZ\nContent-Type: text/plain\n\nA\
             \n--XYZ\nContent-Type: text/html\n\nB\
             \n--XYZ--"
        );
        assert_eq!(message, expected);
    }

    #[test]
    fn test_generate_two_parts_structure() {
        let message = generate_message(&two_parts(), &Boundary::new("XYZ"), "\r\n");
        let interior = message.lines().filter(|line| *line == "--XYZ").count();
        assert_eq!(interior, 2);
        assert_eq!(message.matches("--XYZ--").count(), 1);
        assert!(message.ends_with("--XYZ--"));

        let a = message.find("\r\nA\r\n").unwrap();
        let b = message.find("\r\nB\r\n").unwrap();
        assert!(a < b);
        assert!(b < message.find("--XYZ--").unwrap());
    }

    #[test]
    fn test_disassemble_no_boundary_is_empty() {
        let blocks = disassemble("just text\nwith --XYZ in the middle\n", "XYZ").unwrap();
        assert!(blocks.is_empty());
        assert!(disassemble("", "XYZ").unwrap().is_empty());
    }

    #[test]
    fn test_disassemble_missing_terminator() {
        let body = "preamble\n--XYZ\nContent-Type: text/plain\n\nA\n--XYZ\n\nB\n";
        assert!(matches!(
            disassemble(body, "XYZ"),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_disassemble_terminator_must_start_line() {
        let body = "--XYZ\n\nA and --XYZ-- inline\n";
        assert!(matches!(
            disassemble(body, "XYZ"),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_disassemble_blocks() {
        let body = "ignored preamble\r\n\
                    --XYZ\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    first\r\nline two\r\n\
                    --XYZ  \r\n\
                    \r\n\
                    second\r\n\
                    --XYZ--\r\n\
                    epilogue";

        let blocks = disassemble(body, "XYZ").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].headers(), "Content-Type: text/plain\r\n");
        assert_eq!(blocks[0].body(), "first\r\nline two");
        assert_eq!(blocks[1].headers(), "");
        assert_eq!(blocks[1].body(), "second");
    }

    #[test]
    fn test_disassemble_ignores_near_boundaries() {
        let body = "--XYZ\n\
                    \n\
                    text mentioning --XYZ mid-line\n\
                    --XYZabc is not ours\n\
                    ---XYZ neither\n\
                    --XYZ\n\
                    \n\
                    second\n\
                    --XYZ--";

        let blocks = disassemble(body, "XYZ").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].body(),
            "text mentioning --XYZ mid-line\n--XYZabc is not ours\n---XYZ neither"
        );
        assert_eq!(blocks[1].body(), "second");
    }

    #[test]
    fn test_disassemble_empty_part() {
        let blocks = disassemble("--XYZ\n--XYZ\n\nB\n--XYZ--", "XYZ").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].headers(), "");
        assert_eq!(blocks[0].body(), "");
        assert_eq!(blocks[1].body(), "B");
    }

    #[test]
    fn test_raw_block_to_part() {
        let block = RawPartBlock::new("Content-ID: <a@b>\nContent-Type: text/plain\n\nx\ny");
        let part = block.to_part("\r\n").unwrap();
        assert_eq!(part.id.as_deref(), Some("a@b"));
        assert_eq!(part.raw_content(), "x\r\ny");
    }

    #[test]
    fn test_raw_block_unknown_header() {
        let block = RawPartBlock::new("X-Custom: 1\n\nx");
        assert!(matches!(
            block.to_part("\n"),
            Err(Error::UnknownHeader(name)) if name == "X-Custom"
        ));
    }

    #[test]
    fn test_generate_then_disassemble() {
        let boundary = Boundary::new("=_roundtrip");
        let message = generate_message(&two_parts(), &boundary, "\r\n");

        let parts: Vec<Part> = disassemble(&message, boundary.as_str())
            .unwrap()
            .iter()
            .map(|block| block.to_part("\r\n"))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(parts, two_parts());
    }
}
