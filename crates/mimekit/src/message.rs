//! MIME message structure and handling.

use crate::boundary::Boundary;
use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::multipart::{disassemble, generate_message};
use crate::part::Part;
use std::cell::OnceCell;

/// An ordered collection of MIME parts sharing one boundary.
///
/// The boundary is created on first use and then kept for the life of the
/// message, so repeated calls to [`Message::generate_message`] agree with
/// the `Content-Type` reported by [`Message::content_type`].
///
/// Parts are never deduplicated: adding the same part twice renders it twice.
#[derive(Debug, Clone, Default)]
pub struct Message {
    parts: Vec<Part>,
    boundary: OnceCell<Boundary>,
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty message that will use the given boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<Boundary>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: OnceCell::from(boundary.into()),
        }
    }

    /// Reconstructs a message from a multipart body.
    ///
    /// Part bodies have their line breaks rewritten to `eol`. The message
    /// keeps `boundary` for later serialization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`] if the closing boundary is missing
    /// and [`Error::UnknownHeader`] if a part carries a header a [`Part`]
    /// cannot hold. Either error aborts the whole reconstruction.
    pub fn from_raw(raw: &str, boundary: &str, eol: &str) -> Result<Self> {
        let parts = disassemble(raw, boundary)?
            .iter()
            .map(|block| block.to_part(eol))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(parts = parts.len(), "Reconstructed message");

        Ok(Self {
            parts,
            boundary: OnceCell::from(Boundary::new(boundary)),
        })
    }

    /// Returns the parts in order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Replaces all parts.
    pub fn set_parts(&mut self, parts: Vec<Part>) {
        self.parts = parts;
    }

    /// Appends a part.
    pub fn add_part(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Returns the part at `index`, if any.
    #[must_use]
    pub fn part(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the message has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns an iterator over the parts.
    pub fn iter(&self) -> std::slice::Iter<'_, Part> {
        self.parts.iter()
    }

    /// Checks if the message has more than one part.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.parts.len() > 1
    }

    /// Returns the boundary, generating one on first call.
    #[must_use]
    pub fn boundary_provider(&self) -> &Boundary {
        self.boundary.get_or_init(Boundary::generate)
    }

    /// Returns the content type for the enclosing message header.
    ///
    /// Multipart messages are `multipart/mixed` with this message's
    /// boundary; otherwise the single part's type applies, defaulting to
    /// `text/plain; charset=utf-8`.
    ///
    /// # Errors
    ///
    /// Returns an error if the single part's content type is malformed.
    pub fn content_type(&self) -> Result<ContentType> {
        match self.parts.as_slice() {
            [single] => single.parsed_content_type(),
            [] => Ok(ContentType::text_plain()),
            _ => Ok(ContentType::multipart_mixed(self.boundary_provider().as_str())),
        }
    }

    /// Renders the message body.
    ///
    /// See [`generate_message`] for the format.
    #[must_use]
    pub fn generate_message(&self, eol: &str) -> String {
        generate_message(&self.parts, self.boundary_provider(), eol)
    }

    /// Renders the header block of the part at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartIndex`] if `index` is out of range.
    pub fn part_headers(&self, index: usize, eol: &str) -> Result<String> {
        Ok(self.checked_part(index)?.headers(eol))
    }

    /// Returns the header fields of the part at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartIndex`] if `index` is out of range.
    pub fn part_headers_array(&self, index: usize) -> Result<Vec<(&'static str, String)>> {
        Ok(self.checked_part(index)?.headers_array())
    }

    /// Returns the content of the part at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartIndex`] if `index` is out of range.
    pub fn part_content(&self, index: usize, eol: &str) -> Result<String> {
        Ok(self.checked_part(index)?.content(eol))
    }

    fn checked_part(&self, index: usize) -> Result<&Part> {
        self.parts.get(index).ok_or(Error::PartIndex {
            index,
            len: self.parts.len(),
        })
    }
}

impl FromIterator<Part> for Message {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
            boundary: OnceCell::new(),
        }
    }
}

impl IntoIterator for Message {
    type Item = Part;
    type IntoIter = std::vec::IntoIter<Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Part;
    type IntoIter = std::slice::Iter<'a, Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
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
    use crate::boundary::BoundaryProvider;

    #[test]
    fn test_message_new_is_empty() {
        let message = Message::new();
        assert!(message.is_empty());
        assert!(!message.is_multipart());
        assert_eq!(message.generate_message("\r\n"), "");
    }

    #[test]
    fn test_add_part_preserves_order_without_dedup() {
        let mut message = Message::new();
        let part = Part::new("same");
        message.add_part(part.clone());
        message.add_part(Part::new("other"));
        message.add_part(part.clone());

        assert_eq!(message.len(), 3);
        assert!(message.is_multipart());
        let contents: Vec<&str> = message.iter().map(Part::raw_content).collect();
        assert_eq!(contents, ["same", "other", "same"]);
    }

    #[test]
    fn test_set_parts() {
        let mut message = Message::new();
        message.add_part(Part::new("old"));
        message.set_parts(vec![Part::new("a"), Part::new("b")]);
        assert_eq!(message.parts().len(), 2);
        assert_eq!(message.part(0).unwrap().raw_content(), "a");
        assert!(message.part(2).is_none());
    }

    #[test]
    fn test_boundary_is_memoized() {
        let message = Message::new();
        let first = message.boundary_provider().clone();
        let second = message.boundary_provider().clone();
        assert_eq!(first, second);
        assert!(first.token().starts_with("=_"));
    }

    #[test]
    fn test_with_boundary_is_used() {
        let message: Message = [Part::new("A"), Part::new("B")].into_iter().collect();
        assert_ne!(message.boundary_provider().as_str(), "XYZ");

        let mut message = Message::with_boundary("XYZ");
        message.add_part(Part::new("A"));
        message.add_part(Part::new("B"));
        let body = message.generate_message("\n");
        assert!(body.contains("\n--XYZ\n"));
        assert!(body.ends_with("\n--XYZ--"));
    }

    #[test]
    fn test_single_part_message_is_content() {
        let mut message = Message::with_boundary("XYZ");
        message.add_part(Part::new("Hello").with_type("text/plain").with_id("<a>"));
        assert_eq!(message.generate_message("\r\n"), "Hello");
    }

    #[test]
    fn test_content_type() {
        let message = Message::new();
        assert_eq!(message.content_type().unwrap(), ContentType::text_plain());

        let message: Message = [Part::new("x").with_type("text/html")].into_iter().collect();
        assert_eq!(message.content_type().unwrap().sub_type, "html");

        let mut message = Message::with_boundary("=_b");
        message.set_parts(vec![Part::new("a"), Part::new("b")]);
        let ct = message.content_type().unwrap();
        assert!(ct.is_multipart());
        assert_eq!(ct.boundary(), Some("=_b"));
    }

    #[test]
    fn test_part_accessors_bounds_checked() {
        let mut message = Message::new();
        message.add_part(Part::new("line1\nline2").with_type("text/plain").with_id("c@d"));

        assert_eq!(
            message.part_headers(0, "\r\n").unwrap(),
            "Content-Type: text/plain\r\nContent-ID: <c@d>\r\n"
        );
        assert_eq!(
            message.part_headers_array(0).unwrap(),
            vec![
                ("Content-Type", "text/plain".to_string()),
                ("Content-ID", "<c@d>".to_string()),
            ]
        );
        assert_eq!(message.part_content(0, "\r\n").unwrap(), "line1\r\nline2");

        assert!(matches!(
            message.part_content(1, "\n"),
            Err(Error::PartIndex { index: 1, len: 1 })
        ));
        assert!(matches!(
            message.part_headers(5, "\n"),
            Err(Error::PartIndex { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_from_raw() {
        let raw = "This is a preamble\r\n\
                   --XYZ\r\n\
                   Content-Type: text/plain\r\n\
                   Content-ID: <one@example>\r\n\
                   \r\n\
                   first\r\n\
                   --XYZ\r\n\
                   content-disposition: attachment; filename=\"a.bin\"\r\n\
                   Content-Transfer-Encoding: base64\r\n\
                   \r\n\
                   AAEC\r\n\
                   --XYZ--\r\n";

        let message = Message::from_raw(raw, "XYZ", "\r\n").unwrap();
        assert_eq!(message.len(), 2);
        assert_eq!(message.boundary_provider().as_str(), "XYZ");

        let first = message.part(0).unwrap();
        assert_eq!(first.content_type.as_deref(), Some("text/plain"));
        assert_eq!(first.id.as_deref(), Some("one@example"));
        assert_eq!(first.raw_content(), "first");

        let second = message.part(1).unwrap();
        assert_eq!(second.disposition.as_deref(), Some("attachment; filename=\"a.bin\""));
        assert_eq!(second.decoded_content().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_from_raw_without_boundary_is_empty() {
        let message = Message::from_raw("no parts here", "XYZ", "\n").unwrap();
        assert!(message.is_empty());
    }

    #[test]
    fn test_from_raw_unknown_header_aborts() {
        let raw = "--XYZ\nContent-Type: text/plain\n\nok\n--XYZ\nX-Custom: 1\n\nbad\n--XYZ--";
        match Message::from_raw(raw, "XYZ", "\n") {
            Err(Error::UnknownHeader(name)) => assert_eq!(name, "X-Custom"),
            other => panic!("expected UnknownHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_from_raw_missing_terminator_aborts() {
        let raw = "--XYZ\nContent-Type: text/plain\n\nok\n";
        assert!(matches!(
            Message::from_raw(raw, "XYZ", "\n"),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_from_raw_normalizes_body_line_endings() {
        let raw = "--XYZ\n\nline1\r\nline2\nline3\n--XYZ--";
        let message = Message::from_raw(raw, "XYZ", "\r\n").unwrap();
        assert_eq!(message.part(0).unwrap().raw_content(), "line1\r\nline2\r\nline3");
    }

    #[test]
    fn test_into_iter() {
        let message: Message = vec![Part::new("a"), Part::new("b")].into_iter().collect();
        let borrowed: Vec<&str> = (&message).into_iter().map(Part::raw_content).collect();
        assert_eq!(borrowed, ["a", "b"]);
        let owned: Vec<Part> = message.into_iter().collect();
        assert_eq!(owned.len(), 2);
    }
}
