//! A single MIME part.

use crate::content_type::ContentType;
use crate::encoding::{
    decode_base64, decode_quoted_printable, decode_rfc2047, encode_base64_lines,
    encode_quoted_printable, encode_rfc2047,
};
use crate::error::Result;
use crate::field::HeaderField;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[default]
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    ///
    /// Unrecognized values fall back to 7bit.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit,
        }
    }

    /// Returns the header value for this encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart message: a handful of optional MIME fields and
/// a body in its transfer-encoded form.
///
/// The body is opaque to the multipart codec. It must not contain the
/// boundary of the message it is placed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Part {
    /// `Content-Type` value, including any parameters.
    pub content_type: Option<String>,
    /// `Content-Transfer-Encoding` value.
    pub encoding: Option<String>,
    /// `Content-ID` without angle brackets.
    pub id: Option<String>,
    /// `Content-Disposition` value.
    pub disposition: Option<String>,
    /// `Content-Description` value (decoded text).
    pub description: Option<String>,
    /// `Content-Location` value.
    pub location: Option<String>,
    /// `Content-Language` value.
    pub language: Option<String>,
    content: String,
}

impl Part {
    /// Creates a part from already-encoded content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Creates a part by transfer-encoding raw bytes.
    ///
    /// Sets the `encoding` field. 7bit, 8bit and binary content is taken
    /// as-is (lossily converted to UTF-8 if needed).
    #[must_use]
    pub fn encoded(raw: &[u8], encoding: TransferEncoding, eol: &str) -> Self {
        let content = match encoding {
            TransferEncoding::Base64 => encode_base64_lines(raw, eol),
            TransferEncoding::QuotedPrintable => encode_quoted_printable(raw, eol),
            _ => String::from_utf8_lossy(raw).into_owned(),
        };

        Self::new(content).with_encoding(encoding.as_str())
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the transfer encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Sets the content id, stripping one pair of surrounding angle brackets.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(strip_angle_brackets(&id.into()).to_string());
        self
    }

    /// Sets the disposition.
    #[must_use]
    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Returns the stored (encoded) content.
    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.content
    }

    /// Returns the header fields in rendering order.
    ///
    /// Names are in canonical case and the content id is wrapped in angle
    /// brackets. Any value that would not survive a header line unchanged is
    /// written as an RFC 2047 word, so a value can never start a new line.
    #[must_use]
    pub fn headers_array(&self) -> Vec<(&'static str, String)> {
        HeaderField::ALL
            .iter()
            .filter_map(|&field| {
                let value = self.field(field)?;
                let value = encode_rfc2047(value, "utf-8");
                let value = match field {
                    HeaderField::ContentId => format!("<{value}>"),
                    _ => value,
                };
                Some((field.display_name(), value))
            })
            .collect()
    }

    /// Renders the header block, each line terminated by `eol`.
    #[must_use]
    pub fn headers(&self, eol: &str) -> String {
        self.headers_array()
            .into_iter()
            .map(|(name, value)| format!("{name}: {value}{eol}"))
            .collect()
    }

    /// Returns the content with every line break normalized to `eol`.
    #[must_use]
    pub fn content(&self, eol: &str) -> String {
        normalize_eol(&self.content, eol)
    }

    /// Returns the value of a recognized field.
    #[must_use]
    pub fn field(&self, field: HeaderField) -> Option<&str> {
        match field {
            HeaderField::ContentType => self.content_type.as_deref(),
            HeaderField::ContentTransferEncoding => self.encoding.as_deref(),
            HeaderField::ContentId => self.id.as_deref(),
            HeaderField::ContentDisposition => self.disposition.as_deref(),
            HeaderField::ContentDescription => self.description.as_deref(),
            HeaderField::ContentLocation => self.location.as_deref(),
            HeaderField::ContentLanguage => self.language.as_deref(),
        }
    }

    /// Sets a recognized field from its header value, decoding an RFC 2047
    /// word. A value that does not decode is kept as written.
    pub(crate) fn set_field(&mut self, field: HeaderField, value: &str) {
        let value = match field {
            HeaderField::ContentId => strip_angle_brackets(value),
            _ => value,
        };
        let value = decode_rfc2047(value).unwrap_or_else(|e| {
            tracing::warn!(header = %field, error = %e, "Keeping undecodable header value");
            value.to_string()
        });

        let slot = match field {
            HeaderField::ContentType => &mut self.content_type,
            HeaderField::ContentTransferEncoding => &mut self.encoding,
            HeaderField::ContentId => &mut self.id,
            HeaderField::ContentDisposition => &mut self.disposition,
            HeaderField::ContentDescription => &mut self.description,
            HeaderField::ContentLocation => &mut self.location,
            HeaderField::ContentLanguage => &mut self.language,
        };
        *slot = Some(value);
    }

    /// Parses the `content_type` field, defaulting to `text/plain; charset=utf-8`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is malformed.
    pub fn parsed_content_type(&self) -> Result<ContentType> {
        self.content_type
            .as_deref()
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.encoding
            .as_deref()
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Decodes the content according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decoded_content(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&self.content),
            TransferEncoding::QuotedPrintable => decode_quoted_printable(&self.content),
            _ => Ok(self.content.clone().into_bytes()),
        }
    }

    /// Gets the decoded content as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn decoded_text(&self) -> Result<String> {
        String::from_utf8(self.decoded_content()?).map_err(Into::into)
    }
}

/// Rewrites `\r\n`, bare `\n` and bare `\r` line breaks to `eol`.
pub(crate) fn normalize_eol(text: &str, eol: &str) -> String {
    let unix = text.replace("\r\n", "\n").replace('\r', "\n");
    if eol == "\n" {
        unix
    } else {
        unix.replace('\n', eol)
    }
}

fn strip_angle_brackets(id: &str) -> &str {
    id.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(id)
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

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::parse(" BASE64 "), TransferEncoding::Base64);
        assert_eq!(
            TransferEncoding::parse("quoted-printable"),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(TransferEncoding::parse("x-unknown"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::QuotedPrintable.to_string(), "quoted-printable");
    }

    #[test]
    fn test_headers_render_in_fixed_order() {
        let part = Part::new("body")
            .with_language("en")
            .with_id("<logo@example>")
            .with_type("image/png")
            .with_encoding("base64");

        assert_eq!(
            part.headers("\r\n"),
            "Content-Type: image/png\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-ID: <logo@example>\r\n\
             Content-Language: en\r\n"
        );
        assert_eq!(part.id.as_deref(), Some("logo@example"));
    }

    #[test]
    fn test_headers_empty_part() {
        assert_eq!(Part::new("x").headers("\n"), "");
        assert!(Part::new("x").headers_array().is_empty());
    }

    #[test]
    fn test_headers_encode_non_ascii_description() {
        let part = Part::new("x").with_description("Résumé");
        let (name, value) = &part.headers_array()[0];
        assert_eq!(*name, "Content-Description");
        assert!(value.starts_with("=?utf-8?B?"));
    }

    #[test]
    fn test_content_normalizes_line_endings() {
        let part = Part::new("a\nb\r\nc");
        assert_eq!(part.content("\r\n"), "a\r\nb\r\nc");
        assert_eq!(part.content("\n"), "a\nb\nc");
        assert_eq!(part.raw_content(), "a\nb\r\nc");
    }

    #[test]
    fn test_encoded_base64_roundtrip() {
        let raw: Vec<u8> = (0..=255).collect();
        let part = Part::encoded(&raw, TransferEncoding::Base64, "\r\n");
        assert_eq!(part.encoding.as_deref(), Some("base64"));
        assert_eq!(part.decoded_content().unwrap(), raw);
    }

    #[test]
    fn test_encoded_quoted_printable_roundtrip() {
        let part = Part::encoded("Grüße".as_bytes(), TransferEncoding::QuotedPrintable, "\n");
        assert_eq!(part.raw_content(), "Gr=C3=BC=C3=9Fe");
        assert_eq!(part.decoded_text().unwrap(), "Grüße");
    }

    #[test]
    fn test_parsed_content_type_default() {
        let ct = Part::new("x").parsed_content_type().unwrap();
        assert_eq!(ct, ContentType::text_plain());

        let ct = Part::new("x")
            .with_type("text/html; charset=iso-8859-1")
            .parsed_content_type()
            .unwrap();
        assert_eq!(ct.sub_type, "html");
        assert_eq!(ct.charset(), Some("iso-8859-1"));
    }

    #[test]
    fn test_set_field_strips_content_id() {
        let mut part = Part::new("x");
        part.set_field(HeaderField::ContentId, "<abc>");
        part.set_field(HeaderField::ContentLocation, "http://example.com/x");
        assert_eq!(part.id.as_deref(), Some("abc"));
        assert_eq!(part.field(HeaderField::ContentLocation), Some("http://example.com/x"));
    }

    #[test]
    fn test_set_field_decodes_encoded_words() {
        let mut part = Part::new("x");
        part.set_field(HeaderField::ContentLocation, "=?utf-8?B?SGk=?=");
        part.set_field(HeaderField::ContentId, "<=?utf-8?Q?a_b?=>");
        part.set_field(HeaderField::ContentLanguage, "=?utf-8?Z?abc?=");
        assert_eq!(part.location.as_deref(), Some("Hi"));
        assert_eq!(part.id.as_deref(), Some("a b"));
        assert_eq!(part.language.as_deref(), Some("=?utf-8?Z?abc?="));
    }

    /// Renders the part's headers and maps them back through the tokenizer.
    fn reparse(part: &Part, eol: &str) -> Part {
        let mut parsed = Part::new(part.raw_content());
        for (name, value) in crate::header::parse(&part.headers(eol)) {
            let field = HeaderField::from_name(&name).unwrap();
            parsed.set_field(field, &value);
        }
        parsed
    }

    #[test]
    fn test_headers_cannot_inject_lines() {
        let part = Part::new("x")
            .with_type("text/plain\nX-Evil: 1")
            .with_disposition("inline\r\n\r\nbody");

        let headers = part.headers("\r\n");
        assert_eq!(headers.matches("\r\n").count(), 2);
        assert!(!headers.contains("X-Evil"));
        assert_eq!(reparse(&part, "\r\n"), part);
    }

    #[test]
    fn test_headers_keep_values_that_look_encoded() {
        let part = Part::new("x")
            .with_location("=?utf-8?B?SGk=?=")
            .with_id("=?utf-8?B?SGk=?=@example");

        assert_ne!(part.headers_array()[1].1, "=?utf-8?B?SGk=?=");
        assert_eq!(reparse(&part, "\n"), part);
    }

    #[test]
    fn test_headers_keep_surrounding_whitespace() {
        let part = Part::new("x")
            .with_description(" padded ")
            .with_language("\ten");

        let parsed = reparse(&part, "\n");
        assert_eq!(parsed.description.as_deref(), Some(" padded "));
        assert_eq!(parsed.language.as_deref(), Some("\ten"));
    }

    #[test]
    fn test_content_treats_bare_cr_as_line_break() {
        let part = Part::new("A\r");
        assert_eq!(part.content("\n"), "A\n");
        assert_eq!(part.content("\r\n"), "A\r\n");
        assert_eq!(Part::new("a\rb\r\nc").content("\n"), "a\nb\nc");
    }
}
