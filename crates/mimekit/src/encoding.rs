//! Content-transfer-encoding and header-word utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 encoded words. Line-oriented
//! encoders take the line ending explicitly so their output matches the
//! message being assembled.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum encoded line length (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64 on a single line.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64, wrapped at [`MAX_LINE_LENGTH`] columns.
///
/// Lines are joined with `eol`; no terminator follows the last line.
#[must_use]
pub fn encode_base64_lines(data: &[u8], eol: &str) -> String {
    let encoded = STANDARD.encode(data);
    let line_breaks = encoded.len() / MAX_LINE_LENGTH;
    let mut result = String::with_capacity(encoded.len() + line_breaks * eol.len());

    // Base64 output is pure ASCII, so byte chunks are valid char boundaries.
    for (i, chunk) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if i > 0 {
            result.push_str(eol);
        }
        result.push_str(&String::from_utf8_lossy(chunk));
    }

    result
}

/// Decodes Base64 data, ignoring embedded whitespace and line breaks.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Soft line breaks are written as `=` followed by `eol`.
#[must_use]
pub fn encode_quoted_printable(data: &[u8], eol: &str) -> String {
    let mut result = String::new();
    let mut line_length = 0;

    for (i, byte) in data.iter().enumerate() {
        // Check if we need soft line break
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push('=');
            result.push_str(eol);
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(char::from(*byte));
                line_length += 1;
            }
            // Trailing whitespace must be encoded
            b' ' | b'\t' if i + 1 < data.len() => {
                result.push(char::from(*byte));
                line_length += 1;
            }
            _ => {
                let _ = write!(result, "={byte:02X}");
                line_length += 3;
            }
        }
    }

    result
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            result.push(bytes[i]);
            i += 1;
            continue;
        }

        // Soft line break
        match bytes.get(i + 1..) {
            Some([b'\r', b'\n', ..]) => {
                i += 3;
                continue;
            }
            Some([b'\n', ..]) => {
                i += 2;
                continue;
            }
            _ => {}
        }

        let hex = bytes
            .get(i + 1..i + 3)
            .ok_or_else(|| Error::InvalidEncoding("Incomplete escape sequence".to_string()))?;
        let hex = std::str::from_utf8(hex)
            .map_err(|_| Error::InvalidEncoding("Non-ASCII escape sequence".to_string()))?;
        let byte = u8::from_str_radix(hex, 16)
            .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
        result.push(byte);
        i += 3;
    }

    Ok(result)
}

/// Encodes a header value using RFC 2047 encoding.
///
/// Format: `=?charset?B?encoded-text?=`. A value is returned unchanged only
/// if it survives a header line as-is: printable ASCII, no `=?`, and no
/// surrounding whitespace. Anything else (line breaks included) is encoded,
/// so [`decode_rfc2047`] always restores the original.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if is_header_safe(text) {
        return text.to_string();
    }

    let encoded = encode_base64(text.as_bytes());
    format!("=?{charset}?B?{encoded}?=")
}

fn is_header_safe(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
        && !text.contains("=?")
        && text.trim() == text
}

/// Decodes an RFC 2047 encoded header value.
///
/// Values that are not a single encoded word are returned unchanged. The
/// decoded bytes must be UTF-8; no charset conversion is performed.
///
/// # Errors
///
/// Returns an error if the input looks like an encoded word but is malformed.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let Some(inner) = text.strip_prefix("=?").and_then(|t| t.strip_suffix("?=")) else {
        return Ok(text.to_string());
    };

    let parts: Vec<&str> = inner.split('?').collect();
    let [_charset, encoding, encoded_text] = parts.as_slice() else {
        return Err(Error::InvalidEncoding("Invalid RFC 2047 format".to_string()));
    };

    let decoded = match encoding.to_ascii_uppercase().as_str() {
        "B" => decode_base64(encoded_text)?,
        // Q encoding uses underscore for space
        "Q" => decode_quoted_printable(&encoded_text.replace('_', " "))?,
        other => {
            return Err(Error::InvalidEncoding(format!("Unknown encoding: {other}")));
        }
    };

    String::from_utf8(decoded).map_err(Into::into)
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
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64_lines_wrap_with_eol() {
        let data = vec![0u8; 120];
        let encoded = encode_base64_lines(&data, "\r\n");
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), MAX_LINE_LENGTH);
        assert!(!encoded.ends_with("\r\n"));

        assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    #[test]
    fn test_quoted_printable_encode() {
        assert_eq!(encode_quoted_printable(b"Hello, World!", "\n"), "Hello, World!");

        let encoded = encode_quoted_printable("Héllo".as_bytes(), "\n");
        assert_eq!(encoded, "H=C3=A9llo");

        assert_eq!(encode_quoted_printable(b"a=b", "\n"), "a=3Db");
        assert_eq!(encode_quoted_printable(b"end ", "\n"), "end=20");
    }

    #[test]
    fn test_quoted_printable_soft_breaks_use_eol() {
        let long = "x".repeat(100);
        let encoded = encode_quoted_printable(long.as_bytes(), "\r\n");
        assert!(encoded.contains("=\r\n"));
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), long.as_bytes());
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("Hello, World!").unwrap(), b"Hello, World!");
        assert_eq!(
            decode_quoted_printable("H=C3=A9llo").unwrap(),
            "Héllo".as_bytes()
        );
        assert_eq!(decode_quoted_printable("Hello=\nWorld").unwrap(), b"HelloWorld");
    }

    #[test]
    fn test_quoted_printable_decode_rejects_truncated_escape() {
        assert!(matches!(
            decode_quoted_printable("abc=4"),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_rfc2047_encode() {
        assert_eq!(encode_rfc2047("Hello", "utf-8"), "Hello");

        let encoded = encode_rfc2047("Héllo", "utf-8");
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_rfc2047_encodes_values_a_header_line_would_alter() {
        for value in [
            "=?utf-8?B?SGk=?=",
            "text/plain\nX-Evil: 1",
            "tab\there",
            " padded ",
            "trailing\r",
        ] {
            let encoded = encode_rfc2047(value, "utf-8");
            assert!(encoded.starts_with("=?utf-8?B?"), "{value:?} left as {encoded:?}");
            assert!(!encoded.contains(['\r', '\n']));
            assert_eq!(decode_rfc2047(&encoded).unwrap(), value);
        }

        assert_eq!(encode_rfc2047("a  b ?= c", "utf-8"), "a  b ?= c");
        assert_eq!(encode_rfc2047("", "utf-8"), "");
    }

    #[test]
    fn test_rfc2047_decode() {
        assert_eq!(decode_rfc2047("Hello").unwrap(), "Hello");
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
        assert_eq!(
            decode_rfc2047("=?utf-8?Q?H=C3=A9llo_there?=").unwrap(),
            "Héllo there"
        );
    }

    #[test]
    fn test_rfc2047_decode_unknown_encoding() {
        assert!(decode_rfc2047("=?utf-8?X?abc?=").is_err());
    }
}
