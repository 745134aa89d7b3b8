//! Header block tokenization.
//!
//! Splits a raw part into its header block and body, and turns a header
//! block into ordered `(name, value)` pairs.

/// Splits a raw part into `(header_block, body)`.
///
/// The header block ends at the first blank line. A part that starts with a
/// line break has no headers, and a part whose first line is not a header
/// field is treated as body only. Without a blank line the whole input is the
/// header block and the body is empty.
#[must_use]
pub fn split_block(block: &str) -> (&str, &str) {
    if let Some(body) = block.strip_prefix("\r\n").or_else(|| block.strip_prefix('\n')) {
        return ("", body);
    }

    let first_line = block.lines().next().unwrap_or_default();
    if !is_field_line(first_line) {
        return ("", block);
    }

    let mut line_start = 0;
    while let Some(offset) = block[line_start..].find('\n') {
        let line_end = line_start + offset;
        let line = &block[line_start..line_end];
        if line.is_empty() || line == "\r" {
            return (&block[..line_start], &block[line_end + 1..]);
        }
        line_start = line_end + 1;
    }

    (block, "")
}

/// Parses a header block into ordered `(name, value)` pairs.
///
/// Folded lines are unfolded with a single space and names and values are
/// trimmed. Values are returned as written; RFC 2047 words are left for the
/// caller, which knows which fields may carry them. Parsing stops at the
/// first blank line. Lines that are neither fields nor continuations are
/// skipped.
///
/// ```text
/// Header-Name: value
///  continuation
/// ```
#[must_use]
pub fn parse(text: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
        if line.is_empty() {
            break;
        }

        // Continuation line (starts with space or tab)
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = current.as_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some(field) = current.take() {
            fields.push(field);
        }

        match line.split_once(':') {
            Some((name, value)) if is_field_name(name.trim_end()) => {
                current = Some((name.trim_end().to_string(), value.trim().to_string()));
            }
            _ => tracing::warn!(line, "Skipping malformed header line"),
        }
    }

    fields.extend(current);

    fields
}

/// Checks whether a line starts a header field (`name: value`).
fn is_field_line(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(name, _)| is_field_name(name.trim_end()))
}

/// Field names are printable ASCII without spaces or colons (RFC 5322).
fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_block_crlf() {
        let (headers, body) =
            split_block("Content-Type: text/plain\r\nContent-ID: <a>\r\n\r\nHello\r\nWorld");
        assert_eq!(headers, "Content-Type: text/plain\r\nContent-ID: <a>\r\n");
        assert_eq!(body, "Hello\r\nWorld");
    }

    #[test]
    fn test_split_block_lf() {
        let (headers, body) = split_block("Content-Type: text/plain\n\n\nbody after blank");
        assert_eq!(headers, "Content-Type: text/plain\n");
        assert_eq!(body, "\nbody after blank");
    }

    #[test]
    fn test_split_block_without_headers() {
        assert_eq!(split_block("\r\nonly body"), ("", "only body"));
        assert_eq!(split_block("\nonly body"), ("", "only body"));
        assert_eq!(split_block("just some text\n\nmore"), ("", "just some text\n\nmore"));
    }

    #[test]
    fn test_split_block_without_blank_line() {
        assert_eq!(
            split_block("Content-Type: text/plain"),
            ("Content-Type: text/plain", "")
        );
    }

    #[test]
    fn test_parse_ordered_and_unfolded() {
        let text = concat!(
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "content-id:   <part1@example>  \r\n",
            "Content-Description: =?utf-8?B?SMOpbGxv?=\r\n",
        );

        let fields = parse(text);
        assert_eq!(
            fields,
            vec![
                ("Content-Type".to_string(), "text/plain; charset=utf-8".to_string()),
                ("content-id".to_string(), "<part1@example>".to_string()),
                (
                    "Content-Description".to_string(),
                    "=?utf-8?B?SMOpbGxv?=".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_parse_leaves_encoded_words_alone() {
        let fields = parse("Content-Location: =?utf-8?B?SGk=?=\nX-Other: =?utf-8?Z?abc?=\n");
        assert_eq!(fields[0].1, "=?utf-8?B?SGk=?=");
        assert_eq!(fields[1].1, "=?utf-8?Z?abc?=");
    }

    #[test]
    fn test_parse_stops_at_blank_line_and_skips_garbage() {
        let fields = parse("not a header\nX-A: 1\n\nX-B: 2\n");
        assert_eq!(fields, vec![("X-A".to_string(), "1".to_string())]);
    }
}
