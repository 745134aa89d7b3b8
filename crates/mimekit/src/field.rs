//! Header fields a MIME part can carry, and reconstruction of a [`Part`]
//! from parsed header fields.

use crate::error::{Error, Result};
use crate::part::Part;
use std::fmt;

/// A header field recognized on a MIME part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    /// `Content-Type`
    ContentType,
    /// `Content-Transfer-Encoding`
    ContentTransferEncoding,
    /// `Content-ID`
    ContentId,
    /// `Content-Disposition`
    ContentDisposition,
    /// `Content-Description`
    ContentDescription,
    /// `Content-Location`
    ContentLocation,
    /// `Content-Language`
    ContentLanguage,
}

impl HeaderField {
    /// All recognized fields, in rendering order.
    pub const ALL: [Self; 7] = [
        Self::ContentType,
        Self::ContentTransferEncoding,
        Self::ContentId,
        Self::ContentDisposition,
        Self::ContentDescription,
        Self::ContentLocation,
        Self::ContentLanguage,
    ];

    /// Looks up a field by name, case-insensitively.
    ///
    /// Returns `None` for names outside the recognized set.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContentType => "content-type",
            Self::ContentTransferEncoding => "content-transfer-encoding",
            Self::ContentId => "content-id",
            Self::ContentDisposition => "content-disposition",
            Self::ContentDescription => "content-description",
            Self::ContentLocation => "content-location",
            Self::ContentLanguage => "content-language",
        }
    }

    /// Name as written in rendered headers.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ContentType => "Content-Type",
            Self::ContentTransferEncoding => "Content-Transfer-Encoding",
            Self::ContentId => "Content-ID",
            Self::ContentDisposition => "Content-Disposition",
            Self::ContentDescription => "Content-Description",
            Self::ContentLocation => "Content-Location",
            Self::ContentLanguage => "Content-Language",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Builds a part from parsed header fields and a body.
///
/// Every field must be one of [`HeaderField::ALL`]; a repeated field keeps
/// its last value. Fields that are absent stay unset. Values written as an
/// RFC 2047 word are decoded.
///
/// # Errors
///
/// Returns [`Error::UnknownHeader`] with the offending name as written if a
/// field is not recognized. Unrecognized fields are never dropped silently.
pub fn build_part<I, N, V>(fields: I, body: impl Into<String>) -> Result<Part>
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut part = Part::new(body);

    for (name, value) in fields {
        let name = name.as_ref();
        let field =
            HeaderField::from_name(name).ok_or_else(|| Error::UnknownHeader(name.to_string()))?;
        part.set_field(field, value.as_ref());
    }

    Ok(part)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(HeaderField::from_name("CONTENT-TYPE"), Some(HeaderField::ContentType));
        assert_eq!(HeaderField::from_name("Content-Id"), Some(HeaderField::ContentId));
        assert_eq!(HeaderField::from_name("X-Custom"), None);
        assert_eq!(HeaderField::from_name("content-type "), None);
    }

    #[test]
    fn test_names_are_consistent() {
        for field in HeaderField::ALL {
            assert_eq!(field.display_name().to_ascii_lowercase(), field.name());
            assert_eq!(HeaderField::from_name(field.display_name()), Some(field));
        }
    }

    #[test]
    fn test_build_part_maps_every_field() {
        let fields = [
            ("content-type", "text/plain"),
            ("Content-Transfer-Encoding", "7bit"),
            ("CONTENT-ID", "<id@host>"),
            ("Content-Disposition", "inline"),
            ("Content-Description", "greeting"),
            ("Content-Location", "greeting.txt"),
            ("Content-Language", "en"),
        ];

        let part = build_part(fields, "hi").unwrap();
        assert_eq!(part.content_type.as_deref(), Some("text/plain"));
        assert_eq!(part.encoding.as_deref(), Some("7bit"));
        assert_eq!(part.id.as_deref(), Some("id@host"));
        assert_eq!(part.disposition.as_deref(), Some("inline"));
        assert_eq!(part.description.as_deref(), Some("greeting"));
        assert_eq!(part.location.as_deref(), Some("greeting.txt"));
        assert_eq!(part.language.as_deref(), Some("en"));
        assert_eq!(part.raw_content(), "hi");
    }

    #[test]
    fn test_build_part_leaves_missing_fields_unset() {
        let part = build_part([("Content-Type", "text/html")], "<p>").unwrap();
        assert_eq!(part.content_type.as_deref(), Some("text/html"));
        assert!(part.id.is_none());
        assert!(part.encoding.is_none());
    }

    #[test]
    fn test_build_part_rejects_unknown_header() {
        let fields = [("Content-Type", "text/plain"), ("X-Custom", "1")];
        match build_part(fields, "body") {
            Err(Error::UnknownHeader(name)) => assert_eq!(name, "X-Custom"),
            other => panic!("expected UnknownHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_build_part_content_id_single_pair_only() {
        let part = build_part([("Content-ID", "<<nested>>")], "").unwrap();
        assert_eq!(part.id.as_deref(), Some("<nested>"));

        let part = build_part([("Content-ID", "plain")], "").unwrap();
        assert_eq!(part.id.as_deref(), Some("plain"));
    }

    #[test]
    fn test_build_part_decodes_encoded_words_in_any_field() {
        let fields = [
            ("Content-Type", "=?utf-8?B?dGV4dC9wbGFpbgpYLUV2aWw6IDE=?="),
            ("Content-Description", "=?utf-8?Q?Gr=C3=BC=C3=9Fe?="),
            ("Content-Location", "=?UTF-8?b?SGk=?="),
        ];

        let part = build_part(fields, "").unwrap();
        assert_eq!(part.content_type.as_deref(), Some("text/plain\nX-Evil: 1"));
        assert_eq!(part.description.as_deref(), Some("Grüße"));
        assert_eq!(part.location.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_build_part_keeps_undecodable_value() {
        let part = build_part([("Content-Description", "=?utf-8?Z?abc?=")], "").unwrap();
        assert_eq!(part.description.as_deref(), Some("=?utf-8?Z?abc?="));
    }
}
