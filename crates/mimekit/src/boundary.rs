//! Multipart boundary tokens.
//!
//! A boundary separates the parts of a multipart body. Interior separators
//! are `--token` on their own line; the closing delimiter is `--token--`.

use std::fmt;

/// Formats the delimiter lines of a multipart body.
pub trait BoundaryProvider {
    /// Returns the bare boundary token.
    fn token(&self) -> &str;

    /// Returns an interior separator line, surrounded by `eol`.
    ///
    /// The leading line break belongs to the delimiter, not to the preceding
    /// part's content.
    fn boundary_line(&self, eol: &str) -> String {
        format!("{eol}--{}{eol}", self.token())
    }

    /// Returns the closing delimiter line, surrounded by `eol`.
    fn mime_end(&self, eol: &str) -> String {
        format!("{eol}--{}--{eol}", self.token())
    }
}

/// A boundary token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Boundary(String);

impl Boundary {
    /// Wraps a caller-chosen token.
    ///
    /// The token is not validated; it must not occur in any part body.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generates a random token.
    ///
    /// The `=_` prefix never appears in Base64 or Quoted-Printable output.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("=_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl BoundaryProvider for Boundary {
    fn token(&self) -> &str {
        &self.0
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Boundary {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Boundary {
    fn from(token: String) -> Self {
        Self(token)
    }
}
