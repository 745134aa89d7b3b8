//! # mimekit
//!
//! MIME multipart assembly and disassembly for mail composition.
//!
//! ## Features
//!
//! - **Assembly**: Render an ordered list of parts as one multipart body
//! - **Disassembly**: Split a multipart body back into parts, given its boundary
//! - **Strict reconstruction**: Unknown part headers are reported, never dropped
//! - **Encoding/Decoding**: Base64, Quoted-Printable, RFC 2047 header words
//!
//! ## Quick Start
//!
//! ### Building a multipart body
//!
//! ```ignore
//! use mimekit::{Message, Part, CRLF};
//!
//! let mut message = Message::with_boundary("=_example");
//! message.add_part(Part::new("Hello").with_type("text/plain"));
//! message.add_part(Part::new("<p>Hello</p>").with_type("text/html"));
//!
//! let body = message.generate_message(CRLF);
//! let content_type = message.content_type()?; // multipart/mixed; boundary="=_example"
//! ```
//!
//! ### Parsing a multipart body
//!
//! ```ignore
//! use mimekit::{Message, CRLF};
//!
//! let message = Message::from_raw(&body, "=_example", CRLF)?;
//! for part in &message {
//!     println!("{:?}: {}", part.content_type, part.raw_content());
//! }
//! ```
//!
//! ### Attachments
//!
//! ```ignore
//! use mimekit::{Part, TransferEncoding, CRLF};
//!
//! let attachment = Part::encoded(&bytes, TransferEncoding::Base64, CRLF)
//!     .with_type("application/pdf")
//!     .with_disposition("attachment; filename=\"report.pdf\"");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod boundary;
mod content_type;
mod error;
mod field;
mod message;
mod part;

pub mod encoding;
pub mod header;
pub mod multipart;

pub use boundary::{Boundary, BoundaryProvider};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use field::{HeaderField, build_part};
pub use message::Message;
pub use multipart::{RawPartBlock, disassemble, generate_message};
pub use part::{Part, TransferEncoding};

/// CRLF line ending, as required on the wire (RFC 5322).
pub const CRLF: &str = "\r\n";

/// LF line ending, for local storage and tests.
pub const LF: &str = "\n";
