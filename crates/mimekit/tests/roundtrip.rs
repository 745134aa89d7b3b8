//! Integration tests for multipart assembly and disassembly.
//!
//! Set `RUST_LOG=mimekit=trace` to see boundary scanning while debugging.

#![allow(clippy::unwrap_used)]

use mimekit::{
    Boundary, CRLF, Error, HeaderField, LF, Message, Part, TransferEncoding, disassemble,
    generate_message,
};
use proptest::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mimekit=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

fn sample_parts() -> Vec<Part> {
    vec![
        Part::new("Plain text body\r\nwith two lines")
            .with_type("text/plain; charset=utf-8")
            .with_encoding("7bit"),
        Part::encoded(b"\x00\x01binary\xff", TransferEncoding::Base64, CRLF)
            .with_type("application/octet-stream")
            .with_id("<logo@example.com>")
            .with_disposition("attachment; filename=\"logo.bin\"")
            .with_description("Company logo, ünïcode")
            .with_location("https://example.com/logo.bin")
            .with_language("en-GB"),
        Part::new(""),
    ]
}

#[test]
fn test_round_trip_through_message() {
    init_tracing();

    let mut message = Message::with_boundary("=_mimekit_test");
    for part in sample_parts() {
        message.add_part(part);
    }

    let body = message.generate_message(CRLF);
    let parsed = Message::from_raw(&body, "=_mimekit_test", CRLF).unwrap();

    assert_eq!(parsed.parts(), message.parts());
    assert_eq!(parsed.part(1).unwrap().id.as_deref(), Some("logo@example.com"));
    assert_eq!(
        parsed.part(1).unwrap().decoded_content().unwrap(),
        b"\x00\x01binary\xff"
    );
    assert_eq!(parsed.generate_message(CRLF), body);
}

#[test]
fn test_round_trip_with_generated_boundary() {
    init_tracing();

    let message: Message = sample_parts().into_iter().collect();
    let body = message.generate_message(LF);
    let boundary = message.boundary_provider().as_str();

    let parsed = Message::from_raw(&body, boundary, LF).unwrap();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.part(0).unwrap().raw_content(), "Plain text body\nwith two lines");
}

#[test]
fn test_wire_layout() {
    let parts = [
        Part::new("A").with_type("text/plain"),
        Part::new("B").with_id("b@x"),
    ];
    let body = generate_message(&parts, &Boundary::new("XYZ"), CRLF);

    let lines: Vec<&str> = body.split(CRLF).collect();
    assert_eq!(
        lines,
        [
            mimekit::multipart::PREAMBLE,
            "",
            "--XYZ",
            "Content-Type: text/plain",
            "",
            "A",
            "--XYZ",
            "Content-ID: <b@x>",
            "",
            "B",
            "--XYZ--",
        ]
    );
}

#[test]
fn test_single_part_ignores_headers() {
    let part = Part::new("Hello").with_type("text/html").with_id("<z>");
    assert_eq!(generate_message(&[part], &Boundary::new("XYZ"), CRLF), "Hello");
}

#[test]
fn test_boundary_text_inside_body_lines() {
    init_tracing();

    let parts = vec![
        Part::new("quoting --XYZ in text\n--XYZ-not-a-delimiter"),
        Part::new("tail"),
    ];
    let body = generate_message(&parts, &Boundary::new("XYZ"), LF);
    let parsed = Message::from_raw(&body, "XYZ", LF).unwrap();
    assert_eq!(parsed.parts(), parts.as_slice());
}

#[test]
fn test_header_values_survive_as_written() {
    init_tracing();

    let parts = vec![
        Part::new("A")
            .with_location("=?utf-8?B?SGk=?=")
            .with_description(" padded "),
        Part::new("B")
            .with_type("text/plain\nX-Evil: 1")
            .with_id("<a\r\n\r\nb@x>"),
    ];

    for eol in [CRLF, LF] {
        let body = generate_message(&parts, &Boundary::new("XYZ"), eol);
        assert!(!body.contains("X-Evil"));

        let parsed = Message::from_raw(&body, "XYZ", eol).unwrap();
        assert_eq!(parsed.parts(), parts.as_slice());
    }
}

#[test]
fn test_body_line_breaks_follow_eol() {
    let parts = vec![Part::new("A\r"), Part::new(" \r\nB\n")];
    let body = generate_message(&parts, &Boundary::new("XYZ"), LF);
    let parsed = Message::from_raw(&body, "XYZ", LF).unwrap();

    assert_eq!(parsed.part(0).unwrap().raw_content(), "A\n");
    assert_eq!(parsed.part(1).unwrap().raw_content(), " \nB\n");
}

#[test]
fn test_disassemble_without_delimiters() {
    assert!(disassemble("Hello, World!", "XYZ").unwrap().is_empty());
}

#[test]
fn test_disassemble_without_terminator() {
    let err = disassemble("--XYZ\n\nA\n--XYZ\n\nB\n", "XYZ").unwrap_err();
    assert!(matches!(err, Error::MalformedMessage(_)));
    assert!(err.to_string().contains("--XYZ--"));
}

#[test]
fn test_unknown_header_names_field() {
    let raw = "--XYZ\r\nX-Custom: yes\r\n\r\nbody\r\n--XYZ--\r\n";
    let err = Message::from_raw(raw, "XYZ", CRLF).unwrap_err();
    assert!(matches!(&err, Error::UnknownHeader(name) if name == "X-Custom"));
    assert_eq!(err.to_string(), "Unknown header for MIME part: X-Custom");
}

#[test]
fn test_foreign_message_with_preamble_and_epilogue() {
    init_tracing();

    let raw = concat!(
        "This is a multi-part message in MIME format.\n",
        "\n",
        "--frontier\n",
        "Content-Type: text/plain\n",
        "\n",
        "This is the body of the message.\n",
        "--frontier\n",
        "Content-Type: application/octet-stream\n",
        "Content-Transfer-Encoding: base64\n",
        "\n",
        "PGh0bWw+CiAgPGhlYWQ+CiAgPC9oZWFkPgo=\n",
        "--frontier--\n",
        "epilogue is ignored\n",
    );

    let message = Message::from_raw(raw, "frontier", LF).unwrap();
    assert_eq!(message.len(), 2);
    assert_eq!(message.part(0).unwrap().raw_content(), "This is the body of the message.");
    assert_eq!(
        message.part(1).unwrap().decoded_text().unwrap(),
        "<html>\n  <head>\n  </head>\n"
    );
}

/// Header values with edge whitespace, line breaks and `=?` sequences.
fn field() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[ \t\r\na-z0-9/;=?.é-]{0,24}")
}

/// Bodies with blank lines, bare `\r` and edge whitespace. Only lines that
/// could read as a delimiter for a generated boundary are excluded.
fn body() -> impl Strategy<Value = String> {
    "[ \t\r\nA-Za-z0-9=_.,:!?é-]{0,60}".prop_filter("boundary-like line", |body| {
        !body.lines().any(|line| line.trim_start().starts_with("--=_"))
    })
}

fn part_strategy() -> impl Strategy<Value = Part> {
    (
        body(),
        field(),
        field(),
        proptest::option::of(("[ \r\na-z0-9.=?]{0,12}@[a-z]{1,8}", any::<bool>())),
        field(),
        field(),
        field(),
        field(),
    )
        .prop_map(
            |(body, content_type, encoding, id, disposition, description, location, language)| {
                let mut part = Part::new(body);
                part.content_type = content_type;
                part.encoding = encoding;
                part.disposition = disposition;
                part.description = description;
                part.location = location;
                part.language = language;
                if let Some((id, bracketed)) = id {
                    part = part.with_id(if bracketed { format!("<{id}>") } else { id });
                }
                part
            },
        )
}

proptest! {
    #[test]
    fn prop_round_trip(
        parts in proptest::collection::vec(part_strategy(), 2..6),
        crlf in any::<bool>(),
    ) {
        let eol = if crlf { CRLF } else { LF };
        let boundary = Boundary::generate();

        let body = generate_message(&parts, &boundary, eol);
        let parsed = Message::from_raw(&body, boundary.as_str(), eol).unwrap();

        prop_assert_eq!(parsed.len(), parts.len());
        for (part, original) in parsed.iter().zip(&parts) {
            for field in HeaderField::ALL {
                prop_assert_eq!(part.field(field), original.field(field), "{}", field);
            }
            prop_assert_eq!(part.raw_content(), original.content(eol));
        }
    }

    #[test]
    fn prop_disassemble_never_panics(body in "(--XYZ|\r|\n|[a-z:]){0,40}") {
        let _ = disassemble(&body, "XYZ");
    }
}
