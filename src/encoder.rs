//! INI rendering.
//!
//! Turns the section tree built by [`sections_of`](crate::sections_of) into
//! text. Output is assembled in memory and handed to the writer in one
//! `write_all`, so a failed encode never leaves half a document behind.
//!
//! ## Value rendering
//!
//! | Value | Output |
//! |---|---|
//! | `bool` | `true` / `false` |
//! | integers | base 10 |
//! | floats | shortest round-trip decimal, `nan`, `inf`, `-inf` |
//! | text | single-quoted, non-printable bytes escaped |
//! | sequences | items joined with `,` |
//! | text codecs | verbatim |
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use serde_ini::Encoder;
//!
//! #[derive(Serialize)]
//! struct Doc {
//!     owner: Owner,
//! }
//!
//! #[derive(Serialize)]
//! struct Owner {
//!     name: String,
//!     ids: Vec<u8>,
//! }
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder
//!     .encode(&Doc { owner: Owner { name: "it's".to_string(), ids: vec![1, 2] } })
//!     .unwrap();
//! assert_eq!(encoder.into_inner(), b"[owner]\nname='it\\'s'\nids=1,2\n");
//! ```

use crate::tree::{sections_of, Field, Section};
use crate::{EncoderOptions, Error, Result, Value};
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

/// Encodes values into a writer.
///
/// The writer can be swapped with [`Encoder::reset`] to reuse the options.
pub struct Encoder<W> {
    writer: W,
    options: EncoderOptions,
}

impl<W: io::Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, EncoderOptions::default())
    }

    pub fn with_options(writer: W, options: EncoderOptions) -> Self {
        Encoder { writer, options }
    }

    /// Omit fields that fail to render instead of failing the encode.
    pub fn skip_field_encode_failure(&mut self, skip: bool) -> &mut Self {
        self.options.skip_field_encode_failure = skip;
        self
    }

    pub fn reset(&mut self, writer: W) -> &mut Self {
        self.writer = writer;
        self
    }

    /// Renders `value` and writes it out.
    ///
    /// # Errors
    ///
    /// Returns shape and tag errors from building the section tree, an
    /// [`Error::InvalidName`] for a bad section name, an [`Error::Encode`]
    /// for a field that cannot be rendered (unless skipped), and an I/O
    /// error if writing fails. Nothing is written on error.
    pub fn encode<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let sections = sections_of(value)?;
        let mut out = String::new();
        write_document(&mut out, &sections, &self.options)?;
        self.writer
            .write_all(out.as_bytes())
            .map_err(|e| Error::io(&format!("write failed: {}", e)))
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub(crate) fn write_document(
    out: &mut String,
    sections: &[Section],
    options: &EncoderOptions,
) -> Result<()> {
    for section in sections {
        write_section(out, section, options)?;
    }
    Ok(())
}

fn write_section(out: &mut String, section: &Section, options: &EncoderOptions) -> Result<()> {
    if !is_valid_name(&section.name) {
        return Err(Error::InvalidName(section.name.clone()));
    }

    let mut lines = String::new();
    for field in &section.fields {
        match write_field(&mut lines, &section.name, field) {
            Ok(()) => {}
            Err(err) if options.skip_field_encode_failure => {
                tracing::warn!(
                    section = %section.name,
                    field = %field.name,
                    error = %err,
                    "skipping field that failed to encode"
                );
            }
            Err(err) => return Err(err),
        }
    }

    if section.omit_empty && lines.is_empty() {
        return Ok(());
    }
    out.push('[');
    out.push_str(&section.name);
    out.push_str("]\n");
    out.push_str(&lines);
    Ok(())
}

fn write_field(out: &mut String, section: &str, field: &Field) -> Result<()> {
    if !is_valid_name(&field.name) {
        return Err(Error::encode(
            section,
            &field.name,
            "name must start with a letter or '_' and contain only letters, digits and '_'",
        ));
    }

    let text = if field.omit_empty && field.value.is_zero() {
        if !field.commented {
            return Ok(());
        }
        String::new()
    } else {
        let mut text = String::new();
        write_value(&mut text, &field.value, true)
            .map_err(|msg| Error::encode(section, &field.name, msg))?;
        text
    };

    if field.commented {
        out.push(';');
    }
    out.push_str(&field.name);
    out.push('=');
    out.push_str(&text);
    out.push('\n');
    Ok(())
}

fn write_value(out: &mut String, value: &Value, top: bool) -> std::result::Result<(), &'static str> {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::Text(s) => quote_string(out, s),
        Value::Raw(s) => {
            if s.contains(['\n', '\r']) {
                return Err("custom text must not contain a line break");
            }
            out.push_str(s);
        }
        Value::Seq(items) => {
            if !top {
                return Err("nested sequences cannot be encoded");
            }
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, false)?;
            }
        }
    }
    Ok(())
}

/// Single-quotes `s`. Printable ASCII is kept except `\` and `'`; every byte
/// of anything else is written as an escape.
pub(crate) fn quote_string(out: &mut String, s: &str) {
    out.push('\'');
    for &byte in s.as_bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{:02x}", byte);
            }
        }
    }
    out.push('\'');
}

fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(sections: &[Section]) -> Result<String> {
        let mut out = String::new();
        write_document(&mut out, sections, &EncoderOptions::default())?;
        Ok(out)
    }

    fn quoted(s: &str) -> String {
        let mut out = String::new();
        quote_string(&mut out, s);
        out
    }

    #[test]
    fn test_scalars() {
        let section = Section::new("s")
            .with_field(Field::new("b", true))
            .with_field(Field::new("i", -42))
            .with_field(Field::new("u", 7u64))
            .with_field(Field::new("f", 1.5))
            .with_field(Field::new("big", 1e21))
            .with_field(Field::new("small", 0.1f32))
            .with_field(Field::new("n", f64::NEG_INFINITY))
            .with_field(Field::new("nothing", Value::Null));
        assert_eq!(
            render(&[section]).unwrap(),
            "[s]\nb=true\ni=-42\nu=7\nf=1.5\nbig=1000000000000000000000\nsmall=0.1\nn=-inf\nnothing=\n"
        );
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quoted("plain text"), "'plain text'");
        assert_eq!(quoted("it's"), r"'it\'s'");
        assert_eq!(quoted(r"C:\dir"), r"'C:\\dir'");
        assert_eq!(quoted("a\nb\r"), r"'a\nb\r'");
        assert_eq!(quoted("\t"), r"'\x09'");
        assert_eq!(quoted("é"), r"'\xc3\xa9'");
    }

    #[test]
    fn test_sequences() {
        let section = Section::new("s")
            .with_field(Field::new("list", vec!["a", "b"]))
            .with_field(Field::new("gaps", Value::Seq(vec![1.into(), Value::Null])));
        assert_eq!(render(&[section]).unwrap(), "[s]\nlist='a','b'\ngaps=1,\n");

        let nested = Section::new("s").with_field(Field::new(
            "x",
            Value::Seq(vec![Value::Seq(vec![1.into()])]),
        ));
        assert!(matches!(render(&[nested]), Err(Error::Encode { .. })));
    }

    #[test]
    fn test_omit_empty_and_commented() {
        let section = Section::new("s")
            .with_field(Field::new("gone", 0).omit_empty())
            .with_field(Field::new("kept", 0))
            .with_field(Field::new("hint", false).omit_empty().commented())
            .with_field(Field::new("off", 5).commented());
        assert_eq!(render(&[section]).unwrap(), "[s]\nkept=0\n;hint=\n;off=5\n");
    }

    #[test]
    fn test_empty_omit_empty_section_drops_header() {
        let mut section = Section::new("s").with_field(Field::new("x", "").omit_empty());
        section.omit_empty = true;
        assert_eq!(render(&[section, Section::new("t")]).unwrap(), "[t]\n");
    }

    #[test]
    fn test_raw_text() {
        let ok = Section::new("s").with_field(Field::new("r", Value::Raw("1.2.3".into())));
        assert_eq!(render(&[ok]).unwrap(), "[s]\nr=1.2.3\n");

        let broken = Section::new("s").with_field(Field::new("r", Value::Raw("a\nb".into())));
        assert!(matches!(render(&[broken]), Err(Error::Encode { .. })));
    }

    #[test]
    fn test_names() {
        assert!(is_valid_name("_a1"));
        assert!(!is_valid_name("1a"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a-b"));

        let err = render(&[Section::new("bad name")]).unwrap_err();
        assert!(matches!(err, Error::InvalidName(name) if name == "bad name"));
    }

    #[test]
    fn test_skip_field_encode_failure() {
        let section = Section::new("s")
            .with_field(Field::new("a", 1))
            .with_field(Field::new("b-c", 2))
            .with_field(Field::new("d", 3));
        let options = EncoderOptions::new().with_skip_field_encode_failure(true);
        let mut out = String::new();
        write_document(&mut out, &[section.clone()], &options).unwrap();
        assert_eq!(out, "[s]\na=1\nd=3\n");

        let err = render(&[section]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to encode field 'b-c' in section 's': \
             name must start with a letter or '_' and contain only letters, digits and '_'"
        );
    }

    #[test]
    fn test_encoder_writes_nothing_on_error() {
        let mut doc = std::collections::BTreeMap::new();
        doc.insert("s", std::collections::BTreeMap::from([("bad-key", 1)]));
        let mut encoder = Encoder::new(Vec::new());
        assert!(encoder.encode(&doc).is_err());
        assert!(encoder.get_ref().is_empty());

        encoder.skip_field_encode_failure(true).encode(&doc).unwrap();
        assert_eq!(encoder.get_ref().as_slice(), b"[s]\n");
    }
}
