//! INI grammar.
//!
//! Turns input bytes into raw sections: names, keys and unescaped value items,
//! with the line each came from. Nothing here knows about the target type
//! beyond the set of section names it accepts.

use crate::scanner::{Scanner, Step};
use crate::{Error, Result, Value};
use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RawSection {
    pub line: usize,
    pub fields: IndexMap<String, RawValue>,
}

/// A scanned value: one item per comma-separated element. An item with
/// nothing in it is `None`; a quoted `''` is an empty string.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RawValue {
    pub items: Vec<Option<String>>,
    pub line: usize,
}

impl RawValue {
    /// `key=` with nothing after the equal sign.
    pub fn is_empty(&self) -> bool {
        matches!(self.items.as_slice(), [None])
    }

    pub fn into_value(self) -> Value {
        let mut items: Vec<Value> = self
            .items
            .into_iter()
            .map(|item| item.map_or(Value::Null, Value::Text))
            .collect();
        if items.len() == 1 {
            items.remove(0)
        } else {
            Value::Seq(items)
        }
    }
}

#[inline]
fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

#[inline]
fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[inline]
fn is_newline(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn ascii(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses a whole document.
///
/// With `known` set, a header naming anything else is an error; otherwise
/// every section is collected.
pub(crate) fn parse(
    input: &[u8],
    known: Option<&[String]>,
) -> Result<IndexMap<String, RawSection>> {
    let mut scan = Scanner::new(input);
    let mut sections: IndexMap<String, RawSection> = IndexMap::new();
    let mut current: Option<usize> = None;

    loop {
        scan.skip_spaces();
        if scan.is_eof() {
            break;
        }

        let (line, col) = (scan.line(), scan.column());
        match scan.peek() {
            byte if is_newline(byte) => {}
            b'[' => {
                let name = section_header(&mut scan)?;
                if let Some(known) = known {
                    if !known.iter().any(|k| *k == name) {
                        return Err(Error::UnknownSection { name, line });
                    }
                }
                tracing::trace!(section = %name, line, "opened section");
                let entry = sections.entry(name);
                current = Some(entry.index());
                entry.or_insert_with(|| RawSection {
                    line,
                    fields: IndexMap::new(),
                });
            }
            b'#' | b';' => {
                scan.take_until(is_newline);
            }
            byte if is_name_start(byte) => {
                let key = ascii(scan.take_while(is_name_char));
                scan.skip_spaces();
                if !scan.consume(b'=') {
                    return Err(Error::unexpected_char(scan.line(), scan.column(), scan.peek()));
                }
                let items = value(&mut scan)?;
                let section = current
                    .and_then(|index| sections.get_index_mut(index))
                    .map(|(_, section)| section)
                    .ok_or(Error::KeyOutsideSection { line, col })?;
                section.fields.insert(key, RawValue { items, line });
            }
            byte => return Err(Error::unexpected_char(line, col, byte)),
        }

        scan.skip_spaces();
        if scan.is_eof() {
            break;
        }
        if !scan.handle_newline() {
            return Err(Error::expected_newline(scan.line(), scan.column()));
        }
    }

    Ok(sections)
}

fn section_header(scan: &mut Scanner<'_>) -> Result<String> {
    scan.advance();
    scan.skip_spaces();
    let name = scan.take_while(is_name_char);
    scan.skip_spaces();
    if name.is_empty() || !scan.consume(b']') {
        return Err(Error::unexpected_char(scan.line(), scan.column(), scan.peek()));
    }
    Ok(ascii(name))
}

/// Parses a value and its optional trailing comment.
fn value(scan: &mut Scanner<'_>) -> Result<Vec<Option<String>>> {
    let mut items = Vec::new();
    loop {
        scan.skip_spaces();
        items.push(item(scan)?);
        scan.skip_spaces();
        if !scan.consume(b',') {
            break;
        }
    }
    if scan.consume(b';') {
        scan.take_until(is_newline);
    }
    Ok(items)
}

fn item(scan: &mut Scanner<'_>) -> Result<Option<String>> {
    let (line, col) = (scan.line(), scan.column());
    let text = match scan.peek() {
        b'\'' => {
            scan.advance();
            let bytes = scan.take(string_char)?;
            if !scan.consume(b'\'') {
                return Err(Error::syntax(line, col, "unterminated string"));
            }
            String::from_utf8(bytes)
                .map_err(|_| Error::syntax(line, col, "invalid UTF-8 in string"))?
        }
        b'"' => {
            scan.advance();
            let bytes = scan.take_until(|byte| byte == b'"' || is_newline(byte));
            if !scan.consume(b'"') {
                return Err(Error::syntax(line, col, "unterminated string"));
            }
            std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|_| Error::syntax(line, col, "invalid UTF-8 in string"))?
        }
        byte if byte.is_ascii_digit() => numeral(scan),
        sign @ (b'-' | b'+') if scan.look_ahead(1).is_ascii_digit() => {
            scan.advance();
            format!("{}{}", sign as char, numeral(scan))
        }
        sign @ (b'-' | b'+') if is_name_start(scan.look_ahead(1)) => {
            scan.advance();
            format!("{}{}", sign as char, ascii(scan.take_while(is_name_char)))
        }
        byte if is_name_start(byte) => ascii(scan.take_while(is_name_char)),
        _ if scan.is_eof() || is_newline(scan.peek()) => return Ok(None),
        byte => return Err(Error::unexpected_char(line, col, byte)),
    };
    Ok(Some(text))
}

fn numeral(scan: &mut Scanner<'_>) -> String {
    let mut text = ascii(scan.take_while(|byte| byte.is_ascii_digit()));
    if scan.consume(b'.') {
        text.push('.');
        text.push_str(&ascii(scan.take_while(|byte| byte.is_ascii_digit())));
    }
    text
}

/// Producer for single-quoted strings: stops before the closing quote or a
/// line break and decodes escape sequences.
fn string_char(scan: &mut Scanner<'_>) -> Result<Step> {
    let byte = scan.peek();
    if byte == b'\'' || is_newline(byte) {
        return Ok(Step::Stop);
    }
    if byte != b'\\' {
        return Ok(Step::Emit(scan.advance()));
    }

    let (line, col) = (scan.line(), scan.column());
    scan.advance();
    if scan.is_eof() {
        return Err(Error::syntax(line, col, "unterminated string"));
    }
    let decoded = match scan.advance() {
        b'\n' | b'\r' | b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'\\' => b'\\',
        b'\'' => b'\'',
        b'"' => b'"',
        b'x' => match (hex_digit(scan.peek()), hex_digit(scan.look_ahead(1))) {
            (Some(high), Some(low)) => {
                scan.advance();
                scan.advance();
                (high << 4) | low
            }
            _ => return Err(Error::syntax(line, col, "invalid hex escape sequence")),
        },
        _ => return Err(Error::syntax(line, col, "invalid escape sequence")),
    };
    Ok(Step::Emit(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(raw: &RawValue) -> Vec<&str> {
        raw.items.iter().map(|item| item.as_deref().unwrap_or("")).collect()
    }

    fn items(input: &str) -> Vec<String> {
        let sections = parse(input.as_bytes(), None).unwrap();
        let (_, section) = sections.first().unwrap();
        let (_, raw) = section.fields.first().unwrap();
        texts(raw).into_iter().map(str::to_string).collect()
    }

    #[test]
    fn test_sections_and_keys() {
        let sections = parse(
            b"; leading comment\n\n[Video]\nwidth=1024\n  height = 768\n# other\n[Audio]\nvolume=3\n",
            None,
        )
        .unwrap();
        assert_eq!(sections.len(), 2);
        let video = &sections["Video"];
        assert_eq!(video.line, 3);
        assert_eq!(texts(&video.fields["width"]), ["1024"]);
        assert_eq!(video.fields["height"].line, 5);
        assert_eq!(texts(&sections["Audio"].fields["volume"]), ["3"]);
    }

    #[test]
    fn test_value_forms() {
        assert_eq!(items("[s]\nk='it\\'s \\x41\\n'"), ["it's A\n"]);
        assert_eq!(items("[s]\nk=\"no \\escapes\""), ["no \\escapes"]);
        assert_eq!(items("[s]\nk=12.50"), ["12.50"]);
        assert_eq!(items("[s]\nk=-3"), ["-3"]);
        assert_eq!(items("[s]\nk=-inf"), ["-inf"]);
        assert_eq!(items("[s]\nk=true"), ["true"]);
        assert_eq!(items("[s]\nk="), [""]);
        assert_eq!(items("[s]\nk=  \n"), [""]);
    }

    #[test]
    fn test_lists_and_trailing_comment() {
        assert_eq!(items("[s]\nk=1, 'a,b' ,x ; note"), ["1", "a,b", "x"]);
        assert_eq!(items("[s]\nk=1,\n"), ["1", ""]);
    }

    #[test]
    fn test_quoted_empty_item_is_not_an_empty_value() {
        let sections = parse(b"[s]\nbare=\nquoted=''\nlist='',x,\n", None).unwrap();
        let fields = &sections["s"].fields;
        assert_eq!(fields["bare"].items, [None]);
        assert!(fields["bare"].is_empty());
        assert_eq!(fields["quoted"].items, [Some(String::new())]);
        assert!(!fields["quoted"].is_empty());
        assert_eq!(
            fields["list"].items,
            [Some(String::new()), Some("x".to_string()), None]
        );
    }

    #[test]
    fn test_quoted_text_is_not_trimmed() {
        assert_eq!(items("[s]\nk='  padded  '"), ["  padded  "]);
    }

    #[test]
    fn test_utf8_escapes() {
        assert_eq!(items("[s]\nk='\\xf0\\x9f\\x8e\\x89'"), ["🎉"]);
        let err = parse(b"[s]\nk='\\xff'", None).unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, col: 3, .. }));
    }

    #[test]
    fn test_escaped_line_break() {
        assert_eq!(items("[s]\nk='a\\\nb'"), ["a\nb"]);
    }

    #[test]
    fn test_line_endings() {
        let sections = parse(b"[a]\r\nx=1\r[b]\ny=2", None).unwrap();
        assert_eq!(texts(&sections["a"].fields["x"]), ["1"]);
        assert_eq!(sections["b"].fields["y"].line, 4);
    }

    #[test]
    fn test_reopened_section_and_duplicate_keys() {
        let sections = parse(b"[a]\nx=1\n[b]\n[a]\nx=2\ny=3\n", None).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(texts(&sections["a"].fields["x"]), ["2"]);
        assert_eq!(sections["a"].fields.len(), 2);
    }

    #[test]
    fn test_key_outside_section() {
        let err = parse(b"\nkey=1\n", None).unwrap_err();
        assert!(matches!(err, Error::KeyOutsideSection { line: 2, col: 1 }));
    }

    #[test]
    fn test_unknown_section() {
        let known = vec!["a".to_string()];
        let err = parse(b"[a]\n[b]\n", Some(known.as_slice())).unwrap_err();
        assert_eq!(err.to_string(), "unknown section named 'b' at line 2");
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse(b"[a]\nk=@\n", None).unwrap_err();
        assert_eq!(err.to_string(), "unexpected character '@' at 2:3");

        let err = parse(b"[a]\nk=1 2\n", None).unwrap_err();
        assert!(matches!(err, Error::ExpectedNewline { line: 2, col: 5 }));

        let err = parse(b"[]\n", None).unwrap_err();
        assert!(matches!(err, Error::UnexpectedChar { line: 1, col: 2, .. }));

        let err = parse(b"[a\n", None).unwrap_err();
        assert_eq!(err.to_string(), "unexpected new line at 1:3");

        let err = parse(b"[a]\nk='open\n", None).unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, col: 3, .. }));

        let err = parse(b"[a]\nk=\"open", None).unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, col: 3, .. }));

        let err = parse(b"[a]\nk='\\q'\n", None).unwrap_err();
        assert_eq!(err.to_string(), "syntax error at 2:4: invalid escape sequence");

        let err = parse(b"[a]\nk='\\x4'\n", None).unwrap_err();
        assert!(err.to_string().contains("invalid hex escape"));

        let err = parse(b"[a]\nkey 1\n", None).unwrap_err();
        assert_eq!(err.to_string(), "unexpected character '1' at 2:5");
    }

    #[test]
    fn test_into_value() {
        let raw = |items: &[Option<&str>]| RawValue {
            items: items.iter().map(|s| s.map(str::to_string)).collect(),
            line: 1,
        };
        assert_eq!(raw(&[None]).into_value(), Value::Null);
        assert_eq!(raw(&[Some("")]).into_value(), Value::Text(String::new()));
        assert_eq!(raw(&[Some("x")]).into_value(), Value::Text("x".into()));
        assert_eq!(
            raw(&[Some("1"), None]).into_value(),
            Value::Seq(vec![Value::Text("1".into()), Value::Null])
        );
    }
}
