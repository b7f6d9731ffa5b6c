//! Error types for INI encoding and decoding.
//!
//! Every failure the crate can report is a variant of [`Error`]:
//!
//! - **Shape errors**: the value (or one of its members) has a type that cannot
//!   be laid out as sections and fields
//! - **Annotation errors**: a field tag carries an unknown or duplicated flag
//! - **Syntax errors**: malformed input, always with line and column
//! - **Semantic decode errors**: a key outside any section, an unknown section,
//!   or a value that does not convert to the target type
//! - **Field encode errors**: a single field could not be rendered; these can be
//!   skipped with [`EncoderOptions::with_skip_field_encode_failure`]
//!
//! Several annotation errors found in one type are merged into
//! [`Error::Multiple`] so they can all be fixed at once.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_ini::{from_str, Error};
//!
//! #[derive(Debug, Deserialize)]
//! struct Config {
//!     server: Server,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Server {
//!     port: u16,
//! }
//!
//! let err = from_str::<Config>("[server]\nport=8080 !\n").unwrap_err();
//! assert!(matches!(err, Error::ExpectedNewline { line: 2, .. }));
//! ```
//!
//! [`EncoderOptions::with_skip_field_encode_failure`]: crate::EncoderOptions::with_skip_field_encode_failure

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during INI encoding/decoding.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed input with the position it was detected at
    #[error("syntax error at {line}:{col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// A character that no grammar rule accepts at this position
    #[error("unexpected {found} at {line}:{col}")]
    UnexpectedChar {
        line: usize,
        col: usize,
        found: String,
    },

    /// A construct was followed by something other than a line break
    #[error("expected new line at {line}:{col}")]
    ExpectedNewline { line: usize, col: usize },

    /// A `key=value` line appeared before any `[section]` header
    #[error("key must be under section at {line}:{col}")]
    KeyOutsideSection { line: usize, col: usize },

    /// A `[section]` header that the target value has no member for
    #[error("unknown section named '{name}' at line {line}")]
    UnknownSection { name: String, line: usize },

    #[error("unknown flag '{flag}' for field '{field}' in type '{owner}'")]
    UnknownFlag {
        flag: String,
        field: String,
        owner: String,
    },

    #[error("duplicate flag '{flag}' for field '{field}' in type '{owner}'")]
    DuplicateFlag {
        flag: String,
        field: String,
        owner: String,
    },

    /// A field tag that cannot be parsed at all
    #[error("invalid tag '{tag}' in type '{owner}': {msg}")]
    InvalidTag {
        tag: String,
        owner: String,
        msg: String,
    },

    /// The value's type cannot be mapped onto sections and fields
    #[error("invalid type: {0}")]
    Shape(String),

    /// A value that failed to convert, with the key it was read from
    #[error("failed to decode key '{key}' in section '{section}'{}: {source}", line_suffix(.line))]
    Field {
        section: String,
        key: String,
        line: Option<usize>,
        source: Box<Error>,
    },

    /// A section or field name outside `[A-Za-z_][A-Za-z0-9_]*`
    #[error("invalid name '{0}': must start with a letter or '_' and contain only letters, digits and '_'")]
    InvalidName(String),

    /// A single field that could not be rendered
    #[error("failed to encode field '{field}' in section '{section}': {msg}")]
    Encode {
        section: String,
        field: String,
        msg: String,
    },

    /// Scalar conversion failure
    #[error("parsing failed: {0}")]
    Parse(String),

    /// Independent errors collected from one level of a type
    #[error("{}", join_errors(.0))]
    Multiple(Vec<Error>),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|line| format!(" at line {}", line))
        .unwrap_or_default()
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ini::Error;
    ///
    /// let err = Error::syntax(10, 5, "unterminated string");
    /// assert_eq!(err.to_string(), "syntax error at 10:5: unterminated string");
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an error for a byte no grammar rule accepts. The zero byte
    /// stands for the end of the input.
    pub fn unexpected_char(line: usize, col: usize, byte: u8) -> Self {
        let found = match byte {
            0 => "end of input".to_string(),
            b'\n' | b'\r' => "new line".to_string(),
            _ => format!("character '{}'", byte.escape_ascii()),
        };
        Error::UnexpectedChar { line, col, found }
    }

    pub fn expected_newline(line: usize, col: usize) -> Self {
        Error::ExpectedNewline { line, col }
    }

    /// Creates a shape error for a type that cannot be mapped onto the INI tree.
    pub fn shape<T: fmt::Display>(msg: T) -> Self {
        Error::Shape(msg.to_string())
    }

    /// Shape error for a member whose type is neither a leaf nor an inlined
    /// record/map.
    pub fn unsupported_member(field: &str, owner: &str) -> Self {
        Error::Shape(format!(
            "type of field '{}' in type '{}' must be bool, int, float, string, \
             sequence, or struct/map with 'inline' tag",
            field, owner
        ))
    }

    pub fn parse<T: fmt::Display>(msg: T) -> Self {
        Error::Parse(msg.to_string())
    }

    pub fn encode(section: &str, field: &str, msg: &str) -> Self {
        Error::Encode {
            section: section.to_string(),
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Wraps a conversion failure with the key it was read from.
    pub fn in_field(self, section: &str, key: &str, line: Option<usize>) -> Self {
        Error::Field {
            section: section.to_string(),
            key: key.to_string(),
            line,
            source: Box::new(self),
        }
    }

    /// Merges independent errors: `None` when there are none, the error
    /// itself when there is exactly one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ini::Error;
    ///
    /// assert!(Error::combine(Vec::new()).is_none());
    ///
    /// let merged = Error::combine(vec![Error::custom("a"), Error::custom("b")]).unwrap();
    /// assert_eq!(merged.to_string(), "a\nb");
    /// ```
    pub fn combine(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Multiple(errors)),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Line and column of syntax-class errors.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::Syntax { line, col, .. }
            | Error::UnexpectedChar { line, col, .. }
            | Error::ExpectedNewline { line, col }
            | Error::KeyOutsideSection { line, col } => Some((*line, *col)),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
