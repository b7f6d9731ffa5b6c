//! The INI dialect read and written by this crate.
//!
//! This module contains no code.
//!
//! # Lines
//!
//! Input is a sequence of lines ended by `\n`, `\r\n` or `\r`. The last line
//! may end at the end of input instead. Leading spaces are ignored,
//! and each line is one of:
//!
//! - `[name]`: a section header
//! - `key=value`: a field, only valid after a header
//! - `# ...` or `; ...`: a comment
//! - nothing: a blank line
//!
//! Anything after a header or a value other than spaces and a line break is
//! an error. Key names match `[A-Za-z_][A-Za-z0-9_]*`; section names may
//! also start with a digit when read, but are written with the key rule.
//!
//! # Values
//!
//! A value is one item or a comma separated list of items:
//!
//! | Item | Example | Notes |
//! |------|---------|-------|
//! | empty | `key=` | the zero value of the target; `''` is an empty string instead |
//! | number | `42`, `-7`, `3.25` | digits, optional fraction, optional sign |
//! | word | `true`, `Borderless`, `-inf` | letters, digits and `_`, optional sign |
//! | single-quoted | `'it\'s'` | escapes `\n \r \t \\ \' \"` and `\xHH` |
//! | double-quoted | `"C:\dir"` | taken as is, no escapes |
//!
//! A backslash at the end of a line inside a single-quoted string stands for
//! `\n`. `\xHH` escapes produce bytes; the decoded text must be UTF-8.
//! Quoted strings never span lines. A `;` after a value starts a comment.
//!
//! # Example
//!
//! ```text
//! [Video]
//! width=1024
//! height=768
//! ;fullscreen=true
//!
//! [Audio]
//! volume=0.75 ; master volume
//! devices='Speakers','Headset \x231'
//! ```
//!
//! `;fullscreen=true` is a comment: a field tagged `commented` is written
//! this way so it documents the key without setting it.
//!
//! # Mapping to Rust types
//!
//! - the root is a struct or a map; each member is a section
//! - each member of a section struct is a key
//! - `Vec`s, tuples and arrays are lists
//! - unit enum variants are written as words
//! - keys missing from the input decode as zero values, and `Option`s as
//!   `None`
//!
//! Field tags in `#[serde(rename = "...")]` adjust the layout:
//!
//! | Tag | Effect |
//! |-----|--------|
//! | `"name"` | use `name` as the key or section name |
//! | `"-"` | skip the member |
//! | `"name,omitempty"` | do not write zero or empty values |
//! | `"name,commented"` | write the line behind `;` |
//! | `",inline"` | flatten a struct or map into the enclosing section |
