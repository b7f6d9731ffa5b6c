//! # serde_ini
//!
//! A Serde-compatible codec for INI-style configuration files.
//!
//! ## What does it do?
//!
//! The section layout is derived from the shape of your types: every member
//! of the root struct is a `[section]`, every member of a section struct is a
//! `key=value` line. Field tags written as serde renames adjust the layout
//! without any extra trait.
//!
//! ## Key Features
//!
//! - **Typed**: decode straight into your structs, with errors that name the
//!   section, key and line of a bad value
//! - **Tags**: rename, skip, `inline`, `omitempty` and `commented` fields
//!   through `#[serde(rename = "key,flag,...")]`
//! - **Lenient on keys**: missing keys decode as zero values, unknown keys
//!   are skipped; unknown sections are reported
//! - **Hooks**: take over the layout of a whole document, a section, or a
//!   single value with the [`hook`] module
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_ini = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_ini::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Settings {
//!     #[serde(rename = "Video")]
//!     video: Video,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Video {
//!     width: u32,
//!     height: u32,
//!     #[serde(rename = "fullscreen,omitempty,commented")]
//!     fullscreen: bool,
//! }
//!
//! let settings = Settings {
//!     video: Video { width: 1024, height: 768, fullscreen: true },
//! };
//!
//! let text = to_string(&settings).unwrap();
//! assert_eq!(text, "[Video]\nwidth=1024\nheight=768\n;fullscreen=true\n");
//!
//! // The commented line is not read back.
//! let back: Settings = from_str(&text).unwrap();
//! assert_eq!(back.video.width, 1024);
//! assert!(!back.video.fullscreen);
//! ```
//!
//! ### Flattening with `inline`
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_ini::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
//! struct Window {
//!     x: i32,
//!     y: i32,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
//! struct Main {
//!     title: String,
//!     #[serde(rename = ",inline")]
//!     window: Window,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
//! struct Layout {
//!     main: Main,
//! }
//!
//! let layout = Layout {
//!     main: Main { title: "Editor".into(), window: Window { x: -10, y: 20 } },
//! };
//! let text = to_string(&layout).unwrap();
//! assert_eq!(text, "[main]\ntitle='Editor'\nx=-10\ny=20\n");
//! assert_eq!(from_str::<Layout>(&text).unwrap(), layout);
//! ```
//!
//! ### Dynamic documents
//!
//! Maps work at both levels, and [`Value`] holds any leaf:
//!
//! ```rust
//! use serde_ini::{from_str, Value};
//! use std::collections::BTreeMap;
//!
//! let doc: BTreeMap<String, BTreeMap<String, Value>> =
//!     from_str("[a]\nlist=1,2\nname='x'\n").unwrap();
//! assert_eq!(doc["a"]["name"], Value::from("x"));
//! assert_eq!(doc["a"]["list"], Value::from(vec!["1", "2"]));
//! ```
//!
//! ## Format
//!
//! See the [`format`] module for the dialect accepted and produced.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`video_settings.rs`** - tags, round trip, and error reporting
//! - **`custom_hooks.rs`** - document, section and text hooks
//!
//! Run one with: `cargo run --example <name>`

pub mod de;
pub mod encoder;
pub mod error;
pub mod format;
pub mod hook;
pub mod macros;
pub mod options;
mod parser;
mod scanner;
mod ser;
mod tags;
pub mod tree;
pub mod value;

pub use de::{Decoder, Deserializer};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use hook::{DocumentCodec, SectionCodec};
pub use options::EncoderOptions;
pub use tree::{sections_of, Document, Field, Section};
pub use value::{Kind, Number, Value};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}

/// Encodes any `T: Serialize` to an INI string.
///
/// # Examples
///
/// ```rust
/// use serde_ini::to_string;
/// use std::collections::BTreeMap;
///
/// let mut server = BTreeMap::new();
/// server.insert("port", 8080);
/// let mut doc = BTreeMap::new();
/// doc.insert("server", server);
///
/// assert_eq!(to_string(&doc).unwrap(), "[server]\nport=8080\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value's type cannot be laid out as sections and
/// fields, a field tag is malformed, or a name or value cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, EncoderOptions::default())
}

/// Encodes any `T: Serialize` to an INI string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_ini::{to_string_with_options, EncoderOptions};
/// use std::collections::BTreeMap;
///
/// let mut fields = BTreeMap::new();
/// fields.insert("good", 1);
/// fields.insert("not good", 2);
/// let mut doc = BTreeMap::new();
/// doc.insert("s", fields);
///
/// let options = EncoderOptions::new().with_skip_field_encode_failure(true);
/// assert_eq!(to_string_with_options(&doc, options).unwrap(), "[s]\ngood=1\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: EncoderOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let sections = sections_of(value)?;
    let mut out = String::new();
    encoder::write_document(&mut out, &sections, &options)?;
    Ok(out)
}

/// Encodes any `T: Serialize` to INI bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

/// Encodes any `T: Serialize` to a writer.
///
/// # Examples
///
/// ```rust
/// use serde_ini::to_writer;
/// use std::collections::BTreeMap;
///
/// let doc = BTreeMap::from([("a", BTreeMap::from([("b", true)]))]);
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &doc).unwrap();
/// assert_eq!(buffer, b"[a]\nb=true\n");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails. Nothing
/// is written when encoding fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, EncoderOptions::default())
}

/// Encodes any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: EncoderOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    Encoder::with_options(writer, options).encode(value)
}

/// Decodes an instance of type `T` from INI text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_ini::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Config { server: Server }
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Server { host: String, port: u16 }
///
/// let config: Config = from_str("[server]\nhost='example.com'\n").unwrap();
/// assert_eq!(config.server, Server { host: "example.com".into(), port: 0 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed (with line and column), names
/// a section `T` has no member for, or holds a value that does not convert
/// into its member's type (with section, key and line).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_slice(s.as_bytes())
}

/// Decodes an instance of type `T` from INI bytes.
///
/// # Errors
///
/// Same as [`from_str`]. Quoted strings must decode to valid UTF-8.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_slice(v);
    T::deserialize(&mut deserializer)
}

/// Decodes an instance of type `T` from an I/O stream of INI text. The whole
/// stream is read before decoding starts.
///
/// # Examples
///
/// ```rust
/// use serde_ini::from_reader;
/// use std::collections::HashMap;
/// use std::io::Cursor;
///
/// let doc: HashMap<String, HashMap<String, f64>> =
///     from_reader(Cursor::new("[limits]\nratio=0.5\n")).unwrap();
/// assert_eq!(doc["limits"]["ratio"], 0.5);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, otherwise the same errors as
/// [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    Decoder::new(reader).decode()
}
