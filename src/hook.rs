//! Overriding how a type is laid out.
//!
//! Three roles replace the shape-walker for a type:
//!
//! - **Document**: the type produces and consumes a whole [`Document`]
//!   ([`DocumentCodec`]); only valid as the root
//! - **Section**: the type produces and consumes the fields of one section
//!   ([`SectionCodec`]); valid as a member of the root or inside a section
//! - **Text**: the type is written verbatim through `Display` and read back
//!   through `FromStr`; valid wherever a leaf is
//!
//! A role is attached either per field with `#[serde(with = "...")]` using
//! the [`document`], [`section`] and [`text`] modules, or for the type itself
//! with [`impl_ini_codec!`](crate::impl_ini_codec).
//!
//! ## Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_ini::hook::SectionCodec;
//! use serde_ini::{from_str, impl_ini_codec, to_string, Field, Section};
//!
//! #[derive(Debug, PartialEq)]
//! struct Ports(Vec<u16>);
//!
//! impl SectionCodec for Ports {
//!     fn to_section(&self) -> serde_ini::Result<Section> {
//!         Ok(Section::new("ignored").with_field(Field::new("list", self.0.clone())))
//!     }
//!
//!     fn from_section(section: Section) -> serde_ini::Result<Self> {
//!         match section.field("list") {
//!             Some(field) => Ok(Ports(field.parse()?)),
//!             None => Ok(Ports(Vec::new())),
//!         }
//!     }
//! }
//!
//! impl_ini_codec!(section Ports);
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Config {
//!     ports: Ports,
//! }
//!
//! let text = to_string(&Config { ports: Ports(vec![80, 443]) }).unwrap();
//! assert_eq!(text, "[ports]\nlist=80,443\n");
//!
//! let config: Config = from_str(&text).unwrap();
//! assert_eq!(config.ports, Ports(vec![80, 443]));
//! ```

use crate::ser::{DOCUMENT_TOKEN, SECTION_NAME_KEY, SECTION_TOKEN};
use crate::tree::{Document, Field, Section};
use crate::{Result, Value};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeTuple, Serializer};
use std::fmt;

/// A type that lays itself out as a whole document.
pub trait DocumentCodec: Sized {
    /// # Errors
    ///
    /// Any error aborts the encode and is reported as is.
    fn to_document(&self) -> Result<Document>;

    /// Receives every section of the input, in input order.
    ///
    /// # Errors
    ///
    /// Any error aborts the decode and is reported as is.
    fn from_document(document: Document) -> Result<Self>;
}

/// A type that lays itself out as the fields of one section.
///
/// The name of the section returned by `to_section` is not used; the member
/// holding the value names the section.
pub trait SectionCodec: Sized {
    /// # Errors
    ///
    /// Any error aborts the encode and is reported as is.
    fn to_section(&self) -> Result<Section>;

    /// Receives the section's name and every field under it that no sibling
    /// member claims. Values are [`Value::Text`], a [`Value::Seq`] of them
    /// for lists, or [`Value::Null`] for empty values.
    ///
    /// # Errors
    ///
    /// Any error aborts the decode and is reported as is.
    fn from_section(section: Section) -> Result<Self>;
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.name)?;
        tuple.serialize_element(&self.value)?;
        tuple.serialize_element(&self.omit_empty)?;
        tuple.serialize_element(&self.commented)?;
        tuple.end()
    }
}

impl Serialize for Section {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(
            SECTION_TOKEN,
            &(&self.name, self.omit_empty, &self.fields),
        )
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(DOCUMENT_TOKEN, &self.sections)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SectionVisitor;

        impl<'de> de::Visitor<'de> for SectionVisitor {
            type Value = Section;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an INI section")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Section, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut section = Section::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key == SECTION_NAME_KEY {
                        section.name = map.next_value()?;
                    } else {
                        let value: Value = map.next_value()?;
                        section.fields.push(Field::new(key, value));
                    }
                }
                Ok(section)
            }
        }

        deserializer.deserialize_struct(SECTION_TOKEN, &[], SectionVisitor)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> de::Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an INI document")
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Document, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut sections = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(section) = seq.next_element()? {
                    sections.push(section);
                }
                Ok(Document { sections })
            }
        }

        deserializer.deserialize_struct(DOCUMENT_TOKEN, &[], DocumentVisitor)
    }
}

/// `#[serde(with = "serde_ini::hook::document")]` for [`DocumentCodec`] types.
pub mod document {
    use super::DocumentCodec;
    use crate::tree::Document;
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: DocumentCodec,
        S: Serializer,
    {
        let document = value.to_document().map_err(ser::Error::custom)?;
        document.serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: DocumentCodec,
        D: Deserializer<'de>,
    {
        let document = Document::deserialize(deserializer)?;
        T::from_document(document).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "serde_ini::hook::section")]` for [`SectionCodec`] types.
pub mod section {
    use super::SectionCodec;
    use crate::tree::Section;
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: SectionCodec,
        S: Serializer,
    {
        let section = value.to_section().map_err(ser::Error::custom)?;
        section.serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: SectionCodec,
        D: Deserializer<'de>,
    {
        let section = Section::deserialize(deserializer)?;
        T::from_section(section).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "serde_ini::hook::text")]` for `Display + FromStr` types.
///
/// The text is written without quoting or escaping, so it must read back as
/// a value: a number, a word, or a quoted string, and no line break. Output
/// such as `127.0.0.1` or `4 KiB` is none of these and fails to decode, so
/// the `Display` impl of such a type has to wrap it in quotes itself. On
/// decode the type is parsed from the value as it appears after unescaping;
/// an absent key is parsed from the empty string.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use std::num::NonZeroU16;
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Net {
///     #[serde(with = "serde_ini::hook::text")]
///     port: NonZeroU16,
/// }
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Config {
///     net: Net,
/// }
///
/// let config = Config { net: Net { port: NonZeroU16::new(8080).unwrap() } };
/// let text = serde_ini::to_string(&config).unwrap();
/// assert_eq!(text, "[net]\nport=8080\n");
/// assert_eq!(serde_ini::from_str::<Config>(&text).unwrap(), config);
///
/// assert!(serde_ini::from_str::<Config>("[net]\nport=0\n").is_err());
/// ```
pub mod text {
    use crate::ser::TEXT_TOKEN;
    use serde::{de, Deserializer, Serializer};
    use std::fmt::{self, Display};
    use std::marker::PhantomData;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.serialize_newtype_struct(TEXT_TOKEN, &value.to_string())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_newtype_struct(TEXT_TOKEN, TextVisitor(PhantomData))
    }

    struct TextVisitor<T>(PhantomData<T>);

    impl<'de, T> de::Visitor<'de> for TextVisitor<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        type Value = T;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("text")
        }

        fn visit_str<E>(self, value: &str) -> Result<T, E>
        where
            E: de::Error,
        {
            value.parse().map_err(E::custom)
        }

        fn visit_unit<E>(self) -> Result<T, E>
        where
            E: de::Error,
        {
            self.visit_str("")
        }

        fn visit_newtype_struct<D>(self, deserializer: D) -> Result<T, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_str(self)
        }
    }
}
