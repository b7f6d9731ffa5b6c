//! INI deserialization.
//!
//! The [`Deserializer`] scans the whole input into raw sections first, then
//! answers the requests of the target's `Deserialize` impl from them:
//!
//! - **Struct root**: every member names a section; a header naming anything
//!   else is an error, a missing section decodes as zero values
//! - **Map root**: every section of the input becomes an entry
//! - **Sections**: members are bound to keys by their tags, unknown keys are
//!   skipped, missing keys decode as zero values
//! - **Leaves**: the scanned text is converted into the requested type, and a
//!   failure names the section, key and line
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_ini::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Settings {
//!     #[serde(rename = "Video")]
//!     video: Video,
//! }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Video {
//!     width: u32,
//!     height: u32,
//!     #[serde(rename = "fullscreen,omitempty,commented")]
//!     fullscreen: bool,
//! }
//!
//! let settings: Settings = from_str("[Video]\nwidth=1024\nheight=768\n;fullscreen=true\n").unwrap();
//! assert_eq!(
//!     settings.video,
//!     Video { width: 1024, height: 768, fullscreen: false }
//! );
//! ```
//!
//! ## Reading from a stream
//!
//! ```rust
//! use serde_ini::Decoder;
//! use std::collections::BTreeMap;
//!
//! let mut decoder = Decoder::new("[a]\nx=1\n".as_bytes());
//! let doc: BTreeMap<String, BTreeMap<String, u8>> = decoder.decode().unwrap();
//! assert_eq!(doc["a"]["x"], 1);
//! ```

use crate::parser::{self, RawSection, RawValue};
use crate::ser::{DOCUMENT_TOKEN, SECTION_NAME_KEY, SECTION_TOKEN, TEXT_TOKEN};
use crate::tags::Tag;
use crate::{Error, Result, Value};
use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use std::io;

type Fields = IndexMap<String, RawValue>;

const NOT_A_DOCUMENT: &str =
    "expected a struct, a map or a document hook for encode/decode operation";

/// The INI deserializer.
///
/// Created via [`Deserializer::from_slice`] or [`Deserializer::from_str`].
/// The input is only scanned once the target type is known.
pub struct Deserializer<'de> {
    input: &'de [u8],
}

impl<'de> Deserializer<'de> {
    pub fn from_slice(input: &'de [u8]) -> Self {
        Deserializer { input }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Deserializer {
            input: input.as_bytes(),
        }
    }
}

/// Reads a whole stream and decodes it.
///
/// Mirrors [`Encoder`](crate::Encoder): the reader can be swapped with
/// [`Decoder::reset`] between calls.
pub struct Decoder<R> {
    reader: R,
}

impl<R: io::Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Decoder { reader }
    }

    pub fn reset(&mut self, reader: R) -> &mut Self {
        self.reader = reader;
        self
    }

    /// Reads the reader to its end and decodes the content.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails, otherwise the same errors as
    /// [`from_slice`](crate::from_slice).
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T> {
        let mut buf = Vec::new();
        self.reader
            .read_to_end(&mut buf)
            .map_err(|e| Error::io(&format!("read failed: {}", e)))?;
        T::deserialize(&mut Deserializer::from_slice(&buf))
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn parse_tags(fields: &'static [&'static str], owner: &str) -> Result<Vec<(&'static str, Tag)>> {
    let mut tags = Vec::with_capacity(fields.len());
    let mut errors = Vec::new();
    for raw in fields {
        match Tag::parse(raw, owner) {
            Ok(tag) => tags.push((*raw, tag)),
            Err(err) => errors.push(err),
        }
    }
    Error::combine(errors).map_or(Ok(tags), Err)
}

fn key_deserializer(key: &str) -> de::value::StrDeserializer<'_, Error> {
    key.into_deserializer()
}

macro_rules! reject_root {
    ($($method:ident($($arg:ident: $ty:ty),*))*) => {$(
        fn $method<V>(self, $($arg: $ty,)* _visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            $(let _ = $arg;)*
            Err(Error::shape(NOT_A_DOCUMENT))
        }
    )*};
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let sections = parser::parse(self.input, None)?;
        visitor.visit_map(SectionsAccess::new(sections))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match name {
            DOCUMENT_TOKEN => {
                let sections = parser::parse(self.input, None)?;
                visitor.visit_seq(SectionsAccess::new(sections))
            }
            SECTION_TOKEN => Err(Error::shape("section hook cannot be used as a document")),
            _ => {
                let members = parse_tags(fields, name)?;
                let known: Vec<String> = members
                    .iter()
                    .filter(|(_, tag)| !tag.is_excluded())
                    .map(|(_, tag)| tag.key.clone())
                    .collect();
                let sections = parser::parse(self.input, Some(known.as_slice()))?;
                visitor.visit_map(MembersAccess {
                    members: members.into_iter(),
                    pending: None,
                    sections,
                })
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    reject_root! {
        deserialize_bool() deserialize_i8() deserialize_i16() deserialize_i32() deserialize_i64()
        deserialize_u8() deserialize_u16() deserialize_u32() deserialize_u64()
        deserialize_f32() deserialize_f64() deserialize_char() deserialize_str()
        deserialize_string() deserialize_bytes() deserialize_byte_buf() deserialize_unit()
        deserialize_unit_struct(name: &'static str) deserialize_seq() deserialize_tuple(len: usize)
        deserialize_tuple_struct(name: &'static str, len: usize)
        deserialize_enum(name: &'static str, variants: &'static [&'static str])
        deserialize_identifier()
    }
}

/// Members of a struct root, each bound to the section named by its key.
struct MembersAccess {
    members: std::vec::IntoIter<(&'static str, Tag)>,
    pending: Option<Tag>,
    sections: IndexMap<String, RawSection>,
}

impl<'de> de::MapAccess<'de> for MembersAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.members.next() {
            Some((raw, tag)) => {
                self.pending = Some(tag);
                seed.deserialize(key_deserializer(raw)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let tag = self
            .pending
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        let section = if tag.is_excluded() {
            None
        } else {
            self.sections.shift_remove(&tag.key)
        };
        seed.deserialize(SectionDeserializer {
            name: tag.key,
            section,
        })
    }
}

/// Every section of the input, as map entries (map root) or as a sequence
/// (document hook).
struct SectionsAccess {
    iter: indexmap::map::IntoIter<String, RawSection>,
    pending: Option<(String, RawSection)>,
}

impl SectionsAccess {
    fn new(sections: IndexMap<String, RawSection>) -> Self {
        SectionsAccess {
            iter: sections.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for SectionsAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((name, section)) => {
                let key = seed.deserialize(key_deserializer(&name))?;
                self.pending = Some((name, section));
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((name, section)) => seed.deserialize(SectionDeserializer {
                name,
                section: Some(section),
            }),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

impl<'de> de::SeqAccess<'de> for SectionsAccess {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((name, section)) => seed
                .deserialize(SectionDeserializer {
                    name,
                    section: Some(section),
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// A scanned value together with where it came from.
struct Leaf {
    value: Value,
    section: String,
    key: String,
    line: Option<usize>,
}

impl Leaf {
    fn new(section: &str, key: &str, raw: Option<RawValue>) -> Self {
        Leaf {
            line: raw.as_ref().map(|raw| raw.line),
            value: raw.map(RawValue::into_value).unwrap_or_default(),
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    fn deserialize_with<T, F>(self, f: F) -> Result<T>
    where
        F: FnOnce(ValueDeserializer) -> Result<T>,
    {
        let Leaf {
            value,
            section,
            key,
            line,
        } = self;
        f(ValueDeserializer::new(value)).map_err(|err| err.in_field(&section, &key, line))
    }
}

macro_rules! forward_to_leaf {
    ($($method:ident($($arg:ident: $ty:ty),*))*) => {$(
        fn $method<V>(self, $($arg: $ty,)* visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.into_leaf()?
                .deserialize_with(|leaf| leaf.$method($($arg,)* visitor))
        }
    )*};
}

/// A member of the root: a whole section.
struct SectionDeserializer {
    name: String,
    section: Option<RawSection>,
}

impl SectionDeserializer {
    /// A leaf at section level reads the key named like the section.
    fn into_leaf(self) -> Result<Leaf> {
        let raw = self
            .section
            .and_then(|mut section| section.fields.shift_remove(&self.name));
        Ok(Leaf::new(&self.name, &self.name, raw))
    }

    fn into_fields(self) -> (String, Fields) {
        let fields = self
            .section
            .map(|section| section.fields)
            .unwrap_or_default();
        (self.name, fields)
    }
}

impl<'de> de::Deserializer<'de> for SectionDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (name, fields) = self.into_fields();
        visitor.visit_map(EntriesAccess::new(name, fields))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match name {
            SECTION_TOKEN => {
                let (section, entries) = self.into_fields();
                visitor.visit_map(SectionPayload::new(section, entries))
            }
            DOCUMENT_TOKEN => Err(Error::shape(format!(
                "document hook cannot be used as section '{}'",
                self.name
            ))),
            _ => {
                let members = parse_tags(fields, name)?;
                if let Some(raw) = &self.section {
                    tracing::trace!(section = %self.name, line = raw.line, "decoding section");
                }
                let (section, mut raw) = self.into_fields();
                let access = FieldsAccess::new(&section, (name, members), &mut raw, &[]);
                let value = visitor.visit_map(access)?;
                for (key, unknown) in &raw {
                    tracing::debug!(
                        section = %section,
                        key = %key,
                        line = unknown.line,
                        "ignoring unknown key"
                    );
                }
                Ok(value)
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.section.is_some() {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TEXT_TOKEN {
            self.into_leaf()?
                .deserialize_with(|leaf| leaf.deserialize_newtype_struct(name, visitor))
        } else {
            visitor.visit_newtype_struct(self)
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_leaf! {
        deserialize_bool() deserialize_i8() deserialize_i16() deserialize_i32() deserialize_i64()
        deserialize_i128() deserialize_u8() deserialize_u16() deserialize_u32() deserialize_u64()
        deserialize_u128() deserialize_f32() deserialize_f64() deserialize_char()
        deserialize_str() deserialize_string() deserialize_bytes() deserialize_byte_buf()
        deserialize_unit() deserialize_unit_struct(name: &'static str) deserialize_seq()
        deserialize_tuple(len: usize) deserialize_tuple_struct(name: &'static str, len: usize)
        deserialize_enum(name: &'static str, variants: &'static [&'static str])
        deserialize_identifier()
    }
}

/// Members of a struct walked inside a section. Inline members share the
/// same key pool.
struct FieldsAccess<'a> {
    section: &'a str,
    members: std::vec::IntoIter<(&'static str, Tag)>,
    pending: Option<Tag>,
    fields: &'a mut Fields,
    /// Keys claimed by leaf members at this level or above; inline maps and
    /// section hooks leave them alone.
    reserved: Vec<String>,
    owner: &'static str,
}

impl<'a> FieldsAccess<'a> {
    fn new(
        section: &'a str,
        owner_members: (&'static str, Vec<(&'static str, Tag)>),
        fields: &'a mut Fields,
        inherited: &[String],
    ) -> Self {
        let (owner, members) = owner_members;
        let mut reserved = inherited.to_vec();
        reserved.extend(
            members
                .iter()
                .filter(|(_, tag)| !tag.inline && !tag.is_excluded())
                .map(|(_, tag)| tag.key.clone()),
        );
        FieldsAccess {
            section,
            members: members.into_iter(),
            pending: None,
            fields,
            reserved,
            owner,
        }
    }
}

impl<'de> de::MapAccess<'de> for FieldsAccess<'_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.members.next() {
            Some((raw, tag)) => {
                self.pending = Some(tag);
                seed.deserialize(key_deserializer(raw)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let tag = self
            .pending
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;

        if tag.is_excluded() {
            let mut empty = Fields::new();
            return seed.deserialize(MemberDeserializer {
                section: self.section,
                owner: self.owner,
                tag,
                fields: &mut empty,
                reserved: &[],
            });
        }

        seed.deserialize(MemberDeserializer {
            section: self.section,
            owner: self.owner,
            tag,
            fields: &mut *self.fields,
            reserved: &self.reserved,
        })
    }
}

/// One member inside a section.
struct MemberDeserializer<'a> {
    section: &'a str,
    owner: &'static str,
    tag: Tag,
    fields: &'a mut Fields,
    reserved: &'a [String],
}

impl MemberDeserializer<'_> {
    fn into_leaf(self) -> Result<Leaf> {
        if self.tag.key.is_empty() {
            return Err(Error::unsupported_member(&self.tag.key, self.owner));
        }
        let raw = self.fields.shift_remove(&self.tag.key);
        Ok(Leaf::new(self.section, &self.tag.key, raw))
    }

    /// Removes every key not claimed by a leaf member.
    fn drain_unreserved(&mut self) -> Fields {
        let keys: Vec<String> = self
            .fields
            .keys()
            .filter(|key| !self.reserved.contains(key))
            .cloned()
            .collect();
        keys.into_iter()
            .filter_map(|key| self.fields.shift_remove_entry(&key))
            .collect()
    }
}

impl<'de> de::Deserializer<'de> for MemberDeserializer<'_> {
    type Error = Error;

    fn deserialize_map<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if !self.tag.inline && !self.tag.is_excluded() {
            return Err(Error::unsupported_member(&self.tag.key, self.owner));
        }
        let entries = self.drain_unreserved();
        visitor.visit_map(EntriesAccess::new(self.section.to_string(), entries))
    }

    fn deserialize_struct<V>(
        mut self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match name {
            SECTION_TOKEN => {
                let entries = self.drain_unreserved();
                visitor.visit_map(SectionPayload::new(self.section.to_string(), entries))
            }
            DOCUMENT_TOKEN => Err(Error::shape(format!(
                "document hook cannot be used as section '{}' in type '{}'",
                self.tag.key, self.owner
            ))),
            _ if self.tag.inline || self.tag.is_excluded() => {
                let members = parse_tags(fields, name)?;
                visitor.visit_map(FieldsAccess::new(
                    self.section,
                    (name, members),
                    self.fields,
                    self.reserved,
                ))
            }
            _ => Err(Error::unsupported_member(&self.tag.key, self.owner)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.tag.inline {
            return visitor.visit_some(self);
        }
        let present = self
            .fields
            .get(&self.tag.key)
            .is_some_and(|raw| !raw.is_empty());
        if present {
            visitor.visit_some(self)
        } else {
            self.fields.shift_remove(&self.tag.key);
            visitor.visit_none()
        }
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TEXT_TOKEN {
            self.into_leaf()?
                .deserialize_with(|leaf| leaf.deserialize_newtype_struct(name, visitor))
        } else {
            visitor.visit_newtype_struct(self)
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.fields.shift_remove(&self.tag.key);
        visitor.visit_unit()
    }

    forward_to_leaf! {
        deserialize_any()
        deserialize_bool() deserialize_i8() deserialize_i16() deserialize_i32() deserialize_i64()
        deserialize_i128() deserialize_u8() deserialize_u16() deserialize_u32() deserialize_u64()
        deserialize_u128() deserialize_f32() deserialize_f64() deserialize_char()
        deserialize_str() deserialize_string() deserialize_bytes() deserialize_byte_buf()
        deserialize_unit() deserialize_unit_struct(name: &'static str) deserialize_seq()
        deserialize_tuple(len: usize) deserialize_tuple_struct(name: &'static str, len: usize)
        deserialize_enum(name: &'static str, variants: &'static [&'static str])
        deserialize_identifier()
    }
}

/// Key/value pairs of a section handed to a map.
struct EntriesAccess {
    section: String,
    iter: indexmap::map::IntoIter<String, RawValue>,
    pending: Option<(String, RawValue)>,
}

impl EntriesAccess {
    fn new(section: String, fields: Fields) -> Self {
        EntriesAccess {
            section,
            iter: fields.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for EntriesAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, raw)) => {
                let de_key = seed.deserialize(key_deserializer(&key))?;
                self.pending = Some((key, raw));
                Ok(Some(de_key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((key, raw)) => {
                seed.deserialize(LeafDeserializer(Leaf::new(&self.section, &key, Some(raw))))
            }
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct LeafDeserializer(Leaf);

impl LeafDeserializer {
    fn into_leaf(self) -> Result<Leaf> {
        Ok(self.0)
    }
}

impl<'de> de::Deserializer<'de> for LeafDeserializer {
    type Error = Error;

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.0.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    forward_to_leaf! {
        deserialize_any()
        deserialize_bool() deserialize_i8() deserialize_i16() deserialize_i32() deserialize_i64()
        deserialize_i128() deserialize_u8() deserialize_u16() deserialize_u32() deserialize_u64()
        deserialize_u128() deserialize_f32() deserialize_f64() deserialize_char()
        deserialize_str() deserialize_string() deserialize_bytes() deserialize_byte_buf()
        deserialize_unit() deserialize_unit_struct(name: &'static str)
        deserialize_newtype_struct(name: &'static str) deserialize_seq()
        deserialize_tuple(len: usize) deserialize_tuple_struct(name: &'static str, len: usize)
        deserialize_map()
        deserialize_struct(name: &'static str, fields: &'static [&'static str])
        deserialize_enum(name: &'static str, variants: &'static [&'static str])
        deserialize_identifier() deserialize_ignored_any()
    }
}

/// What a section hook sees: the section name under a reserved key, then
/// every field.
struct SectionPayload {
    name: Option<String>,
    iter: indexmap::map::IntoIter<String, RawValue>,
    pending: Option<Value>,
}

impl SectionPayload {
    fn new(name: String, fields: Fields) -> Self {
        SectionPayload {
            name: Some(name),
            iter: fields.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for SectionPayload {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if let Some(name) = self.name.take() {
            self.pending = Some(Value::Text(name));
            return seed.deserialize(key_deserializer(SECTION_NAME_KEY)).map(Some);
        }
        match self.iter.next() {
            Some((key, raw)) => {
                self.pending = Some(raw.into_value());
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

/// Converts a leaf [`Value`] into whatever the target asks for.
///
/// `Null` stands for a missing or empty value and yields the zero value of
/// scalar targets.
pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(Error::parse(format!("invalid bool '{}'", text))),
    }
}

/// Text of a scalar value, for targets parsed from text.
fn scalar_text(value: Value, expected: &str) -> Result<String> {
    match value {
        Value::Text(text) | Value::Raw(text) => Ok(text),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Seq(_) => Err(Error::parse(format!("expected {}, found a list", expected))),
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident($ty:ident))*) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            if self.value.is_null() {
                return visitor.$visit(<$ty>::default());
            }
            let text = scalar_text(self.value, stringify!($ty))?;
            let parsed = text.parse::<$ty>().map_err(|err| {
                Error::parse(format!("invalid {} '{}': {}", stringify!($ty), text, err))
            })?;
            visitor.$visit(parsed)
        }
    )*};
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(crate::Number::Int(i)) => visitor.visit_i64(i),
            Value::Number(crate::Number::Uint(u)) => visitor.visit_u64(u),
            Value::Number(crate::Number::F32(f)) => visitor.visit_f32(f),
            Value::Number(crate::Number::F64(f)) => visitor.visit_f64(f),
            Value::Text(s) | Value::Raw(s) => visitor.visit_string(s),
            Value::Seq(items) => visitor.visit_seq(SeqDeserializer::new(items)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_bool(false),
            Value::Bool(b) => visitor.visit_bool(b),
            value => visitor.visit_bool(parse_bool(&scalar_text(value, "bool")?)?),
        }
    }

    deserialize_number! {
        deserialize_i8 => visit_i8(i8)
        deserialize_i16 => visit_i16(i16)
        deserialize_i32 => visit_i32(i32)
        deserialize_i64 => visit_i64(i64)
        deserialize_i128 => visit_i128(i128)
        deserialize_u8 => visit_u8(u8)
        deserialize_u16 => visit_u16(u16)
        deserialize_u32 => visit_u32(u32)
        deserialize_u64 => visit_u64(u64)
        deserialize_u128 => visit_u128(u128)
        deserialize_f32 => visit_f32(f32)
        deserialize_f64 => visit_f64(f64)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_null() {
            return visitor.visit_char('\0');
        }
        let text = scalar_text(self.value, "char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::parse(format!("expected a single character, found '{}'", text))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value.into_text())
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TEXT_TOKEN {
            self.deserialize_string(visitor)
        } else {
            visitor.visit_newtype_struct(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let items = match self.value {
            Value::Null => Vec::new(),
            Value::Seq(items) => items,
            single => vec![single],
        };
        visitor.visit_seq(SeqDeserializer::new(items))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::shape("expected a leaf value, found a map"))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::shape(format!(
            "expected a leaf value, found struct '{}'",
            name
        )))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // The first variant stands in for the zero value.
        let variant = match (self.value, variants.first()) {
            (Value::Null, Some(first)) => first.to_string(),
            (value, _) => scalar_text(value, "enum variant")?,
        };
        visitor.visit_enum(variant.into_deserializer())
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
