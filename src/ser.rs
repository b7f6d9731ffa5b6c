//! Capture of `Serialize` output.
//!
//! [`NodeSerializer`] records what a `Serialize` impl reports as a [`Node`]
//! tree. The tree keeps struct and field names as serde gives them (the field
//! names carry the tags), so the shape-walker in [`crate::tree`] can resolve
//! sections and fields afterwards.
//!
//! Hook types announce themselves through newtype structs with reserved
//! names: a section hook, a document hook, or verbatim text.

use crate::{Error, Field, Number, Result, Section, Value};
use serde::{ser, Serialize};

/// Newtype name marking a document hook.
pub(crate) const DOCUMENT_TOKEN: &str = "$serde_ini::private::Document";
/// Newtype name marking a section hook.
pub(crate) const SECTION_TOKEN: &str = "$serde_ini::private::Section";
/// Newtype name marking text that is written verbatim.
pub(crate) const TEXT_TOKEN: &str = "$serde_ini::private::Text";
/// Map key carrying a section's name to a section hook on decode.
pub(crate) const SECTION_NAME_KEY: &str = "$serde_ini::private::name";

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Leaf(Value),
    Seq(Vec<Node>),
    Record {
        name: &'static str,
        fields: Vec<(&'static str, Node)>,
    },
    Map(Vec<(String, Node)>),
    Optional(Option<Box<Node>>),
    Section(Section),
    Document(Vec<Section>),
}

pub(crate) struct NodeSerializer;

pub(crate) struct SerializeVec {
    vec: Vec<Node>,
}

pub(crate) struct SerializeMap {
    entries: Vec<(String, Node)>,
    current_key: Option<String>,
}

pub(crate) struct SerializeRecord {
    name: &'static str,
    fields: Vec<(&'static str, Node)>,
}

fn unsupported_variant(name: &str, variant: &str) -> Error {
    Error::shape(format!(
        "enum variant '{}::{}' cannot be encoded, only unit variants are supported",
        name, variant
    ))
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = ser::Impossible<Node, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = ser::Impossible<Node, Error>;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::Leaf(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::Leaf(Value::Number(Number::Int(v))))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        i64::try_from(v)
            .map(|v| Node::Leaf(Value::Number(Number::Int(v))))
            .map_err(|_| Error::shape(format!("integer {} does not fit in 64 bits", v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::Leaf(Value::Number(Number::Uint(v))))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        u64::try_from(v)
            .map(|v| Node::Leaf(Value::Number(Number::Uint(v))))
            .map_err(|_| Error::shape(format!("integer {} does not fit in 64 bits", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::Leaf(Value::Number(Number::F32(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::Leaf(Value::Number(Number::F64(v))))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Leaf(Value::Text(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::Leaf(Value::Text(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        let vec = v
            .iter()
            .map(|&b| Node::Leaf(Value::Number(Number::Uint(b as u64))))
            .collect();
        Ok(Node::Seq(vec))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Optional(None))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Ok(Node::Optional(Some(Box::new(to_node(value)?))))
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::Leaf(Value::Null))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::Leaf(Value::Null))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        // Variant names that read back as a bare word are written unquoted.
        let is_word = variant.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
            && variant.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
        let variant = variant.to_string();
        Ok(Node::Leaf(if is_word {
            Value::Raw(variant)
        } else {
            Value::Text(variant)
        }))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        match name {
            TEXT_TOKEN => match to_node(value)? {
                Node::Leaf(Value::Text(text)) => Ok(Node::Leaf(Value::Raw(text))),
                _ => Err(Error::custom("text codec must produce a string")),
            },
            SECTION_TOKEN => section_from_node(to_node(value)?).map(Node::Section),
            DOCUMENT_TOKEN => match to_node(value)? {
                Node::Seq(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Node::Section(section) => Ok(section),
                        _ => Err(Error::custom("document hook must produce sections")),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Node::Document),
                _ => Err(Error::custom("document hook must produce sections")),
            },
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Err(unsupported_variant(name, variant))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported_variant(name, variant))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord {
            name,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported_variant(name, variant))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_node(key)? {
            Node::Leaf(Value::Text(s)) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(Error::shape("map keys must be strings")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, to_node(value)?));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.entries))
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push((key, to_node(value)?));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Record {
            name: self.name,
            fields: self.fields,
        })
    }
}

pub(crate) fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Node> {
    value.serialize(NodeSerializer)
}

/// Flattens a leaf-shaped node into a value. `None` when the node holds
/// anything other than leaves, sequences and optionals.
pub(crate) fn leaf_value(node: Node) -> Option<Value> {
    match node {
        Node::Leaf(value) => Some(value),
        Node::Seq(items) => items
            .into_iter()
            .map(leaf_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Seq),
        Node::Optional(None) => Some(Value::Null),
        Node::Optional(Some(inner)) => leaf_value(*inner),
        _ => None,
    }
}

fn malformed() -> Error {
    Error::custom("malformed section hook payload")
}

fn take_text(node: Node) -> Result<String> {
    match node {
        Node::Leaf(Value::Text(text)) => Ok(text),
        _ => Err(malformed()),
    }
}

fn take_bool(node: Node) -> Result<bool> {
    match node {
        Node::Leaf(Value::Bool(flag)) => Ok(flag),
        _ => Err(malformed()),
    }
}

/// Rebuilds a section from the tuples a [`Section`] serializes as.
fn section_from_node(node: Node) -> Result<Section> {
    let Node::Seq(parts) = node else {
        return Err(malformed());
    };
    let [name, omit_empty, fields]: [Node; 3] = parts.try_into().map_err(|_| malformed())?;
    let Node::Seq(fields) = fields else {
        return Err(malformed());
    };

    let fields = fields
        .into_iter()
        .map(|field| {
            let Node::Seq(parts) = field else {
                return Err(malformed());
            };
            let [name, value, omit_empty, commented]: [Node; 4] =
                parts.try_into().map_err(|_| malformed())?;
            Ok(Field {
                name: take_text(name)?,
                value: leaf_value(value).ok_or_else(malformed)?,
                omit_empty: take_bool(omit_empty)?,
                commented: take_bool(commented)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Section {
        name: take_text(name)?,
        fields,
        omit_empty: take_bool(omit_empty)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Point {
        x: i32,
        #[serde(rename = "y,omitempty")]
        y: Option<u8>,
    }

    #[test]
    fn test_record_keeps_tags() {
        let node = to_node(&Point { x: -1, y: None }).unwrap();
        assert_eq!(
            node,
            Node::Record {
                name: "Point",
                fields: vec![
                    ("x", Node::Leaf(Value::from(-1i32))),
                    ("y,omitempty", Node::Optional(None)),
                ],
            }
        );
    }

    #[test]
    fn test_map_keys_must_be_strings() {
        let mut map = BTreeMap::new();
        map.insert(1, 2);
        assert!(matches!(to_node(&map), Err(Error::Shape(_))));

        let mut map = BTreeMap::new();
        map.insert('k', 2);
        assert!(to_node(&map).is_ok());
    }

    #[test]
    fn test_data_variants_are_rejected() {
        #[derive(Serialize)]
        enum Mode {
            Fixed(u32),
        }
        let err = to_node(&Mode::Fixed(1)).unwrap_err();
        assert!(err.to_string().contains("Mode::Fixed"));
    }

    #[test]
    fn test_leaf_value() {
        let node = to_node(&vec![Some(1u8), None]).unwrap();
        assert_eq!(
            leaf_value(node),
            Some(Value::Seq(vec![Value::from(1u8), Value::Null]))
        );
        let node = to_node(&Point { x: 0, y: None }).unwrap();
        assert_eq!(leaf_value(node), None);
    }

    #[test]
    fn test_section_payload() {
        let section = Section::new("Foo")
            .with_field(Field::new("baz", vec![1, 2, 3]))
            .with_field(Field::new("raw", Value::Raw("a b".into())).commented());
        assert_eq!(to_node(&section).unwrap(), Node::Section(section));
    }
}
