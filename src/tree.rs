//! The section tree and the shape-walker that builds it.
//!
//! An INI document is a list of [`Section`]s, each holding a list of
//! [`Field`]s. [`sections_of`] derives that tree from any `Serialize` value:
//!
//! - the root must be a struct, a map with string keys, or a document hook
//! - every member of the root becomes a section named by its key
//! - inside a section, a member is a leaf (one field), an `inline` struct or
//!   map (its members are flattened into the section), or a section hook
//!   (its fields are taken, its own name is ignored)
//! - a leaf member of the root becomes a section holding one field of the
//!   same name
//! - `Option` members are implicitly `omitempty`
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use serde_ini::{sections_of, Value};
//!
//! #[derive(Serialize)]
//! struct Settings {
//!     #[serde(rename = "Video")]
//!     video: Video,
//! }
//!
//! #[derive(Serialize)]
//! struct Video {
//!     width: u32,
//!     #[serde(rename = "fullscreen,omitempty,commented")]
//!     fullscreen: bool,
//! }
//!
//! let sections = sections_of(&Settings {
//!     video: Video { width: 1024, fullscreen: false },
//! })
//! .unwrap();
//!
//! assert_eq!(sections[0].name, "Video");
//! let field = sections[0].field("fullscreen").unwrap();
//! assert!(field.omit_empty && field.commented);
//! assert_eq!(sections[0].field("width").unwrap().value, Value::from(1024u32));
//! ```

use crate::de::ValueDeserializer;
use crate::ser::{leaf_value, to_node, Node};
use crate::tags::Tag;
use crate::{Error, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A `key=value` pair.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub omit_empty: bool,
    pub commented: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Field {
            name: name.into(),
            value: value.into(),
            omit_empty: false,
            commented: false,
        }
    }

    /// Leave the field out when its value is zero or empty.
    #[must_use]
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Write the field behind a `;`.
    #[must_use]
    pub fn commented(mut self) -> Self {
        self.commented = true;
        self
    }

    /// Converts the field's value into `T` the same way a decoded key is
    /// converted into a struct member.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ini::{Field, Value};
    ///
    /// let field = Field::new("ports", Value::Seq(vec!["80".into(), "443".into()]));
    /// let ports: Vec<u16> = field.parse().unwrap();
    /// assert_eq!(ports, [80, 443]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not convert into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(ValueDeserializer::new(self.value.clone()))
    }
}

/// A `[name]` header and the fields under it.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Section {
    pub name: String,
    pub fields: Vec<Field>,
    /// Skip the header as well when no field is written.
    pub omit_empty: bool,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Section {
            name: name.into(),
            fields: Vec::new(),
            omit_empty: false,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A whole INI document, as produced and consumed by document hooks.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }
}

/// Builds the section tree of `value`.
///
/// # Errors
///
/// Returns a shape error when `value` (or one of its members) cannot be laid
/// out as sections and fields, and tag errors for malformed field tags. All
/// errors found among the members of one struct are reported together.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn sections_of<T>(value: &T) -> Result<Vec<Section>>
where
    T: ?Sized + Serialize,
{
    document_of(to_node(value)?)
}

fn document_of(node: Node) -> Result<Vec<Section>> {
    match node {
        Node::Document(sections) => Ok(sections),
        Node::Record { name, fields } => {
            let sections = walk_record(name, fields, |tag, node| section_of(name, tag, node))?;
            Ok(sections.into_iter().flatten().collect())
        }
        Node::Map(entries) => {
            let mut sections = Vec::with_capacity(entries.len());
            let mut errors = Vec::new();
            for (key, node) in entries {
                let tag = Tag {
                    key,
                    ..Tag::default()
                };
                match section_of("map", tag, node) {
                    Ok(Some(section)) => sections.push(section),
                    Ok(None) => {}
                    Err(err) => push_error(&mut errors, err),
                }
            }
            Error::combine(errors).map_or(Ok(sections), Err)
        }
        Node::Optional(Some(inner)) => document_of(*inner),
        Node::Optional(None) => Ok(Vec::new()),
        Node::Section(_) => Err(Error::shape("section hook cannot be used as a document")),
        Node::Leaf(_) | Node::Seq(_) => Err(Error::shape(
            "expected a struct, a map or a document hook for encode/decode operation",
        )),
    }
}

/// Resolves one member of the root. `None` for an absent optional section.
fn section_of(owner: &str, mut tag: Tag, node: Node) -> Result<Option<Section>> {
    tag.inline = true;
    let node = match node {
        Node::Optional(None) => return Ok(None),
        Node::Optional(Some(inner)) => {
            tag.omit_empty = true;
            *inner
        }
        node => node,
    };
    let fields = fields_of(owner, &tag, node)?;
    Ok(Some(Section {
        name: tag.key,
        fields,
        omit_empty: tag.omit_empty,
    }))
}

fn fields_of(owner: &str, tag: &Tag, node: Node) -> Result<Vec<Field>> {
    match node {
        Node::Section(section) => Ok(section.fields),
        Node::Document(_) => Err(Error::shape(format!(
            "document hook cannot be used as section '{}' in type '{}'",
            tag.key, owner
        ))),
        Node::Map(entries) if tag.inline => {
            let mut fields = Vec::with_capacity(entries.len());
            let mut errors = Vec::new();
            for (key, node) in entries {
                let omit_empty = matches!(node, Node::Optional(_));
                match leaf_value(node) {
                    Some(value) => fields.push(Field {
                        name: key,
                        value,
                        omit_empty,
                        commented: false,
                    }),
                    None => push_error(&mut errors, Error::unsupported_member(&key, owner)),
                }
            }
            Error::combine(errors).map_or(Ok(fields), Err)
        }
        Node::Record { name, fields } if tag.inline => {
            let nested = walk_record(name, fields, |tag, node| fields_of(name, &tag, node))?;
            Ok(nested.into_iter().flatten().collect())
        }
        Node::Optional(Some(inner)) if is_compound(&inner) => fields_of(owner, tag, *inner),
        Node::Optional(None) if tag.key.is_empty() => Ok(Vec::new()),
        node => {
            let omit_empty = tag.omit_empty || matches!(node, Node::Optional(_));
            match leaf_value(node) {
                Some(value) if !tag.key.is_empty() => Ok(vec![Field {
                    name: tag.key.clone(),
                    value,
                    omit_empty,
                    commented: tag.commented,
                }]),
                _ => Err(Error::unsupported_member(&tag.key, owner)),
            }
        }
    }
}

fn is_compound(node: &Node) -> bool {
    matches!(
        node,
        Node::Record { .. } | Node::Map(_) | Node::Section(_) | Node::Document(_)
    )
}

fn push_error(errors: &mut Vec<Error>, err: Error) {
    match err {
        Error::Multiple(inner) => errors.extend(inner),
        err => errors.push(err),
    }
}

/// Parses every member's tag and feeds the member to `f`, skipping excluded
/// members. Errors of all members are collected and merged.
fn walk_record<T, F>(owner: &str, fields: Vec<(&'static str, Node)>, mut f: F) -> Result<Vec<T>>
where
    F: FnMut(Tag, Node) -> Result<T>,
{
    let mut values = Vec::with_capacity(fields.len());
    let mut errors = Vec::new();

    for (raw, node) in fields {
        let tag = match Tag::parse(raw, owner) {
            Ok(tag) => tag,
            Err(err) => {
                push_error(&mut errors, err);
                continue;
            }
        };
        if tag.is_excluded() {
            continue;
        }
        match f(tag, node) {
            Ok(value) => values.push(value),
            Err(err) => push_error(&mut errors, err),
        }
    }

    Error::combine(errors).map_or(Ok(values), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[derive(Serialize)]
    struct Root {
        #[serde(rename = "Server")]
        server: Server,
        level: u8,
        #[serde(rename = "-")]
        skipped: Server,
        #[serde(rename = "Extra")]
        extra: Option<Server>,
    }

    #[derive(Serialize, Default)]
    struct Server {
        host: String,
        #[serde(rename = ",inline")]
        limits: Limits,
    }

    #[derive(Serialize, Default)]
    struct Limits {
        #[serde(rename = "max_conn,omitempty")]
        max_conn: u32,
        timeout: Option<f64>,
    }

    fn root() -> Root {
        Root {
            server: Server {
                host: "localhost".to_string(),
                limits: Limits {
                    max_conn: 10,
                    timeout: None,
                },
            },
            level: 3,
            skipped: Server::default(),
            extra: None,
        }
    }

    #[test]
    fn test_record_root() {
        let sections = sections_of(&root()).unwrap();
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Server", "level"]);

        let server = &sections[0];
        let fields: Vec<_> = server.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, ["host", "max_conn", "timeout"]);
        assert!(server.field("max_conn").unwrap().omit_empty);
        assert!(server.field("timeout").unwrap().omit_empty);
        assert_eq!(server.field("timeout").unwrap().value, Value::Null);

        assert_eq!(sections[1].fields, vec![Field::new("level", 3u8)]);
    }

    #[test]
    fn test_present_optional_section_is_omit_empty() {
        let mut value = root();
        value.extra = Some(Server::default());
        let sections = sections_of(&value).unwrap();
        assert_eq!(sections.len(), 3);
        assert!(sections[2].omit_empty);
    }

    #[test]
    fn test_map_root_keeps_order() {
        let mut map: IndexMap<&str, IndexMap<&str, i32>> = IndexMap::new();
        map.insert("b", IndexMap::from([("z", 1), ("a", 2)]));
        map.insert("a", IndexMap::new());
        let sections = sections_of(&map).unwrap();
        assert_eq!(sections[0].name, "b");
        assert_eq!(sections[0].fields[0].name, "z");
        assert_eq!(sections[1].name, "a");
        assert!(sections[1].fields.is_empty());
    }

    #[test]
    fn test_non_inline_struct_is_rejected() {
        #[derive(Serialize)]
        struct Outer {
            section: Middle,
        }
        #[derive(Serialize)]
        struct Middle {
            nested: Limits,
        }

        let err = sections_of(&Outer {
            section: Middle {
                nested: Limits::default(),
            },
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid type: type of field 'nested' in type 'Middle' must be bool, int, \
             float, string, sequence, or struct/map with 'inline' tag"
        );
    }

    #[test]
    fn test_invalid_roots() {
        assert!(matches!(sections_of(&42), Err(Error::Shape(_))));
        assert!(matches!(sections_of(&vec![1, 2]), Err(Error::Shape(_))));
        assert!(matches!(
            sections_of(&Section::new("x")),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_tag_errors_are_merged() {
        #[derive(Serialize)]
        struct Bad {
            #[serde(rename = "a,bogus")]
            a: u8,
            #[serde(rename = "b,omitempty,omitempty")]
            b: u8,
            c: u8,
        }

        #[derive(Serialize)]
        struct Root {
            bad: Bad,
        }

        let err = sections_of(&Root {
            bad: Bad { a: 1, b: 2, c: 3 },
        })
        .unwrap_err();
        match err {
            Error::Multiple(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(errors[0], Error::UnknownFlag { .. }));
                assert!(matches!(errors[1], Error::DuplicateFlag { .. }));
            }
            other => panic!("expected merged errors, got {other:?}"),
        }
    }
}
