//! Leaf values of the section tree.
//!
//! Every [`Field`](crate::Field) holds a [`Value`]. On encode it is a snapshot
//! of the caller's leaf; on decode it is the text scanned from the input,
//! already unquoted and unescaped, waiting to be converted into whatever type
//! the target asks for.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ini::{Kind, Value};
//!
//! let width = Value::from(1024u32);
//! assert_eq!(width.kind(), Kind::Uint);
//! assert!(!width.is_zero());
//!
//! let tags = Value::from(vec!["a", "b"]);
//! assert_eq!(tags.kind(), Kind::Seq);
//! assert_eq!(tags.to_string(), "a,b");
//!
//! assert!(Value::from("").is_zero());
//! assert!(Value::Null.is_zero());
//! ```

use crate::ser::TEXT_TOKEN;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed leaf value.
///
/// `Text` is rendered single-quoted and escaped, `Raw` is rendered verbatim.
/// Raw text comes from types using the text codec (see
/// [`hook::text`](crate::hook::text)) and must not contain a line break.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Raw(String),
    Seq(Vec<Value>),
}

/// A numeric leaf, keeping the signedness and float width of its source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Uint(u64),
    F32(f32),
    F64(f64),
}

/// The kind of a [`Value`], as reported by [`Value::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Raw,
    Seq,
}

impl Number {
    /// Returns `true` for the zero of the number's own type. Negative zero
    /// floats are not zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Int(i) => i == 0,
            Number::Uint(u) => u == 0,
            Number::F32(f) => f.to_bits() == 0,
            Number::F64(f) => f.to_bits() == 0,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Uint(u) => u as f64,
            Number::F32(f) => f as f64,
            Number::F64(f) => f,
        }
    }
}

fn write_float<F>(
    f: &mut fmt::Formatter<'_>,
    v: F,
    is_nan: bool,
    is_inf: bool,
    negative: bool,
) -> fmt::Result
where
    F: fmt::Display,
{
    if is_nan {
        f.write_str("nan")
    } else if is_inf {
        f.write_str(if negative { "-inf" } else { "inf" })
    } else {
        write!(f, "{}", v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Uint(u) => write!(f, "{}", u),
            Number::F32(v) => {
                write_float(f, v, v.is_nan(), v.is_infinite(), v.is_sign_negative())
            }
            Number::F64(v) => {
                write_float(f, v, v.is_nan(), v.is_infinite(), v.is_sign_negative())
            }
        }
    }
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(Number::Int(_)) => Kind::Int,
            Value::Number(Number::Uint(_)) => Kind::Uint,
            Value::Number(Number::F32(_) | Number::F64(_)) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Raw(_) => Kind::Raw,
            Value::Seq(_) => Kind::Seq,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` when the value is the zero of its kind or empty.
    ///
    /// This is what `omitempty` checks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ini::Value;
    ///
    /// assert!(Value::from(false).is_zero());
    /// assert!(Value::from(0.0).is_zero());
    /// assert!(!Value::from(-0.0).is_zero());
    /// assert!(Value::from(Vec::<u8>::new()).is_zero());
    /// assert!(!Value::from("x").is_zero());
    /// ```
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Number(n) => n.is_zero(),
            Value::Text(s) | Value::Raw(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// Textual view of the value, unquoted. Sequences are joined with `,`.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Value::Text(s) | Value::Raw(s) => s,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) | Value::Raw(s) => f.write_str(s),
            Value::Seq(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Uint(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::F32(f)) => serializer.serialize_f32(*f),
            Value::Number(Number::F64(f)) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Raw(s) => serializer.serialize_newtype_struct(TEXT_TOKEN, s.as_str()),
            Value::Seq(items) => serializer.collect_seq(items),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a bool, number, string or sequence")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Int(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Uint(value)))
            }

            fn visit_f32<E>(self, value: f32) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::F32(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::F64(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::Text(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Seq(items))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

macro_rules! impl_from_number {
    ($variant:ident as $target:ident: $($ty:ident)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Number(Number::$variant(v as $target))
                }
            }
        )*
    };
}

impl_from_number!(Int as i64: i8 i16 i32 i64 isize);
impl_from_number!(Uint as u64: u8 u16 u32 u64 usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(Number::F32(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::F64(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::from(-1i8).kind(), Kind::Int);
        assert_eq!(Value::from(1u8).kind(), Kind::Uint);
        assert_eq!(Value::from(1.5f32).kind(), Kind::Float);
        assert_eq!(Value::Raw("x".into()).kind(), Kind::Raw);
        assert_eq!(Value::from(vec![1, 2]).kind(), Kind::Seq);
    }

    #[test]
    fn test_special_floats() {
        assert_eq!(Value::from(f64::NAN).to_string(), "nan");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::from(f32::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn test_floats_never_use_exponent() {
        assert_eq!(Value::from(1e21).to_string(), "1000000000000000000000");
        assert_eq!(Value::from(0.1f32).to_string(), "0.1");
        assert_eq!(Value::from(1.0).to_string(), "1");
    }

    #[test]
    fn test_is_zero() {
        assert!(Value::from(0u64).is_zero());
        assert!(Value::from(0i32).is_zero());
        assert!(!Value::from(-1i32).is_zero());
        assert!(!Value::from(true).is_zero());
        assert!(Value::Raw(String::new()).is_zero());
        assert!(!Value::from(vec![0]).is_zero());
    }

    #[test]
    fn test_into_text() {
        assert_eq!(Value::from("a b").into_text(), "a b");
        assert_eq!(Value::from(vec![1, -2]).into_text(), "1,-2");
        assert_eq!(Value::Null.into_text(), "");
        assert_eq!(Value::from(None::<u8>), Value::Null);
    }

    #[test]
    fn test_deserialize_from_json() {
        let value: Value = serde_json::from_str(r#"[true, -3, 4, 1.5, "x", null]"#).unwrap();
        assert_eq!(
            value,
            Value::Seq(vec![
                Value::Bool(true),
                Value::Number(Number::Int(-3)),
                Value::Number(Number::Uint(4)),
                Value::Number(Number::F64(1.5)),
                Value::Text("x".into()),
                Value::Null,
            ])
        );
    }
}
