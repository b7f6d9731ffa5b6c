/// Implements `Serialize` and `Deserialize` for a type through one of the
/// [`hook`](crate::hook) roles.
///
/// - `impl_ini_codec!(document Type)` requires [`DocumentCodec`](crate::DocumentCodec)
/// - `impl_ini_codec!(section Type)` requires [`SectionCodec`](crate::SectionCodec)
/// - `impl_ini_codec!(text Type)` requires `Display` and `FromStr`
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_ini::impl_ini_codec;
/// use std::fmt;
/// use std::str::FromStr;
///
/// #[derive(Debug, PartialEq)]
/// struct Percent(u8);
///
/// impl fmt::Display for Percent {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}", self.0)
///     }
/// }
///
/// impl FromStr for Percent {
///     type Err = String;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         match s.parse::<u8>() {
///             Ok(n) if n <= 100 => Ok(Percent(n)),
///             _ => Err(format!("'{}' is not a percentage", s)),
///         }
///     }
/// }
///
/// impl_ini_codec!(text Percent);
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Audio {
///     volume: Percent,
/// }
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Settings {
///     audio: Audio,
/// }
///
/// let settings = Settings { audio: Audio { volume: Percent(80) } };
/// assert_eq!(serde_ini::to_string(&settings).unwrap(), "[audio]\nvolume=80\n");
/// assert!(serde_ini::from_str::<Settings>("[audio]\nvolume=120\n").is_err());
/// ```
#[macro_export]
macro_rules! impl_ini_codec {
    (document $ty:ty) => {
        $crate::impl_ini_codec!(@impl document $ty);
    };
    (section $ty:ty) => {
        $crate::impl_ini_codec!(@impl section $ty);
    };
    (text $ty:ty) => {
        $crate::impl_ini_codec!(@impl text $ty);
    };
    (@impl $role:ident $ty:ty) => {
        impl $crate::__private::serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::hook::$role::serialize(self, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::hook::$role::deserialize(deserializer)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::hook::DocumentCodec;
    use crate::{from_str, to_string, Document, Field, Result, Section};

    /// Flat `name.key -> value` view of a document.
    #[derive(Debug, PartialEq)]
    struct Flat(Vec<(String, String)>);

    impl DocumentCodec for Flat {
        fn to_document(&self) -> Result<Document> {
            let mut document = Document::new();
            for (path, value) in &self.0 {
                let (section, key) = path.split_once('.').unwrap_or(("root", path.as_str()));
                match document.sections.iter_mut().find(|s| s.name == section) {
                    Some(existing) => existing.fields.push(Field::new(key, value.as_str())),
                    None => document
                        .sections
                        .push(Section::new(section).with_field(Field::new(key, value.as_str()))),
                }
            }
            Ok(document)
        }

        fn from_document(document: Document) -> Result<Self> {
            let mut flat = Vec::new();
            for section in document.sections {
                for field in section.fields {
                    flat.push((
                        format!("{}.{}", section.name, field.name),
                        field.value.into_text(),
                    ));
                }
            }
            Ok(Flat(flat))
        }
    }

    impl_ini_codec!(document Flat);

    #[test]
    fn test_document_codec_macro() {
        let flat = Flat(vec![
            ("a.x".to_string(), "1".to_string()),
            ("b.y".to_string(), "two".to_string()),
            ("a.z".to_string(), "3".to_string()),
        ]);
        let text = to_string(&flat).unwrap();
        assert_eq!(text, "[a]\nx='1'\nz='3'\n[b]\ny='two'\n");

        let back: Flat = from_str(&text).unwrap();
        assert_eq!(
            back.0,
            vec![
                ("a.x".to_string(), "1".to_string()),
                ("a.z".to_string(), "3".to_string()),
                ("b.y".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn test_document_codec_errors_propagate() {
        struct Broken;

        impl DocumentCodec for Broken {
            fn to_document(&self) -> Result<Document> {
                Err(crate::Error::custom("cannot render"))
            }

            fn from_document(_: Document) -> Result<Self> {
                Err(crate::Error::custom("cannot read"))
            }
        }

        impl_ini_codec!(document Broken);

        assert_eq!(to_string(&Broken).unwrap_err().to_string(), "cannot render");
        assert_eq!(
            from_str::<Broken>("").err().map(|e| e.to_string()),
            Some("cannot read".to_string())
        );
    }
}
