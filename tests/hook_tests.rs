use serde::{Deserialize, Serialize};
use serde_ini::hook::{DocumentCodec, SectionCodec};
use serde_ini::{
    from_str, impl_ini_codec, sections_of, to_string, Document, Error, Field, Section, Value,
};
use std::fmt;
use std::str::FromStr;

/// `major.minor` written as a quoted string.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
struct Version {
    major: u16,
    minor: u16,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}.{}'", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("version '{}' has no minor part", s))?;
        Ok(Version {
            major: major.parse().map_err(|_| format!("bad major in '{}'", s))?,
            minor: minor.parse().map_err(|_| format!("bad minor in '{}'", s))?,
        })
    }
}

/// Every key of a section, values as text.
#[derive(Debug, PartialEq, Default)]
struct Bag(Vec<(String, String)>);

impl SectionCodec for Bag {
    fn to_section(&self) -> serde_ini::Result<Section> {
        let mut section = Section::new("unused");
        for (key, value) in &self.0 {
            section.fields.push(Field::new(key.clone(), value.as_str()));
        }
        Ok(section)
    }

    fn from_section(section: Section) -> serde_ini::Result<Self> {
        Ok(Bag(section
            .fields
            .into_iter()
            .map(|field| (field.name, field.value.into_text()))
            .collect()))
    }
}

impl_ini_codec!(section Bag);

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Package {
    name: String,
    #[serde(with = "serde_ini::hook::text")]
    version: Version,
    #[serde(rename = "rest,inline")]
    rest: Bag,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Manifest {
    package: Package,
    #[serde(rename = "Env")]
    env: Bag,
}

#[test]
fn test_text_hook_round_trip() {
    let manifest = Manifest {
        package: Package {
            name: "demo".to_string(),
            version: Version { major: 1, minor: 4 },
            rest: Bag(vec![("license".to_string(), "MIT".to_string())]),
        },
        env: Bag(vec![("PATH".to_string(), "/bin".to_string())]),
    };

    let text = to_string(&manifest).unwrap();
    assert_eq!(
        text,
        "[package]\nname='demo'\nversion='1.4'\nlicense='MIT'\n[Env]\nPATH='/bin'\n"
    );
    assert_eq!(from_str::<Manifest>(&text).unwrap(), manifest);
}

#[test]
fn test_section_hook_inside_section_takes_unclaimed_keys() {
    let manifest: Manifest =
        from_str("[package]\nedition=2021\nname='x'\nversion='0.1'\nauthors='a','b'\n").unwrap();
    assert_eq!(manifest.package.name, "x");
    assert_eq!(
        manifest.package.rest,
        Bag(vec![
            ("edition".to_string(), "2021".to_string()),
            ("authors".to_string(), "a,b".to_string()),
        ])
    );
    assert_eq!(manifest.env, Bag::default());
}

#[test]
fn test_section_hook_name_comes_from_member() {
    let sections = sections_of(&Manifest {
        package: Package {
            name: String::new(),
            version: Version::default(),
            rest: Bag::default(),
        },
        env: Bag(vec![("A".to_string(), "1".to_string())]),
    })
    .unwrap();
    assert_eq!(sections[1].name, "Env");
    assert_eq!(sections[1].fields, vec![Field::new("A", "1")]);
}

#[test]
fn test_text_hook_errors() {
    let err = from_str::<Manifest>("[package]\nversion='1'\n").unwrap_err();
    match err {
        Error::Field {
            section,
            key,
            line,
            source,
        } => {
            assert_eq!((section.as_str(), key.as_str(), line), ("package", "version", Some(2)));
            assert_eq!(source.to_string(), "version '1' has no minor part");
        }
        other => panic!("unexpected error: {}", other),
    }

    // An absent key is parsed from empty text.
    let err = from_str::<Manifest>("[package]\nname='x'\n").unwrap_err();
    assert!(matches!(err, Error::Field { ref key, line: None, .. } if key == "version"));
}

#[test]
fn test_text_hook_with_line_break_fails_field() {
    #[derive(Debug)]
    struct Multi;

    impl fmt::Display for Multi {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a\nb")
        }
    }

    #[derive(Serialize)]
    struct Root {
        s: Inner,
    }

    #[derive(Serialize)]
    struct Inner {
        #[serde(serialize_with = "serde_ini::hook::text::serialize")]
        multi: Multi,
        ok: u8,
    }

    let root = Root {
        s: Inner { multi: Multi, ok: 1 },
    };
    assert!(matches!(to_string(&root), Err(Error::Encode { .. })));

    let options = serde_ini::EncoderOptions::new().with_skip_field_encode_failure(true);
    assert_eq!(
        serde_ini::to_string_with_options(&root, options).unwrap(),
        "[s]\nok=1\n"
    );
}

/// Sections sorted by name, fields kept as read.
#[derive(Debug, PartialEq)]
struct Sorted(Document);

impl DocumentCodec for Sorted {
    fn to_document(&self) -> serde_ini::Result<Document> {
        let mut document = self.0.clone();
        document.sections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(document)
    }

    fn from_document(document: Document) -> serde_ini::Result<Self> {
        if document.sections.is_empty() {
            return Err(Error::custom("document is empty"));
        }
        Ok(Sorted(document))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Wrapper(#[serde(with = "serde_ini::hook::document")] Sorted);

#[test]
fn test_document_hook_via_with() {
    let document = Document::new()
        .with_section(Section::new("zeta").with_field(Field::new("n", 1)))
        .with_section(Section::new("alpha").with_field(Field::new("flag", Value::Null)));
    let text = to_string(&Wrapper(Sorted(document))).unwrap();
    assert_eq!(text, "[alpha]\nflag=\n[zeta]\nn=1\n");

    let back: Wrapper = from_str("[b]\nx=1,2\n[a]\n").unwrap();
    let names: Vec<_> = back.0 .0.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(
        back.0 .0.sections[0].fields,
        vec![Field::new("x", vec!["1", "2"])]
    );

    let err = from_str::<Wrapper>("").unwrap_err();
    assert_eq!(err.to_string(), "document is empty");
}

#[test]
fn test_document_hook_rejects_bad_names() {
    let document = Document::new().with_section(Section::new("two words"));
    let err = to_string(&Wrapper(Sorted(document))).unwrap_err();
    assert!(matches!(err, Error::InvalidName(ref name) if name == "two words"));
}

#[test]
fn test_text_hook_output_must_read_back_as_a_value() {
    use std::net::Ipv4Addr;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Net {
        #[serde(with = "serde_ini::hook::text")]
        addr: Ipv4Addr,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Host {
        net: Net,
    }

    let host = Host {
        net: Net {
            addr: Ipv4Addr::LOCALHOST,
        },
    };
    let text = to_string(&host).unwrap();
    assert_eq!(text, "[net]\naddr=127.0.0.1\n");

    // Dotted output is not a number, a word or a quoted string.
    let err = from_str::<Host>(&text).unwrap_err();
    assert!(matches!(err, Error::ExpectedNewline { line: 2, col: 11 }));

    let back: Host = from_str("[net]\naddr='127.0.0.1'\n").unwrap();
    assert_eq!(back, host);
}
