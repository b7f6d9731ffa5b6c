//! Taking over the layout with document, section and text hooks.
//!
//! Run with: cargo run --example custom_hooks

use serde::{Deserialize, Serialize};
use serde_ini::hook::{DocumentCodec, SectionCodec};
use serde_ini::{from_str, impl_ini_codec, to_string, Document, Field, Section};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// A size written as a number of bytes and read back from `1024` or `'4K'`.
#[derive(Debug, PartialEq, Clone, Copy)]
struct Size(u64);

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, unit) = match s.strip_suffix(['K', 'M']) {
            Some(digits) => (digits, if s.ends_with('K') { 1 << 10 } else { 1 << 20 }),
            None => (s, 1),
        };
        digits
            .parse::<u64>()
            .map(|n| Size(n * unit))
            .map_err(|_| format!("'{}' is not a size", s))
    }
}

impl_ini_codec!(text Size);

/// Key/value pairs kept in input order.
#[derive(Debug, PartialEq, Default)]
struct Pairs(Vec<(String, String)>);

impl SectionCodec for Pairs {
    fn to_section(&self) -> serde_ini::Result<Section> {
        let mut section = Section::new("pairs");
        for (key, value) in &self.0 {
            section = section.with_field(Field::new(key.as_str(), value.as_str()));
        }
        Ok(section)
    }

    fn from_section(section: Section) -> serde_ini::Result<Self> {
        Ok(Pairs(
            section
                .fields
                .into_iter()
                .map(|field| (field.name, field.value.into_text()))
                .collect(),
        ))
    }
}

impl_ini_codec!(section Pairs);

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Cache {
    limit: Size,
    #[serde(rename = "labels,inline")]
    labels: Pairs,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Config {
    cache: Cache,
}

/// Every section becomes a numbered profile, whatever its name.
#[derive(Debug)]
struct Profiles(Vec<Section>);

impl DocumentCodec for Profiles {
    fn to_document(&self) -> serde_ini::Result<Document> {
        Ok(Document {
            sections: self
                .0
                .iter()
                .enumerate()
                .map(|(i, section)| Section {
                    name: format!("profile_{}", i),
                    ..section.clone()
                })
                .collect(),
        })
    }

    fn from_document(document: Document) -> serde_ini::Result<Self> {
        Ok(Profiles(document.sections))
    }
}

impl_ini_codec!(document Profiles);

fn main() -> Result<(), Box<dyn Error>> {
    let config: Config = from_str("[cache]\nlimit='4K'\nowner='ops'\ntier=hot\n")?;
    println!("Decoded: {:?}", config);
    assert_eq!(config.cache.limit, Size(4096));

    let text = to_string(&config)?;
    println!("Encoded:\n{}", text);

    let profiles: Profiles = from_str("[work]\ntheme=dark\n[home]\ntheme=light\n")?;
    println!("Renumbered:\n{}", to_string(&profiles)?);

    Ok(())
}
