//! Field tags.
//!
//! A member's serde name doubles as its tag: the text before the first comma
//! is the INI key, and the rest is a comma-separated list of flags.
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Video {
//!     #[serde(rename = "fullscreen,omitempty,commented")]
//!     fullscreen: bool,
//! }
//! ```
//!
//! Flags:
//!
//! - `inline`: flatten a nested record or map into the enclosing section
//! - `omitempty`: leave the key out when its value is zero or empty
//! - `commented`: write the key behind a `;` so it is present but inactive
//!
//! A key of `-` excludes the member from both directions.

use crate::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tag {
    pub key: String,
    pub inline: bool,
    pub omit_empty: bool,
    pub commented: bool,
}

impl Tag {
    /// Parses a raw tag. `owner` names the type the member belongs to and is
    /// only used in error messages.
    pub fn parse(raw: &str, owner: &str) -> Result<Tag> {
        let (name, rest) = match raw.split_once(',') {
            Some((name, rest)) => (name, Some(rest.trim())),
            None => (raw, None),
        };
        let mut tag = Tag {
            key: name.trim().to_string(),
            ..Tag::default()
        };
        let field = if tag.key.is_empty() { raw } else { &tag.key };

        if let Some(rest) = rest {
            if rest.is_empty() {
                return Err(Error::InvalidTag {
                    tag: raw.to_string(),
                    owner: owner.to_string(),
                    msg: "unexpected comma in field tag".to_string(),
                });
            }

            for flag in rest.split(',').map(str::trim) {
                let slot = match flag {
                    "inline" => &mut tag.inline,
                    "omitempty" => &mut tag.omit_empty,
                    "commented" => &mut tag.commented,
                    _ => {
                        return Err(Error::UnknownFlag {
                            flag: flag.to_string(),
                            field: field.to_string(),
                            owner: owner.to_string(),
                        })
                    }
                };
                if *slot {
                    return Err(Error::DuplicateFlag {
                        flag: flag.to_string(),
                        field: field.to_string(),
                        owner: owner.to_string(),
                    });
                }
                *slot = true;
            }
        }

        if tag.key.is_empty() && !tag.inline {
            return Err(Error::InvalidTag {
                tag: raw.to_string(),
                owner: owner.to_string(),
                msg: "empty key is only allowed on inline fields".to_string(),
            });
        }

        Ok(tag)
    }

    #[inline]
    pub fn is_excluded(&self) -> bool {
        self.key == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let tag = Tag::parse("width", "Video").unwrap();
        assert_eq!(tag.key, "width");
        assert!(!tag.inline && !tag.omit_empty && !tag.commented);
    }

    #[test]
    fn test_flags() {
        let tag = Tag::parse("fullscreen, omitempty ,commented", "Video").unwrap();
        assert_eq!(tag.key, "fullscreen");
        assert!(tag.omit_empty);
        assert!(tag.commented);
        assert!(!tag.inline);
    }

    #[test]
    fn test_inline_with_empty_key() {
        let tag = Tag::parse(",inline", "A").unwrap();
        assert!(tag.key.is_empty());
        assert!(tag.inline);
    }

    #[test]
    fn test_empty_key_without_inline() {
        let err = Tag::parse(",omitempty", "A").unwrap_err();
        assert!(matches!(err, Error::InvalidTag { .. }));
    }

    #[test]
    fn test_excluded() {
        assert!(Tag::parse("-", "A").unwrap().is_excluded());
        assert!(!Tag::parse("dash", "A").unwrap().is_excluded());
    }

    #[test]
    fn test_trailing_comma() {
        let err = Tag::parse("name,", "A").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid tag 'name,' in type 'A': unexpected comma in field tag"
        );
    }

    #[test]
    fn test_unknown_flag() {
        let err = Tag::parse("name,required", "Config").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown flag 'required' for field 'name' in type 'Config'"
        );
    }

    #[test]
    fn test_duplicate_flag() {
        let err = Tag::parse("name,inline,inline", "Config").unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateFlag { ref flag, ref field, ref owner }
                if flag == "inline" && field == "name" && owner == "Config"
        ));
    }
}
