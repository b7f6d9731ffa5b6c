//! Configuration options for INI encoding.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ini::{to_string_with_options, EncoderOptions, Value};
//! use std::collections::BTreeMap;
//!
//! let mut section = BTreeMap::new();
//! section.insert("ok".to_string(), Value::from(1));
//! section.insert("bad-name".to_string(), Value::from(2));
//! let mut doc = BTreeMap::new();
//! doc.insert("s".to_string(), section);
//!
//! // A field with an invalid name fails the whole encode by default...
//! assert!(serde_ini::to_string(&doc).is_err());
//!
//! // ...or is skipped when asked to.
//! let options = EncoderOptions::new().with_skip_field_encode_failure(true);
//! assert_eq!(to_string_with_options(&doc, options).unwrap(), "[s]\nok=1\n");
//! ```

/// Configuration options for INI encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Omit fields whose value cannot be rendered instead of failing.
    pub skip_field_encode_failure: bool,
}

impl EncoderOptions {
    /// Creates default options: any field encode failure aborts encoding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ini::EncoderOptions;
    ///
    /// let options = EncoderOptions::new();
    /// assert!(!options.skip_field_encode_failure);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_skip_field_encode_failure(mut self, skip: bool) -> Self {
        self.skip_field_encode_failure = skip;
        self
    }
}
