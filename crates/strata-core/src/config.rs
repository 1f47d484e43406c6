//! # Config Module
//!
//! Scalar lookups in a small YAML config document.
//!
//! Strata only ever needs single values out of its config files
//! (`default_profile`, `profiles.<name>.inherits_from`), so the document
//! exposes one query: a key path in, an optional string out. Paths built
//! from profile names go through [`ConfigDocument::read_scalar_at`] so a
//! name like `rails-7.1` stays one segment.

use crate::error::{Result, StrataError};
use serde_yaml::Value;
use std::path::Path;

/// A parsed config document.
///
/// A missing file loads as an empty document, where every lookup is `None`.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    root: Value,
}

impl ConfigDocument {
    /// An empty document.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a document from disk. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::empty());
        }
        let text = std::fs::read_to_string(path).map_err(|source| StrataError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| StrataError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a document from text.
    pub fn parse(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }
        let root = serde_yaml::from_str(text)?;
        Ok(Self { root })
    }

    /// Read the scalar at a dotted key path, e.g. `profiles.rails.inherits_from`.
    ///
    /// Strings, numbers and booleans come back as strings. Missing keys,
    /// nulls, empty strings and non-scalar values are `None`.
    #[must_use]
    pub fn read_scalar(&self, key: &str) -> Option<String> {
        let segments: Vec<&str> = key.split('.').collect();
        self.read_scalar_at(&segments)
    }

    /// Read the scalar at an explicit key path. Segments are matched
    /// verbatim, dots included.
    #[must_use]
    pub fn read_scalar_at(&self, segments: &[&str]) -> Option<String> {
        let mut current = &self.root;
        for segment in segments {
            current = current.as_mapping()?.get(*segment)?;
        }

        let value = match current {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };

        (!value.is_empty()).then_some(value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
