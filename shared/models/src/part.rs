//! Part catalog domain models.
//!
//! A part is identified by its Item Part Number (IPN). The catalog keeps a
//! small fixed schema of well-known fields and carries everything else in an
//! extension map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A catalog entry for a purchased component or an assembly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Part {
    pub ipn: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Remaining columns of the source row, keyed by normalized header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Part {
    pub fn new(ipn: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            ipn: ipn.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Category code derived from the IPN prefix, lower-cased.
    ///
    /// `RES-0001` and `res-0001` both belong to category `res`. An IPN without
    /// a hyphen has no category.
    pub fn category(&self) -> Option<String> {
        category_of(&self.ipn)
    }

    /// Gets an extension field value
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Derives the lower-cased category code from an IPN.
pub fn category_of(ipn: &str) -> Option<String> {
    let (prefix, _) = ipn.split_once('-')?;
    if prefix.is_empty() {
        return None;
    }
    Some(prefix.to_ascii_lowercase())
}
