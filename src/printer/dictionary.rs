//! Abstract attribute dictionary: which UI group an attribute belongs to.
//!
//! Provides two loading methods:
//! - `default_dictionary()` - Dictionary embedded in the binary
//! - `load_dictionary(path)` - Dictionary from a custom TOML file

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default dictionary embedded in the binary at compile time.
const DEFAULT_DICTIONARY: &str = include_str!("../../config/ipp_attributes.toml");

/// UI group an option is presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiGroup {
    PageSetup,
    Job,
    Advanced,
    JobTicket,
}

impl fmt::Display for UiGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PageSetup => "page-setup",
            Self::Job => "job",
            Self::Advanced => "advanced",
            Self::JobTicket => "job-ticket",
        };
        f.write_str(name)
    }
}

/// Abstract attribute keyword -> UI group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDictionary {
    #[serde(default)]
    attributes: IndexMap<String, UiGroup>,
}

impl AttributeDictionary {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// UI group of an attribute, `None` for attributes the UI does not know.
    pub fn group_of(&self, attribute: &str) -> Option<UiGroup> {
        self.attributes.get(attribute).copied()
    }

    pub fn insert(&mut self, attribute: &str, group: UiGroup) {
        self.attributes.insert(attribute.to_string(), group);
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Load an attribute dictionary from a TOML file.
pub fn load_dictionary(path: &Path) -> Result<AttributeDictionary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dictionary {:?}", path))?;
    AttributeDictionary::from_toml(&content)
        .with_context(|| format!("Invalid dictionary in {:?}", path))
}

/// The dictionary embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (a build-time bug).
pub fn default_dictionary() -> AttributeDictionary {
    AttributeDictionary::from_toml(DEFAULT_DICTIONARY)
        .expect("embedded ipp_attributes.toml must be valid TOML")
}
