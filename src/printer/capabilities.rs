use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Attributes and choices reported by the print system's capability query.
///
/// Serialized as a plain JSON object: `{"sides": ["one-sided", ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    attributes: IndexMap<String, Vec<String>>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, attribute: &str, choices: &[&str]) {
        self.attributes.insert(
            attribute.to_string(),
            choices.iter().map(|c| c.to_string()).collect(),
        );
    }

    /// Choices of an attribute, `None` when the attribute is unknown.
    pub fn choices(&self, attribute: &str) -> Option<&[String]> {
        self.attributes.get(attribute).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Read a capability set from a JSON file on disk.
pub fn load_capabilities(path: &Path) -> Result<CapabilitySet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read capabilities {:?}", path))?;
    let caps = CapabilitySet::from_json(&content)
        .with_context(|| format!("Invalid capabilities in {:?}", path))?;
    debug!("Read {} capability attributes from {:?}", caps.len(), path);
    Ok(caps)
}
