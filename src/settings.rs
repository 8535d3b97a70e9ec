//! Compiler settings loaded from TOML.
//!
//! Provides three loading methods:
//! - `default_settings()` - Settings embedded in the binary
//! - `load_settings(path)` - Settings from a custom file
//! - `resolve_settings(explicit)` - Explicit file, then the user config file, then the defaults

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default settings embedded in the binary at compile time.
const DEFAULT_SETTINGS: &str = include_str!("../config/ppdext.toml");

/// Root settings for a PPDE compile.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerSettings {
    #[serde(default)]
    pub reader: ReaderSettings,
    #[serde(default)]
    pub cost: CostSettings,
}

/// How physical lines are folded into logical lines.
#[derive(Debug, Clone, Deserialize)]
pub struct ReaderSettings {
    /// Lines starting with this prefix are comments
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    /// Trailing character that joins the next physical line
    #[serde(default = "default_continuation")]
    pub continuation: char,
}

/// Parsing of job ticket cost amounts.
#[derive(Debug, Clone, Deserialize)]
pub struct CostSettings {
    /// Either '.' or ','
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
}

fn default_comment_prefix() -> String {
    "#".to_string()
}

fn default_continuation() -> char {
    '\\'
}

fn default_decimal_separator() -> char {
    '.'
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            comment_prefix: default_comment_prefix(),
            continuation: default_continuation(),
        }
    }
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
        }
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        default_settings()
    }
}

impl CompilerSettings {
    fn validate(self) -> Result<Self> {
        if !matches!(self.cost.decimal_separator, '.' | ',') {
            bail!(
                "decimal_separator must be '.' or ',', got {:?}",
                self.cost.decimal_separator
            );
        }
        if self.reader.comment_prefix.is_empty() {
            bail!("comment_prefix must not be empty");
        }
        Ok(self)
    }
}

/// Parse settings from a TOML string.
pub fn parse_settings(content: &str) -> Result<CompilerSettings> {
    let settings: CompilerSettings = toml::from_str(content)?;
    settings.validate()
}

/// Load settings from a TOML file at the given path.
pub fn load_settings(path: &Path) -> Result<CompilerSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {:?}", path))?;
    let settings =
        parse_settings(&content).with_context(|| format!("Invalid settings in {:?}", path))?;
    debug!("Loaded compiler settings from {:?}", path);
    Ok(settings)
}

/// Get the default settings embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_settings() -> CompilerSettings {
    toml::from_str(DEFAULT_SETTINGS).expect("embedded ppdext.toml must be valid TOML")
}

/// Location of the per-user settings file (e.g. `~/.config/ppdext/ppdext.toml`).
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ppdext").join("ppdext.toml"))
}

/// Pick the settings for a run.
///
/// An explicit path must exist. Without one, the per-user settings file is
/// used when present, otherwise the embedded defaults.
pub fn resolve_settings(explicit: Option<&Path>) -> Result<CompilerSettings> {
    if let Some(path) = explicit {
        return load_settings(path);
    }
    if let Some(path) = user_settings_path().filter(|p| p.exists()) {
        return load_settings(&path);
    }
    Ok(default_settings())
}
