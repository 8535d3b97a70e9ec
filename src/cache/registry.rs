use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::snapshot::Snapshot;
use crate::error::{PpdExtError, Result};
use crate::ppde::{compile_file, Diagnostic, PpdExtRules};
use crate::printer::CapabilitySet;
use crate::settings::CompilerSettings;

/// File extension of PPD extension files.
pub const PPDE_EXTENSION: &str = "ppde";

/// A compiled PPDE file and when it was compiled.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
    pub path: PathBuf,
    pub rules: PpdExtRules,
    pub loaded_at: DateTime<Utc>,
}

type EntryTable = IndexMap<PathBuf, Arc<RegistryEntry>>;

/// Compiled PPDE files keyed by path.
///
/// Lookups are lock-free snapshots; every (re)load swaps in a new table.
pub struct PpdExtRegistry {
    settings: CompilerSettings,
    capabilities: CapabilitySet,
    entries: Snapshot<EntryTable>,
}

impl PpdExtRegistry {
    pub fn new(settings: CompilerSettings, capabilities: CapabilitySet) -> Self {
        Self {
            settings,
            capabilities,
            entries: Snapshot::default(),
        }
    }

    fn compile(&self, path: &Path) -> Result<RegistryEntry> {
        let rules = compile_file(path, &self.settings, &self.capabilities)?;
        Ok(RegistryEntry {
            path: path.to_path_buf(),
            rules,
            loaded_at: Utc::now(),
        })
    }

    /// Compile one file and add or replace its entry.
    pub fn load_file(&self, path: &Path) -> Result<Arc<RegistryEntry>> {
        let entry = Arc::new(self.compile(path)?);
        let inserted = Arc::clone(&entry);
        self.entries.update(move |table| {
            table.insert(inserted.path.clone(), inserted);
        });
        if entry.rules.has_diagnostics() {
            warn!(
                "Loaded {:?} with {} line(s) dropped",
                path,
                entry.rules.diagnostics.len()
            );
        } else {
            info!("Loaded {:?}", path);
        }
        Ok(entry)
    }

    /// Compile every `.ppde` file below `dir` and swap them in at once.
    ///
    /// Entries under `dir` whose file is gone are dropped. Unreadable files
    /// are logged and skipped. Returns the number of files loaded.
    pub fn load_dir(&self, dir: &Path) -> Result<usize> {
        std::fs::read_dir(dir).map_err(|source| PpdExtError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut loaded = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_ppde(entry.path()) {
                continue;
            }
            match self.compile(entry.path()) {
                Ok(compiled) => loaded.push(Arc::new(compiled)),
                Err(e) => warn!("{}", e),
            }
        }

        let count = loaded.len();
        self.entries.update(move |table| {
            table.retain(|path, _| !path.starts_with(dir));
            for entry in loaded {
                table.insert(entry.path.clone(), entry);
            }
        });
        info!("Loaded {} PPDE file(s) from {:?}", count, dir);
        Ok(count)
    }

    /// Drop the entry of a file. Returns whether it was present.
    pub fn remove(&self, path: &Path) -> bool {
        if !self.entries.load().contains_key(path) {
            return false;
        }
        self.entries.update(|table| {
            table.shift_remove(path);
        });
        info!("Removed {:?}", path);
        true
    }

    pub fn get(&self, path: &Path) -> Option<Arc<RegistryEntry>> {
        self.entries.load().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.load().keys().cloned().collect()
    }

    /// Diagnostics of all loaded files, in load order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .load()
            .values()
            .flat_map(|entry| entry.rules.diagnostics.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn is_ppde(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PPDE_EXTENSION))
        .unwrap_or(false)
}
