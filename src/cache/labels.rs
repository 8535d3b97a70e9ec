use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::snapshot::Snapshot;

/// ID -> display label, in configured order.
pub type LabelTable = IndexMap<String, String>;

/// The label lists a job ticket is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Domain,
    Use,
    Tag,
}

/// Process-wide job ticket labels, each list held in its own snapshot.
#[derive(Debug, Default)]
pub struct JobTicketLabelCache {
    domains: Snapshot<LabelTable>,
    uses: Snapshot<LabelTable>,
    tags: Snapshot<LabelTable>,
}

impl JobTicketLabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, kind: LabelKind) -> &Snapshot<LabelTable> {
        match kind {
            LabelKind::Domain => &self.domains,
            LabelKind::Use => &self.uses,
            LabelKind::Tag => &self.tags,
        }
    }

    /// Parse a comma-separated `ID/Label` list and replace the table.
    ///
    /// Malformed entries are logged and skipped. Returns the number of labels
    /// now held.
    pub fn refresh(&self, kind: LabelKind, list: &str) -> usize {
        let table = parse_labels(list);
        let count = table.len();
        self.snapshot(kind).store(table);
        info!("Refreshed {:?} labels: {} entries", kind, count);
        count
    }

    pub fn labels(&self, kind: LabelKind) -> Arc<LabelTable> {
        self.snapshot(kind).load()
    }

    pub fn label(&self, kind: LabelKind, id: &str) -> Option<String> {
        self.labels(kind).get(id).cloned()
    }
}

/// `"A/Alpha, B/Beta"` -> `{A: Alpha, B: Beta}`. A later duplicate ID
/// replaces the earlier label.
pub fn parse_labels(list: &str) -> LabelTable {
    let mut table = LabelTable::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once('/') {
            Some((id, label)) if !id.trim().is_empty() && !label.trim().is_empty() => {
                table.insert(id.trim().to_string(), label.trim().to_string());
            }
            _ => warn!("Skipping label entry [{}]: expected ID/Label", entry),
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        let table = parse_labels("DOC/Documents, PHOTO/Photos ,, bad, /x, FLY/Flyers/A5");
        let ids: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["DOC", "PHOTO", "FLY"]);
        assert_eq!(table["PHOTO"], "Photos");
        assert_eq!(table["FLY"], "Flyers/A5");
    }

    #[test]
    fn test_refresh_replaces_table() {
        let cache = JobTicketLabelCache::new();
        assert!(cache.labels(LabelKind::Domain).is_empty());

        assert_eq!(cache.refresh(LabelKind::Domain, "EDU/Education,BUS/Business"), 2);
        let old = cache.labels(LabelKind::Domain);

        cache.refresh(LabelKind::Domain, "GOV/Government");
        assert_eq!(old.len(), 2);
        assert_eq!(cache.label(LabelKind::Domain, "GOV").as_deref(), Some("Government"));
        assert_eq!(cache.label(LabelKind::Domain, "EDU"), None);
        assert!(cache.labels(LabelKind::Tag).is_empty());
    }
}
