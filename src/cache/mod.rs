//! Process-wide caches built on copy-on-write snapshots.

mod labels;
mod registry;
mod snapshot;
mod watcher;

pub use labels::{parse_labels, JobTicketLabelCache, LabelKind, LabelTable};
pub use registry::{is_ppde, PpdExtRegistry, RegistryEntry, PPDE_EXTENSION};
pub use snapshot::Snapshot;
pub use watcher::PpdExtWatcher;
