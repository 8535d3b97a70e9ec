use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use super::registry::{is_ppde, PpdExtRegistry};
use crate::error::{PpdExtError, Result};

/// Keeps a registry in step with the `.ppde` files of a directory.
pub struct PpdExtWatcher {
    registry: Arc<PpdExtRegistry>,
    watcher: Mutex<Option<RecommendedWatcher>>,
    watch_dir: Mutex<Option<PathBuf>>,
}

impl PpdExtWatcher {
    pub fn new(registry: Arc<PpdExtRegistry>) -> Self {
        Self {
            registry,
            watcher: Mutex::new(None),
            watch_dir: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<PpdExtRegistry> {
        &self.registry
    }

    /// Load every `.ppde` file below `dir`, then follow changes to them.
    pub fn start_watching(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(PpdExtError::Watch(format!(
                "Directory does not exist: {}",
                dir.display()
            )));
        }

        self.stop_watching();

        let registry = Arc::clone(&self.registry);
        let mut watcher =
            notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
                match res {
                    Ok(event) => handle_event(&registry, &event),
                    Err(e) => warn!("File watcher error: {}", e),
                }
            })
            .map_err(|e| PpdExtError::Watch(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|e| PpdExtError::Watch(format!("Failed to watch directory: {}", e)))?;

        // registered before the initial load; edits during it still arrive as events
        self.registry.load_dir(dir)?;

        *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(watcher);
        *self.watch_dir.lock().unwrap_or_else(PoisonError::into_inner) = Some(dir.to_path_buf());

        info!("Started watching for PPDE files in: {}", dir.display());
        Ok(())
    }

    pub fn stop_watching(&self) {
        let previous = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            info!("Stopped watching PPDE files");
        }
        *self.watch_dir.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn watch_dir(&self) -> Option<PathBuf> {
        self.watch_dir
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Apply one file system event to the registry.
pub(crate) fn handle_event(registry: &PpdExtRegistry, event: &Event) {
    for path in event.paths.iter().filter(|p| is_ppde(p)) {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                if !path.is_file() {
                    // renamed away
                    registry.remove(path);
                    continue;
                }
                info!("PPDE file changed: {}", path.display());
                if let Err(e) = registry.load_file(path) {
                    warn!("{}", e);
                }
            }
            EventKind::Remove(_) => {
                registry.remove(path);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::CapabilitySet;
    use crate::settings::default_settings;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};
    use std::fs;

    fn registry() -> PpdExtRegistry {
        PpdExtRegistry::new(default_settings(), CapabilitySet::new())
    }

    #[test]
    fn test_create_modify_remove_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.ppde");
        let registry = registry();

        fs::write(&path, "*MediaType media-type\n").unwrap();
        handle_event(
            &registry,
            &Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone()),
        );
        assert_eq!(registry.get(&path).unwrap().rules.option_mappings.len(), 1);

        fs::write(&path, "*MediaType media-type\n*Duplex sides\n").unwrap();
        handle_event(
            &registry,
            &Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
                .add_path(path.clone()),
        );
        assert_eq!(registry.get(&path).unwrap().rules.option_mappings.len(), 2);

        fs::remove_file(&path).unwrap();
        handle_event(
            &registry,
            &Event::new(EventKind::Remove(RemoveKind::File)).add_path(path.clone()),
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_other_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "*MediaType media-type\n").unwrap();

        let registry = registry();
        handle_event(
            &registry,
            &Event::new(EventKind::Create(CreateKind::File)).add_path(path),
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_start_watching_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = PpdExtWatcher::new(Arc::new(registry()));
        let result = watcher.start_watching(&dir.path().join("missing"));
        assert!(matches!(result, Err(PpdExtError::Watch(_))));
        assert!(watcher.watch_dir().is_none());
    }

    #[test]
    fn test_start_watching_loads_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ppde"), "*MediaType media-type\n").unwrap();

        let watcher = PpdExtWatcher::new(Arc::new(registry()));
        watcher.start_watching(dir.path()).unwrap();
        assert_eq!(watcher.registry().len(), 1);
        assert_eq!(watcher.watch_dir().as_deref(), Some(dir.path()));

        watcher.stop_watching();
        assert!(watcher.watch_dir().is_none());
    }

    #[test]
    fn test_restart_watching_reloads_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ppde"), "*MediaType media-type\n").unwrap();

        let watcher = PpdExtWatcher::new(Arc::new(registry()));
        watcher.start_watching(dir.path()).unwrap();
        fs::write(dir.path().join("b.ppde"), "*Duplex sides\n").unwrap();
        watcher.start_watching(dir.path()).unwrap();

        assert_eq!(watcher.registry().len(), 2);
        assert_eq!(watcher.watch_dir().as_deref(), Some(dir.path()));
    }
}
