use std::path::Path;
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the store watcher to the application loop.
#[derive(Debug)]
pub enum StoreEvent {
    /// One or more keys changed on disk (key names, without the `.json`).
    Changed(Vec<String>),
}

/// A file system watcher for a store directory.
///
/// This is the cross-context half of store synchronization: another process
/// writing a key shows up here as a `Changed` event, and the owner applies it
/// with `Store::apply_changes`. The watcher may also report this process's
/// own writes; reapplying those is a no-op since reload is idempotent.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl StoreWatcher {
    /// Start watching the given store directory.
    /// Returns a `StoreWatcher` whose `poll()` method should be called each tick.
    pub fn start(store_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };

                // Only creates, modifications, and removes of key files matter
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let keys: Vec<String> = event
                    .paths
                    .into_iter()
                    .filter_map(|p| {
                        // Skip .lock and in-flight temp files; key files are *.json
                        if p.extension().and_then(|e| e.to_str()) != Some("json") {
                            return None;
                        }
                        p.file_stem()
                            .and_then(|s| s.to_str())
                            .map(|s| s.to_string())
                    })
                    .collect();

                if !keys.is_empty() {
                    let _ = tx.send(StoreEvent::Changed(keys));
                }
            },
            Config::default(),
        )?;

        watcher.watch(store_dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending store events.
    /// Returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
