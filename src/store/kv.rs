use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Schema version written into every key file. Payloads carrying a different
/// version are treated like malformed data: ignored, caller gets the default.
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk shape of a key file: a versioned envelope around the payload.
#[derive(Debug, Serialize, serde::Deserialize)]
struct Envelope {
    v: u32,
    value: Value,
}

/// Directory-backed key-value store, one JSON file per key.
///
/// Behaves like ordinary in-memory state that happens to be durable:
/// reads are answered from a per-key snapshot, every `set` writes through to
/// `<dir>/<key>.json`, and [`Store::reload`] picks up changes made by another
/// process sharing the directory.
///
/// Failure policy is availability over strictness: absent, malformed, or
/// wrong-version payloads fall back to the caller's default, and a failed
/// write degrades the key to ephemeral for the rest of the session. Both
/// cases are logged, never surfaced to the caller.
///
/// Conflict policy between processes is last-write-wins per key. There is no
/// multi-key atomicity: a reader can observe two related keys momentarily out
/// of sync.
#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    snapshots: HashMap<String, Value>,
}

impl Store {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Store, std::io::Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Store {
            dir,
            snapshots: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the value under `key`, falling back to `default` when the key is
    /// absent or its payload does not decode. The fallback is NOT written
    /// back. Repeated calls without an intervening `set` return the same
    /// value.
    pub fn get_or_init<T>(&mut self, key: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        if !self.snapshots.contains_key(key) {
            let loaded = match read_envelope(&self.key_path(key)) {
                Some(value) => value,
                None => match serde_json::to_value(&default) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("could not snapshot default for key {key}: {e}");
                        return default;
                    }
                },
            };
            self.snapshots.insert(key.to_string(), loaded);
        }

        match serde_json::from_value(self.snapshots[key].clone()) {
            Ok(value) => value,
            Err(e) => {
                warn!("stored value under {key} does not match the requested shape: {e}");
                default
            }
        }
    }

    /// Encode `value`, update the snapshot, and write through to disk.
    /// A failed write is logged and swallowed; the in-memory snapshot stays
    /// authoritative for the rest of the session.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("could not encode value for key {key}: {e}");
                return;
            }
        };
        self.snapshots.insert(key.to_string(), encoded.clone());

        if let Err(e) = self.write_envelope(key, &encoded) {
            warn!("could not persist {key}: {e}; the value stays in memory only");
        }
    }

    /// Read-modify-write against the latest local snapshot. Using this
    /// instead of a caller-held copy avoids lost updates within one process.
    pub fn update<T, F>(&mut self, key: &str, default: T, f: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let current = self.get_or_init(key, default);
        let next = f(current);
        self.set(key, &next);
        next
    }

    /// Drop the key from the snapshot and delete its file (logout path).
    pub fn remove(&mut self, key: &str) {
        self.snapshots.remove(key);
        let path = self.key_path(key);
        if path.exists()
            && let Err(e) = fs::remove_file(&path)
        {
            warn!("could not remove {}: {e}", path.display());
        }
    }

    /// Whether this context holds a snapshot for `key`.
    pub fn is_tracked(&self, key: &str) -> bool {
        self.snapshots.contains_key(key)
    }

    /// Re-read `key` from disk after an external change. The snapshot is
    /// replaced only when the incoming payload decodes; a partial or invalid
    /// payload leaves the previous snapshot intact. A deleted file drops the
    /// snapshot (another process removed the key, e.g. logout), so the next
    /// read falls back to the default. Returns true when the snapshot
    /// changed.
    pub fn reload(&mut self, key: &str) -> bool {
        let path = self.key_path(key);
        if !path.exists() {
            return self.snapshots.remove(key).is_some();
        }
        match read_envelope(&path) {
            Some(value) => {
                self.snapshots.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Reload every tracked key in `keys`, returning the ones that changed.
    /// Untracked keys are skipped: another process touching a key this
    /// context never read is not our concern.
    pub fn apply_changes(&mut self, keys: &[String]) -> Vec<String> {
        let mut reloaded = Vec::new();
        for key in keys {
            if self.is_tracked(key) && self.reload(key) {
                reloaded.push(key.clone());
            }
        }
        reloaded
    }

    /// Write via a temp file in the same directory so concurrent readers
    /// never observe a half-written payload.
    fn write_envelope(&self, key: &str, value: &Value) -> Result<(), std::io::Error> {
        let envelope = Envelope {
            v: SCHEMA_VERSION,
            value: value.clone(),
        };
        let content = serde_json::to_string_pretty(&envelope)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(self.key_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Read and unwrap a key file. Missing file, malformed JSON, and schema
/// version mismatch all collapse to `None` (the caller falls back to its
/// default); only the latter two are log-worthy.
fn read_envelope(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    let envelope: Envelope = match serde_json::from_str(&content) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("malformed payload at {}: {e}", path.display());
            return None;
        }
    };
    if envelope.v != SCHEMA_VERSION {
        warn!(
            "unsupported schema version {} at {} (expected {SCHEMA_VERSION})",
            envelope.v,
            path.display()
        );
        return None;
    }
    Some(envelope.value)
}
