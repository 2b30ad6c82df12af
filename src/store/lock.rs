use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock serializing write commands against one store directory.
///
/// Uses platform-native flock (Unix) so independent `tsk` processes do not
/// interleave their read-modify-write cycles. Reads never take the lock;
/// cross-process visibility of plain writes is last-write-wins at the file
/// level.
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another taskify process may be writing")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StoreLock {
    /// Acquire an advisory lock on the store directory.
    /// Blocks up to `timeout` waiting for the lock.
    pub fn acquire(store_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = store_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let deadline = Instant::now() + timeout;
        while try_lock(&file).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path: lock_path });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(StoreLock {
            _file: file,
            path: lock_path,
        })
    }

    /// Acquire with default timeout (5 seconds)
    pub fn acquire_default(store_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(store_dir, Duration::from_secs(5))
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // flock releases with the fd; the unlink just keeps the dir tidy
        let _ = fs::remove_file(&self.path);
    }
}

/// Try to acquire an exclusive flock on the file (non-blocking)
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    match unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } {
        0 => Ok(()),
        _ => Err(std::io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    // No advisory locking elsewhere; last-write-wins still holds
    Ok(())
}
