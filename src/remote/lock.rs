use crate::errors::VerifierError;

use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{trace, warn};

pub const SYNC_LOCK_FILENAME: &str = ".sync.lock";

///
/// An exclusive lock file held in the contribution root while it is being synced.
/// Released when dropped.
///
#[derive(Debug)]
pub struct SyncLock {
    path: PathBuf,
}

impl SyncLock {
    ///
    /// Acquires the lock for the given root, failing with `SyncInProgress` if it is held.
    ///
    /// A lock left behind by a process that no longer exists is removed and taken over.
    ///
    pub fn acquire(root: &Path) -> Result<Self, VerifierError> {
        let path = root.join(SYNC_LOCK_FILENAME);
        match Self::create(&path) {
            Err(VerifierError::SyncInProgress(path, holder)) if holder_is_gone(&holder) => {
                warn!("Removing stale sync lock {} left by process {}", path.display(), holder);
                fs_err::remove_file(&path)?;
                Self::create(&path)
            }
            result => result,
        }
    }

    fn create(path: &Path) -> Result<Self, VerifierError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                let holder = fs_err::read_to_string(path)
                    .map(|contents| contents.trim().to_string())
                    .unwrap_or_default();
                return Err(VerifierError::SyncInProgress(path.to_path_buf(), holder));
            }
            Err(error) => return Err(error.into()),
        };
        writeln!(file, "{}", std::process::id())?;

        trace!("Acquired sync lock {}", path.display());
        Ok(Self { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Returns `true` if the process that wrote the lock is known to have exited.
/// Only decidable where `/proc` lists running processes.
fn holder_is_gone(holder: &str) -> bool {
    let processes = Path::new("/proc");
    match holder.parse::<u32>() {
        Ok(pid) => processes.join("self").exists() && !processes.join(pid.to_string()).exists(),
        Err(_) => false,
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            warn!("Failed to release sync lock {}: {}", self.path.display(), error);
        }
    }
}
