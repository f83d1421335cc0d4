use crate::{
    errors::VerifierError,
    remote::{RemoteArchive, SyncLock},
};

use std::{path::Path, time::Instant};
use tracing::info;

///
/// Returns `true` if the local store must be fetched from the remote archive.
///
/// A store with no folders, or with only the initial setup, holds no real
/// contributions yet. Once contributions exist locally they are reused.
///
#[inline]
pub fn needs_sync(local_folder_count: usize) -> bool {
    local_folder_count <= 1
}

///
/// The only writer of the contribution root.
///
pub struct SyncGateway {
    archive: Box<dyn RemoteArchive>,
}

impl SyncGateway {
    pub fn new(archive: Box<dyn RemoteArchive>) -> Self {
        Self { archive }
    }

    pub fn describe(&self) -> String {
        self.archive.describe()
    }

    ///
    /// Fetches every remote contribution into `root` while holding the sync lock.
    ///
    /// Any transport failure is returned as is; the caller must not verify
    /// against a store that failed to sync.
    ///
    pub async fn sync_all(&self, root: &Path) -> Result<(), VerifierError> {
        let _lock = SyncLock::acquire(root)?;

        info!("Downloading all contributions from {}...", self.archive.describe());
        let start = Instant::now();
        self.archive.fetch_all(root).await?;
        info!(
            "Downloaded contributions from {} in {} ms",
            self.archive.describe(),
            start.elapsed().as_millis()
        );

        Ok(())
    }
}
