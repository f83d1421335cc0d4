pub mod aws;
pub use aws::*;

pub mod gateway;
pub use gateway::*;

pub mod lock;
pub use lock::*;

use crate::errors::VerifierError;

use async_trait::async_trait;
use std::path::Path;

///
/// A bulk fetch of every remote contribution into a local root.
///
/// Implementations must be idempotent: fetching twice leaves the same
/// local state as fetching once, modulo remote-side changes.
///
#[async_trait]
pub trait RemoteArchive: Send + Sync {
    /// Returns a human-readable name of the remote, for logging.
    fn describe(&self) -> String;

    async fn fetch_all(&self, root: &Path) -> Result<(), VerifierError>;
}
