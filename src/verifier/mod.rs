pub mod command;
pub use command::*;

use crate::{errors::VerifierError, objects::VerificationResult};

use async_trait::async_trait;
use std::path::Path;

///
/// The opaque cryptographic check that a child key is an honest update
/// of its parent key under a circuit definition.
///
/// A failed check is returned as a failing `VerificationResult`. Errors are
/// reserved for a primitive that could not run at all (`VerifierUnavailable`)
/// or did not finish in time (`VerificationTimeout`).
///
#[async_trait]
pub trait VerificationPrimitive: Send + Sync {
    async fn verify(
        &self,
        circuit_definition: &Path,
        parent_key: &Path,
        child_key: &Path,
    ) -> Result<VerificationResult, VerifierError>;
}
