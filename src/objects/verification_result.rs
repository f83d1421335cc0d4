use serde::{Deserialize, Serialize};

///
/// The outcome of verifying one child key against its parent key
/// under the circuit definition.
///
/// A failed verification is a normal result, not an error.
///
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    passed: bool,
    diagnostic: String,
}

impl VerificationResult {
    /// Creates a passing result.
    pub fn pass(diagnostic: String) -> Self {
        Self {
            passed: true,
            diagnostic,
        }
    }

    /// Creates a failing result carrying the primitive's diagnostic text.
    pub fn fail(diagnostic: String) -> Self {
        Self {
            passed: false,
            diagnostic,
        }
    }

    /// Returns `true` if the child key is a valid update of the parent key.
    /// Otherwise, returns `false`.
    #[inline]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Returns the diagnostic text of the verification primitive, verbatim.
    #[inline]
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }
}
