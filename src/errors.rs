use std::{path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("{}: {}", _0, _1)]
    Crate(&'static str, String),

    #[error("Contribution root {} is unreadable: {}", _0.display(), _1)]
    UnreadableRoot(PathBuf, String),

    #[error("Contribution folder name {} does not follow the <ordinal>_<label> convention", _0)]
    UnparsableFolderName(String),

    #[error("Contribution folders {} and {} share ordinal {}", _1, _2, _0)]
    DuplicateOrdinal(u64, String, String),

    #[error("No circuit definition ({}) found in {}", _1, _0.display())]
    MissingCircuitDefinition(PathBuf, String),

    #[error("Found {} circuit definition candidates in {}, expected exactly one", _1.len(), _0.display())]
    AmbiguousCircuitDefinition(PathBuf, Vec<String>),

    #[error("Failed to sync contributions from {}: {}", _0, _1)]
    SyncFailed(String, String),

    #[error("Syncing contributions from {} timed out after {:?}", _0, _1)]
    SyncTimeout(String, Duration),

    #[error("Another sync (process {}) holds the lock {}. Delete it if no sync is running", _1, _0.display())]
    SyncInProgress(PathBuf, String),

    #[error("Verification primitive {} could not be invoked: {}", _0, _1)]
    VerifierUnavailable(String, String),

    #[error("Verification of {} timed out after {:?}", _0.display(), _1)]
    VerificationTimeout(PathBuf, Duration),

    #[error("Verification of {} was interrupted by signal {}", _0.display(), _1)]
    VerificationInterrupted(PathBuf, i32),

    #[error("File name {} is not valid UTF-8", _0.display())]
    NonUtf8FileName(PathBuf),

    #[error("Run cancelled after {} of {} pairs", _0, _1)]
    Cancelled(usize, usize),
}

impl From<std::io::Error> for VerifierError {
    fn from(error: std::io::Error) -> Self {
        VerifierError::Crate("std::io", format!("{:?}", error))
    }
}

impl From<url::ParseError> for VerifierError {
    fn from(error: url::ParseError) -> Self {
        VerifierError::Crate("url", format!("{:?}", error))
    }
}
