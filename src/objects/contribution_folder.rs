use crate::errors::VerifierError;

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
};

/// The position of a contribution in the ceremony. Ordinal 0 is the initial setup.
pub type Ordinal = u64;

///
/// One ceremony step on disk, named `<ordinal>` or `<ordinal>_<label>`
/// (for example `000_initial` or `001_alice`).
///
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContributionFolder {
    ordinal: Ordinal,
    name: String,
    path: PathBuf,
}

impl ContributionFolder {
    /// Returns the contribution folder for a directory entry named `name` under `root`.
    ///
    /// Names that do not start with an ASCII digit are not contribution folders and
    /// return `Ok(None)`. Names that start with a digit but do not parse are rejected
    /// with `VerifierError::UnparsableFolderName`, so the ordering is never guessed.
    pub fn from_entry(root: &Path, name: &str) -> Result<Option<Self>, VerifierError> {
        match parse_ordinal(name)? {
            Some(ordinal) => Ok(Some(Self {
                ordinal,
                name: name.to_string(),
                path: root.join(name),
            })),
            None => Ok(None),
        }
    }

    /// Returns the ordinal of this contribution.
    #[inline]
    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    /// Returns the directory name of this contribution.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path of this contribution, including the contribution root.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the artifact `filename` inside this contribution.
    #[inline]
    pub fn artifact(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Returns `true` if this is the initial setup. Otherwise, returns `false`.
    #[inline]
    pub fn is_initial(&self) -> bool {
        self.ordinal == 0
    }
}

impl Ord for ContributionFolder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal).then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for ContributionFolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ContributionFolder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parses the leading ordinal of a folder name.
fn parse_ordinal(name: &str) -> Result<Option<Ordinal>, VerifierError> {
    if !name.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(None);
    }

    let digits_end = name.find(|c: char| !c.is_ascii_digit()).unwrap_or(name.len());
    let (digits, rest) = name.split_at(digits_end);
    if !(rest.is_empty() || rest.starts_with('_')) {
        return Err(VerifierError::UnparsableFolderName(name.to_string()));
    }

    digits
        .parse::<Ordinal>()
        .map(Some)
        .map_err(|_| VerifierError::UnparsableFolderName(name.to_string()))
}
