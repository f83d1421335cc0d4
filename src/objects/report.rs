use crate::objects::{ContributionFolder, Ordinal, VerificationResult};

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// What happened to one key file of a pair.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FileOutcome {
    /// The verification primitive ran and returned a result.
    Verified(VerificationResult),
    /// The verification primitive did not finish within the configured timeout.
    TimedOut { after: Duration },
    /// The verification primitive was killed by a signal before it gave a verdict.
    Interrupted { signal: i32 },
    /// The child contribution has no file of the same name.
    MissingInChild,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub filename: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn new(filename: &str, outcome: FileOutcome) -> Self {
        Self {
            filename: filename.to_string(),
            outcome,
        }
    }

    /// Returns `true` if the verification primitive was invoked for this file.
    /// Otherwise, returns `false`.
    pub fn is_attempt(&self) -> bool {
        !matches!(self.outcome, FileOutcome::MissingInChild)
    }

    /// Returns `true` if the file verified successfully. Otherwise, returns `false`.
    pub fn is_pass(&self) -> bool {
        matches!(&self.outcome, FileOutcome::Verified(result) if result.passed())
    }

    /// Returns `true` if the file is a broken link in the chain. Otherwise, returns `false`.
    pub fn is_failure(&self) -> bool {
        self.is_attempt() && !self.is_pass() && !self.is_interrupted()
    }

    /// Returns `true` if the verification was started but never finished.
    /// Otherwise, returns `false`.
    pub fn is_interrupted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Interrupted { .. })
    }

    /// Returns `true` if the file could not be verified for lack of data.
    /// Otherwise, returns `false`.
    pub fn is_skip(&self) -> bool {
        !self.is_attempt()
    }
}

/// Pair-level observations that do not belong to a single key file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PairDiagnostic {
    /// The parent contribution holds no key files, so nothing in this pair was verified.
    NoParentKeys,
    /// The ordinals of the pair are not consecutive.
    OrdinalGap { parent: Ordinal, child: Ordinal },
}

///
/// Everything recorded for one adjacent pair `(folder[index - 1], folder[index])`.
///
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PairReport {
    pub index: usize,
    pub parent: String,
    pub child: String,
    pub files: Vec<FileReport>,
    pub diagnostics: Vec<PairDiagnostic>,
}

impl PairReport {
    pub fn new(index: usize, parent: &ContributionFolder, child: &ContributionFolder) -> Self {
        Self {
            index,
            parent: parent.name().to_string(),
            child: child.name().to_string(),
            files: vec![],
            diagnostics: vec![],
        }
    }

    pub fn attempts(&self) -> usize {
        self.files.iter().filter(|file| file.is_attempt()).count()
    }

    pub fn failures(&self) -> usize {
        self.files.iter().filter(|file| file.is_failure()).count()
    }

    pub fn interruptions(&self) -> usize {
        self.files.iter().filter(|file| file.is_interrupted()).count()
    }

    /// Returns the number of skipped files, counting a pair without parent keys as one skip.
    pub fn skips(&self) -> usize {
        let no_parent_keys = self
            .diagnostics
            .iter()
            .filter(|diagnostic| **diagnostic == PairDiagnostic::NoParentKeys)
            .count();
        self.files.iter().filter(|file| file.is_skip()).count() + no_parent_keys
    }
}

/// The aggregate state of the chain after a run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainOutcome {
    /// Fewer than two contributions exist.
    NothingToVerify,
    /// Every key file of every pair was verified and passed.
    Intact,
    /// No verification failed, but some files were skipped or interrupted, or the run was cancelled.
    Incomplete,
    /// At least one verification failed or timed out.
    Broken,
}

///
/// The report of one audit run. Never persisted between runs.
///
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChainReport {
    pub folders: usize,
    pub synced: bool,
    pub circuit_definition: Option<PathBuf>,
    pub pairs: Vec<PairReport>,
    pub cancelled: bool,
}

impl ChainReport {
    /// Returns the number of invocations of the verification primitive.
    pub fn attempts(&self) -> usize {
        self.pairs.iter().map(PairReport::attempts).sum()
    }

    pub fn passes(&self) -> usize {
        self.files().filter(|file| file.is_pass()).count()
    }

    pub fn failures(&self) -> usize {
        self.pairs.iter().map(PairReport::failures).sum()
    }

    pub fn skips(&self) -> usize {
        self.pairs.iter().map(PairReport::skips).sum()
    }

    pub fn interruptions(&self) -> usize {
        self.pairs.iter().map(PairReport::interruptions).sum()
    }

    /// Returns every file report in pair order.
    pub fn files(&self) -> impl Iterator<Item = &FileReport> {
        self.pairs.iter().flat_map(|pair| pair.files.iter())
    }

    pub fn outcome(&self) -> ChainOutcome {
        if self.folders < 2 {
            ChainOutcome::NothingToVerify
        } else if self.failures() > 0 {
            ChainOutcome::Broken
        } else if self.skips() > 0 || self.interruptions() > 0 || self.cancelled {
            ChainOutcome::Incomplete
        } else {
            ChainOutcome::Intact
        }
    }

    /// Returns `true` if no invoked verification failed. Skips do not count as failures.
    pub fn is_success(&self) -> bool {
        self.outcome() != ChainOutcome::Broken
    }

    /// Returns the report together with its derived counts and outcome, for printing.
    pub fn summary(&self) -> ChainSummary<'_> {
        ChainSummary {
            outcome: self.outcome(),
            attempts: self.attempts(),
            passes: self.passes(),
            failures: self.failures(),
            skips: self.skips(),
            interruptions: self.interruptions(),
            report: self,
        }
    }
}

/// A serializable view of a `ChainReport` that includes its outcome and counts.
#[derive(Debug, Serialize)]
pub struct ChainSummary<'a> {
    pub outcome: ChainOutcome,
    pub attempts: usize,
    pub passes: usize,
    pub failures: usize,
    pub skips: usize,
    pub interruptions: usize,
    #[serde(flatten)]
    pub report: &'a ChainReport,
}
