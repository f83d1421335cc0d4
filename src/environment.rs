use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::Level;

pub const DEFAULT_CONTRIBUTIONS_ROOT: &str = "contributions";
pub const DEFAULT_CIRCUIT_SUFFIX: &str = ".r1cs";
pub const DEFAULT_KEY_SUFFIX: &str = ".zkey";
pub const DEFAULT_VERIFIER_PROGRAM: &str = "snarkjs";
pub const DEFAULT_SYNC_PROGRAM: &str = "aws";

///
/// The configuration of a single audit run.
///
/// Every component receives the values it needs from here,
/// so a run can be pointed at any contribution root.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    contributions_root: PathBuf,
    circuit_suffix: String,
    key_suffix: String,
    verifier_program: String,
    verifier_args: Vec<String>,
    verification_timeout: Option<Duration>,
    remote_archive: Option<String>,
    aws_region: Option<String>,
    sync_program: String,
    sync_timeout: Option<Duration>,
    parallel_verifications: usize,
    verbosity: Level,
}

impl Environment {
    /// Creates a new environment rooted at the given contributions directory.
    pub fn new<P: Into<PathBuf>>(contributions_root: P) -> Self {
        Self {
            contributions_root: contributions_root.into(),
            ..Default::default()
        }
    }

    pub fn with_circuit_suffix(mut self, suffix: &str) -> Self {
        self.circuit_suffix = suffix.to_string();
        self
    }

    pub fn with_key_suffix(mut self, suffix: &str) -> Self {
        self.key_suffix = suffix.to_string();
        self
    }

    /// Sets the program and leading arguments of the verification primitive.
    /// The circuit definition, parent key, and child key paths are appended in that order.
    pub fn with_verifier_command(mut self, program: &str, args: &[&str]) -> Self {
        self.verifier_program = program.to_string();
        self.verifier_args = args.iter().map(|arg| arg.to_string()).collect();
        self
    }

    pub fn with_verification_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.verification_timeout = timeout;
        self
    }

    pub fn with_remote_archive(mut self, uri: Option<String>) -> Self {
        self.remote_archive = uri;
        self
    }

    pub fn with_aws_region(mut self, region: Option<String>) -> Self {
        self.aws_region = region;
        self
    }

    pub fn with_sync_program(mut self, program: &str) -> Self {
        self.sync_program = program.to_string();
        self
    }

    pub fn with_sync_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.sync_timeout = timeout;
        self
    }

    /// Sets the number of key files verified concurrently within one pair. Zero is treated as one.
    pub fn with_parallel_verifications(mut self, parallel_verifications: usize) -> Self {
        self.parallel_verifications = parallel_verifications.max(1);
        self
    }

    pub fn with_verbosity(mut self, verbosity: Level) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Returns the directory holding one sub-directory per contribution.
    pub fn contributions_root(&self) -> &Path {
        &self.contributions_root
    }

    pub fn circuit_suffix(&self) -> &str {
        &self.circuit_suffix
    }

    pub fn key_suffix(&self) -> &str {
        &self.key_suffix
    }

    pub fn verifier_program(&self) -> &str {
        &self.verifier_program
    }

    pub fn verifier_args(&self) -> &[String] {
        &self.verifier_args
    }

    pub fn verification_timeout(&self) -> Option<Duration> {
        self.verification_timeout
    }

    pub fn remote_archive(&self) -> Option<&str> {
        self.remote_archive.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.aws_region.as_deref()
    }

    pub fn sync_program(&self) -> &str {
        &self.sync_program
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout
    }

    pub fn parallel_verifications(&self) -> usize {
        self.parallel_verifications
    }

    pub fn verbosity(&self) -> &Level {
        &self.verbosity
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            contributions_root: PathBuf::from(DEFAULT_CONTRIBUTIONS_ROOT),
            circuit_suffix: DEFAULT_CIRCUIT_SUFFIX.to_string(),
            key_suffix: DEFAULT_KEY_SUFFIX.to_string(),
            verifier_program: DEFAULT_VERIFIER_PROGRAM.to_string(),
            verifier_args: vec!["zkey".to_string(), "verify".to_string()],
            verification_timeout: None,
            remote_archive: None,
            aws_region: None,
            sync_program: DEFAULT_SYNC_PROGRAM.to_string(),
            sync_timeout: None,
            parallel_verifications: 1,
            verbosity: Level::INFO,
        }
    }
}
