use crate::{
    errors::VerifierError,
    objects::VerificationResult,
    remote::RemoteArchive,
    testing::ceremony::write_folder,
    verifier::VerificationPrimitive,
};

use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

/// An ordered log of calls, shared between fakes to check interleaving.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: String) {
        self.0.lock().expect("call log poisoned").push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("call log poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().expect("call log poisoned").len()
    }
}

/// Returns `<folder>/<file>` for a key path.
pub fn short_path(path: &Path) -> String {
    let components: Vec<_> = path
        .components()
        .rev()
        .take(2)
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    components.into_iter().rev().collect::<Vec<_>>().join("/")
}

///
/// A remote archive that materializes a fixed set of folders.
///
#[derive(Debug, Clone, Default)]
pub struct FakeArchive {
    folders: Vec<(String, Vec<String>)>,
    failing: bool,
    log: CallLog,
}

impl FakeArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn folder(mut self, name: &str, files: &[&str]) -> Self {
        self.folders
            .push((name.to_string(), files.iter().map(|file| file.to_string()).collect()));
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Returns the log of fetches made through this archive.
    pub fn fetches(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl RemoteArchive for FakeArchive {
    fn describe(&self) -> String {
        "fake://archive".to_string()
    }

    async fn fetch_all(&self, root: &Path) -> Result<(), VerifierError> {
        self.log.record("sync".to_string());
        if self.failing {
            return Err(VerifierError::SyncFailed(self.describe(), "connection reset".to_string()));
        }
        for (name, files) in &self.folders {
            let files: Vec<_> = files.iter().map(String::as_str).collect();
            write_folder(root, name, &files);
        }
        Ok(())
    }
}

///
/// A deterministic verification primitive. Every child key passes unless
/// it was registered as failing, hanging or interrupted, or the primitive is unavailable.
/// Keys are named `<folder>/<file>`.
///
#[derive(Debug, Clone, Default)]
pub struct FakeVerifier {
    failing: HashSet<String>,
    hanging: HashSet<String>,
    interrupted: HashSet<String>,
    delays: HashMap<String, Duration>,
    unavailable: bool,
    log: CallLog,
}

impl FakeVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn failing(mut self, child_key: &str) -> Self {
        self.failing.insert(child_key.to_string());
        self
    }

    pub fn hanging(mut self, child_key: &str) -> Self {
        self.hanging.insert(child_key.to_string());
        self
    }

    /// Registers a child key whose verification is killed by SIGINT.
    pub fn interrupted(mut self, child_key: &str) -> Self {
        self.interrupted.insert(child_key.to_string());
        self
    }

    pub fn delayed(mut self, child_key: &str, delay: Duration) -> Self {
        self.delays.insert(child_key.to_string(), delay);
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Returns the log of verifications, as `verify <parent> -> <child>`.
    pub fn calls(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl VerificationPrimitive for FakeVerifier {
    async fn verify(
        &self,
        circuit_definition: &Path,
        parent_key: &Path,
        child_key: &Path,
    ) -> Result<VerificationResult, VerifierError> {
        if self.unavailable {
            return Err(VerifierError::VerifierUnavailable(
                "fake".to_string(),
                "No such file or directory".to_string(),
            ));
        }

        let child = short_path(child_key);
        if let Some(delay) = self.delays.get(&child) {
            tokio::time::sleep(*delay).await;
        }
        self.log
            .record(format!("verify {} -> {}", short_path(parent_key), child));

        if self.hanging.contains(&child) {
            return Err(VerifierError::VerificationTimeout(
                child_key.to_path_buf(),
                Duration::from_secs(1),
            ));
        }
        if self.interrupted.contains(&child) {
            return Err(VerifierError::VerificationInterrupted(child_key.to_path_buf(), 2));
        }
        match self.failing.contains(&child) {
            true => Ok(VerificationResult::fail(format!(
                "{} is not a valid contribution of {} under {}",
                child,
                short_path(parent_key),
                short_path(circuit_definition)
            ))),
            false => Ok(VerificationResult::pass("ZKey Ok!".to_string())),
        }
    }
}
