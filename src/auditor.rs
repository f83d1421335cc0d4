use crate::{
    commands::Verification,
    environment::Environment,
    errors::VerifierError,
    locators::Local,
    objects::{ChainOutcome, ChainReport},
    remote::{needs_sync, SyncGateway},
    verifier::VerificationPrimitive,
};

use itertools::Itertools;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{error, info, trace, warn};

/// When the auditor fetches the remote archive.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SyncPolicy {
    /// Sync only if the local store holds no real contributions.
    Auto,
    /// Sync on every run.
    Force,
    /// Never sync.
    Offline,
}

/// The phases of one audit run, in the order they are entered.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RunState {
    Idle,
    Discovering,
    Syncing,
    Rediscovering,
    Verifying(usize),
    Reported,
}

///
/// A cooperative cancellation flag, checked between pairs only.
///
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///
/// Walks the ordered contribution sequence and verifies every adjacent pair.
///
/// Pair `i` is fully processed before pair `i + 1` begins, so the first broken
/// link in the chain is also the first one reported.
///
pub struct ChainAuditor {
    environment: Environment,
    locator: Local,
    verifier: Box<dyn VerificationPrimitive>,
    gateway: Option<SyncGateway>,
    sync_policy: SyncPolicy,
    cancellation: CancellationToken,
    transitions: Vec<RunState>,
}

impl ChainAuditor {
    pub fn new(environment: Environment, verifier: Box<dyn VerificationPrimitive>) -> Self {
        Self {
            locator: Local::new(&environment),
            environment,
            verifier,
            gateway: None,
            sync_policy: SyncPolicy::Auto,
            cancellation: CancellationToken::new(),
            transitions: vec![RunState::Idle],
        }
    }

    pub fn with_gateway(mut self, gateway: SyncGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_sync_policy(mut self, sync_policy: SyncPolicy) -> Self {
        self.sync_policy = sync_policy;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the current state of the run.
    pub fn state(&self) -> RunState {
        *self.transitions.last().unwrap_or(&RunState::Idle)
    }

    /// Returns every state entered so far, starting from `Idle`.
    pub fn transitions(&self) -> &[RunState] {
        &self.transitions
    }

    ///
    /// Runs one audit of the contribution root.
    ///
    /// Returns the report of a completed (or cancelled) run. Fatal setup errors are
    /// returned as errors, and no partial report is produced for them.
    ///
    pub async fn run(&mut self) -> Result<ChainReport, VerifierError> {
        let mut report = ChainReport::default();

        self.transition(RunState::Discovering);
        self.locator.root_init()?;
        let local_folders = self.locator.contribution_folders()?;
        info!("Found {} local contribution folders.", local_folders.len());

        if self.should_sync(local_folders.len()) {
            match self.gateway.is_some() {
                true => {
                    self.transition(RunState::Syncing);
                    match local_folders.len() {
                        0 => info!("No contributions found locally. Downloading all contributions..."),
                        1 => info!("Only the initial setup found locally. Downloading all contributions..."),
                        _ => info!("Downloading all contributions as requested..."),
                    }
                    if let Some(gateway) = &self.gateway {
                        gateway.sync_all(self.locator.root()).await?;
                    }
                    report.synced = true;
                }
                false => warn!("No remote archive is configured, auditing local contributions only"),
            }
        } else if local_folders.len() > 1 {
            info!(
                "Using already downloaded contributions. To download the latest, delete {} and run again.",
                self.locator.root().display()
            );
        }

        // The store may have changed while syncing, so the sequence is always enumerated again.
        self.transition(RunState::Rediscovering);
        let folders = self.locator.contribution_folders()?;
        report.folders = folders.len();
        info!("Found {} contributions", folders.len());

        if folders.len() < 2 {
            info!("At least two contributions are needed for verification. Nothing to verify yet.");
            self.transition(RunState::Reported);
            return Ok(report);
        }

        let circuit_definition = self.locator.circuit_definition(&folders[0])?;
        info!("Using circuit definition: {}", circuit_definition.display());
        report.circuit_definition = Some(circuit_definition.clone());

        let number_of_pairs = folders.len() - 1;
        for (offset, (parent, child)) in folders.iter().tuple_windows().enumerate() {
            let index = offset + 1;
            if self.cancellation.is_cancelled() {
                warn!("Run cancelled after {} of {} pairs", offset, number_of_pairs);
                report.cancelled = true;
                break;
            }

            self.transition(RunState::Verifying(index));
            let pair = Verification::run(
                &self.locator,
                self.verifier.as_ref(),
                &circuit_definition,
                index,
                parent,
                child,
                self.environment.parallel_verifications(),
            )
            .await?;
            report.pairs.push(pair);
        }

        self.transition(RunState::Reported);
        log_summary(&report);
        Ok(report)
    }

    fn should_sync(&self, local_folder_count: usize) -> bool {
        match self.sync_policy {
            SyncPolicy::Auto => needs_sync(local_folder_count),
            SyncPolicy::Force => true,
            SyncPolicy::Offline => false,
        }
    }

    fn transition(&mut self, state: RunState) {
        trace!("Auditor transitions from {:?} to {:?}", self.state(), state);
        self.transitions.push(state);
    }
}

/// Logs the final summary of a run.
pub fn log_summary(report: &ChainReport) {
    info!(
        "Verified {} of {} contribution pairs: {} attempted, {} passed, {} failed, {} interrupted, {} skipped",
        report.pairs.len(),
        report.folders.saturating_sub(1),
        report.attempts(),
        report.passes(),
        report.failures(),
        report.interruptions(),
        report.skips()
    );
    match report.outcome() {
        ChainOutcome::NothingToVerify => info!("Nothing to verify yet"),
        ChainOutcome::Intact => info!("The contribution chain is intact"),
        ChainOutcome::Incomplete => warn!("Every verified link holds, but the contribution chain is incomplete"),
        ChainOutcome::Broken => error!("The contribution chain is broken"),
    }
}
