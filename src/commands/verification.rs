use crate::{
    errors::VerifierError,
    locators::Local,
    objects::{ContributionFolder, FileOutcome, FileReport, PairDiagnostic, PairReport},
    verifier::VerificationPrimitive,
};

use futures::{stream, StreamExt, TryStreamExt};
use std::path::Path;
use tracing::{debug, error, info, warn};

pub struct Verification;

impl Verification {
    ///
    /// Verifies every key file of `parent` against the same-named key file of `child`.
    ///
    /// Missing data is recorded in the returned report and never aborts the pair.
    /// Only an unavailable verification primitive (or a filesystem error) is returned
    /// as an error. Up to `parallel_verifications` files are verified at once, and the
    /// report lists files in sorted filename order regardless.
    ///
    pub async fn run(
        locator: &Local,
        verifier: &dyn VerificationPrimitive,
        circuit_definition: &Path,
        index: usize,
        parent: &ContributionFolder,
        child: &ContributionFolder,
        parallel_verifications: usize,
    ) -> Result<PairReport, VerifierError> {
        info!("Verifying contributions in {}...", child);

        let mut report = PairReport::new(index, parent, child);

        if child.ordinal() != parent.ordinal() + 1 {
            warn!(
                "Contribution {} follows {} with a gap in ordinals, verifying against {}",
                child,
                parent,
                parent
            );
            report.diagnostics.push(PairDiagnostic::OrdinalGap {
                parent: parent.ordinal(),
                child: child.ordinal(),
            });
        }

        let key_files = locator.key_files(parent)?;
        if key_files.is_empty() {
            error!("No key files found in {}", parent);
            report.diagnostics.push(PairDiagnostic::NoParentKeys);
            return Ok(report);
        }

        report.files = stream::iter(key_files.iter())
            .map(|filename| Self::execute(locator, verifier, circuit_definition, parent, child, filename))
            .buffered(parallel_verifications.max(1))
            .try_collect()
            .await?;

        info!(
            "Completed {} with {} verified, {} failed, {} interrupted, and {} skipped",
            child,
            report.files.iter().filter(|file| file.is_pass()).count(),
            report.failures(),
            report.interruptions(),
            report.skips()
        );

        Ok(report)
    }

    async fn execute(
        locator: &Local,
        verifier: &dyn VerificationPrimitive,
        circuit_definition: &Path,
        parent: &ContributionFolder,
        child: &ContributionFolder,
        filename: &str,
    ) -> Result<FileReport, VerifierError> {
        if !locator.key_file_exists(child, filename) {
            error!("Corresponding key file {} not found in {}", filename, child);
            return Ok(FileReport::new(filename, FileOutcome::MissingInChild));
        }

        info!("Verifying {}...", filename);
        let parent_key = parent.artifact(filename);
        let child_key = child.artifact(filename);
        debug!("Parent key is {}", parent_key.display());
        debug!("Child key is {}", child_key.display());

        let outcome = match verifier.verify(circuit_definition, &parent_key, &child_key).await {
            Ok(result) => {
                match result.passed() {
                    true => info!("{} verification successful", filename),
                    false => error!("Failed to verify {} in {}\n{}", filename, child, result.diagnostic()),
                }
                FileOutcome::Verified(result)
            }
            Err(VerifierError::VerificationTimeout(_, after)) => {
                error!("Verification of {} in {} timed out after {:?}", filename, child, after);
                FileOutcome::TimedOut { after }
            }
            Err(VerifierError::VerificationInterrupted(_, signal)) => {
                warn!("Verification of {} in {} was interrupted by signal {}", filename, child, signal);
                FileOutcome::Interrupted { signal }
            }
            Err(error) => return Err(error),
        };

        Ok(FileReport::new(filename, outcome))
    }
}
