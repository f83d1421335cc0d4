use crate::{
    environment::Environment,
    errors::VerifierError,
    objects::VerificationResult,
    utils::{isolated_command, terminating_signal},
    verifier::VerificationPrimitive,
};

use async_trait::async_trait;
use std::{
    path::Path,
    process::{Output, Stdio},
    time::{Duration, Instant},
};
use tracing::{debug, trace};

///
/// Runs an external program as the verification primitive,
/// by default `snarkjs zkey verify <circuit> <parent> <child>`.
///
/// The exit status decides pass or fail. The diagnostic is the standard
/// error stream, or the standard output if the program wrote nothing there.
/// A program terminated by a signal is reported as interrupted.
///
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandVerifier {
    pub fn new(environment: &Environment) -> Self {
        Self {
            program: environment.verifier_program().to_string(),
            args: environment.verifier_args().to_vec(),
            timeout: environment.verification_timeout(),
        }
    }

    /// Returns the command line used for the given paths, for logging.
    pub fn command_line(&self, circuit_definition: &Path, parent_key: &Path, child_key: &Path) -> String {
        let mut line = vec![self.program.clone()];
        line.extend(self.args.iter().cloned());
        for path in [circuit_definition, parent_key, child_key] {
            line.push(path.display().to_string());
        }
        line.join(" ")
    }

    fn unavailable(&self, error: std::io::Error) -> VerifierError {
        VerifierError::VerifierUnavailable(self.program.clone(), error.to_string())
    }
}

#[async_trait]
impl VerificationPrimitive for CommandVerifier {
    async fn verify(
        &self,
        circuit_definition: &Path,
        parent_key: &Path,
        child_key: &Path,
    ) -> Result<VerificationResult, VerifierError> {
        trace!("Running {}", self.command_line(circuit_definition, parent_key, child_key));

        let process = isolated_command(&self.program)
            .args(&self.args)
            .arg(circuit_definition)
            .arg(parent_key)
            .arg(child_key)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed out verification must not outlive its future.
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| self.unavailable(error))?;

        let start = Instant::now();
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, process.wait_with_output())
                .await
                .map_err(|_| VerifierError::VerificationTimeout(child_key.to_path_buf(), timeout))?,
            None => process.wait_with_output().await,
        }
        .map_err(|error| self.unavailable(error))?;

        debug!(
            "{} exited with {} after {} ms",
            self.program,
            output.status,
            start.elapsed().as_millis()
        );

        // A killed verifier gave no verdict on the contribution.
        if let Some(signal) = terminating_signal(&output.status) {
            return Err(VerifierError::VerificationInterrupted(child_key.to_path_buf(), signal));
        }

        let diagnostic = diagnostic(&output);
        match output.status.success() {
            true => Ok(VerificationResult::pass(diagnostic)),
            false => Ok(VerificationResult::fail(diagnostic)),
        }
    }
}

fn diagnostic(output: &Output) -> String {
    match output.stderr.is_empty() {
        true => String::from_utf8_lossy(&output.stdout).into_owned(),
        false => String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
