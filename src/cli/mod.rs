use crate::{auditor::SyncPolicy, environment::Environment};

use std::{path::PathBuf, time::Duration};
use structopt::{clap::AppSettings, StructOpt};
use tracing::Level;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "setup-chain-verifier",
    about = "Verify every contribution of a trusted setup ceremony against its predecessor",
    author = "The Aleo Team <hello@aleo.org>",
    rename_all = "kebab-case",
    setting(AppSettings::ColoredHelp),
    setting(AppSettings::DisableHelpSubcommand)
)]
pub struct Options {
    /// Directory holding one folder per contribution, named `<ordinal>_<label>`.
    #[structopt(long, env = "SETUP_CONTRIBUTIONS_ROOT", default_value = "contributions", parse(from_os_str))]
    pub contributions_root: PathBuf,

    /// Remote archive to download contributions from, as `s3://bucket/prefix`.
    #[structopt(long, env = "SETUP_REMOTE_ARCHIVE")]
    pub remote_archive: Option<String>,

    /// Region of the remote archive.
    #[structopt(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Program used to sync the remote archive.
    #[structopt(long, env = "SETUP_SYNC_PROGRAM", default_value = "aws")]
    pub sync_program: String,

    /// Seconds to wait for the remote archive to sync.
    #[structopt(long, parse(try_from_str = parse_seconds))]
    pub sync_timeout: Option<Duration>,

    /// Download all contributions even if some exist locally.
    #[structopt(long, conflicts_with = "offline")]
    pub force_sync: bool,

    /// Never download contributions, audit the local store only.
    #[structopt(long)]
    pub offline: bool,

    /// Suffix of the circuit definition in the initial contribution.
    #[structopt(long, default_value = ".r1cs")]
    pub circuit_suffix: String,

    /// Suffix of key files.
    #[structopt(long, default_value = ".zkey")]
    pub key_suffix: String,

    /// Program used to verify a contribution.
    #[structopt(long, env = "SETUP_VERIFIER_PROGRAM", default_value = "snarkjs")]
    pub verifier_program: String,

    /// Arguments passed to the verifier before the circuit, parent key, and child key paths.
    #[structopt(long, default_value = "zkey verify")]
    pub verifier_args: String,

    /// Seconds to wait for a single verification.
    #[structopt(long, parse(try_from_str = parse_seconds))]
    pub verification_timeout: Option<Duration>,

    /// Number of key files verified at once within a contribution.
    #[structopt(long, default_value = "1")]
    pub parallel: usize,

    /// Exit with status 2 if any contribution failed to verify.
    #[structopt(long)]
    pub fail_on_broken_chain: bool,

    /// Print the report as JSON once the run completes.
    #[structopt(long)]
    pub json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[structopt(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Options {
    /// Returns the run configuration described by these options.
    pub fn environment(&self) -> Environment {
        let verifier_args: Vec<&str> = self.verifier_args.split_whitespace().collect();

        Environment::new(&self.contributions_root)
            .with_circuit_suffix(&self.circuit_suffix)
            .with_key_suffix(&self.key_suffix)
            .with_verifier_command(&self.verifier_program, &verifier_args)
            .with_verification_timeout(self.verification_timeout)
            .with_remote_archive(self.remote_archive.clone())
            .with_aws_region(self.aws_region.clone())
            .with_sync_program(&self.sync_program)
            .with_sync_timeout(self.sync_timeout)
            .with_parallel_verifications(self.parallel)
            .with_verbosity(self.verbosity())
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        match (self.force_sync, self.offline) {
            (_, true) => SyncPolicy::Offline,
            (true, false) => SyncPolicy::Force,
            (false, false) => SyncPolicy::Auto,
        }
    }

    fn verbosity(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        }
    }
}

fn parse_seconds(text: &str) -> Result<Duration, String> {
    let seconds: f64 = text.parse().map_err(|error| format!("{}: {}", text, error))?;
    match seconds.is_finite() && seconds > 0.0 {
        true => Ok(Duration::from_secs_f64(seconds)),
        false => Err(format!("{} is not a positive number of seconds", text)),
    }
}
