use setup_chain_verifier::{
    cli::Options,
    environment::Environment,
    logger::initialize_logger,
    remote::{AwsCliArchive, SyncGateway},
    verifier::CommandVerifier,
    CancellationToken,
    ChainAuditor,
    SyncPolicy,
    VerifierError,
};

use std::process;
use structopt::StructOpt;
use tracing::{error, info, warn};

const EXIT_FATAL: i32 = 1;
const EXIT_BROKEN_CHAIN: i32 = 2;

async fn run(options: &Options, environment: Environment) -> anyhow::Result<i32> {
    let cancellation = CancellationToken::new();
    {
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current contribution");
                cancellation.cancel();
            }
        });
    }

    let verifier = CommandVerifier::new(&environment);
    let mut auditor = ChainAuditor::new(environment.clone(), Box::new(verifier))
        .with_sync_policy(options.sync_policy())
        .with_cancellation(cancellation);
    // An offline audit never reads the archive configuration.
    if options.sync_policy() != SyncPolicy::Offline {
        if let Some(archive) = AwsCliArchive::from_environment(&environment)? {
            auditor = auditor.with_gateway(SyncGateway::new(Box::new(archive)));
        }
    }

    let report = auditor.run().await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    }

    if report.cancelled {
        return Err(VerifierError::Cancelled(report.pairs.len(), report.folders.saturating_sub(1)).into());
    }

    match !report.is_success() && options.fail_on_broken_chain {
        true => Ok(EXIT_BROKEN_CHAIN),
        false => Ok(0),
    }
}

#[tokio::main]
async fn main() {
    let options = Options::from_args();
    let environment = options.environment();

    initialize_logger(&environment);

    info!("Auditing contributions in {}", environment.contributions_root().display());
    match run(&options, environment).await {
        Ok(code) => process::exit(code),
        Err(error) => {
            error!("Error: {:#}", error);
            process::exit(EXIT_FATAL);
        }
    }
}
