use crate::{environment::Environment, errors::VerifierError, remote::RemoteArchive, utils::isolated_command};

use async_trait::async_trait;
use std::{path::Path, process::Stdio, time::Duration};
use tracing::{debug, trace};
use url::Url;

///
/// Mirrors an `s3://bucket/prefix` archive into the contribution root
/// with `aws s3 sync`. Credentials come from the usual AWS configuration.
///
#[derive(Debug, Clone)]
pub struct AwsCliArchive {
    uri: Url,
    region: Option<String>,
    program: String,
    timeout: Option<Duration>,
}

impl AwsCliArchive {
    /// Returns the archive configured in the environment, if any.
    pub fn from_environment(environment: &Environment) -> Result<Option<Self>, VerifierError> {
        match environment.remote_archive() {
            Some(uri) => Ok(Some(Self {
                uri: parse_archive_uri(uri)?,
                region: environment.aws_region().map(str::to_string),
                program: environment.sync_program().to_string(),
                timeout: environment.sync_timeout(),
            })),
            None => Ok(None),
        }
    }

    fn arguments(&self, root: &Path) -> Vec<String> {
        let mut arguments = vec![
            "s3".to_string(),
            "sync".to_string(),
            self.uri.to_string(),
            root.display().to_string(),
            "--only-show-errors".to_string(),
        ];
        if let Some(region) = &self.region {
            arguments.push("--region".to_string());
            arguments.push(region.clone());
        }
        arguments
    }
}

#[async_trait]
impl RemoteArchive for AwsCliArchive {
    fn describe(&self) -> String {
        self.uri.to_string()
    }

    async fn fetch_all(&self, root: &Path) -> Result<(), VerifierError> {
        let arguments = self.arguments(root);
        trace!("Running {} {}", self.program, arguments.join(" "));

        let process = isolated_command(&self.program)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| VerifierError::SyncFailed(self.describe(), format!("{}: {}", self.program, error)))?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, process.wait_with_output())
                .await
                .map_err(|_| VerifierError::SyncTimeout(self.describe(), timeout))?,
            None => process.wait_with_output().await,
        }
        .map_err(|error| VerifierError::SyncFailed(self.describe(), error.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VerifierError::SyncFailed(
                self.describe(),
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }

        debug!("{} completed for {}", self.program, self.describe());
        Ok(())
    }
}

/// Parses and checks an `s3://bucket[/prefix]` URI.
fn parse_archive_uri(uri: &str) -> Result<Url, VerifierError> {
    let url = Url::parse(uri)?;
    match url.scheme() == "s3" && url.host_str().map_or(false, |bucket| !bucket.is_empty()) {
        true => Ok(url),
        false => Err(VerifierError::SyncFailed(
            uri.to_string(),
            "expected an s3://bucket/prefix URI".to_string(),
        )),
    }
}
