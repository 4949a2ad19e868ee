use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use crate::errors::ReporterError;

/// Ensure there is a usable AWS session before touching the cluster.
///
/// A valid session short-circuits on `aws sts get-caller-identity`;
/// otherwise `aws sso login` runs interactively, with the given profile
/// when one is configured.
pub async fn ensure_aws_session(profile: Option<&str>) -> Result<(), ReporterError> {
    let status = Command::new("aws")
        .args(["sts", "get-caller-identity"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| ReporterError::AwsConnection(format!("aws cli not runnable: {}", e)))?;
    if status.success() {
        return Ok(());
    }

    info!("no active AWS session, running sso login");
    let mut login = Command::new("aws");
    login.args(["sso", "login"]);
    if let Some(profile) = profile {
        login.args(["--profile", profile]);
    }
    let status = login
        .status()
        .await
        .map_err(|e| ReporterError::AwsConnection(format!("aws cli not runnable: {}", e)))?;
    if !status.success() {
        return Err(ReporterError::AwsConnection(format!(
            "aws sso login exited with {}",
            status
        )));
    }
    Ok(())
}
