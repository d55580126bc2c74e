use crate::error::{PlayerError, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::trace;

/// Run a player client to completion and return its stdout.
///
/// The child is killed if the returned future is dropped, so callers can
/// bound it with `tokio::time::timeout`.
pub async fn run(program: &'static str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlayerError::ClientMissing { program },
            _ => PlayerError::Io(e),
        })?;

    if !output.status.success() {
        return Err(PlayerError::CommandFailed {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    trace!("{} {:?} -> {} bytes", program, args, stdout.len());
    Ok(stdout)
}
