use std::process::Stdio;
use std::time::Duration;

use folio_application::ApplicationError;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub stdout: Vec<u8>,
}

/// Runs an external tool to completion from synchronous code. With a
/// timeout, a child that is still running at the deadline is killed and
/// reported as a failure.
///
/// Intake processing runs on a plain worker thread, so this drives the child
/// on a private current-thread runtime. Calling it from inside an async task
/// is an error rather than a nested runtime.
pub(crate) fn run_tool(
    command: Command,
    timeout: Option<Duration>,
) -> Result<ToolOutput, ApplicationError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ApplicationError::ExternalTool(format!(
            "{}: cannot block inside an async runtime",
            program_name(&command)
        )));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| ApplicationError::ExternalTool(format!("tool runtime: {error}")))?;
    runtime.block_on(run_tool_async(command, timeout))
}

async fn run_tool_async(
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<ToolOutput, ApplicationError> {
    let program = program_name(&command);
    debug!(
        tool = %program,
        args = ?command.as_std().get_args().collect::<Vec<_>>(),
        "running tool"
    );

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout {
        None => command.output().await,
        Some(limit) => match tokio::time::timeout(limit, command.output()).await {
            Ok(output) => output,
            Err(_) => {
                warn!(tool = %program, timeout = ?limit, "tool timed out, killed");
                return Err(ApplicationError::ExternalTool(format!(
                    "{program} timed out after {limit:?}"
                )));
            }
        },
    }
    .map_err(|error| ApplicationError::ExternalTool(format!("{program}: {error}")))?;

    if !output.status.success() {
        let detail = String::from_utf8_lossy(&output.stderr);
        return Err(ApplicationError::ExternalTool(format!(
            "{program} exited with {}: {}",
            output.status,
            detail.trim()
        )));
    }

    Ok(ToolOutput {
        stdout: output.stdout,
    })
}

fn program_name(command: &Command) -> String {
    command.as_std().get_program().to_string_lossy().to_string()
}
