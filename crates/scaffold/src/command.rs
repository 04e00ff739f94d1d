//! External command execution with line-by-line output streaming
//!
//! Long-running tools (pip especially) produce output the user wants to
//! see as it happens, so child stdout/stderr are forwarded line by line
//! as `StepEvent::Output` while also being captured for post-hoc parsing.

use pyforge_errors::StepError;
use pyforge_events::{EventEmitter, EventSender};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Result of a streamed command execution
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// Full stdout followed by full stderr, newline separated.
    pub captured: String,
}

/// Spawn `command`, stream its output as step events, and wait for exit.
///
/// # Errors
///
/// Returns `CommandSpawnFailed` when the program cannot be started and
/// `CommandFailed` when reading its output or waiting on it fails. A
/// non-zero exit status is NOT an error here; callers decide what a
/// failing status means for their step.
pub async fn run_streamed(
    mut command: Command,
    program: &str,
    events: &EventSender,
) -> Result<CommandOutput, StepError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| StepError::CommandSpawnFailed {
        program: program.to_string(),
        message: e.to_string(),
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let io_err = |e: std::io::Error| StepError::CommandFailed {
        program: program.to_string(),
        exit_code: None,
        message: e.to_string(),
    };

    let (out, err) =
        tokio::try_join!(drain(stdout, events), drain(stderr, events)).map_err(io_err)?;
    let status = child.wait().await.map_err(io_err)?;

    let mut captured = out;
    captured.push_str(&err);
    Ok(CommandOutput { status, captured })
}

async fn drain<R>(reader: Option<R>, events: &EventSender) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(String::new());
    };
    let mut lines = BufReader::new(reader).lines();
    let mut captured = String::new();
    while let Some(line) = lines.next_line().await? {
        events.emit_step_output(line.clone());
        captured.push_str(&line);
        captured.push('\n');
    }
    Ok(captured)
}
