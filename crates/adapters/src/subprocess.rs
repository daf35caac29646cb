// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use crate::vm::{VmError, VmOutput};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Run a subprocess to completion, streaming its combined output.
///
/// stdout and stderr are read line by line as they are produced; each line
/// is passed to `on_line` and appended to the captured output, interleaved
/// in arrival order. When `timeout` elapses the child is killed and
/// [`VmError::Timeout`] carries whatever output was captured so far.
///
/// A non-zero exit is not an error: callers classify exit codes.
pub async fn run_streaming(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
    mut on_line: impl FnMut(&str) + Send,
) -> Result<VmOutput, VmError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| VmError::Spawn {
        description: description.to_string(),
        message: e.to_string(),
    })?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    drop(tx);

    let mut output = String::new();
    let collect = async {
        while let Some(line) = rx.recv().await {
            on_line(&line);
            output.push_str(&line);
            output.push('\n');
        }
        child.wait().await
    };
    let result = tokio::time::timeout(timeout, collect).await;

    match result {
        Ok(Ok(status)) => Ok(VmOutput {
            exit_code: status.code(),
            output,
        }),
        Ok(Err(e)) => Err(VmError::Io {
            description: description.to_string(),
            message: e.to_string(),
        }),
        Err(_elapsed) => {
            if let Err(e) = child.kill().await {
                tracing::warn!(description, error = %e, "failed to kill timed out process");
            }
            Err(VmError::Timeout {
                description: description.to_string(),
                after: timeout,
                output,
            })
        }
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, tx: mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
