//! One-shot child process plumbing shared by the OCR and NER adapters.

use crate::utils::error::{CardError, Result};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    /// Diagnostic text, kept only for error messages.
    pub stderr: String,
}

impl ProcessOutput {
    /// `-1` when the process was ended by a signal.
    pub fn exit_code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// Spawns `program`, feeds it `input` (then closes stdin), and collects its
/// output until it exits or `timeout` elapses.
///
/// stdout is buffered whole. stderr is forwarded line by line to the log
/// under `label`. On timeout the child is killed and reaped before
/// returning [`CardError::ExternalProcessTimeout`]. The child is also
/// killed if the returned future is dropped.
pub async fn run_once(
    program: &str,
    args: &[String],
    input: Option<&[u8]>,
    timeout: Duration,
    label: &str,
) -> Result<ProcessOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CardError::ExternalProcessSpawn {
        program: program.to_string(),
        source,
    })?;
    tracing::debug!(pid = ?child.id(), "[{}] spawned `{}`", label, program);

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let writer = async move {
        if let (Some(mut stdin), Some(bytes)) = (stdin, input) {
            if let Err(e) = stdin.write_all(bytes).await {
                // The child may exit without reading its input.
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    tracing::warn!("[{}] failed writing to stdin: {}", label, e);
                }
            }
            // Dropping the handle closes the pipe and signals end-of-input.
            let _ = stdin.shutdown().await;
        }
    };

    let reader = async move {
        let mut buf = Vec::new();
        if let Some(mut stdout) = stdout {
            stdout.read_to_end(&mut buf).await?;
        }
        Ok::<_, std::io::Error>(buf)
    };

    let diagnostics = async move {
        let mut collected = String::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Some(line) = lines.next_line().await? {
                tracing::debug!("[{}] {}", label, line);
                collected.push_str(&line);
                collected.push('\n');
            }
        }
        Ok::<_, std::io::Error>(collected)
    };

    let run = async {
        let ((), stdout, stderr) = tokio::join!(writer, reader, diagnostics);
        let status = child.wait().await?;
        Ok::<_, std::io::Error>(ProcessOutput {
            status,
            stdout: stdout?,
            stderr: stderr?,
        })
    };

    let outcome = tokio::time::timeout(timeout, run).await;
    match outcome {
        Ok(output) => {
            let output = output?;
            tracing::debug!(
                "[{}] exited with {} ({} bytes on stdout)",
                label,
                output.status,
                output.stdout.len()
            );
            Ok(output)
        }
        Err(_) => {
            tracing::warn!("[{}] `{}` timed out after {:?}, killing it", label, program, timeout);
            if let Err(e) = child.kill().await {
                tracing::warn!("[{}] failed to kill timed out process: {}", label, e);
            }
            Err(CardError::ExternalProcessTimeout { timeout })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_echoes_stdin() {
        let output = run_once("sh", &sh("cat"), Some(b"hello\nworld"), Duration::from_secs(5), "test")
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello\nworld");
    }

    #[tokio::test]
    async fn test_collects_stderr_separately() {
        let output = run_once(
            "sh",
            &sh("echo out; echo diag >&2; exit 4"),
            None,
            Duration::from_secs(5),
            "test",
        )
        .await
        .unwrap();
        assert_eq!(output.exit_code(), 4);
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, "diag\n");
    }

    #[tokio::test]
    async fn test_child_that_ignores_stdin() {
        let input = vec![b'x'; 256 * 1024];
        let output = run_once("sh", &sh("echo done"), Some(&input), Duration::from_secs(5), "test")
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"done\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let dir = tempfile::TempDir::new().unwrap();
        let pid_file = dir.path().join("child.pid");
        let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());

        let started = std::time::Instant::now();
        let err = run_once("sh", &sh(&script), None, Duration::from_millis(500), "test")
            .await
            .unwrap_err();
        assert!(matches!(err, CardError::ExternalProcessTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));

        // The child is killed and reaped before the error is returned.
        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let alive = std::process::Command::new("sh")
            .args(["-c", &format!("kill -0 {} 2>/dev/null", pid.trim())])
            .status()
            .unwrap()
            .success();
        assert!(!alive);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = run_once(
            "card-ocr-no-such-binary",
            &[],
            None,
            Duration::from_secs(1),
            "test",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CardError::ExternalProcessSpawn { .. }));
    }
}
