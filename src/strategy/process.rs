//! Run an external converter under a timeout.
//!
//! Both external strategies share this: success is exit status zero and
//! nothing else. The produced file is never inspected here.

use crate::error::AttemptFailure;
use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Spawn `program args…`, wait up to `timeout`, and classify the result.
///
/// `tool` is the human-readable name used in failures. A command that cannot
/// be resolved maps to [`AttemptFailure::NotFound`]; on timeout the child is
/// killed and [`AttemptFailure::TimedOut`] is returned.
pub async fn run_tool<I, S>(
    tool: &str,
    program: impl AsRef<OsStr>,
    args: I,
    timeout: Duration,
) -> Result<(), AttemptFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program.as_ref());
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("Running {:?}", cmd.as_std());

    let child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AttemptFailure::NotFound {
            tool: tool.to_string(),
        },
        _ => AttemptFailure::Spawn {
            tool: tool.to_string(),
            detail: e.to_string(),
        },
    })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| AttemptFailure::Spawn {
            tool: tool.to_string(),
            detail: e.to_string(),
        })?,
        Err(_) => {
            return Err(AttemptFailure::TimedOut {
                tool: tool.to_string(),
                secs: timeout.as_secs(),
            })
        }
    };

    if output.status.success() {
        return Ok(());
    }

    Err(AttemptFailure::ToolFailed {
        tool: tool.to_string(),
        status: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn zero_exit_is_success() {
        run_tool("sh", "sh", ["-c", "exit 0"], SHORT).await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_carries_code_and_stderr() {
        let err = run_tool("sh", "sh", ["-c", "echo 'no engine' >&2; exit 3"], SHORT)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AttemptFailure::ToolFailed {
                tool: "sh".into(),
                status: Some(3),
                stderr: "no engine".into(),
            }
        );
    }

    #[tokio::test]
    async fn missing_command_is_not_found() {
        let err = run_tool(
            "pandoc",
            "doc2pdf-test-no-such-command",
            Vec::<&str>::new(),
            SHORT,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            AttemptFailure::NotFound {
                tool: "pandoc".into()
            }
        );
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let started = std::time::Instant::now();
        let err = run_tool("sleep", "sleep", ["5"], Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptFailure::TimedOut { .. }), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
