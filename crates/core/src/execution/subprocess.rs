//! Subprocess spawn, I/O capture and timeout handling.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use super::executor::{ExecutionError, ExecutionOutput};

/// Spawn `cmd`, optionally feed `stdin`, capture stdout/stderr in full, and
/// enforce `timeout`.
///
/// The caller sets the program, arguments and working directory. The
/// deadline covers both process exit and draining its output pipes, so a
/// background grandchild that keeps a pipe open cannot stretch it. When the
/// deadline passes the child's whole process group is killed and
/// [`ExecutionError::Timeout`] is returned.
pub async fn run_command(
    cmd: &mut Command,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
) -> Result<ExecutionOutput, ExecutionError> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);
    // Own process group, so descendants can be killed together.
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(ExecutionError::Spawn)?;
    let pid = child.id();
    tracing::debug!(pid, "Spawned command");

    // Drain both pipes in their own tasks so a chatty child can never block
    // on a full pipe while we are still writing its stdin.
    let mut stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let mut stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    if let (Some(mut pipe), Some(data)) = (child.stdin.take(), stdin) {
        tokio::spawn(async move {
            // The child may exit without reading stdin; a broken pipe is fine.
            let _ = pipe.write_all(&data).await;
            let _ = pipe.shutdown().await;
        });
    }

    let collect = async {
        let status = child.wait().await.map_err(ExecutionError::Io)?;
        let (stdout, stderr) = tokio::join!(&mut stdout_task, &mut stderr_task);
        Ok::<_, ExecutionError>((status, stdout.unwrap_or_default(), stderr.unwrap_or_default()))
    };
    let outcome = tokio::time::timeout(timeout, collect).await;

    match outcome {
        Ok(Ok((status, stdout_bytes, stderr_bytes))) => {
            let exit_code = status.code().unwrap_or(-1);
            tracing::debug!(
                exit_code,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Command exited",
            );
            Ok(ExecutionOutput {
                exit_code,
                stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            })
        }
        Ok(Err(e)) => Err(e),
        Err(_elapsed) => {
            kill_process_group(pid);
            let _ = child.start_kill();
            stdout_task.abort();
            stderr_task.abort();
            tracing::warn!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Command exceeded timeout and was killed",
            );
            Err(ExecutionError::Timeout { timeout })
        }
    }
}

/// SIGKILL every process in the group led by `pid`.
///
/// The group outlives its leader while any member is alive, so this also
/// reaches descendants of a child that has already exited.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid addresses the group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(pgid, error = %std::io::Error::last_os_error(), "Process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Read an entire output stream into memory.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = h.read_to_end(&mut buf).await;
    }
    buf
}
