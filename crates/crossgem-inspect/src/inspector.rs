//! Running the external binary-inspection tool.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::VerifyError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Produces the textual dump of an artifact.
pub trait Inspector {
    /// Run `tool` against `artifact` and return its standard output.
    fn dump(&self, tool: &str, artifact: &Path) -> Result<String, VerifyError>;
}

/// Runs `<tool> -p <artifact>` under the C locale.
#[derive(Debug, Clone)]
pub struct ObjdumpInspector {
    timeout: Duration,
}

impl ObjdumpInspector {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ObjdumpInspector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl Inspector for ObjdumpInspector {
    fn dump(&self, tool: &str, artifact: &Path) -> Result<String, VerifyError> {
        let mut cmd = Command::new(tool);
        cmd.arg("-p")
            .arg(artifact)
            .env("LANG", "C")
            .env("LC_ALL", "C");
        tracing::debug!(tool, artifact = %artifact.display(), "running inspection tool");

        let output = run_captured(cmd, tool, self.timeout)?;
        if !output.status.success() {
            return Err(VerifyError::ToolInvocation {
                tool: tool.to_string(),
                message: format!("exited with {}: {}", output.status, output.stderr.trim()),
            });
        }
        if output.stdout.trim().is_empty() {
            return Err(VerifyError::ToolInvocation {
                tool: tool.to_string(),
                message: format!("produced no output for {}", artifact.display()),
            });
        }
        Ok(output.stdout)
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `cmd`, drain its pipes on helper threads, and wait at most `timeout`.
/// On expiry the child is killed.
pub fn run_captured(
    mut cmd: Command,
    tool: &str,
    timeout: Duration,
) -> Result<CapturedOutput, VerifyError> {
    let invocation_error = |message: String| VerifyError::ToolInvocation {
        tool: tool.to_string(),
        message,
    };

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| invocation_error(format!("failed to start: {e}")))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_with_deadline(&mut child, timeout)
        .map_err(|e| invocation_error(format!("failed to wait: {e}")))?
        .ok_or_else(|| invocation_error(format!("timed out after {} ms", timeout.as_millis())))?;

    Ok(CapturedOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn collect(handle: JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `Ok(None)` means the deadline passed and the child was killed.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
