//! Running child processes with captured output.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Output of a captured child process.
#[derive(Debug)]
pub struct CapturedOutput {
    /// `None` if the child was killed because it ran past its timeout.
    pub status: Option<ExitStatus>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl CapturedOutput {
    pub fn timed_out(&self) -> bool {
        self.status.is_none()
    }

    pub fn stdout_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Spawns `cmd` with piped stdout and stderr and waits for it.
///
/// Both streams are drained on helper threads so a chatty child cannot block
/// on a full pipe while we wait. If `timeout` elapses first the child is
/// killed, the returned status is `None` and the streams are left empty:
/// grandchildren of the killed process may still hold the pipes open.
pub fn run_captured(cmd: &mut Command, timeout: Option<Duration>) -> io::Result<CapturedOutput> {
    let start = Instant::now();
    let mut child = cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        None => Some(child.wait()?),
        Some(limit) => wait_with_deadline(&mut child, start + limit)?,
    };
    let elapsed = start.elapsed();

    if status.is_none() {
        return Ok(CapturedOutput { status, stdout: Vec::new(), stderr: Vec::new(), elapsed });
    }
    Ok(CapturedOutput { status, stdout: join(stdout), stderr: join(stderr), elapsed })
}

fn wait_with_deadline(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            log::debug!("killing child {} after deadline", child.id());
            // The child may exit between `try_wait` and `kill`.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    stream.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
