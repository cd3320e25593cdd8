use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// How a bounded child process ended.
#[derive(Debug)]
pub(crate) enum Finished {
    Exited { status: ExitStatus, stderr: String },
    TimedOut,
}

const POLL: Duration = Duration::from_millis(25);

/// Run `cmd` to completion or kill it once `timeout` elapses. Stdout is
/// discarded; callers have the tool write its results to files.
pub(crate) fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> std::io::Result<Finished> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    // Drain stderr off-thread so a chatty tool cannot block on a full pipe.
    let stderr = child.stderr.take();
    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut s) = stderr {
            let _ = s.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).to_string()
    });

    let deadline = Instant::now() + timeout;
    loop {
        let polled = child.try_wait();
        if let Some(status) = kill_on_err(&mut child, polled)? {
            let stderr = reader.join().unwrap_or_default();
            return Ok(Finished::Exited { status, stderr });
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Finished::TimedOut);
        }
        std::thread::sleep(POLL);
    }
}

/// Pass `res` through; on error the child is killed and reaped first.
fn kill_on_err<T>(child: &mut Child, res: std::io::Result<T>) -> std::io::Result<T> {
    if res.is_err() {
        let _ = child.kill();
        let _ = child.wait();
    }
    res
}
