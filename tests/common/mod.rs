//! Shared integration-test harness for running the `flipclock` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

/// Default timeout for a single line of output.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A running `flipclock run` process.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
#[allow(clippy::missing_panics_doc)]
pub struct FlipclockProcess {
    child: Child,
    reader: BufReader<ChildStdout>,
}

impl FlipclockProcess {
    /// Runs a command to completion and returns its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_flipclock"))
            .args(args)
            .env_remove("FLIPCLOCK_CONFIG")
            .env_remove("FLIPCLOCK_TARGET")
            .env_remove("FLIPCLOCK_REDUCED_MOTION")
            .env_remove("FLIPCLOCK_LOG_LEVEL")
            .output()
            .expect("failed to run flipclock")
    }

    /// Starts `flipclock run --plain` with extra arguments.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_run(args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_flipclock"))
            .args(["--quiet", "run", "--plain"])
            .args(args)
            .env_remove("FLIPCLOCK_CONFIG")
            .env_remove("FLIPCLOCK_TARGET")
            .env_remove("FLIPCLOCK_REDUCED_MOTION")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn flipclock");

        let stdout = child.stdout.take().expect("stdout not captured");
        Self {
            child,
            reader: BufReader::new(stdout),
        }
    }

    /// Reads one line of stdout, or `None` at EOF.
    ///
    /// Panics if nothing arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_line(&mut self, timeout: Duration) -> Option<String> {
        let mut line = String::new();
        let read = tokio::time::timeout(timeout, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for output")
            .expect("read_line I/O error");
        (read > 0).then(|| line.trim_end().to_string())
    }

    /// Sends `signal` (e.g. `"TERM"`) to the process.
    #[allow(clippy::missing_panics_doc)]
    pub fn signal(&self, signal: &str) {
        let pid = self.child.id().expect("process already exited");
        let status = std::process::Command::new("kill")
            .arg(format!("-{signal}"))
            .arg(pid.to_string())
            .status()
            .expect("failed to run kill");
        assert!(status.success(), "kill -{signal} {pid} failed");
    }

    /// Waits for the process to exit and returns its exit code.
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait(mut self, timeout: Duration) -> Option<i32> {
        tokio::time::timeout(timeout, self.child.wait())
            .await
            .expect("timed out waiting for exit")
            .expect("wait failed")
            .code()
    }
}

/// Returns the path to a test fixture.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Returns the path to a fixture as a `&str`-friendly `String`.
#[must_use]
pub fn fixture(name: &str) -> String {
    fixture_path(name).display().to_string()
}
