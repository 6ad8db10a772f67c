//! Best-effort probes of external tools (git, gh).
//!
//! Every call goes through [`CommandRunner`] so the probes can be driven by a
//! scripted fake in tests. Failures of any kind surface as `None`.

pub mod git;
pub mod review;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub use git::git_summary;
pub use review::review_summary;

#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Trimmed stdout of a successful run. Spawn errors, non-zero exits
    /// and timeouts all give `None`.
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Option<String>;
}

/// Runs real processes, killing any that outlive `timeout`.
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Option<String> {
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                debug!("`{} {}` timed out after {:?}", program, args.join(" "), self.timeout);
                None
            }
            Ok(Err(e)) => {
                debug!("`{} {}` failed to start: {}", program, args.join(" "), e);
                None
            }
            Ok(Ok(output)) if !output.status.success() => {
                debug!("`{} {}` exited with {}", program, args.join(" "), output.status);
                None
            }
            Ok(Ok(output)) => Some(String::from_utf8_lossy(&output.stdout).trim().to_string()),
        }
    }
}

#[cfg(test)]
pub mod fake {
    use super::CommandRunner;
    use std::collections::HashMap;
    use std::path::Path;

    /// Answers commands from a script keyed by `"program arg arg"`.
    /// Anything unscripted behaves like a failed command.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: HashMap<String, String>,
    }

    impl FakeRunner {
        pub fn with(mut self, command: &str, stdout: &str) -> Self {
            self.responses.insert(command.to_string(), stdout.to_string());
            self
        }
    }

    impl CommandRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Option<String> {
            let key = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.responses.get(&key).map(|out| out.trim().to_string())
        }
    }
}
