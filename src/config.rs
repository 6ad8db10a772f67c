use chrono::Duration;
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use tracing::debug;

use crate::cli::Cli;

/// Time spans driving the usage-window analysis.
///
/// `current_window`, `session_gap` and `session_length` all default to five
/// hours but are kept apart so each can be tuned on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindows {
    /// Recency window for the live token count
    pub current_window: Duration,
    /// Idle gap that closes a historical session
    pub session_gap: Duration,
    /// How far back historical sessions are collected
    pub history_lookback: Duration,
    /// Fixed length of a billing session, used for the reset countdown
    pub session_length: Duration,
}

impl Default for UsageWindows {
    fn default() -> Self {
        Self {
            current_window: Duration::hours(5),
            session_gap: Duration::hours(5),
            history_lookback: Duration::days(8),
            session_length: Duration::hours(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Claude data root, if one was found
    pub claude_dir: Option<PathBuf>,
    pub bar_width: usize,
    pub command_timeout: StdDuration,
    pub windows: UsageWindows,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let claude_dir = find_claude_dir(cli.config_dir.as_deref());
        debug!("Using Claude data dir: {:?}", claude_dir);

        Self {
            claude_dir,
            bar_width: cli.bar_width,
            command_timeout: StdDuration::from_millis(cli.timeout_ms),
            windows: UsageWindows::default(),
        }
    }

    /// Root of the per-project JSONL transcripts.
    pub fn projects_dir(&self) -> Option<PathBuf> {
        self.claude_dir.as_ref().map(|dir| dir.join("projects"))
    }
}

/// Resolve the data root: explicit override first, then the conventional
/// locations. The first directory that exists wins.
pub fn find_claude_dir(override_paths: Option<&str>) -> Option<PathBuf> {
    if let Some(env_paths) = override_paths {
        let found = env_paths
            .split(',')
            .map(|p| PathBuf::from(p.trim()))
            .find(|p| !p.as_os_str().is_empty() && p.is_dir());
        if found.is_some() {
            return found;
        }
    }

    default_candidates().into_iter().find(|p| p.is_dir())
}

fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = directories::BaseDirs::new() {
        // New location: ~/.config/claude
        candidates.push(home.config_dir().join("claude"));
        // Old location: ~/.claude
        candidates.push(home.home_dir().join(".claude"));
    }
    candidates
}
