use std::path::Path;

use super::CommandRunner;
use crate::render;

/// Per-file change counts from `git status --porcelain`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl StatusCounts {
    /// A file counts once per letter present in its two-character code.
    pub fn from_porcelain(output: &str) -> Self {
        let mut counts = Self::default();
        for line in output.lines().filter(|l| !l.is_empty()) {
            let code: String = line.chars().take(2).collect();
            if code.contains('M') {
                counts.modified += 1;
            }
            if code.contains('A') {
                counts.added += 1;
            }
            if code.contains('D') {
                counts.deleted += 1;
            }
        }
        counts
    }
}

/// Summed (added, removed) lines from `git diff --numstat`. Binary files
/// (`-`) count as zero; lines that don't parse are skipped.
pub fn parse_numstat(output: &str) -> (u64, u64) {
    let mut added = 0;
    let mut removed = 0;

    for line in output.lines().filter(|l| !l.is_empty()) {
        let mut cols = line.split('\t');
        let (Some(a), Some(r)) = (cols.next(), cols.next()) else {
            continue;
        };
        let (Some(a), Some(r)) = (numstat_value(a), numstat_value(r)) else {
            continue;
        };
        added += a;
        removed += r;
    }

    (added, removed)
}

fn numstat_value(col: &str) -> Option<u64> {
    if col == "-" {
        Some(0)
    } else {
        col.parse().ok()
    }
}

/// `remote/branch [badges] [+N -M]`, or `None` outside a repository.
pub async fn git_summary<R: CommandRunner>(runner: &R, cwd: &Path) -> Option<String> {
    let git_dir = runner.run("git", &["rev-parse", "--git-dir"], cwd).await?;
    if git_dir.is_empty() {
        return None;
    }

    let remote = runner
        .run("git", &["remote"], cwd)
        .await
        .and_then(|out| out.lines().next().map(str::to_string))
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "local".to_string());

    let branch = match runner
        .run("git", &["branch", "--show-current"], cwd)
        .await
        .filter(|b| !b.is_empty())
    {
        Some(branch) => branch,
        None => runner
            .run("git", &["rev-parse", "--short", "HEAD"], cwd)
            .await
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "detached".to_string()),
    };

    let status = runner
        .run("git", &["status", "--porcelain"], cwd)
        .await
        .unwrap_or_default();
    let counts = StatusCounts::from_porcelain(&status);

    // No HEAD yet in a fresh repository; fall back to the index
    let diff = match runner.run("git", &["diff", "--numstat", "HEAD"], cwd).await {
        Some(diff) => diff,
        None => runner
            .run("git", &["diff", "--numstat", "--cached"], cwd)
            .await
            .unwrap_or_default(),
    };
    let (lines_added, lines_removed) = parse_numstat(&diff);

    let mut parts = vec![format!("{}/{}", remote, branch)];
    parts.extend(render::status_badges(
        counts.added,
        counts.modified,
        counts.deleted,
    ));
    parts.extend(render::line_changes(lines_added, lines_removed));

    Some(parts.join(" "))
}
