use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::CommandRunner;

const MAX_TITLE_CHARS: usize = 40;

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    #[serde(default)]
    title: String,
}

/// `PR#<number>: <title>` for the open pull request on the current branch.
pub async fn review_summary<R: CommandRunner>(runner: &R, cwd: &Path) -> Option<String> {
    let out = runner
        .run("gh", &["pr", "view", "--json", "number,title"], cwd)
        .await?;

    let pr: PullRequest = match serde_json::from_str(&out) {
        Ok(pr) => pr,
        Err(e) => {
            debug!("Unexpected gh output: {}", e);
            return None;
        }
    };

    Some(format!("PR#{}: {}", pr.number, truncate_title(&pr.title)))
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}
