use anyhow::Result;
use chrono::Utc;

use crate::analyzer;
use crate::config::Config;

/// Dump the current usage-window summary, or `null` when there is none.
pub fn show_usage(config: &Config) -> Result<()> {
    let summary = config
        .projects_dir()
        .and_then(|dir| analyzer::analyze_dir(&dir, Utc::now(), &config.windows));

    let output = serde_json::json!({
        "data_dir": config.claude_dir.as_ref().map(|d| d.display().to_string()),
        "summary": summary,
        "windows": {
            "current_window_hours": config.windows.current_window.num_hours(),
            "session_gap_hours": config.windows.session_gap.num_hours(),
            "history_lookback_days": config.windows.history_lookback.num_days(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
