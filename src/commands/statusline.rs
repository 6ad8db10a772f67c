use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Deserialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

use crate::analyzer;
use crate::config::Config;
use crate::inspect::{git_summary, review_summary, CommandRunner, ProcessRunner};
use crate::render;

pub const INVALID_INPUT: &str = "Error: Invalid JSON input";
const UNKNOWN_MODEL: &str = "Unknown";

/// The JSON blob Claude Code pipes to a statusline command. Unknown fields
/// are ignored and every recognized one is optional, `null` included.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HookInput {
    pub workspace: Option<WorkspaceInfo>,
    pub model: Option<ModelInfo>,
    pub context_window: Option<ContextWindow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkspaceInfo {
    pub current_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContextWindow {
    pub used_percentage: Option<f64>,
}

impl HookInput {
    /// Parse raw stdin bytes. Invalid UTF-8 is reported like any other
    /// malformed JSON.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn current_dir(&self) -> PathBuf {
        self.workspace
            .as_ref()
            .and_then(|w| w.current_dir.as_ref())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.display_name.as_deref())
            .unwrap_or(UNKNOWN_MODEL)
    }

    pub fn context_used(&self) -> f64 {
        self.context_window
            .as_ref()
            .and_then(|c| c.used_percentage)
            .unwrap_or(0.0)
    }
}

pub async fn show_statusline(config: &Config) -> Result<()> {
    let mut buffer = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buffer) {
        debug!("Failed to read stdin: {}", e);
        println!("{}", INVALID_INPUT);
        return Ok(());
    }

    let input = match HookInput::from_slice(&buffer) {
        Ok(input) => input,
        Err(e) => {
            debug!("Rejecting stdin: {}", e);
            println!("{}", INVALID_INPUT);
            return Ok(());
        }
    };

    let runner = ProcessRunner::new(config.command_timeout);
    let line = build_statusline(&input, config, &runner, &Local::now()).await;
    println!("{}", line);

    Ok(())
}

/// Assemble every fragment in display order. Nothing here fails; missing
/// pieces are simply left out.
pub async fn build_statusline<R: CommandRunner, Tz: TimeZone>(
    input: &HookInput,
    config: &Config,
    runner: &R,
    now: &DateTime<Tz>,
) -> String {
    let cwd = input.current_dir();
    let mut fragments = Vec::new();

    if let Some(git) = git_summary(runner, &cwd).await {
        fragments.push(git);
    }

    if let Some(pr) = review_summary(runner, &cwd).await {
        fragments.push(pr);
    }

    fragments.push(render::context_fragment(
        input.context_used(),
        config.bar_width,
    ));

    let summary = config
        .projects_dir()
        .and_then(|dir| analyzer::analyze_dir(&dir, now.with_timezone(&Utc), &config.windows));
    fragments.extend(render::usage_fragments(
        summary.as_ref(),
        now,
        &config.windows,
        config.bar_width,
    ));

    fragments.push(input.model_name().to_string());

    render::join_fragments(&fragments)
}
