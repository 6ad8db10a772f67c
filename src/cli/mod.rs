use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cc-statusline")]
#[command(about = "Render a one-line Claude Code statusline from hook JSON on stdin")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Claude data directory (comma-separated list allowed, first existing wins)
    #[arg(long, global = true, env = "CLAUDE_CONFIG_DIR")]
    pub config_dir: Option<String>,

    /// Width of each progress bar in cells
    #[arg(long, global = true, default_value_t = 8)]
    pub bar_width: usize,

    /// Timeout for each git/gh invocation, in milliseconds
    #[arg(long, global = true, default_value_t = 2000)]
    pub timeout_ms: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the statusline from JSON on stdin (default)
    Statusline,

    /// Print sample statuslines and a color legend
    Demo,

    /// Print the current usage-window summary as JSON
    Usage,
}
