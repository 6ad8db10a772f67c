use anyhow::Result;
use crossterm::style::{Color, Stylize};

use crate::models::UsageSummary;
use crate::render;

struct Scenario {
    title: &'static str,
    git: Option<(&'static str, [usize; 3], [u64; 2])>,
    pr: Option<&'static str>,
    ctx: f64,
    tokens: u64,
    token_limit: u64,
    cost: f64,
    cost_limit: f64,
    reset: &'static str,
    model: &'static str,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        title: "Normal Usage (Green)",
        git: Some(("origin/main", [1, 2, 0], [45, 12])),
        pr: None,
        ctx: 30.0,
        tokens: 12_400,
        token_limit: 88_000,
        cost: 4.12,
        cost_limit: 35.0,
        reset: "3h12m",
        model: "Sonnet 4.5",
    },
    Scenario {
        title: "With Pull Request",
        git: Some(("origin/feature-auth", [0, 3, 0], [0, 0])),
        pr: Some("PR#123: Add user authentication"),
        ctx: 62.0,
        tokens: 48_000,
        token_limit: 88_000,
        cost: 17.80,
        cost_limit: 35.0,
        reset: "1h47m",
        model: "Opus 4.5",
    },
    Scenario {
        title: "High Usage - Warning (Orange)",
        git: Some(("origin/main", [5, 0, 0], [87, 0])),
        pr: None,
        ctx: 82.0,
        tokens: 75_000,
        token_limit: 88_000,
        cost: 29.50,
        cost_limit: 35.0,
        reset: "0h58m",
        model: "Sonnet 4.5",
    },
    Scenario {
        title: "Critical Usage (Red)",
        git: Some(("origin/hotfix", [0, 2, 1], [23, 45])),
        pr: None,
        ctx: 95.0,
        tokens: 210_000,
        token_limit: 220_000,
        cost: 131.00,
        cost_limit: 140.0,
        reset: "0h09m",
        model: "Opus 4.5",
    },
    Scenario {
        title: "Not in a Git Repository",
        git: None,
        pr: None,
        ctx: 45.0,
        tokens: 6_000,
        token_limit: 19_000,
        cost: 2.05,
        cost_limit: 18.0,
        reset: "4h30m",
        model: "Sonnet 4.5",
    },
];

/// Render sample statuslines with the real fragment builders.
pub fn show_demo(bar_width: usize) -> Result<()> {
    println!("\n{}", "Claude Code Statusline Demo".bold());
    println!("{}", "=".repeat(70));
    println!();

    for scenario in SCENARIOS {
        println!("{}", scenario.title.bold());
        println!("  {}", scenario_line(scenario, bar_width));
        println!();
    }

    println!("{}", "=".repeat(70));
    println!();
    print_legend();

    Ok(())
}

fn scenario_line(scenario: &Scenario, bar_width: usize) -> String {
    let mut fragments = Vec::new();

    if let Some((head, [added, modified, deleted], [plus, minus])) = scenario.git {
        let mut parts = vec![head.to_string()];
        parts.extend(render::status_badges(added, modified, deleted));
        parts.extend(render::line_changes(plus, minus));
        fragments.push(parts.join(" "));
    }
    if let Some(pr) = scenario.pr {
        fragments.push(pr.to_string());
    }

    fragments.push(render::context_fragment(scenario.ctx, bar_width));

    let summary = UsageSummary {
        total_tokens: scenario.tokens,
        token_limit: scenario.token_limit,
        cost_usd: scenario.cost,
        cost_limit: scenario.cost_limit,
        event_count: 0,
        session_start: None,
    };
    fragments.push(render::token_fragment(&summary, bar_width));
    fragments.push(render::reset_fragment(scenario.reset));
    fragments.push(scenario.model.to_string());

    render::join_fragments(&fragments)
}

fn print_legend() {
    println!("{}", "Progress Bar Colors:".bold());
    println!("  {} Green  (0-79%)  - Normal usage", render::progress_bar(75.0, 8));
    println!("  {} Orange (80-89%) - Approaching limit", render::progress_bar(80.0, 8));
    println!("  {} Red    (90-100%) - Critical usage", render::progress_bar(90.0, 8));
    println!();
    println!("{}", "File Status Badges:".bold());
    println!("  {} Added files (green background)", "[A#]".black().on_dark_green());
    println!("  {} Modified files (orange background)", "[M#]".black().on(Color::AnsiValue(208)));
    println!("  {} Deleted files (red background)", "[D#]".black().on_dark_red());
    println!();
    println!("{}", "Line Changes:".bold());
    println!("  {} Lines added (bold green)", "+NN".dark_green().bold());
    println!("  {} Lines removed (bold red)", "-NN".dark_red().bold());
    println!();
    println!("{}", "Components:".bold());
    println!("  • Git: remote/branch [A#] [M#] [D#] +lines -lines");
    println!("  • PR: PR#number: title");
    println!("  • Context: ctx:[progress bar]");
    println!("  • Usage: tok:[progress bar] tokens/limit $cost/$limit");
    println!("  • Reset: reset:<h>h<mm>m");
    println!("  • Model: display name");
    println!();
}
