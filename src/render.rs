use chrono::{DateTime, TimeZone};
use crossterm::style::{Color, Stylize};

use crate::config::UsageWindows;
use crate::countdown;
use crate::models::UsageSummary;

pub const SEPARATOR: &str = " | ";
const FILLED: &str = "█";
const EMPTY: &str = "░";
const ORANGE: Color = Color::AnsiValue(208);

/// Color band of a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Normal,
    Warning,
    Critical,
}

impl Band {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Band::Critical
        } else if percentage >= 80.0 {
            Band::Warning
        } else {
            Band::Normal
        }
    }

    pub fn color(self) -> Color {
        match self {
            Band::Normal => Color::DarkGreen,
            Band::Warning => ORANGE,
            Band::Critical => Color::Red,
        }
    }
}

/// Number of filled cells; may fall outside `0..=width` for out-of-range input.
pub fn filled_cells(percentage: f64, width: usize) -> i64 {
    ((percentage / 100.0) * width as f64).floor() as i64
}

/// Fixed-width block bar colored by band. Out-of-range input is drawn as
/// an empty or full bar; the width never grows.
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = filled_cells(percentage, width).clamp(0, width as i64) as usize;

    let bar = format!(
        "{}{}",
        FILLED.repeat(filled),
        EMPTY.repeat(width - filled)
    );
    bar.with(Band::for_percentage(percentage).color()).to_string()
}

pub fn context_fragment(used_percentage: f64, width: usize) -> String {
    format!("ctx:{}", progress_bar(used_percentage, width))
}

pub fn token_fragment(summary: &UsageSummary, width: usize) -> String {
    format!(
        "tok:{} {}/{} ${:.2}/${:.2}",
        progress_bar(summary.token_percentage(), width),
        format_number(summary.total_tokens),
        format_number(summary.token_limit),
        summary.cost_usd,
        summary.cost_limit
    )
}

pub fn reset_fragment(countdown: &str) -> String {
    format!("reset:{}", countdown)
}

/// Usage bar followed by the reset countdown, or nothing without data.
pub fn usage_fragments<Tz: TimeZone>(
    summary: Option<&UsageSummary>,
    now: &DateTime<Tz>,
    windows: &UsageWindows,
    width: usize,
) -> Vec<String> {
    match summary {
        Some(summary) => vec![
            token_fragment(summary, width),
            reset_fragment(&countdown::reset_countdown(
                summary.session_start,
                now,
                windows,
            )),
        ],
        None => Vec::new(),
    }
}

/// `[A3] [M1] [D2]` with colored backgrounds; zero counts are left out.
pub fn status_badges(added: usize, modified: usize, deleted: usize) -> Vec<String> {
    let mut badges = Vec::new();
    if added > 0 {
        badges.push(format!("[A{}]", added).black().on_dark_green().to_string());
    }
    if modified > 0 {
        badges.push(format!("[M{}]", modified).black().on(ORANGE).to_string());
    }
    if deleted > 0 {
        badges.push(format!("[D{}]", deleted).black().on_dark_red().to_string());
    }
    badges
}

/// `+N -M` in bold green/red; zero counts are left out.
pub fn line_changes(added: u64, removed: u64) -> Vec<String> {
    let mut changes = Vec::new();
    if added > 0 {
        changes.push(format!("+{}", added).dark_green().bold().to_string());
    }
    if removed > 0 {
        changes.push(format!("-{}", removed).dark_red().bold().to_string());
    }
    changes
}

pub fn join_fragments(fragments: &[String]) -> String {
    fragments.join(SEPARATOR)
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, glyph: &str) -> usize {
        haystack.matches(glyph).count()
    }

    #[test]
    fn filled_plus_empty_is_width() {
        for width in [1usize, 5, 8, 13] {
            for p in [0.0, 12.5, 33.3, 50.0, 79.0, 99.9, 100.0] {
                let bar = progress_bar(p, width);
                let filled = count(&bar, FILLED);
                let empty = count(&bar, EMPTY);
                assert_eq!(filled as i64, filled_cells(p, width));
                assert_eq!(filled + empty, width, "p={} width={}", p, width);
            }
        }
    }

    #[test]
    fn filled_cells_floor() {
        assert_eq!(filled_cells(0.0, 8), 0);
        assert_eq!(filled_cells(12.4, 8), 0);
        assert_eq!(filled_cells(12.5, 8), 1);
        assert_eq!(filled_cells(80.0, 8), 6);
        assert_eq!(filled_cells(100.0, 8), 8);
    }

    #[test]
    fn band_boundaries_are_exact() {
        assert_eq!(Band::for_percentage(79.0), Band::Normal);
        assert_eq!(Band::for_percentage(79.999), Band::Normal);
        assert_eq!(Band::for_percentage(80.0), Band::Warning);
        assert_eq!(Band::for_percentage(89.0), Band::Warning);
        assert_eq!(Band::for_percentage(89.999), Band::Warning);
        assert_eq!(Band::for_percentage(90.0), Band::Critical);
        assert_eq!(Band::for_percentage(100.0), Band::Critical);
    }

    #[test]
    fn overfull_bar_is_capped_at_width() {
        let bar = progress_bar(150.0, 8);
        assert_eq!(count(&bar, FILLED), 8);
        assert_eq!(count(&bar, EMPTY), 0);
    }

    #[test]
    fn huge_or_negative_percentages_stay_in_bounds() {
        let huge = progress_bar(1e20, 8);
        assert_eq!(count(&huge, FILLED), 8);
        assert_eq!(count(&huge, EMPTY), 0);

        let negative = progress_bar(-50.0, 8);
        assert_eq!(count(&negative, FILLED), 0);
        assert_eq!(count(&negative, EMPTY), 8);

        let nan = progress_bar(f64::NAN, 8);
        assert_eq!(count(&nan, FILLED) + count(&nan, EMPTY), 8);
    }

    #[test]
    fn badges_skip_zero_counts() {
        let badges = status_badges(3, 0, 2);
        assert_eq!(badges.len(), 2);
        assert!(badges[0].contains("[A3]"));
        assert!(badges[1].contains("[D2]"));

        assert!(line_changes(0, 0).is_empty());
        let changes = line_changes(45, 12);
        assert!(changes[0].contains("+45"));
        assert!(changes[1].contains("-12"));
    }

    #[test]
    fn token_fragment_shows_totals_and_costs() {
        let summary = UsageSummary {
            total_tokens: 44_000,
            token_limit: 88_000,
            cost_usd: 1.234,
            cost_limit: 35.0,
            event_count: 3,
            session_start: None,
        };

        let fragment = token_fragment(&summary, 8);
        assert!(fragment.starts_with("tok:"));
        assert!(fragment.ends_with(" 44,000/88,000 $1.23/$35.00"));
        assert_eq!(count(&fragment, FILLED), 4);
    }

    #[test]
    fn no_summary_means_no_usage_fragments() {
        let now = chrono::Utc::now();
        assert!(usage_fragments(None, &now, &Default::default(), 8).is_empty());
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
