//! Rolling usage-window accounting.
//!
//! Two independent passes run over the same event stream:
//!
//! - the *current window* keeps every event newer than `now - current_window`
//!   and yields the live token/cost totals plus the session start;
//! - the *historical sessions* pass groups events newer than
//!   `now - history_lookback` into gap-delimited sessions whose 90th
//!   percentile becomes the adaptive limit.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::path::Path;
use tracing::debug;

use crate::config::UsageWindows;
use crate::data_loader::DataLoader;
use crate::models::{AdaptiveLimit, Session, UsageEvent, UsageSummary};

/// Minimum number of historical sessions before the percentile is trusted.
pub const MIN_SESSIONS_FOR_PERCENTILE: usize = 5;
pub const PERCENTILE: f64 = 0.9;
pub const TOKEN_LIMIT_FLOOR: u64 = 19_000;
pub const COST_LIMIT_FLOOR: f64 = 18.0;
pub const COST_HEADROOM: f64 = 1.2;

/// Load every transcript under `projects_dir` and summarize it at `now`.
/// Any failure, or an empty current window, comes back as `None`.
pub fn analyze_dir(
    projects_dir: &Path,
    now: DateTime<Utc>,
    windows: &UsageWindows,
) -> Option<UsageSummary> {
    let events = match DataLoader::new(projects_dir).load_events() {
        Ok(events) => events,
        Err(e) => {
            debug!("No usage data: {:#}", e);
            return None;
        }
    };

    let summary = summarize(&events, now, windows);
    if summary.is_none() {
        debug!("No usage events in the current window");
    }
    summary
}

/// Summarize events given in scan order.
pub fn summarize(
    events: &[UsageEvent],
    now: DateTime<Utc>,
    windows: &UsageWindows,
) -> Option<UsageSummary> {
    let current_cutoff = now - windows.current_window;
    let history_cutoff = now - windows.history_lookback;

    let current: Vec<&UsageEvent> = events
        .iter()
        .filter(|e| e.timestamp.with_timezone(&Utc) >= current_cutoff)
        .collect();

    let sessions = group_sessions(
        events
            .iter()
            .filter(|e| e.timestamp.with_timezone(&Utc) >= history_cutoff),
        windows.session_gap,
    );

    let first = current.first()?;

    let total_tokens: u64 = current.iter().map(|e| e.total_tokens()).sum();
    let cost_usd: f64 = current.iter().map(|e| e.cost).sum();
    let limit = adaptive_limit(&sessions, total_tokens);

    debug!(
        "Current window: {} events, {} tokens; {} historical sessions",
        current.len(),
        total_tokens,
        sessions.len()
    );

    Some(UsageSummary {
        total_tokens,
        token_limit: limit.token_limit,
        cost_usd,
        cost_limit: limit.cost_limit,
        event_count: current.len(),
        session_start: Some(first.timestamp),
    })
}

/// Split events into sessions wherever the gap to the previous event is
/// strictly larger than `gap`. Sessions with no tokens are dropped.
pub fn group_sessions<'a>(
    events: impl IntoIterator<Item = &'a UsageEvent>,
    gap: Duration,
) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut open: Option<Session> = None;
    let mut last_seen: Option<DateTime<FixedOffset>> = None;

    for event in events {
        let starts_new = match last_seen {
            Some(last) => event.timestamp - last > gap,
            None => true,
        };

        if starts_new {
            if let Some(done) = open.take() {
                push_nonempty(&mut sessions, done);
            }
            open = Some(Session::seeded(event));
        } else if let Some(session) = open.as_mut() {
            session.add(event);
        }
        last_seen = Some(event.timestamp);
    }

    if let Some(done) = open {
        push_nonempty(&mut sessions, done);
    }

    sessions
}

fn push_nonempty(sessions: &mut Vec<Session>, session: Session) {
    if session.token_total > 0 {
        sessions.push(session);
    }
}

/// P90 of the historical sessions, or a static tier keyed by the current
/// window's tokens when there are too few sessions to go on.
pub fn adaptive_limit(sessions: &[Session], current_tokens: u64) -> AdaptiveLimit {
    if sessions.len() < MIN_SESSIONS_FOR_PERCENTILE {
        return fallback_limit(current_tokens);
    }

    let mut tokens: Vec<u64> = sessions.iter().map(|s| s.token_total).collect();
    let mut costs: Vec<f64> = sessions.iter().map(|s| s.cost_total).collect();
    tokens.sort_unstable();
    costs.sort_by(|a, b| a.total_cmp(b));

    let idx = percentile_index(sessions.len());

    AdaptiveLimit {
        token_limit: tokens[idx].max(TOKEN_LIMIT_FLOOR),
        cost_limit: (costs[idx] * COST_HEADROOM).max(COST_LIMIT_FLOOR),
    }
}

fn percentile_index(len: usize) -> usize {
    ((len as f64 * PERCENTILE).floor() as usize).min(len - 1)
}

fn fallback_limit(current_tokens: u64) -> AdaptiveLimit {
    let (token_limit, cost_limit) = match current_tokens {
        t if t > 100_000 => (220_000, 140.0),
        t if t > 50_000 => (88_000, 35.0),
        _ => (TOKEN_LIMIT_FLOOR, COST_LIMIT_FLOOR),
    };
    AdaptiveLimit {
        token_limit,
        cost_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RateTable, TokenUsage};
    use chrono::TimeZone;
    use std::fs;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn event_at(ts: DateTime<Utc>, input_tokens: u64) -> UsageEvent {
        let tokens = TokenUsage {
            input_tokens,
            ..Default::default()
        };
        UsageEvent {
            timestamp: ts.fixed_offset(),
            tokens,
            cost: RateTable::default().cost(&tokens),
        }
    }

    fn session(tokens: u64, cost: f64) -> Session {
        Session {
            token_total: tokens,
            cost_total: cost,
        }
    }

    #[test]
    fn events_just_under_the_gap_share_a_session() {
        let t = now() - Duration::days(1);
        let events = [event_at(t, 10), event_at(t + Duration::minutes(4 * 60 + 59), 20)];

        let sessions = group_sessions(&events, Duration::hours(5));
        assert_eq!(sessions, vec![session(30, events[0].cost + events[1].cost)]);
    }

    #[test]
    fn events_just_over_the_gap_split() {
        let t = now() - Duration::days(1);
        let events = [event_at(t, 10), event_at(t + Duration::minutes(5 * 60 + 1), 20)];

        let sessions = group_sessions(&events, Duration::hours(5));
        let totals: Vec<u64> = sessions.iter().map(|s| s.token_total).collect();
        assert_eq!(totals, vec![10, 20]);
    }

    #[test]
    fn gap_is_measured_from_the_previous_event() {
        let t = now() - Duration::days(1);
        let events = [
            event_at(t, 1),
            event_at(t + Duration::hours(4), 1),
            event_at(t + Duration::hours(8), 1),
        ];

        let sessions = group_sessions(&events, Duration::hours(5));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].token_total, 3);
    }

    #[test]
    fn exactly_the_gap_does_not_split() {
        let t = now() - Duration::days(1);
        let events = [event_at(t, 1), event_at(t + Duration::hours(5), 1)];

        assert_eq!(group_sessions(&events, Duration::hours(5)).len(), 1);
    }

    #[test]
    fn p90_floor_dominates_small_sessions() {
        let sessions: Vec<Session> = (1..=10).map(|i| session(i * 10, i as f64)).collect();

        let limit = adaptive_limit(&sessions, 0);
        assert_eq!(limit.token_limit, 19_000);
        assert_eq!(limit.cost_limit, 18.0);
    }

    #[test]
    fn p90_picks_rank_and_adds_cost_headroom() {
        let sessions: Vec<Session> = (1..=10)
            .rev()
            .map(|i| session(i * 10_000, i as f64 * 10.0))
            .collect();

        // idx = floor(10 * 0.9) = 9, the largest value
        let limit = adaptive_limit(&sessions, 0);
        assert_eq!(limit.token_limit, 100_000);
        assert!((limit.cost_limit - 120.0).abs() < 1e-9);
    }

    #[test]
    fn p90_index_is_clamped_for_five_sessions() {
        assert_eq!(percentile_index(5), 4);
        assert_eq!(percentile_index(10), 9);
        assert_eq!(percentile_index(20), 18);
    }

    #[test]
    fn too_few_sessions_fall_back_to_tiers() {
        let sessions = vec![session(1_000_000, 500.0); 4];

        let high = adaptive_limit(&sessions, 120_000);
        assert_eq!(high.token_limit, 220_000);
        assert_eq!(high.cost_limit, 140.0);

        let mid = adaptive_limit(&sessions, 60_000);
        assert_eq!((mid.token_limit, mid.cost_limit), (88_000, 35.0));

        let low = adaptive_limit(&[], 50_000);
        assert_eq!((low.token_limit, low.cost_limit), (19_000, 18.0));
    }

    #[test]
    fn empty_current_window_is_none() {
        let old = [event_at(now() - Duration::hours(6), 500)];
        assert!(summarize(&old, now(), &UsageWindows::default()).is_none());
        assert!(summarize(&[], now(), &UsageWindows::default()).is_none());
    }

    #[test]
    fn current_window_totals_and_start() {
        let events = [
            event_at(now() - Duration::days(2), 1_000),
            event_at(now() - Duration::hours(3), 100),
            event_at(now() - Duration::hours(1), 50),
        ];

        let summary = summarize(&events, now(), &UsageWindows::default()).unwrap();
        assert_eq!(summary.total_tokens, 150);
        assert_eq!(summary.event_count, 2);
        assert_eq!(
            summary.session_start,
            Some((now() - Duration::hours(3)).fixed_offset())
        );
        // Only two historical sessions, so the lowest tier applies
        assert_eq!(summary.token_limit, 19_000);
        assert!((summary.cost_usd - 150.0 * 3.0 / 1_000_000.0).abs() < 1e-12);
    }

    #[test]
    fn history_ignores_events_older_than_lookback() {
        let mut events: Vec<UsageEvent> = (0..6)
            .map(|i| event_at(now() - Duration::days(20) + Duration::days(i), 900_000))
            .collect();
        events.push(event_at(now() - Duration::minutes(10), 120_000));

        // The six big sessions are outside the eight-day lookback
        let summary = summarize(&events, now(), &UsageWindows::default()).unwrap();
        assert_eq!(summary.token_limit, 220_000);
        assert_eq!(summary.cost_limit, 140.0);
    }

    #[test]
    fn analyze_dir_missing_root_is_none() {
        assert!(analyze_dir(Path::new("/no/such/dir"), now(), &UsageWindows::default()).is_none());
    }

    #[test]
    fn analyze_dir_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("proj");
        fs::create_dir_all(&project).unwrap();

        let mut lines = Vec::new();
        for day in (1..=7).rev() {
            let ts = now() - Duration::days(day);
            lines.push(format!(
                r#"{{"timestamp":"{}","message":{{"usage":{{"input_tokens":{},"output_tokens":1000}}}}}}"#,
                ts.to_rfc3339(),
                day * 10_000
            ));
        }
        let recent = (now() - Duration::minutes(30)).format("%Y-%m-%dT%H:%M:%SZ");
        lines.push(format!(
            r#"{{"timestamp":"{}","usage":{{"input_tokens":4000}}}}"#,
            recent
        ));
        lines.push("garbage".to_string());
        fs::write(project.join("s.jsonl"), lines.join("\n")).unwrap();

        let windows = UsageWindows::default();
        let first = analyze_dir(dir.path(), now(), &windows).unwrap();
        let second = analyze_dir(dir.path(), now(), &windows).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.total_tokens, 4_000);
        assert_eq!(first.event_count, 1);
        // Eight sessions; idx 7 is the largest (71,000)
        assert_eq!(first.token_limit, 71_000);
    }
}
