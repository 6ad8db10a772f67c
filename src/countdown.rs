use chrono::{DateTime, Duration, FixedOffset, TimeZone};

use crate::config::UsageWindows;

/// Local hour at which the next reset is assumed when no live session is known.
pub const FALLBACK_RESET_HOUR: u32 = 14;
pub const UNAVAILABLE: &str = "N/A";

/// Time left until the usage window resets, as `<h>h<mm>m`.
///
/// With a live session the reset is `start + session_length`; otherwise the
/// next 14:00 in `now`'s time zone is used.
pub fn reset_countdown<Tz: TimeZone>(
    session_start: Option<DateTime<FixedOffset>>,
    now: &DateTime<Tz>,
    windows: &UsageWindows,
) -> String {
    if let Some(start) = session_start {
        let end = start + windows.session_length;
        let remaining = end.signed_duration_since(now);
        if remaining > Duration::zero() {
            return format_remaining(remaining);
        }
    }

    match next_fallback_reset(now) {
        Some(reset) => format_remaining(reset.signed_duration_since(now)),
        None => UNAVAILABLE.to_string(),
    }
}

fn next_fallback_reset<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now
        .date_naive()
        .and_hms_opt(FALLBACK_RESET_HOUR, 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())?;

    if today > *now {
        return Some(today);
    }

    let tomorrow = now.date_naive().succ_opt()?;
    tomorrow
        .and_hms_opt(FALLBACK_RESET_HOUR, 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
}

pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    format!("{}h{:02}m", minutes / 60, minutes % 60)
}
