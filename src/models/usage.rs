use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::pricing::RateTable;

/// One line of a Claude Code transcript. Only the fields we read are
/// declared; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LogRecord {
    pub timestamp: Option<String>,
    pub usage: Option<TokenUsage>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub usage: Option<TokenUsage>,
}

impl LogRecord {
    /// Usage payload, top-level first, then `message.usage`.
    pub fn usage(&self) -> Option<&TokenUsage> {
        self.usage
            .as_ref()
            .or_else(|| self.message.as_ref().and_then(|m| m.usage.as_ref()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_creation_input_tokens
    }
}

/// A single consumption record pulled out of a transcript line.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub tokens: TokenUsage,
    pub cost: f64,
}

impl UsageEvent {
    /// Build an event from a parsed record. Returns `None` when the record
    /// has no usable timestamp or usage, or when it consumed nothing.
    pub fn from_record(record: &LogRecord, rates: &RateTable) -> Option<Self> {
        let raw_ts = record.timestamp.as_deref().filter(|ts| !ts.is_empty())?;
        let timestamp = DateTime::parse_from_rfc3339(raw_ts).ok()?;
        let tokens = *record.usage()?;

        if tokens.total() == 0 {
            return None;
        }

        Some(Self {
            timestamp,
            tokens,
            cost: rates.cost(&tokens),
        })
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens.total()
    }
}

/// Gap-delimited run of events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token_total: u64,
    pub cost_total: f64,
}

impl Session {
    pub fn seeded(event: &UsageEvent) -> Self {
        let mut session = Self::default();
        session.add(event);
        session
    }

    pub fn add(&mut self, event: &UsageEvent) {
        self.token_total += event.total_tokens();
        self.cost_total += event.cost;
    }
}

/// Consumption ceiling used to scale the usage bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveLimit {
    pub token_limit: u64,
    pub cost_limit: f64,
}

/// What the analyzer hands to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_tokens: u64,
    pub token_limit: u64,
    pub cost_usd: f64,
    pub cost_limit: f64,
    pub event_count: usize,
    pub session_start: Option<DateTime<FixedOffset>>,
}

impl UsageSummary {
    pub fn token_percentage(&self) -> f64 {
        if self.token_limit == 0 {
            return 0.0;
        }
        self.total_tokens as f64 / self.token_limit as f64 * 100.0
    }
}
