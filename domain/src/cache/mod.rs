//! Research cache keys, TTL classes and entries.
//!
//! Storage lives behind a port in the application layer; this module only
//! decides freshness.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Horizon of the analysis a cached lookup feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeClass {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl TimeframeClass {
    pub const ALL: [TimeframeClass; 4] = [
        TimeframeClass::Short,
        TimeframeClass::Medium,
        TimeframeClass::Long,
        TimeframeClass::VeryLong,
    ];

    /// 15 min / 1 h / 4 h / 24 h
    pub fn ttl(&self) -> Duration {
        match self {
            TimeframeClass::Short => Duration::minutes(15),
            TimeframeClass::Medium => Duration::hours(1),
            TimeframeClass::Long => Duration::hours(4),
            TimeframeClass::VeryLong => Duration::hours(24),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeframeClass::Short => "short",
            TimeframeClass::Medium => "medium",
            TimeframeClass::Long => "long",
            TimeframeClass::VeryLong => "very_long",
        }
    }
}

impl std::fmt::Display for TimeframeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeframeClass {
    type Err = String;

    /// Accepts class names and common horizon words
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "short" | "day" | "intraday" | "scalp" | "day-trade" => Ok(TimeframeClass::Short),
            "medium" | "swing" | "short-term" => Ok(TimeframeClass::Medium),
            "long" | "position" | "medium-term" => Ok(TimeframeClass::Long),
            "very-long" | "long-term" | "investment" => Ok(TimeframeClass::VeryLong),
            other => Err(format!("Unknown timeframe: {}", other)),
        }
    }
}

/// Cache key: normalized subject + timeframe class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub subject: String,
    pub timeframe: TimeframeClass,
}

impl CacheKey {
    /// Subjects are case-insensitive (`aapl` and `AAPL` share entries)
    pub fn new(subject: &str, timeframe: TimeframeClass) -> Self {
        Self {
            subject: subject.trim().to_uppercase(),
            timeframe,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.subject, self.timeframe)
    }
}

/// Which entries of a subject to invalidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateScope {
    All,
    Timeframe(TimeframeClass),
}

impl InvalidateScope {
    pub fn matches(&self, timeframe: TimeframeClass) -> bool {
        match self {
            InvalidateScope::All => true,
            InvalidateScope::Timeframe(t) => *t == timeframe,
        }
    }
}

/// A cached research payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
    pub access_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// New entry expiring after the key's class TTL
    pub fn new(key: CacheKey, payload: Value, now: DateTime<Utc>) -> Self {
        let expires_at = now + key.timeframe.ttl();
        Self {
            key,
            payload,
            created_at: now,
            expires_at,
            stale: false,
            stale_reason: None,
            access_count: 0,
            last_accessed: None,
        }
    }

    /// Neither expired nor marked stale
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        !self.stale && now < self.expires_at
    }

    pub fn mark_stale(&mut self, reason: impl Into<String>) {
        self.stale = true;
        self.stale_reason = Some(reason.into());
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed = Some(now);
    }
}
