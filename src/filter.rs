use crate::models::AuditEvent;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Sentinel meaning "no type restriction". Always first in the type catalog.
pub const ALL_TYPES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    All,
    Tool,
    Task,
}

impl Scope {
    fn prefix(self) -> Option<&'static str> {
        match self {
            Scope::All => None,
            Scope::Tool => Some("tool_"),
            Scope::Task => Some("task_"),
        }
    }

    pub fn admits(self, kind: &str) -> bool {
        self.prefix().is_none_or(|p| kind.starts_with(p))
    }

    pub fn label(self) -> &'static str {
        match self {
            Scope::All => "All scopes",
            Scope::Tool => "Tool events only",
            Scope::Task => "Task events only",
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Scope::All),
            "tool" => Ok(Scope::Tool),
            "task" => Ok(Scope::Task),
            other => Err(format!("unknown scope '{other}' (expected all | tool | task)")),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::All => "all",
            Scope::Tool => "tool",
            Scope::Task => "task",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
    Month,
    All,
}

impl TimeWindow {
    pub fn duration(self) -> Option<Duration> {
        match self {
            TimeWindow::Day => Some(Duration::hours(24)),
            TimeWindow::Week => Some(Duration::days(7)),
            TimeWindow::Month => Some(Duration::days(30)),
            TimeWindow::All => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::Day => "Last 24 hours",
            TimeWindow::Week => "Last 7 days",
            TimeWindow::Month => "Last 30 days",
            TimeWindow::All => "All time",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(TimeWindow::Day),
            "7d" => Ok(TimeWindow::Week),
            "30d" => Ok(TimeWindow::Month),
            "all" => Ok(TimeWindow::All),
            other => Err(format!(
                "unknown window '{other}' (expected 24h | 7d | 30d | all)"
            )),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeWindow::Day => "24h",
            TimeWindow::Week => "7d",
            TimeWindow::Month => "30d",
            TimeWindow::All => "all",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub scope: Scope,
    pub kind: String,
    pub window: TimeWindow,
    pub search: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            scope: Scope::All,
            kind: ALL_TYPES.to_string(),
            window: TimeWindow::Week,
            search: String::new(),
        }
    }
}

impl FilterCriteria {
    pub fn matches(&self, event: &AuditEvent, now: DateTime<Utc>) -> bool {
        self.scope.admits(&event.kind)
            && self.matches_kind(&event.kind)
            && self.matches_window(&event.timestamp, now)
            && self.matches_search(event)
    }

    fn matches_kind(&self, kind: &str) -> bool {
        self.kind == ALL_TYPES || self.kind == kind
    }

    fn matches_window(&self, timestamp: &str, now: DateTime<Utc>) -> bool {
        let Some(window) = self.window.duration() else {
            return true;
        };
        match parse_timestamp(timestamp) {
            Some(ts) => now - ts <= window,
            None => false,
        }
    }

    fn matches_search(&self, event: &AuditEvent) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        event.kind.to_lowercase().contains(&term)
            || event.attributes_json().to_lowercase().contains(&term)
    }
}

/// Parse an ISO-8601 timestamp. RFC 3339 with an offset is exact. A date-time
/// without an offset is local wall-clock time; a bare `YYYY-MM-DD` is
/// midnight UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M"));
    if let Ok(naive) = naive {
        // a skipped DST hour has no local reading
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Positions of the events visible under `criteria`, in input order.
///
/// Indices rather than references so the result can be cached next to the
/// collection it points into.
pub fn filter_indices(
    events: &[AuditEvent],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<usize> {
    events
        .iter()
        .enumerate()
        .filter(|(_, e)| criteria.matches(e, now))
        .map(|(i, _)| i)
        .collect()
}

/// `"all"` followed by every distinct observed type, sorted.
pub fn distinct_types(events: &[AuditEvent]) -> Vec<String> {
    let observed: BTreeSet<&str> = events
        .iter()
        .map(|e| e.kind.as_str())
        .filter(|k| *k != ALL_TYPES)
        .collect();

    std::iter::once(ALL_TYPES)
        .chain(observed)
        .map(str::to_string)
        .collect()
}
