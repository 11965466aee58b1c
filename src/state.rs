use crate::client::{self, ApiClient, Endpoint, FetchError};
use crate::export;
use crate::filter::{self, FilterCriteria, Scope, TimeWindow};
use crate::models::{AuditEvent, DashboardSummary};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// One consistent pair of gateway responses.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub summary: DashboardSummary,
    pub events: Vec<AuditEvent>,
}

/// Fetch summary and events concurrently and join them.
///
/// Both statuses are checked (summary first) before either body is decoded,
/// so the reported failure is always the first one in that order.
pub async fn fetch_snapshot(client: &ApiClient) -> Result<Snapshot, FetchError> {
    let (summary_resp, events_resp) = tokio::join!(
        client.send(Endpoint::Summary),
        client.send(Endpoint::Events)
    );
    let summary_resp = summary_resp?;
    let events_resp = events_resp?;

    let summary = client::decode_summary(summary_resp).await?;
    let events = client::decode_events(events_resp).await?;
    Ok(Snapshot { summary, events })
}

struct FilterMemo {
    generation: u64,
    criteria: FilterCriteria,
    indices: Vec<usize>,
}

struct TypesMemo {
    generation: u64,
    types: Vec<String>,
}

/// Per-session dashboard state. Owned by a single task; every mutation
/// (operator input or a settled refresh) goes through `&mut self`.
#[derive(Default)]
pub struct DashboardState {
    summary: Option<DashboardSummary>,
    events: Vec<AuditEvent>,
    criteria: FilterCriteria,
    in_flight: usize,
    error: Option<String>,
    last_refresh: Option<DateTime<Utc>>,
    // bumped on every swap of `events`
    generation: u64,
    filter_memo: Option<FilterMemo>,
    types_memo: Option<TypesMemo>,
    filter_runs: usize,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    // ── Fetch orchestration ────────────────────────────────────────────────

    /// Mark a refresh as started: raise the loading flag, clear the banner.
    pub fn begin_refresh(&mut self) {
        self.in_flight += 1;
        self.error = None;
    }

    /// Apply a settled refresh. Success swaps summary and events together;
    /// failure only records the message. The loading flag drops once the
    /// last in-flight refresh has settled.
    pub fn apply_refresh(&mut self, outcome: Result<Snapshot, FetchError>, at: DateTime<Utc>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Ok(Snapshot { summary, events }) => {
                tracing::info!(events = events.len(), "refresh applied");
                self.summary = Some(summary);
                self.events = events;
                self.generation += 1;
                self.last_refresh = Some(at);
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %e.endpoint(),
                    status = ?e.status(),
                    error = %e,
                    "refresh failed, keeping previous state"
                );
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn refresh(&mut self, client: &ApiClient) {
        self.begin_refresh();
        let outcome = fetch_snapshot(client).await;
        self.apply_refresh(outcome, Utc::now());
    }

    // ── Filter criteria ────────────────────────────────────────────────────

    pub fn set_scope(&mut self, scope: Scope) {
        self.criteria.scope = scope;
    }

    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.criteria.kind = kind.into();
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        self.criteria.window = window;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    // ── Derived views ──────────────────────────────────────────────────────

    /// Events visible under the current criteria.
    pub fn visible(&mut self) -> Vec<&AuditEvent> {
        self.visible_at(Utc::now())
    }

    /// Like [`visible`](Self::visible) with an explicit clock. The result is
    /// reused until the raw events or the criteria change; `now` is only
    /// read when the pipeline actually runs.
    pub fn visible_at(&mut self, now: DateTime<Utc>) -> Vec<&AuditEvent> {
        let stale = self
            .filter_memo
            .as_ref()
            .is_none_or(|m| m.generation != self.generation || m.criteria != self.criteria);
        if stale {
            self.filter_runs += 1;
            tracing::debug!(runs = self.filter_runs, "filter pipeline recomputed");
            self.filter_memo = Some(FilterMemo {
                generation: self.generation,
                criteria: self.criteria.clone(),
                indices: filter::filter_indices(&self.events, &self.criteria, now),
            });
        }

        let indices = self
            .filter_memo
            .as_ref()
            .map(|m| m.indices.as_slice())
            .unwrap_or_default();
        indices.iter().map(|&i| &self.events[i]).collect()
    }

    /// Type catalog over the raw (unfiltered) events.
    pub fn event_types(&mut self) -> &[String] {
        let generation = self.generation;
        let memo = match self.types_memo.take() {
            Some(m) if m.generation == generation => m,
            _ => TypesMemo {
                generation,
                types: filter::distinct_types(&self.events),
            },
        };
        &self.types_memo.insert(memo).types
    }

    /// Export the visible set. `Ok(None)` when nothing is visible.
    pub fn export(&mut self, dir: &Path) -> Result<Option<PathBuf>> {
        let visible = self.visible();
        export::export_csv(&visible, dir, Utc::now())
    }
}
