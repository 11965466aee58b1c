use serde::Deserialize;

/// KPI snapshot served by `GET /dashboard/summary`. Replaced wholesale on
/// every successful refresh.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub tasks_started: u64,
    pub tasks_succeeded: u64,
    pub tasks_failed: u64,
    pub task_success_rate: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub average_cost_per_task_usd: f64,
    pub failure_recovery_rate: f64,
    pub safety_incident_rate: f64,
    pub weekly_completed_tasks: u64,
    pub active_users_7d: u64,
    pub retention_7d: f64,
    pub audit_events: u64,
}

impl DashboardSummary {
    /// Upper bound used to scale the started / succeeded / failed funnel bars.
    pub fn funnel_max(&self) -> u64 {
        self.tasks_started
            .max(self.tasks_succeeded)
            .max(self.tasks_failed)
            .max(1)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl AuditEvent {
    /// Compact JSON of the attribute map. Keys come out sorted, so two
    /// equal maps always serialize to the same string.
    pub fn attributes_json(&self) -> String {
        serde_json::to_string(&self.attributes).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn severity(&self) -> Severity {
        Severity::classify(&self.kind)
    }
}

/// Body of `GET /audit/events`.
#[derive(Deserialize, Debug, Default)]
pub struct EventsEnvelope {
    #[serde(default)]
    pub events: Vec<AuditEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Success,
    Neutral,
}

const WARNING_MARKERS: &[&str] = &["failed", "denied", "incident"];
const SUCCESS_MARKERS: &[&str] = &["succeeded", "authorized", "captured"];

impl Severity {
    /// Classify an event type into a display severity.
    ///
    /// Case-insensitive substring match. Warning markers are checked first,
    /// so `payment_captured_then_failed` is a warning.
    pub fn classify(kind: &str) -> Self {
        let lower = kind.to_lowercase();

        if WARNING_MARKERS.iter().any(|m| lower.contains(m)) {
            Severity::Warning
        } else if SUCCESS_MARKERS.iter().any(|m| lower.contains(m)) {
            Severity::Success
        } else {
            Severity::Neutral
        }
    }
}

pub fn home() -> String {
    std::env::var("HOME").unwrap_or_default()
}

pub fn shorten_home(path: &str) -> String {
    let home = home();
    if !home.is_empty() && path.starts_with(&home) {
        format!("~{}", &path[home.len()..])
    } else {
        path.to_string()
    }
}
