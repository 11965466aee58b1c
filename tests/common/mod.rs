#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Router};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Gateway answering both endpoints with fixed responses.
pub async fn stub_gateway(summary: (StatusCode, String), events: (StatusCode, String)) -> String {
    let app = Router::new()
        .route("/dashboard/summary", get(move || async move { summary }))
        .route("/audit/events", get(move || async move { events }));
    serve(app).await
}

/// Gateway that accepts requests and never answers.
pub async fn hung_gateway() -> String {
    async fn stall() -> (StatusCode, String) {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        (StatusCode::OK, String::new())
    }
    let app = Router::new()
        .route("/dashboard/summary", get(stall))
        .route("/audit/events", get(stall));
    serve(app).await
}

pub fn summary_body() -> (StatusCode, String) {
    let body = serde_json::json!({
        "tasks_started": 12,
        "tasks_succeeded": 9,
        "tasks_failed": 3,
        "task_success_rate": 75.0,
        "p50_latency_ms": 140.0,
        "p95_latency_ms": 880.0,
        "average_cost_per_task_usd": 0.0042,
        "failure_recovery_rate": 33.3,
        "safety_incident_rate": 0.5,
        "weekly_completed_tasks": 7,
        "active_users_7d": 4,
        "retention_7d": 50.0,
        "audit_events": 3
    });
    (StatusCode::OK, body.to_string())
}

/// Two recent events (one tool, one task) and one old tool event.
pub fn events_body() -> (StatusCode, String) {
    let now = Utc::now().to_rfc3339();
    let body = serde_json::json!({
        "events": [
            { "id": "e1", "timestamp": now, "type": "tool_called", "attributes": { "tool": "search" } },
            { "id": "e2", "timestamp": now, "type": "task_failed", "attributes": { "reason": "say \"hi\"" } },
            { "id": "e3", "timestamp": "2001-01-01T00:00:00Z", "type": "tool_called", "attributes": {} }
        ]
    });
    (StatusCode::OK, body.to_string())
}

/// The dashboard binary with a clean, colorless environment.
pub fn cognis(export_dir: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_cognis-dashboard"));
    cmd.env("NO_COLOR", "1")
        .env("COGNIS_EXPORT_DIR", export_dir)
        .env_remove("COGNIS_BASE_URL")
        .env_remove("COGNIS_LOG")
        .kill_on_drop(true);
    cmd
}

pub fn csv_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect()
}
