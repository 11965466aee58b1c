use super::fmt::{
    bar, cprintln, error_banner, fmt_latency, fmt_pct, fmt_usd, pad, BOLD, CYAN, DIM, RESET,
    YELLOW,
};
use super::FUNNEL_WIDTH;
use crate::models::DashboardSummary;
use crate::state::DashboardState;

pub fn print_header(state: &DashboardState) {
    let last = state
        .last_refresh()
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "never".to_string());
    let status = if state.loading() {
        format!("  {YELLOW}refreshing...{RESET}")
    } else {
        String::new()
    };

    println!();
    cprintln!("{BOLD}{CYAN}Cognis Operations Dashboard{RESET}  {DIM}last refresh: {last}{RESET}{status}");
    if let Some(err) = state.error() {
        cprintln!("{}", error_banner(err));
    }
}

pub fn print_summary(s: &DashboardSummary) {
    print_kpis(s);
    print_quality(s);
    print_funnel(s);
}

fn print_kpis(s: &DashboardSummary) {
    let cards = [
        ("Task success rate", fmt_pct(s.task_success_rate, 1)),
        ("P95 latency", fmt_latency(s.p95_latency_ms)),
        ("P50 latency", fmt_latency(s.p50_latency_ms)),
        ("Avg cost / task", fmt_usd(s.average_cost_per_task_usd)),
        ("Safety incident rate", fmt_pct(s.safety_incident_rate, 2)),
    ];

    println!();
    for (label, value) in cards {
        cprintln!("  {DIM}{}{RESET}{BOLD}{value}{RESET}", pad(label, 24));
    }
}

fn print_quality(s: &DashboardSummary) {
    let rows = [
        ("Tasks started", s.tasks_started.to_string()),
        ("Tasks succeeded", s.tasks_succeeded.to_string()),
        ("Tasks failed", s.tasks_failed.to_string()),
        ("Failure recovery rate", fmt_pct(s.failure_recovery_rate, 1)),
        ("Retention (7d)", fmt_pct(s.retention_7d, 1)),
        ("Active users (7d)", s.active_users_7d.to_string()),
        ("Audit events", s.audit_events.to_string()),
    ];

    println!();
    cprintln!("{DIM}── execution quality ───────────────────────────{RESET}");
    for (label, value) in rows {
        cprintln!("  {}{BOLD}{value}{RESET}", pad(label, 24));
    }
}

fn print_funnel(s: &DashboardSummary) {
    let max = s.funnel_max();
    let weekly_max = s.weekly_completed_tasks.max(1);
    let rows = [
        ("Started", s.tasks_started, max),
        ("Succeeded", s.tasks_succeeded, max),
        ("Failed", s.tasks_failed, max),
        ("Weekly completed", s.weekly_completed_tasks, weekly_max),
    ];

    println!();
    cprintln!("{DIM}── execution funnel ────────────────────────────{RESET}");
    for (label, value, of) in rows {
        cprintln!(
            "  {}{}  {BOLD}{value}{RESET}",
            pad(label, 18),
            bar(value, of, FUNNEL_WIDTH)
        );
    }
}
