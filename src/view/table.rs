use super::fmt::{cprintln, pad, printable, severity_badge, trunc, BOLD, DIM, RESET};
use super::{ATTR_COL, TABLE_WIDTH, TIME_COL, TYPE_COL};
use crate::filter::{parse_timestamp, FilterCriteria, ALL_TYPES};
use crate::models::AuditEvent;

pub fn print_filters(criteria: &FilterCriteria, visible: usize, total: usize) {
    let kind = if criteria.kind == ALL_TYPES {
        "All event types".to_string()
    } else {
        printable(&criteria.kind)
    };
    let search = if criteria.search.is_empty() {
        String::new()
    } else {
        format!(" · search \"{}\"", printable(&criteria.search))
    };

    println!();
    cprintln!("{DIM}── audit trail ─────────────────────────────────{RESET}");
    cprintln!(
        "  {} · {kind} · {}{search}  {DIM}({visible} of {total}){RESET}",
        criteria.scope.label(),
        criteria.window.label()
    );
}

pub fn print_events(events: &[&AuditEvent]) {
    println!();
    cprintln!(
        "  {BOLD}{}  {}  Attributes{RESET}",
        pad("Time", TIME_COL),
        pad("Type", TYPE_COL)
    );
    cprintln!("  {DIM}{}{RESET}", "─".repeat(TABLE_WIDTH - 2));

    if events.is_empty() {
        cprintln!("  {DIM}No events match the current filters.{RESET}");
        return;
    }

    for e in events {
        cprintln!("{}", format_row(e));
    }
}

fn format_row(e: &AuditEvent) -> String {
    let time = local_time(&e.timestamp);
    let kind = trunc(&printable(&e.kind), TYPE_COL - 2);
    // pad before colouring so escapes don't count toward the width
    let badge = severity_badge(&pad(&kind, TYPE_COL - 2), e.severity());
    let attrs = trunc(&printable(&e.attributes_json()), ATTR_COL);
    format!("  {DIM}{}{RESET}  {badge}  {attrs}", pad(&time, TIME_COL))
}

/// Local display time, or the raw string when it doesn't parse.
fn local_time(ts: &str) -> String {
    parse_timestamp(ts)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| trunc(&printable(ts), TIME_COL))
}

pub fn print_types(types: &[String]) {
    println!();
    cprintln!("{DIM}── event types ─────────────────────────────────{RESET}");
    for t in types {
        if t == ALL_TYPES {
            cprintln!("  {DIM}{t}{RESET}");
        } else {
            cprintln!("  {}", printable(t));
        }
    }
}
