use crate::models::Severity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

static FORCE_NO_COLOR: AtomicBool = AtomicBool::new(false);
static COLOR: OnceLock<bool> = OnceLock::new();

pub(crate) fn disable_color() {
    FORCE_NO_COLOR.store(true, Ordering::Relaxed);
}

pub(crate) fn use_color() -> bool {
    if FORCE_NO_COLOR.load(Ordering::Relaxed) {
        return false;
    }
    *COLOR.get_or_init(|| std::env::var("NO_COLOR").is_err() && atty::is(atty::Stream::Stdout))
}

pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_esc = false;
    for ch in s.chars() {
        if in_esc {
            if ch == 'm' {
                in_esc = false;
            }
        } else if ch == '\x1b' {
            in_esc = true;
        } else {
            out.push(ch);
        }
    }
    out
}

macro_rules! cprintln {
    () => { println!() };
    ($($arg:tt)*) => {{
        let s = format!($($arg)*);
        if $crate::view::fmt::use_color() {
            println!("{s}");
        } else {
            println!("{}", $crate::view::fmt::strip_ansi(&s));
        }
    }};
}
pub(crate) use cprintln;

macro_rules! ceprintln {
    () => { eprintln!() };
    ($($arg:tt)*) => {{
        let s = format!($($arg)*);
        if $crate::view::fmt::use_color() {
            eprintln!("{s}");
        } else {
            eprintln!("{}", $crate::view::fmt::strip_ansi(&s));
        }
    }};
}
pub(crate) use ceprintln;

pub(crate) const RESET: &str = "\x1b[0m";
pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const CYAN: &str = "\x1b[36m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const BRIGHT_RED: &str = "\x1b[91m";
pub(crate) const WHITE: &str = "\x1b[97m";
pub(crate) const BG_RED: &str = "\x1b[41m";

/// Escape control characters so text from the feed can't reach the
/// terminal as escape sequences. Everything else passes through.
pub(crate) fn printable(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn trunc(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s
            .char_indices()
            .nth(max.saturating_sub(1))
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        format!("{}…", &s[..end])
    }
}

/// Pad to `width` visible columns. Counts chars, not bytes.
pub(crate) fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{s}{}", " ".repeat(width.saturating_sub(len)))
}

pub(crate) fn severity_badge(kind: &str, severity: Severity) -> String {
    match severity {
        Severity::Warning => format!("{YELLOW}▲ {kind}{RESET}"),
        Severity::Success => format!("{GREEN}● {kind}{RESET}"),
        Severity::Neutral => format!("{DIM}○{RESET} {kind}"),
    }
}

pub(crate) fn error_banner(message: &str) -> String {
    let message = printable(message);
    format!("{BG_RED}{BOLD}{WHITE} ERROR {RESET} {BRIGHT_RED}{message}{RESET}")
}

pub(crate) fn fmt_pct(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

pub(crate) fn fmt_usd(value: f64) -> String {
    format!("${value:.4}")
}

pub(crate) fn fmt_latency(ms: f64) -> String {
    format!("{ms:.0} ms")
}

/// Fill width of a funnel bar as a percentage, never below 6 so empty
/// rows stay visible.
pub(crate) fn bar_percent(value: u64, max: u64) -> f64 {
    let max = max.max(1) as f64;
    (value as f64 / max * 100.0).max(6.0)
}

pub(crate) fn bar(value: u64, max: u64, width: usize) -> String {
    let filled = ((bar_percent(value, max) / 100.0) * width as f64).round() as usize;
    let filled = filled.clamp(1, width);
    format!(
        "{CYAN}{}{RESET}{DIM}{}{RESET}",
        "█".repeat(filled),
        "░".repeat(width - filled)
    )
}
