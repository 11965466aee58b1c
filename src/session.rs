use crate::client::{ApiClient, FetchError};
use crate::filter::{Scope, TimeWindow, ALL_TYPES};
use crate::models::shorten_home;
use crate::state::{fetch_snapshot, DashboardState, Snapshot};
use crate::view::{
    self,
    fmt::{ceprintln, cprintln, DIM, GREEN, RESET, YELLOW},
};
use anyhow::Result;
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

type Outcome = Result<Snapshot, FetchError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    Scope(Scope),
    Type(String),
    Window(TimeWindow),
    Search(String),
    Reset,
    Types,
    Show,
    Summary,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "refresh" | "r" => Ok(Command::Refresh),
        "scope" => require(word, rest, "all | tool | task")?
            .parse::<Scope>()
            .map(Command::Scope),
        "type" => require(word, rest, "an event type or 'all'")
            .map(|t| Command::Type(t.to_string())),
        "window" => require(word, rest, "24h | 7d | 30d | all")?
            .parse::<TimeWindow>()
            .map(Command::Window),
        "search" | "/" => Ok(Command::Search(rest.to_string())),
        "reset" => Ok(Command::Reset),
        "types" => Ok(Command::Types),
        "show" | "ls" => Ok(Command::Show),
        "summary" => Ok(Command::Summary),
        "export" => Ok(Command::Export(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

fn require<'a>(word: &str, rest: &'a str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("{word} requires {what}"))
    } else {
        Ok(rest)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive operator session. Refreshes once on start, then only when
/// the operator asks. Fetches run on their own task so input keeps being
/// read while a request is outstanding.
pub async fn run(client: ApiClient, export_dir: PathBuf) -> Result<()> {
    let mut state = DashboardState::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    tracing::debug!(base_url = client.base_url(), "session started");

    start_refresh(&mut state, &client, &tx);
    render(&mut state);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!();
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(cmd) => {
                        if let Flow::Quit = execute(&mut state, &client, &tx, &export_dir, cmd) {
                            break;
                        }
                    }
                    Err(msg) => ceprintln!("{YELLOW}[cognis]{RESET} {msg}"),
                }
            }
            Some(outcome) = rx.recv() => {
                state.apply_refresh(outcome, Utc::now());
                render(&mut state);
            }
        }
    }
    Ok(())
}

/// Raise the loading flag and fetch on a separate task. The outcome is
/// applied by the session loop.
fn start_refresh(
    state: &mut DashboardState,
    client: &ApiClient,
    tx: &mpsc::UnboundedSender<Outcome>,
) {
    state.begin_refresh();
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = fetch_snapshot(&client).await;
        // receiver only goes away when the session has ended
        tx.send(outcome).ok();
    });
}

fn execute(
    state: &mut DashboardState,
    client: &ApiClient,
    tx: &mpsc::UnboundedSender<Outcome>,
    export_dir: &Path,
    cmd: Command,
) -> Flow {
    match cmd {
        Command::Refresh => {
            if state.loading() {
                cprintln!("{DIM}refresh already in progress.{RESET}");
            } else {
                start_refresh(state, client, tx);
                cprintln!("{DIM}refreshing...{RESET}");
            }
        }
        Command::Scope(scope) => {
            state.set_scope(scope);
            render_events(state);
        }
        Command::Type(kind) => {
            if kind != ALL_TYPES && !state.event_types().contains(&kind) {
                ceprintln!("{YELLOW}[cognis]{RESET} no loaded events have type '{kind}'");
            }
            state.set_kind(kind);
            render_events(state);
        }
        Command::Window(window) => {
            state.set_window(window);
            render_events(state);
        }
        Command::Search(text) => {
            state.set_search(text);
            render_events(state);
        }
        Command::Reset => {
            state.reset_filters();
            render_events(state);
        }
        Command::Types => view::print_types(state.event_types()),
        Command::Show => render(state),
        Command::Summary => match state.summary() {
            Some(s) => view::print_summary(s),
            None => cprintln!("{DIM}no summary loaded yet.{RESET}"),
        },
        Command::Export(dir) => export(state, dir.as_deref().unwrap_or(export_dir)),
        Command::Help => print_help(),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn export(state: &mut DashboardState, dir: &Path) {
    match state.export(dir) {
        Ok(Some(path)) => {
            let shown = shorten_home(&path.to_string_lossy());
            cprintln!("{GREEN}exported{RESET} {shown}");
        }
        Ok(None) => cprintln!("{DIM}nothing to export: no events match the current filters.{RESET}"),
        Err(e) => ceprintln!("{YELLOW}[cognis]{RESET} export failed: {e:#}"),
    }
}

fn render(state: &mut DashboardState) {
    view::print_header(state);
    if let Some(s) = state.summary() {
        view::print_summary(s);
    }
    render_events(state);
}

fn render_events(state: &mut DashboardState) {
    let criteria = state.criteria().clone();
    let total = state.events().len();
    let visible = state.visible();
    view::print_filters(&criteria, visible.len(), total);
    view::print_events(&visible);
}

fn prompt() {
    print!("cognis> ");
    std::io::stdout().flush().ok();
}

fn print_help() {
    println!();
    cprintln!("{DIM}commands:{RESET}");
    println!("  refresh                    Fetch summary and events again");
    println!("  scope  <all|tool|task>     Filter by event scope");
    println!("  type   <name|all>          Filter by exact event type");
    println!("  window <24h|7d|30d|all>    Filter by age");
    println!("  search [text]              Case-insensitive search (empty clears)");
    println!("  reset                      Restore default filters");
    println!("  types                      List event types in the loaded feed");
    println!("  show | summary             Redraw everything / just the KPIs");
    println!("  export [dir]               Write visible events as CSV");
    println!("  quit                       Leave the session");
}
