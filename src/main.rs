mod cli;
mod client;
mod config;
mod export;
mod filter;
mod models;
mod session;
mod state;
mod view;

use anyhow::{bail, Result};
use client::ApiClient;
use config::Config;
use state::DashboardState;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use view::fmt::{ceprintln, cprintln, DIM, GREEN, RESET};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();

    if cli::has_flag(&raw, &["--help", "-h"]) || raw.first().map(|s| s.as_str()) == Some("help") {
        cli::print_help();
        return Ok(());
    }
    if cli::has_flag(&raw, &["--version", "-V"]) {
        println!("cognis-dashboard {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = Config::from_env();
    config.apply_args(&raw);
    if !config.color {
        view::fmt::disable_color();
    }

    let args = cli::filter_flags(&raw, config::GLOBAL_FLAGS);

    let client = ApiClient::new(&config.base_url)?;

    match args.first().map(|s| s.as_str()) {
        None | Some("dashboard") => session::run(client, config.export_dir).await,
        Some("summary") => dispatch_summary(&client).await,
        Some("events") => dispatch_events(&args[1..], &client).await,
        Some("types") => dispatch_types(&client).await,
        Some("export") => dispatch_export(&args[1..], &client, &config.export_dir).await,
        Some(other) => {
            ceprintln!("cognis: unknown command '{other}'\n");
            cli::print_help();
            bail!("unknown command '{other}'")
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(config::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// One refresh for the one-shot commands. A failed refresh ends the command.
async fn load(client: &ApiClient) -> Result<DashboardState> {
    let mut state = DashboardState::new();
    state.refresh(client).await;
    if let Some(err) = state.error() {
        bail!("{err} (gateway: {})", client.base_url());
    }
    Ok(state)
}

async fn dispatch_summary(client: &ApiClient) -> Result<()> {
    let state = load(client).await?;
    view::print_header(&state);
    if let Some(s) = state.summary() {
        view::print_summary(s);
    }
    println!();
    Ok(())
}

async fn dispatch_events(args: &[String], client: &ApiClient) -> Result<()> {
    let mut state = load(client).await?;
    state.set_criteria(cli::parse_filter_args(args));

    let criteria = state.criteria().clone();
    let total = state.events().len();
    let visible = state.visible();
    view::print_filters(&criteria, visible.len(), total);
    view::print_events(&visible);
    println!();
    Ok(())
}

async fn dispatch_types(client: &ApiClient) -> Result<()> {
    let mut state = load(client).await?;
    view::print_types(state.event_types());
    println!();
    Ok(())
}

async fn dispatch_export(args: &[String], client: &ApiClient, dir: &Path) -> Result<()> {
    let mut state = load(client).await?;
    state.set_criteria(cli::parse_filter_args(args));

    let count = state.visible().len();
    match state.export(dir)? {
        Some(path) => {
            let shown = models::shorten_home(&path.to_string_lossy());
            cprintln!("{GREEN}exported{RESET} {count} events to {shown}");
        }
        None => cprintln!("{DIM}no events to export.{RESET}"),
    }
    Ok(())
}
