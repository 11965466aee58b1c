use crate::filter::FilterCriteria;

pub fn print_help() {
    println!("cognis-dashboard {}", env!("CARGO_PKG_VERSION"));
    println!("Operator view of a Cognis gateway: KPIs, audit trail, compliance export.\n");
    print_usage();
    print_options();
}

fn print_usage() {
    println!("USAGE:");
    println!("  cognis-dashboard                     Interactive operator session");
    println!("  cognis-dashboard dashboard           Same as above");
    println!("  cognis-dashboard summary             KPI snapshot");
    println!("  cognis-dashboard events  [FILTERS]   Filtered audit trail");
    println!("  cognis-dashboard types               Event types present in the feed");
    println!("  cognis-dashboard export  [FILTERS]   Write filtered events as CSV");
    println!("  cognis-dashboard help | --help | -h  Show this message");
    println!("  cognis-dashboard --version | -V      Show version\n");
}

fn print_options() {
    println!("FILTERS:");
    println!("  --scope <s>       all (default) | tool | task");
    println!("  --type <name>     Exact event type (default: all)");
    println!("  --window <w>      24h | 7d (default) | 30d | all");
    println!("  --search <text>   Case-insensitive match on type or attributes\n");
    println!("GLOBAL OPTIONS:");
    println!("  --base-url <url>  Gateway address (default: http://127.0.0.1:8787)");
    println!("  --output-dir <d>  Export directory (default: your downloads folder)");
    println!("  --no-color        Disable colored output (also respects NO_COLOR env)\n");
    println!("ENVIRONMENT:");
    println!("  COGNIS_BASE_URL     Gateway address");
    println!("  COGNIS_EXPORT_DIR   Export directory");
    println!("  COGNIS_LOG          Diagnostic log filter, e.g. debug (default: warn)");
}

/// Parse filter flags. Bad values are reported and the default kept.
pub fn parse_filter_args(args: &[String]) -> FilterCriteria {
    let mut out = FilterCriteria::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--scope" | "--type" | "--window" | "--search" => {
                let flag = args[i].as_str();
                match args.get(i + 1) {
                    Some(val) => {
                        match flag {
                            "--scope" => match val.parse() {
                                Ok(scope) => out.scope = scope,
                                Err(e) => eprintln!("cognis: {e}"),
                            },
                            "--window" => match val.parse() {
                                Ok(window) => out.window = window,
                                Err(e) => eprintln!("cognis: {e}"),
                            },
                            "--type" => out.kind = val.clone(),
                            "--search" => out.search = val.clone(),
                            _ => {}
                        }
                        i += 1;
                    }
                    None => eprintln!("cognis: {flag} requires a value"),
                }
            }
            other if other.starts_with("--") => {
                eprintln!("cognis: unknown option '{other}'");
            }
            _ => {}
        }
        i += 1;
    }
    out
}

/// Flags that consume the argument after them.
const VALUE_FLAGS: &[&str] = &[
    "--scope",
    "--type",
    "--window",
    "--search",
    "--base-url",
    "--output-dir",
];

/// Indices of arguments that are not the value of a preceding flag.
fn flag_positions(args: &[String]) -> Vec<usize> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        out.push(i);
        i += if VALUE_FLAGS.contains(&args[i].as_str()) { 2 } else { 1 };
    }
    out
}

/// True when any of `names` appears as a flag, not as a value.
pub fn has_flag(args: &[String], names: &[&str]) -> bool {
    flag_positions(args)
        .into_iter()
        .any(|i| names.contains(&args[i].as_str()))
}

pub fn get_flag(args: &[String], flag: &str) -> Option<String> {
    flag_positions(args)
        .into_iter()
        .find(|&i| args[i] == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

/// Drop every occurrence of `flags`, plus its value when it takes one.
/// Values of other flags are never matched.
pub fn filter_flags(args: &[String], flags: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for i in flag_positions(args) {
        let arg = args[i].as_str();
        let takes_value = VALUE_FLAGS.contains(&arg);
        if flags.contains(&arg) {
            continue;
        }
        out.push(args[i].clone());
        if takes_value {
            if let Some(val) = args.get(i + 1) {
                out.push(val.clone());
            }
        }
    }
    out
}
