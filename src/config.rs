use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const ENV_BASE_URL: &str = "COGNIS_BASE_URL";
pub const ENV_EXPORT_DIR: &str = "COGNIS_EXPORT_DIR";
pub const ENV_LOG: &str = "COGNIS_LOG";

/// Flags that apply to every command and are consumed before dispatch.
pub const GLOBAL_FLAGS: &[&str] = &["--base-url", "--output-dir", "--no-color"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub export_dir: PathBuf,
    pub color: bool,
}

impl Config {
    /// Environment first, then built-in defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            export_dir: non_empty(ENV_EXPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(default_export_dir),
            color: get("NO_COLOR").is_none(),
        }
    }

    /// Command-line flags override the environment.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(url) = crate::cli::get_flag(args, "--base-url") {
            self.base_url = url;
        }
        if let Some(dir) = crate::cli::get_flag(args, "--output-dir") {
            self.export_dir = PathBuf::from(dir);
        }
        if crate::cli::has_flag(args, &["--no-color"]) {
            self.color = false;
        }
    }
}

fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
