use crate::models::AuditEvent;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FILE_PREFIX: &str = "cognis-audit-";

#[cfg(unix)]
const EXPORT_MODE: u32 = 0o644;

const HEADER: [&str; 4] = ["id", "timestamp", "type", "attributes"];

/// Quote a field and double any embedded quotes. No other escaping.
pub fn csv_cell(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// Render the compliance CSV. `None` when there is nothing to export.
///
/// Rows are joined by `\n` with no trailing newline.
pub fn render_csv(events: &[&AuditEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(HEADER.join(","));
    for e in events {
        let attrs = e.attributes_json();
        let row = [
            e.id.as_str(),
            e.timestamp.as_str(),
            e.kind.as_str(),
            attrs.as_str(),
        ]
        .map(csv_cell)
        .join(",");
        lines.push(row);
    }
    Some(lines.join("\n"))
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{FILE_PREFIX}{}.csv", now.timestamp_millis())
}

/// Write the CSV for `events` into `dir` and return the final path.
///
/// The document goes through a temporary file in `dir` that is renamed
/// into place. The temporary handle never outlives this call; on any error
/// it is dropped and the partial file removed.
pub fn export_csv(
    events: &[&AuditEvent],
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    let Some(doc) = render_csv(events) else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;
    let dest = dir.join(export_file_name(now));

    let mut tmp = tempfile::Builder::new()
        .prefix(".cognis-audit-")
        .suffix(".csv.part")
        .tempfile_in(dir)
        .context("creating temporary export file")?;
    tmp.write_all(doc.as_bytes())
        .context("writing export document")?;
    tmp.flush().context("flushing export document")?;
    #[cfg(unix)]
    {
        // tempfile creates 0600; the export is an ordinary document
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(EXPORT_MODE))
            .context("setting export file permissions")?;
    }
    tmp.persist(&dest)
        .map_err(|e| e.error)
        .with_context(|| format!("moving export into place at {}", dest.display()))?;

    tracing::info!(path = %dest.display(), rows = events.len(), "audit export written");
    Ok(Some(dest))
}
