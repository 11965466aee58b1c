mod common;

use axum::http::StatusCode;
use common::{cognis, csv_files, events_body, hung_gateway, stub_gateway, summary_body};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout};

const WAIT: Duration = Duration::from_secs(10);

/// An operator session driven over stdin, read line by line from stdout.
struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    seen: String,
}

impl Session {
    fn start(base: &str, export_dir: &Path) -> Self {
        let mut child = cognis(export_dir)
            .args(["dashboard", "--base-url", base])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        let stdin = child.stdin.take();
        let stdout = BufReader::new(child.stdout.take().unwrap()).lines();
        Self {
            child,
            stdin,
            stdout,
            seen: String::new(),
        }
    }

    async fn wait_for(&mut self, needle: &str) {
        let found = tokio::time::timeout(WAIT, async {
            while let Some(line) = self.stdout.next_line().await.unwrap() {
                self.seen.push_str(&line);
                self.seen.push('\n');
                if line.contains(needle) {
                    return true;
                }
            }
            false
        })
        .await;
        assert!(
            matches!(found, Ok(true)),
            "never saw {needle:?}; output so far:\n{}",
            self.seen
        );
    }

    async fn send(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().unwrap();
        stdin.write_all(format!("{line}\n").as_bytes()).await.unwrap();
        stdin.flush().await.unwrap();
    }

    /// Close stdin and wait for the process to exit.
    async fn finish(mut self) -> ExitStatus {
        drop(self.stdin.take());
        tokio::time::timeout(WAIT, async {
            while let Some(line) = self.stdout.next_line().await.unwrap() {
                self.seen.push_str(&line);
                self.seen.push('\n');
            }
        })
        .await
        .expect("session kept writing after quit");
        tokio::time::timeout(WAIT, self.child.wait())
            .await
            .expect("session did not exit after quit")
            .unwrap()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn session_filters_and_exports() {
    let base = stub_gateway(summary_body(), events_body()).await;
    let default_dir = tempfile::tempdir().unwrap();
    let export_dir = tempfile::tempdir().unwrap();

    let mut session = Session::start(&base, default_dir.path());
    // loaded on start: 2 of 3 events are inside the default 7d window
    session.wait_for("(2 of 3)").await;

    session.send("scope task").await;
    session.wait_for("Task events only").await;

    session
        .send(&format!("export {}", export_dir.path().display()))
        .await;
    session.wait_for("exported").await;

    session.send("quit").await;
    assert!(session.finish().await.success());

    assert!(csv_files(default_dir.path()).is_empty());
    let files = csv_files(export_dir.path());
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(&files[0]).unwrap();
    let lines: Vec<&str> = content.split('\n').collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "id,timestamp,type,attributes");
    assert!(lines[1].starts_with("\"e2\","));
}

#[tokio::test(flavor = "multi_thread")]
async fn session_survives_failed_refresh() {
    let base = stub_gateway(
        summary_body(),
        (StatusCode::SERVICE_UNAVAILABLE, "down".to_string()),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::start(&base, dir.path());
    session.wait_for("ERROR").await;
    assert!(session.seen.contains("events failed (503)"));

    session.send("summary").await;
    session.wait_for("no summary loaded yet.").await;

    session.send("export").await;
    session.wait_for("nothing to export").await;

    session.send("quit").await;
    assert!(session.finish().await.success());
    assert!(csv_files(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn session_stays_interactive_while_refresh_hangs() {
    let base = hung_gateway().await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::start(&base, dir.path());
    session.wait_for("refreshing...").await;

    session.send("scope tool").await;
    session.wait_for("Tool events only").await;

    session.send("refresh").await;
    session.wait_for("refresh already in progress.").await;

    session.send("quit").await;
    assert!(session.finish().await.success());
}
