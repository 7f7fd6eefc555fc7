use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const NOW: &str = "2024-06-15T12:00:00";

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/findings.json")
}

fn agingscope_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agingscope"));
    cmd.current_dir(workdir);
    cmd.env_remove("AGINGSCOPE_NOW");
    cmd
}

fn run(workdir: &Path, args: &[&str]) -> Output {
    agingscope_cmd(workdir)
        .args(args)
        .output()
        .expect("run agingscope")
}

fn assert_exit(out: &Output, code: i32) {
    assert_eq!(
        out.status.code(),
        Some(code),
        "stdout={:?} stderr={:?}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn markdown_report_is_written_to_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = fixture();
    let report = dir.path().join("aging.md");

    let out = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--output",
            report.to_str().unwrap(),
        ],
    );
    assert_exit(&out, 0);

    let markdown = std::fs::read_to_string(&report).expect("read report");
    assert!(markdown.contains("# Aging Report"));
    assert!(markdown.contains("2024-06-15 12:00:00"));
    assert!(markdown.contains("FND-0001"));
    assert!(markdown.contains("46 days overdue"));
    assert!(markdown.contains("## Skipped Records"));
    assert!(markdown.contains("FND-0006"));
}

#[test]
fn json_report_carries_summary_figures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = fixture();

    let out = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--format",
            "json",
            "--stdout",
            "--quiet",
        ],
    );
    assert_exit(&out, 0);

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is a JSON report");
    let summary = &report["analytics"]["summary"];
    assert_eq!(summary["total"], 5);
    assert_eq!(summary["open"], 4);
    assert_eq!(summary["resolved"], 1);
    assert_eq!(summary["overdue"], 1);
    assert_eq!(summary["due_soon"], 1);
    assert_eq!(summary["critical_aging"], 1);
    assert_eq!(report["metadata"]["items_skipped"], 1);
    assert_eq!(report["items"]["filters"], "");
    assert_eq!(report["analytics"]["daily"].as_array().unwrap().len(), 30);
    assert_eq!(report["analytics"]["weekly"].as_array().unwrap().len(), 12);
}

#[test]
fn filters_narrow_the_item_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = fixture();

    let out = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--format",
            "json",
            "--stdout",
            "--quiet",
            "--timeline",
            "due-soon",
        ],
    );
    assert_exit(&out, 0);

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    let items = report["items"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "FND-0002");
    assert_eq!(report["items"]["total_items"], 1);
    assert_eq!(report["items"]["filters"], "timeline Due Soon");
}

#[test]
fn fail_on_overdue_exits_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = fixture();

    let out = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--stdout",
            "--quiet",
            "--fail-on-overdue",
        ],
    );
    assert_exit(&out, 2);

    // Nothing is overdue before the first due date passes
    let out = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--now",
            "2024-04-01",
            "--stdout",
            "--quiet",
            "--fail-on-overdue",
        ],
    );
    assert_exit(&out, 0);
}

#[test]
fn strict_mode_fails_on_malformed_timestamp() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = fixture();

    let out = run(
        dir.path(),
        &[
            "--input",
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--stdout",
            "--strict",
        ],
    );
    assert_exit(&out, 1);
    assert!(String::from_utf8_lossy(&out.stderr).contains("Malformed timestamp"));
}

#[test]
fn unparseable_now_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = fixture();

    let out = run(
        dir.path(),
        &["--input", input.to_str().unwrap(), "--now", "someday"],
    );
    assert_exit(&out, 1);
}

#[test]
fn init_config_writes_defaults_once() {
    let dir = tempfile::tempdir().expect("tempdir");

    let out = run(dir.path(), &["--init-config"]);
    assert_exit(&out, 0);

    let written = std::fs::read_to_string(dir.path().join(".agingscope.toml")).expect("config");
    assert!(written.contains("[analysis]"));

    let out = run(dir.path(), &["--init-config"]);
    assert_exit(&out, 1);
}
