//! End-to-end tests against the built binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use rstest::rstest;
use tempfile::TempDir;

const FEED: &str = "<rss><channel><title>Feed</title><item><title>First</title></item><item><title>Second</title></item><item><title>Third</title></item></channel></rss>";

fn feedsift(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_feedsift"))
        .args(args)
        .arg("--color")
        .arg("never")
        .current_dir(dir)
        // keep the user's config and env out of the run
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("HOME", dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary should start");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn setup() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("feed.xml"), FEED).unwrap();
    temp
}

#[test]
fn given_answers_on_stdin_when_run_then_writes_pruned_output() {
    let temp = setup();

    let out = feedsift(temp.path(), &["feed.xml", "out.xml"], "y\nmaybe\nn\nY\n");

    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Title: First"));
    assert!(stdout.contains("Keeping item"));
    assert!(stdout.contains("Flagging item for removal"));
    // the invalid answer re-prompts for the same item
    assert_eq!(stdout.matches("  > y to keep, n to delete: ").count(), 4);

    let written = fs::read_to_string(temp.path().join("out.xml")).unwrap();
    assert!(written.contains("First"));
    assert!(!written.contains("Second"));
    assert!(written.contains("Third"));
}

#[test]
fn given_stdin_closed_early_when_run_then_progress_saved() {
    let temp = setup();

    let out = feedsift(temp.path(), &["feed.xml", "out.xml"], "n\n");

    assert_eq!(out.status.code(), Some(0));
    let written = fs::read_to_string(temp.path().join("out.xml")).unwrap();
    assert!(!written.contains("First"));
    assert!(written.contains("Second"));
    assert!(written.contains("Third"));
}

#[test]
fn given_existing_output_when_run_then_exits_cantcreat_and_keeps_file() {
    let temp = setup();
    fs::write(temp.path().join("out.xml"), "precious").unwrap();

    let out = feedsift(temp.path(), &["feed.xml", "out.xml"], "y\ny\ny\n");

    assert_eq!(out.status.code(), Some(73));
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
    assert_eq!(
        fs::read_to_string(temp.path().join("out.xml")).unwrap(),
        "precious"
    );
}

#[rstest]
#[case::missing_input(&["missing.xml", "out.xml"], 66)]
#[case::missing_keep_list(&["feed.xml", "out.xml", "--keep-titles", "none.txt"], 66)]
#[case::missing_config(&["feed.xml", "out.xml", "--config", "none.toml"], 78)]
#[case::bad_threshold(&["feed.xml", "out.xml", "--threshold", "150"], 64)]
fn given_bad_invocation_when_run_then_exits_with_code(
    #[case] args: &[&str],
    #[case] expected: i32,
) {
    let temp = setup();

    let out = feedsift(temp.path(), args, "");

    assert_eq!(out.status.code(), Some(expected));
    assert!(!temp.path().join("out.xml").exists());
}

#[test]
fn given_malformed_input_when_run_then_exits_dataerr() {
    let temp = setup();
    fs::write(temp.path().join("bad.xml"), "<rss><channel></rss>").unwrap();

    let out = feedsift(temp.path(), &["bad.xml", "out.xml"], "");

    assert_eq!(out.status.code(), Some(65));
    assert!(!temp.path().join("out.xml").exists());
}

#[test]
fn given_invalid_utf8_input_when_run_then_exits_dataerr() {
    let temp = setup();
    fs::write(temp.path().join("bad.xml"), b"<rss><title>\xFF</title></rss>").unwrap();

    let out = feedsift(temp.path(), &["bad.xml", "out.xml"], "");

    assert_eq!(out.status.code(), Some(65));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not valid UTF-8"));
}
