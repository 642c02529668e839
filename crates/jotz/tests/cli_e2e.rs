#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use jotzapp::test_utils::{note_input, TestEnv};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn jotz_cmd(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("jotz"));
    cmd.env_remove("JOTZ_CAPACITY")
        .env_remove("JOTZ_LOG")
        .env("JOTZ_DATA", data.as_os_str());
    cmd
}

fn json_out(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_note_lifecycle_workflow() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("store");

    // 1. Create a note from stdin
    let created = json_out(
        jotz_cmd(&data)
            .args(["new", "-t", "work,ideas"])
            .write_stdin("Standup notes\nship the parser\n"),
    );
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Standup notes\nship the parser");
    assert!(data.join("jotz.redb").exists());

    // 2. It shows up in the listing
    jotz_cmd(&data)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id));

    // 3. Edit replaces the content with a patch
    jotz_cmd(&data)
        .args(["edit", &id])
        .write_stdin("Standup notes\nship the parser\nreview PRs\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"history_count\": 2"));

    jotz_cmd(&data)
        .args(["show", &id, "--raw"])
        .assert()
        .success()
        .stdout("Standup notes\nship the parser\nreview PRs\n");

    // 4. Tag search finds it
    let found = json_out(jotz_cmd(&data).args(["search", "--tags", "#ideas", "work"]));
    assert_eq!(found[0]["id"], id.as_str());

    // 5. Trash and purge
    jotz_cmd(&data).args(["delete", &id]).assert().success();
    let active = json_out(jotz_cmd(&data).args(["list"]));
    assert_eq!(active, Value::Array(vec![]));

    let purged = json_out(jotz_cmd(&data).args(["purge", &id]));
    assert_eq!(purged[0]["histories_removed"], 2);

    let status = json_out(jotz_cmd(&data).args(["status"]));
    assert_eq!(status["total_size"], 0);
    assert_eq!(status["note_count"], 0);
}

#[test]
fn test_capacity_error_exits_non_zero() {
    let temp = TempDir::new().unwrap();

    jotz_cmd(temp.path())
        .env("JOTZ_CAPACITY", "8")
        .args(["new", "-t", "big"])
        .write_stdin("more than eight bytes")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Capacity exceeded"));
}

#[test]
fn test_missing_note_reports_not_found() {
    let temp = TempDir::new().unwrap();

    jotz_cmd(temp.path())
        .args(["show", "0000ZZZZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note not found: 0000ZZZZ"));
}

#[test]
fn test_reads_store_written_by_library() {
    let env = TestEnv::new();
    env.engine
        .write()
        .create_note(note_input("seeded by the library\n", &["seed"]))
        .unwrap();
    let TestEnv {
        _temp_dir,
        engine,
        root,
    } = env;
    // release the database lock before the binary opens it
    drop(engine);

    jotz_cmd(&root)
        .args(["tagged", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seeded by the library"));
    drop(_temp_dir);
}

#[test]
fn test_export_file_imports_into_fresh_store() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    let dump = temp.path().join("dump.json");

    jotz_cmd(&first)
        .args(["new", "-t", "travel", "--type", "markdown", "--title", "Packing"])
        .write_stdin("- passport\n- charger\n")
        .assert()
        .success();
    jotz_cmd(&first)
        .args(["export", dump.to_str().unwrap()])
        .assert()
        .success();
    assert!(fs::read_to_string(&dump).unwrap().contains("passport"));

    let imported = json_out(jotz_cmd(&second).args(["import", dump.to_str().unwrap()]));
    assert_eq!(imported[0]["title"], "Packing");
    assert_eq!(imported[0]["note_type"], "Markdown");

    jotz_cmd(&second)
        .args(["search", "--title", "Pack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Packing"));
}

#[test]
fn test_config_file_in_data_dir_is_honoured() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jotz.toml"),
        "title_match = \"case_insensitive\"\n",
    )
    .unwrap();

    jotz_cmd(temp.path())
        .args(["new", "-t", "t", "--title", "Groceries"])
        .write_stdin("milk\n")
        .assert()
        .success();

    let found = json_out(jotz_cmd(temp.path()).args(["search", "--title", "groceries"]));
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[test]
fn test_scans_emit_per_record_trace_events() {
    let temp = TempDir::new().unwrap();

    jotz_cmd(temp.path())
        .args(["new", "-t", "log"])
        .write_stdin("traced\n")
        .assert()
        .success();

    jotz_cmd(temp.path())
        .env("JOTZ_LOG", "jotzapp=trace")
        .args(["tags"])
        .assert()
        .success()
        .stderr(predicate::str::contains("scanning record"));
}
