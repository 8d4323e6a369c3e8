use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn setup_test_directory() -> tempfile::TempDir {
    let dir = tempdir().unwrap();

    fs::create_dir_all(dir.path().join("tree/build/cache")).unwrap();
    fs::write(dir.path().join("tree/build/cache/x"), "cached").unwrap();
    fs::write(dir.path().join("tree/build/out.o"), "object").unwrap();
    fs::write(dir.path().join("tree/a.log"), "log").unwrap();
    fs::write(dir.path().join("tree/notes~"), "backup").unwrap();
    fs::write(dir.path().join("tree/keep.txt"), "keep").unwrap();

    // Rules live outside the tree so they are never matched themselves
    fs::write(
        dir.path().join("clean.rules"),
        "# scratch output\nbuild/\n*.log\n!/build/cache/\n*~\n",
    )
    .unwrap();

    dir
}

fn rulesweep() -> Command {
    Command::cargo_bin("rulesweep").unwrap()
}

#[test]
fn test_print_lists_matches() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("--rules")
        .arg(dir.path().join("clean.rules"))
        .assert()
        .success()
        .stdout(predicate::str::contains("a.log"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("notes~"))
        .stdout(predicate::str::contains("keep.txt").not())
        .stderr(predicate::str::contains("matched 3 of"));

    // Print never touches the filesystem
    assert!(dir.path().join("tree/a.log").exists());
    assert!(dir.path().join("tree/build/out.o").exists());
}

#[test]
fn test_verbose_tags_matches() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("[match]"));
}

#[test]
fn test_quiet_prints_nothing() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_quiet_and_verbose_conflict() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .args(["-q", "-v"])
        .assert()
        .failure();
}

#[test]
fn test_delete_action() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .args(["--action", "delete", "--recursive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removing"));

    assert!(!dir.path().join("tree/build").exists());
    assert!(!dir.path().join("tree/a.log").exists());
    assert!(!dir.path().join("tree/notes~").exists());
    assert!(dir.path().join("tree/keep.txt").exists());
}

#[test]
fn test_delete_with_protect_nested() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .args(["-a", "delete", "-r", "--protect-nested", "-q"])
        .assert()
        .success();

    assert!(dir.path().join("tree/build/cache/x").exists());
    assert!(!dir.path().join("tree/build/out.o").exists());
}

#[test]
fn test_unknown_action_exits_with_config_error() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .args(["--action", "shred"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown action 'shred'"));

    assert!(dir.path().join("tree/a.log").exists());
}

#[test]
fn test_missing_rules_file() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("missing.rules"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.rules"));
}

#[test]
fn test_no_rules_given() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no rules file"));
}

#[test]
fn test_missing_root_exits_with_traversal_error() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("does-not-exist"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = setup_test_directory();
    fs::write(
        dir.path().join("sweep.toml"),
        "rules = \"clean.rules\"\naction = \"delete\"\nquiet = true\n",
    )
    .unwrap();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("--config")
        .arg(dir.path().join("sweep.toml"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(!dir.path().join("tree/a.log").exists());
    assert!(dir.path().join("tree/keep.txt").exists());
}

#[test]
fn test_sizes_in_summary() {
    let dir = setup_test_directory();

    rulesweep()
        .arg(dir.path().join("tree"))
        .arg("-f")
        .arg(dir.path().join("clean.rules"))
        .arg("--sizes")
        .assert()
        .success()
        .stderr(predicate::str::contains("B)"));
}
