//! Integration tests for the PwdSync CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master password comes from `PWDSYNC_PASSWORD` so nothing prompts, and
//! each test gets its own pwdsync directory with cheap Argon2 settings.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "hunter2-hunter2";

const FAST_CONFIG: &str = "\
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
clipboard_timeout = 1
";

/// Helper: get a Command pointing at the pwdsync binary.
fn pwdsync() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pwdsync").expect("binary should exist");
    cmd.env_remove("PWDSYNC_DIR")
        .env_remove("PWDSYNC_OTHER_PASSWORD")
        .env_remove("PWDSYNC_LOG");
    cmd
}

/// A pwdsync directory with a fast config and an initialized password file.
fn initialized() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), FAST_CONFIG).unwrap();

    run(&dir, &["init"]).success();
    (tmp, dir)
}

fn run(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    pwdsync()
        .arg("--dir")
        .arg(dir)
        .args(args)
        .env("PWDSYNC_PASSWORD", PASSWORD)
        .write_stdin("")
        .assert()
}

fn add(dir: &Path, path: &str, user: &str, secret: &str) {
    run(dir, &["add", path, "--username", user, "--value", secret]).success();
}

// ---------------------------------------------------------------------------
// Basics
// ---------------------------------------------------------------------------

#[test]
fn help_flag_lists_commands() {
    pwdsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merges divergent copies"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("edit"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn version_flag_shows_version() {
    pwdsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pwdsync"));
}

#[test]
fn no_args_shows_usage() {
    pwdsync()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn completions_bash_mentions_binary() {
    pwdsync()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pwdsync"));
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_password_file() {
    let (_tmp, dir) = initialized();
    assert!(dir.join("passwords").exists());
    // Pre-existing config is left alone.
    assert_eq!(
        fs::read_to_string(dir.join("config.toml")).unwrap(),
        FAST_CONFIG
    );
}

#[test]
fn init_twice_fails() {
    let (_tmp, dir) = initialized();
    run(&dir, &["init"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), FAST_CONFIG).unwrap();
    pwdsync()
        .arg("--dir")
        .arg(tmp.path())
        .arg("init")
        .env("PWDSYNC_PASSWORD", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    assert!(!tmp.path().join("passwords").exists());
}

#[test]
fn commands_on_missing_file_fail() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["list"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// Add / show / edit / list / search
// ---------------------------------------------------------------------------

#[test]
fn add_then_show_prints_secret() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "s3cret");

    run(&dir, &["show", "work/mail"])
        .success()
        .stdout(predicate::str::contains("s3cret"));
}

#[test]
fn add_reads_secret_from_stdin() {
    let (_tmp, dir) = initialized();
    pwdsync()
        .arg("--dir")
        .arg(&dir)
        .args(["add", "bank", "--username", "eve"])
        .env("PWDSYNC_PASSWORD", PASSWORD)
        .write_stdin("piped-secret\n")
        .assert()
        .success();

    run(&dir, &["show", "bank"])
        .success()
        .stdout(predicate::str::diff("piped-secret\n"));
}

#[test]
fn show_with_wrong_password_fails() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "s3cret");

    pwdsync()
        .arg("--dir")
        .arg(&dir)
        .args(["show", "work/mail"])
        .env("PWDSYNC_PASSWORD", "not-the-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));
}

#[test]
fn show_missing_entry_fails() {
    let (_tmp, dir) = initialized();
    run(&dir, &["show", "work/nothing"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn add_no_overwrite_refuses_duplicates() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "one");
    run(
        &dir,
        &[
            "add",
            "work/mail",
            "--username",
            "eve",
            "--value",
            "two",
            "--no-overwrite",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("already exists"));

    run(&dir, &["show", "work/mail"])
        .success()
        .stdout(predicate::str::contains("one"));
}

#[test]
fn add_over_category_is_rejected() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail/inbox", "bob", "x");
    run(&dir, &["add", "work/mail", "--username", "bob", "--value", "y"])
        .failure()
        .stderr(predicate::str::contains("both a category and a password entry"));
}

#[test]
fn edit_updates_username() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "s3cret");
    run(&dir, &["edit", "work/mail", "username", "robert"]).success();

    run(&dir, &["search", "mail"])
        .success()
        .stdout(predicate::str::contains("robert"))
        .stdout(predicate::str::contains("work/mail"));
}

#[test]
fn edit_unknown_field_fails() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "s3cret");
    run(&dir, &["edit", "work/mail", "color", "blue"])
        .failure()
        .stderr(predicate::str::contains("Invalid field"));
}

#[test]
fn list_prints_nested_tree() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "a");
    add(&dir, "home/bank", "eve", "b");

    run(&dir, &["list"])
        .success()
        .stdout(predicate::str::contains("work"))
        .stdout(predicate::str::contains("    mail\t\tbob"))
        .stdout(predicate::str::contains("    bank\t\teve"));

    run(&dir, &["list", "home"])
        .success()
        .stdout(predicate::str::contains("bank"))
        .stdout(predicate::str::contains("mail").not());
}

#[test]
fn list_does_not_print_secrets() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "very-secret-value");
    run(&dir, &["list"])
        .success()
        .stdout(predicate::str::contains("very-secret-value").not());
}

#[test]
fn history_shows_adds_and_masks_secret_edits() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "s3cret");
    run(&dir, &["edit", "work/mail", "password", "n3w-secret"]).success();

    run(&dir, &["history"])
        .success()
        .stdout(predicate::str::contains("ADD"))
        .stdout(predicate::str::contains("EDIT"))
        .stdout(predicate::str::contains("n3w-secret").not());
}

#[test]
fn file_flag_overrides_configured_location() {
    let (tmp, dir) = initialized();
    let other = tmp.path().join("elsewhere");

    run(&dir, &["--file", other.to_str().unwrap(), "init"]).success();
    assert!(other.exists());
    add(&dir, "work/mail", "bob", "x");

    run(&dir, &["--file", other.to_str().unwrap(), "list"])
        .success()
        .stdout(predicate::str::contains("mail").not());
}

// ---------------------------------------------------------------------------
// Merge / passwd
// ---------------------------------------------------------------------------

#[test]
fn merge_combines_two_copies() {
    let (_tmp_a, a) = initialized();
    let (_tmp_b, b) = initialized();
    add(&a, "personal/bank", "me", "one");
    add(&b, "personal/bank2", "me", "two");

    let other = b.join("passwords");
    let other_before = fs::read(&other).unwrap();

    run(&a, &["merge", other.to_str().unwrap()])
        .success()
        .stdout(predicate::str::contains("1 new operation"));

    run(&a, &["list", "personal"])
        .success()
        .stdout(predicate::str::contains("bank\t\tme"))
        .stdout(predicate::str::contains("bank2\t\tme"));

    assert_eq!(fs::read(&other).unwrap(), other_before);
}

#[test]
fn merge_with_separate_password() {
    let (_tmp_a, a) = initialized();
    let tmp_b = TempDir::new().unwrap();
    fs::write(tmp_b.path().join("config.toml"), FAST_CONFIG).unwrap();
    let other_password = "another-long-password";
    pwdsync()
        .arg("--dir")
        .arg(tmp_b.path())
        .arg("init")
        .env("PWDSYNC_PASSWORD", other_password)
        .assert()
        .success();

    let other = tmp_b.path().join("passwords");
    run(&a, &["merge", other.to_str().unwrap()]).failure();

    pwdsync()
        .arg("--dir")
        .arg(&a)
        .args(["merge", other.to_str().unwrap(), "--other-password"])
        .env("PWDSYNC_PASSWORD", PASSWORD)
        .env("PWDSYNC_OTHER_PASSWORD", other_password)
        .assert()
        .success();
}

#[test]
fn passwd_keeps_entries() {
    let (_tmp, dir) = initialized();
    add(&dir, "work/mail", "bob", "s3cret");
    run(&dir, &["passwd"]).success();

    run(&dir, &["show", "work/mail"])
        .success()
        .stdout(predicate::str::contains("s3cret"));
}
