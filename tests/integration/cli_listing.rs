use predicates::prelude::*;
use test_support::monitor_cmd;

const NOW: &str = "2025-08-27T12:00:00Z";

#[test]
fn list_projects_prints_names_and_links() {
  monitor_cmd("basic", NOW)
    .arg("list-projects")
    .assert()
    .success()
    .stdout(predicate::str::contains("Rust for Linux"))
    .stdout(predicate::str::contains("Link: rust-for-linux"))
    .stdout(predicate::str::contains("Link: netdevbpf"));
}

#[test]
fn list_keeps_latest_revision_and_hides_applied() {
  let out = monitor_cmd("basic", NOW).args(["list", "--days", "14"]).output().unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let s = String::from_utf8_lossy(&out.stdout);

  assert!(s.starts_with("Found 4 patch series (last 14 days):"));
  assert!(s.contains("[PATCH v3 0/2] rust: add zpool abstraction"));
  assert!(!s.contains("[PATCH v2 0/2] rust: add zpool abstraction"));
  assert!(!s.contains("GIT PULL"));
  assert!(s.contains("By: Dan Driver on 2025-08-22 | v2 RESEND | Patches: 1"));
}

#[test]
fn list_all_revisions_and_applied() {
  let out = monitor_cmd("basic", NOW)
    .args(["list", "--days", "30", "--all-revisions", "--include-applied"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let s = String::from_utf8_lossy(&out.stdout);

  assert!(s.starts_with("Found 6 patch series (last 30 days):"));
  assert!(s.contains("[PATCH v2 0/2] rust: add zpool abstraction"));
  assert!(s.contains("[GIT PULL] Rust for 6.17"));
}

#[test]
fn list_accepts_since_phrase() {
  monitor_cmd("basic", NOW)
    .args(["list", "--since", "2025-08-21"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Found 3 patch series (since 2025-08-21):"));
}

#[test]
fn debug_recent_shows_titles_across_projects() {
  let out = monitor_cmd("basic", NOW).args(["debug-recent", "--limit", "2"]).output().unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let s = String::from_utf8_lossy(&out.stdout);

  assert!(s.starts_with("Recent patch series (showing titles for debugging):"));
  assert!(s.contains(" 1. [PATCH] rust: fix typo in alloc docs\n    Date: 2025-08-25 | Project: Rust for Linux"));
  assert!(s.contains(" 2. [GIT PULL] Rust for 6.17"));
  assert!(!s.contains(" 3. "));
}

#[test]
fn debug_recent_is_hidden_from_help() {
  monitor_cmd("basic", NOW)
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("export-json"))
    .stdout(predicate::str::contains("debug-recent").not());
}
