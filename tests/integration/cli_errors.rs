use predicates::prelude::*;
use test_support::monitor_cmd;

const NOW: &str = "2025-08-27T12:00:00Z";

#[test]
fn errors_without_subcommand() {
  monitor_cmd("basic", NOW)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Provide a subcommand"));
}

#[test]
fn errors_on_conflicting_window_flags() {
  monitor_cmd("basic", NOW)
    .args(["list", "--days", "7", "--since", "last monday"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Ambiguous window: choose only one of --days | --since"));
}

#[test]
fn errors_on_unknown_timezone() {
  monitor_cmd("basic", NOW)
    .args(["list", "--tz", "Mars/Olympus"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid --tz"));
}

#[test]
fn analyze_without_key_names_the_env_var() {
  monitor_cmd("basic", NOW)
    .args(["analyze", "--series", "101"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn analyze_unknown_series_fails() {
  monitor_cmd("basic", NOW)
    .args(["analyze", "--series", "999", "--prompt-only"])
    .assert()
    .failure();
}

#[test]
fn errors_on_out_of_range_days() {
  monitor_cmd("basic", NOW)
    .args(["export-json", "-o", "unused.json", "--days", "100000000"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--days 100000000 is out of range"));
}
