use predicates::prelude::*;
use serde_json::Value;
use test_support::{monitor_cmd, tempdir};

const NOW: &str = "2025-08-27T12:00:00Z";

fn export(extra: &[&str]) -> Value {
  let td = tempdir();
  let path = td.path().join("patches.json");
  let path_str = path.to_str().unwrap();

  monitor_cmd("basic", NOW)
    .args(["export-json", "-o", path_str])
    .args(extra)
    .assert()
    .success()
    .stdout(predicate::str::contains(format!("to {}", path_str)));

  serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap()
}

#[test]
fn export_reports_engagement_for_each_latest_series() {
  let v = export(&[]);
  let series = v["patch_series"].as_array().unwrap();

  let ids: Vec<i64> = series.iter().map(|s| s["id"].as_i64().unwrap()).collect();
  assert_eq!(ids, vec![103, 105, 101, 102]);

  let statuses: Vec<&str> = series.iter().map(|s| s["engagement"]["status"].as_str().unwrap()).collect();
  assert_eq!(statuses, vec!["NEEDS_REVISION", "ACTIVE_DISCUSSION", "READY", "STALLED"]);

  assert_eq!(v["metadata"]["project"], "rust-for-linux");
  assert_eq!(v["metadata"]["analysis_method"], "engagement_only");
  assert_eq!(v["metadata"]["days_back"], 90);
  assert_eq!(v["metadata"]["total_series"], 4);
  assert!(v["metadata"].get("token_usage").is_none());
  assert!(series.iter().all(|s| s.get("analysis").is_none()));
}

#[test]
fn export_counts_endorsements_and_participants() {
  let v = export(&[]);
  let by_id = |id: i64| v["patch_series"].as_array().unwrap().iter().find(|s| s["id"] == id).unwrap().clone();

  let ready = by_id(101);
  assert_eq!(ready["canonical_name"], "rust: add zpool abstraction");
  assert_eq!(ready["engagement"]["version"], 3);
  assert_eq!(ready["engagement"]["endorsements"]["signed_off_by"], 1);
  assert_eq!(ready["engagement"]["endorsements"]["reviewed_by"], 1);
  // the quoted Acked-by line in the patch body does not count
  assert_eq!(ready["engagement"]["endorsements"]["acked_by"], 1);
  assert_eq!(ready["submitter"]["name"], "Jane Doe");
  assert_eq!(ready["submitter"]["email"], "jane@example.org");

  let active = by_id(105);
  assert_eq!(active["engagement"]["is_resend"], true);
  assert_eq!(active["engagement"]["unique_participants"], 2);
  assert_eq!(active["engagement"]["comment_count"], 3);
  assert_eq!(active["engagement"]["days_since_activity"], 0);

  let stalled = by_id(102);
  assert_eq!(stalled["engagement"]["days_since_posting"], 47);
}

#[test]
fn export_honors_policy_flags() {
  let v = export(&["--include-author-comments", "--min-participants", "4"]);
  let active = v["patch_series"].as_array().unwrap().iter().find(|s| s["id"] == 105).unwrap().clone();
  assert_eq!(active["engagement"]["unique_participants"], 3);
  assert_eq!(active["engagement"]["status"], "UNKNOWN");
}

#[test]
fn export_without_comments_loses_discussion_signals() {
  let v = export(&["--no-comments"]);
  let series = v["patch_series"].as_array().unwrap();
  assert!(series.iter().all(|s| s["engagement"]["comment_count"] == 0));
  let active = series.iter().find(|s| s["id"] == 105).unwrap();
  assert_eq!(active["engagement"]["status"], "UNKNOWN");
}
