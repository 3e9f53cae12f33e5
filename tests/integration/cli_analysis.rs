use predicates::prelude::*;
use test_support::{monitor_cmd, tempdir};

const NOW: &str = "2025-08-27T12:00:00Z";
const BRIEF: &str = "# Executive Brief\n\n**Status**: Ready to merge\n\nLooks settled.\n";

#[test]
fn analyze_prompt_only_prints_patchset_context() {
  let out = monitor_cmd("basic", NOW)
    .args(["analyze", "--series", "101", "--prompt-only"])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let s = String::from_utf8_lossy(&out.stdout);

  assert!(s.contains("<title>[PATCH v3 0/2] rust: add zpool abstraction</title>"));
  assert!(s.contains("<current_version>3</current_version>"));
  assert!(s.contains("<computed_status>Ready</computed_status>"));
  assert!(s.contains("Acked-by: Bob Acker <bob@example.org>"));
}

#[test]
fn analyze_writes_report_to_output_file() {
  let td = tempdir();
  let path = td.path().join("brief.md");

  monitor_cmd("basic", NOW)
    .env("PM_TEST_ANALYSIS_TEXT", BRIEF)
    .args(["analyze", "--series", "105", "-o", path.to_str().unwrap()])
    .assert()
    .success()
    .stdout(predicate::str::contains("Analysis saved to"));

  let md = std::fs::read_to_string(&path).unwrap();
  assert!(md.starts_with("# Analysis: [PATCH v2 RESEND 0/3] rust: pci: add driver helpers"));
  assert!(md.contains("**Version**: v2 (RESEND)"));
  assert!(md.contains("Looks settled."));
}

#[test]
fn bulk_writes_reports_summary_and_dashboard() {
  let td = tempdir();
  let reports = td.path().join("reports");
  let web = td.path().join("web").join("patches.json");

  let out = monitor_cmd("basic", NOW)
    .env("PM_TEST_ANALYSIS_TEXT", BRIEF)
    .args([
      "analyze-bulk",
      "--days",
      "14",
      "--summary-report",
      "--output-dir",
      reports.to_str().unwrap(),
      "--web-data",
      web.to_str().unwrap(),
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(stdout.contains("Analyzed: 3/4 series"));
  assert!(stdout.contains("Failed: 1 series"));

  let day = reports.join("2025-08-27");
  for id in [101, 103, 105] {
    assert!(day.join(format!("series-{}.md", id)).exists(), "missing report for {}", id);
  }
  assert!(!day.join("series-106.md").exists());

  let summary = std::fs::read_to_string(day.join("summary.md")).unwrap();
  assert!(summary.contains("Last 14 days"));
  assert!(summary.contains("rust: bindings: regenerate"));

  let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&web).unwrap()).unwrap();
  assert_eq!(v["metadata"]["analysis_method"], "claude_bulk");
  assert_eq!(v["metadata"]["total_series"], 3);
  assert_eq!(v["metadata"]["days_back"], 14);
  assert!(v["metadata"]["token_usage"]["input_tokens"].as_u64().unwrap() > 0);
  let statuses: Vec<&str> = v["patch_series"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["analysis"]["status"].as_str().unwrap())
    .collect();
  assert_eq!(statuses, vec!["Ready to merge"; 3]);
}
