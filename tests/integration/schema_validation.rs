use jsonschema::validator_for;
use serde_json::Value;
use test_support::{monitor_cmd, read_schema, tempdir};

const NOW: &str = "2025-08-27T12:00:00Z";

fn validate(v: &Value) {
  let schema = read_schema("dashboard.schema.json");
  let compiled = validator_for(&schema).expect("compile schema");
  if let Err(e) = compiled.validate(v) {
    panic!("dashboard JSON does not match schema: {e}");
  }
}

#[test]
fn export_json_matches_dashboard_schema() {
  let td = tempdir();
  let path = td.path().join("patches.json");

  monitor_cmd("basic", NOW)
    .args(["export-json", "-o", path.to_str().unwrap()])
    .assert()
    .success();

  let v: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  validate(&v);
}

#[test]
fn bulk_dashboard_matches_dashboard_schema() {
  let td = tempdir();
  let web = td.path().join("patches.json");

  monitor_cmd("basic", NOW)
    .env("PM_TEST_ANALYSIS_TEXT", "**Status**: Needs work\n")
    .args([
      "analyze-bulk",
      "--since",
      "2025-08-01",
      "--output-dir",
      td.path().join("reports").to_str().unwrap(),
      "--web-data",
      web.to_str().unwrap(),
    ])
    .assert()
    .success();

  let v: Value = serde_json::from_str(&std::fs::read_to_string(&web).unwrap()).unwrap();
  assert!(v["metadata"].get("days_back").is_none());
  validate(&v);
}

#[test]
fn schema_rejects_unknown_status() {
  let schema = read_schema("dashboard.schema.json");
  let compiled = validator_for(&schema).expect("compile schema");
  let mut v: Value = serde_json::json!({
    "metadata": {
      "generated_at": NOW, "project": "p", "since": NOW,
      "include_applied": false, "total_series": 1, "analysis_method": "engagement_only"
    },
    "patch_series": [{
      "id": 1, "name": "[PATCH] x", "canonical_name": "x", "date": NOW,
      "submitter": { "name": "A", "email": "a@x.org" },
      "total_patches": 1, "web_url": "",
      "engagement": {
        "version": 1, "is_resend": false, "days_since_posting": 0, "days_since_activity": 0,
        "unique_participants": 0, "comment_count": 0, "status": "READY",
        "endorsements": { "signed_off_by": 1, "acked_by": 0, "reviewed_by": 0, "tested_by": 0 }
      }
    }]
  });
  assert!(compiled.validate(&v).is_ok());

  v["patch_series"][0]["engagement"]["status"] = Value::from("MERGED");
  assert!(compiled.validate(&v).is_err());
}
