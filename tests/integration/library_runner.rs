use clap::Parser;
use patch_monitor::cli::{normalize, Cli, CommandConfig};
use patch_monitor::patchwork::{build_api, FetchOptions};
use patch_monitor::runner::{collect_listings, export_dashboard};
use patch_monitor::Status;
use serial_test::serial;
use std::time::Duration;
use test_support::{init_tracing, patchwork_env};

fn now() -> chrono::DateTime<chrono::Utc> {
  "2025-08-27T12:00:00Z".parse().unwrap()
}

#[test]
#[serial]
fn export_through_library_uses_fixture_backend() {
  init_tracing();
  let _env = patchwork_env("basic");
  let cfg = normalize(Cli::try_parse_from(["patch-monitor", "export-json", "-o", "unused.json"]).unwrap()).unwrap();
  let CommandConfig::ExportJson { ref window, .. } = cfg.command else { panic!("expected ExportJson") };

  let api = build_api(&cfg.base_url, Duration::from_secs(1));
  let export = export_dashboard(api.as_ref(), &cfg, window, FetchOptions::default(), false, now()).unwrap();

  let got: Vec<(i64, Status)> = export.patch_series.iter().map(|s| (s.id, s.engagement.status)).collect();
  assert_eq!(
    got,
    vec![(103, Status::NeedsRevision), (105, Status::ActiveDiscussion), (101, Status::Ready), (102, Status::Stalled)]
  );
}

#[test]
#[serial]
fn fixture_env_is_restored_when_guard_drops() {
  std::env::remove_var("PM_TEST_SERIES_JSON");
  {
    let _env = patchwork_env("basic");
    assert!(std::env::var("PM_TEST_SERIES_JSON").is_ok());

    let cfg = normalize(Cli::try_parse_from(["patch-monitor", "list", "--days", "14"]).unwrap()).unwrap();
    let CommandConfig::List { ref window, .. } = cfg.command else { panic!("expected List") };
    let api = build_api(&cfg.base_url, Duration::from_secs(1));
    let (project, _, listings) = collect_listings(api.as_ref(), &cfg.project, window, now(), false).unwrap();
    assert_eq!(project, "rust-for-linux");
    assert_eq!(listings.len(), 4);
  }
  assert!(std::env::var("PM_TEST_SERIES_JSON").is_err());
}
