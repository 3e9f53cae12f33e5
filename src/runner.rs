// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate subcommands: list, analyze one series, bulk analysis with reports, dashboard export
// role: processing/orchestrator
// inputs: EffectiveConfig; &dyn PatchworkApi; optional &dyn Summarizer; effective now
// outputs: Text on stdout; series-<id>.md, summary.md, dashboard JSON on disk
// side_effects: Tracker and model calls through their seams; creates directories; writes files; prints
// invariants:
// - Fetching is sequential; engagement analysis of independent series runs on rayon
// - Bulk runs never abort on one series; failures are recorded with a reason and reported
// - Only the newest revision of a series is processed unless all_revisions
// - Reports use the same `now` for every series in a run
// errors: Project resolution and listing failures abort the command; per-series failures are recorded
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cli::{AnalysisConfig, CommandConfig, EffectiveConfig, WindowConfig};
use crate::engagement::analyze;
use crate::model::{Series, SeriesReport, TokenUsage};
use crate::patchwork::{
  build_api, fetch_recent_series, fetch_series, find_listing, latest_titles, list_projects, resolve_project, FetchOptions,
  PatchworkApi, SeriesListing,
};
use crate::policy::EngagementPolicy;
use crate::render::{
  dashboard_series, series_filename, series_markdown, summary_markdown, write_json, write_text, BulkFailure,
  BulkSuccess, DashboardExport, DashboardMetadata, SummaryContext,
};
use crate::series_name::{latest_revisions, normalize};
use crate::summarize::{build_prompt, build_summarizer, PromptOptions, Summarizer};
use crate::util::{date_in_tz, effective_now, prepare_out_dir};
use crate::window::{parse_now_override, resolve_window, ResolvedWindow};

/// Listings for a window, resolved against the tracker and deduplicated by revision.
pub fn collect_listings(
  api: &dyn PatchworkApi,
  project: &str,
  window: &WindowConfig,
  now: DateTime<Utc>,
  all_revisions: bool,
) -> Result<(String, ResolvedWindow, Vec<SeriesListing>)> {
  let resolved = resolve_window(&window.spec, now)?;
  let project_id = resolve_project(api, project)?;
  let recent = fetch_recent_series(api, &project_id, resolved.cutoff, window.include_applied)?;
  let count = recent.series.len();

  let listings = if all_revisions {
    recent.series
  } else {
    latest_revisions(recent.series, |s| (s.name.as_str(), s.date))
  };
  info!(project = %project_id, found = count, kept = listings.len(), "listed series");

  Ok((project_id, resolved, listings))
}

/// Analyze fetched series in parallel; each result pairs with its series.
pub fn analyze_all(
  series: Vec<Series>,
  now: DateTime<Utc>,
  policy: &EngagementPolicy,
) -> Vec<(Series, Result<SeriesReport, String>)> {
  series
    .into_par_iter()
    .map(|s| {
      let report = analyze(&s, now, policy)
        .map(|e| SeriesReport::new(&s, e, now))
        .map_err(|e| e.to_string());
      (s, report)
    })
    .collect()
}

pub fn list_projects_text(api: &dyn PatchworkApi) -> Result<String> {
  let projects = list_projects(api)?;
  let mut out = String::from("All available projects on this Patchwork instance:\n\n");

  for (i, p) in projects.iter().enumerate() {
    let _ = writeln!(out, "{:3}. {}\n     Link: {}\n", i + 1, p.name, p.link_name);
  }

  Ok(out)
}

pub fn debug_recent_text(api: &dyn PatchworkApi, limit: usize) -> Result<String> {
  let titles = latest_titles(api, limit)?;
  let mut out = String::from("Recent patch series (showing titles for debugging):\n\n");

  for (i, t) in titles.iter().enumerate() {
    let _ = writeln!(out, "{:2}. {}\n    Date: {} | Project: {}\n", i + 1, t.name, t.date, t.project);
  }

  Ok(out)
}

pub fn list_text(listings: &[SeriesListing], window: &ResolvedWindow, tz: &str) -> String {
  let mut out = format!("Found {} patch series ({}):\n\n", listings.len(), window.label.to_lowercase());

  for (i, s) in listings.iter().enumerate() {
    let name = normalize(&s.name);
    let submitter = if s.submitter_name.is_empty() { "Unknown" } else { s.submitter_name.as_str() };
    let resend = if name.is_resend { " RESEND" } else { "" };
    let _ = writeln!(out, "{:2}. {}", i + 1, s.name);
    let _ = writeln!(out, "    By: {} on {} | v{}{} | Patches: {}", submitter, date_in_tz(s.date, tz), name.version, resend, s.total);
    let _ = writeln!(out, "    URL: {}\n", s.web_url);
  }

  out
}

fn fetch_options(a: &AnalysisConfig) -> FetchOptions {
  FetchOptions { max_patches: a.max_patches, include_comments: a.include_comments }
}

fn prompt_options(a: &AnalysisConfig) -> PromptOptions {
  PromptOptions { max_patches: a.max_patches, max_patch_chars: a.max_patch_chars, include_comments: a.include_comments }
}

/// Single-series analysis. Returns the prompt when `summarizer` is None, otherwise the rendered report.
pub fn analyze_one(
  api: &dyn PatchworkApi,
  cfg: &EffectiveConfig,
  series_id: i64,
  window: &WindowConfig,
  analysis: &AnalysisConfig,
  summarizer: Option<&dyn Summarizer>,
  now: DateTime<Utc>,
) -> Result<String> {
  let (_, _, listings) = collect_listings(api, &cfg.project, window, now, true)?;
  let listing = find_listing(&listings, series_id)?;

  info!(series = listing.id, name = %listing.name, "fetching patches");
  let series = fetch_series(api, listing, fetch_options(analysis))?;
  let summary = analyze(&series, now, &cfg.policy)?;
  let report = SeriesReport::new(&series, summary, now);
  let prompt = build_prompt(&series, &report, &prompt_options(analysis));

  let Some(summarizer) = summarizer else {
    return Ok(prompt);
  };

  let result = summarizer.summarize(&prompt)?;
  Ok(series_markdown(&report, &result.text, now, &cfg.tz))
}

#[derive(Debug, Default)]
pub struct BulkOutcome {
  pub successes: Vec<BulkSuccess>,
  pub failures: Vec<BulkFailure>,
  pub attempted: usize,
  pub usage: TokenUsage,
  pub report_dir: PathBuf,
}

/// Bulk run: fetch, analyze, summarize and write one report per series.
pub fn analyze_bulk(
  api: &dyn PatchworkApi,
  summarizer: &dyn Summarizer,
  cfg: &EffectiveConfig,
  window: &WindowConfig,
  analysis: &AnalysisConfig,
  max_series: usize,
  output_dir: &str,
  now: DateTime<Utc>,
) -> Result<(BulkOutcome, ResolvedWindow)> {
  let (_, resolved, listings) = collect_listings(api, &cfg.project, window, now, false)?;
  let selected: Vec<SeriesListing> = listings.into_iter().take(max_series).collect();
  info!(selected = selected.len(), "analyzing top series");

  let report_dir = prepare_out_dir(output_dir, now)?;
  let mut outcome = BulkOutcome { attempted: selected.len(), report_dir: report_dir.clone(), ..BulkOutcome::default() };

  let mut fetched = Vec::new();
  for (i, listing) in selected.iter().enumerate() {
    info!("[{}/{}] fetching {}", i + 1, selected.len(), listing.name);
    match fetch_series(api, listing, fetch_options(analysis)) {
      Ok(s) => fetched.push(s),
      Err(e) => {
        warn!(series = listing.id, "fetch failed: {:#}", e);
        outcome.failures.push(BulkFailure { id: listing.id, name: listing.name.clone(), reason: format!("{:#}", e) });
      }
    }
  }

  for (series, report) in analyze_all(fetched, now, &cfg.policy) {
    let report = match report {
      Ok(r) => r,
      Err(reason) => {
        outcome.failures.push(BulkFailure { id: series.id, name: series.raw_name.clone(), reason });
        continue;
      }
    };

    let prompt = build_prompt(&series, &report, &prompt_options(analysis));
    match summarizer.summarize(&prompt) {
      Ok(result) => {
        outcome.usage += result.usage;
        let file = series_filename(series.id);
        match write_text(&report_dir.join(&file), &series_markdown(&report, &result.text, now, &cfg.tz)) {
          Ok(()) => outcome.successes.push(BulkSuccess { report, analysis: result.text, file }),
          Err(e) => {
            warn!(series = series.id, "report not written: {:#}", e);
            outcome.failures.push(BulkFailure { id: series.id, name: series.raw_name.clone(), reason: format!("{:#}", e) });
          }
        }
      }
      Err(e) => {
        warn!(series = series.id, "analysis failed: {:#}", e);
        outcome.failures.push(BulkFailure { id: series.id, name: series.raw_name.clone(), reason: format!("{:#}", e) });
      }
    }
  }

  Ok((outcome, resolved))
}

fn metadata(
  project: &str,
  window: &ResolvedWindow,
  include_applied: bool,
  total: usize,
  method: &str,
  usage: Option<TokenUsage>,
  now: DateTime<Utc>,
) -> DashboardMetadata {
  DashboardMetadata {
    generated_at: now.to_rfc3339(),
    project: project.to_string(),
    since: window.cutoff.to_rfc3339(),
    days_back: window.days_back,
    include_applied,
    total_series: total,
    analysis_method: method.to_string(),
    token_usage: usage,
  }
}

pub fn bulk_dashboard(cfg: &EffectiveConfig, outcome: &BulkOutcome, window: &ResolvedWindow, now: DateTime<Utc>) -> DashboardExport {
  let patch_series: Vec<_> = outcome.successes.iter().map(|s| dashboard_series(&s.report, Some(&s.analysis))).collect();

  DashboardExport {
    metadata: metadata(&cfg.project, window, false, patch_series.len(), "claude_bulk", Some(outcome.usage), now),
    patch_series,
  }
}

/// Engagement-only dashboard export; series that cannot be fetched or analyzed are left out.
pub fn export_dashboard(
  api: &dyn PatchworkApi,
  cfg: &EffectiveConfig,
  window: &WindowConfig,
  opts: FetchOptions,
  all_revisions: bool,
  now: DateTime<Utc>,
) -> Result<DashboardExport> {
  let (_, resolved, listings) = collect_listings(api, &cfg.project, window, now, all_revisions)?;

  let mut fetched = Vec::new();
  for listing in &listings {
    match fetch_series(api, listing, opts) {
      Ok(s) => fetched.push(s),
      Err(e) => warn!(series = listing.id, "skipping series: {:#}", e),
    }
  }

  let mut patch_series = Vec::new();
  for (series, report) in analyze_all(fetched, now, &cfg.policy) {
    match report {
      Ok(r) => patch_series.push(dashboard_series(&r, None)),
      Err(reason) => warn!(series = series.id, "skipping series: {}", reason),
    }
  }

  Ok(DashboardExport {
    metadata: metadata(&cfg.project, &resolved, window.include_applied, patch_series.len(), "engagement_only", None, now),
    patch_series,
  })
}

pub fn run(cfg: &EffectiveConfig) -> Result<()> {
  let now = effective_now(parse_now_override(cfg.now_override.as_deref())?);
  let api = build_api(&cfg.base_url, Duration::from_secs(cfg.timeout_secs));

  match &cfg.command {
    CommandConfig::ListProjects => {
      print!("{}", list_projects_text(api.as_ref())?);
    }
    CommandConfig::DebugRecent { limit } => {
      print!("{}", debug_recent_text(api.as_ref(), *limit)?);
    }
    CommandConfig::List { window, all_revisions } => {
      let (_, resolved, listings) = collect_listings(api.as_ref(), &cfg.project, window, now, *all_revisions)?;
      print!("{}", list_text(&listings, &resolved, &cfg.tz));
    }
    CommandConfig::Analyze { series, window, analysis, prompt_only, output } => {
      let summarizer = if *prompt_only { None } else { Some(build_summarizer(analysis.api_key.as_deref(), &analysis.model)?) };
      let text = analyze_one(api.as_ref(), cfg, *series, window, analysis, summarizer.as_deref(), now)?;

      match output {
        Some(path) => {
          write_text(Path::new(path), &text)?;
          println!("Analysis saved to {}", path);
        }
        None => print!("{}", text),
      }
    }
    CommandConfig::AnalyzeBulk { window, analysis, max_series, output_dir, summary_report, web_data, .. } => {
      let summarizer = build_summarizer(analysis.api_key.as_deref(), &analysis.model)?;
      let (outcome, resolved) =
        analyze_bulk(api.as_ref(), summarizer.as_ref(), cfg, window, analysis, *max_series, output_dir, now)?;

      if *summary_report {
        let ctx = SummaryContext {
          project: &cfg.project,
          generated: now,
          period: &resolved.label,
          attempted: outcome.attempted,
          usage: outcome.usage,
          tz: &cfg.tz,
        };
        let path = outcome.report_dir.join("summary.md");
        write_text(&path, &summary_markdown(&ctx, &outcome.successes, &outcome.failures))?;
        println!("Summary saved to {}", path.display());
      }

      let dashboard = bulk_dashboard(cfg, &outcome, &resolved, now);
      write_json(Path::new(web_data), &dashboard).with_context(|| format!("writing dashboard data {}", web_data))?;

      println!("Analyzed: {}/{} series", outcome.successes.len(), outcome.attempted);
      println!("Failed: {} series", outcome.failures.len());
      println!("Tokens: {} in / {} out", outcome.usage.input_tokens, outcome.usage.output_tokens);
      println!("Reports: {}", outcome.report_dir.display());
      println!("Dashboard: {}", web_data);
    }
    CommandConfig::ExportJson { window, output, max_patches, include_comments, all_revisions } => {
      let opts = FetchOptions { max_patches: *max_patches, include_comments: *include_comments };
      let export = export_dashboard(api.as_ref(), cfg, window, opts, *all_revisions, now)?;
      write_json(Path::new(output), &export)?;
      println!("Exported {} patch series to {}", export.patch_series.len(), output);
    }
  }

  Ok(())
}
