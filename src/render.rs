// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render per-series markdown reports, the bulk summary.md, and the dashboard JSON export
// role: rendering/output
// inputs: SeriesReport (+ optional AI analysis), run metadata, timezone label
// outputs: Markdown strings; DashboardExport (serde) written as pretty JSON
// side_effects: write_json/write_text create parent directories and write files
// invariants:
// - Dashboard shape is pinned by tests/schemas/dashboard.schema.json
// - Markdown header lines are stable ("**Key**: value") for downstream scraping
// errors: IO errors bubble with file path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::split_person;
use crate::model::{SeriesReport, Status, TokenUsage};
use crate::util::{date_in_tz, iso_in_tz};

pub fn series_filename(id: i64) -> String {
  format!("series-{}.md", id)
}

/// Header block plus the AI brief for one series.
pub fn series_markdown(report: &SeriesReport, analysis: &str, generated: DateTime<Utc>, tz: &str) -> String {
  let (name, _) = split_person(&report.author);
  let author = if name.is_empty() { "Unknown".to_string() } else { name };
  let resend = if report.is_resend { " (RESEND)" } else { "" };

  let mut out = String::new();
  let _ = writeln!(out, "# Analysis: {}\n", report.raw_name);
  let _ = writeln!(out, "**Generated**: {}", iso_in_tz(generated, tz));
  let _ = writeln!(out, "**Series ID**: {}", report.id);
  let _ = writeln!(out, "**Author**: {}", author);
  let _ = writeln!(out, "**Date**: {}", date_in_tz(report.date, tz));
  let _ = writeln!(out, "**Version**: v{}{}", report.version, resend);
  let _ = writeln!(out, "**Status**: {}", report.engagement.status.label());
  let _ = writeln!(out, "**Patches**: {}", report.total_patches);
  let _ = writeln!(out, "**Patchwork URL**: {}\n", report.web_url);
  out.push_str("---\n\n");
  out.push_str(analysis);
  if !analysis.ends_with('\n') {
    out.push('\n');
  }

  out
}

/// One analyzed series in a bulk run.
#[derive(Debug, Clone)]
pub struct BulkSuccess {
  pub report: SeriesReport,
  pub analysis: String,
  pub file: String,
}

/// A series the bulk run could not analyze, with the reason.
#[derive(Debug, Clone)]
pub struct BulkFailure {
  pub id: i64,
  pub name: String,
  pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SummaryContext<'a> {
  pub project: &'a str,
  pub generated: DateTime<Utc>,
  pub period: &'a str,
  pub attempted: usize,
  pub usage: TokenUsage,
  pub tz: &'a str,
}

pub fn summary_markdown(ctx: &SummaryContext<'_>, successes: &[BulkSuccess], failures: &[BulkFailure]) -> String {
  let mut out = String::new();

  let _ = writeln!(out, "# {} Patch Analysis Summary\n", ctx.project);
  let _ = writeln!(out, "**Generated**: {}", iso_in_tz(ctx.generated, ctx.tz));
  let _ = writeln!(out, "**Period**: {}", ctx.period);
  let _ = writeln!(out, "**Analyzed**: {}/{} series", successes.len(), ctx.attempted);
  let _ = writeln!(
    out,
    "**Tokens**: {} in / {} out\n",
    ctx.usage.input_tokens, ctx.usage.output_tokens
  );

  if !failures.is_empty() {
    let _ = writeln!(out, "## Failed Analyses ({})\n", failures.len());
    for f in failures {
      let _ = writeln!(out, "- **{}** (series {}): {}", f.name, f.id, f.reason);
    }
    out.push('\n');
  }

  let _ = writeln!(out, "## Successful Analyses ({})\n", successes.len());
  for s in successes {
    let r = &s.report;
    let (name, _) = split_person(&r.author);
    let _ = writeln!(out, "### {}\n", r.raw_name);
    let _ = writeln!(out, "- **Author**: {}", if name.is_empty() { "Unknown" } else { name.as_str() });
    let _ = writeln!(out, "- **Date**: {}", date_in_tz(r.date, ctx.tz));
    let _ = writeln!(out, "- **Status**: {}", r.engagement.status.label());
    let _ = writeln!(out, "- **Patches**: {}", r.total_patches);
    let _ = writeln!(out, "- **Report**: [{}]({})", s.file, s.file);
    let _ = writeln!(out, "- **Patchwork**: {}\n", r.web_url);
  }

  out
}

// --- Dashboard export ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardExport {
  pub metadata: DashboardMetadata,
  pub patch_series: Vec<DashboardSeries>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardMetadata {
  pub generated_at: String,
  pub project: String,
  pub since: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub days_back: Option<i64>,
  pub include_applied: bool,
  pub total_series: usize,
  pub analysis_method: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token_usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Submitter {
  pub name: String,
  pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EndorsementCounts {
  pub signed_off_by: usize,
  pub acked_by: usize,
  pub reviewed_by: usize,
  pub tested_by: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardEngagement {
  pub version: u32,
  pub is_resend: bool,
  pub days_since_posting: i64,
  pub days_since_activity: i64,
  pub unique_participants: usize,
  pub comment_count: usize,
  pub status: Status,
  pub endorsements: EndorsementCounts,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardAnalysis {
  pub status: String,
  pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardSeries {
  pub id: i64,
  pub name: String,
  pub canonical_name: String,
  pub date: String,
  pub submitter: Submitter,
  pub total_patches: usize,
  pub web_url: String,
  pub engagement: DashboardEngagement,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub analysis: Option<DashboardAnalysis>,
}

/// Status line of an executive brief (`**Status**: ...`), if the model wrote one.
pub fn brief_status(analysis: &str) -> Option<String> {
  analysis
    .lines()
    .find_map(|l| l.trim().strip_prefix("**Status**:"))
    .map(|s| s.trim().trim_matches(|c| c == '[' || c == ']').trim().to_string())
    .filter(|s| !s.is_empty())
}

pub fn dashboard_series(report: &SeriesReport, analysis: Option<&str>) -> DashboardSeries {
  let (name, email) = split_person(&report.author);
  let e = &report.engagement;

  DashboardSeries {
    id: report.id,
    name: report.raw_name.clone(),
    canonical_name: report.canonical_name.clone(),
    date: report.date.to_rfc3339(),
    submitter: Submitter { name: if name.is_empty() { "Unknown".into() } else { name }, email },
    total_patches: report.total_patches,
    web_url: report.web_url.clone(),
    engagement: DashboardEngagement {
      version: report.version,
      is_resend: report.is_resend,
      days_since_posting: report.days_since_posting,
      days_since_activity: e.days_since_activity,
      unique_participants: e.unique_participants,
      comment_count: report.comment_count,
      status: e.status,
      endorsements: EndorsementCounts {
        signed_off_by: e.signoff_count,
        acked_by: e.ack_count,
        reviewed_by: e.review_count,
        tested_by: e.test_count,
      },
    },
    analysis: analysis.map(|text| DashboardAnalysis {
      status: brief_status(text).unwrap_or_else(|| e.status.label().to_string()),
      summary: text.to_string(),
    }),
  }
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
  let text = serde_json::to_string_pretty(value)?;
  write_text(path, &text)
}
