// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the in-memory model (patches, comments, series, engagement summaries, reports) shared by analysis, prompting and rendering
// role: model/types
// outputs: Serializable structs with stable field names for the dashboard export
// invariants: Patch/Comment are read-only after fetch; Series derives its name fields on construction; comments sorted by date
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engagement::days_between;
use crate::series_name::normalize;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Patch {
  pub id: i64,
  pub title: String,
  pub author: String,
  pub date: DateTime<Utc>,
  pub body: String,
  pub series_id: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(default)]
  pub web_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
  pub author: String,
  pub date: DateTime<Utc>,
  pub body: String,
  /// Patch the comment replies to, when the tracker threads comments per patch.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub patch_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Series {
  pub id: i64,
  pub raw_name: String,
  pub canonical_name: String,
  pub version: u32,
  pub is_resend: bool,
  /// Submitter, formatted as `Name <email>`.
  pub author: String,
  pub date: DateTime<Utc>,
  /// Patch count reported by the tracker (may exceed `patches.len()` when capped).
  pub total: usize,
  pub web_url: String,
  pub patches: Vec<Patch>,
  pub comments: Vec<Comment>,
  pub is_applied: bool,
}

/// Tracker-side fields needed to build a [`Series`].
#[derive(Debug, Clone)]
pub struct SeriesHeader {
  pub id: i64,
  pub raw_name: String,
  pub author: String,
  pub date: DateTime<Utc>,
  pub total: usize,
  pub web_url: String,
  pub is_applied: bool,
}

impl Series {
  pub fn new(header: SeriesHeader, patches: Vec<Patch>, mut comments: Vec<Comment>) -> Self {
    let name = normalize(&header.raw_name);
    comments.sort_by_key(|c| c.date);

    Series {
      id: header.id,
      raw_name: header.raw_name,
      canonical_name: name.canonical_name,
      version: name.version,
      is_resend: name.is_resend,
      author: header.author,
      date: header.date,
      total: header.total,
      web_url: header.web_url,
      patches,
      comments,
      is_applied: header.is_applied,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  Ready,
  Stalled,
  NeedsRevision,
  ActiveDiscussion,
  Unknown,
}

impl Status {
  pub fn label(self) -> &'static str {
    match self {
      Status::Ready => "Ready",
      Status::Stalled => "Stalled",
      Status::NeedsRevision => "Needs revision",
      Status::ActiveDiscussion => "Active discussion",
      Status::Unknown => "Unknown",
    }
  }
}

/// Display names of endorsers per tag kind, first-seen order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Endorsers {
  pub signed_off_by: Vec<String>,
  pub acked_by: Vec<String>,
  pub reviewed_by: Vec<String>,
  pub tested_by: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EngagementSummary {
  pub signoff_count: usize,
  pub ack_count: usize,
  pub review_count: usize,
  pub test_count: usize,
  pub unique_participants: usize,
  pub participants: Vec<String>,
  pub endorsers: Endorsers,
  pub latest_activity_date: DateTime<Utc>,
  /// Relative to the `now` given to the analysis call.
  pub days_since_activity: i64,
  pub status: Status,
}

/// Everything downstream consumers (prompt builder, dashboard) need about one series.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeriesReport {
  pub id: i64,
  pub raw_name: String,
  pub canonical_name: String,
  pub version: u32,
  pub is_resend: bool,
  pub is_applied: bool,
  pub author: String,
  pub date: DateTime<Utc>,
  pub total_patches: usize,
  pub analyzed_patches: usize,
  pub comment_count: usize,
  pub web_url: String,
  pub days_since_posting: i64,
  pub engagement: EngagementSummary,
}

impl SeriesReport {
  pub fn new(series: &Series, engagement: EngagementSummary, now: DateTime<Utc>) -> Self {
    SeriesReport {
      id: series.id,
      raw_name: series.raw_name.clone(),
      canonical_name: series.canonical_name.clone(),
      version: series.version,
      is_resend: series.is_resend,
      is_applied: series.is_applied,
      author: series.author.clone(),
      date: series.date,
      total_patches: series.total,
      analyzed_patches: series.patches.len(),
      comment_count: series.comments.len(),
      web_url: series.web_url.clone(),
      days_since_posting: days_between(series.date, now),
      engagement,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
  pub input_tokens: u64,
  pub output_tokens: u64,
}

impl TokenUsage {
  pub fn total(&self) -> u64 {
    self.input_tokens + self.output_tokens
  }
}

impl std::ops::AddAssign for TokenUsage {
  fn add_assign(&mut self, rhs: Self) {
    self.input_tokens += rhs.input_tokens;
    self.output_tokens += rhs.output_tokens;
  }
}
