// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive engagement signals (tags, participants, recency, status) from a series' patches and discussion thread
// role: analysis/extractor
// inputs: Series (non-empty patches), caller-supplied `now`, EngagementPolicy
// outputs: EngagementSummary
// invariants:
// - Pure; no IO, no clock reads; same input -> same output
// - Quoted reply lines (leading '>') never count as tags
// - Tags are deduplicated by (kind, identity key) across patches and comments
// - days_since_activity is floored and never negative
// errors: InvalidSeries when patches is empty; MalformedTimestamp for an unparseable `now` string
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::AnalysisError;
use crate::identity::parse_identity;
use crate::model::{EngagementSummary, Endorsers, Series};
use crate::policy::{EngagementPolicy, TagKind, TagRule};
use crate::status::{classify, Signals};
use crate::util::parse_timestamp;

/// Yield `(kind, endorser)` for every tag line in `body`.
///
/// A tag line starts (after indentation) with a configured label, then `:`
/// and a non-empty endorser. Quoted lines are skipped.
pub fn scan_tags<'a>(body: &'a str, tags: &'a [TagRule]) -> impl Iterator<Item = (TagKind, &'a str)> + 'a {
  body.lines().filter_map(move |line| {
    let line = line.trim();
    if line.starts_with('>') {
      return None;
    }

    tags.iter().find_map(|rule| {
      let endorser = line.strip_prefix(rule.label.as_str())?.strip_prefix(':')?.trim();
      (!endorser.is_empty()).then_some((rule.kind, endorser))
    })
  })
}

#[derive(Default)]
struct Tally {
  seen: HashSet<(TagKind, String)>,
  signoff_count: usize,
  ack_count: usize,
  review_count: usize,
  test_count: usize,
  endorsers: Endorsers,
}

impl Tally {
  fn record(&mut self, kind: TagKind, endorser: &str, policy: &EngagementPolicy) {
    let Some(id) = parse_identity(endorser, policy.identity_match) else { return };

    if !self.seen.insert((kind, id.key)) {
      return;
    }

    let (count, names) = match kind {
      TagKind::SignedOff => (&mut self.signoff_count, &mut self.endorsers.signed_off_by),
      TagKind::Acked => (&mut self.ack_count, &mut self.endorsers.acked_by),
      TagKind::Reviewed => (&mut self.review_count, &mut self.endorsers.reviewed_by),
      TagKind::Tested => (&mut self.test_count, &mut self.endorsers.tested_by),
    };
    *count += 1;
    names.push(id.display);
  }
}

/// Distinct comment authors, optionally without the series author.
fn participants(series: &Series, policy: &EngagementPolicy) -> Vec<String> {
  let author_key = if policy.exclude_author_from_participants {
    parse_identity(&series.author, policy.identity_match).map(|id| id.key)
  } else {
    None
  };

  let mut seen: HashSet<String> = HashSet::new();
  let mut out = Vec::new();

  for comment in &series.comments {
    let Some(id) = parse_identity(&comment.author, policy.identity_match) else { continue };
    if author_key.as_deref() == Some(id.key.as_str()) {
      continue;
    }
    if seen.insert(id.key) {
      out.push(id.display);
    }
  }

  out
}

/// Whole days from `latest` to `now`, clamped at zero for skewed clocks.
pub fn days_between(latest: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
  (now - latest).num_days().max(0)
}

/// Analyze one series as of `now`.
pub fn analyze(series: &Series, now: DateTime<Utc>, policy: &EngagementPolicy) -> Result<EngagementSummary, AnalysisError> {
  let invalid = || AnalysisError::InvalidSeries { series: series.raw_name.clone() };

  if series.patches.is_empty() {
    return Err(invalid());
  }

  let mut tally = Tally::default();
  let bodies = series
    .patches
    .iter()
    .map(|p| p.body.as_str())
    .chain(series.comments.iter().map(|c| c.body.as_str()));

  for body in bodies {
    for (kind, endorser) in scan_tags(body, &policy.tags) {
      tally.record(kind, endorser, policy);
    }
  }

  let latest_activity_date = series
    .patches
    .iter()
    .map(|p| p.date)
    .chain(series.comments.iter().map(|c| c.date))
    .max()
    .ok_or_else(invalid)?;
  let days_since_activity = days_between(latest_activity_date, now);

  let participants = participants(series, policy);

  let signals = Signals {
    signoff_count: tally.signoff_count,
    ack_count: tally.ack_count,
    review_count: tally.review_count,
    unique_participants: participants.len(),
    days_since_activity,
  };

  Ok(EngagementSummary {
    signoff_count: tally.signoff_count,
    ack_count: tally.ack_count,
    review_count: tally.review_count,
    test_count: tally.test_count,
    unique_participants: participants.len(),
    participants,
    endorsers: tally.endorsers,
    latest_activity_date,
    days_since_activity,
    status: classify(&signals, policy),
  })
}

/// Like [`analyze`], with `now` given as a timestamp string.
pub fn analyze_at(series: &Series, now: &str, policy: &EngagementPolicy) -> Result<EngagementSummary, AnalysisError> {
  let now = parse_timestamp(now)?;
  analyze(series, now, policy)
}
