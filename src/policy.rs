// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Tunable knobs for engagement analysis (thresholds, tag labels, identity matching)
// role: configuration/policy
// outputs: EngagementPolicy with defaults matching the tracker conventions
// invariants: Plain data; passed as a parameter, never read from globals
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// Kind of endorsement asserted by a tag line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
  SignedOff,
  Acked,
  Reviewed,
  Tested,
}

/// A recognized tag label (matched case-sensitively, followed by `:`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
  pub label: String,
  pub kind: TagKind,
}

impl TagRule {
  pub fn new(label: &str, kind: TagKind) -> Self {
    Self { label: label.to_string(), kind }
  }
}

/// How endorser and commenter identities are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMatch {
  /// Same email means same person; fall back to the name when no email is present.
  #[default]
  EmailThenName,
  /// Compare display names only, ignoring any email.
  NameOnly,
}

/// Static weights and knobs for engagement analysis. Exposed via CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementPolicy {
  pub stale_after_days: i64,
  pub active_window_days: i64,
  pub min_participants_for_active: usize,
  /// Drop the series author's own replies from the participant set.
  pub exclude_author_from_participants: bool,
  pub identity_match: IdentityMatch,
  pub tags: Vec<TagRule>,
}

impl Default for EngagementPolicy {
  fn default() -> Self {
    Self {
      stale_after_days: 30,
      active_window_days: 7,
      min_participants_for_active: 2,
      exclude_author_from_participants: true,
      identity_match: IdentityMatch::EmailThenName,
      tags: vec![
        TagRule::new("Signed-off-by", TagKind::SignedOff),
        TagRule::new("Acked-by", TagKind::Acked),
        TagRule::new("Reviewed-by", TagKind::Reviewed),
        TagRule::new("Tested-by", TagKind::Tested),
      ],
    }
  }
}
