// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Classify a series' review state from engagement signals with an ordered rule table
// role: analysis/classification
// inputs: Signals (counts, participants, days since activity) + EngagementPolicy thresholds
// outputs: Status
// invariants:
// - Rules are evaluated in table order; first match wins
// - The final rule always matches, so classification is total
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::model::Status;
use crate::policy::EngagementPolicy;

/// Inputs to classification, extracted from an engagement summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals {
  pub signoff_count: usize,
  pub ack_count: usize,
  pub review_count: usize,
  pub unique_participants: usize,
  pub days_since_activity: i64,
}

pub struct StatusRule {
  pub name: &'static str,
  pub outcome: Status,
  pub applies: fn(&Signals, &EngagementPolicy) -> bool,
}

fn no_endorsement(s: &Signals, _: &EngagementPolicy) -> bool {
  s.signoff_count == 0 && s.ack_count == 0 && s.review_count == 0
}

fn gone_quiet(s: &Signals, p: &EngagementPolicy) -> bool {
  s.days_since_activity > p.stale_after_days
}

fn reviewed_and_endorsed(s: &Signals, _: &EngagementPolicy) -> bool {
  s.review_count >= 1 && (s.ack_count >= 1 || s.signoff_count >= 1)
}

fn recent_discussion(s: &Signals, p: &EngagementPolicy) -> bool {
  s.unique_participants >= p.min_participants_for_active && s.days_since_activity <= p.active_window_days
}

fn fallback(_: &Signals, _: &EngagementPolicy) -> bool {
  true
}

pub static RULES: &[StatusRule] = &[
  StatusRule { name: "no-endorsement", outcome: Status::NeedsRevision, applies: no_endorsement },
  StatusRule { name: "gone-quiet", outcome: Status::Stalled, applies: gone_quiet },
  StatusRule { name: "reviewed-and-endorsed", outcome: Status::Ready, applies: reviewed_and_endorsed },
  StatusRule { name: "recent-discussion", outcome: Status::ActiveDiscussion, applies: recent_discussion },
  StatusRule { name: "fallback", outcome: Status::Unknown, applies: fallback },
];

/// Return the first rule matching `signals`.
pub fn matching_rule(signals: &Signals, policy: &EngagementPolicy) -> &'static StatusRule {
  RULES
    .iter()
    .find(|r| (r.applies)(signals, policy))
    .unwrap_or(&RULES[RULES.len() - 1])
}

pub fn classify(signals: &Signals, policy: &EngagementPolicy) -> Status {
  matching_rule(signals, policy).outcome
}
