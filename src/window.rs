// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the listing window (--days N | --since <phrase>) and --now-override into concrete instants
// role: time/windowing
// inputs: WindowSpec, effective now
// outputs: ResolvedWindow { cutoff, label, days_back }
// invariants:
// - cutoff <= now for --days; --since may name any instant
// - --days beyond chrono's range is an error, never an overflow
// - label is human-readable and used verbatim in summary.md ("Last 14 days", "Since last monday")
// errors: Unparseable --since / --now-override surface as anyhow errors naming the flag
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::util::{parse_since_phrase, parse_timestamp};

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum WindowSpec {
  Days { days: i64 },
  Since { phrase: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedWindow {
  pub cutoff: DateTime<Utc>,
  pub label: String,
  pub days_back: Option<i64>,
}

/// Pick the window from `--days`/`--since`, falling back to the command's default day count.
pub fn window_from_flags(days: Option<i64>, since: Option<&str>, default_days: i64) -> Result<WindowSpec> {
  match (days, since) {
    (Some(_), Some(_)) => bail!("Ambiguous window: choose only one of --days | --since"),
    (Some(d), None) if d < 0 => bail!("--days must be zero or positive"),
    (Some(d), None) => Ok(WindowSpec::Days { days: d }),
    (None, Some(p)) if p.trim().is_empty() => bail!("--since needs a date or phrase"),
    (None, Some(p)) => Ok(WindowSpec::Since { phrase: p.trim().to_string() }),
    (None, None) => Ok(WindowSpec::Days { days: default_days }),
  }
}

pub fn resolve_window(spec: &WindowSpec, now: DateTime<Utc>) -> Result<ResolvedWindow> {
  match spec {
    WindowSpec::Days { days } => {
      let Some(cutoff) = Duration::try_days(*days).and_then(|d| now.checked_sub_signed(d)) else {
        bail!("--days {} is out of range", days);
      };
      Ok(ResolvedWindow { cutoff, label: format!("Last {} days", days), days_back: Some(*days) })
    }
    WindowSpec::Since { phrase } => Ok(ResolvedWindow {
      cutoff: parse_since_phrase(phrase, now)?,
      label: format!("Since {}", phrase),
      days_back: None,
    }),
  }
}

/// Parse a `--now-override` value (RFC3339 or naive UTC timestamp).
pub fn parse_now_override(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  match s {
    None => Ok(None),
    Some(raw) => match parse_timestamp(raw) {
      Ok(dt) => Ok(Some(dt)),
      Err(e) => bail!("invalid --now-override: {}", e),
    },
  }
}
