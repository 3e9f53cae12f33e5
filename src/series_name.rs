// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive canonical name, version and resend flag from raw series titles; collapse resubmissions
// role: analysis/normalizer
// inputs: Raw series names as reported by the tracker, e.g. "[PATCH v3 2/4] mm: fix leak"
// outputs: SeriesName; revision keys; latest-revision filtering
// invariants:
// - normalize is pure and infallible; same input -> same output
// - version >= 1; canonical_name is empty only for an empty title
// - only leading bracket groups are treated as tags
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:patch)?v(\d+)$").unwrap());
static RE_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+/\d+$").unwrap());

/// Normalized identity of a series title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesName {
  pub canonical_name: String,
  pub version: u32,
  pub is_resend: bool,
}

/// Split consecutive leading `[...]` groups off a title.
///
/// An unterminated `[` stops the scan and stays part of the remainder.
fn split_leading_groups(raw: &str) -> (Vec<&str>, &str) {
  let mut groups = Vec::new();
  let mut rest = raw.trim_start();

  while let Some(inner) = rest.strip_prefix('[') {
    let Some(end) = inner.find(']') else { break };
    groups.push(&inner[..end]);
    rest = inner[end + 1..].trim_start();
  }

  (groups, rest)
}

fn version_from_groups(groups: &[&str]) -> Option<u32> {
  groups
    .iter()
    .flat_map(|g| g.split(|c: char| c.is_whitespace() || c == ','))
    .filter_map(|tok| RE_VERSION.captures(tok))
    .find_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
}

/// Normalize a raw series title.
///
/// `"[PATCH v3 2/4] mm: fix leak"` becomes `("mm: fix leak", 3, false)`;
/// titles without tags keep their text and default to version 1.
pub fn normalize(raw_name: &str) -> SeriesName {
  let (groups, rest) = split_leading_groups(raw_name);

  let version = version_from_groups(&groups).unwrap_or(1).max(1);
  let is_resend = groups.iter().any(|g| g.to_uppercase().contains("RESEND"));

  let mut words: Vec<&str> = rest.split_whitespace().collect();
  if words.first().is_some_and(|w| RE_INDEX.is_match(w)) {
    words.remove(0);
  }
  if words.last().is_some_and(|w| RE_INDEX.is_match(w)) {
    words.pop();
  }

  let canonical_name = if words.is_empty() {
    raw_name.to_string()
  } else {
    words.join(" ")
  };

  SeriesName { canonical_name, version, is_resend }
}

/// Key under which resubmissions of the same series collide.
pub fn revision_key(canonical_name: &str) -> String {
  canonical_name
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Keep only the newest revision of each series.
///
/// `describe` yields the raw name and posting date of an item. Higher
/// versions win; equal versions are broken by the later date. Survivors keep
/// the relative order in which their revision key first appeared.
pub fn latest_revisions<T, F>(items: Vec<T>, describe: F) -> Vec<T>
where
  F: Fn(&T) -> (&str, DateTime<Utc>),
{
  let mut slot_by_key: HashMap<String, usize> = HashMap::new();
  let mut kept: Vec<(u32, DateTime<Utc>, T)> = Vec::new();

  for item in items {
    let (raw, date) = describe(&item);
    let name = normalize(raw);
    let key = revision_key(&name.canonical_name);

    match slot_by_key.get(&key) {
      Some(&slot) => {
        let (v, d, _) = &kept[slot];
        if name.version > *v || (name.version == *v && date > *d) {
          kept[slot] = (name.version, date, item);
        }
      }
      None => {
        slot_by_key.insert(key, kept.len());
        kept.push((name.version, date, item));
      }
    }
  }

  kept.into_iter().map(|(_, _, item)| item).collect()
}
