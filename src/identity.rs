// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Normalize endorser/commenter strings ("Name <email>", bare email, bare name) into comparable keys
// role: analysis/identity
// outputs: Identity { key, display }
// invariants: Keys are case-folded and whitespace-collapsed; blank input yields None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

use crate::policy::IdentityMatch;

static RE_ANGLE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\s*([^<>\s]+@[^<>\s]+)\s*>").unwrap());
static RE_BARE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s<>@]+@[^\s<>@]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  /// Comparison key, e.g. `email:jane@x.org` or `name:jane doe`.
  pub key: String,
  /// Human-readable form for prompts and reports.
  pub display: String,
}

fn collapse(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a free-form identity string.
pub fn parse_identity(raw: &str, mode: IdentityMatch) -> Option<Identity> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  let (name, email) = if let Some(c) = RE_ANGLE_EMAIL.captures(raw) {
    let start = c.get(0).map(|m| m.start()).unwrap_or(0);
    let name = collapse(raw[..start].trim().trim_matches('"'));
    (name, c.get(1).map(|m| m.as_str().to_lowercase()))
  } else if RE_BARE_EMAIL.is_match(raw) {
    (String::new(), Some(raw.to_lowercase()))
  } else {
    (collapse(raw.trim_matches('"')), None)
  };

  let name_key = (!name.is_empty()).then(|| format!("name:{}", name.to_lowercase()));
  let email_key = email.as_ref().map(|e| format!("email:{}", e));

  let key = match mode {
    IdentityMatch::EmailThenName => email_key.or(name_key),
    IdentityMatch::NameOnly => name_key.or(email_key),
  }?;

  let display = if !name.is_empty() {
    name
  } else {
    email.unwrap_or_else(|| raw.to_string())
  };

  Some(Identity { key, display })
}

/// Format a tracker person record the way tag lines spell identities.
pub fn format_person(name: &str, email: &str) -> String {
  match (name.trim(), email.trim()) {
    ("", "") => String::new(),
    (n, "") => n.to_string(),
    ("", e) => e.to_string(),
    (n, e) => format!("{} <{}>", n, e),
  }
}

/// Split `Name <email>` back into its parts; a bare email fills only the email.
pub fn split_person(raw: &str) -> (String, String) {
  let raw = raw.trim();
  if let Some(c) = RE_ANGLE_EMAIL.captures(raw) {
    let start = c.get(0).map(|m| m.start()).unwrap_or(0);
    let email = c.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    return (collapse(raw[..start].trim().trim_matches('"')), email);
  }
  if RE_BARE_EMAIL.is_match(raw) {
    return (String::new(), raw.to_string());
  }
  (collapse(raw), String::new())
}
