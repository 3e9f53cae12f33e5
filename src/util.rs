// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for timestamps, clock overrides, text clipping, output directories, logging and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Parsed UTC timestamps, formatted dates, clipped text, directories ensured, man page text
// side_effects: prepare_out_dir creates directories; init_logging installs the global subscriber
// invariants:
// - parse_timestamp accepts RFC3339 and the tracker's naive ISO form (interpreted as UTC)
// - clip_text never splits UTF-8; indicates clipping accurately
// errors: Unparseable timestamps map to AnalysisError::MalformedTimestamp; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use crate::error::AnalysisError;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a tracker or CLI timestamp into UTC.
///
/// Patchwork reports naive `YYYY-MM-DDTHH:MM:SS` values in UTC; offsets are honored when present.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AnalysisError> {
  let s = raw.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }

  NAIVE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .map(|ndt| Utc.from_utc_datetime(&ndt))
    .ok_or_else(|| AnalysisError::MalformedTimestamp { value: raw.to_string() })
}

/// Returns the effective "now" given an optional override.
///
/// Centralizes our handling of test determinism without sprinkling
/// `Utc::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Resolve a natural-language or absolute start instant, e.g. "3 days ago" or "2025-08-01".
pub fn parse_since_phrase(phrase: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if let Ok(dt) = parse_timestamp(phrase) {
    return Ok(dt);
  }

  chrono_english::parse_date_string(phrase.trim(), now, chrono_english::Dialect::Us)
    .map_err(|e| anyhow::anyhow!("could not understand --since {:?}: {:?}", phrase, e))
}

/// Formats a UTC instant as RFC3339 in the given timezone label ("utc", "local" or an IANA name).
pub fn iso_in_tz(dt: DateTime<Utc>, tz: &str) -> String {
  if tz.eq_ignore_ascii_case("local") {
    return dt.with_timezone(&Local).to_rfc3339_opts(SecondsFormat::Secs, true);
  }

  match tz.parse::<Tz>() {
    Ok(zone) if !tz.eq_ignore_ascii_case("utc") => dt.with_timezone(&zone).to_rfc3339_opts(SecondsFormat::Secs, true),
    _ => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
  }
}

/// Calendar date (`YYYY-MM-DD`) of an instant in the given timezone label.
pub fn date_in_tz(dt: DateTime<Utc>, tz: &str) -> String {
  iso_in_tz(dt, tz).chars().take(10).collect()
}

/// Clips text to a maximum number of bytes without splitting a UTF-8 character.
///
/// Returns the clipped text and whether anything was cut. `max_bytes == 0` means no limit.
pub fn clip_text(text: &str, max_bytes: usize) -> (&str, bool) {
  if max_bytes == 0 || text.len() <= max_bytes {
    return (text, false);
  }

  let mut end = max_bytes;
  while end > 0 && !text.is_char_boundary(end) {
    end -= 1;
  }

  (&text[..end], true)
}

/// Prepare the dated output directory for a bulk run: `<out>/<YYYY-MM-DD>`.
pub fn prepare_out_dir(out: &str, now: DateTime<Utc>) -> Result<PathBuf> {
  let dir = PathBuf::from(out).join(now.format("%Y-%m-%d").to_string());
  std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

  Ok(dir)
}

/// Install the stderr `tracing` subscriber, honoring `RUST_LOG`.
///
/// Without `RUST_LOG` the level is `warn`, or `info` when `verbose`.
pub fn init_logging(verbose: bool) {
  let fallback = if verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
