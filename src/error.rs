// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed failures of the analysis core (series normalization + engagement extraction)
// role: errors
// outputs: AnalysisError with the two structural failure kinds
// invariants: Only structural problems are errors; malformed text degrades silently
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

/// Errors surfaced by [`crate::engagement::analyze`] and timestamp parsing.
///
/// Both kinds are fatal for the series being analyzed and never retriable.
/// Bulk callers record them per series and keep going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
  /// The series carries no patches; callers are expected to filter these out.
  #[error("series {series:?} has no patches")]
  InvalidSeries { series: String },

  /// A timestamp (`now` or an input date) could not be parsed.
  #[error("malformed timestamp: {value:?}")]
  MalformedTimestamp { value: String },
}
