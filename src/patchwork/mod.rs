// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Patchwork tracker client: API seam plus listing/series assembly
// role: module/aggregation
// outputs: Re-exports for commands
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod fetch;

pub use api::{build_api, PatchworkApi, DEFAULT_BASE_URL};
pub use fetch::{
  fetch_recent_series, fetch_series, find_listing, latest_titles, list_projects, resolve_project, FetchOptions,
  RecentSeries, RecentTitle, SeriesListing,
};
