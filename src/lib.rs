// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Library surface: series-name normalization and engagement analysis, plus the tracker/summary/render collaborators used by the binary
// role: crate/root
// outputs: Public modules; the analysis core (series_name, engagement, status) is pure and clock-free
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod cli;
pub mod engagement;
pub mod error;
pub mod ext;
pub mod identity;
pub mod model;
pub mod patchwork;
pub mod policy;
pub mod render;
pub mod runner;
pub mod series_name;
pub mod status;
pub mod summarize;
pub mod util;
pub mod window;

pub use engagement::{analyze, analyze_at};
pub use error::AnalysisError;
pub use model::{Comment, EngagementSummary, Patch, Series, SeriesHeader, SeriesReport, Status};
pub use policy::EngagementPolicy;
pub use series_name::{normalize, SeriesName};
