// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: AI summary layer: prompt construction and summarizer backends
// role: module/aggregation
// outputs: Re-exports for commands
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod anthropic;
pub mod prompt;

pub use anthropic::{build_summarizer, Analysis, Summarizer, DEFAULT_MODEL};
pub use prompt::{build_prompt, PromptOptions};
