// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the clap CLI and normalize raw flags into an EffectiveConfig per subcommand
// role: cli/config
// inputs: argv via clap; ANTHROPIC_API_KEY when --claude-key is absent
// outputs: Cli (raw), EffectiveConfig (validated)
// invariants:
// - Exactly one window source per command (--days or --since); each command has its own default day count
// - Policy thresholds map 1:1 onto EngagementPolicy
// - --tz accepts "utc", "local" or an IANA zone name
// errors: Validation failures via anyhow::bail! with the offending flag named
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::patchwork::DEFAULT_BASE_URL;
use crate::policy::{EngagementPolicy, IdentityMatch};
use crate::summarize::DEFAULT_MODEL;
use crate::window::{window_from_flags, WindowSpec};

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";

#[derive(Parser, Debug)]
#[command(
  name = "patch-monitor",
  version,
  about = "Track Linux kernel patch series on Patchwork: engagement signals, AI briefs, dashboard export",
  long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Patchwork project name or search hint
  #[arg(long, global = true, default_value = "rust-for-linux")]
  pub project: String,

  /// Patchwork REST API base URL
  #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
  pub base_url: String,

  /// Timezone for dates in reports: utc, local, or an IANA name
  #[arg(long, global = true, default_value = "utc")]
  pub tz: String,

  /// Days without activity before a series counts as stalled
  #[arg(long, global = true, default_value_t = 30)]
  pub stale_after_days: i64,

  /// Days of recent activity that still count as active discussion
  #[arg(long, global = true, default_value_t = 7)]
  pub active_window_days: i64,

  /// Distinct commenters needed for active discussion
  #[arg(long = "min-participants", global = true, default_value_t = 2)]
  pub min_participants: usize,

  /// Count the series author among discussion participants
  #[arg(long, global = true)]
  pub include_author_comments: bool,

  /// Compare endorsers by name only (ignore email addresses)
  #[arg(long, global = true)]
  pub match_names_only: bool,

  /// HTTP timeout for tracker requests, in seconds
  #[arg(long, global = true, default_value_t = 30)]
  pub timeout_secs: u64,

  /// Log progress to stderr (RUST_LOG overrides)
  #[arg(long, short = 'v', global = true)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant (hidden; tests only)
  #[arg(long = "now-override", global = true, hide = true)]
  pub now_override: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List projects on the Patchwork instance
  ListProjects,
  /// Show the newest series titles across all projects (naming-pattern debugging)
  #[command(hide = true)]
  DebugRecent {
    /// Number of titles to show
    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
  /// List recent series with their engagement status
  List {
    #[command(flatten)]
    window: WindowArgs,
    /// Keep every revision instead of only the latest per series
    #[arg(long)]
    all_revisions: bool,
  },
  /// Analyze one series with Claude
  Analyze {
    /// Patchwork series id
    #[arg(long)]
    series: i64,
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    analysis: AnalysisArgs,
    /// Print the prompt instead of calling the API
    #[arg(long)]
    prompt_only: bool,
    /// Write the report here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
  /// Analyze the most recent series in batch and refresh the dashboard data
  AnalyzeBulk {
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    analysis: AnalysisArgs,
    /// Maximum number of series to analyze
    #[arg(long, default_value_t = 10)]
    max_series: usize,
    /// Directory for dated report folders
    #[arg(long, default_value = "reports")]
    output_dir: PathBuf,
    /// Also write summary.md
    #[arg(long)]
    summary_report: bool,
    /// Dashboard JSON destination
    #[arg(long, default_value = "web-ui/src/data/patches.json")]
    web_data: PathBuf,
    #[arg(long)]
    all_revisions: bool,
  },
  /// Export engagement data as dashboard JSON (no AI calls)
  ExportJson {
    #[command(flatten)]
    window: WindowArgs,
    /// Output JSON file
    #[arg(long, short = 'o')]
    output: PathBuf,
    /// Patches fetched per series for tag scanning
    #[arg(long, default_value_t = 3)]
    max_patches: usize,
    /// Skip discussion threads (faster)
    #[arg(long)]
    no_comments: bool,
    #[arg(long)]
    all_revisions: bool,
  },
}

#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
  /// Days to look back
  #[arg(long)]
  pub days: Option<i64>,
  /// Start of the window: a date or phrase like "last monday"
  #[arg(long)]
  pub since: Option<String>,
  /// Include series that look already applied
  #[arg(long)]
  pub include_applied: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
  /// Maximum patches per series sent to the model
  #[arg(long, default_value_t = 5)]
  pub max_patches: usize,
  /// Per-patch body cap in bytes (0 = no limit)
  #[arg(long, default_value_t = 3000)]
  pub max_patch_chars: usize,
  /// Skip discussion threads (faster)
  #[arg(long)]
  pub no_comments: bool,
  /// Anthropic API key (defaults to ANTHROPIC_API_KEY)
  #[arg(long)]
  pub claude_key: Option<String>,
  /// Anthropic model
  #[arg(long, default_value = DEFAULT_MODEL)]
  pub model: String,
}

impl Default for AnalysisArgs {
  fn default() -> Self {
    Self { max_patches: 5, max_patch_chars: 3000, no_comments: false, claude_key: None, model: DEFAULT_MODEL.into() }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
  pub spec: WindowSpec,
  pub include_applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
  pub max_patches: usize,
  pub max_patch_chars: usize,
  pub include_comments: bool,
  #[serde(skip_serializing)]
  pub api_key: Option<String>,
  pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandConfig {
  ListProjects,
  DebugRecent {
    limit: usize,
  },
  List {
    window: WindowConfig,
    all_revisions: bool,
  },
  Analyze {
    series: i64,
    window: WindowConfig,
    analysis: AnalysisConfig,
    prompt_only: bool,
    output: Option<String>,
  },
  AnalyzeBulk {
    window: WindowConfig,
    analysis: AnalysisConfig,
    max_series: usize,
    output_dir: String,
    summary_report: bool,
    web_data: String,
    all_revisions: bool,
  },
  ExportJson {
    window: WindowConfig,
    output: String,
    max_patches: usize,
    include_comments: bool,
    all_revisions: bool,
  },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub project: String,
  pub base_url: String,
  pub tz: String,
  pub timeout_secs: u64,
  pub policy: EngagementPolicy,
  pub verbose: bool,
  pub now_override: Option<String>,
  pub command: CommandConfig,
}

fn window_config(w: &WindowArgs, default_days: i64) -> Result<WindowConfig> {
  Ok(WindowConfig {
    spec: window_from_flags(w.days, w.since.as_deref(), default_days)?,
    include_applied: w.include_applied,
  })
}

fn analysis_config(a: AnalysisArgs) -> Result<AnalysisConfig> {
  if a.max_patches == 0 {
    bail!("--max-patches must be at least 1");
  }
  let api_key = a
    .claude_key
    .or_else(|| std::env::var(ENV_API_KEY).ok())
    .filter(|k| !k.trim().is_empty());

  Ok(AnalysisConfig {
    max_patches: a.max_patches,
    max_patch_chars: a.max_patch_chars,
    include_comments: !a.no_comments,
    api_key,
    model: a.model,
  })
}

fn validate_tz(tz: &str) -> Result<String> {
  let t = tz.trim();
  if t.eq_ignore_ascii_case("utc") || t.eq_ignore_ascii_case("local") {
    return Ok(t.to_lowercase());
  }
  match t.parse::<chrono_tz::Tz>() {
    Ok(_) => Ok(t.to_string()),
    Err(_) => bail!("invalid --tz {:?}: expected utc, local, or an IANA zone name", tz),
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.stale_after_days < 0 || cli.active_window_days < 0 {
    bail!("--stale-after-days and --active-window-days must be zero or positive");
  }

  let policy = EngagementPolicy {
    stale_after_days: cli.stale_after_days,
    active_window_days: cli.active_window_days,
    min_participants_for_active: cli.min_participants,
    exclude_author_from_participants: !cli.include_author_comments,
    identity_match: if cli.match_names_only { IdentityMatch::NameOnly } else { IdentityMatch::EmailThenName },
    ..EngagementPolicy::default()
  };

  let Some(command) = cli.command else {
    bail!("Provide a subcommand: list-projects | list | analyze | analyze-bulk | export-json");
  };

  let command = match command {
    Command::ListProjects => CommandConfig::ListProjects,
    Command::DebugRecent { limit } => CommandConfig::DebugRecent { limit: limit.max(1) },
    Command::List { window, all_revisions } => CommandConfig::List { window: window_config(&window, 90)?, all_revisions },
    Command::Analyze { series, window, analysis, prompt_only, output } => CommandConfig::Analyze {
      series,
      window: window_config(&window, 90)?,
      analysis: analysis_config(analysis)?,
      prompt_only,
      output: output.map(|p| p.to_string_lossy().to_string()),
    },
    Command::AnalyzeBulk { window, analysis, max_series, output_dir, summary_report, web_data, all_revisions } => {
      if max_series == 0 {
        bail!("--max-series must be at least 1");
      }
      CommandConfig::AnalyzeBulk {
        window: window_config(&window, 14)?,
        analysis: analysis_config(analysis)?,
        max_series,
        output_dir: output_dir.to_string_lossy().to_string(),
        summary_report,
        web_data: web_data.to_string_lossy().to_string(),
        all_revisions,
      }
    }
    Command::ExportJson { window, output, max_patches, no_comments, all_revisions } => CommandConfig::ExportJson {
      window: window_config(&window, 90)?,
      output: output.to_string_lossy().to_string(),
      max_patches,
      include_comments: !no_comments,
      all_revisions,
    },
  };

  Ok(EffectiveConfig {
    project: cli.project.trim().to_string(),
    base_url: cli.base_url.trim_end_matches('/').to_string(),
    tz: validate_tz(&cli.tz)?,
    timeout_secs: cli.timeout_secs.max(1),
    policy,
    verbose: cli.verbose,
    now_override: cli.now_override,
    command,
  })
}
