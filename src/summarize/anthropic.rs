// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Summarizer seam: Anthropic Messages API backend and a fixed-text backend for tests
// role: summarize/provider
// inputs: Prompt text; API key; model name
// outputs: Analysis { text, usage }
// side_effects: HTTPS POST to {base}/v1/messages (Anthropic backend only)
// invariants:
// - PM_TEST_ANALYSIS_TEXT selects the fixed backend and never touches the network
// - Text blocks are joined with newlines; missing usage counts as zero
// errors: anyhow with status code and provider error message when available
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::TokenUsage;

pub const DEFAULT_ANTHROPIC_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ENV_ANALYSIS_TEXT: &str = "PM_TEST_ANALYSIS_TEXT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
  pub text: String,
  pub usage: TokenUsage,
}

pub trait Summarizer {
  fn summarize(&self, prompt: &str) -> Result<Analysis>;
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
  #[serde(default)]
  content: Vec<ApiContentBlock>,
  usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiContentBlock {
  #[serde(rename = "type")]
  block_type: String,
  #[serde(default)]
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
  input_tokens: u64,
  output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  #[serde(rename = "type")]
  kind: String,
  message: String,
}

impl ApiResponse {
  fn into_analysis(self) -> Analysis {
    let text = self
      .content
      .iter()
      .filter(|b| b.block_type == "text")
      .filter_map(|b| b.text.as_deref())
      .collect::<Vec<_>>()
      .join("\n");
    let usage = self
      .usage
      .map(|u| TokenUsage { input_tokens: u.input_tokens, output_tokens: u.output_tokens })
      .unwrap_or_default();

    Analysis { text, usage }
  }
}

pub struct AnthropicSummarizer {
  agent: ureq::Agent,
  api_key: String,
  base_url: String,
  model: String,
  max_tokens: u32,
}

impl AnthropicSummarizer {
  pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
    Self::with_base(api_key, model, DEFAULT_ANTHROPIC_BASE, Duration::from_secs(120))
  }

  pub fn with_base(api_key: impl Into<String>, model: impl Into<String>, base_url: &str, timeout: Duration) -> Self {
    Self {
      agent: ureq::AgentBuilder::new().timeout(timeout).build(),
      api_key: api_key.into(),
      base_url: base_url.trim_end_matches('/').to_string(),
      model: model.into(),
      max_tokens: DEFAULT_MAX_TOKENS,
    }
  }
}

fn format_api_error(code: u16, body: &str) -> anyhow::Error {
  match serde_json::from_str::<ApiError>(body) {
    Ok(parsed) => anyhow!("anthropic api error ({}): {} ({})", code, parsed.error.message, parsed.error.kind),
    Err(_) => anyhow!("anthropic api error ({})", code),
  }
}

impl Summarizer for AnthropicSummarizer {
  fn summarize(&self, prompt: &str) -> Result<Analysis> {
    let url = format!("{}/v1/messages", self.base_url);
    let payload = ApiRequest {
      model: &self.model,
      max_tokens: self.max_tokens,
      messages: vec![ApiMessage { role: "user", content: prompt }],
    };
    let body = serde_json::to_value(&payload)?;

    debug!(model = %self.model, prompt_bytes = prompt.len(), "anthropic request");

    let resp = match self
      .agent
      .post(&url)
      .set("x-api-key", &self.api_key)
      .set("anthropic-version", ANTHROPIC_VERSION)
      .set("content-type", "application/json")
      .send_json(body)
    {
      Ok(r) => r,
      Err(ureq::Error::Status(code, r)) => {
        let text = r.into_string().unwrap_or_default();
        return Err(format_api_error(code, &text));
      }
      Err(e) => return Err(anyhow!(e)).with_context(|| format!("POST {} failed", url)),
    };

    let parsed: ApiResponse = resp.into_json().context("decoding anthropic response")?;
    let analysis = parsed.into_analysis();
    info!(
      input_tokens = analysis.usage.input_tokens,
      output_tokens = analysis.usage.output_tokens,
      "analysis received"
    );

    Ok(analysis)
  }
}

/// Returns a canned analysis; used by tests and offline runs.
pub struct FixedSummarizer {
  pub text: String,
}

impl Summarizer for FixedSummarizer {
  fn summarize(&self, prompt: &str) -> Result<Analysis> {
    Ok(Analysis {
      text: self.text.clone(),
      usage: TokenUsage { input_tokens: (prompt.len() / 4) as u64, output_tokens: (self.text.len() / 4) as u64 },
    })
  }
}

/// Pick the summarizer: PM_TEST_ANALYSIS_TEXT first, then the Anthropic API with `api_key`.
pub fn build_summarizer(api_key: Option<&str>, model: &str) -> Result<Box<dyn Summarizer>> {
  if let Ok(text) = std::env::var(ENV_ANALYSIS_TEXT) {
    debug!("using {} summarizer", ENV_ANALYSIS_TEXT);
    return Ok(Box::new(FixedSummarizer { text }));
  }

  match api_key.map(str::trim).filter(|k| !k.is_empty()) {
    Some(key) => Ok(Box::new(AnthropicSummarizer::new(key, model))),
    None => bail!("Claude API key is required for analysis; set ANTHROPIC_API_KEY or pass --claude-key"),
  }
}
