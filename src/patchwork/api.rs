// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Patchwork REST seam: HTTP backend (ureq) plus an env-backed fixture backend for tests
// role: tracker/api
// inputs: Base URL (e.g. https://patchwork.kernel.org/api); env PM_TEST_* fixtures
// outputs: Raw JSON values and mbox text
// side_effects: Network calls to the tracker (HTTP backend only)
// invariants:
// - Any PM_TEST_* variable switches every call to the fixture backend
// - HTTP status failures carry the URL and status code
// errors: anyhow errors with request context; callers decide whether a failure is fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::ext::serde_json::JsonFetch;

pub const DEFAULT_BASE_URL: &str = "https://patchwork.kernel.org/api";
pub const SERIES_PAGE_SIZE: usize = 50;

pub const ENV_PROJECTS: &str = "PM_TEST_PROJECTS_JSON";
pub const ENV_SERIES: &str = "PM_TEST_SERIES_JSON";
pub const ENV_PATCHES: &str = "PM_TEST_PATCHES_JSON";
pub const ENV_COMMENTS: &str = "PM_TEST_COMMENTS_JSON";

// --- Trait seam for the tracker API ---
pub trait PatchworkApi {
  /// Whether the project answers on the series endpoint.
  fn probe_project(&self, project: &str) -> Result<bool>;
  fn list_projects_json(&self) -> Result<Value>;
  /// One page (1-based) of series for a project, newest first.
  fn list_series_page_json(&self, project: &str, page: usize, per_page: usize) -> Result<Value>;
  /// Newest series across every project on the instance.
  fn list_latest_series_json(&self, per_page: usize) -> Result<Value>;
  fn get_patch_json(&self, id: i64) -> Result<Value>;
  fn get_mbox(&self, url: &str) -> Result<String>;
  fn list_comments_json(&self, patch_id: i64) -> Result<Value>;
}

struct PatchworkHttpApi {
  agent: ureq::Agent,
  base_url: String,
}

impl PatchworkHttpApi {
  fn new(base_url: &str, timeout: Duration) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    Self { agent, base_url: base_url.trim_end_matches('/').to_string() }
  }

  fn get(&self, url: &str, query: &[(&str, String)]) -> Result<ureq::Response> {
    let mut req = self
      .agent
      .get(url)
      .set("Accept", "application/json")
      .set("User-Agent", "patch-monitor");

    for (k, v) in query {
      req = req.query(k, v);
    }

    debug!(url, "patchwork GET");

    match req.call() {
      Ok(resp) => Ok(resp),
      Err(ureq::Error::Status(code, _)) => bail!("GET {} returned HTTP {}", url, code),
      Err(e) => Err(anyhow!(e)).with_context(|| format!("GET {} failed", url)),
    }
  }

  fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
    self
      .get(url, query)?
      .into_json::<Value>()
      .with_context(|| format!("decoding JSON from {}", url))
  }
}

impl PatchworkApi for PatchworkHttpApi {
  fn probe_project(&self, project: &str) -> Result<bool> {
    let url = format!("{}/series/", self.base_url);
    let req = self
      .agent
      .get(&url)
      .set("Accept", "application/json")
      .set("User-Agent", "patch-monitor")
      .query("project", project)
      .query("per_page", "1");

    match req.call() {
      Ok(resp) => Ok(resp.status() == 200),
      Err(ureq::Error::Status(_, _)) => Ok(false),
      Err(e) => Err(anyhow!(e)).with_context(|| format!("probing project {:?}", project)),
    }
  }

  fn list_projects_json(&self) -> Result<Value> {
    self.get_json(&format!("{}/projects/", self.base_url), &[])
  }

  fn list_series_page_json(&self, project: &str, page: usize, per_page: usize) -> Result<Value> {
    let query = [
      ("project", project.to_string()),
      ("ordering", "-date".to_string()),
      ("per_page", per_page.to_string()),
      ("page", page.to_string()),
    ];
    self.get_json(&format!("{}/series/", self.base_url), &query)
  }

  fn list_latest_series_json(&self, per_page: usize) -> Result<Value> {
    let query = [("ordering", "-date".to_string()), ("per_page", per_page.to_string())];
    self.get_json(&format!("{}/series/", self.base_url), &query)
  }

  fn get_patch_json(&self, id: i64) -> Result<Value> {
    self.get_json(&format!("{}/patches/{}/", self.base_url, id), &[])
  }

  fn get_mbox(&self, url: &str) -> Result<String> {
    self
      .get(url, &[])?
      .into_string()
      .with_context(|| format!("reading mbox from {}", url))
  }

  fn list_comments_json(&self, patch_id: i64) -> Result<Value> {
    self.get_json(&format!("{}/patches/{}/comments/", self.base_url, patch_id), &[])
  }
}

/// Fixture backend: serves tracker payloads from PM_TEST_* variables.
///
/// - `PM_TEST_PROJECTS_JSON`: array of projects
/// - `PM_TEST_SERIES_JSON`: array of series (paged in memory)
/// - `PM_TEST_PATCHES_JSON`: object of patch id -> patch detail; the detail's `content` doubles as its mbox
/// - `PM_TEST_COMMENTS_JSON`: object of patch id -> array of comments
struct PatchworkEnvApi;

fn env_json(var: &str) -> Result<Option<Value>> {
  match std::env::var(var) {
    Ok(s) => serde_json::from_str(&s).map(Some).with_context(|| format!("parsing {}", var)),
    Err(_) => Ok(None),
  }
}

impl PatchworkApi for PatchworkEnvApi {
  fn probe_project(&self, _project: &str) -> Result<bool> {
    Ok(std::env::var(ENV_SERIES).is_ok())
  }

  fn list_projects_json(&self) -> Result<Value> {
    Ok(env_json(ENV_PROJECTS)?.unwrap_or_else(|| serde_json::json!([])))
  }

  fn list_series_page_json(&self, _project: &str, page: usize, per_page: usize) -> Result<Value> {
    let all = env_json(ENV_SERIES)?.unwrap_or_else(|| serde_json::json!([]));
    let items = all.fetch("").items();
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let slice: Vec<Value> = items.iter().skip(start).take(per_page).cloned().collect();

    Ok(Value::Array(slice))
  }

  fn list_latest_series_json(&self, per_page: usize) -> Result<Value> {
    self.list_series_page_json("", 1, per_page)
  }

  fn get_patch_json(&self, id: i64) -> Result<Value> {
    let patches = env_json(ENV_PATCHES)?.unwrap_or_else(|| serde_json::json!({}));
    patches
      .get(id.to_string())
      .cloned()
      .ok_or_else(|| anyhow!("GET patches/{}/ returned HTTP 404", id))
  }

  fn get_mbox(&self, url: &str) -> Result<String> {
    let patches = env_json(ENV_PATCHES)?.unwrap_or_else(|| serde_json::json!({}));
    patches
      .as_object()
      .into_iter()
      .flat_map(|m| m.values())
      .find(|p| p.fetch("mbox").as_str() == Some(url))
      .and_then(|p| p.fetch("content").to::<String>())
      .ok_or_else(|| anyhow!("GET {} returned HTTP 404", url))
  }

  fn list_comments_json(&self, patch_id: i64) -> Result<Value> {
    let comments = env_json(ENV_COMMENTS)?.unwrap_or_else(|| serde_json::json!({}));
    Ok(comments.get(patch_id.to_string()).cloned().unwrap_or_else(|| serde_json::json!([])))
  }
}

pub fn env_wants_mock() -> bool {
  [ENV_PROJECTS, ENV_SERIES, ENV_PATCHES, ENV_COMMENTS]
    .iter()
    .any(|k| std::env::var(k).is_ok())
}

/// Select the backend: fixtures when PM_TEST_* is present, HTTP otherwise.
pub fn build_api(base_url: &str, timeout: Duration) -> Box<dyn PatchworkApi> {
  if env_wants_mock() {
    debug!("using PM_TEST_* fixture backend");
    Box::new(PatchworkEnvApi)
  } else {
    Box::new(PatchworkHttpApi::new(base_url, timeout))
  }
}

#[cfg(any(test, feature = "testutil"))]
pub fn make_env_api() -> Box<dyn PatchworkApi> {
  Box::new(PatchworkEnvApi)
}
