// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn tracker JSON into listings and fully assembled Series (patch bodies + threaded comments)
// role: tracker/fetch
// inputs: &dyn PatchworkApi; project name/hint; cutoff instant; FetchOptions
// outputs: ProjectInfo list, SeriesListing list, Series, RecentTitle list
// side_effects: Tracker calls through the api seam; warn! logs for skipped patches
// invariants:
// - Listing pages are walked newest-first and stop on a short page
// - A patch that cannot be fetched is skipped; an unparseable date fails the whole series
// - Comment fetch failures degrade to "no comments"
// errors: anyhow with context; AnalysisError::MalformedTimestamp is preserved for callers to downcast
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::api::{PatchworkApi, SERIES_PAGE_SIZE};
use crate::error::AnalysisError;
use crate::ext::serde_json::JsonFetch;
use crate::identity::format_person;
use crate::model::{Comment, Patch, Series, SeriesHeader};
use crate::util::parse_timestamp;

const APPLIED_STATES: &[&str] = &["accepted", "committed", "superseded"];
const MAX_PAGES: usize = 200;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectInfo {
  pub id: i64,
  pub name: String,
  pub link_name: String,
}

/// Patch entry as embedded in a series listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRef {
  pub id: i64,
  pub name: String,
  pub state: Option<String>,
  pub mbox: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SeriesListing {
  pub id: i64,
  pub name: String,
  pub date: DateTime<Utc>,
  pub submitter_name: String,
  pub submitter_email: String,
  pub total: usize,
  pub web_url: String,
  pub patches: Vec<PatchRef>,
  pub is_applied: bool,
}

impl SeriesListing {
  pub fn author(&self) -> String {
    format_person(&self.submitter_name, &self.submitter_email)
  }

  pub fn header(&self) -> SeriesHeader {
    SeriesHeader {
      id: self.id,
      raw_name: self.name.clone(),
      author: self.author(),
      date: self.date,
      total: self.total,
      web_url: self.web_url.clone(),
      is_applied: self.is_applied,
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
  /// Upper bound on patches fetched per series; 0 fetches all.
  pub max_patches: usize,
  pub include_comments: bool,
}

impl Default for FetchOptions {
  fn default() -> Self {
    Self { max_patches: 5, include_comments: true }
  }
}

/// Title line of a recent series on any project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTitle {
  pub name: String,
  pub date: String,
  pub project: String,
}

/// Result of a windowed listing.
#[derive(Debug, Clone, Default)]
pub struct RecentSeries {
  pub series: Vec<SeriesListing>,
  pub applied_excluded: usize,
}

fn patch_ref_from_json(v: &Value) -> Option<PatchRef> {
  Some(PatchRef {
    id: v.fetch("id").to::<i64>()?,
    name: v.fetch("name").to_or_default::<String>(),
    state: v.fetch("state").to::<String>(),
    mbox: v.fetch("mbox").to::<String>(),
  })
}

/// Map one `series/` entry; `None` when the id or date is unusable.
pub fn listing_from_json(v: &Value) -> Option<SeriesListing> {
  let id = v.fetch("id").to::<i64>()?;
  let date = parse_timestamp(v.fetch("date").as_str()?).ok()?;
  let patches: Vec<PatchRef> = v.fetch("patches").items().iter().filter_map(patch_ref_from_json).collect();
  let is_applied = is_series_applied(&patches);

  Some(SeriesListing {
    id,
    name: v.fetch("name").to::<String>().unwrap_or_else(|| "Untitled".to_string()),
    date,
    submitter_name: v.fetch("submitter.name").to_or_default::<String>(),
    submitter_email: v.fetch("submitter.email").to_or_default::<String>(),
    total: v.fetch("total").to_or_default::<usize>(),
    web_url: v.fetch("web_url").to_or_default::<String>(),
    patches,
    is_applied,
  })
}

/// Heuristic for "already merged": a pull request, or most of the first three patches in an applied state.
pub fn is_series_applied(patches: &[PatchRef]) -> bool {
  let Some(first) = patches.first() else { return false };

  let name = first.name.to_lowercase();
  if name.contains("[git,pull]") || name.contains("git pull") {
    return true;
  }

  let states: Vec<String> = patches.iter().take(3).filter_map(|p| p.state.as_deref()).map(str::to_lowercase).collect();
  let applied = states.iter().filter(|s| APPLIED_STATES.contains(&s.as_str())).count();

  !states.is_empty() && applied * 2 > states.len()
}

pub fn list_projects(api: &dyn PatchworkApi) -> Result<Vec<ProjectInfo>> {
  let json = api.list_projects_json().context("listing projects")?;

  Ok(
    json
      .fetch("")
      .items()
      .iter()
      .map(|p| ProjectInfo {
        id: p.fetch("id").to_or_default::<i64>(),
        name: p.fetch("name").to::<String>().unwrap_or_else(|| "Unknown".to_string()),
        link_name: p.fetch("link_name").to::<String>().unwrap_or_else(|| "Unknown".to_string()),
      })
      .collect(),
  )
}

/// Latest series titles across all projects, newest first, for spotting naming patterns.
pub fn latest_titles(api: &dyn PatchworkApi, limit: usize) -> Result<Vec<RecentTitle>> {
  let json = api.list_latest_series_json(limit).context("listing latest series")?;

  Ok(
    json
      .fetch("")
      .items()
      .iter()
      .take(limit)
      .map(|s| RecentTitle {
        name: s.fetch("name").to::<String>().unwrap_or_else(|| "Untitled".to_string()),
        date: s.fetch("date").to_or_default::<String>().chars().take(10).collect(),
        project: s.fetch("project.name").to::<String>().unwrap_or_else(|| "Unknown".to_string()),
      })
      .collect(),
  )
}

/// Resolve the project identifier used in `series/?project=`.
///
/// The hint itself wins when the tracker answers for it; otherwise the first
/// project whose name or link name contains the hint (case-insensitive).
pub fn resolve_project(api: &dyn PatchworkApi, hint: &str) -> Result<String> {
  if api.probe_project(hint)? {
    debug!(project = hint, "project answered probe");
    return Ok(hint.to_string());
  }

  let needle = hint.to_lowercase();
  let projects = list_projects(api)?;
  info!(count = projects.len(), hint, "searching projects");

  projects
    .iter()
    .find(|p| p.name.to_lowercase().contains(&needle) || p.link_name.to_lowercase().contains(&needle))
    .map(|p| if p.link_name != "Unknown" { p.link_name.clone() } else { p.id.to_string() })
    .ok_or_else(|| anyhow!("project {:?} is not accessible on this tracker", hint))
}

/// List series posted at or after `cutoff`, newest first.
pub fn fetch_recent_series(
  api: &dyn PatchworkApi,
  project: &str,
  cutoff: DateTime<Utc>,
  include_applied: bool,
) -> Result<RecentSeries> {
  let mut out = RecentSeries::default();

  for page in 1..=MAX_PAGES {
    let data = api
      .list_series_page_json(project, page, SERIES_PAGE_SIZE)
      .with_context(|| format!("listing series page {}", page))?;
    let items = data.fetch("").items();

    for raw in items {
      let Some(listing) = listing_from_json(raw) else {
        debug!("skipping series entry with unusable data");
        continue;
      };
      if listing.date < cutoff {
        continue;
      }
      if !include_applied && listing.is_applied {
        out.applied_excluded += 1;
        continue;
      }
      out.series.push(listing);
    }

    if items.len() < SERIES_PAGE_SIZE {
      break;
    }
  }

  if !include_applied {
    info!(excluded = out.applied_excluded, "excluded applied series");
  }

  out.series.sort_by(|a, b| b.date.cmp(&a.date));

  Ok(out)
}

fn timestamp_at(v: &Value, path: &str) -> Result<DateTime<Utc>> {
  let raw = v.fetch(path).to_or_default::<String>();
  Ok(parse_timestamp(&raw)?)
}

fn fetch_patch(api: &dyn PatchworkApi, r: &PatchRef, series_id: i64) -> Result<Patch> {
  let detail = api.get_patch_json(r.id)?;
  let mbox_url = detail
    .fetch("mbox")
    .to::<String>()
    .or_else(|| r.mbox.clone())
    .ok_or_else(|| anyhow!("patch {} has no mbox link", r.id))?;
  let body = api.get_mbox(&mbox_url)?;

  Ok(Patch {
    id: r.id,
    title: detail.fetch("name").to::<String>().unwrap_or_else(|| r.name.clone()),
    author: format_person(
      &detail.fetch("submitter.name").to_or_default::<String>(),
      &detail.fetch("submitter.email").to_or_default::<String>(),
    ),
    date: timestamp_at(&detail, "date")?,
    body,
    series_id,
    state: detail.fetch("state").to::<String>().or_else(|| r.state.clone()),
    web_url: detail.fetch("web_url").to_or_default::<String>(),
  })
}

fn fetch_comments(api: &dyn PatchworkApi, patch_id: i64) -> Result<Vec<Comment>> {
  let json = match api.list_comments_json(patch_id) {
    Ok(v) => v,
    Err(e) => {
      debug!(patch_id, error = %e, "comments unavailable");
      return Ok(Vec::new());
    }
  };

  json
    .fetch("")
    .items()
    .iter()
    .map(|c| -> Result<Comment> {
      Ok(Comment {
        author: format_person(
          &c.fetch("submitter.name").to_or_default::<String>(),
          &c.fetch("submitter.email").to_or_default::<String>(),
        ),
        date: timestamp_at(c, "date")?,
        body: c.fetch("content").to_or_default::<String>(),
        patch_id: Some(patch_id),
      })
    })
    .collect()
}

/// Fetch bodies and discussion for a listed series and assemble the [`Series`].
///
/// The returned series may have no patches when none could be fetched; analysis rejects that.
pub fn fetch_series(api: &dyn PatchworkApi, listing: &SeriesListing, opts: FetchOptions) -> Result<Series> {
  let limit = if opts.max_patches == 0 { usize::MAX } else { opts.max_patches };
  let mut patches = Vec::new();

  for r in listing.patches.iter().take(limit) {
    match fetch_patch(api, r, listing.id) {
      Ok(p) => patches.push(p),
      Err(e) if e.downcast_ref::<AnalysisError>().is_some() => {
        return Err(e.context(format!("series {}", listing.id)));
      }
      Err(e) => warn!(patch = r.id, series = listing.id, "skipping patch: {:#}", e),
    }
  }

  let mut comments = Vec::new();
  if opts.include_comments {
    for p in &patches {
      comments.extend(fetch_comments(api, p.id).with_context(|| format!("series {}", listing.id))?);
    }
  }

  debug!(series = listing.id, patches = patches.len(), comments = comments.len(), "fetched series");

  Ok(Series::new(listing.header(), patches, comments))
}

/// Find one series by id within a listing window.
pub fn find_listing(listings: &[SeriesListing], id: i64) -> Result<&SeriesListing> {
  match listings.iter().find(|s| s.id == id) {
    Some(s) => Ok(s),
    None => bail!("series {} not found in the selected window", id),
  }
}
