// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build the XML-style <patchset> context and executive-brief request sent to the model
// role: summarize/prompt
// inputs: Series (fetched bodies + comments), SeriesReport, PromptOptions
// outputs: Prompt text
// invariants:
// - Deterministic for the same inputs; no clock reads
// - Patch bodies and comments are clipped on UTF-8 boundaries
// - At most COMMENTS_PER_PATCH comments per patch, at most five names per endorsement list
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;

use crate::model::{Series, SeriesReport};
use crate::util::clip_text;

pub const COMMENTS_PER_PATCH: usize = 3;
pub const MAX_COMMENT_CHARS: usize = 1500;
const NAMES_PER_ENDORSEMENT: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct PromptOptions {
  pub max_patches: usize,
  pub max_patch_chars: usize,
  /// False when comments were deliberately not fetched.
  pub include_comments: bool,
}

impl Default for PromptOptions {
  fn default() -> Self {
    Self { max_patches: 5, max_patch_chars: 3000, include_comments: true }
  }
}

fn attr(s: &str) -> String {
  s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

fn endorsement(out: &mut String, tag: &str, names: &[String]) {
  let shown: Vec<&str> = names.iter().take(NAMES_PER_ENDORSEMENT).map(String::as_str).collect();
  let _ = writeln!(out, "      <{tag} count=\"{}\">{}</{tag}>", names.len(), shown.join(", "));
}

fn engagement_xml(out: &mut String, report: &SeriesReport) {
  let e = &report.engagement;

  out.push_str("  <engagement_analysis>\n");
  out.push_str("    <version_info>\n");
  let _ = writeln!(out, "      <current_version>{}</current_version>", report.version);
  let _ = writeln!(out, "      <is_resend>{}</is_resend>", report.is_resend);
  let _ = writeln!(out, "      <days_since_posting>{}</days_since_posting>", report.days_since_posting);
  out.push_str("    </version_info>\n");
  out.push_str("    <endorsements>\n");
  endorsement(out, "signed_off_by", &e.endorsers.signed_off_by);
  endorsement(out, "acked_by", &e.endorsers.acked_by);
  endorsement(out, "reviewed_by", &e.endorsers.reviewed_by);
  endorsement(out, "tested_by", &e.endorsers.tested_by);
  out.push_str("    </endorsements>\n");
  out.push_str("    <activity_indicators>\n");
  let _ = writeln!(out, "      <comment_count>{}</comment_count>", report.comment_count);
  let _ = writeln!(out, "      <unique_participants>{}</unique_participants>", e.unique_participants);
  let _ = writeln!(out, "      <days_since_last_activity>{}</days_since_last_activity>", e.days_since_activity);
  out.push_str("    </activity_indicators>\n");
  let _ = writeln!(out, "    <computed_status>{}</computed_status>", e.status.label());
  out.push_str("  </engagement_analysis>\n");
}

fn patches_xml(out: &mut String, series: &Series, opts: &PromptOptions) {
  out.push_str("  <patches>\n");

  for (i, patch) in series.patches.iter().take(opts.max_patches.max(1)).enumerate() {
    let (content, _) = clip_text(&patch.body, opts.max_patch_chars);
    let _ = writeln!(out, "    <patch id=\"{}\" name=\"{}\">", i + 1, attr(&patch.title));
    let _ = writeln!(out, "      <content>\n{}\n      </content>", content);

    out.push_str("      <comments>\n");
    if !opts.include_comments {
      out.push_str("        <!-- Comments not fetched -->\n");
    } else {
      let mut thread = series.comments.iter().filter(|c| c.patch_id == Some(patch.id)).peekable();
      if thread.peek().is_none() {
        out.push_str("        <!-- No comments found for this patch -->\n");
      }
      for c in thread.take(COMMENTS_PER_PATCH) {
        let (body, _) = clip_text(&c.body, MAX_COMMENT_CHARS);
        let _ = writeln!(
          out,
          "        <comment author=\"{}\" date=\"{}\">\n{}\n        </comment>",
          attr(&c.author),
          c.date.format("%Y-%m-%d"),
          body
        );
      }
    }
    out.push_str("      </comments>\n");
    out.push_str("    </patch>\n");
  }

  out.push_str("  </patches>\n");
}

/// The `<patchset>` context block alone.
pub fn build_context(series: &Series, report: &SeriesReport, opts: &PromptOptions) -> String {
  let mut out = String::new();

  out.push_str("<patchset>\n  <metadata>\n");
  let _ = writeln!(out, "    <title>{}</title>", report.raw_name);
  let _ = writeln!(out, "    <canonical_title>{}</canonical_title>", report.canonical_name);
  let _ = writeln!(out, "    <author>{}</author>", report.author);
  let _ = writeln!(out, "    <date>{}</date>", report.date.format("%Y-%m-%d"));
  let _ = writeln!(out, "    <total_patches>{}</total_patches>", report.total_patches);
  let _ = writeln!(
    out,
    "    <analyzed_patches>{}</analyzed_patches>",
    report.analyzed_patches.min(opts.max_patches.max(1))
  );
  let _ = writeln!(out, "    <patchwork_url>{}</patchwork_url>", report.web_url);
  out.push_str("  </metadata>\n\n");

  engagement_xml(&mut out, report);
  out.push('\n');
  patches_xml(&mut out, series, opts);
  out.push_str("</patchset>");

  out
}

const ANALYSIS_REQUEST: &str = r#"<analysis_request>
  <output_format>markdown</output_format>
  <target_audience>Director of Engineering familiar with Linux kernel development and Rust-for-Linux strategy,
  but potentially unfamiliar with specific subsystems</target_audience>

  <role>You are a technical adviser providing succinct executive briefings. The director needs to understand
  what matters, why it matters, and be able to explain it to stakeholders. Assume deep kernel knowledge but
  explain subsystem-specific details.</role>

  <engagement_guidance>
    <status_indicators>
      - High version (v5+) + recent + many acks = "Ready for merge"
      - Recent high version + endorsements + minimal discussion = "Mature/stable"
      - Old posting (30+ days) + no acks + no activity = "Stalled"
      - Recent v1 + active discussion = "Early development"
      - Quality concerns in comments = "Needs attention"
    </status_indicators>
    <computed_status>The computed_status field is a rule-based signal; confirm or correct it from the discussion.</computed_status>
  </engagement_guidance>

  <format_requirements>
    <structure>
      # Executive Brief: {title}

      **Status**: [Ready for merge | Under review | Stalled | Quality concerns | Strategic development]
      **Significance**: [Major advance | Incremental improvement | Bug fix | Infrastructure | Experiment]

      ## What & Why
      [2-3 sentences: what this does and why it matters to Rust-for-Linux]

      ## Technical Context (expand if subsystem explanation needed)
      [Subsystem-specific details, architecture differences, interaction with existing C code]

      ## Issues & Conflicts (only if present)
      [Problems requiring director attention: quality concerns, community conflicts, blocking issues]

      ## Stakeholder Summary (if strategically significant)
      [Key talking points for external discussions]
    </structure>

    <guidelines>
      - Skip sections that don't contain meaningful information
      - Focus on what requires director attention or stakeholder communication
      - Be succinct except in Technical Context where detail helps
      - Highlight strategic advances in Rust-for-Linux adoption
      - Flag quality issues, conflicts, or unusual patterns
    </guidelines>
  </format_requirements>
</analysis_request>"#;

/// Full prompt: instructions, `<patchset>` context, and the brief request.
pub fn build_prompt(series: &Series, report: &SeriesReport, opts: &PromptOptions) -> String {
  let context = build_context(series, report, opts);
  let request = ANALYSIS_REQUEST.replace("{title}", &report.raw_name);

  format!(
    "Analyze this Rust for Linux kernel patchset and provide a comprehensive markdown report.\n\n{}\n\n{}\n\nProvide an executive brief following the structure above, including only sections with meaningful content.\n",
    context, request
  )
}
