use chrono::{DateTime, Duration, TimeZone, Utc};
use patch_monitor::{analyze, analyze_at, normalize, AnalysisError, Comment, EngagementPolicy, Patch, Series, SeriesHeader, Status};

fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).single().unwrap()
}

fn patch(id: i64, body: &str, day: i64) -> Patch {
  Patch {
    id,
    title: format!("[PATCH v2 {}/2] rust: demo", id),
    author: "Author One <author@example.org>".into(),
    date: t0() + Duration::days(day),
    body: body.into(),
    series_id: 7,
    state: Some("new".into()),
    web_url: String::new(),
  }
}

fn comment(author: &str, body: &str, day: i64) -> Comment {
  Comment { author: author.into(), date: t0() + Duration::days(day), body: body.into(), patch_id: Some(1) }
}

fn series(patches: Vec<Patch>, comments: Vec<Comment>) -> Series {
  let header = SeriesHeader {
    id: 7,
    raw_name: "[PATCH v2 0/2] rust: demo".into(),
    author: "Author One <author@example.org>".into(),
    date: t0(),
    total: patches.len(),
    web_url: "https://patchwork.kernel.org/project/rust-for-linux/list/?series=7".into(),
    is_applied: false,
  };
  Series::new(header, patches, comments)
}

fn at(day: i64) -> DateTime<Utc> {
  t0() + Duration::days(day)
}

#[test]
fn reviewed_and_acked_series_is_ready() {
  let s = series(
    vec![patch(1, "Signed-off-by: Author One <author@example.org>", 0)],
    vec![
      comment("Rita Reviewer <rita@example.org>", "Reviewed-by: Rita Reviewer <rita@example.org>", 2),
      comment("Ali Acker <ali@example.org>", "Acked-by: Ali Acker <ali@example.org>", 3),
    ],
  );
  let e = analyze(&s, at(5), &EngagementPolicy::default()).unwrap();
  assert_eq!(e.status, Status::Ready);
  assert_eq!((e.signoff_count, e.review_count, e.ack_count), (1, 1, 1));
  assert_eq!(e.days_since_activity, 2);
}

#[test]
fn unendorsed_series_needs_revision_even_when_busy() {
  let s = series(
    vec![patch(1, "no tags here", 0)],
    vec![comment("A <a@x.org>", "hmm", 1), comment("B <b@x.org>", "agreed", 1)],
  );
  assert_eq!(analyze(&s, at(2), &EngagementPolicy::default()).unwrap().status, Status::NeedsRevision);
}

#[test]
fn quiet_series_stalls_after_threshold() {
  let s = series(vec![patch(1, "Signed-off-by: Author One <author@example.org>", 0)], vec![]);
  let policy = EngagementPolicy::default();
  assert_eq!(analyze(&s, at(30), &policy).unwrap().status, Status::Unknown);
  assert_eq!(analyze(&s, at(31), &policy).unwrap().status, Status::Stalled);
}

#[test]
fn recent_multi_party_discussion_is_active() {
  let s = series(
    vec![patch(1, "Signed-off-by: Author One <author@example.org>", 0)],
    vec![
      comment("Eve <eve@x.org>", "question", 1),
      comment("Author One <author@example.org>", "answer", 1),
      comment("Frank <frank@x.org>", "follow-up", 2),
    ],
  );
  let e = analyze(&s, at(4), &EngagementPolicy::default()).unwrap();
  assert_eq!(e.status, Status::ActiveDiscussion);
  assert_eq!(e.participants, vec!["Eve".to_string(), "Frank".to_string()]);
}

#[test]
fn activity_after_now_clamps_to_zero_days() {
  let s = series(vec![patch(1, "Signed-off-by: Author One <author@example.org>", 10)], vec![]);
  let e = analyze(&s, at(2), &EngagementPolicy::default()).unwrap();
  assert_eq!(e.days_since_activity, 0);
}

#[test]
fn series_without_patches_is_invalid() {
  let s = series(vec![], vec![comment("A <a@x.org>", "ping", 1)]);
  let err = analyze(&s, at(2), &EngagementPolicy::default()).unwrap_err();
  assert!(matches!(err, AnalysisError::InvalidSeries { .. }));
}

#[test]
fn analyze_at_parses_now_and_reports_bad_timestamps() {
  let s = series(vec![patch(1, "Signed-off-by: Author One <author@example.org>", 0)], vec![]);
  let e = analyze_at(&s, "2025-08-11T09:00:00Z", &EngagementPolicy::default()).unwrap();
  assert_eq!(e.days_since_activity, 10);

  let err = analyze_at(&s, "yesterday-ish", &EngagementPolicy::default()).unwrap_err();
  assert!(matches!(err, AnalysisError::MalformedTimestamp { .. }));
}

#[test]
fn zpool_revision_with_recent_replies_is_active_discussion() {
  let header = SeriesHeader {
    id: 42,
    raw_name: "[PATCH v2] rust: zpool: add abstraction".into(),
    author: "Jane Doe <jane@example.org>".into(),
    date: at(0),
    total: 1,
    web_url: String::new(),
    is_applied: false,
  };
  let patch = Patch {
    id: 1,
    title: "[PATCH v2] rust: zpool: add abstraction".into(),
    author: "Jane Doe <jane@example.org>".into(),
    date: at(0),
    body: "Add a zpool abstraction.".into(),
    series_id: 42,
    state: Some("new".into()),
    web_url: String::new(),
  };
  let s = Series::new(
    header,
    vec![patch],
    vec![
      comment("A <a@example.org>", "Signed-off-by: A <a@example.org>", 1),
      comment("B <b@example.org>", "Thanks, will take another look.", 3),
    ],
  );

  let name = normalize(&s.raw_name);
  assert_eq!(name.canonical_name, "rust: zpool: add abstraction");
  assert_eq!(name.version, 2);
  assert!(!name.is_resend);
  assert_eq!(s.canonical_name, "rust: zpool: add abstraction");
  assert_eq!(s.version, 2);

  let e = analyze(&s, at(10), &EngagementPolicy::default()).unwrap();
  assert_eq!(e.signoff_count, 1);
  assert_eq!(e.ack_count, 0);
  assert_eq!(e.review_count, 0);
  assert_eq!(e.unique_participants, 2);
  assert_eq!(e.latest_activity_date, at(3));
  assert_eq!(e.days_since_activity, 7);
  assert_eq!(e.status, Status::ActiveDiscussion);

  // one more quiet day leaves the active window
  assert_eq!(analyze(&s, at(11), &EngagementPolicy::default()).unwrap().status, Status::Unknown);
}
