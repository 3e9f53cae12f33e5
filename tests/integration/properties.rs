use chrono::{Duration, TimeZone, Utc};
use patch_monitor::{analyze, normalize, Comment, EngagementPolicy, Patch, Series, SeriesHeader};
use proptest::prelude::*;

fn series_with(comments: &[(String, String)]) -> Series {
  let t0 = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).single().unwrap();
  let patch = Patch {
    id: 1,
    title: "[PATCH] p".into(),
    author: "Author <author@x.org>".into(),
    date: t0,
    body: "Signed-off-by: Author <author@x.org>".into(),
    series_id: 1,
    state: None,
    web_url: String::new(),
  };
  let comments = comments
    .iter()
    .enumerate()
    .map(|(i, (who, body))| Comment {
      author: format!("{} <{}@x.org>", who, who),
      date: t0 + Duration::hours(i as i64),
      body: body.clone(),
      patch_id: Some(1),
    })
    .collect();
  let header = SeriesHeader {
    id: 1,
    raw_name: "[PATCH] p".into(),
    author: "Author <author@x.org>".into(),
    date: t0,
    total: 1,
    web_url: String::new(),
    is_applied: false,
  };
  Series::new(header, vec![patch], comments)
}

fn comment_strategy() -> impl Strategy<Value = (String, String)> {
  let who = prop::sample::select(vec!["ann", "bob", "cat", "dan"]).prop_map(String::from);
  let body = prop_oneof![
    Just(String::from("looks fine")),
    who.clone().prop_map(|w| format!("Reviewed-by: {w} <{w}@x.org>")),
    who.clone().prop_map(|w| format!("Acked-by: {w} <{w}@x.org>")),
    who.clone().prop_map(|w| format!("> Acked-by: {w} <{w}@x.org>")),
  ];
  (who, body)
}

proptest! {
  #[test]
  fn normalizing_a_canonical_name_is_stable(
    prefix in prop::sample::select(vec!["", "[PATCH] ", "[PATCH v3 1/4] ", "[RFC PATCH v2 RESEND 0/7] ", "[PATCHv5] "]),
    title in "[a-z][a-z: ]{0,30}[a-z]",
  ) {
    let first = normalize(&format!("{prefix}{title}"));
    let again = normalize(&first.canonical_name);
    prop_assert_eq!(&again.canonical_name, &first.canonical_name);
  }

  #[test]
  fn adding_a_comment_never_lowers_counts(
    comments in prop::collection::vec(comment_strategy(), 0..8),
    extra in comment_strategy(),
  ) {
    let policy = EngagementPolicy::default();
    let now = Utc.with_ymd_and_hms(2025, 8, 2, 0, 0, 0).single().unwrap();
    let before = analyze(&series_with(&comments), now, &policy).unwrap();

    let mut more = comments.clone();
    more.push(extra);
    let after = analyze(&series_with(&more), now, &policy).unwrap();

    prop_assert!(after.signoff_count >= before.signoff_count);
    prop_assert!(after.ack_count >= before.ack_count);
    prop_assert!(after.review_count >= before.review_count);
    prop_assert!(after.unique_participants >= before.unique_participants);
  }
}
