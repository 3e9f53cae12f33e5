use test_support::cmd_bin;

#[test]
fn cli_generates_man_page() {
  let out = cmd_bin("patch-monitor").args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let s = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff manpage starting with .TH and mentions the binary name
  assert!(s.contains(".TH"));
  assert!(s.contains("patch-monitor"));
  assert!(s.contains("export-json"));
}
