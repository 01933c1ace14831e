use assert_cmd::prelude::*;
use assert_cmd::cargo::cargo_bin_cmd;

/// Runs `--help` on a binary and checks it prints usage and nothing on stderr
fn assert_help_succeeds(bin: &str, mut cmd: assert_cmd::Command, expected: &str) {
  let assert = cmd.arg("--help").assert().success();

  let out = assert.get_output();
  let stdout = String::from_utf8_lossy(&out.stdout);
  println!("=== {} --help stdout ===\n\n{}\n=====================================", bin, stdout);

  assert!(
  	stdout.contains(expected),
  	"expected `{}` in --help output",
  	expected
  );
  assert!(
  	out.stderr.is_empty(),
  	"expected empty stderr for --help, got:\n{}",
  	String::from_utf8_lossy(&out.stderr)
  );
}

/// Tests that `--help` is handled successfully by the CLI.
#[test]
fn test_cli_help_success() {
  assert_help_succeeds("bookmarket-cli", cargo_bin_cmd!("bookmarket-cli"), "exchange");
}

/// Tests that `--help` is handled successfully by the server binary.
#[test]
fn test_server_help_success() {
  assert_help_succeeds("bookmarket", cargo_bin_cmd!("bookmarket"), "--port");
}

/// Tests that commands needing a session fail cleanly without one.
#[test]
fn test_cli_requires_signin() {
  let dir = tempfile::tempdir().unwrap();
  let mut cmd = cargo_bin_cmd!("bookmarket-cli");

  let assert = cmd
  	.env("BOOKMARKET_SESSION_FILE", dir.path().join("session.json"))
  	.args(["--server-url", "http://127.0.0.1:9", "wishlist", "list"])
  	.assert()
  	.failure();

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
  assert!(stderr.contains("Not signed in"), "unexpected stderr: {}", stderr);
}
