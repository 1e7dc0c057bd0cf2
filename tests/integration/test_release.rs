//! Integration tests for the release workflow

use crate::helpers::{TestRepo, parse_env_dump, run_tagrelease, run_tagrelease_ok, tagrelease_cmd};
use anyhow::Result;

#[test]
fn test_release_from_descriptor() -> Result<()> {
  let repo = TestRepo::new("2.3.1")?;
  repo.write_publish_script("touch published")?;

  let output = run_tagrelease_ok(&repo.path, &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Release 2.3.1 completed"), "stdout: {}", stdout);
  assert_eq!(repo.local_tags()?, vec!["2.3.1".to_string()]);
  assert_eq!(repo.remote_tags()?, vec!["2.3.1".to_string()]);
  assert!(repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_dirty_tree_aborts_before_any_side_effect() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_publish_script("touch published")?;
  repo.write_pom("1.0.1-SNAPSHOT")?;

  let output = run_tagrelease(&repo.path, &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr.contains("Working directory must be clean"), "stderr: {}", stderr);
  assert!(repo.local_tags()?.is_empty());
  assert!(repo.remote_tags()?.is_empty());
  assert!(!repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_force_skips_dirty_check() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_publish_script("touch published")?;
  repo.write_pom("1.1.0")?;

  run_tagrelease_ok(&repo.path, &["--force"])?;

  // Version comes from the working copy, not HEAD
  assert_eq!(repo.remote_tags()?, vec!["1.1.0".to_string()]);
  assert!(repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_missing_version_element_creates_no_tag() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_file(
    "pom.xml",
    r#"<project xmlns="urn:x"><artifactId>no-version</artifactId></project>"#,
  )?;
  repo.commit("Drop version")?;
  repo.write_publish_script("touch published")?;

  let output = run_tagrelease(&repo.path, &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("version resolution"), "stderr: {}", stderr);
  assert!(repo.local_tags()?.is_empty());
  assert!(!repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_missing_descriptor() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;

  let output = run_tagrelease(&repo.path, &["--descriptor", "build/pom.xml"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("Descriptor file not found"), "stderr: {}", stderr);
  assert!(repo.local_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_publish_failure_leaves_tag_pushed() -> Result<()> {
  let repo = TestRepo::new("3.0.0")?;
  repo.write_publish_script("exit 1")?;

  let output = run_tagrelease(&repo.path, &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("publish"), "stderr: {}", stderr);
  assert_eq!(repo.remote_tags()?, vec!["3.0.0".to_string()]);
  assert_eq!(repo.local_tags()?, vec!["3.0.0".to_string()]);

  Ok(())
}

#[test]
fn test_publish_exit_code_is_propagated() -> Result<()> {
  let repo = TestRepo::new("3.0.1")?;
  repo.write_publish_script("exit 42")?;

  let output = run_tagrelease(&repo.path, &[])?;
  assert_eq!(output.status.code(), Some(42));

  Ok(())
}

#[test]
fn test_existing_tag_stops_before_publish() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_publish_script("touch published")?;
  crate::helpers::git(&repo.path, &["tag", "1.0.0"])?;

  let output = run_tagrelease(&repo.path, &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr.contains("already exists"), "stderr: {}", stderr);
  assert!(repo.remote_tags()?.is_empty());
  assert!(!repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_push_failure_stops_before_publish() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_publish_script("touch published")?;

  let output = run_tagrelease(&repo.path, &["--remote", "missing-remote"])?;

  assert_eq!(output.status.code(), Some(2));
  assert_eq!(repo.local_tags()?, vec!["1.0.0".to_string()]);
  assert!(!repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_literal_version_with_prefix() -> Result<()> {
  let repo = TestRepo::new("0.0.1")?;
  repo.write_publish_script("true")?;

  run_tagrelease_ok(&repo.path, &["--release-version", "5.0.0", "--tag-prefix", "v"])?;

  assert_eq!(repo.remote_tags()?, vec!["v5.0.0".to_string()]);

  Ok(())
}

#[test]
fn test_annotated_tag_from_config() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  repo.write_file(
    "release.toml",
    r#"[tag]
prefix = "v"
message = "Release {version}"

[publish]
program = "true"
args = []
"#,
  )?;

  run_tagrelease_ok(&repo.path, &[])?;

  let output = crate::helpers::git(&repo.remote, &["cat-file", "-p", "v1.2.3"])?;
  let object = String::from_utf8_lossy(&output.stdout);
  assert!(object.contains("Release 1.2.3"), "tag object: {}", object);

  Ok(())
}

#[test]
fn test_publish_environment_has_one_override() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_publish_script("env > ../env.out")?;

  let mut ambient = vec![
    ("TAGRELEASE_MARKER".to_string(), "keep-me".to_string()),
    ("JAVA_HOME".to_string(), "/opt/wrong-jdk".to_string()),
    ("LANG".to_string(), "C".to_string()),
  ];
  for key in ["PATH", "HOME"] {
    if let Ok(value) = std::env::var(key) {
      ambient.push((key.to_string(), value));
    }
  }

  let output = tagrelease_cmd(&repo.path, &[])
    .env_clear()
    .envs(ambient.iter().map(|(k, v)| (k, v)))
    .output()?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let dump = repo.read_file("../env.out")?;
  let seen = parse_env_dump(&dump);

  assert_eq!(seen.get("JAVA_HOME").map(String::as_str), Some("/usr/lib/jvm/java-8-jdk"));
  for (key, value) in ambient.iter().filter(|(k, _)| k != "JAVA_HOME") {
    assert_eq!(seen.get(key), Some(value), "{} should pass through unchanged", key);
  }

  // The shell itself may add a few bookkeeping variables
  let shell_added = ["PWD", "OLDPWD", "SHLVL", "_"];
  for key in seen.keys() {
    assert!(
      ambient.iter().any(|(k, _)| k == key) || shell_added.contains(&key.as_str()),
      "unexpected variable {} in publish environment",
      key
    );
  }

  Ok(())
}

#[test]
fn test_custom_env_override_from_config() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_file(
    "release.toml",
    r#"[publish]
program = "sh"
args = ["-c", "printf '%s' \"$GRADLE_USER_HOME\" > ../home.out"]
env_key = "GRADLE_USER_HOME"
env_value = "/cache/gradle"
"#,
  )?;

  run_tagrelease_ok(&repo.path, &[])?;

  let home = repo.read_file("../home.out")?;
  assert_eq!(home, "/cache/gradle");

  Ok(())
}

#[test]
fn test_dry_run_json_plan() -> Result<()> {
  let repo = TestRepo::new("4.2.0")?;
  repo.write_publish_script("touch published")?;

  let output = run_tagrelease_ok(&repo.path, &["--dry-run", "--json", "--tag-prefix", "v"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let plan: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(plan["version"], "4.2.0");
  assert_eq!(plan["tag"], "v4.2.0");
  assert_eq!(plan["remote"], "origin");
  assert_eq!(plan["publish_command"], "sh -c touch published");

  assert!(repo.local_tags()?.is_empty());
  assert!(!repo.file_exists("published"));

  Ok(())
}

#[test]
fn test_dry_run_still_checks_working_tree() -> Result<()> {
  let repo = TestRepo::new("4.2.0")?;
  repo.write_pom("4.3.0")?;

  let output = run_tagrelease(&repo.path, &["--dry-run"])?;
  assert_eq!(output.status.code(), Some(3));

  Ok(())
}

#[test]
fn test_stack_argument_is_accepted_and_warned() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_publish_script("true")?;

  let output = run_tagrelease_ok(&repo.path, &["production"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(stderr.contains("no effect"), "stderr: {}", stderr);
  assert_eq!(repo.remote_tags()?, vec!["1.0.0".to_string()]);

  Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
  let repo = TestRepo::new("1.0.0")?;
  repo.write_file("release.toml", "[publish\nprogram = ")?;

  let output = run_tagrelease(&repo.path, &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("release.toml"), "stderr: {}", stderr);
  assert!(repo.local_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_repository_without_commits_fails_precondition() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  crate::helpers::git(dir.path(), &["init"])?;
  std::fs::write(
    dir.path().join("pom.xml"),
    "<project><version>1.0.0</version></project>",
  )?;

  let output = run_tagrelease(dir.path(), &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr.contains("precondition check"), "stderr: {}", stderr);
  assert!(!stderr.contains("tag creation"), "stderr: {}", stderr);

  Ok(())
}
