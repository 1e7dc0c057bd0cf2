//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A git repository with a bare `origin` remote next to it
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
}

impl TestRepo {
  /// Create a repo with one commit containing a pom.xml at `version`
  pub fn new(version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("work");
    let remote = root.path().join("origin.git");
    std::fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "origin.git"])?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;

    let repo = Self { _root: root, path, remote };
    repo.write_pom(version)?;
    repo.commit("Initial project")?;

    Ok(repo)
  }

  /// Write a Maven-style pom.xml with a default namespace
  pub fn write_pom(&self, version: &str) -> Result<()> {
    self.write_file(
      "pom.xml",
      &format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>common</artifactId>
  <version>{}</version>
</project>
"#,
        version
      ),
    )
  }

  /// Write release.toml with a publish step that runs `script` under sh
  pub fn write_publish_script(&self, script: &str) -> Result<()> {
    self.write_file(
      "release.toml",
      &format!(
        r#"[publish]
program = "sh"
args = ["-c", {}]
"#,
        toml_string(script)
      ),
    )
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  /// Commit all tracked and new files
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Tags in the local repository
  pub fn local_tags(&self) -> Result<Vec<String>> {
    tags_in(&self.path)
  }

  /// Tags in the bare remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    tags_in(&self.remote)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

fn tags_in(repo: &Path) -> Result<Vec<String>> {
  let output = git(repo, &["tag", "--list"])?;
  Ok(
    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(String::from)
      .collect(),
  )
}

/// Quote a string as a TOML basic string
fn toml_string(s: &str) -> String {
  format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Command for the tagrelease binary, run in `cwd`
pub fn tagrelease_cmd(cwd: &Path, args: &[&str]) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_tagrelease"));
  cmd.current_dir(cwd).args(args);
  cmd
}

/// Run tagrelease and return its output whatever the exit status
pub fn run_tagrelease(cwd: &Path, args: &[&str]) -> Result<Output> {
  tagrelease_cmd(cwd, args).output().context("Failed to run tagrelease")
}

/// Run tagrelease and fail unless it succeeds
pub fn run_tagrelease_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_tagrelease(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "tagrelease failed: tagrelease {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Parse `env` output (KEY=VALUE per line) into a map
pub fn parse_env_dump(dump: &str) -> BTreeMap<String, String> {
  dump
    .lines()
    .filter_map(|line| line.split_once('='))
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
