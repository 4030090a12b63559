//! Shared testing utilities for strategy-maker CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A brief with every required field, as the CLI reads it from disk.
#[allow(dead_code)]
pub const BRIEF_JSON: &str = r#"{
  "businessType": "B2B",
  "business": "X",
  "product": "Y",
  "goal": "lead",
  "goalValue": "100 signups",
  "budget": "1,000,000 JPY",
  "period": "6 months",
  "persona": "SMB owners"
}"#;

/// Testing harness providing an isolated working directory for CLI runs.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    /// Directory CLI invocations run in.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for the compiled `strategy-maker` binary.
    ///
    /// Ambient configuration and credentials are cleared so results do not
    /// depend on the developer's environment.
    pub fn cli(&self) -> Command {
        let mut cmd =
            Command::cargo_bin("strategy-maker").expect("Failed to locate strategy-maker binary");
        cmd.current_dir(&self.work_dir)
            .env("HOME", self.root.path())
            .env("RUST_LOG", "warn")
            .env_remove("OPENAI_API_KEY")
            .env_remove("STRATEGY_MAKER_CONFIG");
        cmd
    }

    /// Write a file into the work directory and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Files in `dir` (relative to the work directory) with the given extension.
    pub fn exported(&self, dir: &str, extension: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(self.work_dir.join(dir)) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                name.starts_with("marketing-strategy-")
                    && path.extension().and_then(|e| e.to_str()) == Some(extension)
            })
            .collect();
        paths.sort();
        paths
    }
}
