#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated config file and data directory for one test
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::write(dir.path().join("todos.toml"), "").expect("write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("todos.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn slot_path(&self) -> PathBuf {
        self.data_dir().join("todos.json")
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).expect("write config");
    }

    pub fn write_slot(&self, contents: &str) {
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(self.slot_path(), contents).expect("write slot");
    }

    pub fn read_slot(&self) -> Option<String> {
        fs::read_to_string(self.slot_path()).ok()
    }

    /// `todos` with `--config` and `--data-dir` pointing into this env
    pub fn cmd(&self) -> Command {
        let mut cmd = todos_cmd();
        cmd.arg("--config")
            .arg(self.config_path())
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    /// Run a subcommand with `--json` and return the parsed envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run todos");
        assert!(
            output.status.success(),
            "todos {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json output")
    }

    /// Add a task and return its id
    pub fn add(&self, text: &str) -> String {
        let value = self.json(&["add", text]);
        value["data"]["task"]["id"]
            .as_str()
            .expect("task id")
            .to_string()
    }
}

pub fn todos_cmd() -> Command {
    let mut cmd = Command::cargo_bin("todos").expect("binary");
    cmd.env_remove("TODOS_CONFIG")
        .env_remove("TODOS_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}
