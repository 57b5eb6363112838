//! Helpers for driving the `skein` binary in a scratch directory

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub struct TestRepo {
    dir: TempDir,
}

pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for CommandResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl TestRepo {
    /// Empty directory, not yet initialized
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Directory with `skein init` already run
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.ok(&["init"]);
        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn run(&self, args: &[&str]) -> CommandResult {
        Command::new(env!("CARGO_BIN_EXE_skein"))
            .args(args)
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run skein")
            .into()
    }

    /// Run with `input` piped to stdin
    pub fn run_with_input(&self, args: &[&str], input: &str) -> CommandResult {
        let mut child = Command::new(env!("CARGO_BIN_EXE_skein"))
            .args(args)
            .current_dir(self.root())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn skein");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        child.wait_with_output().expect("Failed to wait for skein").into()
    }

    /// Run and assert success, returning stdout
    pub fn ok(&self, args: &[&str]) -> String {
        let result = self.run(args);
        assert!(
            result.success,
            "skein {:?} failed\nstdout: {}\nstderr: {}",
            args, result.stdout, result.stderr
        );
        result.stdout
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(full, content).expect("Failed to write file");
    }

    pub fn read(&self, path: &str) -> Option<String> {
        fs::read_to_string(self.root().join(path)).ok()
    }

    pub fn meta(&self, name: &str) -> String {
        fs::read_to_string(self.meta_path(name))
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    pub fn meta_path(&self, name: &str) -> PathBuf {
        self.root().join(".skein").join(name)
    }

    /// Current HEAD hash
    pub fn head(&self) -> String {
        self.meta("HEAD")
    }

    pub fn branch(&self, name: &str) -> String {
        self.meta(&format!("branches/{}", name))
    }

    /// Write files then commit; returns the new HEAD
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> String {
        for (path, content) in files {
            self.write(path, content);
        }
        self.ok(&["commit", message]);
        self.head()
    }
}
