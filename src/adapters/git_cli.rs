//! `git` command-line implementation of the RepositoryInspector port.

use crate::ports::RepositoryInspector;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

use super::DEFAULT_REMOTE;

pub struct GitCli {
    workdir: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    pub fn with_remote(mut self, remote: &str) -> Self {
        self.remote = remote.to_string();
        self
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        trace!(?args, workdir = %self.workdir.display(), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .context("Failed to execute git")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl RepositoryInspector for GitCli {
    fn is_repository(&self) -> Result<bool> {
        let output = self.run_git(&["rev-parse", "--is-inside-work-tree"])?;
        Ok(output.trim() == "true")
    }

    fn head_commit_id(&self) -> Result<String> {
        self.run_git(&["rev-parse", "--short", "HEAD"])
    }

    fn current_branch(&self) -> Result<String> {
        self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn head_commit_time(&self) -> Result<String> {
        // Pinned so a user's `log.date` setting cannot change the rendering
        self.run_git(&["log", "-1", "--date=default", "--format=%cd"])
    }

    fn head_author_name(&self) -> Result<String> {
        self.run_git(&["log", "-1", "--format=%an"])
    }

    fn head_author_email(&self) -> Result<String> {
        self.run_git(&["log", "-1", "--format=%ae"])
    }

    fn origin_remote_url(&self) -> Result<String> {
        let key = format!("remote.{}.url", self.remote);
        self.run_git(&["config", "--get", key.as_str()])
    }
}
