//! Git2 implementation of the RepositoryInspector port.
//! Reads the repository in-process, so no `git` executable is needed.

use crate::ports::RepositoryInspector;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::DEFAULT_REMOTE;

/// git's default `%cd` rendering, e.g. `Wed May 1 14:00:00 2024 +0200`.
const GIT_DEFAULT_DATE: &str = "%a %b %-d %H:%M:%S %Y %z";

pub struct Git2Inspector {
    repo: Option<Repository>,
    /// Canonical form of the path the inspector was opened on.
    start_dir: Option<PathBuf>,
    remote: String,
}

impl Git2Inspector {
    /// Discover the repository containing `path`.
    /// Discovery failure is not an error here: the inspector then reports no repository.
    pub fn open(path: &Path) -> Self {
        let repo = match Repository::discover(path) {
            Ok(repo) => Some(repo),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no git repository discovered");
                None
            }
        };
        Self {
            repo,
            start_dir: path.canonicalize().ok(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    pub fn with_remote(mut self, remote: &str) -> Self {
        self.remote = remote.to_string();
        self
    }

    fn repo(&self) -> Result<&Repository> {
        self.repo
            .as_ref()
            .ok_or_else(|| anyhow!("No git repository discovered"))
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        self.repo()?
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("HEAD does not point at a commit")
    }
}

impl RepositoryInspector for Git2Inspector {
    /// True only inside the working tree, matching `git rev-parse --is-inside-work-tree`:
    /// the git directory itself does not count.
    fn is_repository(&self) -> Result<bool> {
        let (Some(repo), Some(start)) = (self.repo.as_ref(), self.start_dir.as_ref()) else {
            return Ok(false);
        };
        let Some(workdir) = repo.workdir() else {
            return Ok(false);
        };

        let workdir = workdir
            .canonicalize()
            .context("Failed to resolve working directory")?;
        let git_dir = repo
            .path()
            .canonicalize()
            .context("Failed to resolve git directory")?;
        Ok(start.starts_with(&workdir) && !start.starts_with(&git_dir))
    }

    fn head_commit_id(&self) -> Result<String> {
        let commit = self.head_commit()?;
        let short = commit
            .as_object()
            .short_id()
            .context("Failed to abbreviate HEAD id")?;
        short
            .as_str()
            .map(String::from)
            .ok_or_else(|| anyhow!("Abbreviated id is not valid UTF-8"))
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo()?.head().context("Failed to get HEAD")?;
        if head.is_branch() {
            head.shorthand()
                .map(String::from)
                .ok_or_else(|| anyhow!("Branch name is not valid UTF-8"))
        } else {
            // Detached HEAD, reported the way `git rev-parse --abbrev-ref` does
            Ok("HEAD".to_string())
        }
    }

    fn head_commit_time(&self) -> Result<String> {
        let time = self.head_commit()?.committer().when();
        format_git_date(time.seconds(), time.offset_minutes())
            .ok_or_else(|| anyhow!("Commit time out of range: {}", time.seconds()))
    }

    fn head_author_name(&self) -> Result<String> {
        let commit = self.head_commit()?;
        let author = commit.author();
        author
            .name()
            .map(String::from)
            .ok_or_else(|| anyhow!("Author name is not valid UTF-8"))
    }

    fn head_author_email(&self) -> Result<String> {
        let commit = self.head_commit()?;
        let author = commit.author();
        author
            .email()
            .map(String::from)
            .ok_or_else(|| anyhow!("Author email is not valid UTF-8"))
    }

    fn origin_remote_url(&self) -> Result<String> {
        let remote = self
            .repo()?
            .find_remote(&self.remote)
            .with_context(|| format!("No remote named '{}'", self.remote))?;
        remote
            .url()
            .map(String::from)
            .ok_or_else(|| anyhow!("Remote URL is not valid UTF-8"))
    }
}

/// Render a commit timestamp in the committer's own offset.
fn format_git_date(seconds: i64, offset_minutes: i32) -> Option<String> {
    let offset = FixedOffset::east_opt(offset_minutes * 60)?;
    let utc = DateTime::from_timestamp(seconds, 0)?;
    let local = utc.with_timezone(&offset);
    Some(local.format(GIT_DEFAULT_DATE).to_string())
}
