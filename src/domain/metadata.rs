//! Repository metadata resolution.
//! Data in, data out: the inspector is the only thing that touches the repository.

use super::types::{iso_timestamp, RepositoryMetadata, DEFAULT_BRANCH, NO_GIT_INFO, UNKNOWN};
use crate::ports::RepositoryInspector;
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

const GITHUB_HOST_MARKERS: [&str; 2] = ["github.com:", "github.com/"];

/// Resolve metadata for the inspected checkout, stamping fallbacks with the current time.
pub fn resolve(
    inspector: &dyn RepositoryInspector,
    default_repo_name: &str,
) -> RepositoryMetadata {
    resolve_at(inspector, default_repo_name, Utc::now())
}

/// Resolve metadata, using `now` wherever a commit time cannot be read.
///
/// Never fails. If the work-tree check says there is none, no further query
/// is issued and the complete fallback record is returned. Otherwise each
/// field degrades on its own.
pub fn resolve_at(
    inspector: &dyn RepositoryInspector,
    default_repo_name: &str,
    now: DateTime<Utc>,
) -> RepositoryMetadata {
    match inspector.is_repository() {
        Ok(true) => {}
        Ok(false) => {
            debug!("not inside a work tree, using fallback metadata");
            return RepositoryMetadata::fallback(default_repo_name, now);
        }
        Err(e) => {
            debug!(error = %format!("{e:#}"), "work-tree check failed, using fallback metadata");
            return RepositoryMetadata::fallback(default_repo_name, now);
        }
    }

    let remote_url = answer("remoteUrl", inspector.origin_remote_url());
    let repo_name = remote_url
        .as_deref()
        .and_then(repo_name_from_remote)
        .unwrap_or_else(|| default_repo_name.to_string());

    RepositoryMetadata {
        commit_hash: answer("commitHash", inspector.head_commit_id())
            .unwrap_or_else(|| NO_GIT_INFO.to_string()),
        branch: answer("branch", inspector.current_branch())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        commit_time: answer("commitTime", inspector.head_commit_time())
            .unwrap_or_else(|| iso_timestamp(now)),
        author: answer("author", inspector.head_author_name())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        email: answer("email", inspector.head_author_email())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        remote_url: remote_url.unwrap_or_else(|| UNKNOWN.to_string()),
        repo_name,
    }
}

/// Trimmed answer of a single query; failures and blank output both become `None`.
fn answer(field: &str, result: Result<String>) -> Option<String> {
    match result {
        Ok(value) => {
            let value = value.trim();
            if value.is_empty() {
                debug!(field, "query returned no output");
                None
            } else {
                Some(value.to_string())
            }
        }
        Err(e) => {
            debug!(field, error = %format!("{e:#}"), "query failed");
            None
        }
    }
}

/// Derive `owner/repo` from a remote URL.
///
/// Everything up to the last `github.com:` or `github.com/` is dropped, then one
/// trailing `.git`. Other hosts keep their URL (minus `.git`). Returns `None`
/// when nothing is left.
pub fn repo_name_from_remote(remote_url: &str) -> Option<String> {
    let start = GITHUB_HOST_MARKERS
        .iter()
        .filter_map(|marker| remote_url.rfind(marker).map(|idx| idx + marker.len()))
        .max()
        .unwrap_or(0);
    let name = &remote_url[start..];
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DEFAULT_REPO_NAME;
    use anyhow::anyhow;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Scripted inspector; `None` answers fail like a non-zero git exit.
    #[derive(Default)]
    struct FakeInspector {
        is_repo: Option<bool>,
        commit_id: Option<&'static str>,
        branch: Option<&'static str>,
        commit_time: Option<&'static str>,
        author: Option<&'static str>,
        email: Option<&'static str>,
        remote: Option<&'static str>,
        queries: Cell<usize>,
    }

    impl FakeInspector {
        fn checkout() -> Self {
            Self {
                is_repo: Some(true),
                commit_id: Some("a1b2c3d"),
                branch: Some("feature/stamp"),
                commit_time: Some("Wed May 1 14:00:00 2024 +0200"),
                author: Some("Ada Lovelace"),
                email: Some("ada@example.com"),
                remote: Some("https://github.com/acme/widgets.git"),
                queries: Cell::new(0),
            }
        }

        fn reply(&self, value: Option<&'static str>) -> Result<String> {
            self.queries.set(self.queries.get() + 1);
            value
                .map(|v| format!("{v}\n"))
                .ok_or_else(|| anyhow!("git exited with status 128"))
        }
    }

    impl RepositoryInspector for FakeInspector {
        fn is_repository(&self) -> Result<bool> {
            self.is_repo.ok_or_else(|| anyhow!("git: command not found"))
        }

        fn head_commit_id(&self) -> Result<String> {
            self.reply(self.commit_id)
        }

        fn current_branch(&self) -> Result<String> {
            self.reply(self.branch)
        }

        fn head_commit_time(&self) -> Result<String> {
            self.reply(self.commit_time)
        }

        fn head_author_name(&self) -> Result<String> {
            self.reply(self.author)
        }

        fn head_author_email(&self) -> Result<String> {
            self.reply(self.email)
        }

        fn origin_remote_url(&self) -> Result<String> {
            self.reply(self.remote)
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 8, 30, 0).unwrap()
    }

    #[test]
    fn missing_git_yields_complete_fallback() {
        let fake = FakeInspector::default();
        let meta = resolve_at(&fake, DEFAULT_REPO_NAME, fixed_now());
        assert_eq!(
            meta,
            RepositoryMetadata::fallback(DEFAULT_REPO_NAME, fixed_now())
        );
        assert_eq!(meta.commit_time, "2024-06-02T08:30:00.000Z");
        assert_eq!(fake.queries.get(), 0);
    }

    #[test]
    fn outside_work_tree_skips_queries() {
        let fake = FakeInspector {
            is_repo: Some(false),
            ..FakeInspector::checkout()
        };
        let meta = resolve_at(&fake, DEFAULT_REPO_NAME, fixed_now());
        assert_eq!(meta.commit_hash, "no-git-info");
        assert_eq!(meta.repo_name, "bolt.diy");
        assert_eq!(fake.queries.get(), 0);
    }

    #[test]
    fn full_checkout_is_reported_verbatim() {
        let fake = FakeInspector::checkout();
        let meta = resolve_at(&fake, DEFAULT_REPO_NAME, fixed_now());
        assert_eq!(
            meta,
            RepositoryMetadata {
                commit_hash: "a1b2c3d".to_string(),
                branch: "feature/stamp".to_string(),
                commit_time: "Wed May 1 14:00:00 2024 +0200".to_string(),
                author: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                remote_url: "https://github.com/acme/widgets.git".to_string(),
                repo_name: "acme/widgets".to_string(),
            }
        );
    }

    #[test]
    fn missing_remote_only_blanks_remote_fields() {
        let fake = FakeInspector {
            remote: None,
            ..FakeInspector::checkout()
        };
        let meta = resolve_at(&fake, DEFAULT_REPO_NAME, fixed_now());
        assert_eq!(meta.remote_url, "unknown");
        assert_eq!(meta.repo_name, "bolt.diy");
        assert_eq!(meta.commit_hash, "a1b2c3d");
        assert_eq!(meta.branch, "feature/stamp");
        assert_eq!(meta.author, "Ada Lovelace");
        assert_eq!(meta.email, "ada@example.com");
        assert_eq!(meta.commit_time, "Wed May 1 14:00:00 2024 +0200");
    }

    #[test]
    fn repository_without_commits_degrades_per_field() {
        let fake = FakeInspector {
            commit_id: None,
            branch: None,
            commit_time: None,
            author: None,
            email: None,
            ..FakeInspector::checkout()
        };
        let meta = resolve_at(&fake, DEFAULT_REPO_NAME, fixed_now());
        assert_eq!(meta.commit_hash, "no-git-info");
        assert_eq!(meta.branch, "main");
        assert_eq!(meta.commit_time, "2024-06-02T08:30:00.000Z");
        assert_eq!(meta.author, "unknown");
        assert_eq!(meta.email, "unknown");
        assert_eq!(meta.repo_name, "acme/widgets");
    }

    #[test]
    fn blank_output_counts_as_unavailable() {
        let fake = FakeInspector {
            author: Some("   "),
            remote: Some(""),
            ..FakeInspector::checkout()
        };
        let meta = resolve_at(&fake, DEFAULT_REPO_NAME, fixed_now());
        assert_eq!(meta.author, "unknown");
        assert_eq!(meta.remote_url, "unknown");
        assert_eq!(meta.repo_name, "bolt.diy");
    }

    #[test]
    fn configured_default_name_is_used() {
        let fake = FakeInspector::default();
        let meta = resolve_at(&fake, "acme/site", fixed_now());
        assert_eq!(meta.repo_name, "acme/site");
    }

    #[test]
    fn resolution_is_idempotent() {
        let fake = FakeInspector::checkout();
        let first = resolve(&fake, DEFAULT_REPO_NAME);
        let second = resolve(&fake, DEFAULT_REPO_NAME);
        assert_eq!(first, second);
    }

    #[test]
    fn repo_name_from_https_and_ssh_remotes() {
        let name = repo_name_from_remote("https://github.com/acme/widgets.git");
        assert_eq!(name.as_deref(), Some("acme/widgets"));
        let name = repo_name_from_remote("git@github.com:acme/widgets.git");
        assert_eq!(name.as_deref(), Some("acme/widgets"));
        let name = repo_name_from_remote("ssh://git@github.com/acme/widgets");
        assert_eq!(name.as_deref(), Some("acme/widgets"));
    }

    #[test]
    fn repo_name_strips_one_git_suffix_only() {
        let name = repo_name_from_remote("https://github.com/acme/widgets.git.git");
        assert_eq!(name.as_deref(), Some("acme/widgets.git"));
    }

    #[test]
    fn repo_name_keeps_non_github_urls() {
        let name = repo_name_from_remote("https://gitlab.com/acme/widgets.git");
        assert_eq!(name.as_deref(), Some("https://gitlab.com/acme/widgets"));
    }

    #[test]
    fn repo_name_empty_when_nothing_left() {
        assert_eq!(repo_name_from_remote(""), None);
        assert_eq!(repo_name_from_remote("https://github.com/"), None);
        assert_eq!(repo_name_from_remote(".git"), None);
    }
}
