//! Repository inspector port (trait).
//! Read-only queries against the ambient checkout, without coupling to git2 or the git CLI.

use anyhow::Result;

/// Port for read-only repository queries.
/// Implementations may use git2, shell commands, or test fakes.
///
/// Every query reports failure explicitly; callers decide what a failed or
/// empty answer degrades to.
pub trait RepositoryInspector {
    /// Whether the inspected path is inside a working tree.
    fn is_repository(&self) -> Result<bool>;

    /// Abbreviated id of the HEAD commit.
    fn head_commit_id(&self) -> Result<String>;

    /// Current branch name ("HEAD" when detached).
    fn current_branch(&self) -> Result<String>;

    /// Committer date of HEAD, in git's default date rendering.
    fn head_commit_time(&self) -> Result<String>;

    fn head_author_name(&self) -> Result<String>;

    fn head_author_email(&self) -> Result<String>;

    /// URL of the configured origin remote.
    fn origin_remote_url(&self) -> Result<String>;
}
