pub mod git2_adapter;
pub mod git_cli;
pub mod package_json;

pub use git2_adapter::Git2Inspector;
pub use git_cli::GitCli;

use crate::ports::RepositoryInspector;
use clap::ValueEnum;
use std::path::Path;

pub const DEFAULT_REMOTE: &str = "origin";

/// Which inspector implementation answers repository queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Shell out to the `git` executable.
    #[default]
    #[value(alias = "git")]
    Cli,
    /// Read the repository in-process with libgit2.
    #[value(alias = "libgit2")]
    Git2,
}

pub fn open_inspector(
    backend: Backend,
    path: &Path,
    remote: &str,
) -> Box<dyn RepositoryInspector> {
    match backend {
        Backend::Cli => Box::new(GitCli::new(path).with_remote(remote)),
        Backend::Git2 => Box::new(Git2Inspector::open(path).with_remote(remote)),
    }
}
