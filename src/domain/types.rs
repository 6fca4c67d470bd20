//! Pure data types for build provenance.
//! No I/O here; adapters fill these in.

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const NO_GIT_INFO: &str = "no-git-info";
pub const DEFAULT_BRANCH: &str = "main";
pub const UNKNOWN: &str = "unknown";
pub const DEFAULT_REPO_NAME: &str = "bolt.diy";

/// Provenance facts about the current checkout.
/// Every field is always populated; missing facts become placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    pub commit_hash: String,
    pub branch: String,
    pub commit_time: String,
    pub author: String,
    pub email: String,
    pub remote_url: String,
    pub repo_name: String,
}

impl RepositoryMetadata {
    /// The record used when no repository can be inspected at all.
    pub fn fallback(default_repo_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            commit_hash: NO_GIT_INFO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            commit_time: iso_timestamp(now),
            author: UNKNOWN.to_string(),
            email: UNKNOWN.to_string(),
            remote_url: UNKNOWN.to_string(),
            repo_name: default_repo_name.to_string(),
        }
    }

    /// Shell-style `KEY=value` pairs, in a stable order.
    pub fn env_pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("GIT_COMMIT_HASH", &self.commit_hash),
            ("GIT_BRANCH", &self.branch),
            ("GIT_COMMIT_TIME", &self.commit_time),
            ("GIT_AUTHOR", &self.author),
            ("GIT_EMAIL", &self.email),
            ("GIT_REMOTE_URL", &self.remote_url),
            ("GIT_REPO_NAME", &self.repo_name),
        ]
    }
}

/// Wall-clock time rendered like JavaScript's `Date#toISOString`.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The subset of `package.json` exposed to the build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
    Test,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
            BuildMode::Test => "test",
        }
    }

    pub fn is_dev(self) -> bool {
        self == BuildMode::Development
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
