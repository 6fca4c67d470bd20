//! Tool settings: `buildstamp.toml` plus the project's `.env`.

use crate::adapters::{Backend, DEFAULT_REMOTE};
use crate::domain::types::DEFAULT_REPO_NAME;
use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value as TomlValue;
use tracing::{debug, warn};

pub const PROJECT_SETTINGS_FILE: &str = "buildstamp.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Repository name used when none can be derived from the remote.
    pub default_repo_name: String,
    /// Remote whose URL identifies the repository.
    pub remote: String,
    pub backend: Option<Backend>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_repo_name: DEFAULT_REPO_NAME.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            backend: None,
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must be readable and valid. Otherwise the first of
    /// `<project>/buildstamp.toml` and the user config file is used; problems
    /// with those only produce a warning.
    pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<Self> {
        Self::load_from(explicit, project_root, dirs::config_dir())
    }

    /// [`Settings::load`] with the user config directory supplied by the caller.
    fn load_from(
        explicit: Option<&Path>,
        project_root: &Path,
        user_config_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            return Self::parse(&text)
                .with_context(|| format!("Invalid settings file {}", path.display()));
        }

        for path in candidate_paths(project_root, user_config_dir) {
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            match Self::parse(&text) {
                Ok(settings) => {
                    debug!(path = %path.display(), "loaded settings");
                    return Ok(settings);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %format!("{e:#}"),
                        "ignoring invalid settings file"
                    );
                    return Ok(Self::default());
                }
            }
        }

        Ok(Self::default())
    }

    pub fn parse(text: &str) -> Result<Self> {
        let root = text.parse::<TomlValue>().context("Settings are not valid TOML")?;
        let mut settings = Self::default();

        let Some(metadata) = root.get("metadata") else {
            return Ok(settings);
        };

        if let Some(name) = string_key(metadata, "default_repo_name")? {
            settings.default_repo_name = name;
        }
        if let Some(remote) = string_key(metadata, "remote")? {
            settings.remote = remote;
        }
        if let Some(backend) = string_key(metadata, "backend")? {
            let parsed = Backend::from_str(&backend, true)
                .map_err(|_| anyhow!("Unknown backend '{}' (expected cli or git2)", backend))?;
            settings.backend = Some(parsed);
        }

        Ok(settings)
    }
}

fn string_key(table: &TomlValue, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(TomlValue::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Some(TomlValue::String(_)) => Err(anyhow!("metadata.{} must not be empty", key)),
        Some(other) => Err(anyhow!(
            "metadata.{} must be a string, found {}",
            key,
            other.type_str()
        )),
    }
}

fn candidate_paths(project_root: &Path, user_config_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = vec![project_root.join(PROJECT_SETTINGS_FILE)];
    if let Some(dir) = user_config_dir {
        paths.push(dir.join("buildstamp").join("config.toml"));
    }
    paths
}

/// Load `<project>/.env` into the process environment.
/// Variables already set keep their values.
pub fn load_dotenv(project_root: &Path) {
    let path = project_root.join(".env");
    match dotenv::from_path(&path) {
        Ok(()) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if path.exists() => {
            warn!(path = %path.display(), error = %e, "failed to load .env")
        }
        Err(_) => {}
    }
}
