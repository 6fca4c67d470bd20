//! Output formats for resolved metadata.

use crate::domain::RepositoryMetadata;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON object.
    #[default]
    Json,
    /// `KEY='value'` lines for sourcing from a shell.
    Env,
}

pub fn metadata(meta: &RepositoryMetadata, format: Format) -> Result<String> {
    match format {
        Format::Json => json(meta),
        Format::Env => Ok(env_lines(meta)),
    }
}

pub fn json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn env_lines(meta: &RepositoryMetadata) -> String {
    meta.env_pairs()
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, shell_quote(value)))
        .collect()
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
