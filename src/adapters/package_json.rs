//! Reads the project's `package.json`.

use crate::domain::PackageInfo;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const PACKAGE_FILE: &str = "package.json";

pub fn read_package_info(project_root: &Path) -> Result<PackageInfo> {
    let path = project_root.join(PACKAGE_FILE);
    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_package_info(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_package_info(text: &str) -> Result<PackageInfo> {
    let json: Value = serde_json::from_str(text)?;
    let string = |key: &str| {
        json.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(PackageInfo {
        name: string("name"),
        version: string("version"),
        description: string("description"),
        license: string("license"),
        dependencies: version_map(json.get("dependencies")),
        dev_dependencies: version_map(json.get("devDependencies")),
    })
}

fn version_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|deps| {
            deps.iter()
                .filter_map(|(name, version)| {
                    version.as_str().map(|v| (name.clone(), v.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}
