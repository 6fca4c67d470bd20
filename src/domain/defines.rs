//! Define-time constants handed to the bundler.
//! Each value is a JSON literal the bundler substitutes verbatim.

use super::types::{BuildMode, PackageInfo, RepositoryMetadata};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const FALLBACK_APP_VERSION: &str = "0.0.0";

pub fn define_constants(
    meta: &RepositoryMetadata,
    package: &PackageInfo,
    mode: BuildMode,
) -> BTreeMap<String, String> {
    let app_version = if package.version.is_empty() {
        FALLBACK_APP_VERSION
    } else {
        package.version.as_str()
    };

    let strings = [
        ("__COMMIT_HASH", meta.commit_hash.as_str()),
        ("__GIT_BRANCH", meta.branch.as_str()),
        ("__GIT_COMMIT_TIME", meta.commit_time.as_str()),
        ("__GIT_AUTHOR", meta.author.as_str()),
        ("__GIT_EMAIL", meta.email.as_str()),
        ("__GIT_REMOTE_URL", meta.remote_url.as_str()),
        ("__GIT_REPO_NAME", meta.repo_name.as_str()),
        ("__APP_VERSION", app_version),
        ("__PKG_NAME", package.name.as_str()),
        ("__PKG_VERSION", package.version.as_str()),
        ("__PKG_DESCRIPTION", package.description.as_str()),
        ("__PKG_LICENSE", package.license.as_str()),
        ("__BUILD_MODE", mode.as_str()),
    ];

    let mut defines: BTreeMap<String, String> = strings
        .into_iter()
        .map(|(key, value)| (key.to_string(), json_string(value)))
        .collect();

    defines.insert(
        "__PKG_DEPENDENCIES".to_string(),
        json_object(&package.dependencies),
    );
    defines.insert(
        "__PKG_DEV_DEPENDENCIES".to_string(),
        json_object(&package.dev_dependencies),
    );

    defines
}

fn json_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn json_object(map: &BTreeMap<String, String>) -> String {
    let object: Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(object).to_string()
}
