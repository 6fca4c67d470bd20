//! The configuration object handed to the bundler and dev server.
//! Assembled once per invocation from the mode and an environment snapshot.

use super::types::BuildMode;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_TARGET: &str = "http://localhost:5000";
pub const API_PREFIX: &str = "/api";

const BASE_ALLOWED_HOSTS: [&str; 4] = [
    "boltdiy-production-6f13.up.railway.app",
    "*.railway.app",
    "localhost",
    "*.localhost",
];

/// Variables (or prefixes) the build is allowed to expose to client code.
pub const ENV_PREFIXES: [&str; 5] = [
    "VITE_",
    "OPENAI_LIKE_API_BASE_URL",
    "OLLAMA_API_BASE_URL",
    "LMSTUDIO_API_BASE_URL",
    "TOGETHER_API_BASE_URL",
];

const VENDOR_CHUNK: [&str; 2] = ["react", "react-dom"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub mode: BuildMode,
    pub define: BTreeMap<String, String>,
    pub server: ServerConfig,
    pub build: BuildOptions,
    pub plugins: Vec<Plugin>,
    pub env_prefix: Vec<String>,
    /// Current values of the whitelisted variables.
    pub exposed_env: BTreeMap<String, String>,
    pub css: CssOptions,
    pub optimize_deps: OptimizeDeps,
    pub clear_screen: bool,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub port: u16,
    pub strict_port: bool,
    pub host: bool,
    pub allowed_hosts: Vec<String>,
    pub proxy: BTreeMap<String, ProxyRule>,
    pub watch: WatchOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRule {
    pub target: String,
    pub change_origin: bool,
    pub secure: bool,
    /// Prefix removed from forwarded paths.
    pub strip_prefix: String,
}

impl ProxyRule {
    /// Path as seen by the upstream: one leading prefix removed.
    pub fn rewrite<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.strip_prefix.as_str()).unwrap_or(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOptions {
    pub use_polling: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub target: String,
    pub out_dir: String,
    pub sourcemap: bool,
    pub css_code_split: bool,
    pub manual_chunks: BTreeMap<String, Vec<String>>,
    pub report_compressed_size: bool,
    pub chunk_size_warning_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Plugin {
    fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: None,
        }
    }

    fn with_options(name: &str, options: Value) -> Self {
        Self {
            name: name.to_string(),
            options: Some(options),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssOptions {
    pub scss_api: String,
    pub locals_convention: String,
    pub generate_scoped_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeDeps {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl BuildConfig {
    pub fn assemble(
        mode: BuildMode,
        env: &BTreeMap<String, String>,
        define: BTreeMap<String, String>,
    ) -> Self {
        Self {
            mode,
            define,
            server: ServerConfig::from_env(env),
            build: BuildOptions::for_mode(mode),
            plugins: plugins_for_mode(mode),
            env_prefix: ENV_PREFIXES.iter().map(|p| p.to_string()).collect(),
            exposed_env: exposed_env(env),
            css: CssOptions::for_mode(mode),
            optimize_deps: OptimizeDeps {
                include: owned(&VENDOR_CHUNK),
                exclude: Vec::new(),
            },
            clear_screen: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    fn from_env(env: &BTreeMap<String, String>) -> Self {
        let port = env
            .get("PORT")
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let mut allowed_hosts = owned(&BASE_ALLOWED_HOSTS);
        if let Some(extra) = env.get("ALLOWED_HOSTS") {
            for host in extra.split(',').map(str::trim).filter(|h| !h.is_empty()) {
                if !allowed_hosts.iter().any(|h| h == host) {
                    allowed_hosts.push(host.to_string());
                }
            }
        }

        let target = env
            .get("VITE_API_URL")
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_TARGET)
            .to_string();

        let mut proxy = BTreeMap::new();
        proxy.insert(
            API_PREFIX.to_string(),
            ProxyRule {
                target,
                change_origin: true,
                secure: false,
                strip_prefix: API_PREFIX.to_string(),
            },
        );

        Self {
            port,
            strict_port: true,
            host: true,
            allowed_hosts,
            proxy,
            watch: WatchOptions { use_polling: true },
        }
    }

    /// Upstream URL a dev-server request is forwarded to, if a proxy rule covers it.
    /// The longest matching prefix wins.
    pub fn upstream_for(&self, path: &str) -> Option<String> {
        let (_, rule) = self
            .proxy
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())?;
        let rest = rule.rewrite(path);
        let target = rule.target.trim_end_matches('/');
        if rest.is_empty() || rest.starts_with('/') {
            Some(format!("{target}{rest}"))
        } else {
            Some(format!("{target}/{rest}"))
        }
    }
}

impl BuildOptions {
    fn for_mode(mode: BuildMode) -> Self {
        let mut manual_chunks = BTreeMap::new();
        manual_chunks.insert("vendor".to_string(), owned(&VENDOR_CHUNK));
        Self {
            target: "esnext".to_string(),
            out_dir: "dist".to_string(),
            sourcemap: mode.is_dev(),
            css_code_split: true,
            manual_chunks,
            report_compressed_size: true,
            chunk_size_warning_limit: 1000,
        }
    }
}

impl CssOptions {
    fn for_mode(mode: BuildMode) -> Self {
        let generate_scoped_name = if mode.is_dev() {
            "[name]__[local]__[hash:base64:5]"
        } else {
            "[hash:base64:5]"
        };
        Self {
            scss_api: "modern-compiler".to_string(),
            locals_convention: "camelCase".to_string(),
            generate_scoped_name: generate_scoped_name.to_string(),
        }
    }
}

fn plugins_for_mode(mode: BuildMode) -> Vec<Plugin> {
    let mut plugins = vec![Plugin::with_options(
        "nodePolyfills",
        json!({ "include": ["path", "buffer", "process"] }),
    )];
    if mode != BuildMode::Test {
        plugins.push(Plugin::bare("remixCloudflareDevProxy"));
    }
    plugins.push(Plugin::with_options(
        "remixVitePlugin",
        json!({
            "future": {
                "v3_fetcherPersist": true,
                "v3_relativeSplatPath": true,
                "v3_throwAbortReason": true,
                "v3_lazyRouteDiscovery": true,
                "v3_singleFetch": true
            }
        }),
    ));
    plugins.push(Plugin::bare("UnoCSS"));
    plugins.push(Plugin::bare("tsconfigPaths"));
    plugins.push(Plugin::bare("chrome129IssuePlugin"));
    if mode == BuildMode::Production {
        plugins.push(Plugin::with_options(
            "optimizeCssModules",
            json!({ "apply": "build" }),
        ));
    }
    plugins
}

/// Whether a variable name is covered by one of the exposure prefixes.
pub fn is_exposed(name: &str) -> bool {
    ENV_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn exposed_env(env: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    env.iter()
        .filter(|(name, _)| is_exposed(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
