//! buildstamp - build provenance for web builds
//!
//! Resolves commit, branch, authorship and remote identity of the current
//! checkout and emits them as define-time constants next to the build
//! configuration. Metadata resolution never fails the build.

mod adapters;
mod domain;
mod logging;
mod ports;
mod render;
mod settings;

use adapters::Backend;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use domain::{BuildConfig, BuildMode, PackageInfo};
use settings::Settings;
use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "buildstamp")]
#[command(about = "Resolve git provenance and build configuration for a web build")]
#[command(version)]
struct Args {
    /// Project directory (default: current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// How to query the repository (default: settings, then cli)
    #[arg(short, long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Settings file (default: <project>/buildstamp.toml, then the user config dir)
    #[arg(short, long, env = "BUILDSTAMP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the repository metadata record (default)
    Metadata {
        #[arg(short, long, value_enum, default_value_t)]
        format: render::Format,
    },
    /// Print define-time constants as a JSON object
    Defines {
        #[arg(short, long, value_enum, default_value_t)]
        mode: BuildMode,
    },
    /// Print the full build configuration as JSON
    Config {
        #[arg(short, long, value_enum, default_value_t)]
        mode: BuildMode,
    },
    /// Print the upstream URL the dev-server proxy forwards a request path to
    Route {
        /// Request path, e.g. /api/chat
        request_path: String,
    },
}

fn main() -> Result<()> {
    // `.env` may carry BUILDSTAMP_CONFIG or RUST_LOG, so it is read before parsing
    let cwd = PathBuf::from(".");
    settings::load_dotenv(&cwd);
    let args = Args::parse();
    logging::init(args.verbose);

    let root = args.path.clone().unwrap_or(cwd);
    if args.path.is_some() {
        settings::load_dotenv(&root);
    }

    let settings = Settings::load(args.config.as_deref(), &root)?;
    let backend = args.backend.or(settings.backend).unwrap_or_default();
    debug!(?backend, remote = %settings.remote, "resolving repository metadata");

    let inspector = adapters::open_inspector(backend, &root, &settings.remote);
    let metadata = domain::resolve(inspector.as_ref(), &settings.default_repo_name);

    let output = match args.command.unwrap_or(Command::Metadata {
        format: render::Format::default(),
    }) {
        Command::Metadata { format } => render::metadata(&metadata, format)?,
        Command::Defines { mode } => {
            let defines = domain::define_constants(&metadata, &load_package(&root), mode);
            render::json(&defines)?
        }
        Command::Config { mode } => {
            let defines = domain::define_constants(&metadata, &load_package(&root), mode);
            render::json(&BuildConfig::assemble(mode, &env_snapshot(), defines))?
        }
        Command::Route { request_path } => {
            let env = env_snapshot();
            let config = BuildConfig::assemble(BuildMode::default(), &env, BTreeMap::new());
            match config.server.upstream_for(&request_path) {
                Some(url) => url,
                None => format!("{request_path} is served locally"),
            }
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output).context("Failed to write output")?;
    Ok(())
}

/// Process environment as UTF-8 pairs. Variables whose name or value is not
/// valid UTF-8 cannot be exposed to the bundler and are skipped.
fn env_snapshot() -> BTreeMap<String, String> {
    env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                debug!(key = ?key, "skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Package facts are optional; a missing or broken file yields empty values.
fn load_package(root: &Path) -> PackageInfo {
    match adapters::package_json::read_package_info(root) {
        Ok(package) => package,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "package metadata unavailable");
            PackageInfo::default()
        }
    }
}
