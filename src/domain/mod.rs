pub mod build_config;
pub mod defines;
pub mod metadata;
pub mod types;

pub use build_config::BuildConfig;
pub use defines::define_constants;
pub use metadata::resolve;
pub use types::{BuildMode, PackageInfo, RepositoryMetadata};
