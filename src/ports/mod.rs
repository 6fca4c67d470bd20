pub mod inspector;

pub use inspector::RepositoryInspector;
