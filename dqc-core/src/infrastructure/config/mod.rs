// dqc-core/src/infrastructure/config/mod.rs

pub mod discovery;
pub mod project;

pub use discovery::{YamlConfigSource, load_configs};
pub use project::load_project_config;
