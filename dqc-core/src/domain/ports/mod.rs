// dqc-core/src/domain/ports/mod.rs

pub mod source;
pub mod store;

pub use source::ConfigSource;
pub use store::ConfigStore;
