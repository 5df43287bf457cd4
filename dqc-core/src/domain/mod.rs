// dqc-core/src/domain/mod.rs

pub mod batching;
pub mod cache;
pub mod config;
pub mod error;
pub mod merge;
pub mod ports;
pub mod project;
pub mod substitution;

// Short re-exports
pub use cache::ConfigsCache;
pub use error::DomainError;
pub use merge::ConfigCollection;
