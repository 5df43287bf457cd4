// dqc-core/src/infrastructure/cache/mod.rs

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbConfigStore;
pub use memory::InMemoryConfigStore;
