// dqc-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (interfaces)
// Warehouse access used while resolving watermarks.
pub mod ports;

// 2. Domain
// Config models, merge engine, type mapping, configs cache, batching.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (adapters)
// YAML discovery, DuckDB, Jinja, SQL dry run, file output.
pub mod infrastructure;

// 4. Application (use cases)
// Cache preparation, rule binding resolution, generation run.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

pub use error::DqcError;
