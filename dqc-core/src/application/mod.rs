// dqc-core/src/application/mod.rs

pub mod loader;
pub mod pipeline;
pub mod ports;
pub mod resolver;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use dqc_core::application::{run_generation, GenerationRequest};`

pub use loader::prepare_configs_cache;
pub use pipeline::{GenerationRequest, RunResult, expand_targets, run_generation};
pub use resolver::{ResolvedRuleBinding, RuleBindingResolver, metadata_from_value};
