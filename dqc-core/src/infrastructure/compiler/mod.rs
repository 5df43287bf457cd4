// dqc-core/src/infrastructure/compiler/mod.rs

pub mod jinja;
pub mod sql_validator;

pub use jinja::JinjaRenderer;
pub use sql_validator::validate_sql;
