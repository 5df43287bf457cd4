// dqc-core/src/domain/config/mod.rs

pub mod column_type;
pub mod entity;
pub mod kind;
pub mod raw;
pub mod reference_columns;
pub mod row_filter;
pub mod rule;
pub mod rule_binding;
pub mod rule_dimensions;

pub use column_type::{CanonicalType, DeclaredColumnType, SourceDialect, TypeMapping};
pub use entity::{Entity, EntityColumn, EnvironmentOverride};
pub use kind::{ConfigKind, ConfigModel, MergeStrategy};
pub use raw::RawConfig;
pub use reference_columns::ReferenceColumns;
pub use row_filter::RowFilter;
pub use rule::{Rule, RuleType};
pub use rule_binding::RuleBinding;
pub use rule_dimensions::RuleDimensions;
