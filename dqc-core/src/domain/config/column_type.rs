// dqc-core/src/domain/config/column_type.rs

// Two-level lookup: source dialect -> declared column type -> canonical target type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceDialect {
    #[serde(rename = "MYSQL")]
    MySql,
    #[serde(rename = "REDSHIFT")]
    Redshift,
}

impl SourceDialect {
    pub const ALL: [SourceDialect; 2] = [SourceDialect::MySql, SourceDialect::Redshift];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDialect::MySql => "MYSQL",
            SourceDialect::Redshift => "REDSHIFT",
        }
    }

    /// Upper-cases `raw` before matching.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        Self::ALL.into_iter().find(|d| d.as_str() == upper)
    }

    pub fn allowed_values() -> Vec<&'static str> {
        Self::ALL.iter().map(|d| d.as_str()).collect()
    }

    pub fn map_column_type(&self, declared: DeclaredColumnType) -> TypeMapping {
        match self {
            // Both dialects currently land on the same canonical table.
            SourceDialect::MySql | SourceDialect::Redshift => warehouse_mapping(declared),
        }
    }

    /// Canonical type for a column, failing when the mapping is the unsupported sentinel.
    pub fn canonical_type(
        &self,
        column_id: &str,
        declared: DeclaredColumnType,
    ) -> Result<CanonicalType, DomainError> {
        match self.map_column_type(declared) {
            TypeMapping::Supported(canonical) => Ok(canonical),
            TypeMapping::Unsupported => Err(DomainError::UnsupportedColumnType {
                column_id: column_id.to_string(),
                declared_type: declared.as_str().to_string(),
                dialect: self.as_str().to_string(),
            }),
        }
    }
}

impl fmt::Display for SourceDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column types accepted in entity configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredColumnType {
    String,
    Char,
    NChar,
    Varchar,
    NVarchar,
    Text,
    Int,
    Integer,
    Int64,
    Int32,
    SmallInt,
    BigInt,
    Float,
    Float64,
    Float32,
    Real,
    Double,
    Numeric,
    Decimal,
    Bool,
    Boolean,
    TinyInt,
    Bit,
    Datetime,
    Timestamp,
    Date,
    Time,
    Array,
    Struct,
    Record,
    Binary,
    Bytes,
    Interval,
    Geography,
}

impl DeclaredColumnType {
    pub const ALL: [DeclaredColumnType; 34] = [
        Self::String,
        Self::Char,
        Self::NChar,
        Self::Varchar,
        Self::NVarchar,
        Self::Text,
        Self::Int,
        Self::Integer,
        Self::Int64,
        Self::Int32,
        Self::SmallInt,
        Self::BigInt,
        Self::Float,
        Self::Float64,
        Self::Float32,
        Self::Real,
        Self::Double,
        Self::Numeric,
        Self::Decimal,
        Self::Bool,
        Self::Boolean,
        Self::TinyInt,
        Self::Bit,
        Self::Datetime,
        Self::Timestamp,
        Self::Date,
        Self::Time,
        Self::Array,
        Self::Struct,
        Self::Record,
        Self::Binary,
        Self::Bytes,
        Self::Interval,
        Self::Geography,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Char => "CHAR",
            Self::NChar => "NCHAR",
            Self::Varchar => "VARCHAR",
            Self::NVarchar => "NVARCHAR",
            Self::Text => "TEXT",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::Int64 => "INT64",
            Self::Int32 => "INT32",
            Self::SmallInt => "SMALLINT",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Float64 => "FLOAT64",
            Self::Float32 => "FLOAT32",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Bool => "BOOL",
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::Bit => "BIT",
            Self::Datetime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Array => "ARRAY",
            Self::Struct => "STRUCT",
            Self::Record => "RECORD",
            Self::Binary => "BINARY",
            Self::Bytes => "BYTES",
            Self::Interval => "INTERVAL",
            Self::Geography => "GEOGRAPHY",
        }
    }

    /// Unknown input yields `None` (a parse error for the caller), never a sentinel.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }
}

impl fmt::Display for DeclaredColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalType {
    String,
    Int64,
    Float64,
    Numeric,
    Bool,
    Datetime,
    Timestamp,
    Date,
    Time,
    Array,
    Struct,
    Bytes,
    Geography,
}

impl CanonicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int64 => "INT64",
            Self::Float64 => "FLOAT64",
            Self::Numeric => "NUMERIC",
            Self::Bool => "BOOL",
            Self::Datetime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Array => "ARRAY",
            Self::Struct => "STRUCT",
            Self::Bytes => "BYTES",
            Self::Geography => "GEOGRAPHY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMapping {
    Supported(CanonicalType),
    /// The declared type is known but the target type system has no equivalent.
    Unsupported,
}

fn warehouse_mapping(declared: DeclaredColumnType) -> TypeMapping {
    use DeclaredColumnType as D;
    let canonical = match declared {
        D::String | D::Char | D::NChar | D::Varchar | D::NVarchar | D::Text => {
            CanonicalType::String
        }
        D::Int | D::Integer | D::Int32 | D::Int64 | D::SmallInt | D::BigInt => {
            CanonicalType::Int64
        }
        D::Float | D::Float64 | D::Float32 | D::Real | D::Double => CanonicalType::Float64,
        D::Numeric | D::Decimal => CanonicalType::Numeric,
        D::Bool | D::Boolean | D::TinyInt | D::Bit => CanonicalType::Bool,
        D::Datetime => CanonicalType::Datetime,
        D::Timestamp => CanonicalType::Timestamp,
        D::Date => CanonicalType::Date,
        D::Time => CanonicalType::Time,
        D::Array => CanonicalType::Array,
        D::Struct | D::Record => CanonicalType::Struct,
        D::Binary | D::Bytes => CanonicalType::Bytes,
        D::Geography => CanonicalType::Geography,
        D::Interval => return TypeMapping::Unsupported,
    };
    TypeMapping::Supported(canonical)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_total_except_interval() {
        for dialect in SourceDialect::ALL {
            for declared in DeclaredColumnType::ALL {
                let mapping = dialect.map_column_type(declared);
                if declared == DeclaredColumnType::Interval {
                    assert_eq!(mapping, TypeMapping::Unsupported);
                } else {
                    assert!(
                        matches!(mapping, TypeMapping::Supported(_)),
                        "{} should map under {}",
                        declared,
                        dialect
                    );
                }
            }
        }
    }

    #[test]
    fn test_interval_is_rejected_as_unsupported() {
        let err = SourceDialect::Redshift
            .canonical_type("DURATION", DeclaredColumnType::Interval)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedColumnType { .. }));
        assert!(err.to_string().contains("INTERVAL"));
    }

    #[test]
    fn test_families_collapse_to_canonical() {
        let d = SourceDialect::MySql;
        assert_eq!(
            d.canonical_type("c", DeclaredColumnType::NVarchar).unwrap(),
            CanonicalType::String
        );
        assert_eq!(
            d.canonical_type("c", DeclaredColumnType::TinyInt).unwrap(),
            CanonicalType::Bool
        );
        assert_eq!(
            d.canonical_type("c", DeclaredColumnType::Record).unwrap(),
            CanonicalType::Struct
        );
        assert_eq!(
            d.canonical_type("c", DeclaredColumnType::Real).unwrap(),
            CanonicalType::Float64
        );
    }

    #[test]
    fn test_parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(
            DeclaredColumnType::parse("varchar"),
            Some(DeclaredColumnType::Varchar)
        );
        assert_eq!(DeclaredColumnType::parse(" Int64 "), Some(DeclaredColumnType::Int64));
        assert_eq!(DeclaredColumnType::parse("SUPER"), None);
        assert_eq!(SourceDialect::parse("redshift"), Some(SourceDialect::Redshift));
        assert_eq!(SourceDialect::parse("bigquery"), None);
    }
}
