// dqc-core/src/domain/batching.rs

// Partitions the bindings of each target table into batches bounded by total rule count.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

use crate::domain::error::DomainError;

pub const NUM_RULES_PER_TABLE: usize = 50;
const MAX_TABLE_ID_LEN: usize = 1023;

fn re_non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^0-9a-zA-Z_]+")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Bindings targeting one `(schema, table)`, in traversal order, with their rule counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub schema_name: String,
    pub table_name: String,
    pub rule_bindings: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityBatch {
    pub batch_id: String,
    pub table_id: String,
    pub rule_binding_ids_list: Vec<String>,
}

/// `schema__table` with runs of characters outside `[0-9a-zA-Z_]` collapsed to `_`.
/// Over-long ids keep their trailing segment.
pub fn entity_table_id(schema_name: &str, table_name: &str) -> String {
    let joined = format!("{}__{}", schema_name, table_name);
    let sanitized = re_non_alphanumeric().replace_all(&joined, "_");
    // Sanitized ids are ASCII, so byte offsets are char offsets.
    if sanitized.len() > MAX_TABLE_ID_LEN {
        sanitized[sanitized.len() - (MAX_TABLE_ID_LEN - 1)..].to_string()
    } else {
        sanitized.into_owned()
    }
}

pub fn plan_entity_batches(
    summaries: &[EntitySummary],
    target_ids: &[String],
) -> Result<Vec<EntityBatch>, DomainError> {
    if summaries.is_empty() {
        return Err(DomainError::NoEntitiesFound(target_ids.to_vec()));
    }

    let mut batches = Vec::new();
    for summary in summaries {
        let table_id = entity_table_id(&summary.schema_name, &summary.table_name);
        let mut running = 0usize;
        let mut increment = 0usize;
        let mut in_scope: Vec<String> = Vec::new();

        let mut close = |in_scope: &mut Vec<String>, increment: &mut usize| {
            *increment += 1;
            batches.push(EntityBatch {
                batch_id: format!("{}_{}", table_id, increment),
                table_id: table_id.clone(),
                rule_binding_ids_list: std::mem::take(in_scope),
            });
        };

        for (binding_id, rule_count) in &summary.rule_bindings {
            in_scope.push(binding_id.clone());
            running += rule_count;
            if running > NUM_RULES_PER_TABLE {
                close(&mut in_scope, &mut increment);
                running = 0;
            }
        }
        if !in_scope.is_empty() {
            close(&mut in_scope, &mut increment);
        }
        debug!(table_id = %table_id, batches = increment, "Planned entity batches");
    }
    Ok(batches)
}
