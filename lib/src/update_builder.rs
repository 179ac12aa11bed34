// lib/src/update_builder.rs

//! Registry-driven partial updates.
//!
//! A client mapping is checked in a fixed order: primary key, unknown
//! columns, then each value against its column kind. Assignments follow the
//! registry's column order, never the mapping's, so the same mapping always
//! renders the same statement. Nothing reaches the store until every check
//! has passed.

use log::{debug, info, warn};
use models::{FieldMapping, FieldValue, HospitalError, HospitalResult, Record};
use schema::{EntityDefinition, SchemaService};
use serde_json::Value;
use std::sync::Arc;

use crate::statement::{Assignment, KeyPredicate, SelectStatement, StatusGuard, UpdateStatement};
use crate::storage_engine::EntityStore;

/// Coerces a client-supplied key against the entity's primary-key kind.
pub fn key_predicate(definition: &EntityDefinition, key: &Value) -> HospitalResult<KeyPredicate> {
    let column = definition
        .primary_key_column()
        .ok_or_else(|| HospitalError::UnknownColumn(definition.primary_key.clone()))?;
    let value = column
        .coerce(key)
        .map_err(|reason| HospitalError::invalid_value(&column.name, reason))?;
    if value.is_null() {
        return Err(HospitalError::invalid_value(&column.name, "key cannot be null"));
    }
    Ok(KeyPredicate {
        column: column.name.clone(),
        data_type: column.data_type.clone(),
        value,
    })
}

/// Rejects mapping keys that are the primary key or not registered columns.
/// Unknown names are reported in sorted order so the error is reproducible.
pub(crate) fn check_mapping_columns(
    definition: &EntityDefinition,
    mapping: &FieldMapping,
) -> HospitalResult<()> {
    if mapping.contains_key(&definition.primary_key) {
        return Err(HospitalError::ImmutablePrimaryKey(definition.primary_key.clone()));
    }
    let mut unknown: Vec<&String> =
        mapping.keys().filter(|k| definition.column(k).is_none()).collect();
    unknown.sort();
    match unknown.first() {
        Some(name) => Err(HospitalError::UnknownColumn((*name).clone())),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct PartialUpdateBuilder {
    schema: Arc<SchemaService>,
    enforce_status_transitions: bool,
}

impl PartialUpdateBuilder {
    pub fn new(schema: Arc<SchemaService>) -> Self {
        PartialUpdateBuilder {
            schema,
            enforce_status_transitions: false,
        }
    }

    pub fn with_status_transitions(mut self, enforce: bool) -> Self {
        self.enforce_status_transitions = enforce;
        self
    }

    /// Validates `(entity, key, mapping)` and produces the update statement.
    pub fn build(
        &self,
        entity: &str,
        key: &Value,
        mapping: &FieldMapping,
    ) -> HospitalResult<UpdateStatement> {
        let definition = self.schema.entity(entity)?;
        if mapping.is_empty() {
            return Err(HospitalError::NoFieldsProvided);
        }
        check_mapping_columns(definition, mapping)?;

        let mut assignments = Vec::with_capacity(mapping.len());
        for column in definition.writable_columns() {
            let Some(raw) = mapping.get(&column.name) else {
                continue;
            };
            let value = column
                .coerce(raw)
                .map_err(|reason| HospitalError::invalid_value(&column.name, reason))?;
            if value.is_null() && definition.lifecycle_for(&column.name).is_some() {
                return Err(HospitalError::invalid_value(&column.name, "cannot be cleared"));
            }
            assignments.push(Assignment {
                column: column.name.clone(),
                data_type: column.data_type.clone(),
                value,
            });
        }

        let key = key_predicate(definition, key)?;
        let guard = if self.enforce_status_transitions {
            status_guard(definition, &assignments)
        } else {
            None
        };

        let statement = UpdateStatement {
            entity: definition.name.clone(),
            table: definition.table.clone(),
            assignments,
            key,
            guard,
        };
        debug!("Built update for {}: {}", entity, statement.sql());
        Ok(statement)
    }

    /// Runs a built statement. Zero matching rows is `NotFound`, unless a
    /// status guard filtered out an existing row.
    pub async fn execute(
        &self,
        store: &dyn EntityStore,
        statement: &UpdateStatement,
    ) -> HospitalResult<Record> {
        if let Some(row) = store.update(statement).await? {
            info!("Updated {} {}", statement.entity, statement.key.value);
            return Ok(row);
        }

        let Some(guard) = &statement.guard else {
            return Err(HospitalError::not_found(&statement.entity, &statement.key.value));
        };

        let lookup = SelectStatement {
            entity: statement.entity.clone(),
            table: statement.table.clone(),
            key_column: statement.key.column.clone(),
            key: Some(statement.key.clone()),
        };
        match store.fetch_one(&lookup).await? {
            None => Err(HospitalError::not_found(&statement.entity, &statement.key.value)),
            Some(current) => {
                let from = current.get(&guard.column).and_then(Value::as_str).unwrap_or("NULL");
                let to = statement
                    .assigned_value(&guard.column)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                warn!(
                    "Rejected {} {} status change from {} to {}",
                    statement.entity, statement.key.value, from, to
                );
                Err(HospitalError::invalid_value(
                    &guard.column,
                    format!("transition from {} to {} is not allowed", from, to),
                ))
            }
        }
    }

    pub async fn update(
        &self,
        store: &dyn EntityStore,
        entity: &str,
        key: &Value,
        mapping: &FieldMapping,
    ) -> HospitalResult<Record> {
        let statement = self.build(entity, key, mapping)?;
        self.execute(store, &statement).await
    }
}

fn status_guard(definition: &EntityDefinition, assignments: &[Assignment]) -> Option<StatusGuard> {
    assignments.iter().find_map(|assignment| {
        let rule = definition.lifecycle_for(&assignment.column)?;
        match &assignment.value {
            FieldValue::Text(target) => Some(StatusGuard {
                column: assignment.column.clone(),
                allowed: rule.allowed_sources(target),
            }),
            _ => None,
        }
    })
}
