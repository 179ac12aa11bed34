// lib/src/repository.rs

use log::{debug, info};
use models::{FieldMapping, HospitalError, HospitalResult, Record};
use schema::{EntityDefinition, SchemaService};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{HospitalConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::statement::{Assignment, DeleteStatement, InsertStatement, SelectStatement};
use crate::storage_engine::EntityStore;
use crate::update_builder::{check_mapping_columns, key_predicate, PartialUpdateBuilder};

/// Read, insert, delete and partial update for every registered entity,
/// against one shared store.
#[derive(Debug, Clone)]
pub struct EntityRepository {
    schema: Arc<SchemaService>,
    store: Arc<dyn EntityStore>,
    builder: PartialUpdateBuilder,
    request_timeout: Duration,
}

impl EntityRepository {
    pub fn new(schema: Arc<SchemaService>, store: Arc<dyn EntityStore>) -> Self {
        EntityRepository {
            builder: PartialUpdateBuilder::new(schema.clone()),
            schema,
            store,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_config(mut self, config: &HospitalConfig) -> Self {
        self.builder = self.builder.with_status_transitions(config.enforce_status_transitions);
        self.request_timeout = config.request_timeout();
        self
    }

    /// Bounds every store call; an elapsed call fails with a `StoreError`.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// A handle bound to one entity, or `UnknownEntity`.
    pub fn entity(&self, name: &str) -> HospitalResult<EntityHandle<'_>> {
        Ok(EntityHandle {
            repository: self,
            definition: self.schema.entity(name)?,
        })
    }

    pub async fn list(&self, entity: &str) -> HospitalResult<Vec<Record>> {
        self.entity(entity)?.list().await
    }

    pub async fn get_by_id(&self, entity: &str, key: &Value) -> HospitalResult<Record> {
        self.entity(entity)?.get_by_id(key).await
    }

    pub async fn insert(&self, entity: &str, record: &FieldMapping) -> HospitalResult<Record> {
        self.entity(entity)?.insert(record).await
    }

    pub async fn delete_by_id(&self, entity: &str, key: &Value) -> HospitalResult<Record> {
        self.entity(entity)?.delete_by_id(key).await
    }

    pub async fn update(
        &self,
        entity: &str,
        key: &Value,
        mapping: &FieldMapping,
    ) -> HospitalResult<Record> {
        self.entity(entity)?.update(key, mapping).await
    }

    async fn timed<T, F>(&self, operation: F) -> HospitalResult<T>
    where
        F: Future<Output = HospitalResult<T>>,
    {
        timeout(self.request_timeout, operation).await?
    }
}

pub struct EntityHandle<'a> {
    repository: &'a EntityRepository,
    definition: &'a EntityDefinition,
}

impl<'a> EntityHandle<'a> {
    fn select(&self, key: Option<&Value>) -> HospitalResult<SelectStatement> {
        Ok(SelectStatement {
            entity: self.definition.name.clone(),
            table: self.definition.table.clone(),
            key_column: self.definition.primary_key.clone(),
            key: key.map(|k| key_predicate(self.definition, k)).transpose()?,
        })
    }

    pub async fn list(&self) -> HospitalResult<Vec<Record>> {
        let statement = self.select(None)?;
        let store = self.repository.store.as_ref();
        self.repository.timed(store.fetch_all(&statement)).await
    }

    pub async fn get_by_id(&self, key: &Value) -> HospitalResult<Record> {
        let statement = self.select(Some(key))?;
        let store = self.repository.store.as_ref();
        self.repository
            .timed(store.fetch_one(&statement))
            .await?
            .ok_or_else(|| HospitalError::not_found(&self.definition.name, key_text(key)))
    }

    /// Validates the whole record, fills declared defaults for omitted
    /// columns and inserts it. The new row comes back with its assigned key.
    pub async fn insert(&self, record: &FieldMapping) -> HospitalResult<Record> {
        let statement = build_insert(self.definition, record)?;
        let store = self.repository.store.as_ref();
        let row = self.repository.timed(store.insert(&statement)).await?;
        info!(
            "Inserted {} {}",
            self.definition.name,
            row.get(&self.definition.primary_key).cloned().unwrap_or(Value::Null)
        );
        Ok(row)
    }

    pub async fn delete_by_id(&self, key: &Value) -> HospitalResult<Record> {
        let statement = DeleteStatement {
            entity: self.definition.name.clone(),
            table: self.definition.table.clone(),
            key: key_predicate(self.definition, key)?,
        };
        let store = self.repository.store.as_ref();
        match self.repository.timed(store.delete(&statement)).await? {
            Some(row) => {
                info!("Deleted {} {}", self.definition.name, statement.key.value);
                Ok(row)
            }
            None => Err(HospitalError::not_found(&self.definition.name, &statement.key.value)),
        }
    }

    pub async fn update(&self, key: &Value, mapping: &FieldMapping) -> HospitalResult<Record> {
        let builder = &self.repository.builder;
        let statement = builder.build(&self.definition.name, key, mapping)?;
        let store = self.repository.store.as_ref();
        self.repository.timed(builder.execute(store, &statement)).await
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn build_insert(
    definition: &EntityDefinition,
    record: &FieldMapping,
) -> HospitalResult<InsertStatement> {
    check_mapping_columns(definition, record)?;

    let missing: Vec<String> = definition
        .writable_columns()
        .filter(|c| c.required && c.is_missing(record.get(&c.name)))
        .map(|c| c.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(HospitalError::MissingRequiredFields(missing));
    }

    let mut values = Vec::new();
    for column in definition.writable_columns() {
        let initial_state = definition
            .lifecycle_for(&column.name)
            .and_then(|rule| rule.initial_state.clone())
            .map(Value::String);
        let raw = match record.get(&column.name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => column.default_value.clone().or(initial_state).unwrap_or(Value::Null),
        };
        let value = column
            .coerce(&raw)
            .map_err(|reason| HospitalError::invalid_value(&column.name, reason))?;
        values.push(Assignment {
            column: column.name.clone(),
            data_type: column.data_type.clone(),
            value,
        });
    }

    debug!("Built insert for {} with {} columns", definition.name, values.len());
    Ok(InsertStatement {
        entity: definition.name.clone(),
        table: definition.table.clone(),
        key_column: definition.primary_key.clone(),
        values,
    })
}
