use async_trait::async_trait;
use log::debug;
use models::{FieldValue, HospitalError, HospitalResult, Record};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex as TokioMutex;

use crate::statement::{
    DeleteStatement, InsertStatement, KeyPredicate, SelectStatement, UpdateStatement,
};
use crate::storage_engine::EntityStore;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

/// A process-local store with the same row semantics as the PostgreSQL
/// engine: integer keys assigned on insert, rows returned as JSON objects.
///
/// It counts the write statements it executes and the rows they changed, so
/// callers can check that rejected requests never reached the store.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: TokioMutex<HashMap<String, Table>>,
    write_statements: AtomicUsize,
    rows_mutated: AtomicUsize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }

    /// Number of insert, update and delete statements executed.
    pub fn write_statement_count(&self) -> usize {
        self.write_statements.load(Ordering::SeqCst)
    }

    /// Number of rows actually created, changed or removed.
    pub fn mutation_count(&self) -> usize {
        self.rows_mutated.load(Ordering::SeqCst)
    }

    fn record_write(&self, rows: usize) {
        self.write_statements.fetch_add(1, Ordering::SeqCst);
        self.rows_mutated.fetch_add(rows, Ordering::SeqCst);
    }
}

fn key_of(predicate: &KeyPredicate) -> HospitalResult<i64> {
    match predicate.value {
        FieldValue::Integer(id) => Ok(id),
        ref other => Err(HospitalError::StoreError(format!(
            "in-memory storage only supports integer keys, got {}",
            other
        ))),
    }
}

#[async_trait]
impl EntityStore for InMemoryStorage {
    async fn fetch_all(&self, statement: &SelectStatement) -> HospitalResult<Vec<Record>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .get(&statement.table)
            .map(|table| table.rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_one(&self, statement: &SelectStatement) -> HospitalResult<Option<Record>> {
        let key = match &statement.key {
            Some(key) => key_of(key)?,
            None => return Err(HospitalError::StoreError("fetch_one requires a key".to_string())),
        };
        let tables = self.tables.lock().await;
        Ok(tables.get(&statement.table).and_then(|table| table.rows.get(&key).cloned()))
    }

    async fn insert(&self, statement: &InsertStatement) -> HospitalResult<Record> {
        let mut tables = self.tables.lock().await;
        let table = tables.entry(statement.table.clone()).or_default();
        table.next_id += 1;
        let id = table.next_id;

        let mut row = Record::new();
        row.insert(statement.key_column.clone(), Value::from(id));
        for assignment in &statement.values {
            row.insert(assignment.column.clone(), assignment.value.to_json());
        }
        table.rows.insert(id, row.clone());
        self.record_write(1);
        debug!("Inserted {} row {}", statement.table, id);
        Ok(row)
    }

    async fn update(&self, statement: &UpdateStatement) -> HospitalResult<Option<Record>> {
        let key = key_of(&statement.key)?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .get_mut(&statement.table)
            .and_then(|table| table.rows.get_mut(&key))
            .filter(|row| match &statement.guard {
                Some(guard) => row
                    .get(&guard.column)
                    .and_then(Value::as_str)
                    .map(|current| guard.allowed.iter().any(|s| s == current))
                    .unwrap_or(false),
                None => true,
            });

        let updated = row.map(|row| {
            for assignment in &statement.assignments {
                row.insert(assignment.column.clone(), assignment.value.to_json());
            }
            row.clone()
        });
        self.record_write(usize::from(updated.is_some()));
        Ok(updated)
    }

    async fn delete(&self, statement: &DeleteStatement) -> HospitalResult<Option<Record>> {
        let key = key_of(&statement.key)?;
        let mut tables = self.tables.lock().await;
        let removed = tables.get_mut(&statement.table).and_then(|table| table.rows.remove(&key));
        self.record_write(usize::from(removed.is_some()));
        Ok(removed)
    }
}
