// lib/src/storage_engine/mod.rs

use async_trait::async_trait;
use log::info;
use models::{HospitalResult, Record};
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::{StorageConfig, StorageEngineType};
use crate::statement::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement};

pub mod inmemory_storage;
#[cfg(feature = "postgres-datastore")]
pub mod postgres_storage;

pub use inmemory_storage::InMemoryStorage;
#[cfg(feature = "postgres-datastore")]
pub use postgres_storage::PostgresStorage;

/// A relational store able to execute validated entity statements.
///
/// Each call is one independent single-statement round trip. `None` from
/// `fetch_one`, `update` or `delete` means no row matched the key.
#[async_trait]
pub trait EntityStore: Send + Sync + Debug {
    async fn fetch_all(&self, statement: &SelectStatement) -> HospitalResult<Vec<Record>>;

    async fn fetch_one(&self, statement: &SelectStatement) -> HospitalResult<Option<Record>>;

    async fn insert(&self, statement: &InsertStatement) -> HospitalResult<Record>;

    async fn update(&self, statement: &UpdateStatement) -> HospitalResult<Option<Record>>;

    async fn delete(&self, statement: &DeleteStatement) -> HospitalResult<Option<Record>>;
}

/// Opens the store selected by `config`.
pub async fn create_storage(config: &StorageConfig) -> HospitalResult<Arc<dyn EntityStore>> {
    info!("Opening {} storage engine", config.storage_engine_type);
    match config.storage_engine_type {
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "postgres-datastore")]
        StorageEngineType::PostgreSQL => Ok(Arc::new(PostgresStorage::new(config).await?)),
        #[cfg(not(feature = "postgres-datastore"))]
        StorageEngineType::PostgreSQL => Err(models::HospitalError::StoreError(
            "PostgreSQL support was not compiled in (feature `postgres-datastore`)".to_string(),
        )),
    }
}
