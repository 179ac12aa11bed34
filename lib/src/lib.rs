// lib/src/lib.rs

pub mod config;
pub mod repository;
pub mod statement;
pub mod storage_engine;
pub mod update_builder;

pub use config::{HospitalConfig, StorageConfig, StorageEngineType};
pub use repository::{EntityHandle, EntityRepository};
pub use statement::{
    Assignment, DeleteStatement, InsertStatement, KeyPredicate, SelectStatement, SqlParam,
    StatusGuard, UpdateStatement,
};
pub use storage_engine::{create_storage, EntityStore, InMemoryStorage};
#[cfg(feature = "postgres-datastore")]
pub use storage_engine::PostgresStorage;
pub use update_builder::{key_predicate, PartialUpdateBuilder};

pub use models::{FieldMapping, FieldValue, HospitalError, HospitalResult, Record};
