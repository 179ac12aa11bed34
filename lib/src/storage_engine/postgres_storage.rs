// lib/src/storage_engine/postgres_storage.rs
// NOTE: Assumes the tables declared by the schema registry already exist; this
// engine never creates or migrates them.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, error, info};
use models::{FieldValue, HospitalError, HospitalResult, Record};
use rust_decimal::Decimal;
use schema::DataType;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Row};

use crate::config::StorageConfig;
use crate::statement::{
    DeleteStatement, InsertStatement, SelectStatement, SqlParam, UpdateStatement,
};
use crate::storage_engine::EntityStore;

type BoxedParam = Box<dyn ToSql + Sync + Send>;

pub struct PostgresStorage {
    client: Arc<Mutex<Client>>,
    target: String,
}

impl fmt::Debug for PostgresStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresStorage").field("target", &self.target).finish()
    }
}

/// Connection settings passed field by field, so passwords need no quoting.
fn pg_config(config: &StorageConfig) -> Config {
    let mut pg = Config::new();
    pg.host(&config.host)
        .port(config.port)
        .user(&config.username)
        .password(&config.password)
        .dbname(&config.database);
    pg
}

impl PostgresStorage {
    pub async fn new(config: &StorageConfig) -> HospitalResult<Self> {
        let (client, connection) = pg_config(config)
            .connect(NoTls)
            .await
            .map_err(|e| {
                HospitalError::StoreError(format!("Failed to connect to Postgres: {}", e))
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Postgres connection closed with error: {}", e);
            }
        });

        let target = format!("{}:{}/{}", config.host, config.port, config.database);
        info!("Connected to Postgres at {}", target);
        Ok(PostgresStorage {
            client: Arc::new(Mutex::new(client)),
            target,
        })
    }
}

/// Binds a coerced value with the Rust type matching the placeholder cast.
fn bind_value(data_type: &DataType, value: &FieldValue) -> HospitalResult<BoxedParam> {
    let param: BoxedParam = match (data_type, value) {
        (DataType::String | DataType::Enum(_), FieldValue::Text(s)) => Box::new(s.clone()),
        (DataType::Integer, FieldValue::Integer(i)) => Box::new(*i),
        (DataType::Decimal, FieldValue::Decimal(d)) => Box::new(*d),
        (DataType::Date, FieldValue::Date(d)) => Box::new(*d),
        (DataType::DateTime, FieldValue::DateTime(dt)) => Box::new(*dt),
        (DataType::String | DataType::Enum(_), FieldValue::Null) => Box::new(None::<String>),
        (DataType::Integer, FieldValue::Null) => Box::new(None::<i64>),
        (DataType::Decimal, FieldValue::Null) => Box::new(None::<Decimal>),
        (DataType::Date, FieldValue::Null) => Box::new(None::<NaiveDate>),
        (DataType::DateTime, FieldValue::Null) => Box::new(None::<NaiveDateTime>),
        (data_type, value) => {
            return Err(HospitalError::StoreError(format!(
                "value {} does not match column type {:?}",
                value, data_type
            )))
        }
    };
    Ok(param)
}

fn bind_params(params: Vec<SqlParam<'_>>) -> HospitalResult<Vec<BoxedParam>> {
    params
        .into_iter()
        .map(|param| match param {
            SqlParam::Value(data_type, value) => bind_value(data_type, value),
            SqlParam::TextArray(values) => Ok(Box::new(values.to_vec()) as BoxedParam),
        })
        .collect()
}

fn row_to_record(row: &Row) -> HospitalResult<Record> {
    let value: Value = row
        .try_get(0)
        .map_err(|e| HospitalError::StoreError(format!("row decode error: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(HospitalError::StoreError(format!("expected a JSON row, found {}", other))),
    }
}

fn param_refs(bound: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    bound.iter().map(|p| p.as_ref() as &(dyn ToSql + Sync)).collect()
}

fn store_error(e: tokio_postgres::Error) -> HospitalError {
    HospitalError::StoreError(e.to_string())
}

impl PostgresStorage {
    async fn query(&self, sql: &str, params: Vec<SqlParam<'_>>) -> HospitalResult<Vec<Row>> {
        let bound = bind_params(params)?;
        let refs = param_refs(&bound);
        debug!("Executing: {}", sql);
        let client = self.client.lock().await;
        client.query(sql, &refs).await.map_err(store_error)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: Vec<SqlParam<'_>>,
    ) -> HospitalResult<Option<Record>> {
        let bound = bind_params(params)?;
        let refs = param_refs(&bound);
        debug!("Executing: {}", sql);
        let client = self.client.lock().await;
        let row = client.query_opt(sql, &refs).await.map_err(store_error)?;
        row.as_ref().map(row_to_record).transpose()
    }
}

#[async_trait]
impl EntityStore for PostgresStorage {
    async fn fetch_all(&self, statement: &SelectStatement) -> HospitalResult<Vec<Record>> {
        let rows = self.query(&statement.sql(), statement.params()).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn fetch_one(&self, statement: &SelectStatement) -> HospitalResult<Option<Record>> {
        self.query_opt(&statement.sql(), statement.params()).await
    }

    async fn insert(&self, statement: &InsertStatement) -> HospitalResult<Record> {
        self.query_opt(&statement.sql(), statement.params())
            .await?
            .ok_or_else(|| {
                HospitalError::StoreError(format!(
                    "insert into {} returned no row",
                    statement.table
                ))
            })
    }

    async fn update(&self, statement: &UpdateStatement) -> HospitalResult<Option<Record>> {
        self.query_opt(&statement.sql(), statement.params()).await
    }

    async fn delete(&self, statement: &DeleteStatement) -> HospitalResult<Option<Record>> {
        self.query_opt(&statement.sql(), statement.params()).await
    }
}
