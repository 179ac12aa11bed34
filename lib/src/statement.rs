// lib/src/statement.rs

//! Validated, store-ready statements.
//!
//! A statement is only ever built from a registry definition, so every table
//! and column name it renders came from the registry, never from a client.
//! Values travel as positional parameters, each cast to the column's kind.

use models::FieldValue;
use schema::DataType;

/// `"<column>" = $n` in an UPDATE, or one column of an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub data_type: DataType,
    pub value: FieldValue,
}

/// The primary-key equality predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPredicate {
    pub column: String,
    pub data_type: DataType,
    pub value: FieldValue,
}

/// Restricts an update to rows whose status column currently holds one of
/// `allowed` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGuard {
    pub column: String,
    pub allowed: Vec<String>,
}

/// One positional parameter, in `$n` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlParam<'a> {
    Value(&'a DataType, &'a FieldValue),
    TextArray(&'a [String]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub entity: String,
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub key: KeyPredicate,
    pub guard: Option<StatusGuard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub entity: String,
    pub table: String,
    /// The store-assigned key column, returned with the new row.
    pub key_column: String,
    pub values: Vec<Assignment>,
}

/// `SELECT` of one row by key, or of every row when `key` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    pub entity: String,
    pub table: String,
    pub key_column: String,
    pub key: Option<KeyPredicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStatement {
    pub entity: String,
    pub table: String,
    pub key: KeyPredicate,
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn placeholder(n: usize, data_type: &DataType) -> String {
    format!("${}::{}", n, data_type.sql_type())
}

const RETURNING_ROW: &str = "RETURNING to_jsonb(t.*)";

impl UpdateStatement {
    pub fn sql(&self) -> String {
        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{} = {}", quote(&a.column), placeholder(i + 1, &a.data_type)))
            .collect::<Vec<_>>()
            .join(", ");
        let key_index = self.assignments.len() + 1;
        let mut sql = format!(
            "UPDATE {} AS t SET {} WHERE t.{} = {}",
            quote(&self.table),
            set_clause,
            quote(&self.key.column),
            placeholder(key_index, &self.key.data_type),
        );
        if let Some(guard) = &self.guard {
            sql.push_str(&format!(
                " AND t.{} = ANY(${}::TEXT[])",
                quote(&guard.column),
                key_index + 1
            ));
        }
        sql.push(' ');
        sql.push_str(RETURNING_ROW);
        sql
    }

    pub fn params(&self) -> Vec<SqlParam<'_>> {
        let mut params: Vec<SqlParam<'_>> = self
            .assignments
            .iter()
            .map(|a| SqlParam::Value(&a.data_type, &a.value))
            .collect();
        params.push(SqlParam::Value(&self.key.data_type, &self.key.value));
        if let Some(guard) = &self.guard {
            params.push(SqlParam::TextArray(&guard.allowed));
        }
        params
    }

    pub fn assigned_value(&self, column: &str) -> Option<&FieldValue> {
        self.assignments.iter().find(|a| a.column == column).map(|a| &a.value)
    }
}

impl InsertStatement {
    pub fn sql(&self) -> String {
        if self.values.is_empty() {
            return format!(
                "INSERT INTO {} AS t DEFAULT VALUES {}",
                quote(&self.table),
                RETURNING_ROW
            );
        }
        let columns = self.values.iter().map(|a| quote(&a.column)).collect::<Vec<_>>().join(", ");
        let placeholders = self
            .values
            .iter()
            .enumerate()
            .map(|(i, a)| placeholder(i + 1, &a.data_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} AS t ({}) VALUES ({}) {}",
            quote(&self.table),
            columns,
            placeholders,
            RETURNING_ROW
        )
    }

    pub fn params(&self) -> Vec<SqlParam<'_>> {
        self.values.iter().map(|a| SqlParam::Value(&a.data_type, &a.value)).collect()
    }
}

impl SelectStatement {
    pub fn sql(&self) -> String {
        match &self.key {
            Some(key) => format!(
                "SELECT to_jsonb(t.*) FROM {} AS t WHERE t.{} = {}",
                quote(&self.table),
                quote(&key.column),
                placeholder(1, &key.data_type)
            ),
            None => format!(
                "SELECT to_jsonb(t.*) FROM {} AS t ORDER BY t.{}",
                quote(&self.table),
                quote(&self.key_column)
            ),
        }
    }

    pub fn params(&self) -> Vec<SqlParam<'_>> {
        self.key
            .iter()
            .map(|k| SqlParam::Value(&k.data_type, &k.value))
            .collect()
    }
}

impl DeleteStatement {
    pub fn sql(&self) -> String {
        format!(
            "DELETE FROM {} AS t WHERE t.{} = {} {}",
            quote(&self.table),
            quote(&self.key.column),
            placeholder(1, &self.key.data_type),
            RETURNING_ROW
        )
    }

    pub fn params(&self) -> Vec<SqlParam<'_>> {
        vec![SqlParam::Value(&self.key.data_type, &self.key.value)]
    }
}
