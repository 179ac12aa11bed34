// models/src/values.rs

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// A row as returned by the store: column name to JSON value, in column order.
pub type Record = Map<String, Value>;

/// A client-supplied mapping of proposed column name to new value.
pub type FieldMapping = Map<String, Value>;

/// A column value after it has been checked against its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The JSON shape PostgreSQL's `to_jsonb` gives the same value.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Decimal(d) => decimal_to_json(d),
            FieldValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            FieldValue::DateTime(dt) => Value::String(dt.format(DATE_TIME_FORMAT).to_string()),
            FieldValue::Null => Value::Null,
        }
    }
}

fn decimal_to_json(d: &Decimal) -> Value {
    // Number::from_str keeps the textual scale when serde_json's
    // arbitrary_precision is on and falls back to f64 otherwise.
    Number::from_str(&d.normalize().to_string())
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(d.to_string()))
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
            FieldValue::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dates_render_like_postgres_jsonb() {
        let date = NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();
        assert_eq!(FieldValue::Date(date).to_json(), json!("1990-04-02"));

        let dt = date.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(FieldValue::DateTime(dt).to_json(), json!("1990-04-02T09:30:00"));
    }

    #[test]
    fn decimals_render_as_numbers() {
        let value = FieldValue::Decimal(Decimal::from_str("125.50").unwrap()).to_json();
        assert_eq!(value.as_f64(), Some(125.5));
        assert_eq!(FieldValue::Null.to_json(), Value::Null);
    }
}
