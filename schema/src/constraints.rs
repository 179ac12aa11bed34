use chrono::{DateTime, NaiveDate, NaiveDateTime};
use models::values::DATE_FORMAT;
use models::FieldValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use std::str::FromStr;

/// The values an enumerated column accepts, case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValues {
    pub allowed_values: Vec<String>,
}

impl EnumValues {
    pub fn new(allowed_values: Vec<String>) -> Self {
        EnumValues { allowed_values }
    }
}

/// The kind of value a column holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    String,
    Integer,
    Decimal,
    Date,
    DateTime,
    /// Text restricted to a fixed set of values.
    Enum(Vec<String>),
}

impl DataType {
    /// The PostgreSQL type a bound parameter of this kind is cast to.
    pub fn sql_type(&self) -> &'static str {
        match self {
            DataType::String | DataType::Enum(_) => "TEXT",
            DataType::Integer => "INT8",
            DataType::Decimal => "NUMERIC",
            DataType::Date => "DATE",
            DataType::DateTime => "TIMESTAMP",
        }
    }
}

/// Defines a specific structural constraint on a column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Constraint {
    /// Must be present, non-null and (for text) non-empty on insert.
    Required,
    /// The column is not mandatory, allowing null or missing values.
    Optional,
    /// Lower bound for integer and decimal columns.
    Min(i64),
}

/// The core definition for a column of an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyConstraint {
    /// The name of the column (e.g., "first_name", "date_of_birth").
    pub name: String,
    /// Whether the column must be supplied on insert.
    pub required: bool,
    /// An optional human-readable description of the column's purpose.
    pub description: Option<String>,
    /// The data type this column must hold.
    pub data_type: DataType,
    pub constraints: Vec<Constraint>,
    /// Written on insert when the body omits the column.
    pub default_value: Option<serde_json::Value>,
}

impl PropertyConstraint {
    /// A text column; `required` sets the Required or Optional flag.
    pub fn new(name: &str, required: bool) -> Self {
        PropertyConstraint {
            name: name.to_string(),
            required,
            description: None,
            data_type: DataType::String,
            constraints: if required {
                vec![Constraint::Required]
            } else {
                vec![Constraint::Optional]
            },
            default_value: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Appends constraints, keeping the Required/Optional flag in sync.
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        for constraint in constraints {
            if !self.constraints.contains(&constraint) {
                self.constraints.push(constraint);
            }
        }
        if self.constraints.contains(&Constraint::Required) {
            self.required = true;
            self.constraints.retain(|c| *c != Constraint::Optional);
        }
        self
    }

    pub fn with_default_value(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Turns the column into an enumerated kind over `enum_values`.
    pub fn with_enum_values(mut self, enum_values: EnumValues) -> Self {
        self.data_type = DataType::Enum(enum_values.allowed_values);
        self
    }

    /// Checks a client-supplied JSON value against the column's kind and
    /// constraints, returning the typed value to bind.
    pub fn coerce(&self, value: &Value) -> Result<FieldValue, String> {
        if value.is_null() {
            if self.required {
                return Err("is required and cannot be null".to_string());
            }
            return Ok(FieldValue::Null);
        }

        let coerced = match &self.data_type {
            DataType::String => match value {
                Value::String(s) => FieldValue::Text(s.clone()),
                other => return Err(format!("expected text, found {}", json_type_name(other))),
            },
            DataType::Integer => FieldValue::Integer(parse_integer(value)?),
            DataType::Decimal => FieldValue::Decimal(parse_decimal(value)?),
            DataType::Date => FieldValue::Date(parse_date(value)?),
            DataType::DateTime => FieldValue::DateTime(parse_date_time(value)?),
            DataType::Enum(allowed_values) => match value.as_str() {
                Some(s) if allowed_values.iter().any(|v| v == s) => FieldValue::Text(s.to_string()),
                Some(s) => {
                    return Err(format!(
                        "'{}' is not one of the allowed values: {}",
                        s,
                        allowed_values.join(", ")
                    ));
                }
                None => return Err(format!("expected one of: {}", allowed_values.join(", "))),
            },
        };

        for constraint in &self.constraints {
            match constraint {
                Constraint::Optional => {}
                Constraint::Required => {
                    if let FieldValue::Text(s) = &coerced {
                        if s.trim().is_empty() {
                            return Err("is required and cannot be empty".to_string());
                        }
                    }
                }
                Constraint::Min(min_val) => {
                    let below = match &coerced {
                        FieldValue::Integer(i) => *i < *min_val,
                        FieldValue::Decimal(d) => *d < Decimal::from(*min_val),
                        _ => false,
                    };
                    if below {
                        return Err(format!("must not be less than {}", min_val));
                    }
                }
            }
        }

        Ok(coerced)
    }

    /// True when an insert body leaves this column effectively unset.
    pub fn is_missing(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("'{}' is not an integer", n)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not an integer", s)),
        other => Err(format!("expected an integer, found {}", json_type_name(other))),
    }
}

/// Largest number of fractional digits a `Decimal` holds without rounding.
const MAX_DECIMAL_SCALE: usize = 28;

fn parse_decimal(value: &Value) -> Result<Decimal, String> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(format!("expected a decimal, found {}", json_type_name(other))),
    };
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().unwrap_or(0)),
        None => (text.as_str(), 0),
    };
    let fraction_digits = mantissa
        .split_once('.')
        .map(|(_, fraction)| fraction.trim_end_matches('0').len())
        .unwrap_or(0);
    if fraction_digits as i64 - exponent > MAX_DECIMAL_SCALE as i64 {
        return Err(format!("'{}' has more than {} decimal places", text, MAX_DECIMAL_SCALE));
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| format!("'{}' is not a valid decimal", text))
}

fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("expected a date (YYYY-MM-DD), found {}", json_type_name(value)))?
        .trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| format!("'{}' is not a valid date (YYYY-MM-DD)", s))
}

const DATE_TIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_date_time(value: &Value) -> Result<NaiveDateTime, String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("expected a date-time, found {}", json_type_name(value)))?
        .trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    DATE_TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("'{}' is not a valid date-time", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_column() -> PropertyConstraint {
        PropertyConstraint::new("status", false).with_enum_values(EnumValues::new(vec![
            "Pending".to_string(),
            "Confirmed".to_string(),
        ]))
    }

    #[test]
    fn enum_membership_is_case_sensitive() {
        let column = status_column();
        assert_eq!(column.coerce(&json!("Pending")), Ok(FieldValue::Text("Pending".into())));
        assert!(column.coerce(&json!("pending")).is_err());
        assert!(column.coerce(&json!("Archived")).is_err());
    }

    #[test]
    fn decimals_accept_numbers_and_strings_but_not_negatives() {
        let column = PropertyConstraint::new("amount_due", true)
            .with_data_type(DataType::Decimal)
            .with_constraints(vec![Constraint::Min(0)]);

        assert_eq!(
            column.coerce(&json!("150.25")),
            Ok(FieldValue::Decimal(Decimal::from_str("150.25").unwrap()))
        );
        assert_eq!(column.coerce(&json!(40)), Ok(FieldValue::Decimal(Decimal::from(40))));
        assert!(column.coerce(&json!(-1.5)).unwrap_err().contains("less than 0"));
        assert!(column.coerce(&json!("ten")).is_err());
    }

    #[test]
    fn decimals_beyond_representable_scale_are_rejected() {
        let column = PropertyConstraint::new("amount_due", true).with_data_type(DataType::Decimal);
        let err = column.coerce(&json!("0.00000000000000000000000000000001")).unwrap_err();
        assert!(err.contains("more than 28 decimal places"));
        assert!(column.coerce(&json!("1e-40")).unwrap_err().contains("decimal places"));
        assert_eq!(column.coerce(&json!("12.50")), Ok(FieldValue::Decimal(Decimal::new(1250, 2))));
    }

    #[test]
    fn required_columns_reject_null_and_blank_text() {
        let column = PropertyConstraint::new("last_name", true);
        assert!(column.coerce(&Value::Null).is_err());
        assert!(column.coerce(&json!("   ")).is_err());
        assert!(column.coerce(&json!(12)).is_err());

        let optional = PropertyConstraint::new("medical_history", false);
        assert_eq!(optional.coerce(&Value::Null), Ok(FieldValue::Null));
    }

    #[test]
    fn dates_and_date_times_parse_form_inputs() {
        let date = PropertyConstraint::new("date_of_birth", true).with_data_type(DataType::Date);
        assert_eq!(
            date.coerce(&json!("1985-11-30")),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(1985, 11, 30).unwrap()))
        );
        assert_eq!(
            date.coerce(&json!("1985-11-30T00:00:00Z")),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(1985, 11, 30).unwrap()))
        );
        assert!(date.coerce(&json!("30/11/1985")).is_err());

        let when =
            PropertyConstraint::new("appointment_date", true).with_data_type(DataType::DateTime);
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(14, 15, 0).unwrap();
        assert_eq!(when.coerce(&json!("2026-03-01T14:15")), Ok(FieldValue::DateTime(expected)));
        assert_eq!(when.coerce(&json!("2026-03-01 14:15:00")), Ok(FieldValue::DateTime(expected)));
    }

    #[test]
    fn integers_accept_numeric_strings() {
        let column = PropertyConstraint::new("patient_id", true).with_data_type(DataType::Integer);
        assert_eq!(column.coerce(&json!("42")), Ok(FieldValue::Integer(42)));
        assert!(column.coerce(&json!(4.2)).is_err());
    }
}
