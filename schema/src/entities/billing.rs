use serde_json::{json, Value};

use crate::constraints::{Constraint, DataType, PropertyConstraint};
use crate::definitions::EntitySchema;

/// Implementation of the EntitySchema for the BillingRecord entity.
///
/// All monetary amounts are non-negative decimals. Omitted amounts fall back
/// to the defaults the billing desk has always used: no insurance coverage
/// recorded and nothing received yet.
pub struct BillingRecord;

impl EntitySchema for BillingRecord {
    fn schema_name() -> &'static str {
        "billing"
    }

    fn table_name() -> &'static str {
        "billing"
    }

    fn primary_key() -> &'static str {
        "billing_id"
    }

    fn property_constraints() -> Vec<PropertyConstraint> {
        let amount = |name: &str, required: bool| {
            PropertyConstraint::new(name, required)
                .with_data_type(DataType::Decimal)
                .with_constraints(vec![Constraint::Min(0)])
        };

        vec![
            PropertyConstraint::new("billing_id", false)
                .with_data_type(DataType::Integer),
            PropertyConstraint::new("patient_id", true)
                .with_data_type(DataType::Integer)
                .with_constraints(vec![Constraint::Min(1)]),
            amount("amount_due", true),
            amount("insurance_coverage", false).with_default_value(Value::Null),
            amount("payment_received", false).with_default_value(json!(0)),
            amount("outstanding_balance", true),
            PropertyConstraint::new("billing_date", true)
                .with_data_type(DataType::Date),
            PropertyConstraint::new("payment_status", false)
                .with_data_type(DataType::String)
                .with_default_value(json!("pending")),
        ]
    }
}
