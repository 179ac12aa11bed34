use serde_json::Value;

use crate::constraints::{DataType, PropertyConstraint};
use crate::definitions::EntitySchema;

/// Implementation of the EntitySchema for the StaffMember entity.
pub struct StaffMember;

impl EntitySchema for StaffMember {
    fn schema_name() -> &'static str {
        "staff"
    }

    fn table_name() -> &'static str {
        "staff"
    }

    fn primary_key() -> &'static str {
        "staff_id"
    }

    fn property_constraints() -> Vec<PropertyConstraint> {
        vec![
            PropertyConstraint::new("staff_id", false)
                .with_data_type(DataType::Integer),
            PropertyConstraint::new("first_name", true)
                .with_data_type(DataType::String),
            PropertyConstraint::new("last_name", true)
                .with_data_type(DataType::String),
            PropertyConstraint::new("position", true)
                .with_data_type(DataType::String)
                .with_description("Role within the hospital, e.g. Nurse or Surgeon."),
            PropertyConstraint::new("contact_info", false)
                .with_data_type(DataType::String)
                .with_default_value(Value::Null),
            PropertyConstraint::new("hire_date", false)
                .with_data_type(DataType::Date),
        ]
    }
}
