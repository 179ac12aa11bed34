use crate::constraints::{Constraint, DataType, PropertyConstraint};
use crate::definitions::EntitySchema;

/// Implementation of the EntitySchema for the MedicalRecord entity.
pub struct MedicalRecord;

impl EntitySchema for MedicalRecord {
    fn schema_name() -> &'static str {
        "medical_record"
    }

    fn table_name() -> &'static str {
        "medical_records"
    }

    fn primary_key() -> &'static str {
        "record_id"
    }

    fn property_constraints() -> Vec<PropertyConstraint> {
        vec![
            PropertyConstraint::new("record_id", false)
                .with_data_type(DataType::Integer),
            PropertyConstraint::new("patient_id", true)
                .with_data_type(DataType::Integer)
                .with_constraints(vec![Constraint::Min(1)]),
            PropertyConstraint::new("diagnosis", true)
                .with_data_type(DataType::String),
            PropertyConstraint::new("treatment", false)
                .with_data_type(DataType::String),
            PropertyConstraint::new("doctor_notes", false)
                .with_data_type(DataType::String),
            PropertyConstraint::new("medications", false)
                .with_data_type(DataType::String),
            PropertyConstraint::new("record_date", false)
                .with_data_type(DataType::Date),
        ]
    }
}
