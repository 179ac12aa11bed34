use crate::constraints::{DataType, PropertyConstraint};
use crate::definitions::EntitySchema;

/// Implementation of the EntitySchema for the Patient entity.
/// Patients are created by registration and referenced by id from
/// appointments, billing and medical records.
pub struct Patient;

impl EntitySchema for Patient {
    fn schema_name() -> &'static str {
        "patient"
    }

    fn table_name() -> &'static str {
        "patients"
    }

    fn primary_key() -> &'static str {
        "patient_id"
    }

    fn property_constraints() -> Vec<PropertyConstraint> {
        vec![
            // 1. Patient ID - assigned by the store
            PropertyConstraint::new("patient_id", false)
                .with_data_type(DataType::Integer)
                .with_description("Store-assigned primary key."),

            // 2. Identity
            PropertyConstraint::new("first_name", true)
                .with_data_type(DataType::String),
            PropertyConstraint::new("last_name", true)
                .with_data_type(DataType::String),
            PropertyConstraint::new("date_of_birth", true)
                .with_data_type(DataType::Date),
            PropertyConstraint::new("gender", true)
                .with_data_type(DataType::String),

            // 3. Contact
            PropertyConstraint::new("contact_info", true)
                .with_data_type(DataType::String)
                .with_description("Phone number or email."),
            PropertyConstraint::new("address", true)
                .with_data_type(DataType::String),

            // 4. Free text
            PropertyConstraint::new("insurance_info", false)
                .with_data_type(DataType::String),
            PropertyConstraint::new("medical_history", false)
                .with_data_type(DataType::String),
        ]
    }
}
