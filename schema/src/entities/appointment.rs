use crate::constraints::{Constraint, DataType, EnumValues, PropertyConstraint};
use crate::definitions::EntitySchema;
use crate::lifecycle::{LifecycleRule, StateTransition};

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_CONFIRMED: &str = "Confirmed";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// Implementation of the EntitySchema for the Appointment entity.
/// An appointment links a patient to a staff member at a point in time.
pub struct Appointment;

impl EntitySchema for Appointment {
    fn schema_name() -> &'static str {
        "appointment"
    }

    fn table_name() -> &'static str {
        "appointments"
    }

    fn primary_key() -> &'static str {
        "appointment_id"
    }

    fn property_constraints() -> Vec<PropertyConstraint> {
        vec![
            // 1. Appointment ID - assigned by the store
            PropertyConstraint::new("appointment_id", false)
                .with_data_type(DataType::Integer),

            // 2. Patient ID (reference to patients) - Required
            PropertyConstraint::new("patient_id", true)
                .with_data_type(DataType::Integer)
                .with_constraints(vec![Constraint::Min(1)]),

            // 3. Staff ID (reference to staff) - Required
            PropertyConstraint::new("staff_id", true)
                .with_data_type(DataType::Integer)
                .with_constraints(vec![Constraint::Min(1)]),

            // 4. Scheduled date and time - Required
            PropertyConstraint::new("appointment_date", true)
                .with_data_type(DataType::DateTime)
                .with_description("Combined date and time of the visit."),

            // 5. Reason - Optional
            PropertyConstraint::new("reason_for_visit", false)
                .with_data_type(DataType::String),

            // 6. Status - drives the lifecycle
            PropertyConstraint::new("status", false)
                .with_enum_values(EnumValues::new(vec![
                    STATUS_PENDING.to_string(),
                    STATUS_CONFIRMED.to_string(),
                    STATUS_CANCELLED.to_string(),
                ]))
                .with_description("Omitted on insert means the lifecycle's initial state."),
        ]
    }

    fn lifecycle_rules() -> Vec<LifecycleRule> {
        vec![LifecycleRule {
            element: "status".to_string(),
            initial_state: Some(STATUS_PENDING.to_string()),
            transitions: vec![
                StateTransition::new(STATUS_PENDING, STATUS_CONFIRMED),
                StateTransition::new(STATUS_PENDING, STATUS_CANCELLED),
                StateTransition::new(STATUS_CONFIRMED, STATUS_CANCELLED),
            ],
        }]
    }
}
