use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info};
use models::{HospitalError, HospitalResult};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::OnceCell;

use crate::constraints::{DataType, PropertyConstraint};
use crate::definitions::{EntityDefinition, EntitySchema};
use crate::entities::{Appointment, BillingRecord, MedicalRecord, Patient, StaffMember};
use crate::errors::SchemaError;

static SQL_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern is valid")
});

/// The registry of every entity the application manages.
///
/// Definitions are validated once, when they are registered; lookups at
/// request time never re-check them.
#[derive(Debug, Default)]
pub struct SchemaService {
    entities: Vec<EntityDefinition>,
    index: HashMap<String, usize>,
}

impl SchemaService {
    /// An empty registry.
    pub fn empty() -> Self {
        SchemaService::default()
    }

    /// Builds the registry of the five hospital entities.
    pub fn new() -> Result<Self, SchemaError> {
        info!("Initializing SchemaService: compiling entity declarations...");

        let mut service = SchemaService::empty();
        service.register::<Patient>()?;
        service.register::<StaffMember>()?;
        service.register::<Appointment>()?;
        service.register::<BillingRecord>()?;
        service.register::<MedicalRecord>()?;

        info!("SchemaService initialized successfully with {} entities.", service.entities.len());
        Ok(service)
    }

    pub fn register<T: EntitySchema>(&mut self) -> Result<(), SchemaError> {
        self.register_definition(EntityDefinition::from_schema::<T>())
    }

    /// Validates and adds a definition.
    pub fn register_definition(&mut self, definition: EntityDefinition) -> Result<(), SchemaError> {
        if self.index.contains_key(&definition.name) {
            return Err(SchemaError::DuplicateEntity(definition.name));
        }
        check_identifier(&definition.table)?;

        let mut seen = HashSet::new();
        for column in &definition.columns {
            check_identifier(&column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    entity: definition.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        if definition.primary_key.is_empty() || definition.primary_key_column().is_none() {
            return Err(SchemaError::MissingPrimaryKey {
                entity: definition.name.clone(),
                column: definition.primary_key.clone(),
            });
        }

        for rule in &definition.lifecycle_rules {
            let allowed = match definition.column(&rule.element).map(|c| &c.data_type) {
                Some(DataType::Enum(values)) => values,
                _ => {
                    return Err(SchemaError::LifecycleRuleError(format!(
                        "'{}.{}' is not an enumerated column",
                        definition.name, rule.element
                    )))
                }
            };
            let states = rule
                .transitions
                .iter()
                .flat_map(|t| [&t.from_state, &t.to_state])
                .chain(rule.initial_state.as_ref());
            for state in states {
                if !allowed.contains(state) {
                    return Err(SchemaError::LifecycleRuleError(format!(
                        "state '{}' is not an allowed value of '{}.{}'",
                        state, definition.name, rule.element
                    )));
                }
            }
        }

        debug!(
            "Registered entity '{}' (table {}, key {})",
            definition.name, definition.table, definition.primary_key
        );
        self.index.insert(definition.name.clone(), self.entities.len());
        self.entities.push(definition);
        Ok(())
    }

    pub fn entity(&self, name: &str) -> HospitalResult<&EntityDefinition> {
        self.index
            .get(name)
            .map(|&i| &self.entities[i])
            .ok_or_else(|| HospitalError::UnknownEntity(name.to_string()))
    }

    /// The declared columns of `name`, in declaration order.
    pub fn columns_for(&self, name: &str) -> HospitalResult<&[PropertyConstraint]> {
        self.entity(name).map(|e| e.columns.as_slice())
    }

    pub fn primary_key_of(&self, name: &str) -> HospitalResult<&str> {
        self.entity(name).map(|e| e.primary_key.as_str())
    }

    pub fn table_of(&self, name: &str) -> HospitalResult<&str> {
        self.entity(name).map(|e| e.table.as_str())
    }

    /// Registered names, in registration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.iter().map(|e| e.name.as_str())
    }
}

fn check_identifier(name: &str) -> Result<(), SchemaError> {
    if SQL_IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

// --- SINGLETON SETUP ---

static SCHEMA_SERVICE_SINGLETON: OnceCell<Arc<SchemaService>> = OnceCell::const_new();

/// Initializes the process-wide SchemaService if it hasn't been initialized yet.
pub async fn init_schema_service() -> Result<Arc<SchemaService>, SchemaError> {
    let service = SCHEMA_SERVICE_SINGLETON
        .get_or_try_init(|| async { SchemaService::new().map(Arc::new) })
        .await?;
    Ok(service.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{LifecycleRule, StateTransition};

    fn ward_definition(primary_key: &str) -> EntityDefinition {
        EntityDefinition {
            name: "ward".to_string(),
            table: "wards".to_string(),
            primary_key: primary_key.to_string(),
            columns: vec![
                PropertyConstraint::new("ward_id", false).with_data_type(DataType::Integer),
                PropertyConstraint::new("name", true),
            ],
            lifecycle_rules: Vec::new(),
        }
    }

    #[test]
    fn registers_all_hospital_entities() {
        let service = SchemaService::new().unwrap();
        let names: Vec<&str> = service.entity_names().collect();
        assert_eq!(names, vec!["patient", "staff", "appointment", "billing", "medical_record"]);

        assert_eq!(service.primary_key_of("patient").unwrap(), "patient_id");
        assert_eq!(service.primary_key_of("medical_record").unwrap(), "record_id");
        assert_eq!(service.table_of("appointment").unwrap(), "appointments");
    }

    #[test]
    fn columns_keep_declaration_order() {
        let service = SchemaService::new().unwrap();
        let columns: Vec<&str> = service
            .columns_for("billing")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            columns,
            vec![
                "billing_id",
                "patient_id",
                "amount_due",
                "insurance_coverage",
                "payment_received",
                "outstanding_balance",
                "billing_date",
                "payment_status",
            ]
        );
    }

    #[test]
    fn unknown_entity_is_reported() {
        let service = SchemaService::new().unwrap();
        assert_eq!(
            service.columns_for("pharmacy").unwrap_err(),
            HospitalError::UnknownEntity("pharmacy".to_string())
        );
    }

    #[test]
    fn rejects_entity_without_registered_primary_key() {
        let mut service = SchemaService::empty();
        assert!(matches!(
            service.register_definition(ward_definition("")),
            Err(SchemaError::MissingPrimaryKey { .. })
        ));
        assert!(matches!(
            service.register_definition(ward_definition("id")),
            Err(SchemaError::MissingPrimaryKey { .. })
        ));
        assert!(service.register_definition(ward_definition("ward_id")).is_ok());
        assert_eq!(
            service.register_definition(ward_definition("ward_id")),
            Err(SchemaError::DuplicateEntity("ward".to_string()))
        );
    }

    #[test]
    fn rejects_names_that_are_not_sql_identifiers() {
        let mut definition = ward_definition("ward_id");
        definition.columns.push(PropertyConstraint::new("name; DROP TABLE wards", false));
        assert!(matches!(
            SchemaService::empty().register_definition(definition),
            Err(SchemaError::InvalidIdentifier(_))
        ));

        let mut definition = ward_definition("ward_id");
        definition.table = "Wards".to_string();
        assert!(matches!(
            SchemaService::empty().register_definition(definition),
            Err(SchemaError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn rejects_lifecycle_on_free_text_column() {
        let mut definition = ward_definition("ward_id");
        definition.lifecycle_rules.push(LifecycleRule {
            element: "name".to_string(),
            initial_state: None,
            transitions: vec![StateTransition::new("Open", "Closed")],
        });
        assert!(matches!(
            SchemaService::empty().register_definition(definition),
            Err(SchemaError::LifecycleRuleError(_))
        ));
    }

    #[tokio::test]
    async fn singleton_is_shared() {
        let first = init_schema_service().await.unwrap();
        let second = init_schema_service().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
