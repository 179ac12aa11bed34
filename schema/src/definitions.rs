use crate::constraints::PropertyConstraint;
use crate::lifecycle::LifecycleRule;

/// A trait for declaring the table, key, columns and lifecycle of an
/// individual entity type.
pub trait EntitySchema {
    /// The registry name of the entity (e.g., "patient").
    fn schema_name() -> &'static str;

    /// The table rows of this entity live in.
    fn table_name() -> &'static str;

    /// The store-assigned key column. Never accepted from clients.
    fn primary_key() -> &'static str;

    /// The ordered columns of the entity, primary key included.
    fn property_constraints() -> Vec<PropertyConstraint>;

    /// Lifecycle rules governing status columns.
    fn lifecycle_rules() -> Vec<LifecycleRule> {
        Vec::new()
    }
}

/// The compiled declaration of one entity, as held by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDefinition {
    pub name: String,
    pub table: String,
    pub primary_key: String,
    pub columns: Vec<PropertyConstraint>,
    pub lifecycle_rules: Vec<LifecycleRule>,
}

impl EntityDefinition {
    pub fn from_schema<T: EntitySchema>() -> Self {
        EntityDefinition {
            name: T::schema_name().to_string(),
            table: T::table_name().to_string(),
            primary_key: T::primary_key().to_string(),
            columns: T::property_constraints(),
            lifecycle_rules: T::lifecycle_rules(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&PropertyConstraint> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key_column(&self) -> Option<&PropertyConstraint> {
        self.column(&self.primary_key)
    }

    /// Columns a client may write, in declared order.
    pub fn writable_columns(&self) -> impl Iterator<Item = &PropertyConstraint> + '_ {
        self.columns.iter().filter(move |c| c.name != self.primary_key)
    }

    pub fn lifecycle_for(&self, column: &str) -> Option<&LifecycleRule> {
        self.lifecycle_rules.iter().find(|r| r.element == column)
    }
}
