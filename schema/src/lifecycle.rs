// schema/src/lifecycle.rs

use serde::{Deserialize, Serialize};

/// Defines one allowed move of a status column, e.g. appointment
/// "Pending" to "Confirmed".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateTransition {
    pub from_state: String,
    pub to_state: String,
}

impl StateTransition {
    pub fn new(from_state: &str, to_state: &str) -> Self {
        StateTransition {
            from_state: from_state.to_string(),
            to_state: to_state.to_string(),
        }
    }
}

/// The lifecycle of a single status column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleRule {
    /// The column this rule applies to (e.g., "status").
    pub element: String,
    /// The state assigned on insert when the client omits the column.
    pub initial_state: Option<String>,
    /// List of all possible transitions. States with no outgoing
    /// transition are terminal.
    pub transitions: Vec<StateTransition>,
}

impl LifecycleRule {
    /// Every state a row may currently be in for `to_state` to be a legal
    /// next value, the target itself included.
    pub fn allowed_sources(&self, to_state: &str) -> Vec<String> {
        let mut sources = vec![to_state.to_string()];
        for transition in &self.transitions {
            if transition.to_state == to_state && !sources.contains(&transition.from_state) {
                sources.push(transition.from_state.clone());
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment_status() -> LifecycleRule {
        LifecycleRule {
            element: "status".to_string(),
            initial_state: Some("Pending".to_string()),
            transitions: vec![
                StateTransition::new("Pending", "Confirmed"),
                StateTransition::new("Pending", "Cancelled"),
                StateTransition::new("Confirmed", "Cancelled"),
            ],
        }
    }

    #[test]
    fn nothing_leaves_cancelled() {
        let rule = appointment_status();
        for target in ["Pending", "Confirmed"] {
            assert!(!rule.allowed_sources(target).contains(&"Cancelled".to_string()));
        }
    }

    #[test]
    fn sources_include_target() {
        let rule = appointment_status();
        assert_eq!(rule.allowed_sources("Confirmed"), vec!["Confirmed", "Pending"]);
        assert_eq!(rule.allowed_sources("Cancelled"), vec!["Cancelled", "Pending", "Confirmed"]);
        assert_eq!(rule.allowed_sources("Pending"), vec!["Pending"]);
    }
}
