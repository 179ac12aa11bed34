// server/src/http/routes.rs

//! Route table. Entities are data here: each mount binds a URL segment to a
//! registry entity, the verbs it answers, and the wording of its replies.

/// Response wording for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRoute {
    /// Registry name passed to the repository.
    pub entity: &'static str,
    /// Field holding the row in create replies.
    pub created_field: &'static str,
    /// Field holding the row in update and delete replies.
    pub field: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub not_found: &'static str,
    /// When set, an empty listing answers 404 with this message.
    pub empty_list: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    pub list: bool,
    pub get: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Operations {
    pub const ALL: Operations = Operations {
        list: true,
        get: true,
        create: true,
        update: true,
        delete: true,
    };
    pub const READ_CREATE: Operations = Operations {
        list: true,
        get: true,
        create: true,
        update: false,
        delete: false,
    };
    pub const CREATE: Operations = Operations {
        list: false,
        get: false,
        create: true,
        update: false,
        delete: false,
    };
    pub const UPDATE: Operations = Operations {
        list: false,
        get: false,
        create: false,
        update: true,
        delete: false,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct Mount {
    pub path: &'static str,
    pub route: &'static EntityRoute,
    pub operations: Operations,
}

pub static PATIENT: EntityRoute = EntityRoute {
    entity: "patient",
    created_field: "patient",
    field: "patient",
    created: "Patient registered successfully!",
    updated: "Patient updated successfully",
    deleted: "Patient deleted successfully",
    not_found: "Patient not found",
    empty_list: None,
};

pub static STAFF: EntityRoute = EntityRoute {
    entity: "staff",
    created_field: "staff",
    field: "staff",
    created: "Staff added successfully!",
    updated: "Staff updated successfully",
    deleted: "Staff deleted successfully",
    not_found: "Staff member not found",
    empty_list: Some("No staff data found"),
};

pub static APPOINTMENT: EntityRoute = EntityRoute {
    entity: "appointment",
    created_field: "appointment",
    field: "appointment",
    created: "Appointment scheduled successfully!",
    updated: "Appointment updated successfully",
    deleted: "Appointment deleted successfully",
    not_found: "Appointment not found",
    empty_list: None,
};

pub static BILLING: EntityRoute = EntityRoute {
    entity: "billing",
    created_field: "billing",
    field: "billing",
    created: "Billing info added successfully!",
    updated: "Billing info updated successfully",
    deleted: "Billing info deleted successfully",
    not_found: "Billing record not found",
    empty_list: None,
};

pub static MEDICAL_RECORD: EntityRoute = EntityRoute {
    entity: "medical_record",
    created_field: "newRecord",
    field: "record",
    created: "Medical record added!",
    updated: "Medical record updated!",
    deleted: "Medical record deleted!",
    not_found: "Medical record not found",
    empty_list: None,
};

/// Every mounted path. `scheduling`, `registration`, `register` and
/// `patient` are the paths older clients still call.
pub static MOUNTS: &[Mount] = &[
    Mount { path: "patients", route: &PATIENT, operations: Operations::ALL },
    Mount { path: "staff", route: &STAFF, operations: Operations::READ_CREATE },
    Mount { path: "appointments", route: &APPOINTMENT, operations: Operations::ALL },
    Mount { path: "billing", route: &BILLING, operations: Operations::READ_CREATE },
    Mount { path: "medical-records", route: &MEDICAL_RECORD, operations: Operations::ALL },
    Mount { path: "scheduling", route: &APPOINTMENT, operations: Operations::ALL },
    Mount { path: "registration", route: &PATIENT, operations: Operations::CREATE },
    Mount { path: "register", route: &PATIENT, operations: Operations::CREATE },
    Mount { path: "patient", route: &PATIENT, operations: Operations::UPDATE },
];

#[cfg(test)]
mod tests {
    use super::*;
    use schema::SchemaService;

    #[test]
    fn every_mount_targets_a_registered_entity() {
        let schema = SchemaService::new().unwrap();
        for mount in MOUNTS {
            let entity = mount.route.entity;
            assert!(schema.entity(entity).is_ok(), "{} is not registered", entity);
        }
    }

    #[test]
    fn mount_paths_are_unique() {
        let mut paths: Vec<&str> = MOUNTS.iter().map(|m| m.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), MOUNTS.len());
    }
}
