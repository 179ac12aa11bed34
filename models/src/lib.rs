// models/src/lib.rs

pub mod errors;
pub mod values;

pub use errors::{HospitalError, HospitalResult};
pub use values::{FieldMapping, FieldValue, Record};
