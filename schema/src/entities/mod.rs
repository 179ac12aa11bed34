// schema/src/entities/mod.rs

pub mod appointment;
pub mod billing;
pub mod medical_record;
pub mod patient;
pub mod staff;

pub use appointment::*;
pub use billing::*;
pub use medical_record::*;
pub use patient::*;
pub use staff::*;
