// schema/src/lib.rs

//! Declarations of the hospital entities: tables, primary keys, column kinds
//! and constraints, and the lifecycle of status columns. The registry in
//! [`service`] is the only source of column names that ever reach SQL text.

pub mod constraints;
pub mod definitions;
pub mod entities;
pub mod errors;
pub mod lifecycle;
pub mod service;

pub use constraints::*;
pub use definitions::*;
pub use entities::*;
pub use errors::*;
pub use lifecycle::*;
pub use service::{init_schema_service, SchemaService};
