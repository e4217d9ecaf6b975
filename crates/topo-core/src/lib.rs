//! Topo Core - Set lifecycle and validation kernel
//!
//! This crate provides the domain logic for managing Set instances inside a
//! business topology:
//! - Set instance and object schema models
//! - Condition builder (AND-only equality/inequality predicates)
//! - Pagination/projection normalizer for search requests
//! - Backend and schema resolver interfaces, plus an in-memory backend
//! - Set lifecycle operations (create, update, delete, batch delete, search)
//!   enforcing identity, scoping and parent-scoped name uniqueness

pub mod backend;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod query;

// Re-export commonly used types
pub use backend::{InstanceBackend, Mutation, SchemaResolver, TopoBackend, WriteOutcome};
pub use errors::{ExError, ExErrorKind, Result, TopoError};
pub use model::{ObjectSchema, SetInstance};
pub use ops::Store;
pub use query::{Condition, Page, Predicate, QueryInput, SearchParams};
