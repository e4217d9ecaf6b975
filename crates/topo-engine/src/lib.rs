//! Topo Engine - Request boundary for set lifecycle operations
//!
//! Resolves `(method, path)` pairs through an explicit route table, parses
//! path identities, runs the matching lifecycle operation with boundary
//! logging and shapes the JSON response.

pub mod commands;
pub mod routes;

pub use commands::dispatch::handle;
pub use routes::{Method, Route};
