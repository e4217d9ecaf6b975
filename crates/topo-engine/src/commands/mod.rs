//! Command orchestration layer
//!
//! `set` holds one boundary-logged handler per lifecycle operation,
//! `set_command` the typed command enum, `dispatch` the request entry point.

pub mod dispatch;
pub mod set;
pub mod set_command;
