//! Structured logging facility
//!
//! - Single initialization point via `init(profile)`
//! - Structured lifecycle macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Boundary ownership: the engine layer emits start/end events, core and
//!   store code only use `tracing::debug!`
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use topo_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
