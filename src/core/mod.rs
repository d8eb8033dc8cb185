/*!
 * Core Types
 * Shared observation-state and fault-record types
 */

pub mod types;

pub use types::{ErrorRecord, Tristate};
