/*!
 * Allowance Codec
 * Sandbox attribute tokens as a structured capability map
 */

pub mod codec;
pub mod types;

pub use codec::{encode, equivalent};
pub use types::{Allowance, AllowanceMap, Grant};
