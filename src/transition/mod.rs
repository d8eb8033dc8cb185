/*!
 * Transitions
 * Reversible privilege transitions against the embedding boundary
 */

mod controller;

pub use controller::{SandboxController, SandscopeOptions};
