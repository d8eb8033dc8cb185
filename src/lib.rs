/*!
 * Sandscope
 * Frame sandbox detection and reversible privilege transitions, driven from
 * inside the embedded context through an abstract host capability surface.
 */

pub mod allowance;
pub mod core;
pub mod detect;
pub mod host;
pub mod probe;
pub mod transition;

// Re-exports
pub use crate::allowance::{encode, equivalent, Allowance, AllowanceMap, Grant};
pub use crate::core::types::{ErrorRecord, Tristate};
pub use crate::detect::Snapshot;
pub use crate::host::{
    DocumentHandle, FrameElement, HostFault, HostResult, HostWindow, ParentNode,
};
pub use crate::transition::{SandboxController, SandscopeOptions};
