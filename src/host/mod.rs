/*!
 * Host Surface
 * The consumed capability interface onto the embedding environment
 */

pub mod sim;
pub mod traits;

pub use traits::{
    DocumentHandle, FrameElement, HostFault, HostResult, HostWindow, ParentNode,
};
