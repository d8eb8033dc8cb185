/*!
 * Host Surface Traits
 * Abstractions over the embedding environment's frame, document, and
 * origin-identity primitives
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of a single host capability call
///
/// # Must Use
/// Host faults carry restriction signals and must be handled
#[must_use = "host faults carry restriction signals and must be handled"]
pub type HostResult<T> = Result<T, HostFault>;

/// Fault raised by the host capability surface.
///
/// `name` carries the host's fault class; `"SecurityError"` is the one this
/// crate assigns meaning to (a positive signal of an active restriction).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[error("{name}: {message}")]
pub struct HostFault {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl HostFault {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Security-class fault, the kind hosts raise on forbidden access.
    pub fn security(message: impl Into<String>) -> Self {
        Self::new("SecurityError", message)
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// The embedded side's view of its own window and its embedding boundary.
///
/// Implementations adapt a concrete host (a DOM binding, or [`sim`] in
/// tests) to the probe layer. Every fallible primitive returns a
/// [`HostResult`]; the probe layer guarantees faults never travel further.
///
/// [`sim`]: crate::host::sim
pub trait HostWindow {
    type Frame: FrameElement<Parent = Self::Parent>;
    type Parent: ParentNode<Frame = Self::Frame, Document = Self::Document>;
    type Document: DocumentHandle<Frame = Self::Frame>;

    /// The current embedding frame reference. `Ok(None)` is the silent null
    /// some hosts return for cross-origin access instead of raising.
    fn frame_element(&self) -> HostResult<Option<Self::Frame>>;

    /// Whether this window was opened by another window.
    fn has_opener(&self) -> bool;

    /// Whether `top` is a different window than this one. Implementations
    /// must use identity comparison that tolerates proxy wrappers; equality
    /// operators mis-compare window proxies on some hosts.
    fn top_differs(&self) -> bool;

    /// Whether `parent` is a different window than this one.
    fn parent_differs(&self) -> bool;

    /// The script-visible origin handle (`document.domain` analog).
    /// `Ok(None)` when the handle is absent.
    fn script_origin(&self) -> HostResult<Option<String>>;
}

/// An element-like handle onto the embedding frame.
pub trait FrameElement: Sized {
    type Parent;

    /// Whether the referenced node is element-typed at all.
    fn is_element(&self) -> bool;

    /// The node's tag name, any case.
    fn tag_name(&self) -> String;

    /// Reference identity with another handle onto the same node.
    fn same_node(&self, other: &Self) -> bool;

    fn has_attribute(&self, name: &str) -> HostResult<bool>;

    fn get_attribute(&self, name: &str) -> HostResult<Option<String>>;

    fn set_attribute(&self, name: &str, value: &str) -> HostResult<()>;

    fn remove_attribute(&self, name: &str) -> HostResult<()>;

    /// All attribute name/value pairs, in document order.
    fn attributes(&self) -> HostResult<Vec<(String, String)>>;

    /// The node's parent within the embedding document, if linked.
    fn parent_node(&self) -> HostResult<Option<Self::Parent>>;
}

/// The parent node holding the frame inside the embedding document.
pub trait ParentNode {
    type Frame;
    type Document;

    /// The owning document, if reachable.
    fn owner_document(&self) -> Option<Self::Document>;

    /// Swap `replacement` in for `displaced`'s position; returns the node
    /// actually displaced.
    fn replace_child(
        &self,
        replacement: Self::Frame,
        displaced: &Self::Frame,
    ) -> HostResult<Self::Frame>;
}

/// A document that can mint fresh frame elements.
pub trait DocumentHandle {
    type Frame;

    /// Create an unattached frame element owned by this document.
    fn create_frame(&self) -> HostResult<Self::Frame>;
}
