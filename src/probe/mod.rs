/*!
 * Boundary Probe
 * Fault-guarded accessors and mutators against the embedding frame
 *
 * Every function here upholds one contract: a host fault never travels past
 * the probe. Faults are cloned into [`ErrorRecord`]s, handed to the caller's
 * sink, and replaced by a typed sentinel: `None` for "unobtainable" reads,
 * `false` for mutations that did not take effect.
 */

use crate::core::types::ErrorRecord;
use crate::host::{FrameElement, HostWindow};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// The restriction attribute name.
pub const SANDBOX_ATTR: &str = "sandbox";

/// Side channel receiving a cloned record for every fault a probe swallows.
pub type ErrorSink<'a> = &'a mut dyn FnMut(ErrorRecord);

static FRAME_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^i?frame$").expect("static pattern"));

/// Structural check that a candidate reference really is a frame element
/// and not a stand-in or proxy lacking the attribute surface.
pub fn is_frame_like<F: FrameElement>(el: &F) -> bool {
    el.is_element() && FRAME_TAG.is_match(&el.tag_name())
}

/// Whether the current context is embedded in an ancestor browsing context:
/// no opener relationship, and top or parent is a different window.
pub fn is_framed<H: HostWindow>(host: &H) -> bool {
    !host.has_opener() && (host.top_differs() || host.parent_differs())
}

/// Obtain the live frame reference. `None` covers the silent cross-origin
/// null, a raised fault, and a reference failing the structural check.
pub fn frame_element<H: HostWindow>(host: &H, sink: ErrorSink<'_>) -> Option<H::Frame> {
    match host.frame_element() {
        Ok(frame) => frame.filter(is_frame_like),
        Err(fault) => {
            debug!("frame reference raised: {fault}");
            sink(ErrorRecord::from(&fault));
            None
        }
    }
}

/// The script-visible origin handle, folded to `None` when unreadable or
/// empty. An unreadable handle inside a frame is itself a restriction
/// signal.
pub fn script_origin<H: HostWindow>(host: &H, sink: ErrorSink<'_>) -> Option<String> {
    match host.script_origin() {
        Ok(origin) => origin.filter(|o| !o.is_empty()),
        Err(fault) => {
            debug!("origin handle raised: {fault}");
            sink(ErrorRecord::from(&fault));
            None
        }
    }
}

/// Attribute presence; `None` when the host refuses to answer.
pub fn has_attr<F: FrameElement>(frame: &F, name: &str, sink: ErrorSink<'_>) -> Option<bool> {
    match frame.has_attribute(name) {
        Ok(present) => Some(present),
        Err(fault) => {
            debug!("hasAttribute({name}) raised: {fault}");
            sink(ErrorRecord::from(&fault));
            None
        }
    }
}

/// Attribute value, with an absent attribute reading as empty; `None` when
/// the host refuses to answer.
pub fn get_attr<F: FrameElement>(frame: &F, name: &str, sink: ErrorSink<'_>) -> Option<String> {
    match frame.get_attribute(name) {
        Ok(value) => Some(value.unwrap_or_default()),
        Err(fault) => {
            debug!("getAttribute({name}) raised: {fault}");
            sink(ErrorRecord::from(&fault));
            None
        }
    }
}

/// Best-effort attribute write; `false` means the call itself raised.
pub fn set_attr<F: FrameElement>(
    frame: &F,
    name: &str,
    value: &str,
    sink: ErrorSink<'_>,
) -> bool {
    match frame.set_attribute(name, value) {
        Ok(()) => true,
        Err(fault) => {
            debug!("setAttribute({name}) raised: {fault}");
            sink(ErrorRecord::from(&fault));
            false
        }
    }
}

/// Best-effort attribute removal; `false` means the call itself raised.
/// A clean return does not prove the attribute is gone; re-check presence.
pub fn remove_attr<F: FrameElement>(frame: &F, name: &str, sink: ErrorSink<'_>) -> bool {
    match frame.remove_attribute(name) {
        Ok(()) => true,
        Err(fault) => {
            debug!("removeAttribute({name}) raised: {fault}");
            sink(ErrorRecord::from(&fault));
            false
        }
    }
}
