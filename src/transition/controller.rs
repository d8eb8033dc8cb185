/*!
 * Transition Controller
 * The unsandbox / sandbox / resandbox / reload operations over one frozen
 * baseline snapshot
 */

use crate::allowance::{Allowance, AllowanceMap, Grant};
use crate::core::types::ErrorRecord;
use crate::detect::{run_detect, Snapshot};
use crate::host::{DocumentHandle, FrameElement, HostResult, HostWindow, ParentNode};
use crate::probe::{self, SANDBOX_ATTR};
use log::{debug, info, warn};

/// Construction options. No options are recognized yet; the struct exists
/// so adding one later is not a breaking change.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct SandscopeOptions {}

/// Drives privilege transitions from inside an embedded context.
///
/// One detection snapshot is taken at construction and frozen as the
/// baseline; every operation consults it to short-circuit cases that can
/// never change (never framed, definitively cross-origin) before taking a
/// fresh snapshot and mutating. All operations are synchronous, never raise,
/// and re-observe state after every mutation rather than trusting prior
/// snapshots; the embedder may be racing us on the same attribute.
pub struct SandboxController<H: HostWindow> {
    host: H,
    baseline: Snapshot,
    memento: Option<Snapshot>,
    options: SandscopeOptions,
}

impl<H: HostWindow> SandboxController<H> {
    pub fn new(host: H) -> Self {
        Self::with_options(host, SandscopeOptions::default())
    }

    pub fn with_options(host: H, options: SandscopeOptions) -> Self {
        let baseline = run_detect(&host);
        info!(
            "controller ready: framed={}, cross_origin={:?}, sandboxed={:?}",
            baseline.framed, baseline.cross_origin, baseline.sandboxed
        );
        Self {
            host,
            baseline,
            memento: None,
            options,
        }
    }

    /// The snapshot frozen at construction.
    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    pub fn options(&self) -> &SandscopeOptions {
        &self.options
    }

    /// Take a fresh detection snapshot. Note the restriction analysis this
    /// runs performs trial mutations against the attribute.
    pub fn detect(&self) -> Snapshot {
        run_detect(&self.host)
    }

    /// Lift the restriction attribute. Trivially `true` when never framed;
    /// `false` without authority (cross-origin or unknown-origin baseline);
    /// otherwise succeeds iff the attribute is confirmed absent afterward.
    pub fn unsandbox(&mut self) -> bool {
        if !self.baseline.framed {
            // Never framed, and that will never change
            return true;
        }
        if !self.baseline.cross_origin.is_false() {
            debug!("unsandbox: no same-origin authority over the boundary");
            return false;
        }

        let current = self.detect();
        let mut result = current.sandboxed.is_false();
        if current.sandboxed.is_true() && current.unsandboxable.is_true() {
            // Keep the pre-lift state so resandbox can reimpose it later
            self.memento = Some(current);
            result = false;
            let mut sink = |rec: ErrorRecord| {
                warn!("unsandbox: {}: {}", rec.name, rec.message);
            };
            if let Some(frame) = probe::frame_element(&self.host, &mut sink) {
                if probe::remove_attr(&frame, SANDBOX_ATTR, &mut sink) {
                    result = probe::has_attr(&frame, SANDBOX_ATTR, &mut sink) == Some(false);
                }
            }
            if result {
                info!("unsandbox: restriction lifted");
            }
        }
        result
    }

    /// Replace the frame element with an attribute-identical clone so the
    /// current attribute set takes effect for a freshly loaded document.
    /// Removing or editing the attribute on a live frame does not apply to
    /// the already-loaded document on some hosts; a full swap does.
    pub fn reload(&self) -> bool {
        if !(self.baseline.framed && self.baseline.cross_origin.is_false()) {
            return false;
        }
        let mut sink = |rec: ErrorRecord| {
            debug!("reload: {}: {}", rec.name, rec.message);
        };
        let Some(frame) = probe::frame_element(&self.host, &mut sink) else {
            return false;
        };
        match Self::swap_in_clone(&frame) {
            Ok(swapped) => {
                if swapped {
                    info!("reload: frame element replaced in place");
                }
                swapped
            }
            Err(fault) => {
                warn!("reload: {fault}");
                false
            }
        }
    }

    fn swap_in_clone(frame: &H::Frame) -> HostResult<bool> {
        let Some(parent) = frame.parent_node()? else {
            return Ok(false);
        };
        let Some(document) = parent.owner_document() else {
            return Ok(false);
        };
        let attrs = frame.attributes()?;
        let replacement = document.create_frame()?;
        for (name, value) in &attrs {
            replacement.set_attribute(name, value)?;
        }
        let displaced = parent.replace_child(replacement, frame)?;
        // The swap only counts if the node it displaced was really ours
        Ok(displaced.same_node(frame))
    }

    /// Impose (or tighten) the restriction with the requested allowances.
    /// Keys the request leaves unset inherit from the current live state.
    pub fn sandbox(&self, request: &AllowanceMap) -> bool {
        if !self.baseline.framed || self.baseline.cross_origin.is_true() {
            debug!("sandbox: baseline rules the boundary out");
            return false;
        }
        let current = self.detect();
        let actionable = (current.sandboxed.is_false() && current.sandboxable)
            || (current.sandboxed.is_true() && current.unsandboxable.is_true());
        if !actionable {
            debug!("sandbox: live state is neither restrictable nor rewritable");
            return false;
        }

        let tokens = effective_tokens(request, current.allowances.as_ref());
        if tokens.is_empty() {
            return false;
        }
        // Granting both same-origin and scripts lets the embedded document
        // strip its own restriction; only their absence locks anything down
        let locking_down = !tokens.contains(&Allowance::SameOrigin.token())
            || !tokens.contains(&Allowance::Scripts.token());
        let value = tokens.join(" ");

        let mut sink = |rec: ErrorRecord| {
            debug!("sandbox: {}: {}", rec.name, rec.message);
        };
        let Some(frame) = probe::frame_element(&self.host, &mut sink) else {
            return false;
        };
        let mut result = if probe::set_attr(&frame, SANDBOX_ATTR, &value, &mut sink) {
            locking_down
        } else {
            false
        };

        // Judge the write through a fresh reference; the new configuration
        // may already be pushing back
        if let Some(fresh) = probe::frame_element(&self.host, &mut sink) {
            match fresh.get_attribute(SANDBOX_ATTR) {
                Ok(raw) => {
                    let kept = normalize_tokens(raw.as_deref().unwrap_or(""));
                    result = kept == value
                        || (locking_down
                            && (kept.is_empty()
                                || probe::script_origin(&self.host, &mut sink).is_none()));
                }
                Err(fault) => {
                    // Introspection now raising is itself evidence the
                    // lockdown took effect
                    debug!("sandbox: post-write read raised: {fault}");
                    result = locking_down;
                }
            }
        }
        if result {
            info!("sandbox: restriction applied: {value}");
        }
        result
    }

    /// Reimpose the allowance set recorded by the last successful
    /// [`unsandbox`](Self::unsandbox). `false` when no memento is held; the
    /// memento survives failed attempts and is cleared on success, so at
    /// most one reimposition per lift.
    pub fn resandbox(&mut self) -> bool {
        let Some(memento) = self.memento.as_ref() else {
            return false;
        };
        let Some(request) = memento.allowances.clone() else {
            return false;
        };
        let result = self.sandbox(&request);
        if result {
            info!("resandbox: prior allowance set reimposed");
            self.memento = None;
        }
        result
    }
}

/// Token list a sandbox request resolves to: a key's token is included when
/// the request grants it, or when the request is silent on it and the live
/// map grants it. Sorted.
fn effective_tokens(request: &AllowanceMap, live: Option<&AllowanceMap>) -> Vec<&'static str> {
    let mut tokens: Vec<&'static str> = Vec::new();
    for key in Allowance::ALL {
        let include = match request.get(key) {
            Some(Grant::Granted) => true,
            Some(Grant::Withheld) => false,
            Some(Grant::Unknown) | None => live.is_some_and(|m| m.grants(key)),
        };
        if include {
            tokens.push(key.token());
        }
    }
    tokens.sort_unstable();
    tokens
}

/// Trim, split, sort, and rejoin a raw attribute value for comparison.
fn normalize_tokens(raw: &str) -> String {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_tokens_request_overrides_live() {
        let live = crate::allowance::encode(Some("allow-forms allow-popups"));
        let request = AllowanceMap::new()
            .with(Allowance::Forms, Grant::Withheld)
            .with(Allowance::Scripts, Grant::Granted);
        assert_eq!(
            effective_tokens(&request, Some(&live)),
            vec!["allow-popups", "allow-scripts"]
        );
    }

    #[test]
    fn test_effective_tokens_silent_keys_inherit() {
        let live = crate::allowance::encode(Some("allow-scripts"));
        let request = AllowanceMap::new().with(Allowance::Forms, Grant::Unknown);
        assert_eq!(effective_tokens(&request, Some(&live)), vec!["allow-scripts"]);
    }

    #[test]
    fn test_effective_tokens_without_live_state() {
        let request = AllowanceMap::new().with(Allowance::Scripts, Grant::Granted);
        assert_eq!(effective_tokens(&request, None), vec!["allow-scripts"]);
    }

    #[test]
    fn test_normalize_tokens() {
        assert_eq!(
            normalize_tokens("  allow-scripts   allow-forms "),
            "allow-forms allow-scripts"
        );
        assert_eq!(normalize_tokens(""), "");
    }
}
