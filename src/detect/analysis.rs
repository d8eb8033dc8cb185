/*!
 * Restriction Analysis
 * Best-effort trial of the attribute's removability and reimposition
 * fidelity against a live, same-origin frame reference
 */

use crate::allowance::{self, AllowanceMap};
use crate::core::types::Tristate;
use crate::host::FrameElement;
use crate::probe::{self, ErrorSink, SANDBOX_ATTR};
use log::debug;

pub(crate) struct RestrictionAnalysis {
    pub sandboxed: Tristate,
    pub allowances: Option<AllowanceMap>,
    pub unsandboxable: Tristate,
    pub resandboxable: Tristate,
}

/// Probe a live frame for its restriction state by mutating it and watching
/// the side effects: read presence and value, trial-remove, reapply the
/// original value, and compare what the host kept against what was written.
/// Every step is independently fault-guarded; a fault degrades only that
/// step's output.
pub(crate) fn analyze_restriction<F: FrameElement>(
    frame: &F,
    sink: ErrorSink<'_>,
) -> RestrictionAnalysis {
    let mut result = RestrictionAnalysis {
        sandboxed: Tristate::Unknown,
        allowances: None,
        unsandboxable: Tristate::NotApplicable,
        resandboxable: Tristate::NotApplicable,
    };

    result.sandboxed = probe::has_attr(frame, SANDBOX_ATTR, sink).into();

    // Raw value: None means the host refused to let us read it
    let raw: Option<String> = if result.sandboxed.is_true() {
        probe::get_attr(frame, SANDBOX_ATTR, sink)
    } else {
        None
    };
    if result.sandboxed.is_true() || !result.sandboxed.is_known() {
        result.allowances = Some(allowance::encode(raw.as_deref()));
    }

    // Trial removal demonstrates (or refutes) unsandboxability
    if result.sandboxed.is_true() {
        result.unsandboxable = if probe::remove_attr(frame, SANDBOX_ATTR, sink) {
            match probe::has_attr(frame, SANDBOX_ATTR, sink) {
                Some(present) => Tristate::Known(!present),
                None => Tristate::FALSE,
            }
        } else {
            Tristate::FALSE
        };
    }

    // Reapply the captured value and judge the round trip's fidelity
    if result.unsandboxable.is_true() {
        if let Some(original_raw) = raw.as_deref() {
            let reapplied = probe::set_attr(frame, SANDBOX_ATTR, original_raw, sink)
                && probe::has_attr(frame, SANDBOX_ATTR, sink) == Some(true);
            if reapplied {
                result.resandboxable = match &result.allowances {
                    Some(original) => {
                        // The host may have normalized the value on the way in
                        let kept = probe::get_attr(frame, SANDBOX_ATTR, sink);
                        let kept_map = allowance::encode(kept.as_deref());
                        Tristate::Known(allowance::equivalent(original, &kept_map))
                    }
                    None => Tristate::Unknown,
                };
            } else {
                debug!("restriction attribute did not reapply");
            }
        }
    }

    result
}
