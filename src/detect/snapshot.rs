/*!
 * Detection Snapshot
 */

use crate::allowance::AllowanceMap;
use crate::core::types::{ErrorRecord, Tristate};
use serde::{Deserialize, Serialize};

/// Immutable result of one detection run.
///
/// Tri-state fields distinguish "observed false", "observed true", and
/// "could not observe" from "not applicable" (a prerequisite such as
/// `framed` does not hold). `errors` is `None` for an unframed context and
/// a (possibly empty) list otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    /// Whether this context is embedded in an ancestor browsing context.
    pub framed: bool,
    /// Whether the embedding document has a different origin.
    pub cross_origin: Tristate,
    /// Whether the restriction attribute is present on the frame.
    pub sandboxed: Tristate,
    /// Decoded allowance set, when one was observable or inferable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowances: Option<AllowanceMap>,
    /// Whether removing the restriction attribute was demonstrated feasible.
    pub unsandboxable: Tristate,
    /// Whether a removed restriction was reimposed *losslessly*: the
    /// reapplied allowance set decoded back exactly equivalent, not merely
    /// present again.
    pub resandboxable: Tristate,
    /// Whether a restriction could authoritatively be added from here.
    pub sandboxable: bool,
    /// Faults swallowed while probing, in capture order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorRecord>>,
}

impl Snapshot {
    /// The trivial snapshot for a context that was never framed: nothing to
    /// observe, nothing applicable.
    pub(crate) fn unframed() -> Self {
        Self {
            framed: false,
            cross_origin: Tristate::NotApplicable,
            sandboxed: Tristate::NotApplicable,
            allowances: None,
            unsandboxable: Tristate::NotApplicable,
            resandboxable: Tristate::NotApplicable,
            sandboxable: false,
            errors: None,
        }
    }

    /// Working snapshot for a framed context, fields unknown until probed.
    pub(crate) fn framed_unknown() -> Self {
        Self {
            framed: true,
            cross_origin: Tristate::Unknown,
            sandboxed: Tristate::Unknown,
            allowances: None,
            unsandboxable: Tristate::NotApplicable,
            resandboxable: Tristate::NotApplicable,
            sandboxable: false,
            errors: None,
        }
    }
}
