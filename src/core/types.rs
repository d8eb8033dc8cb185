/*!
 * Core Types
 * Three-valued observation state and defensive fault records
 */

use crate::host::HostFault;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Word-boundary match for sandbox wording in host fault messages.
/// Matched against the lowercased message.
static SANDBOX_WORDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s(\[@])sandbox(es|ed|ing|[\s.,!)\]@]|$)").expect("static pattern")
});

/// Three-valued observation state.
///
/// Host-boundary observations can be inapplicable (a prerequisite such as
/// being framed does not hold), unknowable (the host gave no usable answer),
/// or definite. Collapsing these onto `Option<bool>` loses the first
/// distinction, so all three are kept explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    /// A prerequisite for the observation does not hold.
    NotApplicable,
    /// The observation was attempted but the host gave no usable answer.
    Unknown,
    /// A definite observation.
    Known(bool),
}

impl Tristate {
    pub const TRUE: Tristate = Tristate::Known(true);
    pub const FALSE: Tristate = Tristate::Known(false);

    /// Definitely observed true.
    pub fn is_true(self) -> bool {
        matches!(self, Tristate::Known(true))
    }

    /// Definitely observed false. Distinct from "unknown" and "not applicable".
    pub fn is_false(self) -> bool {
        matches!(self, Tristate::Known(false))
    }

    pub fn is_known(self) -> bool {
        matches!(self, Tristate::Known(_))
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        Tristate::Known(value)
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(v) => Tristate::Known(v),
            None => Tristate::Unknown,
        }
    }
}

/// Defensive copy of a host fault, taken immediately at the catch site so
/// that later mutation of the original fault cannot corrupt the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorRecord {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorRecord {
    /// `true` for the fault class hosts raise on forbidden cross-origin or
    /// sandboxed access.
    pub fn is_security_fault(&self) -> bool {
        self.name == "SecurityError"
    }

    /// `true` when the fault message names sandboxing as the cause.
    pub fn mentions_sandboxing(&self) -> bool {
        SANDBOX_WORDING.is_match(&self.message.to_lowercase())
    }
}

impl From<&HostFault> for ErrorRecord {
    fn from(fault: &HostFault) -> Self {
        Self {
            name: fault.name.clone(),
            message: fault.message.clone(),
            stack: fault.stack.clone(),
        }
    }
}
