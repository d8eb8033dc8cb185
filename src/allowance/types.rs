/*!
 * Allowance Types
 * The closed capability key set and its tri-state grant values
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sandbox capability key. The set is closed: these nine are every
/// allowance a restriction attribute can individually grant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Allowance {
    Forms,
    Modals,
    OrientationLock,
    PointerLock,
    Popups,
    PopupsToEscapeSandbox,
    SameOrigin,
    Scripts,
    TopNavigation,
}

impl Allowance {
    pub const ALL: [Allowance; 9] = [
        Allowance::Forms,
        Allowance::Modals,
        Allowance::OrientationLock,
        Allowance::PointerLock,
        Allowance::Popups,
        Allowance::PopupsToEscapeSandbox,
        Allowance::SameOrigin,
        Allowance::Scripts,
        Allowance::TopNavigation,
    ];

    /// The attribute token granting this allowance.
    pub fn token(self) -> &'static str {
        match self {
            Allowance::Forms => "allow-forms",
            Allowance::Modals => "allow-modals",
            Allowance::OrientationLock => "allow-orientation-lock",
            Allowance::PointerLock => "allow-pointer-lock",
            Allowance::Popups => "allow-popups",
            Allowance::PopupsToEscapeSandbox => "allow-popups-to-escape-sandbox",
            Allowance::SameOrigin => "allow-same-origin",
            Allowance::Scripts => "allow-scripts",
            Allowance::TopNavigation => "allow-top-navigation",
        }
    }

    /// Parse an attribute token; unrecognized tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        Allowance::ALL.into_iter().find(|a| a.token() == token)
    }
}

/// Tri-state grant value for one allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Explicitly granted by the attribute value.
    Granted,
    /// Explicitly withheld by the attribute value.
    Withheld,
    /// The grantor is absent or unobservable.
    Unknown,
}

impl Grant {
    pub fn is_granted(self) -> bool {
        matches!(self, Grant::Granted)
    }

    pub fn from_flag(present: bool) -> Self {
        if present {
            Grant::Granted
        } else {
            Grant::Withheld
        }
    }
}

/// Mapping of allowance keys to grants.
///
/// Key *presence* is significant: a map may be partial (a transition
/// request, for instance, only names the keys it cares about), and
/// [`equivalent`] treats a hole on either side as a mismatch even when the
/// other side's value would match by coincidence.
///
/// [`equivalent`]: crate::allowance::equivalent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceMap {
    entries: BTreeMap<Allowance, Grant>,
}

impl AllowanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Allowance, grant: Grant) {
        self.entries.insert(key, grant);
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: Allowance, grant: Grant) -> Self {
        self.set(key, grant);
        self
    }

    /// The grant for a key, or `None` when the key is absent from the map.
    pub fn get(&self, key: Allowance) -> Option<Grant> {
        self.entries.get(&key).copied()
    }

    pub fn contains(&self, key: Allowance) -> bool {
        self.entries.contains_key(&key)
    }

    /// Whether the key is present and explicitly granted.
    pub fn grants(&self, key: Allowance) -> bool {
        self.get(key).is_some_and(Grant::is_granted)
    }

    pub fn keys(&self) -> impl Iterator<Item = Allowance> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
