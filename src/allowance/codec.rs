/*!
 * Allowance Codec
 * Raw attribute values to allowance maps, and exact map equivalence
 */

use super::types::{Allowance, AllowanceMap, Grant};

/// Decode a raw sandbox attribute value into a full nine-key allowance map.
///
/// `None` means the attribute's value could not be read at all; the platform
/// default for that case is an effectively unrestricted document, so
/// same-origin and scripts come back granted and everything else unknown.
/// A readable value is trimmed, case-folded, and whitespace-split; each key
/// is granted iff its token occurs. Unrecognized tokens are ignored, so
/// `encode(Some(""))` withholds all nine keys.
pub fn encode(raw: Option<&str>) -> AllowanceMap {
    let mut map = AllowanceMap::new();
    match raw {
        None => {
            for key in Allowance::ALL {
                let grant = match key {
                    Allowance::SameOrigin | Allowance::Scripts => Grant::Granted,
                    _ => Grant::Unknown,
                };
                map.set(key, grant);
            }
        }
        Some(value) => {
            let lowered = value.trim().to_lowercase();
            let tokens: Vec<&str> = lowered.split_whitespace().collect();
            for key in Allowance::ALL {
                map.set(key, Grant::from_flag(tokens.contains(&key.token())));
            }
        }
    }
    map
}

/// Exact equivalence over the union of both maps' present keys.
///
/// A key present in one map and absent from the other breaks equivalence
/// regardless of values; present keys must match exactly, tri-state
/// included. Short-circuits on the first mismatch.
pub fn equivalent(a: &AllowanceMap, b: &AllowanceMap) -> bool {
    for key in Allowance::ALL {
        match (a.get(key), b.get(key)) {
            (None, None) => continue,
            (Some(x), Some(y)) if x == y => continue,
            _ => return false,
        }
    }
    true
}
