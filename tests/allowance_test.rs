/*!
 * Allowance Codec Tests
 * Public-surface tests for token decoding and map equivalence
 */

use pretty_assertions::assert_eq;
use sandscope::{encode, equivalent, Allowance, AllowanceMap, Grant};

#[test]
fn test_unreadable_attribute_defaults() {
    let map = encode(None);
    assert_eq!(map.get(Allowance::SameOrigin), Some(Grant::Granted));
    assert_eq!(map.get(Allowance::Scripts), Some(Grant::Granted));
    assert_eq!(map.get(Allowance::Forms), Some(Grant::Unknown));
    assert_eq!(map.get(Allowance::TopNavigation), Some(Grant::Unknown));
    assert_eq!(map.len(), 9);
}

#[test]
fn test_empty_attribute_withholds_all_nine() {
    let map = encode(Some(""));
    for key in Allowance::ALL {
        assert_eq!(map.get(key), Some(Grant::Withheld), "{key:?}");
    }
}

#[test]
fn test_decoding_is_case_and_whitespace_insensitive() {
    let canonical = encode(Some("allow-forms"));
    assert_eq!(encode(Some("ALLOW-FORMS")), canonical);
    assert_eq!(encode(Some(" allow-forms ")), canonical);
}

#[test]
fn test_every_token_decodes_to_its_key() {
    for key in Allowance::ALL {
        let map = encode(Some(key.token()));
        assert!(map.grants(key), "{key:?}");
        for other in Allowance::ALL {
            if other != key {
                assert_eq!(map.get(other), Some(Grant::Withheld), "{other:?}");
            }
        }
    }
}

#[test]
fn test_equivalence_is_order_independent() {
    let a = encode(Some("allow-scripts allow-forms allow-popups"));
    let b = encode(Some("allow-popups allow-forms allow-scripts"));
    assert!(equivalent(&a, &b));
    assert!(equivalent(&b, &a));
}

#[test]
fn test_equivalence_requires_key_presence_on_both_sides() {
    let full = encode(Some("allow-scripts"));
    let partial = AllowanceMap::new().with(Allowance::Scripts, Grant::Granted);
    // Every present key in `partial` matches `full`, but the eight holes do not
    assert!(!equivalent(&full, &partial));
    assert!(!equivalent(&partial, &full));
}

#[test]
fn test_unknown_is_its_own_value() {
    let a = AllowanceMap::new().with(Allowance::Popups, Grant::Unknown);
    let b = AllowanceMap::new().with(Allowance::Popups, Grant::Unknown);
    let c = AllowanceMap::new().with(Allowance::Popups, Grant::Withheld);
    assert!(equivalent(&a, &b));
    assert!(!equivalent(&a, &c));
}

#[test]
fn test_empty_maps_are_equivalent() {
    assert!(equivalent(&AllowanceMap::new(), &AllowanceMap::new()));
}
