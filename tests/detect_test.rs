/*!
 * Detection Tests
 * Snapshot construction across same-origin, cross-origin, and degraded
 * host behaviors, driven through the simulated host
 */

use pretty_assertions::assert_eq;
use sandscope::host::sim::{OriginAccess, SimHost};
use sandscope::{
    Allowance, Grant, HostFault, SandboxController, Tristate,
};

#[test]
fn test_unframed_context_has_nothing_applicable() {
    let controller = SandboxController::new(SimHost::unframed());
    let snapshot = controller.detect();
    assert!(!snapshot.framed);
    assert_eq!(snapshot.cross_origin, Tristate::NotApplicable);
    assert_eq!(snapshot.sandboxed, Tristate::NotApplicable);
    assert_eq!(snapshot.unsandboxable, Tristate::NotApplicable);
    assert_eq!(snapshot.resandboxable, Tristate::NotApplicable);
    assert!(!snapshot.sandboxable);
    assert!(snapshot.allowances.is_none());
    assert!(snapshot.errors.is_none());
}

#[test]
fn test_framed_same_origin_unsandboxed() {
    let controller = SandboxController::new(SimHost::framed());
    let snapshot = controller.detect();
    assert!(snapshot.framed);
    assert_eq!(snapshot.cross_origin, Tristate::FALSE);
    assert_eq!(snapshot.sandboxed, Tristate::FALSE);
    assert!(snapshot.allowances.is_none());
    assert_eq!(snapshot.unsandboxable, Tristate::NotApplicable);
    assert!(snapshot.sandboxable);
    assert_eq!(snapshot.errors.map(|e| e.len()), Some(0));
}

#[test]
fn test_sandboxed_frame_round_trips_losslessly() {
    let host = SimHost::framed_sandboxed("allow-scripts allow-forms");
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.sandboxed, Tristate::TRUE);
    assert_eq!(snapshot.unsandboxable, Tristate::TRUE);
    assert_eq!(snapshot.resandboxable, Tristate::TRUE);
    assert!(snapshot.sandboxable);

    let map = snapshot.allowances.expect("decoded allowances");
    assert!(map.grants(Allowance::Scripts));
    assert!(map.grants(Allowance::Forms));
    assert_eq!(map.get(Allowance::SameOrigin), Some(Grant::Withheld));
}

#[test]
fn test_detection_restores_the_attribute_it_trialed() {
    let host = SimHost::framed_sandboxed("allow-scripts allow-forms");
    let controller = SandboxController::new(host.clone());
    let _ = controller.detect();
    // Trial removal and reapply must leave the original value in place
    assert_eq!(
        host.attribute("sandbox").as_deref(),
        Some("allow-scripts allow-forms")
    );
}

#[test]
fn test_normalizing_host_breaks_reimposition_fidelity() {
    let host = SimHost::framed_sandboxed("allow-scripts allow-forms");
    // The host silently drops one token from every written value
    host.rewrite_writes(|value| {
        value
            .split_whitespace()
            .filter(|t| *t != "allow-forms")
            .collect::<Vec<_>>()
            .join(" ")
    });
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.unsandboxable, Tristate::TRUE);
    // Reapplication nominally succeeded (attribute present) but the kept
    // allowance set is not the original
    assert_eq!(snapshot.resandboxable, Tristate::FALSE);
}

#[test]
fn test_pinned_attribute_is_not_unsandboxable() {
    let host = SimHost::framed_sandboxed("allow-scripts");
    host.make_removal_noop();
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.sandboxed, Tristate::TRUE);
    assert_eq!(snapshot.unsandboxable, Tristate::FALSE);
    assert_eq!(snapshot.resandboxable, Tristate::NotApplicable);
}

#[test]
fn test_faulting_removal_is_reported_not_raised() {
    let host = SimHost::framed_sandboxed("allow-scripts");
    host.fail_attribute_removal(HostFault::security("removal blocked"));
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.unsandboxable, Tristate::FALSE);
    let errors = snapshot.errors.expect("framed snapshot carries errors");
    assert!(errors.iter().any(|e| e.is_security_fault()));
}

#[test]
fn test_unreadable_attribute_degrades_to_unknown() {
    let host = SimHost::framed_sandboxed("allow-scripts");
    host.fail_attribute_reads(HostFault::security("no peeking"));
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.sandboxed, Tristate::Unknown);
    // Unreadable presence still yields the conservative default map
    let map = snapshot.allowances.expect("default allowances");
    assert_eq!(map.get(Allowance::SameOrigin), Some(Grant::Granted));
    assert_eq!(map.get(Allowance::Scripts), Some(Grant::Granted));
    assert!(!snapshot.errors.unwrap().is_empty());
}

#[test]
fn test_silent_null_reference_reads_as_cross_origin() {
    let controller = SandboxController::new(SimHost::cross_origin_silent());
    let snapshot = controller.detect();
    assert!(snapshot.framed);
    assert_eq!(snapshot.cross_origin, Tristate::TRUE);
    assert_eq!(snapshot.sandboxed, Tristate::Unknown);
    assert_eq!(snapshot.unsandboxable, Tristate::FALSE);
    assert_eq!(snapshot.resandboxable, Tristate::FALSE);
    assert!(!snapshot.sandboxable);

    let map = snapshot.allowances.expect("conservative defaults");
    assert!(map.grants(Allowance::Scripts));
    assert_eq!(map.get(Allowance::SameOrigin), Some(Grant::Unknown));
}

#[test]
fn test_neutralized_origin_handle_confirms_sandboxing() {
    let host = SimHost::cross_origin_silent();
    host.set_origin(OriginAccess::Readable(None));
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.sandboxed, Tristate::TRUE);
    let map = snapshot.allowances.expect("conservative defaults");
    assert_eq!(map.get(Allowance::SameOrigin), Some(Grant::Withheld));
}

#[test]
fn test_non_security_fault_retracts_the_cross_origin_call() {
    let host = SimHost::cross_origin_faulting(HostFault::new(
        "TypeError",
        "frameElement lookup failed",
    ));
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.cross_origin, Tristate::Unknown);
    assert_eq!(snapshot.sandboxed, Tristate::Unknown);
    assert!(!snapshot.errors.unwrap().is_empty());
}

#[test]
fn test_sandbox_worded_security_fault_confirms_sandboxing() {
    let host = SimHost::cross_origin_faulting(HostFault::security(
        "Blocked a frame from accessing a sandboxed frame.",
    ));
    let controller = SandboxController::new(host);
    let snapshot = controller.detect();
    assert_eq!(snapshot.cross_origin, Tristate::TRUE);
    assert_eq!(snapshot.sandboxed, Tristate::TRUE);
    let map = snapshot.allowances.expect("conservative defaults");
    assert_eq!(map.get(Allowance::SameOrigin), Some(Grant::Granted));
}

#[test]
fn test_snapshot_serializes() {
    let controller = SandboxController::new(SimHost::framed_sandboxed("allow-scripts"));
    let snapshot = controller.detect();
    let json = serde_json::to_value(&snapshot).expect("serializable snapshot");
    assert_eq!(json["framed"], serde_json::json!(true));
    assert_eq!(json["sandboxed"], serde_json::json!({ "known": true }));
}
