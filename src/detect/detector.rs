/*!
 * Detector
 * Orchestrates boundary probes into one detection snapshot, including the
 * cross-origin disambiguation policy
 */

use super::analysis::analyze_restriction;
use super::snapshot::Snapshot;
use crate::allowance::{Allowance, AllowanceMap, Grant};
use crate::core::types::{ErrorRecord, Tristate};
use crate::host::HostWindow;
use crate::probe;
use log::debug;

/// Conservative allowance assumption for a cross-origin embedding whose
/// attribute is unobservable: scripts are evidently running (this code is),
/// everything else is unknowable.
fn cross_origin_default_map() -> AllowanceMap {
    let mut map = AllowanceMap::new();
    for key in Allowance::ALL {
        let grant = match key {
            Allowance::Scripts => Grant::Granted,
            _ => Grant::Unknown,
        };
        map.set(key, grant);
    }
    map
}

/// Produce a fresh detection snapshot.
///
/// Not framed short-circuits everything. A live frame reference means
/// same-origin and gets the full mutation-trial analysis. A null reference
/// enters the cross-origin disambiguation policy below.
pub(crate) fn run_detect<H: HostWindow>(host: &H) -> Snapshot {
    if !probe::is_framed(host) {
        debug!("not framed; restriction state not applicable");
        return Snapshot::unframed();
    }

    let mut errors: Vec<ErrorRecord> = Vec::new();
    let mut frame_fault: Option<ErrorRecord> = None;
    let frame = {
        let mut sink = |rec: ErrorRecord| {
            frame_fault = Some(rec.clone());
            errors.push(rec);
        };
        probe::frame_element(host, &mut sink)
    };

    let mut snapshot = Snapshot::framed_unknown();
    match frame {
        Some(frame) => {
            snapshot.cross_origin = Tristate::FALSE;
            let analysis = analyze_restriction(&frame, &mut |rec| errors.push(rec));
            snapshot.sandboxed = analysis.sandboxed;
            snapshot.allowances = analysis.allowances;
            snapshot.unsandboxable = analysis.unsandboxable;
            snapshot.resandboxable = analysis.resandboxable;
        }
        None => {
            // Some hosts null the frame reference for cross-origin access
            // instead of raising; treat the null itself as the signal and
            // seed the most frequent case
            snapshot.cross_origin = Tristate::TRUE;
            snapshot.sandboxed = Tristate::Unknown;
            snapshot.unsandboxable = Tristate::FALSE;
            snapshot.resandboxable = Tristate::FALSE;
            let mut allowances = cross_origin_default_map();
            disambiguate_cross_origin(
                host,
                &mut snapshot,
                &mut allowances,
                frame_fault.as_ref(),
                &mut |rec| errors.push(rec),
            );
            snapshot.allowances = Some(allowances);
        }
    }

    snapshot.sandboxable = snapshot.resandboxable.is_true()
        || (snapshot.cross_origin.is_false()
            && (snapshot.sandboxed.is_false()
                || snapshot
                    .allowances
                    .as_ref()
                    .is_some_and(|m| m.grants(Allowance::SameOrigin))));

    snapshot.errors = Some(errors);
    snapshot
}

/// Cross-origin disambiguation policy, in priority order. Best-effort
/// heuristics over engine-specific behavior; revisions per target host
/// belong here and nowhere else.
fn disambiguate_cross_origin<H: HostWindow>(
    host: &H,
    snapshot: &mut Snapshot,
    allowances: &mut AllowanceMap,
    frame_fault: Option<&ErrorRecord>,
    sink: probe::ErrorSink<'_>,
) {
    if probe::script_origin(host, sink).is_none() {
        // The origin handle is neutralized by sandboxing that withholds
        // allow-same-origin, even cross-origin
        debug!("origin handle unobservable; concluding active restriction");
        snapshot.sandboxed = Tristate::TRUE;
        allowances.set(Allowance::SameOrigin, Grant::Withheld);
    } else if let Some(fault) = frame_fault {
        if !fault.is_security_fault() {
            // The null reference might not have meant cross-origin after all
            debug!("frame fault was {}; retracting cross-origin call", fault.name);
            snapshot.cross_origin = Tristate::Unknown;
        } else if fault.mentions_sandboxing() {
            // Restriction active, yet origin access raised instead of being
            // silently neutralized: same-origin is granted and something
            // else is doing the blocking
            snapshot.sandboxed = Tristate::TRUE;
            allowances.set(Allowance::SameOrigin, Grant::Granted);
        }
    }
}
