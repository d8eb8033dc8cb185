/*!
 * Detection
 * One consistent snapshot of the embedding boundary's restriction state
 */

mod analysis;
mod detector;
mod snapshot;

pub(crate) use detector::run_detect;
pub use snapshot::Snapshot;
