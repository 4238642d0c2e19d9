//! Edge-triggered touch detection.
//!
//! A trigger fires on the false→true transition of "inside the band" for a
//! (family, point) pair, never while the point merely stays inside.

use crate::events::{TriggerEvent, TriggerSink};
use crate::grid::{FamilyId, GridFamily};
use crate::log::debug;
use crate::points::PointSet;
use crate::types::Viewport;

/// Re-evaluate every (family, point) pair and emit one event per entry.
///
/// Pairs are visited family by family, points in insertion order within each
/// family, and events reach the sink in that order. Every stored state is
/// overwritten with the fresh one whether or not an event fired. Returns the
/// number of events emitted.
///
/// Each pair only reads its family and writes its own cell, so the pass has
/// no ordering dependencies between pairs.
pub fn evaluate<S: TriggerSink + ?Sized>(
    families: &[GridFamily],
    points: &mut PointSet,
    viewport: &Viewport,
    tick: u64,
    sink: &mut S,
) -> usize {
    debug_assert_eq!(points.family_count(), families.len());
    let mut fired = 0;
    for (fi, family) in families.iter().enumerate() {
        for point in points.iter_mut() {
            let position = point.position();
            let inside = family.probe(position, viewport).is_inside();
            let was_inside = point.swap_touching(fi, inside);
            if inside && !was_inside {
                let event = TriggerEvent {
                    family: FamilyId(fi),
                    point: point.id(),
                    position,
                    tick,
                };
                debug!(tick, family = fi, point = point.id().0, "trigger");
                sink.trigger(&event);
                fired += 1;
            }
        }
    }
    fired
}
