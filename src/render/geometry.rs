//! Geometric helpers for the renderer: which lines and dashes can be seen,
//! and clipping segments to the viewport.

use std::ops::RangeInclusive;

use glam::DVec2;

use crate::dash::{DashFrame, DashPattern};
use crate::grid::GridFamily;
use crate::types::Viewport;

/// Most indices a line or dash range may hold. Anything denser is far below
/// a pixel apart on any realistic viewport.
pub const MAX_INDICES: i64 = 4096;

/// Largest magnitude up to which every integer is exact in an `f64`.
const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Line indices that may cross the viewport, padded by one on each side.
///
/// `reach` is the half-extent covered along the normal; the full diagonal is
/// always enough. When the lines are packed too tightly to enumerate, only
/// the [`MAX_INDICES`] lines around the middle of the window are returned.
pub fn line_range(family: &GridFamily, reach: f64) -> RangeInclusive<i64> {
    let spacing = family.spacing();
    let offset = family.offset();
    let lo = ((-reach - offset) / spacing).floor() - 1.0;
    let hi = ((reach - offset) / spacing).ceil() + 1.0;
    index_range(lo, hi).unwrap_or_else(|| {
        // NaN (from infinite bounds) lands on index 0
        let mid = (lo / 2.0 + hi / 2.0)
            .round()
            .clamp(-EXACT_LIMIT, EXACT_LIMIT) as i64;
        let half = MAX_INDICES / 2;
        mid - half..=mid + half - 1
    })
}

/// Dash indices `j` whose span `[j * period, j * period + dash)` may be
/// visible on a line with the given frame.
///
/// The visible part of any line lies within `reach` of its foot along the
/// tangent, so anchored positions run over `[-phase, 2 * reach - phase]`.
/// Working from that window keeps the drawn dashes on screen however far the
/// phase has drifted.
///
/// Returns `None` when the window holds more than [`MAX_INDICES`] dashes or
/// its indices are too large to be exact; such a line reads as solid.
pub fn dash_range(pattern: &DashPattern, frame: &DashFrame) -> Option<RangeInclusive<i64>> {
    let period = pattern.period();
    let first = -frame.phase;
    let last = 2.0 * frame.reach - frame.phase;
    let lo = (first / period).floor() - 1.0;
    let hi = (last / period).ceil();
    index_range(lo, hi)
}

/// `lo..=hi` as integers, if both bounds are exact and the range is small
/// enough to walk.
fn index_range(lo: f64, hi: f64) -> Option<RangeInclusive<i64>> {
    let exact = lo.abs() <= EXACT_LIMIT && hi.abs() <= EXACT_LIMIT;
    if !exact || hi - lo + 1.0 > MAX_INDICES as f64 {
        return None;
    }
    Some(lo as i64..=hi as i64)
}

/// Clip segment `a`-`b` to the viewport rectangle (Liang–Barsky).
///
/// Returns `None` when nothing of the segment is inside.
pub fn clip_segment(a: DVec2, b: DVec2, viewport: &Viewport) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    // (p, q) pairs for the left, right, top and bottom edges
    let edges = [
        (-d.x, a.x),
        (d.x, viewport.width() - a.x),
        (-d.y, a.y),
        (d.y, viewport.height() - a.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge: either fully outside or irrelevant
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    if t0 >= t1 {
        return None;
    }
    Some((a + d * t0, a + d * t1))
}
