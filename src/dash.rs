//! Dash anchoring shared by touch detection and rendering.
//!
//! Every line of a dashed family is drawn from an anchor `reach` units out
//! along its tangent, walking back toward the opposite end, with the whole
//! pattern shifted by the family's dash phase. [`DashFrame::position_of`]
//! maps a world point to its distance along that walk;
//! [`DashFrame::point_at`] is the exact inverse. The detector asks
//! "is this position on a dash", the renderer asks "where do dash `j`'s ends
//! land". Neither computes the anchor on its own.

use glam::DVec2;

use crate::types::UnitVec;

/// Dash and gap lengths of a family. Non-positive lengths mean "solid".
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DashPattern {
    pub dash: f64,
    pub gap: f64,
}

impl DashPattern {
    pub const SOLID: DashPattern = DashPattern { dash: 0.0, gap: 0.0 };

    pub fn new(dash: f64, gap: f64) -> Self {
        DashPattern { dash, gap }
    }

    /// A family is solid when either length is non-positive.
    pub fn is_solid(&self) -> bool {
        self.dash <= 0.0 || self.gap <= 0.0
    }

    /// Length of one dash plus one gap. Only meaningful when not solid.
    pub fn period(&self) -> f64 {
        self.dash + self.gap
    }

    /// Position within the current period, always in `[0, period)`.
    ///
    /// Callers must not pass a solid pattern.
    pub fn phase_of(&self, pos: f64) -> f64 {
        let period = self.period();
        let m = pos.rem_euclid(period);
        // rem_euclid can round up to exactly `period` for tiny negative input
        if m >= period { 0.0 } else { m }
    }

    /// Whether `pos` falls on a drawn dash. Half-open: `[0, dash)`.
    pub fn covers(&self, pos: f64) -> bool {
        self.is_solid() || self.phase_of(pos) < self.dash
    }
}

/// The tangential coordinate frame of one line of a family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashFrame {
    /// Foot of the line on the family's normal through the reference center
    pub foot: DVec2,
    /// Tangent of the family, `normal.perp()`
    pub tangent: UnitVec,
    /// Accumulated tangential scroll of the pattern
    pub phase: f64,
    /// Anchor distance, larger than anything visible
    pub reach: f64,
}

impl DashFrame {
    /// Distance of `p` along the drawn line, measured from the anchor.
    ///
    /// `pos = reach - t·(p - foot) - phase`
    #[inline]
    pub fn position_of(&self, p: DVec2) -> f64 {
        self.reach - self.tangent.dot(p - self.foot) - self.phase
    }

    /// The point on the line at distance `pos` from the anchor.
    #[inline]
    pub fn point_at(&self, pos: f64) -> DVec2 {
        self.foot + self.tangent * (self.reach - self.phase - pos)
    }
}
