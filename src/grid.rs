//! Grid families: infinite sets of evenly spaced parallel lines.
//!
//! Line `k` of a family is the set of points `x` with
//! `normal · (x - center) = k * spacing + offset`. Lines are never
//! materialized; the nearest one to any point is found by rounding.

use glam::DVec2;

use crate::dash::{DashFrame, DashPattern};
use crate::errors::GridError;
use crate::types::{Color, NumericError, UnitVec, Viewport};

/// Index of a family within a scene. Families live for the whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId(pub usize);

/// Default stroke color for families that don't pick one
pub const DEFAULT_COLOR: Color = Color::rgb(0x66, 0x66, 0xff);

/// One infinite family of parallel periodic lines.
#[derive(Clone, Debug, PartialEq)]
pub struct GridFamily {
    normal: UnitVec,
    spacing: f64,
    offset: f64,
    thickness: f64,
    dash: DashPattern,
    dash_phase: f64,
    color: Color,
}

/// The nearest line of a family to some point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineHit {
    /// Index of the line
    pub k: f64,
    /// Signed distance of the line from the reference center along the normal
    pub closest: f64,
    /// Perpendicular distance from the point to the line
    pub distance: f64,
}

/// Where a point sits relative to a family's touch band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandState {
    /// Farther than `thickness` from every line
    Outside,
    /// Within `thickness`, but over a gap in the dash pattern
    Gap,
    /// Within `thickness` and over a drawn part of the line
    Inside,
}

impl BandState {
    pub fn is_inside(self) -> bool {
        self == BandState::Inside
    }
}

impl GridFamily {
    /// Validating constructor for a solid family at offset 0.
    pub fn new(normal: DVec2, spacing: f64, thickness: f64) -> Result<Self, GridError> {
        GridFamilyBuilder::new(normal, spacing)
            .thickness(thickness)
            .build()
    }

    pub fn builder(normal: DVec2, spacing: f64) -> GridFamilyBuilder {
        GridFamilyBuilder::new(normal, spacing)
    }

    pub fn normal(&self) -> UnitVec {
        self.normal
    }

    /// Direction along the lines, `normal.perp()`.
    pub fn tangent(&self) -> UnitVec {
        self.normal.perp()
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn dash(&self) -> DashPattern {
        self.dash
    }

    pub fn dash_phase(&self) -> f64 {
        self.dash_phase
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_solid(&self) -> bool {
        self.dash.is_solid()
    }

    /// Scroll the family by `along_normal` and the dash pattern by
    /// `along_tangent`. The only mutation a family ever sees.
    pub(crate) fn advance(&mut self, along_normal: f64, along_tangent: f64) {
        self.offset += along_normal;
        self.dash_phase -= along_tangent;
    }

    /// Line `k`'s signed distance from the reference center.
    #[inline]
    pub fn line_position(&self, k: f64) -> f64 {
        k * self.spacing + self.offset
    }

    /// Nearest line to `p`, with `center` as the reference origin.
    ///
    /// Half-way cases round away from zero (`f64::round`). Both candidates
    /// are equally distant there, so only `k` depends on the choice.
    pub fn nearest_line(&self, p: DVec2, center: DVec2) -> LineHit {
        let d_along = self.normal.dot(p - center);
        let k = ((d_along - self.offset) / self.spacing).round();
        let closest = self.line_position(k);
        LineHit {
            k,
            closest,
            distance: (d_along - closest).abs(),
        }
    }

    /// Tangential frame of the line at signed distance `closest`.
    pub fn dash_frame(&self, closest: f64, viewport: &Viewport) -> DashFrame {
        DashFrame {
            foot: viewport.center() + self.normal * closest,
            tangent: self.tangent(),
            phase: self.dash_phase,
            reach: viewport.reach(),
        }
    }

    /// Band membership of `p`, respecting the dash pattern.
    pub fn probe(&self, p: DVec2, viewport: &Viewport) -> BandState {
        let hit = self.nearest_line(p, viewport.center());
        if hit.distance > self.thickness {
            return BandState::Outside;
        }
        if self.dash.is_solid() {
            return BandState::Inside;
        }
        let pos = self.dash_frame(hit.closest, viewport).position_of(p);
        if self.dash.covers(pos) {
            BandState::Inside
        } else {
            BandState::Gap
        }
    }
}

/// Builder for [`GridFamily`]; validation happens in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct GridFamilyBuilder {
    normal: DVec2,
    spacing: f64,
    offset: f64,
    thickness: f64,
    dash: DashPattern,
    dash_phase: f64,
    color: Color,
}

impl GridFamilyBuilder {
    pub fn new(normal: DVec2, spacing: f64) -> Self {
        GridFamilyBuilder {
            normal,
            spacing,
            offset: 0.0,
            thickness: 2.0,
            dash: DashPattern::SOLID,
            dash_phase: 0.0,
            color: DEFAULT_COLOR,
        }
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn dashed(mut self, dash: f64, gap: f64) -> Self {
        self.dash = DashPattern::new(dash, gap);
        self
    }

    pub fn solid(mut self) -> Self {
        self.dash = DashPattern::SOLID;
        self
    }

    pub fn dash_phase(mut self, phase: f64) -> Self {
        self.dash_phase = phase;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn build(self) -> Result<GridFamily, GridError> {
        let normal = UnitVec::normalized(self.normal).map_err(|e| match e {
            NumericError::Zero => GridError::ZeroNormal,
            other => GridError::NonFiniteNormal(other),
        })?;
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(GridError::InvalidSpacing {
                value: self.spacing,
            });
        }
        if self.thickness.is_nan() || self.thickness < 0.0 {
            return Err(GridError::NegativeThickness {
                value: self.thickness,
            });
        }
        for (field, value) in [
            ("thickness", self.thickness),
            ("offset", self.offset),
            ("dash length", self.dash.dash),
            ("gap length", self.dash.gap),
            ("dash phase", self.dash_phase),
        ] {
            if !value.is_finite() {
                return Err(GridError::NonFinite { field, value });
            }
        }
        Ok(GridFamily {
            normal,
            spacing: self.spacing,
            offset: self.offset,
            thickness: self.thickness,
            dash: self.dash,
            dash_phase: self.dash_phase,
            color: self.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn vertical_lines() -> GridFamily {
        GridFamily::new(dvec2(1.0, 0.0), 60.0, 2.0).unwrap()
    }

    // ==================== construction ====================

    #[test]
    fn normal_is_normalized_at_construction() {
        let fam = GridFamily::new(dvec2(3.0, 4.0), 10.0, 1.0).unwrap();
        assert!((fam.normal().as_dvec2().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_normal() {
        assert_eq!(
            GridFamily::new(DVec2::ZERO, 10.0, 1.0),
            Err(GridError::ZeroNormal)
        );
    }

    #[test]
    fn rejects_non_finite_normal() {
        assert_eq!(
            GridFamily::new(dvec2(f64::NAN, 1.0), 10.0, 1.0),
            Err(GridError::NonFiniteNormal(NumericError::NaN))
        );
    }

    #[test]
    fn rejects_non_positive_spacing() {
        for spacing in [0.0, -5.0, f64::INFINITY] {
            assert!(matches!(
                GridFamily::new(dvec2(1.0, 0.0), spacing, 1.0),
                Err(GridError::InvalidSpacing { .. })
            ));
        }
        assert!(GridFamily::new(dvec2(1.0, 0.0), f64::NAN, 1.0).is_err());
    }

    #[test]
    fn rejects_negative_thickness() {
        assert_eq!(
            GridFamily::new(dvec2(1.0, 0.0), 10.0, -0.5),
            Err(GridError::NegativeThickness { value: -0.5 })
        );
    }

    #[test]
    fn zero_dash_or_gap_is_solid_not_an_error() {
        let fam = GridFamily::builder(dvec2(1.0, 0.0), 10.0)
            .dashed(0.0, 5.0)
            .build()
            .unwrap();
        assert!(fam.is_solid());
    }

    #[test]
    fn rejects_non_finite_dash() {
        let err = GridFamily::builder(dvec2(1.0, 0.0), 10.0)
            .dashed(f64::INFINITY, 5.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, GridError::NonFinite { field: "dash length", .. }));
    }

    // ==================== nearest line ====================

    #[test]
    fn nearest_line_is_minimal_over_neighbours() {
        let mut fam = vertical_lines();
        fam.advance(17.3, 0.0);
        let center = DVec2::ZERO;
        let mut x = -400.0;
        while x < 400.0 {
            let hit = fam.nearest_line(dvec2(x, 5.0), center);
            assert_eq!(hit.closest, hit.k * fam.spacing() + fam.offset());
            for dk in [-2.0, -1.0, 1.0, 2.0] {
                let other = (x - fam.line_position(hit.k + dk)).abs();
                assert!(hit.distance <= other + 1e-9, "x={x} k={} dk={dk}", hit.k);
            }
            x += 3.7;
        }
    }

    #[test]
    fn half_way_rounds_away_from_zero() {
        // normal (1,0), spacing 60, offset 0, point (30, 100), center origin
        let fam = vertical_lines();
        let hit = fam.nearest_line(dvec2(30.0, 100.0), DVec2::ZERO);
        assert_eq!(hit.k, 1.0);
        assert_eq!(hit.closest, 60.0);
        assert_eq!(hit.distance, 30.0);

        let hit = fam.nearest_line(dvec2(-30.0, 0.0), DVec2::ZERO);
        assert_eq!(hit.k, -1.0);
        assert_eq!(hit.distance, 30.0);
    }

    #[test]
    fn nearest_line_uses_only_the_normal_component() {
        let fam = GridFamily::new(dvec2(1.0, 1.0), 10.0, 1.0).unwrap();
        let center = dvec2(5.0, 5.0);
        // Moving along the tangent leaves the distance unchanged
        let p = dvec2(9.0, 7.0);
        let moved = p + fam.tangent() * 123.0;
        let a = fam.nearest_line(p, center);
        let b = fam.nearest_line(moved, center);
        assert_eq!(a.k, b.k);
        assert!((a.distance - b.distance).abs() < 1e-9);
    }

    // ==================== band membership ====================

    #[test]
    fn solid_band_membership() {
        let vp = Viewport::try_new(600.0, 400.0).unwrap();
        let fam = vertical_lines();
        // center x = 300; lines at x = 300 + 60k
        assert_eq!(fam.probe(dvec2(361.5, 10.0), &vp), BandState::Inside);
        assert_eq!(fam.probe(dvec2(362.0, 10.0), &vp), BandState::Inside);
        assert_eq!(fam.probe(dvec2(362.5, 10.0), &vp), BandState::Outside);
        assert_eq!(fam.probe(dvec2(330.0, 10.0), &vp), BandState::Outside);
    }

    #[test]
    fn zero_thickness_touches_only_on_exact_coincidence() {
        let vp = Viewport::try_new(600.0, 400.0).unwrap();
        let fam = GridFamily::new(dvec2(1.0, 0.0), 60.0, 0.0).unwrap();
        assert_eq!(fam.probe(dvec2(360.0, 0.0), &vp), BandState::Inside);
        assert_eq!(fam.probe(dvec2(360.001, 0.0), &vp), BandState::Outside);
    }

    #[test]
    fn dashed_band_distinguishes_gaps() {
        // 300x400 viewport: center (150, 200), reach 500.
        let vp = Viewport::try_new(300.0, 400.0).unwrap();
        let fam = GridFamily::builder(dvec2(1.0, 0.0), 60.0)
            .thickness(2.0)
            .dashed(60.0, 60.0)
            .build()
            .unwrap();
        // Line k=0 is x=150, tangent (0,1). pos = 500 - (y - 200).
        // y=200 → pos 500 → m = 20 → dash.
        assert_eq!(fam.probe(dvec2(150.0, 200.0), &vp), BandState::Inside);
        // y=160 → pos 540 → m = 60 → gap (half-open boundary).
        assert_eq!(fam.probe(dvec2(150.0, 160.0), &vp), BandState::Gap);
        // y=161 → pos 539 → m = 59 → dash.
        assert_eq!(fam.probe(dvec2(150.0, 161.0), &vp), BandState::Inside);
        // Off the line entirely
        assert_eq!(fam.probe(dvec2(180.0, 200.0), &vp), BandState::Outside);
    }

    #[test]
    fn dash_phase_moves_gaps() {
        let vp = Viewport::try_new(300.0, 400.0).unwrap();
        let mut fam = GridFamily::builder(dvec2(1.0, 0.0), 60.0)
            .dashed(60.0, 60.0)
            .build()
            .unwrap();
        let p = dvec2(150.0, 200.0);
        assert_eq!(fam.probe(p, &vp), BandState::Inside);
        // Tangential step of -50 adds 50 to the phase: pos 450 → m 90 → gap
        fam.advance(0.0, -50.0);
        assert_eq!(fam.dash_phase(), 50.0);
        assert_eq!(fam.probe(p, &vp), BandState::Gap);
    }
}
