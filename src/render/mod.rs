//! Frame rendering.
//!
//! - `geometry`: visible line and dash ranges, viewport clipping
//! - `svg`: SVG text output
//!
//! A frame is first lowered to a flat list of [`Mark`]s, which the SVG
//! backend then serializes. Dashes are placed through the same
//! [`DashFrame`](crate::dash::DashFrame) the touch detector uses, so what is
//! drawn is exactly what triggers.

pub mod geometry;
pub mod svg;

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};

use crate::grid::GridFamily;
use crate::scene::Frame;
use crate::types::{Color, Viewport};
use geometry::{clip_segment, dash_range, line_range};

pub use svg::render_svg;

/// Stroke width of grid lines and markers
pub const STROKE_WIDTH: f64 = 1.5;
/// Half-length of a marker's arms
pub const CROSS_SIZE: f64 = 6.0;
pub const HOVERED_CROSS_SIZE: f64 = 8.0;
pub const BACKGROUND: Color = Color::rgb(0x0d, 0x0d, 0x10);
pub const MARKER_COLOR: Color = Color::rgb(0xff, 0xee, 0xaa);
pub const HOVERED_COLOR: Color = Color::rgb(0xff, 0xff, 0x66);

/// Something that can append itself to an SVG document body.
#[enum_dispatch]
pub trait RenderSvg {
    fn render_svg(&self, out: &mut String);
}

/// A primitive drawn in a frame.
#[enum_dispatch(RenderSvg)]
#[derive(Clone, Debug, PartialEq)]
pub enum Mark {
    Background(Background),
    Segment(Segment),
    Cross(Cross),
}

/// Full-viewport fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Background {
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

/// A straight stroke, either a whole solid line or one dash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: DVec2,
    pub to: DVec2,
    pub color: Color,
    pub width: f64,
}

/// A point marker: two strokes crossing at `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cross {
    pub center: DVec2,
    pub size: f64,
    pub color: Color,
    pub hovered: bool,
}

impl Cross {
    pub fn arms(&self) -> [(DVec2, DVec2); 2] {
        let c = self.center;
        let s = self.size;
        [
            (c - dvec2(s, 0.0), c + dvec2(s, 0.0)),
            (c - dvec2(0.0, s), c + dvec2(0.0, s)),
        ]
    }
}

/// Lower a frame to marks in paint order: background, families, markers.
pub fn frame_marks(frame: &Frame<'_>) -> Vec<Mark> {
    let viewport = &frame.viewport;
    let mut marks = vec![Mark::Background(Background {
        width: viewport.width(),
        height: viewport.height(),
        color: BACKGROUND,
    })];

    for family in frame.families {
        marks.extend(family_segments(family, viewport).into_iter().map(Mark::Segment));
    }

    for (point, hovered) in frame.markers() {
        let (size, color) = if hovered {
            (HOVERED_CROSS_SIZE, HOVERED_COLOR)
        } else {
            (CROSS_SIZE, MARKER_COLOR)
        };
        marks.push(Mark::Cross(Cross {
            center: point.position(),
            size,
            color,
            hovered,
        }));
    }
    marks
}

/// Visible strokes of one family, clipped to the viewport.
pub fn family_segments(family: &GridFamily, viewport: &Viewport) -> Vec<Segment> {
    let reach = viewport.reach();
    let pattern = family.dash();
    let mut segments = Vec::new();

    for k in line_range(family, reach) {
        let line = family.dash_frame(family.line_position(k as f64), viewport);

        let mut push = |from: DVec2, to: DVec2| {
            if let Some((from, to)) = clip_segment(from, to, viewport) {
                segments.push(Segment {
                    from,
                    to,
                    color: family.color(),
                    width: STROKE_WIDTH,
                });
            }
        };

        let dashes = if pattern.is_solid() {
            None
        } else {
            dash_range(&pattern, &line)
        };
        let Some(dashes) = dashes else {
            let half = line.tangent * reach;
            push(line.foot + half, line.foot - half);
            continue;
        };

        let period = pattern.period();
        for j in dashes {
            let start = j as f64 * period;
            push(line.point_at(start), line.point_at(start + pattern.dash));
        }
    }
    segments
}
