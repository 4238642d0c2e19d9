//! Scene configuration and its defaults.

use glam::{DVec2, dvec2};

use crate::grid::{GridFamily, GridFamilyBuilder};
use crate::motion::{Heading, Rates};
use crate::types::{Color, Viewport};

/// Pointer radius for hover selection
pub const HOVER_RADIUS: f64 = 10.0;
/// Nominal simulation rate
pub const TICK_RATE: f64 = 60.0;

/// Everything needed to start a scene.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub viewport: Viewport,
    pub families: Vec<GridFamily>,
    pub points: Vec<DVec2>,
    pub heading: Heading,
    pub rates: Rates,
    pub hover_radius: f64,
    /// Ticks per second; `1 / tick_rate` is the fixed dt used by scripts
    pub tick_rate: f64,
}

impl SceneConfig {
    /// A configuration with no families and no points.
    pub fn empty(viewport: Viewport) -> Self {
        SceneConfig {
            viewport,
            families: Vec::new(),
            points: Vec::new(),
            heading: Heading::default(),
            rates: Rates::default(),
            hover_radius: HOVER_RADIUS,
            tick_rate: TICK_RATE,
        }
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate
    }
}

/// The startup scene: a dashed vertical family, a solid horizontal one and
/// five points in a plus shape around the center.
impl Default for SceneConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        let (w, h) = (viewport.width(), viewport.height());
        let families = default_families().into_iter().filter_map(|b| b.build().ok()).collect();
        SceneConfig {
            families,
            points: vec![
                dvec2(w * 0.25, h * 0.5),
                dvec2(w * 0.5, h * 0.5),
                dvec2(w * 0.75, h * 0.5),
                dvec2(w * 0.5, h * 0.25),
                dvec2(w * 0.5, h * 0.75),
            ],
            ..SceneConfig::empty(viewport)
        }
    }
}

fn default_families() -> [GridFamilyBuilder; 2] {
    [
        GridFamily::builder(dvec2(1.0, 0.0), 60.0)
            .thickness(2.0)
            .dashed(60.0, 60.0)
            .color(Color::rgb(0x66, 0x66, 0xff)),
        GridFamily::builder(dvec2(0.0, 1.0), 60.0)
            .thickness(2.0)
            .color(Color::rgb(0x66, 0xff, 0x66)),
    ]
}
