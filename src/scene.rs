//! The tick loop tying points, motion and touch detection together.
//!
//! One call to [`Scene::tick`] is one logical frame:
//! input commands → point set → motion → touch detection. All point
//! mutation is applied before the evaluation pass starts.

use glam::DVec2;

use crate::config::SceneConfig;
use crate::events::TriggerSink;
use crate::grid::{FamilyId, GridFamily};
use crate::log::debug;
use crate::motion::{self, Heading, Rates, Throttle, Turn};
use crate::points::{PointId, PointSet, TrackedPoint};
use crate::touch;
use crate::types::Viewport;

/// A discrete input for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Rotate control held during this tick
    RotateLeft,
    RotateRight,
    /// Speed control held during this tick
    SpeedUp,
    SpeedDown,
    AddPoint(DVec2),
    /// Remove by insertion index. The index must be in range.
    RemovePoint(usize),
    /// Pointer click: removes the hovered point, or adds one at the position
    Click(DVec2),
}

/// Everything the outside world supplies for one tick.
#[derive(Clone, Debug, Default)]
pub struct TickInput {
    /// Elapsed time in seconds
    pub dt: f64,
    /// Pointer position, if the pointer is over the field
    pub cursor: Option<DVec2>,
    pub commands: Vec<Command>,
}

impl TickInput {
    pub fn idle(dt: f64) -> Self {
        TickInput {
            dt,
            ..Default::default()
        }
    }

    pub fn with_cursor(mut self, cursor: DVec2) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub triggers: usize,
    pub step: DVec2,
}

/// A running scene.
#[derive(Clone, Debug)]
pub struct Scene {
    viewport: Viewport,
    families: Vec<GridFamily>,
    points: PointSet,
    heading: Heading,
    rates: Rates,
    hover_radius: f64,
    hovered: Option<PointId>,
    tick: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let mut points = PointSet::new(config.families.len());
        for p in config.points {
            points.insert(p);
        }
        Scene {
            viewport: config.viewport,
            families: config.families,
            points,
            heading: config.heading,
            rates: config.rates,
            hover_radius: config.hover_radius,
            hovered: None,
            tick: 0,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn families(&self) -> &[GridFamily] {
        &self.families
    }

    pub fn family(&self, id: FamilyId) -> Option<&GridFamily> {
        self.families.get(id.0)
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    pub fn hovered(&self) -> Option<PointId> {
        self.hovered
    }

    /// Number of ticks evaluated so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advance one logical frame, sending triggers to `sink`.
    pub fn tick<S: TriggerSink + ?Sized>(
        &mut self,
        input: &TickInput,
        sink: &mut S,
    ) -> TickReport {
        self.update_hover(input.cursor);

        for command in &input.commands {
            self.apply(*command, input.dt);
        }

        let step = self.heading.step(input.dt);
        motion::advance(&mut self.families, step);

        self.tick += 1;
        let triggers = touch::evaluate(
            &self.families,
            &mut self.points,
            &self.viewport,
            self.tick,
            sink,
        );

        TickReport {
            tick: self.tick,
            triggers,
            step,
        }
    }

    fn update_hover(&mut self, cursor: Option<DVec2>) {
        self.hovered = cursor.and_then(|c| self.points.nearest_within(c, self.hover_radius));
    }

    fn apply(&mut self, command: Command, dt: f64) {
        match command {
            Command::RotateLeft => self.heading.rotate(Turn::Left, &self.rates, dt),
            Command::RotateRight => self.heading.rotate(Turn::Right, &self.rates, dt),
            Command::SpeedUp => self.heading.accelerate(Throttle::Up, &self.rates, dt),
            Command::SpeedDown => self.heading.accelerate(Throttle::Down, &self.rates, dt),
            Command::AddPoint(at) => {
                self.points.insert(at);
            }
            Command::RemovePoint(index) => {
                let removed = self.points.remove_at(index);
                if self.hovered == Some(removed.id()) {
                    self.hovered = None;
                }
            }
            Command::Click(at) => {
                // A click acts on whatever is under the pointer at `at`
                match self.points.nearest_within(at, self.hover_radius) {
                    Some(id) => {
                        debug!(id = id.0, "click removes point");
                        self.points.remove(id);
                        if self.hovered == Some(id) {
                            self.hovered = None;
                        }
                    }
                    None => {
                        self.points.insert(at);
                    }
                }
            }
        }
    }

    /// Read-only view for renderers.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            viewport: self.viewport,
            families: &self.families,
            points: &self.points,
            hovered: self.hovered,
            tick: self.tick,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub viewport: Viewport,
    pub families: &'a [GridFamily],
    pub points: &'a PointSet,
    pub hovered: Option<PointId>,
    pub tick: u64,
}

impl<'a> Frame<'a> {
    /// Points with their hovered flag.
    pub fn markers(&self) -> impl Iterator<Item = (&'a TrackedPoint, bool)> + 'a {
        let points: &'a PointSet = self.points;
        let hovered = self.hovered;
        points.iter().map(move |p| (p, Some(p.id()) == hovered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TriggerLog;
    use crate::types::{Color, UnitVec};
    use glam::dvec2;

    const DT: f64 = 1.0 / 60.0;

    fn still_scene() -> Scene {
        let mut config = SceneConfig::default();
        config.heading = Heading::new(UnitVec::EAST, 0.0);
        Scene::new(config)
    }

    #[test]
    fn default_scene_fires_on_first_tick_for_points_on_lines() {
        // Center (480, 320) lies on line 0 of both families. The dashed
        // family has a gap there (pos = reach, m ≈ 73.8), the solid one fires.
        let mut scene = still_scene();
        let mut log = TriggerLog::new();
        scene.tick(&TickInput::idle(DT), &mut log);
        let center = scene.points().iter().nth(1).unwrap().id();
        assert_eq!(log.for_pair(FamilyId(0), center).count(), 0);
        assert_eq!(log.for_pair(FamilyId(1), center).count(), 1);
        // A still scene never fires again
        let report = scene.tick(&TickInput::idle(DT), &mut log);
        assert_eq!(report.triggers, 0);
        assert_eq!(report.tick, 2);
    }

    #[test]
    fn commands_apply_before_evaluation() {
        let mut scene = still_scene();
        let mut log = TriggerLog::new();
        scene.tick(&TickInput::idle(DT), &mut log);
        let before = log.len();

        // A new point right on the horizontal line y = 320 + 60
        let input = TickInput::idle(DT).with_command(Command::AddPoint(dvec2(500.0, 380.0)));
        let report = scene.tick(&input, &mut log);
        assert_eq!(report.triggers, 1);
        assert_eq!(log.len(), before + 1);
        assert_eq!(scene.points().touch_shape(), (2, 6));
    }

    #[test]
    fn click_toggles_points() {
        let mut scene = still_scene();
        let mut log = TriggerLog::new();
        let at = dvec2(100.0, 100.0);
        scene.tick(&TickInput::idle(DT).with_command(Command::Click(at)), &mut log);
        assert_eq!(scene.points().len(), 6);
        // Clicking within the hover radius removes it again
        scene.tick(
            &TickInput::idle(DT).with_command(Command::Click(at + dvec2(3.0, 4.0))),
            &mut log,
        );
        assert_eq!(scene.points().len(), 5);
        assert!(scene.points().rows_consistent());
    }

    #[test]
    fn hover_tracks_cursor() {
        let mut scene = still_scene();
        let mut log = TriggerLog::new();
        let target = scene.points().iter().next().unwrap().id();
        scene.tick(&TickInput::idle(DT).with_cursor(dvec2(245.0, 322.0)), &mut log);
        assert_eq!(scene.hovered(), Some(target));
        let hovered: Vec<bool> = scene.frame().markers().map(|(_, h)| h).collect();
        assert_eq!(hovered, vec![true, false, false, false, false]);

        scene.tick(&TickInput::idle(DT), &mut log);
        assert_eq!(scene.hovered(), None);
    }

    #[test]
    fn removing_hovered_point_clears_hover() {
        let mut scene = still_scene();
        let mut log = TriggerLog::new();
        scene.tick(&TickInput::idle(DT).with_cursor(dvec2(240.0, 320.0)), &mut log);
        assert!(scene.hovered().is_some());
        scene.tick(
            &TickInput::idle(DT)
                .with_cursor(dvec2(240.0, 320.0))
                .with_command(Command::RemovePoint(0)),
            &mut log,
        );
        assert_eq!(scene.hovered(), None);
        assert_eq!(scene.points().len(), 4);
    }

    #[test]
    fn speed_commands_change_step() {
        let mut scene = still_scene();
        let mut log = TriggerLog::new();
        let mut input = TickInput::idle(0.5);
        input.commands.push(Command::SpeedUp);
        let report = scene.tick(&input, &mut log);
        // 120 px/s² for half a second, then half a second at that speed
        assert_eq!(scene.heading().speed(), 60.0);
        assert_eq!(report.step, dvec2(30.0, 0.0));
        assert_eq!(scene.families()[0].offset(), 30.0);
    }

    #[test]
    fn frame_exposes_family_state() {
        let scene = Scene::new(SceneConfig::default());
        let frame = scene.frame();
        assert_eq!(frame.families.len(), 2);
        assert_eq!(frame.families[0].dash().dash, 60.0);
        assert_eq!(frame.families[0].dash().gap, 60.0);
        assert_eq!(frame.families[1].normal().as_dvec2(), dvec2(0.0, 1.0));
        assert_eq!(frame.families[1].color(), Color::rgb(0x66, 0xff, 0x66));
        assert_eq!(frame.tick, 0);
    }
}
