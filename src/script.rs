//! Running scene scripts.
//!
//! Setup statements build a [`SceneConfig`]; the scene itself is created the
//! first time any other statement runs. From then on each `run`/`hold` is a
//! number of fixed-dt ticks, and `add`/`remove`/`click` are one tick each
//! carrying the command.

use glam::DVec2;
use miette::SourceSpan;

use crate::ast::*;
use crate::config::SceneConfig;
use crate::errors::{ScriptError, SourceContext};
use crate::events::TriggerLog;
use crate::grid::{FamilyId, GridFamily};
use crate::log::debug;
use crate::motion::Heading;
use crate::points::PointId;
use crate::render::render_svg;
use crate::scene::{Command, Scene, TickInput};
use crate::types::{Color, ColorParseError, UnitVec, Viewport};

/// An SVG snapshot taken by a `frame` statement.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub tick: u64,
    pub svg: String,
}

/// Final state of a script that ran to completion.
#[derive(Debug)]
pub struct ScriptOutcome {
    pub scene: Scene,
    pub log: TriggerLog,
    pub frames: Vec<CapturedFrame>,
}

/// Run a parsed script. The first failing statement aborts the run.
pub fn run(ctx: &SourceContext, script: &Script) -> Result<ScriptOutcome, ScriptError> {
    let mut runner = Runner::new(ctx);
    for stmt in &script.statements {
        runner.exec(stmt)?;
    }
    let scene = runner.take_scene();
    Ok(ScriptOutcome {
        scene,
        log: runner.log,
        frames: runner.frames,
    })
}

struct Runner<'a> {
    ctx: &'a SourceContext,
    config: SceneConfig,
    scene: Option<Scene>,
    cursor: Option<DVec2>,
    log: TriggerLog,
    frames: Vec<CapturedFrame>,
}

impl<'a> Runner<'a> {
    fn new(ctx: &'a SourceContext) -> Self {
        Runner {
            ctx,
            config: SceneConfig::empty(Viewport::default()),
            scene: None,
            cursor: None,
            log: TriggerLog::new(),
            frames: Vec::new(),
        }
    }

    fn exec(&mut self, stmt: &Spanned<Statement>) -> Result<(), ScriptError> {
        debug!(statement = ?stmt.node, "exec");
        match &stmt.node {
            Statement::Setup(setup) => {
                if self.scene.is_some() {
                    return Err(ScriptError::LateSetup {
                        src: self.ctx.named_source(),
                        span: stmt.span,
                    });
                }
                self.setup(setup, stmt.span)
            }
            Statement::Action(action) => self.act(action, stmt.span),
            Statement::Assert(check) => self.check(check, stmt.span),
            Statement::Frame => {
                let scene = self.scene();
                let frame = CapturedFrame {
                    tick: scene.tick_count(),
                    svg: render_svg(&scene.frame()),
                };
                self.frames.push(frame);
                Ok(())
            }
        }
    }

    fn invalid(&self, span: SourceSpan, cause: impl Into<String>) -> ScriptError {
        ScriptError::InvalidValue {
            cause: cause.into(),
            src: self.ctx.named_source(),
            span,
        }
    }

    fn setup(&mut self, setup: &Setup, span: SourceSpan) -> Result<(), ScriptError> {
        match setup {
            Setup::Defaults => self.config = SceneConfig::default(),
            Setup::Viewport { width, height } => {
                self.config.viewport = Viewport::try_new(*width, *height)
                    .map_err(|e| self.invalid(span, format!("viewport size: {e}")))?;
            }
            Setup::Family(decl) => {
                let family = self.build_family(decl, span)?;
                self.config.families.push(family);
            }
            Setup::Point(p) => {
                if !p.is_finite() {
                    return Err(self.invalid(span, "point position must be finite"));
                }
                self.config.points.push(*p);
            }
            Setup::Heading(direction) => {
                let direction = UnitVec::normalized(*direction)
                    .map_err(|e| self.invalid(span, format!("heading: {e}")))?;
                self.config.heading = Heading::new(direction, self.config.heading.speed());
            }
            Setup::Speed(speed) => {
                let speed = self.non_negative(*speed, "speed", span)?;
                self.config.heading = Heading::new(self.config.heading.direction(), speed);
            }
            Setup::Turn(degrees) => {
                let degrees = self.non_negative(*degrees, "turn rate", span)?;
                self.config.rates.turn_rate = degrees.to_radians();
            }
            Setup::Accel(accel) => {
                self.config.rates.acceleration = self.non_negative(*accel, "acceleration", span)?;
            }
            Setup::Hover(radius) => {
                self.config.hover_radius = self.non_negative(*radius, "hover radius", span)?;
            }
            Setup::Rate(hz) => {
                if !hz.is_finite() || *hz <= 0.0 {
                    return Err(self.invalid(span, format!("tick rate must be positive, got {hz}")));
                }
                self.config.tick_rate = *hz;
            }
        }
        Ok(())
    }

    fn non_negative(&self, value: f64, what: &str, span: SourceSpan) -> Result<f64, ScriptError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(self.invalid(span, format!("{what} must be non-negative, got {value}")))
        }
    }

    fn build_family(&self, decl: &FamilyDecl, span: SourceSpan) -> Result<GridFamily, ScriptError> {
        let mut builder = GridFamily::builder(decl.normal, decl.spacing);
        for option in &decl.options {
            builder = match option {
                FamilyOption::Offset(v) => builder.offset(*v),
                FamilyOption::Phase(v) => builder.dash_phase(*v),
                FamilyOption::Thickness(v) => builder.thickness(*v),
                FamilyOption::Dash { dash, gap } => builder.dashed(*dash, *gap),
                FamilyOption::Solid => builder.solid(),
                FamilyOption::Color(name) => {
                    let color: Color = name
                        .node
                        .parse()
                        .map_err(|e: ColorParseError| self.invalid(name.span, e.to_string()))?;
                    builder.color(color)
                }
            };
        }
        builder.build().map_err(|cause| ScriptError::InvalidFamily {
            cause,
            src: self.ctx.named_source(),
            span,
        })
    }

    /// The running scene, started from the setup so far if needed.
    fn scene(&mut self) -> &mut Scene {
        let config = &self.config;
        self.scene.get_or_insert_with(|| {
            debug!(
                families = config.families.len(),
                points = config.points.len(),
                "scene starts"
            );
            Scene::new(config.clone())
        })
    }

    fn take_scene(&mut self) -> Scene {
        self.scene();
        self.scene
            .take()
            .unwrap_or_else(|| Scene::new(self.config.clone()))
    }

    fn tick(&mut self, commands: Vec<Command>) {
        let input = TickInput {
            dt: self.config.dt(),
            cursor: self.cursor,
            commands,
        };
        let log = &mut self.log;
        let scene = self.scene.get_or_insert_with(|| Scene::new(self.config.clone()));
        scene.tick(&input, log);
    }

    fn act(&mut self, action: &Action, span: SourceSpan) -> Result<(), ScriptError> {
        self.scene();
        match action {
            Action::Run(ticks) => {
                for _ in 0..*ticks {
                    self.tick(Vec::new());
                }
            }
            Action::Hold { controls, ticks } => {
                let commands: Vec<Command> = controls
                    .iter()
                    .map(|c| match c {
                        Control::Left => Command::RotateLeft,
                        Control::Right => Command::RotateRight,
                        Control::Up => Command::SpeedUp,
                        Control::Down => Command::SpeedDown,
                    })
                    .collect();
                for _ in 0..*ticks {
                    self.tick(commands.clone());
                }
            }
            Action::Add(at) => self.tick(vec![Command::AddPoint(*at)]),
            Action::Remove(index) => {
                self.point_id(*index, span)?;
                self.tick(vec![Command::RemovePoint(*index)]);
            }
            Action::Click(at) => self.tick(vec![Command::Click(*at)]),
            Action::Cursor(at) => self.cursor = *at,
        }
        Ok(())
    }

    fn point_id(&mut self, index: usize, span: SourceSpan) -> Result<PointId, ScriptError> {
        let ctx = self.ctx;
        let points = self.scene().points();
        let count = points.len();
        points
            .iter()
            .nth(index)
            .map(|p| p.id())
            .ok_or_else(|| ScriptError::NoSuchPoint {
                index,
                count,
                src: ctx.named_source(),
                span,
            })
    }

    fn family_id(&mut self, index: usize, span: SourceSpan) -> Result<FamilyId, ScriptError> {
        let count = self.scene().families().len();
        if index < count {
            Ok(FamilyId(index))
        } else {
            Err(ScriptError::NoSuchFamily {
                index,
                count,
                src: self.ctx.named_source(),
                span,
            })
        }
    }

    fn check(&mut self, check: &Check, span: SourceSpan) -> Result<(), ScriptError> {
        let failure = match check {
            Check::Triggers { pair, expected } => {
                let actual = match pair {
                    None => self.log.len() as u64,
                    Some((family, point)) => {
                        let family = self.family_id(*family, span)?;
                        let point = self.point_id(*point, span)?;
                        self.log.for_pair(family, point).count() as u64
                    }
                };
                (actual != *expected)
                    .then(|| format!("expected {expected} triggers, got {actual}"))
            }
            Check::Points(expected) => {
                let actual = self.scene().points().len();
                (actual != *expected).then(|| format!("expected {expected} points, got {actual}"))
            }
            Check::Hovered(expected) => {
                let wanted = match expected {
                    Some(index) => Some(self.point_id(*index, span)?),
                    None => None,
                };
                let scene = self.scene();
                let actual = scene.hovered();
                (actual != wanted).then(|| {
                    let index = actual
                        .and_then(|id| scene.points().index_of(id))
                        .map_or("none".to_string(), |i| i.to_string());
                    format!("hovered point is {index}")
                })
            }
            Check::Inside { family, point } | Check::Outside { family, point } => {
                let want_inside = matches!(check, Check::Inside { .. });
                let family = self.family_id(*family, span)?;
                let point = self.point_id(*point, span)?;
                let touching = self
                    .scene()
                    .points()
                    .get(point)
                    .is_some_and(|p| p.is_touching(family));
                (touching != want_inside).then(|| {
                    let state = if touching { "inside" } else { "outside" };
                    format!("point is {state} family {}", family.0)
                })
            }
        };
        match failure {
            Some(details) => Err(ScriptError::AssertionFailed {
                details,
                src: self.ctx.named_source(),
                span,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn run_str(source: &str) -> Result<ScriptOutcome, ScriptError> {
        let ctx = SourceContext::new("<test>", source);
        let script = parse(&ctx)?;
        run(&ctx, &script)
    }

    #[test]
    fn empty_script_yields_empty_scene() {
        let outcome = run_str("").unwrap();
        assert!(outcome.scene.families().is_empty());
        assert_eq!(outcome.scene.points().len(), 0);
        assert!(outcome.log.is_empty());
    }

    #[test]
    fn defaults_then_run() {
        let outcome = run_str(
            "defaults\n\
             speed 0\n\
             run 3\n\
             assert points == 5\n",
        )
        .unwrap();
        assert_eq!(outcome.scene.tick_count(), 3);
        assert_eq!(outcome.scene.heading().speed(), 0.0);
    }

    #[test]
    fn late_setup_is_rejected() {
        let err = run_str("run 1\npoint (1, 1)\n").unwrap_err();
        assert!(matches!(err, ScriptError::LateSetup { .. }), "{err:?}");
    }

    #[test]
    fn invalid_family_carries_grid_error() {
        let err = run_str("family normal (0, 0) spacing 10\n").unwrap_err();
        match err {
            ScriptError::InvalidFamily { cause, span, .. } => {
                assert_eq!(cause, crate::errors::GridError::ZeroNormal);
                assert_eq!(span.offset(), 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_color_is_an_invalid_value() {
        let err = run_str("family normal (1, 0) spacing 10 color \"nope\"\n").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidValue { .. }), "{err:?}");
    }

    #[test]
    fn remove_out_of_range_is_reported() {
        let err = run_str("point (1, 1)\nremove 1\n").unwrap_err();
        match err {
            ScriptError::NoSuchPoint { index, count, .. } => {
                assert_eq!((index, count), (1, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_assertion_reports_actual_value() {
        let err = run_str("point (1, 1)\nassert points == 2\n").unwrap_err();
        match err {
            ScriptError::AssertionFailed { details, span, .. } => {
                assert_eq!(details, "expected 2 points, got 1");
                assert_eq!(span.offset(), 13);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn frames_are_captured_with_their_tick() {
        let outcome = run_str("defaults\nframe\nrun 2\nframe\n").unwrap();
        let ticks: Vec<u64> = outcome.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 2]);
        assert!(outcome.frames[1].svg.starts_with("<svg"));
    }

    #[test]
    fn hold_steers_the_heading() {
        let outcome = run_str(
            "heading (1, 0)\n\
             speed 0\n\
             accel 60\n\
             rate 10\n\
             hold up 10\n",
        )
        .unwrap();
        // 10 ticks of 0.1 s at 60 px/s²
        assert!((outcome.scene.heading().speed() - 60.0).abs() < 1e-9);
    }
}
