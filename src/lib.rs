//! Touch detection for scrolling families of dashed grid lines.
//!
//! A [`Scene`] holds any number of [`GridFamily`]s (infinite sets of evenly
//! spaced parallel lines) and a set of tracked points. All families scroll
//! under one shared velocity; every tick, each (family, point) pair is
//! re-evaluated and a [`TriggerEvent`] fires whenever a point enters a
//! family's band over a drawn dash.
//!
//! Scenes can also be described and driven by a small script language, see
//! [`run_script`].

use pest_derive::Parser;

pub mod ast;
pub mod audio;
pub mod config;
pub mod dash;
pub mod errors;
pub mod events;
pub mod grid;
pub mod log;
pub mod motion;
pub mod parse;
pub mod points;
pub mod render;
pub mod scene;
pub mod script;
pub mod touch;
pub mod types;

pub use audio::{Blip, BlipSink};
pub use config::SceneConfig;
pub use errors::{GridError, ScriptError, SourceContext};
pub use events::{TriggerEvent, TriggerLog, TriggerSink};
pub use grid::{FamilyId, GridFamily};
pub use points::{PointId, PointSet};
pub use render::render_svg;
pub use scene::{Command, Frame, Scene, TickInput};
pub use script::{CapturedFrame, ScriptOutcome};
pub use types::{Color, UnitVec, Viewport};

#[derive(Parser)]
#[grammar = "grythm.pest"]
pub struct SceneParser;

/// Parse and run a scene script.
///
/// `name` is used in diagnostics. Returns the final scene, every trigger
/// that fired, and the frames captured by `frame` statements.
pub fn run_script(name: &str, source: &str) -> Result<ScriptOutcome, miette::Report> {
    let ctx = SourceContext::new(name, source);
    let script = parse::parse(&ctx)?;
    let outcome = script::run(&ctx, &script)?;
    Ok(outcome)
}
