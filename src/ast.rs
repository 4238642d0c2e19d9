//! Abstract Syntax Tree types for scene scripts
//!
//! A script is a flat list of statements. Setup statements describe the
//! scene before it starts; everything else drives or inspects it.

use glam::DVec2;
use miette::SourceSpan;

/// A complete scene script
#[derive(Debug, Clone)]
pub struct Script {
    pub statements: Vec<Spanned<Statement>>,
}

/// A node with the byte range it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: SourceSpan,
}

/// A scene script statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Scene description, only valid before the scene starts
    Setup(Setup),
    /// Drives the scene forward
    Action(Action),
    /// Checks scene state: assert points == 5
    Assert(Check),
    /// Capture the current frame as SVG
    Frame,
}

impl Statement {
    pub fn is_setup(&self) -> bool {
        matches!(self, Statement::Setup(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Setup {
    /// Replace everything declared so far with the startup scene
    Defaults,
    Viewport { width: f64, height: f64 },
    Family(FamilyDecl),
    Point(DVec2),
    /// Direction of motion; need not be normalized
    Heading(DVec2),
    Speed(f64),
    /// Turn rate in degrees per second
    Turn(f64),
    Accel(f64),
    Hover(f64),
    Rate(f64),
}

/// family normal (1, 0) spacing 60 dash 60 gap 60
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyDecl {
    pub normal: DVec2,
    pub spacing: f64,
    pub options: Vec<FamilyOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FamilyOption {
    Offset(f64),
    Phase(f64),
    Thickness(f64),
    Dash { dash: f64, gap: f64 },
    Solid,
    Color(Spanned<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Idle ticks
    Run(u64),
    /// Ticks with controls held
    Hold { controls: Vec<Control>, ticks: u64 },
    /// One tick that inserts a point
    Add(DVec2),
    /// One tick that removes the point at an index
    Remove(usize),
    /// One tick with a pointer click
    Click(DVec2),
    /// Move the pointer, or take it off the field with `none`
    Cursor(Option<DVec2>),
}

/// Held controls: left/right rotate, up/down change speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Total triggers so far, or for one (family, point) pair
    Triggers {
        pair: Option<(usize, usize)>,
        expected: u64,
    },
    Points(usize),
    Hovered(Option<usize>),
    /// Stored touch state of (family, point)
    Inside { family: usize, point: usize },
    Outside { family: usize, point: usize },
}
