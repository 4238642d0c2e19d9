//! Validated numeric primitives for grythm.
//!
//! Raw `DVec2` is used for positions and displacements. Anything with an
//! invariant (unit normals, viewport extents, colors) gets a newtype that can
//! only be built through a checking constructor.

use std::fmt;
use std::str::FromStr;

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
#[inline]
pub fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Reject NaN, infinities, zero and negatives.
#[inline]
pub fn check_positive(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// A unit direction vector (dimensionless, normalized).
///
/// The only way to get one is [`UnitVec::normalized`], so every `UnitVec` in
/// the program has length 1 up to rounding. Distance math on grid families
/// relies on this.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitVec(DVec2);

impl UnitVec {
    pub const EAST: UnitVec = UnitVec(DVec2::X);
    pub const SOUTH: UnitVec = UnitVec(DVec2::Y);
    pub const WEST: UnitVec = UnitVec(DVec2::NEG_X);
    pub const NORTH: UnitVec = UnitVec(DVec2::NEG_Y);

    /// Normalize `v`. Fails for zero-length or non-finite input.
    pub fn normalized(v: DVec2) -> Result<Self, NumericError> {
        check_finite(v.x)?;
        check_finite(v.y)?;
        let len = v.length();
        if len == 0.0 {
            return Err(NumericError::Zero);
        }
        // Components near f64::MAX overflow `length()`
        check_finite(len)?;
        Ok(UnitVec(v / len))
    }

    /// Unit vector at `radians` from +x, measured toward +y.
    pub fn from_angle(radians: f64) -> Self {
        UnitVec(dvec2(radians.cos(), radians.sin()))
    }

    /// Angle from +x in radians, in `(-π, π]`.
    pub fn angle(self) -> f64 {
        self.0.y.atan2(self.0.x)
    }

    /// Rotate 90° with the fixed `(-y, x)` convention.
    ///
    /// This is the tangent of a grid family whose normal is `self`.
    pub fn perp(self) -> UnitVec {
        UnitVec(self.0.perp())
    }

    #[inline]
    pub fn dot(self, v: DVec2) -> f64 {
        self.0.dot(v)
    }

    #[inline]
    pub fn as_dvec2(self) -> DVec2 {
        self.0
    }

    pub fn x(self) -> f64 {
        self.0.x
    }

    pub fn y(self) -> f64 {
        self.0.y
    }
}

impl From<UnitVec> for DVec2 {
    fn from(u: UnitVec) -> DVec2 {
        u.0
    }
}

impl std::ops::Mul<f64> for UnitVec {
    type Output = DVec2;
    fn mul(self, rhs: f64) -> DVec2 {
        self.0 * rhs
    }
}

/// The visible field: a `width` × `height` rectangle anchored at the origin,
/// Y pointing down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn try_new(width: f64, height: f64) -> Result<Self, NumericError> {
        Ok(Viewport {
            width: check_positive(width)?,
            height: check_positive(height)?,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Reference origin shared by every grid family.
    pub fn center(&self) -> DVec2 {
        dvec2(self.width / 2.0, self.height / 2.0)
    }

    /// A distance guaranteed to exceed anything visible: the diagonal.
    ///
    /// Dashes are anchored this far out along each line's tangent.
    pub fn reach(&self) -> f64 {
        self.width.hypot(self.height)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 960.0,
            height: 640.0,
        }
    }
}

/// An opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Error for color strings that are neither `#rgb`, `#rrggbb` nor a known name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized color `{}`", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        if let Some(hex) = s.strip_prefix('#') {
            let digits = |range: std::ops::Range<usize>| {
                hex.get(range)
                    .and_then(|d| u8::from_str_radix(d, 16).ok())
                    .ok_or_else(err)
            };
            return match hex.len() {
                6 => Ok(Color::rgb(digits(0..2)?, digits(2..4)?, digits(4..6)?)),
                // #abc is shorthand for #aabbcc
                3 => Ok(Color::rgb(
                    digits(0..1)? * 0x11,
                    digits(1..2)? * 0x11,
                    digits(2..3)? * 0x11,
                )),
                _ => Err(err()),
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::rgb(0, 0, 0)),
            "white" => Ok(Color::rgb(255, 255, 255)),
            "red" => Ok(Color::rgb(255, 0, 0)),
            "green" => Ok(Color::rgb(0, 128, 0)),
            "blue" => Ok(Color::rgb(0, 0, 255)),
            "yellow" => Ok(Color::rgb(255, 255, 0)),
            "cyan" => Ok(Color::rgb(0, 255, 255)),
            "magenta" => Ok(Color::rgb(255, 0, 255)),
            "orange" => Ok(Color::rgb(255, 165, 0)),
            "gray" | "grey" => Ok(Color::rgb(128, 128, 128)),
            _ => Err(err()),
        }
    }
}
