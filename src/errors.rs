//! Error types with rich diagnostics using miette
//!
//! Grid configuration errors are plain values; script errors carry source
//! spans so `miette` can point at the offending statement.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

// ============================================================================
// Grid Errors
// ============================================================================

/// A grid family that cannot exist. The whole family is rejected.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("grid normal has zero length")]
    #[diagnostic(
        code(grythm::grid::zero_normal),
        help("a normal is any non-zero vector perpendicular to the lines")
    )]
    ZeroNormal,

    #[error("grid normal is not finite: {0}")]
    #[diagnostic(code(grythm::grid::non_finite_normal))]
    NonFiniteNormal(NumericError),

    #[error("grid spacing must be positive and finite, got {value}")]
    #[diagnostic(code(grythm::grid::invalid_spacing))]
    InvalidSpacing { value: f64 },

    #[error("grid thickness must be non-negative, got {value}")]
    #[diagnostic(code(grythm::grid::negative_thickness))]
    NegativeThickness { value: f64 },

    #[error("grid {field} must be finite, got {value}")]
    #[diagnostic(code(grythm::grid::non_finite))]
    NonFinite { field: &'static str, value: f64 },
}

// ============================================================================
// Script Errors
// ============================================================================

/// Errors raised while parsing or running a scene script
#[derive(Error, Diagnostic, Debug)]
pub enum ScriptError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(grythm::script::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("invalid family")]
    #[diagnostic(code(grythm::script::invalid_family))]
    InvalidFamily {
        #[source]
        #[diagnostic_source]
        cause: GridError,
        #[source_code]
        src: NamedSource<String>,
        #[label("this family")]
        span: SourceSpan,
    },

    #[error("invalid value: {cause}")]
    #[diagnostic(code(grythm::script::invalid_value))]
    InvalidValue {
        cause: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this value")]
        span: SourceSpan,
    },

    #[error("no point at index {index}")]
    #[diagnostic(
        code(grythm::script::no_such_point),
        help("only {count} points exist; indices start at 0")
    )]
    NoSuchPoint {
        index: usize,
        count: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("no family at index {index}")]
    #[diagnostic(
        code(grythm::script::no_such_family),
        help("only {count} families exist; indices start at 0")
    )]
    NoSuchFamily {
        index: usize,
        count: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("setup statement after the script started")]
    #[diagnostic(
        code(grythm::script::late_setup),
        help("move viewport/family/point/heading statements before the first run, hold or click")
    )]
    LateSetup {
        #[source_code]
        src: NamedSource<String>,
        #[label("scene is already running")]
        span: SourceSpan,
    },

    #[error("assertion failed: {details}")]
    #[diagnostic(code(grythm::script::assertion_failed))]
    AssertionFailed {
        details: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("assertion failed here")]
        span: SourceSpan,
    },
}
