//! Error types.

use cssparser::{BasicParseError, BasicParseErrorKind};

use crate::limits::MAX_REFERENCED_ELEMENTS;
use crate::node::Node;

/// Error from parsing an attribute-like string.
///
/// Borrows from the input, so it lives as long as the string being parsed.
pub type ParseError<'i> = cssparser::ParseError<'i, ValueErrorKind>;

/// Why an attribute value was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueErrorKind {
    /// The text does not have the expected syntax.
    #[error("parse error: {0}")]
    Parse(String),

    /// The syntax is fine but the value is out of range.
    #[error("invalid value: {0}")]
    Value(String),
}

impl ValueErrorKind {
    pub fn parse_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Parse(s.into())
    }

    pub fn value_error(s: &str) -> ValueErrorKind {
        ValueErrorKind::Value(s.into())
    }
}

impl From<BasicParseError<'_>> for ValueErrorKind {
    fn from(e: BasicParseError<'_>) -> ValueErrorKind {
        ValueErrorKind::parse_error(match e.kind {
            BasicParseErrorKind::EndOfInput => "unexpected end of input",
            BasicParseErrorKind::UnexpectedToken(_) => "unexpected token",
            _ => "invalid syntax",
        })
    }
}

/// Errors that can happen while rendering or exporting a scene.
///
/// Failures inside a single node never show up here; a broken node just draws nothing.
/// These are about the surface as a whole.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// An error from the rasterization backend.
    #[error("rendering error: {0}")]
    Rendering(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(ImplementationLimit),

    /// The requested surface size cannot be allocated.
    #[error("invalid surface size {0}x{1}")]
    InvalidSize(u32, u32),

    /// The rendered surface could not be encoded.
    #[error("could not encode image: {0}")]
    Encoding(String),
}

/// Limits that keep hostile scenes from exhausting time or memory.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImplementationLimit {
    /// Resolving names during one render pass went past
    /// [`MAX_REFERENCED_ELEMENTS`], as happens with exponentially fanning
    /// chains of templates.
    #[error("more than {} referenced elements", MAX_REFERENCED_ELEMENTS)]
    TooManyReferencedElements,
}

/// Failure to resolve a name in the definitions registry.
#[derive(thiserror::Error)]
pub enum AcquireError {
    #[error("link not found: {0}")]
    LinkNotFound(String),

    /// The node is already being drawn further up the stack.
    #[error("circular reference in node {}", .0.borrow())]
    CircularReference(Node),

    #[error("maximum number of references exceeded")]
    MaxReferencesExceeded,
}

impl std::fmt::Debug for AcquireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AcquireError({})", self)
    }
}
