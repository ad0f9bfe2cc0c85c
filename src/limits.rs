//! Hard limits on the work a single render pass may do.

/// How many times names may be resolved through the definitions registry in
/// one render pass.
///
/// A template that instances the next one twice, nested a few dozen levels
/// deep, asks for an exponential number of draws; the pass stops with
/// [`crate::ImplementationLimit::TooManyReferencedElements`] once this many
/// lookups have happened.
pub const MAX_REFERENCED_ELEMENTS: usize = 500_000;

/// Upper bound for `log10(width) + log10(height)` of an offscreen surface.
///
/// Larger surfaces are treated as having nothing to draw.
pub const MAX_SURFACE_LOG10_AREA: f64 = 42.0;

/// Opacity at or below which a node is not drawn at all.
pub const MIN_OPACITY_FOR_DRAW: f64 = 0.01;

/// Largest number of pixels a path is rasterized into for region algebra and
/// clip hit tests; 4096 by 4096.
///
/// Bigger operands fall back to vector geometry.
pub const MAX_REGION_AREA: i64 = 16_777_216;
