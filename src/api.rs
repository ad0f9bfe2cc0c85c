//! Public API for rendering and exporting scenes.
//!
//! A [`Document`] is built with a [`DocumentBuilder`]; a [`Renderer`] carries the
//! options to draw it with.
//!
//! ```
//! use svgscene::{DocumentBuilder, NodeData, PaintServer, Parse, Renderer, Session, Shape, Svg};
//!
//! let mut builder = DocumentBuilder::new(Session::new(), NodeData::new(Svg::default()));
//! let root = builder.root();
//! builder.append(
//!     &root,
//!     NodeData::new(Shape::rect_px(10.0, 10.0, 20.0, 20.0).with_fill(PaintServer::parse_str("red").unwrap())),
//! );
//! let document = builder.build();
//!
//! let pixmap = Renderer::new(&document).render_to_pixmap(40.0, 40.0).unwrap().unwrap();
//! assert_eq!(pixmap.width(), 40);
//! ```

pub use crate::aspect_ratio::{Align1D, AspectRatio, FitMode};
pub use crate::coord_units::CoordUnits;
pub use crate::definitions::Namespace;
pub use crate::document::{Document, DocumentBuilder, Viewport};
pub use crate::error::{ImplementationLimit, RenderingError};
pub use crate::glyph_context::{FontSize, GlyphContext};
pub use crate::gradient::SpreadMethod;
pub use crate::length::{Both, Horizontal, Length, LengthUnit, RawLength, ULength, Vertical};
pub use crate::node::{Element, Node, NodeData, NodeId};
pub use crate::outline::{BooleanBackend, OutlineParams};
pub use crate::paint_server::{LinearGradient, PaintServer, Pattern, RadialGradient};
pub use crate::parsers::Parse;
pub use crate::path::{FillRule, Path, PathBuilder};
pub use crate::path_ops::BooleanOp;
pub use crate::properties::{ComputedValues, SpecifiedValue, SpecifiedValues};
pub use crate::rect::Rect;
pub use crate::session::Session;
pub use crate::shapes::{Shape, ShapeKind};
pub use crate::structure::{ClipPath, Defs, Group, Mask, Svg, Symbol, Use};
pub use crate::transform::{Transform, TransformPair};
pub use crate::viewbox::ViewBox;

use tiny_skia::Pixmap;

use crate::drawing_ctx::checked_surface_size;

/// Device pixel density used when none is configured.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Options for rendering a document.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderOptions {
    /// Device pixels per user unit.
    pub scale: f64,

    pub backend: BooleanBackend,

    /// Overrides the session's logging setting if present.
    pub logging: Option<bool>,

    /// Color to fill the surface with before drawing.
    pub background: Option<cssparser::RGBA>,
}

impl Default for RenderOptions {
    fn default() -> RenderOptions {
        RenderOptions {
            scale: DEFAULT_SCALE,
            backend: BooleanBackend::default(),
            logging: None,
            background: None,
        }
    }
}

impl RenderOptions {
    fn outline_params(&self) -> OutlineParams {
        OutlineParams {
            backend: self.backend,
            resolution: self.scale,
        }
    }
}

/// Renders a [`Document`] with a set of options.
pub struct Renderer<'a> {
    document: &'a Document,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(document: &'a Document) -> Self {
        Renderer {
            document,
            options: RenderOptions::default(),
        }
    }

    /// Sets the device pixel density.  Non-positive or non-finite values mean 1.
    pub fn with_scale(self, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            DEFAULT_SCALE
        };

        Renderer {
            options: RenderOptions { scale, ..self.options },
            ..self
        }
    }

    /// Chooses how outlines are combined for clipping and path algebra.
    pub fn with_boolean_backend(self, backend: BooleanBackend) -> Self {
        Renderer {
            options: RenderOptions { backend, ..self.options },
            ..self
        }
    }

    pub fn with_logging(self, enabled: bool) -> Self {
        Renderer {
            options: RenderOptions {
                logging: Some(enabled),
                ..self.options
            },
            ..self
        }
    }

    pub fn with_background(self, color: cssparser::RGBA) -> Self {
        Renderer {
            options: RenderOptions {
                background: Some(color),
                ..self.options
            },
            ..self
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders the document onto a whole surface.
    pub fn render(&self, surface: &mut Pixmap) -> Result<(), RenderingError> {
        let viewport = Viewport::for_surface(surface, self.options.scale);
        self.render_viewport(surface, viewport)
    }

    fn render_viewport(&self, surface: &mut Pixmap, viewport: Viewport) -> Result<(), RenderingError> {
        if let Some(enabled) = self.options.logging {
            self.document.session().set_log_enabled(enabled);
        }

        if let Some(color) = self.options.background {
            surface.fill(tiny_skia::Color::from_rgba8(
                color.red,
                color.green,
                color.blue,
                color.alpha,
            ));
        }

        self.document
            .render(surface, viewport, self.options.outline_params())
    }

    /// Renders into a new surface for a viewport of `width` by `height` user units,
    /// at the configured scale.
    ///
    /// Returns `Ok(None)` if the size is degenerate: NaN, less than one unit, or
    /// absurdly large.
    pub fn render_to_pixmap(&self, width: f64, height: f64) -> Result<Option<Pixmap>, RenderingError> {
        if !checked_surface_size(width, height) {
            return Ok(None);
        }

        self.render_scaled(width, height, self.options.scale).map(Some)
    }

    fn render_scaled(&self, width: f64, height: f64, scale: f64) -> Result<Pixmap, RenderingError> {
        let pixel_width = (width * scale).floor();
        let pixel_height = (height * scale).floor();

        let surface = if checked_surface_size(pixel_width, pixel_height) {
            Pixmap::new(pixel_width as u32, pixel_height as u32)
        } else {
            None
        };

        let mut surface =
            surface.ok_or(RenderingError::InvalidSize(pixel_width as u32, pixel_height as u32))?;

        self.render_viewport(&mut surface, Viewport::new(width, height, scale))?;

        Ok(surface)
    }

    /// Renders a viewport of `width` by `height` user units and encodes it as PNG.
    ///
    /// A negative `scale` means 1, and zero means the configured scale.
    pub fn export_png(&self, width: u32, height: u32, scale: f64) -> Result<Vec<u8>, RenderingError> {
        let scale = if scale < 0.0 {
            1.0
        } else if scale == 0.0 {
            self.options.scale
        } else {
            scale
        };

        let surface = self.render_scaled(f64::from(width), f64::from(height), scale)?;

        surface
            .encode_png()
            .map_err(|e| RenderingError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_document() -> Document {
        DocumentBuilder::new(Session::new_for_test_suite(), NodeData::new(crate::structure::Svg::default())).build()
    }

    #[test]
    fn scale_is_sanitized() {
        let doc = empty_document();

        assert_eq!(Renderer::new(&doc).with_scale(2.0).options().scale, 2.0);
        assert_eq!(Renderer::new(&doc).with_scale(-2.0).options().scale, 1.0);
        assert_eq!(Renderer::new(&doc).with_scale(f64::NAN).options().scale, 1.0);
    }

    #[test]
    fn degenerate_sizes_are_not_rendered() {
        let doc = empty_document();
        let renderer = Renderer::new(&doc);

        assert!(renderer.render_to_pixmap(0.0, 10.0).unwrap().is_none());
        assert!(renderer.render_to_pixmap(f64::NAN, 10.0).unwrap().is_none());
        assert!(renderer.render_to_pixmap(1e30, 1e30).unwrap().is_none());
        assert!(renderer.render_to_pixmap(10.0, 10.0).unwrap().is_some());
    }

    #[test]
    fn export_scale_rules() {
        let doc = empty_document();
        let renderer = Renderer::new(&doc).with_scale(3.0);

        let decode_size = |png: Vec<u8>| {
            let pixmap = Pixmap::decode_png(&png).unwrap();
            (pixmap.width(), pixmap.height())
        };

        assert_eq!(decode_size(renderer.export_png(10, 5, -1.0).unwrap()), (10, 5));
        assert_eq!(decode_size(renderer.export_png(10, 5, 0.0).unwrap()), (30, 15));
        assert_eq!(decode_size(renderer.export_png(10, 5, 2.0).unwrap()), (20, 10));

        assert!(matches!(
            renderer.export_png(0, 5, 1.0),
            Err(RenderingError::InvalidSize(0, 5))
        ));
    }
}
