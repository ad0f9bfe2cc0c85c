//! Gradient brushes.

use cssparser::Parser;

use crate::coord_units::CoordUnits;
use crate::error::*;
use crate::glyph_context::GlyphContext;
use crate::length::*;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;

/// A color stop of a gradient.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient, in `[0, 1]`.
    pub offset: f64,
    pub rgba: cssparser::RGBA,
    pub opacity: f64,
}

/// spreadMethod attribute for gradients
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl Parse for SpreadMethod {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<SpreadMethod, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "pad" => SpreadMethod::Pad,
            "reflect" => SpreadMethod::Reflect,
            "repeat" => SpreadMethod::Repeat,
        )?)
    }
}

impl SpreadMethod {
    fn to_skia(self) -> tiny_skia::SpreadMode {
        match self {
            SpreadMethod::Pad => tiny_skia::SpreadMode::Pad,
            SpreadMethod::Reflect => tiny_skia::SpreadMode::Reflect,
            SpreadMethod::Repeat => tiny_skia::SpreadMode::Repeat,
        }
    }
}

/// Attributes common to linear and radial gradients.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCommon {
    pub units: CoordUnits,
    pub spread: SpreadMethod,
    pub transform: Transform,
    stops: Vec<ColorStop>,
}

impl Default for GradientCommon {
    fn default() -> GradientCommon {
        GradientCommon {
            units: CoordUnits::ObjectBoundingBox,
            spread: SpreadMethod::default(),
            transform: Transform::identity(),
            stops: Vec::new(),
        }
    }
}

impl GradientCommon {
    /// Adds a color stop.
    ///
    /// Offsets are clamped to `[0, 1]`, and to be at least as large as the previous
    /// stop's offset, so stops are always sorted.
    pub fn add_color_stop(&mut self, offset: f64, rgba: cssparser::RGBA, opacity: f64) {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let offset = match self.stops.last() {
            Some(last) if last.offset > offset => last.offset,
            _ => offset,
        };

        self.stops.push(ColorStop {
            offset,
            rgba,
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    fn skia_stops(&self, opacity: f64) -> Vec<tiny_skia::GradientStop> {
        self.stops
            .iter()
            .map(|stop| {
                let alpha = f64::from(stop.rgba.alpha) / 255.0 * stop.opacity * opacity;
                let color = tiny_skia::Color::from_rgba8(
                    stop.rgba.red,
                    stop.rgba.green,
                    stop.rgba.blue,
                    (alpha * 255.0).round() as u8,
                );
                tiny_skia::GradientStop::new(stop.offset as f32, color)
            })
            .collect()
    }

    /// Sets up the user space of the gradient's geometry.
    ///
    /// In bounding box units, percentages are fractions of the box, so lengths are
    /// resolved against a unit viewport.
    fn geometry_space(&self, bbox: Option<&Rect>, ctx: &GlyphContext) -> Option<(Transform, GlyphContext)> {
        let to_user = self.units.to_user_space(bbox)?;
        let transform = to_user.pre_transform(&self.transform);

        if !transform.is_invertible() {
            return None;
        }

        let ctx = match self.units {
            CoordUnits::UserSpaceOnUse => ctx.clone(),
            CoordUnits::ObjectBoundingBox => ctx.resized(1.0, 1.0),
        };

        Some((transform, ctx))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub x1: Length<Horizontal>,
    pub y1: Length<Vertical>,
    pub x2: Length<Horizontal>,
    pub y2: Length<Vertical>,
    pub common: GradientCommon,
}

impl Default for LinearGradient {
    fn default() -> LinearGradient {
        LinearGradient {
            x1: Length::px(0.0),
            y1: Length::px(0.0),
            x2: Length::percent(100.0),
            y2: Length::px(0.0),
            common: GradientCommon::default(),
        }
    }
}

impl LinearGradient {
    pub fn new(
        x1: Length<Horizontal>,
        y1: Length<Vertical>,
        x2: Length<Horizontal>,
        y2: Length<Vertical>,
    ) -> LinearGradient {
        LinearGradient {
            x1,
            y1,
            x2,
            y2,
            common: GradientCommon::default(),
        }
    }

    pub fn with_stop(mut self, offset: f64, rgba: cssparser::RGBA, opacity: f64) -> LinearGradient {
        self.common.add_color_stop(offset, rgba, opacity);
        self
    }

    pub fn with_units(mut self, units: CoordUnits) -> LinearGradient {
        self.common.units = units;
        self
    }

    pub fn with_spread(mut self, spread: SpreadMethod) -> LinearGradient {
        self.common.spread = spread;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> LinearGradient {
        self.common.transform = transform;
        self
    }

    /// Builds a shader for filling a shape with the given bounds.
    ///
    /// Returns `None` if the gradient paints nothing: it has no stops, or its
    /// geometry cannot be mapped onto the shape.
    pub fn to_shader(
        &self,
        bbox: Option<&Rect>,
        ctx: &GlyphContext,
        opacity: f64,
    ) -> Option<tiny_skia::Shader<'static>> {
        if self.common.stops.is_empty() {
            return None;
        }

        let (transform, ctx) = self.common.geometry_space(bbox, ctx)?;

        let start = tiny_skia::Point::from_xy(self.x1.to_user(&ctx) as f32, self.y1.to_user(&ctx) as f32);
        let end = tiny_skia::Point::from_xy(self.x2.to_user(&ctx) as f32, self.y2.to_user(&ctx) as f32);

        tiny_skia::LinearGradient::new(
            start,
            end,
            self.common.skia_stops(opacity),
            self.common.spread.to_skia(),
            transform.to_skia(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub cx: Length<Horizontal>,
    pub cy: Length<Vertical>,
    pub r: ULength<Both>,
    /// Focal point; defaults to the center.
    pub fx: Option<Length<Horizontal>>,
    pub fy: Option<Length<Vertical>>,
    pub common: GradientCommon,
}

impl Default for RadialGradient {
    fn default() -> RadialGradient {
        RadialGradient {
            cx: Length::percent(50.0),
            cy: Length::percent(50.0),
            r: ULength::percent(50.0),
            fx: None,
            fy: None,
            common: GradientCommon::default(),
        }
    }
}

impl RadialGradient {
    pub fn new(cx: Length<Horizontal>, cy: Length<Vertical>, r: ULength<Both>) -> RadialGradient {
        RadialGradient {
            cx,
            cy,
            r,
            ..RadialGradient::default()
        }
    }

    pub fn with_focus(mut self, fx: Length<Horizontal>, fy: Length<Vertical>) -> RadialGradient {
        self.fx = Some(fx);
        self.fy = Some(fy);
        self
    }

    pub fn with_stop(mut self, offset: f64, rgba: cssparser::RGBA, opacity: f64) -> RadialGradient {
        self.common.add_color_stop(offset, rgba, opacity);
        self
    }

    pub fn with_units(mut self, units: CoordUnits) -> RadialGradient {
        self.common.units = units;
        self
    }

    pub fn with_spread(mut self, spread: SpreadMethod) -> RadialGradient {
        self.common.spread = spread;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> RadialGradient {
        self.common.transform = transform;
        self
    }

    /// Builds a shader for filling a shape with the given bounds.
    pub fn to_shader(
        &self,
        bbox: Option<&Rect>,
        ctx: &GlyphContext,
        opacity: f64,
    ) -> Option<tiny_skia::Shader<'static>> {
        if self.common.stops.is_empty() {
            return None;
        }

        let (transform, ctx) = self.common.geometry_space(bbox, ctx)?;

        let cx = self.cx.to_user(&ctx);
        let cy = self.cy.to_user(&ctx);
        let r = self.r.to_user(&ctx);
        let fx = self.fx.map_or(cx, |fx| fx.to_user(&ctx));
        let fy = self.fy.map_or(cy, |fy| fy.to_user(&ctx));

        if r <= 0.0 {
            return None;
        }

        tiny_skia::RadialGradient::new(
            tiny_skia::Point::from_xy(fx as f32, fy as f32),
            tiny_skia::Point::from_xy(cx as f32, cy as f32),
            r as f32,
            self.common.skia_stops(opacity),
            self.common.spread.to_skia(),
            transform.to_skia(),
        )
    }
}
