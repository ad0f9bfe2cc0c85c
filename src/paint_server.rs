//! Fill and stroke paints.

use cssparser::Parser;

use crate::definitions::{AcquiredNodes, Namespace};
use crate::drawing_ctx::DrawingCtx;
use crate::error::*;
use crate::node::{Element, NodeBorrow};
use crate::parsers::Parse;
use crate::rect::Rect;

pub use crate::gradient::{LinearGradient, RadialGradient};
pub use crate::pattern::Pattern;

/// What a shape is filled or stroked with.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaintServer {
    #[default]
    None,
    /// A named brush, with the color to use if the brush cannot be resolved.
    Brush {
        name: String,
        alternate: Option<cssparser::Color>,
    },
    SolidColor(cssparser::RGBA),
    /// The `color` in effect where the paint is used.
    CurrentColor,
}

/// A paint server resolved for one draw call.
pub enum PaintSource {
    None,
    Shader(tiny_skia::Shader<'static>),
    /// A rendered pattern tile and the transform that places it in user space.
    Tile {
        pixmap: tiny_skia::Pixmap,
        transform: tiny_skia::Transform,
        opacity: f32,
    },
}

impl PaintSource {
    pub fn is_none(&self) -> bool {
        matches!(*self, PaintSource::None)
    }

    /// Builds the paint for tiny-skia; `None` if there is nothing to paint.
    pub fn to_paint(&self) -> Option<tiny_skia::Paint<'_>> {
        let shader = match *self {
            PaintSource::None => return None,

            PaintSource::Shader(ref shader) => shader.clone(),

            PaintSource::Tile {
                ref pixmap,
                transform,
                opacity,
            } => tiny_skia::Pattern::new(
                pixmap.as_ref(),
                tiny_skia::SpreadMode::Repeat,
                tiny_skia::FilterQuality::Bicubic,
                opacity,
                transform,
            ),
        };

        Some(tiny_skia::Paint {
            shader,
            anti_alias: true,
            ..Default::default()
        })
    }
}

fn solid_color(rgba: cssparser::RGBA, opacity: f64) -> PaintSource {
    let alpha = f64::from(rgba.alpha) / 255.0 * opacity;

    PaintSource::Shader(tiny_skia::Shader::SolidColor(tiny_skia::Color::from_rgba8(
        rgba.red,
        rgba.green,
        rgba.blue,
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    )))
}

fn resolve_color(color: cssparser::Color, current: cssparser::RGBA) -> cssparser::RGBA {
    match color {
        cssparser::Color::RGBA(rgba) => rgba,
        cssparser::Color::CurrentColor => current,
    }
}

fn parse_none(parser: &mut Parser<'_, '_>) -> bool {
    parser.try_parse(|p| p.expect_ident_matching("none")).is_ok()
}

/// `none`, a color, or `url(#name)` followed by an optional alternate color.
impl Parse for PaintServer {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<PaintServer, ParseError<'i>> {
        if parse_none(parser) {
            return Ok(PaintServer::None);
        }

        let loc = parser.current_source_location();
        let url = match parser.try_parse(|p| p.expect_url()) {
            Ok(url) => url,
            Err(_) => {
                return Ok(match cssparser::Color::parse(parser)? {
                    cssparser::Color::RGBA(rgba) => PaintServer::SolidColor(rgba),
                    cssparser::Color::CurrentColor => PaintServer::CurrentColor,
                })
            }
        };

        let url: &str = &url;
        let name = url.strip_prefix('#').unwrap_or(url);
        if name.is_empty() {
            return Err(loc.new_custom_error(ValueErrorKind::value_error("empty brush name")));
        }

        let alternate = if parser.is_exhausted() || parse_none(parser) {
            None
        } else {
            Some(cssparser::Color::parse(parser)?)
        };

        Ok(PaintServer::Brush {
            name: name.to_string(),
            alternate,
        })
    }
}

impl PaintServer {
    pub fn is_none(&self) -> bool {
        matches!(*self, PaintServer::None)
    }

    /// Resolves the paint for a shape with the given bounds.
    ///
    /// `currentColor` takes the color in effect in `draw_ctx`.  An unresolvable
    /// brush falls back to the alternate color, or to no paint at all; only
    /// exceeding the reference limit is an error.
    pub fn resolve(
        &self,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        bbox: Option<&Rect>,
        opacity: f64,
    ) -> Result<PaintSource, RenderingError> {
        match *self {
            PaintServer::None => Ok(PaintSource::None),

            PaintServer::SolidColor(rgba) => Ok(solid_color(rgba, opacity)),

            PaintServer::CurrentColor => Ok(solid_color(draw_ctx.values().color, opacity)),

            PaintServer::Brush {
                ref name,
                alternate,
            } => {
                let source = match acquired_nodes.acquire(Namespace::Brush, name) {
                    Ok(acquired) => {
                        let node = acquired.get();

                        let source = match *node.borrow_element() {
                            Element::LinearGradient(ref g) => g
                                .to_shader(bbox, draw_ctx.glyphs(), opacity)
                                .map(PaintSource::Shader),

                            Element::RadialGradient(ref g) => g
                                .to_shader(bbox, draw_ctx.glyphs(), opacity)
                                .map(PaintSource::Shader),

                            Element::Pattern(ref p) => {
                                draw_ctx.pattern_source(node, p, acquired_nodes, bbox, opacity)?
                            }

                            _ => None,
                        };

                        // a brush that paints nothing does not fall back
                        Ok(source.unwrap_or(PaintSource::None))
                    }

                    Err(e) => Err(e),
                };

                match source {
                    Ok(source) => Ok(source),

                    Err(AcquireError::MaxReferencesExceeded) => {
                        scene_log!(draw_ctx.session(), "maximum number of references exceeded");
                        Err(RenderingError::LimitExceeded(
                            ImplementationLimit::TooManyReferencedElements,
                        ))
                    }

                    Err(e) => match alternate {
                        Some(color) => {
                            scene_log!(
                                draw_ctx.session(),
                                "could not resolve brush \"{}\" ({}), using alternate color",
                                name,
                                e
                            );
                            Ok(solid_color(resolve_color(color, draw_ctx.values().color), opacity))
                        }

                        None => {
                            scene_log!(
                                draw_ctx.session(),
                                "could not resolve brush \"{}\" ({}), no alternate color specified",
                                name,
                                e
                            );
                            Ok(PaintSource::None)
                        }
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush(name: &str, alternate: Option<cssparser::Color>) -> PaintServer {
        PaintServer::Brush {
            name: name.to_string(),
            alternate,
        }
    }

    #[test]
    fn parses_none_and_colors() {
        assert_eq!(PaintServer::parse_str("none").unwrap(), PaintServer::None);
        assert!(PaintServer::parse_str("NONE").unwrap().is_none());
        assert_eq!(
            PaintServer::parse_str("#0080ff").unwrap(),
            PaintServer::SolidColor(cssparser::RGBA::new(0, 128, 255, 255))
        );
        assert_eq!(
            PaintServer::parse_str("rgba(10, 20, 30, 0.5)").unwrap(),
            PaintServer::SolidColor(cssparser::RGBA::new(10, 20, 30, 128))
        );
        assert_eq!(PaintServer::parse_str("currentColor").unwrap(), PaintServer::CurrentColor);
    }

    #[test]
    fn parses_brush_references() {
        assert_eq!(PaintServer::parse_str("url(#grad)").unwrap(), brush("grad", None));
        assert_eq!(PaintServer::parse_str("url(tile)").unwrap(), brush("tile", None));
        assert_eq!(PaintServer::parse_str("url(#grad) none").unwrap(), brush("grad", None));
        assert_eq!(
            PaintServer::parse_str("url(#grad) lime").unwrap(),
            brush("grad", Some(cssparser::Color::RGBA(cssparser::RGBA::new(0, 255, 0, 255))))
        );
        assert_eq!(
            PaintServer::parse_str("url(#grad) currentcolor").unwrap(),
            brush("grad", Some(cssparser::Color::CurrentColor))
        );
    }

    #[test]
    fn current_color_resolves_against_the_cascade() {
        let blue = cssparser::RGBA::new(0, 0, 255, 255);
        assert_eq!(resolve_color(cssparser::Color::CurrentColor, blue), blue);
        assert_eq!(
            resolve_color(cssparser::Color::RGBA(cssparser::RGBA::new(1, 2, 3, 255)), blue),
            cssparser::RGBA::new(1, 2, 3, 255)
        );
    }

    #[test]
    fn rejects_garbage() {
        for s in &["", "7", "notacolor", "url(#)", "url(#grad) 7", "red blue", "none red"] {
            assert!(PaintServer::parse_str(s).is_err(), "{}", s);
        }
    }
}
