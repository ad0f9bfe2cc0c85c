//! Leaf shapes: rectangles, circles, ellipses, lines and arbitrary paths.

use std::rc::Rc;

use crate::definitions::AcquiredNodes;
use crate::drawing_ctx::DrawingCtx;
use crate::error::*;
use crate::glyph_context::GlyphContext;
use crate::length::*;
use crate::node::{Draw, Node};
use crate::paint_server::PaintServer;
use crate::path::{FillRule, Path, PathBuilder};
use crate::properties::{ComputedValues, SpecifiedValues};
use crate::rect::Rect;

/// The geometry of a shape, in unresolved lengths.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rect {
        x: Length<Horizontal>,
        y: Length<Vertical>,
        width: ULength<Horizontal>,
        height: ULength<Vertical>,
        rx: Option<ULength<Horizontal>>,
        ry: Option<ULength<Vertical>>,
    },

    Circle {
        cx: Length<Horizontal>,
        cy: Length<Vertical>,
        r: ULength<Both>,
    },

    Ellipse {
        cx: Length<Horizontal>,
        cy: Length<Vertical>,
        rx: ULength<Horizontal>,
        ry: ULength<Vertical>,
    },

    Line {
        x1: Length<Horizontal>,
        y1: Length<Vertical>,
        x2: Length<Horizontal>,
        y2: Length<Vertical>,
    },

    Path(Rc<Path>),
}

impl ShapeKind {
    fn make_path(&self, ctx: &GlyphContext) -> Path {
        let mut builder = PathBuilder::new();

        match *self {
            ShapeKind::Rect {
                x,
                y,
                width,
                height,
                rx,
                ry,
            } => {
                let x = x.to_user(ctx);
                let y = y.to_user(ctx);
                let w = width.to_user(ctx);
                let h = height.to_user(ctx);

                // a missing radius takes the other one
                let (rx, ry) = match (rx.map(|l| l.to_user(ctx)), ry.map(|l| l.to_user(ctx))) {
                    (None, None) => (0.0, 0.0),
                    (Some(rx), None) => (rx, rx),
                    (None, Some(ry)) => (ry, ry),
                    (Some(rx), Some(ry)) => (rx, ry),
                };

                if w > 0.0 && h > 0.0 && rx >= 0.0 && ry >= 0.0 {
                    builder.rounded_rect(x, y, w, h, rx, ry);
                }
            }

            ShapeKind::Circle { cx, cy, r } => {
                let r = r.to_user(ctx);

                if r > 0.0 {
                    builder.ellipse(cx.to_user(ctx), cy.to_user(ctx), r, r);
                }
            }

            ShapeKind::Ellipse { cx, cy, rx, ry } => {
                let rx = rx.to_user(ctx);
                let ry = ry.to_user(ctx);

                if rx > 0.0 && ry > 0.0 {
                    builder.ellipse(cx.to_user(ctx), cy.to_user(ctx), rx, ry);
                }
            }

            ShapeKind::Line { x1, y1, x2, y2 } => {
                builder.move_to(x1.to_user(ctx), y1.to_user(ctx));
                builder.line_to(x2.to_user(ctx), y2.to_user(ctx));
            }

            ShapeKind::Path(ref path) => return Path::clone(path),
        }

        builder.into_path()
    }
}

/// A leaf node that fills and strokes a path.
///
/// Paint properties that are not set on the shape come from its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    pub values: SpecifiedValues,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Shape {
        Shape {
            kind,
            values: SpecifiedValues::default(),
        }
    }

    pub fn rect(
        x: Length<Horizontal>,
        y: Length<Vertical>,
        width: ULength<Horizontal>,
        height: ULength<Vertical>,
    ) -> Shape {
        Shape::new(ShapeKind::Rect {
            x,
            y,
            width,
            height,
            rx: None,
            ry: None,
        })
    }

    /// Shorthand for a rectangle in user units.
    pub fn rect_px(x: f64, y: f64, width: f64, height: f64) -> Shape {
        Shape::rect(
            Length::px(x),
            Length::px(y),
            ULength::px(width),
            ULength::px(height),
        )
    }

    pub fn circle(cx: Length<Horizontal>, cy: Length<Vertical>, r: ULength<Both>) -> Shape {
        Shape::new(ShapeKind::Circle { cx, cy, r })
    }

    pub fn ellipse(
        cx: Length<Horizontal>,
        cy: Length<Vertical>,
        rx: ULength<Horizontal>,
        ry: ULength<Vertical>,
    ) -> Shape {
        Shape::new(ShapeKind::Ellipse { cx, cy, rx, ry })
    }

    /// A line; it has no fill, so it paints only if it gets a stroke.
    pub fn line(
        x1: Length<Horizontal>,
        y1: Length<Vertical>,
        x2: Length<Horizontal>,
        y2: Length<Vertical>,
    ) -> Shape {
        Shape::new(ShapeKind::Line { x1, y1, x2, y2 }).with_fill(PaintServer::None)
    }

    pub fn path(path: Path) -> Shape {
        Shape::new(ShapeKind::Path(Rc::new(path)))
    }

    /// Builds a path shape from SVG path data.
    ///
    /// Malformed data keeps everything up to the error, so this never fails.
    pub fn path_data(data: &str) -> Shape {
        let (path, _) = Path::parse_data(data);
        Shape::path(path)
    }

    pub fn with_corner_radii(mut self, rx: Option<ULength<Horizontal>>, ry: Option<ULength<Vertical>>) -> Shape {
        if let ShapeKind::Rect {
            rx: ref mut old_rx,
            ry: ref mut old_ry,
            ..
        } = self.kind
        {
            *old_rx = rx;
            *old_ry = ry;
        }
        self
    }

    pub fn with_fill(mut self, fill: PaintServer) -> Shape {
        self.values = self.values.with_fill(fill);
        self
    }

    pub fn with_fill_opacity(mut self, opacity: f64) -> Shape {
        self.values = self.values.with_fill_opacity(opacity);
        self
    }

    pub fn with_fill_rule(mut self, rule: FillRule) -> Shape {
        self.values = self.values.with_fill_rule(rule);
        self
    }

    pub fn with_stroke(mut self, stroke: PaintServer) -> Shape {
        self.values = self.values.with_stroke(stroke);
        self
    }

    pub fn with_stroke_width(mut self, width: ULength<Both>) -> Shape {
        self.values = self.values.with_stroke_width(width);
        self
    }

    pub fn with_stroke_opacity(mut self, opacity: f64) -> Shape {
        self.values = self.values.with_stroke_opacity(opacity);
        self
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// The filled outline, used for path algebra and clipping.
    pub fn outline(&self, ctx: &GlyphContext) -> Path {
        self.kind.make_path(ctx)
    }
}

/// Half the stroke width, or `None` if the shape is not stroked.
pub fn stroke_half_width(values: &ComputedValues, ctx: &GlyphContext) -> Option<f64> {
    if values.stroke.is_none() {
        return None;
    }

    let width = values.stroke_width.to_user(ctx);

    if width > 0.0 {
        Some(width / 2.0)
    } else {
        None
    }
}

impl Draw for Shape {
    fn draw(
        &self,
        _node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        draw_ctx.with_values(&self.values, |dc| {
            let values = dc.values().clone();
            let path = self.outline(dc.glyphs());
            let stroke_half_width = stroke_half_width(&values, dc.glyphs());

            let bbox = match path.bounds() {
                Some(b) => b,
                None => return Ok(None),
            };

            let fill = values
                .fill
                .resolve(acquired_nodes, dc, Some(&bbox), opacity * values.fill_opacity)?;
            dc.fill_path(&path, values.fill_rule, &fill);

            match stroke_half_width {
                Some(half) => {
                    let stroke = values.stroke.resolve(
                        acquired_nodes,
                        dc,
                        Some(&bbox),
                        opacity * values.stroke_opacity,
                    )?;
                    dc.stroke_path(&path, half * 2.0, &stroke);

                    Ok(Some(Rect::new(
                        bbox.x0 - half,
                        bbox.y0 - half,
                        bbox.x1 + half,
                        bbox.y1 + half,
                    )))
                }

                None => Ok(Some(bbox)),
            }
        })
    }
}
