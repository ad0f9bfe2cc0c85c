//! Affine transforms, the forward/inverse pair kept on every node, and
//! parsing of `transform` attribute strings.
//!
//! A [`Transform`] maps `(x, y)` to `(xx * x + xy * y + x0, yx * x + yy * y + y0)`.
//! Composition follows the order in which points are mapped: `a.then(&b)` maps
//! through `a` first and `b` second.

use cssparser::{Parser, Token};

use crate::error::*;
use crate::parsers::{optional_comma, Parse};
use crate::rect::Rect;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::identity()
    }
}

impl Transform {
    /// Builds a matrix from its six coefficients in SVG `matrix()` order.
    pub const fn from_row(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Transform {
        Transform { xx, yx, xy, yy, x0, y0 }
    }

    pub const fn identity() -> Transform {
        Transform::from_row(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn new_translate(tx: f64, ty: f64) -> Transform {
        Transform::from_row(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn new_scale(sx: f64, sy: f64) -> Transform {
        Transform::from_row(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` around the origin; positive angles turn the x axis
    /// towards the y axis.
    pub fn new_rotate(degrees: f64) -> Transform {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Transform::from_row(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` around `(cx, cy)`.
    pub fn new_rotate_at(degrees: f64, cx: f64, cy: f64) -> Transform {
        Transform::new_translate(-cx, -cy)
            .then(&Transform::new_rotate(degrees))
            .then(&Transform::new_translate(cx, cy))
    }

    /// Skew along each axis, in degrees.
    pub fn new_skew(x_degrees: f64, y_degrees: f64) -> Transform {
        Transform::from_row(
            1.0,
            y_degrees.to_radians().tan(),
            x_degrees.to_radians().tan(),
            1.0,
            0.0,
            0.0,
        )
    }

    /// The transform that maps through `self` and then through `next`.
    #[must_use]
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            xx: self.xx * next.xx + self.yx * next.xy,
            yx: self.xx * next.yx + self.yx * next.yy,
            xy: self.xy * next.xx + self.yy * next.xy,
            yy: self.xy * next.yx + self.yy * next.yy,
            x0: self.x0 * next.xx + self.y0 * next.xy + next.x0,
            y0: self.x0 * next.yx + self.y0 * next.yy + next.y0,
        }
    }

    /// Applies `inner` to points before `self` does; this is how a child's
    /// transform is appended to its parent's.
    #[must_use]
    pub fn pre_transform(&self, inner: &Transform) -> Transform {
        inner.then(self)
    }

    #[must_use]
    pub fn pre_translate(&self, tx: f64, ty: f64) -> Transform {
        self.pre_transform(&Transform::new_translate(tx, ty))
    }

    #[must_use]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Transform {
        self.pre_transform(&Transform::new_scale(sx, sy))
    }

    #[must_use]
    pub fn post_translate(&self, tx: f64, ty: f64) -> Transform {
        self.then(&Transform::new_translate(tx, ty))
    }

    #[must_use]
    pub fn post_scale(&self, sx: f64, sy: f64) -> Transform {
        self.then(&Transform::new_scale(sx, sy))
    }

    pub fn to_skia(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.xx as f32,
            self.yx as f32,
            self.xy as f32,
            self.yy as f32,
            self.x0 as f32,
            self.y0 as f32,
        )
    }

    pub fn to_affine(&self) -> kurbo::Affine {
        kurbo::Affine::new([self.xx, self.yx, self.xy, self.yy, self.x0, self.y0])
    }

    fn is_finite(&self) -> bool {
        [self.xx, self.yx, self.xy, self.yy, self.x0, self.y0]
            .iter()
            .all(|v| v.is_finite())
    }

    fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det != 0.0 && det.is_finite()
    }

    #[must_use]
    pub fn invert(&self) -> Option<Transform> {
        if !self.is_invertible() {
            return None;
        }

        let det = self.determinant();

        Some(Transform::from_row(
            self.yy / det,
            -self.yx / det,
            -self.xy / det,
            self.xx / det,
            (self.xy * self.y0 - self.yy * self.x0) / det,
            (self.yx * self.x0 - self.xx * self.y0) / det,
        ))
    }

    /// How much a unit vector along each axis is stretched.
    pub fn scale_factors(&self) -> (f64, f64) {
        (self.xx.hypot(self.yx), self.xy.hypot(self.yy))
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    /// Bounding box of the transformed corners of `rect`.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.x0, rect.y0),
            self.transform_point(rect.x1, rect.y0),
            self.transform_point(rect.x0, rect.y1),
            self.transform_point(rect.x1, rect.y1),
        ];

        let (x, y) = corners[0];
        corners[1..]
            .iter()
            .fold(Rect::new(x, y, x, y), |r, &(x, y)| {
                Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y))
            })
    }
}

/// A transform together with its inverse.
///
/// Both halves are computed together, so the inverse is never stale.  A
/// singular matrix has no inverse, and callers which need to map points
/// backwards get `None` instead of garbage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformPair {
    forward: Transform,
    inverse: Option<Transform>,
}

impl TransformPair {
    pub fn new(forward: Transform) -> TransformPair {
        TransformPair {
            forward,
            inverse: forward.invert(),
        }
    }

    pub fn forward(&self) -> Transform {
        self.forward
    }

    pub fn inverse(&self) -> Option<Transform> {
        self.inverse
    }

    pub fn is_invertible(&self) -> bool {
        self.inverse.is_some()
    }

    /// Maps a point from the outer coordinate space into the inner one.
    pub fn inverse_point(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.inverse.map(|inv| inv.transform_point(x, y))
    }
}

impl Default for TransformPair {
    fn default() -> TransformPair {
        TransformPair::new(Transform::identity())
    }
}

impl From<Transform> for TransformPair {
    fn from(t: Transform) -> TransformPair {
        TransformPair::new(t)
    }
}

/// Parses a list like `translate(10 20) rotate(45, 5, 5)`.
///
/// Singular matrices are accepted; they make a subtree undrawable, which
/// [`TransformPair`] tracks.
impl Parse for Transform {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
        let loc = parser.current_source_location();
        let mut t = Transform::identity();

        while !parser.is_exhausted() {
            // later functions in the list are applied to points first
            t = t.pre_transform(&parse_function(parser)?);
            optional_comma(parser);
        }

        if t.is_finite() {
            Ok(t)
        } else {
            Err(loc.new_custom_error(ValueErrorKind::value_error(
                "invalid transformation matrix",
            )))
        }
    }
}

fn parse_function<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    let loc = parser.current_source_location();

    let name = match parser.next()?.clone() {
        Token::Function(name) => name,
        Token::Ident(name) => {
            parser.expect_parenthesis_block()?;
            name
        }
        tok => return Err(loc.new_unexpected_token_error(tok)),
    };

    let args = parser.parse_nested_block(|p| {
        let mut args = Vec::with_capacity(6);
        while !p.is_exhausted() {
            if !args.is_empty() {
                optional_comma(p);
            }
            args.push(f64::parse(p)?);
        }
        Ok(args)
    })?;

    let t = match (&*name, args.as_slice()) {
        ("matrix", &[xx, yx, xy, yy, x0, y0]) => Transform::from_row(xx, yx, xy, yy, x0, y0),
        ("translate", &[tx]) => Transform::new_translate(tx, 0.0),
        ("translate", &[tx, ty]) => Transform::new_translate(tx, ty),
        ("scale", &[s]) => Transform::new_scale(s, s),
        ("scale", &[sx, sy]) => Transform::new_scale(sx, sy),
        ("rotate", &[deg]) => Transform::new_rotate(deg),
        ("rotate", &[deg, cx, cy]) => Transform::new_rotate_at(deg, cx, cy),
        ("skewX", &[deg]) => Transform::new_skew(deg, 0.0),
        ("skewY", &[deg]) => Transform::new_skew(0.0, deg),
        _ => {
            return Err(loc.new_custom_error(ValueErrorKind::parse_error(
                "expected matrix|translate|scale|rotate|skewX|skewY with matching arguments",
            )))
        }
    };

    Ok(t)
}
