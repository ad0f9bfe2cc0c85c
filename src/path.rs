//! Path geometry: building, parsing path data, flattening and point queries.
//!
//! A [`Path`] wraps a [`kurbo::BezPath`]; curve flattening, exact bounds,
//! winding numbers and nearest-point queries come from `kurbo`.

use cssparser::Parser;
use kurbo::{Arc, BezPath, ParamCurveNearest, PathEl, Point, Shape, SvgArc, Vec2};
use std::fmt;

use crate::error::*;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;

/// Maximum distance between a curve and its flattened polyline, in path units.
pub const FLATTEN_TOLERANCE: f64 = 0.05;

/// Accuracy for approximating elliptical arcs with cubics.
const ARC_TOLERANCE: f64 = 0.01;

/// Accuracy of nearest-point searches on curves.
const NEAREST_ACCURACY: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    /// Whether a point with the given winding number is inside.
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    pub fn to_skia(self) -> tiny_skia::FillRule {
        match self {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

impl Parse for FillRule {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<FillRule, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "nonzero" => FillRule::NonZero,
            "evenodd" => FillRule::EvenOdd,
        )?)
    }
}

/// A flattened subpath.
///
/// For filling, every subpath is implicitly closed; `closed` only matters for
/// stroking.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

impl Polyline {
    /// Edges for filling, including the implicit closing edge.
    pub fn fill_edges(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// An immutable path in absolute coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    bez: BezPath,
}

impl Path {
    pub fn new() -> Path {
        Path::default()
    }

    pub fn elements(&self) -> &[PathEl] {
        self.bez.elements()
    }

    pub fn as_bez_path(&self) -> &BezPath {
        &self.bez
    }

    /// Whether the path has no drawing commands at all.
    pub fn is_empty(&self) -> bool {
        !self
            .elements()
            .iter()
            .any(|el| !matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath))
    }

    #[must_use]
    pub fn transform(&self, t: &Transform) -> Path {
        let mut bez = self.bez.clone();
        bez.apply_affine(t.to_affine());
        Path { bez }
    }

    /// Appends all the subpaths of `other`.
    pub fn append(&mut self, other: &Path) {
        self.bez.extend(other.bez.iter());
    }

    /// Builds a path out of closed polygons.
    pub fn from_polygons<I, P>(polygons: I) -> Path
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[(f64, f64)]>,
    {
        let mut builder = PathBuilder::new();

        for polygon in polygons {
            let points = polygon.as_ref();
            if points.len() < 3 {
                continue;
            }

            builder.move_to(points[0].0, points[0].1);
            for &(x, y) in &points[1..] {
                builder.line_to(x, y);
            }
            builder.close_path();
        }

        builder.into_path()
    }

    /// Flattens curves into polylines, one per subpath.
    pub fn flatten(&self, tolerance: f64) -> Vec<Polyline> {
        fn flush(result: &mut Vec<Polyline>, current: &mut Vec<(f64, f64)>, closed: bool) {
            if current.len() >= 2 {
                result.push(Polyline {
                    points: std::mem::take(current),
                    closed,
                });
            } else {
                current.clear();
            }
        }

        let mut result = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        let mut start = (0.0, 0.0);

        self.bez.flatten(tolerance, |el| match el {
            PathEl::MoveTo(p) => {
                flush(&mut result, &mut current, false);
                start = (p.x, p.y);
                current.push(start);
            }

            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                // a segment right after a close starts where the closed subpath did
                if current.is_empty() {
                    current.push(start);
                }
                current.push((p.x, p.y));
            }

            PathEl::ClosePath => {
                if current.len() > 1 && current.last() == current.first() {
                    current.pop();
                }
                flush(&mut result, &mut current, true);
            }
        });

        flush(&mut result, &mut current, false);

        result
    }

    /// Exact bounds of the geometry including curve extrema, or `None` for
    /// an empty path.
    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }

        let r = self.bez.bounding_box();
        Some(Rect::new(r.x0, r.y0, r.x1, r.y1))
    }

    /// Winding number of the path around a point, with open subpaths closed
    /// the way filling closes them.
    pub fn winding(&self, x: f64, y: f64) -> i32 {
        closed_subpaths(&self.bez).winding(Point::new(x, y))
    }

    /// Whether a point is inside the filled area.
    pub fn contains(&self, x: f64, y: f64, rule: FillRule) -> bool {
        rule.is_inside(self.winding(x, y))
    }

    /// Shortest distance from a point to the stroked outline.
    pub fn distance_to_outline(&self, x: f64, y: f64) -> f64 {
        let p = Point::new(x, y);

        self.bez
            .segments()
            .map(|seg| seg.nearest(p, NEAREST_ACCURACY).distance_sq)
            .fold(f64::INFINITY, f64::min)
            .sqrt()
    }

    /// Converts to the rasterizer's path; `None` if there is nothing to draw.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();

        for el in self.elements() {
            match *el {
                PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
                PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
                PathEl::QuadTo(p1, p) => pb.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
                PathEl::CurveTo(p1, p2, p) => pb.cubic_to(
                    p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32, p.x as f32, p.y as f32,
                ),
                PathEl::ClosePath => pb.close(),
            }
        }

        pb.finish()
    }

    /// Parses SVG path data, like `M 10 10 h 20 v 20 z`.
    ///
    /// As in SVG, everything up to the first error is kept; the error itself is
    /// returned alongside.
    pub fn parse_data(data: &str) -> (Path, Option<PathDataError>) {
        let mut builder = PathBuilder::new();
        let res = PathDataParser::new(data, &mut builder).parse();
        (builder.into_path(), res.err())
    }
}

/// Copy of `bez` where every subpath ends with a close.
fn closed_subpaths(bez: &BezPath) -> BezPath {
    let mut closed = BezPath::new();
    let mut open = false;

    for el in bez.iter() {
        match el {
            PathEl::MoveTo(_) => {
                if open {
                    closed.close_path();
                }
                open = true;
            }
            PathEl::ClosePath => open = false,
            _ => {}
        }
        closed.push(el);
    }

    if open {
        closed.close_path();
    }

    closed
}

/// Accumulates path elements, tracking the current point.
#[derive(Default)]
pub struct PathBuilder {
    bez: BezPath,
    start: (f64, f64),
    current: (f64, f64),
}

impl PathBuilder {
    pub fn new() -> PathBuilder {
        PathBuilder::default()
    }

    pub fn into_path(self) -> Path {
        Path { bez: self.bez }
    }

    pub fn current_point(&self) -> (f64, f64) {
        self.current
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.bez.move_to((x, y));
        self.start = (x, y);
        self.current = (x, y);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.bez.line_to((x, y));
        self.current = (x, y);
    }

    pub fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        self.bez.quad_to((x1, y1), (x, y));
        self.current = (x, y);
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.bez.curve_to((x1, y1), (x2, y2), (x, y));
        self.current = (x, y);
    }

    pub fn close_path(&mut self) {
        self.bez.close_path();
        self.current = self.start;
    }

    /// Elliptical arc from the current point to `(x, y)`, as in SVG path data.
    ///
    /// The ellipse's x axis is rotated by `rotation` degrees.  Radii that are
    /// too small to reach the end point are scaled up.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        let (x1, y1) = self.current;

        if x1 == x && y1 == y {
            return;
        }

        let svg_arc = SvgArc {
            from: Point::new(x1, y1),
            to: Point::new(x, y),
            radii: Vec2::new(rx.abs(), ry.abs()),
            x_rotation: rotation.to_radians(),
            large_arc,
            sweep,
        };

        match Arc::from_svg_arc(&svg_arc) {
            Some(arc) => {
                for el in arc.append_iter(ARC_TOLERANCE) {
                    self.bez.push(el);
                }
                self.current = (x, y);
            }

            None => self.line_to(x, y),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
    }

    /// Rectangle with elliptical corners; radii are clamped to half the sides.
    pub fn rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
        let rx = rx.min(w / 2.0);
        let ry = ry.min(h / 2.0);

        if rx <= 0.0 || ry <= 0.0 {
            self.rect(x, y, w, h);
            return;
        }

        self.move_to(x + rx, y);
        self.line_to(x + w - rx, y);
        self.arc_to(rx, ry, 0.0, false, true, x + w, y + ry);
        self.line_to(x + w, y + h - ry);
        self.arc_to(rx, ry, 0.0, false, true, x + w - rx, y + h);
        self.line_to(x + rx, y + h);
        self.arc_to(rx, ry, 0.0, false, true, x, y + h - ry);
        self.line_to(x, y + ry);
        self.arc_to(rx, ry, 0.0, false, true, x + rx, y);
        self.close_path();
    }

    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let ellipse = kurbo::Ellipse::new((cx, cy), (rx, ry), 0.0);

        for el in ellipse.path_elements(ARC_TOLERANCE) {
            self.bez.push(el);
        }

        self.start = (cx + rx, cy);
        self.current = self.start;
    }
}

/// Error from malformed path data, with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDataError {
    pub position: usize,
    pub kind: PathDataErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDataErrorKind {
    ExpectedCommand,
    ExpectedNumber,
    ExpectedFlag,
    MissingMoveTo,
}

impl fmt::Display for PathDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            PathDataErrorKind::ExpectedCommand => "expected a path command",
            PathDataErrorKind::ExpectedNumber => "expected a number",
            PathDataErrorKind::ExpectedFlag => "expected 0 or 1",
            PathDataErrorKind::MissingMoveTo => "path data must start with a moveto",
        };

        write!(f, "{} at offset {}", what, self.position)
    }
}

struct PathDataParser<'a, 'b> {
    data: &'a [u8],
    pos: usize,
    builder: &'b mut PathBuilder,

    // reflection points for smooth curves
    last_cubic_ctrl: Option<(f64, f64)>,
    last_quad_ctrl: Option<(f64, f64)>,
}

impl<'a, 'b> PathDataParser<'a, 'b> {
    fn new(data: &'a str, builder: &'b mut PathBuilder) -> PathDataParser<'a, 'b> {
        PathDataParser {
            data: data.as_bytes(),
            pos: 0,
            builder,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn error(&self, kind: PathDataErrorKind) -> PathDataError {
        PathDataError {
            position: self.pos,
            kind,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn skip_comma_whitespace(&mut self) {
        self.skip_whitespace();
        if self.peek() == Some(b',') {
            self.pos += 1;
            self.skip_whitespace();
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn at_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    fn number(&mut self) -> Result<f64, PathDataError> {
        self.skip_comma_whitespace();

        let start = self.pos;
        let mut seen_dot = false;

        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }

        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                b'e' | b'E' => {
                    let save = self.pos;
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'-' | b'+')) {
                        self.pos += 1;
                    }
                    if !matches!(self.peek(), Some(b'0'..=b'9')) {
                        self.pos = save;
                        break;
                    }
                    while matches!(self.peek(), Some(b'0'..=b'9')) {
                        self.pos += 1;
                    }
                    break;
                }
                _ => break,
            }
        }

        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .ok_or_else(|| {
                let mut e = self.error(PathDataErrorKind::ExpectedNumber);
                e.position = start;
                e
            })
    }

    fn flag(&mut self) -> Result<bool, PathDataError> {
        self.skip_comma_whitespace();

        let flag = match self.peek() {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return Err(self.error(PathDataErrorKind::ExpectedFlag)),
        };

        self.pos += 1;
        Ok(flag)
    }

    fn coordinate_pair(&mut self, relative: bool) -> Result<(f64, f64), PathDataError> {
        let x = self.number()?;
        let y = self.number()?;

        if relative {
            let (cx, cy) = self.builder.current_point();
            Ok((cx + x, cy + y))
        } else {
            Ok((x, y))
        }
    }

    fn parse(&mut self) -> Result<(), PathDataError> {
        self.skip_whitespace();

        if self.pos == self.data.len() {
            return Ok(());
        }

        if !matches!(self.peek(), Some(b'M' | b'm')) {
            return Err(self.error(PathDataErrorKind::MissingMoveTo));
        }

        while self.pos < self.data.len() {
            let cmd = match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => c,
                _ => return Err(self.error(PathDataErrorKind::ExpectedCommand)),
            };
            self.pos += 1;

            self.command(cmd)?;
            self.skip_whitespace();
        }

        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), PathDataError> {
        let relative = cmd.is_ascii_lowercase();

        if cmd.to_ascii_uppercase() == b'Z' {
            self.builder.close_path();
            self.last_cubic_ctrl = None;
            self.last_quad_ctrl = None;
            return Ok(());
        }

        let mut first = true;

        loop {
            self.skip_comma_whitespace();
            if !first && !self.at_number() {
                break;
            }

            self.segment(cmd, relative, first)?;
            first = false;
        }

        Ok(())
    }

    fn segment(&mut self, cmd: u8, relative: bool, first: bool) -> Result<(), PathDataError> {
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match cmd.to_ascii_uppercase() {
            b'M' => {
                let (x, y) = self.coordinate_pair(relative)?;
                // subsequent pairs after a moveto are implicit linetos
                if first {
                    self.builder.move_to(x, y);
                } else {
                    self.builder.line_to(x, y);
                }
            }

            b'L' => {
                let (x, y) = self.coordinate_pair(relative)?;
                self.builder.line_to(x, y);
            }

            b'H' => {
                let (cx, cy) = self.builder.current_point();
                let x = self.number()?;
                self.builder.line_to(if relative { cx + x } else { x }, cy);
            }

            b'V' => {
                let (cx, cy) = self.builder.current_point();
                let y = self.number()?;
                self.builder.line_to(cx, if relative { cy + y } else { y });
            }

            b'C' => {
                let (cx, cy) = self.builder.current_point();
                let (x1, y1) = self.coordinate_pair(false)?;
                let (x2, y2) = self.coordinate_pair(false)?;
                let (x, y) = self.coordinate_pair(false)?;
                let off = if relative { (cx, cy) } else { (0.0, 0.0) };

                let c2 = (x2 + off.0, y2 + off.1);
                self.builder
                    .curve_to(x1 + off.0, y1 + off.1, c2.0, c2.1, x + off.0, y + off.1);
                cubic_ctrl = Some(c2);
            }

            b'S' => {
                let (cx, cy) = self.builder.current_point();
                let (x1, y1) = match self.last_cubic_ctrl {
                    Some((px, py)) => (2.0 * cx - px, 2.0 * cy - py),
                    None => (cx, cy),
                };
                let (x2, y2) = self.coordinate_pair(false)?;
                let (x, y) = self.coordinate_pair(false)?;
                let off = if relative { (cx, cy) } else { (0.0, 0.0) };

                let c2 = (x2 + off.0, y2 + off.1);
                self.builder
                    .curve_to(x1, y1, c2.0, c2.1, x + off.0, y + off.1);
                cubic_ctrl = Some(c2);
            }

            b'Q' => {
                let (cx, cy) = self.builder.current_point();
                let (x1, y1) = self.coordinate_pair(false)?;
                let (x, y) = self.coordinate_pair(false)?;
                let off = if relative { (cx, cy) } else { (0.0, 0.0) };

                let c = (x1 + off.0, y1 + off.1);
                self.builder.quad_to(c.0, c.1, x + off.0, y + off.1);
                quad_ctrl = Some(c);
            }

            b'T' => {
                let (cx, cy) = self.builder.current_point();
                let c = match self.last_quad_ctrl {
                    Some((px, py)) => (2.0 * cx - px, 2.0 * cy - py),
                    None => (cx, cy),
                };
                let (x, y) = self.coordinate_pair(relative)?;
                self.builder.quad_to(c.0, c.1, x, y);
                quad_ctrl = Some(c);
            }

            b'A' => {
                let rx = self.number()?;
                let ry = self.number()?;
                let rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let (x, y) = self.coordinate_pair(relative)?;

                self.builder.arc_to(rx, ry, rotation, large_arc, sweep, x, y);
            }

            _ => {
                self.pos -= 1;
                return Err(self.error(PathDataErrorKind::ExpectedCommand));
            }
        }

        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;

        Ok(())
    }
}
