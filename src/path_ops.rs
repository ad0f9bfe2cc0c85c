//! Boolean operations between filled paths.
//!
//! Both operands are flattened and swept from top to bottom.  The sweep is cut
//! into horizontal bands at every vertex and at every crossing between edges,
//! so inside a band no two edges cross and the edges can be ordered by their x
//! coordinate.  Walking that order while accumulating the winding number of each
//! operand tells which spans of the band are inside the result; each such span is
//! a trapezoid.  Trapezoids bounded by the same pair of edges in consecutive
//! bands are merged.
//!
//! The output is a set of non-overlapping closed polygons, so it fills the same
//! under either fill rule.  Self-intersecting and empty operands are fine; an
//! empty result is an empty path.

use std::collections::HashMap;

use crate::path::{FillRule, Path, Polyline, FLATTEN_TOLERANCE};

/// How two filled areas are combined.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BooleanOp {
    #[default]
    Union,
    Intersection,
    /// The first operand minus the second.
    Difference,
    Xor,
    /// The second operand minus the first.
    ReverseDifference,
}

impl BooleanOp {
    #[inline]
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BooleanOp::Union => a || b,
            BooleanOp::Intersection => a && b,
            BooleanOp::Difference => a && !b,
            BooleanOp::Xor => a != b,
            BooleanOp::ReverseDifference => b && !a,
        }
    }
}

const EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    winding: i32,
    operand: usize,
}

impl Edge {
    fn new(p: (f64, f64), q: (f64, f64), operand: usize) -> Option<Edge> {
        let finite = p.0.is_finite() && p.1.is_finite() && q.0.is_finite() && q.1.is_finite();

        if !finite || (p.1 - q.1).abs() < EPSILON {
            return None;
        }

        let (a, b, winding) = if p.1 < q.1 { (p, q, 1) } else { (q, p, -1) };

        Some(Edge {
            x0: a.0,
            y0: a.1,
            x1: b.0,
            y1: b.1,
            winding,
            operand,
        })
    }

    #[inline]
    fn x_at(&self, y: f64) -> f64 {
        self.x0 + (self.x1 - self.x0) * (y - self.y0) / (self.y1 - self.y0)
    }

    /// The y coordinate where two edges cross, if they do so strictly inside both.
    fn crossing(&self, other: &Edge) -> Option<f64> {
        let lo = self.y0.max(other.y0);
        let hi = self.y1.min(other.y1);

        if hi - lo < EPSILON {
            return None;
        }

        let d_lo = self.x_at(lo) - other.x_at(lo);
        let d_hi = self.x_at(hi) - other.x_at(hi);

        if d_lo * d_hi < 0.0 {
            Some(lo + (hi - lo) * d_lo / (d_lo - d_hi))
        } else {
            None
        }
    }
}

/// A trapezoid with horizontal top and bottom sides.
#[derive(Debug, Copy, Clone)]
struct Trapezoid {
    top: f64,
    top_left: f64,
    top_right: f64,
    bottom: f64,
    bottom_left: f64,
    bottom_right: f64,
}

impl Trapezoid {
    fn polygon(&self) -> [(f64, f64); 4] {
        [
            (self.top_left, self.top),
            (self.top_right, self.top),
            (self.bottom_right, self.bottom),
            (self.bottom_left, self.bottom),
        ]
    }
}

fn collect_edges(polylines: &[Polyline], operand: usize, edges: &mut Vec<Edge>) {
    for polyline in polylines {
        edges.extend(
            polyline
                .fill_edges()
                .filter_map(|(p, q)| Edge::new(p, q, operand)),
        );
    }
}

/// Combines the filled areas of `a` and `b`.
pub fn boolean_op(a: &Path, a_rule: FillRule, b: &Path, b_rule: FillRule, op: BooleanOp) -> Path {
    let mut edges = Vec::new();
    collect_edges(&a.flatten(FLATTEN_TOLERANCE), 0, &mut edges);
    collect_edges(&b.flatten(FLATTEN_TOLERANCE), 1, &mut edges);

    let rules = [a_rule, b_rule];
    let trapezoids = sweep(&edges, |winding| {
        op.apply(rules[0].is_inside(winding[0]), rules[1].is_inside(winding[1]))
    });

    Path::from_polygons(trapezoids.iter().map(Trapezoid::polygon))
}

/// Normalizes a single path into non-overlapping polygons.
pub fn simplify(path: &Path, rule: FillRule) -> Path {
    boolean_op(path, rule, &Path::new(), FillRule::NonZero, BooleanOp::Union)
}

fn band_boundaries(edges: &[Edge]) -> Vec<f64> {
    let mut ys: Vec<f64> = edges.iter().flat_map(|e| [e.y0, e.y1]).collect();

    for (i, e) in edges.iter().enumerate() {
        for f in &edges[i + 1..] {
            if let Some(y) = e.crossing(f) {
                ys.push(y);
            }
        }
    }

    ys.sort_by(f64::total_cmp);
    ys.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
    ys
}

fn sweep<F>(edges: &[Edge], inside: F) -> Vec<Trapezoid>
where
    F: Fn([i32; 2]) -> bool,
{
    let ys = band_boundaries(edges);

    let mut trapezoids: Vec<Trapezoid> = Vec::new();

    // trapezoids of the previous band, keyed by the indices of their bounding edges
    let mut open: HashMap<(usize, usize), usize> = HashMap::new();

    for band in ys.windows(2) {
        let (top, bottom) = (band[0], band[1]);
        if bottom - top < EPSILON {
            continue;
        }

        let mid = (top + bottom) / 2.0;

        let mut active: Vec<(usize, f64)> = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.y0 <= mid && e.y1 > mid)
            .map(|(i, e)| (i, e.x_at(mid)))
            .collect();

        active.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut next_open = HashMap::new();
        let mut winding = [0, 0];
        let mut run_start: Option<usize> = None;

        for &(i, _) in &active {
            let e = &edges[i];
            winding[e.operand] += e.winding;
            let now_inside = inside(winding);

            match (run_start, now_inside) {
                (None, true) => run_start = Some(i),

                (Some(l), false) => {
                    run_start = None;

                    let (left, right) = (&edges[l], e);

                    let merged = open.get(&(l, i)).and_then(|&idx| {
                        let t: &mut Trapezoid = &mut trapezoids[idx];
                        if (t.bottom - top).abs() < EPSILON {
                            t.bottom = bottom;
                            t.bottom_left = left.x_at(bottom);
                            t.bottom_right = right.x_at(bottom);
                            Some(idx)
                        } else {
                            None
                        }
                    });

                    let idx = merged.unwrap_or_else(|| {
                        trapezoids.push(Trapezoid {
                            top,
                            top_left: left.x_at(top),
                            top_right: right.x_at(top),
                            bottom,
                            bottom_left: left.x_at(bottom),
                            bottom_right: right.x_at(bottom),
                        });
                        trapezoids.len() - 1
                    });

                    next_open.insert((l, i), idx);
                }

                _ => (),
            }
        }

        open = next_open;
    }

    trapezoids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathBuilder;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Path {
        let mut b = PathBuilder::new();
        b.rect(x, y, w, h);
        b.into_path()
    }

    fn area(path: &Path) -> f64 {
        path.flatten(FLATTEN_TOLERANCE)
            .iter()
            .map(|p| {
                p.fill_edges()
                    .map(|((x0, y0), (x1, y1))| x0 * y1 - x1 * y0)
                    .sum::<f64>()
                    .abs()
                    / 2.0
            })
            .sum()
    }

    fn op(a: &Path, b: &Path, op: BooleanOp) -> Path {
        boolean_op(a, FillRule::NonZero, b, FillRule::NonZero, op)
    }

    #[test]
    fn combines_overlapping_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 10.0, 10.0);

        assert_approx_eq_px!(area(&op(&a, &b, BooleanOp::Union)), 175.0);
        assert_approx_eq_px!(area(&op(&a, &b, BooleanOp::Intersection)), 25.0);
        assert_approx_eq_px!(area(&op(&a, &b, BooleanOp::Difference)), 75.0);
        assert_approx_eq_px!(area(&op(&a, &b, BooleanOp::ReverseDifference)), 75.0);
        assert_approx_eq_px!(area(&op(&a, &b, BooleanOp::Xor)), 150.0);
    }

    #[test]
    fn result_contains_expected_points() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 10.0, 10.0);
        let d = op(&a, &b, BooleanOp::Difference);

        assert!(d.contains(2.0, 2.0, FillRule::NonZero));
        assert!(!d.contains(7.0, 7.0, FillRule::NonZero));
        assert!(!d.contains(12.0, 12.0, FillRule::NonZero));
    }

    #[test]
    fn empty_operands() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let empty = Path::new();

        assert!(op(&a, &empty, BooleanOp::Intersection).is_empty());
        assert_approx_eq_px!(area(&op(&a, &empty, BooleanOp::Union)), 100.0);
        assert!(op(&empty, &empty, BooleanOp::Xor).is_empty());
    }

    #[test]
    fn bow_tie_is_tolerated() {
        let (bow_tie, _) = Path::parse_data("M0 0 L10 10 L10 0 L0 10 Z");
        let s = simplify(&bow_tie, FillRule::NonZero);

        assert_approx_eq_px!(area(&s), 50.0);
        // two triangles, meeting at the crossing point (5, 5)
        assert!(s.contains(2.0, 5.0, FillRule::NonZero));
        assert!(s.contains(8.0, 5.0, FillRule::NonZero));
        assert!(!s.contains(5.0, 2.0, FillRule::NonZero));
    }

    #[test]
    fn even_odd_hole_is_kept() {
        let mut b = PathBuilder::new();
        b.rect(0.0, 0.0, 10.0, 10.0);
        b.rect(2.0, 2.0, 6.0, 6.0);
        let ring = b.into_path();

        assert_approx_eq_px!(area(&simplify(&ring, FillRule::EvenOdd)), 64.0);
        assert_approx_eq_px!(area(&simplify(&ring, FillRule::NonZero)), 100.0);
    }

    #[test]
    fn stacked_bands_are_merged() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 3.0, 10.0, 4.0);
        let u = op(&a, &b, BooleanOp::Union);

        // one polygon per square, even though the sweep cuts at y = 3 and y = 7
        assert_eq!(u.flatten(FLATTEN_TOLERANCE).len(), 2);
    }
}
