//! Pixel regions, for path algebra where vector boolean operations are not used.
//!
//! A [`Region`] is a set of integer pixels, stored as sorted, disjoint horizontal
//! spans per row.  Paths are rasterized into regions by sampling at pixel
//! centers; regions combine row by row; the result turns back into a path made
//! of rectangles.

use crate::limits::MAX_REGION_AREA;
use crate::path::{FillRule, Path, PathBuilder, FLATTEN_TOLERANCE};
use crate::path_ops::BooleanOp;
use crate::rect::IRect;

/// Half-open span `[x0, x1)` of pixels in a row.
type Span = (i32, i32);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// Row index of `rows[0]`.
    y0: i32,
    rows: Vec<Vec<Span>>,
}

impl Region {
    pub fn empty() -> Region {
        Region::default()
    }

    /// Every pixel of `r`; `None` if `r` is larger than [`MAX_REGION_AREA`].
    pub fn from_rect(r: IRect) -> Option<Region> {
        let height = row_count(r)?;
        if height == 0 {
            return Some(Region::empty());
        }

        Some(Region {
            y0: r.y0,
            rows: vec![vec![(r.x0, r.x1)]; height],
        })
    }

    /// Rasterizes the filled area of `path`, limited to `clip`.
    ///
    /// A pixel belongs to the region if its center is inside the path.
    /// Returns `None` if `clip` is larger than [`MAX_REGION_AREA`].
    pub fn from_path(path: &Path, rule: FillRule, clip: IRect) -> Option<Region> {
        let height = row_count(clip)?;
        if height == 0 {
            return Some(Region::empty());
        }

        let edges: Vec<_> = path
            .flatten(FLATTEN_TOLERANCE)
            .iter()
            .flat_map(|p| p.fill_edges().collect::<Vec<_>>())
            .filter(|((_, y0), (_, y1))| y0 != y1)
            .collect();

        let mut rows = Vec::with_capacity(height);
        let mut crossings: Vec<(f64, i32)> = Vec::new();

        for y in clip.y_range() {
            let sample_y = f64::from(y) + 0.5;

            crossings.clear();
            for &((x0, y0), (x1, y1)) in &edges {
                let (top, bottom, winding) = if y0 < y1 { (y0, y1, 1) } else { (y1, y0, -1) };

                if top <= sample_y && sample_y < bottom {
                    let x = x0 + (x1 - x0) * (sample_y - y0) / (y1 - y0);
                    crossings.push((x, winding));
                }
            }

            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut spans: Vec<Span> = Vec::new();
            let mut winding = 0;
            let mut start: Option<f64> = None;

            for &(x, w) in &crossings {
                winding += w;
                let inside = rule.is_inside(winding);

                match (start, inside) {
                    (None, true) => start = Some(x),
                    (Some(sx), false) => {
                        start = None;

                        // pixels whose centers fall in [sx, x)
                        let x0 = ((sx - 0.5).ceil() as i32).max(clip.x0);
                        let x1 = ((x - 0.5).ceil() as i32).min(clip.x1);

                        push_span(&mut spans, (x0, x1));
                    }
                    _ => (),
                }
            }

            rows.push(spans);
        }

        let mut region = Region { y0: clip.y0, rows };
        region.trim();
        Some(region)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    pub fn bounds(&self) -> Option<IRect> {
        let mut bounds: Option<IRect> = None;

        for (i, row) in self.rows.iter().enumerate() {
            if let (Some(first), Some(last)) = (row.first(), row.last()) {
                let y = self.y0 + i as i32;
                let r = IRect::new(first.0, y, last.1, y + 1);
                bounds = Some(bounds.map_or(r, |b| b.union(&r)));
            }
        }

        bounds
    }

    fn row(&self, y: i32) -> &[Span] {
        let i = i64::from(y) - i64::from(self.y0);

        if i < 0 {
            &[]
        } else {
            self.rows.get(i as usize).map(Vec::as_slice).unwrap_or(&[])
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let row = self.row(y);

        match row.binary_search_by(|&(x0, _)| x0.cmp(&x)) {
            Ok(_) => true,
            Err(0) => false,
            Err(i) => x < row[i - 1].1,
        }
    }

    /// Combines two regions with a boolean operator.
    pub fn op(&self, other: &Region, op: BooleanOp) -> Region {
        let (ys, ye) = match (self.row_range(), other.row_range()) {
            (None, None) => return Region::empty(),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (Some(a), Some(b)) => (a.0.min(b.0), a.1.max(b.1)),
        };

        let rows = (ys..ye)
            .map(|y| combine_rows(self.row(y), other.row(y), op))
            .collect();

        let mut region = Region { y0: ys, rows };
        region.trim();
        region
    }

    fn row_range(&self) -> Option<(i32, i32)> {
        if self.rows.is_empty() {
            None
        } else {
            Some((self.y0, self.y0 + self.rows.len() as i32))
        }
    }

    fn trim(&mut self) {
        while self.rows.last().map_or(false, |r| r.is_empty()) {
            self.rows.pop();
        }

        let leading = self.rows.iter().take_while(|r| r.is_empty()).count();
        self.rows.drain(..leading);
        self.y0 += leading as i32;
    }

    /// Outline of the region, as a union of rectangles.
    ///
    /// Runs of rows with identical spans become a single rectangle per span.
    pub fn boundary_path(&self) -> Path {
        let mut builder = PathBuilder::new();

        let mut i = 0;
        while i < self.rows.len() {
            let mut j = i + 1;
            while j < self.rows.len() && self.rows[j] == self.rows[i] {
                j += 1;
            }

            let (top, bottom) = (self.y0 + i as i32, self.y0 + j as i32);

            for &(x0, x1) in &self.rows[i] {
                builder.rect(
                    f64::from(x0),
                    f64::from(top),
                    f64::from(x1 - x0),
                    f64::from(bottom - top),
                );
            }

            i = j;
        }

        builder.into_path()
    }
}

/// Rows covered by `clip`, or `None` if it has too many pixels.
fn row_count(clip: IRect) -> Option<usize> {
    if clip.is_empty() {
        return Some(0);
    }

    if clip.area()? > MAX_REGION_AREA {
        return None;
    }

    usize::try_from(i64::from(clip.y1) - i64::from(clip.y0)).ok()
}

fn push_span(spans: &mut Vec<Span>, span: Span) {
    if span.0 >= span.1 {
        return;
    }

    match spans.last_mut() {
        Some(last) if last.1 >= span.0 => last.1 = last.1.max(span.1),
        _ => spans.push(span),
    }
}

fn covers(spans: &[Span], x: i32) -> bool {
    spans.iter().any(|&(x0, x1)| x0 <= x && x < x1)
}

fn combine_rows(a: &[Span], b: &[Span], op: BooleanOp) -> Vec<Span> {
    let mut xs: Vec<i32> = a.iter().chain(b.iter()).flat_map(|&(x0, x1)| [x0, x1]).collect();
    xs.sort_unstable();
    xs.dedup();

    let mut spans = Vec::new();

    for w in xs.windows(2) {
        let (x0, x1) = (w[0], w[1]);
        if op.apply(covers(a, x0), covers(b, x0)) {
            push_span(&mut spans, (x0, x1));
        }
    }

    spans
}
