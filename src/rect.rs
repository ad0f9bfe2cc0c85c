//! Axis-aligned rectangles in user space (`Rect`) and on the pixel grid (`IRect`).

use std::ops::Range;

use float_cmp::approx_eq;
use num_traits::Num;

use crate::float_eq::ApproxEqPx;

/// A rectangle spanned by its top-left `(x0, y0)` and bottom-right `(x1, y1)`
/// corners.
///
/// Nothing keeps the corners ordered; constructors that take a size produce
/// inverted rectangles for negative sizes, which then count as empty.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle<T> {
    pub x0: T,
    pub y0: T,
    pub x1: T,
    pub y1: T,
}

pub type Rect = Rectangle<f64>;

pub type IRect = Rectangle<i32>;

fn lesser<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

fn greater<T: PartialOrd>(a: T, b: T) -> T {
    if b > a {
        b
    } else {
        a
    }
}

impl<T: Copy + PartialOrd + Num> Rectangle<T> {
    pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
        Rectangle { x0, y0, x1, y1 }
    }

    pub fn from_xywh(x: T, y: T, width: T, height: T) -> Self {
        Rectangle::new(x, y, x + width, y + height)
    }

    pub fn from_size(width: T, height: T) -> Self {
        Rectangle::from_xywh(T::zero(), T::zero(), width, height)
    }

    pub fn width(&self) -> T {
        self.x1 - self.x0
    }

    pub fn height(&self) -> T {
        self.y1 - self.y0
    }

    pub fn size(&self) -> (T, T) {
        (self.width(), self.height())
    }

    /// Rows covered by the rectangle.
    pub fn y_range(&self) -> Range<T> {
        self.y0..self.y1
    }

    /// Half-open containment: the left and top edges are inside, the right and
    /// bottom ones are not.
    pub fn contains(&self, x: T, y: T) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }

    /// Whether `other` lies entirely inside this rectangle, edges included.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    /// The common area, or `None` if the rectangles only touch or do not meet.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let r = Rectangle::new(
            greater(self.x0, other.x0),
            greater(self.y0, other.y0),
            lesser(self.x1, other.x1),
            lesser(self.y1, other.y1),
        );

        (r.x0 < r.x1 && r.y0 < r.y1).then_some(r)
    }

    /// The smallest rectangle enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        Rectangle::new(
            lesser(self.x0, other.x0),
            lesser(self.y0, other.y0),
            greater(self.x1, other.x1),
            greater(self.y1, other.y1),
        )
    }
}

impl IRect {
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Number of pixels covered, or `None` if that does not fit in an `i64`.
    pub fn area(&self) -> Option<i64> {
        if self.is_empty() {
            return Some(0);
        }

        let w = i64::from(self.x1) - i64::from(self.x0);
        let h = i64::from(self.y1) - i64::from(self.y0);
        w.checked_mul(h)
    }
}

impl Rect {
    /// Empty at pixel precision; rectangles thinner than that draw nothing.
    pub fn is_empty(&self) -> bool {
        let (w, h) = self.size();
        w <= 0.0 || h <= 0.0 || w.approx_eq_px(0.0) || h.approx_eq_px(0.0)
    }

    pub fn approx_eq(&self, other: &Rect) -> bool {
        [
            (self.x0, other.x0),
            (self.y0, other.y0),
            (self.x1, other.x1),
            (self.y1, other.y1),
        ]
        .iter()
        .all(|&(a, b)| approx_eq!(f64, a, b, epsilon = 0.0001))
    }

    /// Converts to the rasterizer's rectangle; `None` for empty or non-finite rectangles.
    pub fn to_skia(&self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_ltrb(self.x0 as f32, self.y0 as f32, self.x1 as f32, self.y1 as f32)
    }
}

/// The pixels touched by a rectangle; edges are rounded outwards.
impl From<Rect> for IRect {
    fn from(r: Rect) -> IRect {
        IRect::new(
            r.x0.floor() as i32,
            r.y0.floor() as i32,
            r.x1.ceil() as i32,
            r.y1.ceil() as i32,
        )
    }
}

impl From<IRect> for Rect {
    fn from(r: IRect) -> Rect {
        Rect::new(r.x0.into(), r.y0.into(), r.x1.into(), r.y1.into())
    }
}
