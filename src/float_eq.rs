//! Approximate comparisons at the precision of the rasterizer.

use float_cmp::{ApproxEq, F64Margin};

/// Checks whether two `f64` numbers are equal up to the precision that
/// matters for pixel output.
///
/// Geometry ends up as `f32` inside the rasterizer, so differences smaller
/// than `f32::EPSILON` relative to the magnitude of the numbers are
/// irrelevant.  A small absolute epsilon takes care of values around zero.
pub trait ApproxEqPx {
    fn approx_eq_px(self, other: Self) -> bool;
}

impl ApproxEqPx for f64 {
    fn approx_eq_px(self, other: f64) -> bool {
        self.approx_eq(
            other,
            F64Margin {
                epsilon: 1e-6,
                ulps: 4,
            },
        ) || (self - other).abs() <= f64::from(f32::EPSILON) * self.abs().max(other.abs())
    }
}

#[macro_export]
macro_rules! assert_approx_eq_px {
    ($left:expr, $right:expr) => {{
        match ($left, $right) {
            (l, r) => {
                if !$crate::float_eq::ApproxEqPx::approx_eq_px(l, r) {
                    panic!(
                        r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        l, r
                    )
                }
            }
        }
    }};
}
