//! Fitting a viewBox into a destination rectangle.
//!
//! An [`AspectRatio`] is the pair of an alignment (`xMinYMin` .. `xMaxYMax`, or
//! `none`) and a fit mode (`meet` or `slice`).  It produces the transform that
//! maps viewBox coordinates onto the destination rectangle:
//!
//! ```
//! # use svgscene::{AspectRatio, Parse, Rect, ViewBox};
//! let ar = AspectRatio::parse_str("xMidYMid meet").unwrap();
//! let pair = ar.viewbox_transform(&ViewBox::new(0.0, 0.0, 100.0, 100.0), &Rect::from_size(50.0, 200.0));
//! assert_eq!(pair.forward().transform_point(0.0, 0.0), (0.0, 75.0));
//! ```

use cssparser::{BasicParseError, Parser};

use crate::error::*;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::{Transform, TransformPair};
use crate::viewbox::ViewBox;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale uniformly so the whole viewBox is visible; may letterbox.
    #[default]
    Meet,
    /// Scale uniformly so the destination is covered; may crop.
    Slice,
}

/// Anchor along one axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Align1D {
    Min,
    #[default]
    Mid,
    Max,
}

impl Align1D {
    fn from_keyword(s: &str) -> Option<Align1D> {
        match s {
            "Min" => Some(Align1D::Min),
            "Mid" => Some(Align1D::Mid),
            "Max" => Some(Align1D::Max),
            _ => None,
        }
    }

    /// How much of `slack`, the destination size minus the object size, goes
    /// before the object.
    fn lead(self, slack: f64) -> f64 {
        match self {
            Align1D::Min => 0.0,
            Align1D::Mid => slack / 2.0,
            Align1D::Max => slack,
        }
    }
}

/// The viewBox cannot be mapped to the viewport with an invertible transform.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("viewBox transform is not invertible")]
pub struct NonInvertibleTransform;

/// Alignment plus fit mode.
///
/// Without an alignment (`none`) each axis is scaled on its own and the fit
/// mode does not matter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    align: Option<(Align1D, Align1D)>,
    fit: FitMode,
}

/// `xMidYMid meet`
impl Default for AspectRatio {
    fn default() -> AspectRatio {
        AspectRatio::new(Align1D::Mid, Align1D::Mid, FitMode::Meet)
    }
}

impl AspectRatio {
    pub fn new(x: Align1D, y: Align1D, fit: FitMode) -> AspectRatio {
        AspectRatio {
            align: Some((x, y)),
            fit,
        }
    }

    /// Stretches each axis independently.
    pub fn none() -> AspectRatio {
        AspectRatio {
            align: None,
            fit: FitMode::Meet,
        }
    }

    pub fn is_slice(&self) -> bool {
        self.align.is_some() && self.fit == FitMode::Slice
    }

    /// Returns where the viewBox lands inside `viewport`.
    pub fn compute(&self, vbox: &ViewBox, viewport: &Rect) -> Rect {
        let (x, y) = match self.align {
            Some(align) => align,
            None => return *viewport,
        };

        let sx = viewport.width() / vbox.width();
        let sy = viewport.height() / vbox.height();

        let scale = match self.fit {
            FitMode::Meet => sx.min(sy),
            FitMode::Slice => sx.max(sy),
        };

        let (w, h) = (vbox.width() * scale, vbox.height() * scale);
        let left = viewport.x0 + x.lead(viewport.width() - w);
        let top = viewport.y0 + y.lead(viewport.height() - h);

        Rect::from_xywh(left, top, w, h)
    }

    /// Computes the viewport to viewbox transformation.
    ///
    /// `(vbox.x0, vbox.y0)` ends up at the aligned origin inside the viewport.
    /// Without a viewBox the result is a plain translation to the viewport's origin.
    ///
    /// Returns `Ok(None)` if the viewBox or the viewport are empty, since then there
    /// is nothing to draw, and `Err` if the result cannot be inverted.
    pub fn viewport_to_viewbox_transform(
        &self,
        vbox: Option<ViewBox>,
        viewport: &Rect,
    ) -> Result<Option<Transform>, NonInvertibleTransform> {
        if viewport.is_empty() || vbox.map_or(false, |v| v.is_empty()) {
            return Ok(None);
        }

        let transform = match vbox {
            None => Transform::new_translate(viewport.x0, viewport.y0),
            Some(vbox) => {
                let dest = self.compute(&vbox, viewport);

                Transform::new_translate(-vbox.x0, -vbox.y0)
                    .post_scale(dest.width() / vbox.width(), dest.height() / vbox.height())
                    .post_translate(dest.x0, dest.y0)
            }
        };

        if transform.is_invertible() {
            Ok(Some(transform))
        } else {
            Err(NonInvertibleTransform)
        }
    }

    /// Like [`viewport_to_viewbox_transform`](Self::viewport_to_viewbox_transform), but
    /// always produces a pair.
    ///
    /// Degenerate inputs yield a zero-scale forward transform whose inverse is absent,
    /// so callers must check [`TransformPair::is_invertible`] before mapping points back.
    pub fn viewbox_transform(&self, vbox: &ViewBox, viewport: &Rect) -> TransformPair {
        let forward = match self.viewport_to_viewbox_transform(Some(*vbox), viewport) {
            Ok(Some(t)) => t,
            Ok(None) | Err(_) => {
                Transform::new_scale(0.0, 0.0).post_translate(viewport.x0, viewport.y0)
            }
        };

        TransformPair::new(forward)
    }
}

/// Splits `xMinYMid` and the like into their two axes.
fn split_align(ident: &str) -> Option<(Align1D, Align1D)> {
    let x = ident.strip_prefix('x')?.get(..3)?;
    let y = ident.get(4..)?.strip_prefix('Y')?;

    if ident.len() != 8 {
        return None;
    }

    Some((Align1D::from_keyword(x)?, Align1D::from_keyword(y)?))
}

fn parse_fit_mode<'i>(parser: &mut Parser<'i, '_>) -> Result<FitMode, BasicParseError<'i>> {
    parse_identifiers!(
        parser,
        "meet" => FitMode::Meet,
        "slice" => FitMode::Slice,
    )
}

/// `none` or an alignment keyword, optionally followed by `meet` or `slice`.
impl Parse for AspectRatio {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<AspectRatio, ParseError<'i>> {
        let loc = parser.current_source_location();
        let ident = parser.expect_ident_cloned()?;

        let align = if &*ident == "none" {
            None
        } else {
            Some(split_align(&ident).ok_or_else(|| {
                loc.new_custom_error(ValueErrorKind::parse_error("expected none or xMinYMin..xMaxYMax"))
            })?)
        };

        let fit = parser.try_parse(parse_fit_mode).unwrap_or_default();

        Ok(AspectRatio { align, fit })
    }
}
