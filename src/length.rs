//! Length values and their resolution against the ambient viewport and font.
//!
//! A length is a number plus a unit.  Percentages resolve against an extent of the
//! current viewport, `em` and `ex` against the current font size, and physical units
//! through fixed conversion factors at 90 user units per inch.
//!
//! [`CssLength`] carries an [`Orientation`] type parameter that says which extent of the
//! viewport a percentage refers to, and a [`Sign`] parameter for signedness.  For
//! example, a circle is declared as:
//!
//! ```
//! # use svgscene::{Length, ULength, Horizontal, Vertical, Both};
//! pub struct Circle {
//!     cx: Length<Horizontal>,
//!     cy: Length<Vertical>,
//!     r: ULength<Both>,
//! }
//! ```
//!
//! `cx="50%"` is half the viewport's width, `cy="30%"` is 30% of its height, and
//! a percentage radius is taken from the normalized diagonal.
//!
//! Resolution itself is the pure function [`resolve`]; [`CssLength::to_user`] feeds it
//! from a [`GlyphContext`].

use cssparser::{Parser, Token};
use std::f64::consts::*;
use std::marker::PhantomData;

use crate::error::*;
use crate::glyph_context::GlyphContext;
use crate::parsers::{finite_f32, Parse};

/// Unit of a length.  Physical units convert at 90 user units per inch.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum LengthUnit {
    /// Fraction of a viewport extent; `0.5` is `50%`.
    Percent,
    /// User units; also what unitless numbers mean.
    Px,
    /// Multiple of the current font size.
    Em,
    /// Taken as half an `em`.
    Ex,
    In,
    Cm,
    Mm,
    /// 1/72 inch.
    Pt,
    /// 12 points.
    Pc,
}

impl LengthUnit {
    fn from_suffix(suffix: &str) -> Option<LengthUnit> {
        const SUFFIXES: [(&str, LengthUnit); 8] = [
            ("px", LengthUnit::Px),
            ("em", LengthUnit::Em),
            ("ex", LengthUnit::Ex),
            ("in", LengthUnit::In),
            ("cm", LengthUnit::Cm),
            ("mm", LengthUnit::Mm),
            ("pt", LengthUnit::Pt),
            ("pc", LengthUnit::Pc),
        ];

        SUFFIXES
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(suffix))
            .map(|&(_, unit)| unit)
    }

    /// User units per unit, for the units that do not depend on context.
    fn user_units(self) -> Option<f64> {
        match self {
            LengthUnit::Px => Some(1.0),
            LengthUnit::In => Some(90.0),
            LengthUnit::Cm => Some(90.0 / 2.54),
            LengthUnit::Mm => Some(90.0 / 25.4),
            LengthUnit::Pt => Some(90.0 / 72.0),
            LengthUnit::Pc => Some(90.0 / 6.0),
            LengthUnit::Percent | LengthUnit::Em | LengthUnit::Ex => None,
        }
    }
}

/// A length with its unit, without any orientation attached.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct RawLength {
    pub length: f64,
    pub unit: LengthUnit,
}

impl RawLength {
    pub fn new(length: f64, unit: LengthUnit) -> RawLength {
        RawLength { length, unit }
    }
}

/// Resolves a length into user units.
///
/// * An absent length resolves to `offset`.
/// * Percentages are a fraction of `relative`, plus `offset`.
/// * `em` and `ex` are multiples of `font_size` (`ex` is half of it), scaled by `scale`.
/// * Physical units are converted at 90 user units per inch and scaled by `scale`.
///
/// This never fails; a non-finite result collapses to `offset`, or to 0 if
/// `offset` itself is not finite.
pub fn resolve(
    length: Option<RawLength>,
    relative: f64,
    offset: f64,
    scale: f64,
    font_size: f64,
) -> f64 {
    let length = match length {
        Some(l) => l,
        None => return offset,
    };

    let value = match length.unit {
        LengthUnit::Percent => length.length * relative + offset,
        LengthUnit::Em => length.length * font_size * scale + offset,
        LengthUnit::Ex => length.length * font_size / 2.0 * scale + offset,
        unit => {
            let factor = unit.user_units().unwrap_or(0.0);
            length.length * factor * scale + offset
        }
    };

    if value.is_finite() {
        value
    } else if offset.is_finite() {
        offset
    } else {
        0.0
    }
}

/// Which extent of the viewport a percentage refers to.
pub trait Orientation {
    fn extent(width: f64, height: f64) -> f64;
}

/// Percentages of the viewport width.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Horizontal;

/// Percentages of the viewport height.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Vertical;

/// Percentages of the normalized diagonal, `sqrt(w² + h²) / sqrt(2)`.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Both;

impl Orientation for Horizontal {
    fn extent(width: f64, _height: f64) -> f64 {
        width
    }
}

impl Orientation for Vertical {
    fn extent(_width: f64, height: f64) -> f64 {
        height
    }
}

impl Orientation for Both {
    fn extent(width: f64, height: f64) -> f64 {
        width.hypot(height) / SQRT_2
    }
}

/// Whether negative lengths are accepted by the parser.
pub trait Sign {
    const ALLOWS_NEGATIVE: bool;
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Signed;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Unsigned;

impl Sign for Signed {
    const ALLOWS_NEGATIVE: bool = true;
}

impl Sign for Unsigned {
    const ALLOWS_NEGATIVE: bool = false;
}

/// A length tagged with the viewport extent its percentages refer to, and with
/// whether it may be negative.
///
/// ```
/// # use svgscene::{Length, ULength, LengthUnit, Horizontal, Vertical, Both, Parse};
/// let width: Length<Horizontal> = Length::new(42.0, LengthUnit::Cm);
/// let height = Length::<Vertical>::new(42.0, LengthUnit::Cm);
/// let radius = ULength::<Both>::parse_str("5px").unwrap();
/// ```
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CssLength<O: Orientation, S: Sign> {
    pub length: f64,
    pub unit: LengthUnit,
    marker: PhantomData<(O, S)>,
}

impl<O: Orientation, S: Sign> CssLength<O, S> {
    pub fn new(length: f64, unit: LengthUnit) -> CssLength<O, S> {
        CssLength {
            length,
            unit,
            marker: PhantomData,
        }
    }

    /// Shorthand for a length in user units.
    pub fn px(length: f64) -> CssLength<O, S> {
        CssLength::new(length, LengthUnit::Px)
    }

    /// Shorthand for a percentage; `percent(50.0)` is `50%`.
    pub fn percent(p: f64) -> CssLength<O, S> {
        CssLength::new(p / 100.0, LengthUnit::Percent)
    }

    pub fn raw(&self) -> RawLength {
        RawLength::new(self.length, self.unit)
    }

    /// Resolves against the viewport and font size of `ctx`.
    pub fn to_user(&self, ctx: &GlyphContext) -> f64 {
        let (width, height) = ctx.viewport();

        resolve(Some(self.raw()), O::extent(width, height), 0.0, 1.0, ctx.font_size())
    }
}

impl<O: Orientation, S: Sign> Default for CssLength<O, S> {
    fn default() -> Self {
        CssLength::px(0.0)
    }
}

impl<O: Orientation, S: Sign> From<CssLength<O, S>> for RawLength {
    fn from(l: CssLength<O, S>) -> RawLength {
        l.raw()
    }
}

/// A number, a percentage or a number with one of the [`LengthUnit`] suffixes.
impl<O: Orientation, S: Sign> Parse for CssLength<O, S> {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<CssLength<O, S>, ParseError<'i>> {
        let loc = parser.current_source_location();

        let (value, unit) = match *parser.next()? {
            Token::Number { value, .. } => (value, LengthUnit::Px),
            Token::Percentage { unit_value, .. } => (unit_value, LengthUnit::Percent),
            Token::Dimension { value, ref unit, .. } => match LengthUnit::from_suffix(unit) {
                Some(u) => (value, u),
                None => {
                    return Err(loc.new_custom_error(ValueErrorKind::parse_error("unknown length unit")))
                }
            },
            ref tok => return Err(loc.new_unexpected_token_error(tok.clone())),
        };

        let value = f64::from(finite_f32(value).map_err(|e| loc.new_custom_error(e))?);

        if value < 0.0 && !S::ALLOWS_NEGATIVE {
            return Err(loc.new_custom_error(ValueErrorKind::value_error(
                "length must not be negative",
            )));
        }

        Ok(CssLength::new(value, unit))
    }
}

/// A length that may be negative, like a coordinate.
pub type Length<O> = CssLength<O, Signed>;

/// A length that may not be negative, like a width or a radius.
pub type ULength<O> = CssLength<O, Unsigned>;
