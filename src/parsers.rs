//! Parsing of attribute-like strings on top of `cssparser`.

use cssparser::{Parser, ParserInput};

use crate::error::*;

/// A value that can be read from CSS tokens.
pub trait Parse: Sized {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>>;

    /// Parses the whole of `s`; trailing tokens are an error.
    fn parse_str(s: &str) -> Result<Self, ParseError<'_>> {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        let value = Self::parse(&mut parser)?;
        parser.expect_exhausted()?;
        Ok(value)
    }
}

/// Skips a comma separator if one is next.
pub fn optional_comma(parser: &mut Parser<'_, '_>) {
    let _ = parser.try_parse(|p| p.expect_comma());
}

/// Rejects the infinities that `cssparser` produces for out-of-range numbers.
pub fn finite_f32(n: f32) -> Result<f32, ValueErrorKind> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ValueErrorKind::value_error("expected finite number"))
    }
}

impl Parse for f64 {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<f64, ParseError<'i>> {
        let loc = parser.current_source_location();
        let n = parser.expect_number()?;

        finite_f32(n)
            .map(f64::from)
            .map_err(|e| loc.new_custom_error(e))
    }
}

/// Matches the next identifier, ignoring ASCII case, against a list of keywords.
///
/// ```ignore
/// let units = parse_identifiers!(
///     parser,
///     "userSpaceOnUse" => CoordUnits::UserSpaceOnUse,
///     "objectBoundingBox" => CoordUnits::ObjectBoundingBox,
/// )?;
/// ```
#[macro_export]
macro_rules! parse_identifiers {
    ($parser:expr, $($keyword:expr => $value:expr,)+) => {{
        let loc = $parser.current_source_location();

        match $parser.next()? {
            $(cssparser::Token::Ident(ref ident) if ident.eq_ignore_ascii_case($keyword) => Ok($value),)+
            tok => Err(loc.new_basic_unexpected_token_error(tok.clone())),
        }
    }};
}
