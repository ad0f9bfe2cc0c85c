//! The `viewBox` of nested documents and symbols.

use cssparser::Parser;
use std::ops::Deref;

use crate::error::*;
use crate::parsers::{optional_comma, Parse};
use crate::rect::Rect;

/// The declared inner coordinate rectangle of a document or symbol.
///
/// Derefs to [`Rect`], so `vbox.x0` or `vbox.width()` work directly.  A view box
/// with zero width or height is valid but disables rendering of its content.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewBox(Rect);

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> ViewBox {
        ViewBox(Rect::from_xywh(x, y, width, height))
    }
}

impl Deref for ViewBox {
    type Target = Rect;

    fn deref(&self) -> &Rect {
        &self.0
    }
}

impl From<Rect> for ViewBox {
    fn from(r: Rect) -> ViewBox {
        ViewBox(r)
    }
}

/// `min-x min-y width height`, separated by whitespace or commas.
impl Parse for ViewBox {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<ViewBox, ParseError<'i>> {
        let loc = parser.current_source_location();

        let mut v = [0.0; 4];
        for (i, slot) in v.iter_mut().enumerate() {
            if i > 0 {
                optional_comma(parser);
            }
            *slot = f64::parse(parser)?;
        }

        let [x, y, width, height] = v;

        if width < 0.0 || height < 0.0 {
            return Err(loc.new_custom_error(ValueErrorKind::value_error(
                "viewBox width and height must not be negative",
            )));
        }

        Ok(ViewBox::new(x, y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_commas_and_whitespace() {
        let expected = ViewBox::new(-5.0, 10.0, 200.0, 0.5);

        assert_eq!(ViewBox::parse_str("-5 10 200 0.5").unwrap(), expected);
        assert_eq!(ViewBox::parse_str("-5,10,2e2,.5").unwrap(), expected);
        assert_eq!(ViewBox::parse_str(" -5, 10 200 ,0.5 ").unwrap(), expected);
    }

    #[test]
    fn empty_sizes_are_allowed() {
        let vbox = ViewBox::parse_str("0 0 0 10").unwrap();
        assert_eq!(vbox.width(), 0.0);
        assert_eq!(vbox.height(), 10.0);
    }

    #[test]
    fn rejects_bad_view_boxes() {
        for s in &["", "1 2 3", "1 2 3 4 5", "0 0 -1 10", "0 0 10 -1", "a b c d", "1,,2 3 4", "0 0 1e400 1"] {
            assert!(ViewBox::parse_str(s).is_err(), "{}", s);
        }
    }
}
