//! Units for the geometry of brushes and masks.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;

/// Whether lengths are in the user space of the referencing shape, or fractions of
/// its bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordUnits {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Parse for CoordUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<CoordUnits, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "userSpaceOnUse" => CoordUnits::UserSpaceOnUse,
            "objectBoundingBox" => CoordUnits::ObjectBoundingBox,
        )?)
    }
}

impl CoordUnits {
    /// Transform from these units to user space, given the referencing shape's bounds.
    ///
    /// Returns `None` for bounding-box units when the bounds are empty, since
    /// nothing can be mapped into them.
    pub fn to_user_space(self, bbox: Option<&Rect>) -> Option<Transform> {
        match self {
            CoordUnits::UserSpaceOnUse => Some(Transform::identity()),

            CoordUnits::ObjectBoundingBox => {
                let bbox = bbox?;
                if bbox.is_empty() {
                    None
                } else {
                    Some(Transform::from_row(
                        bbox.width(),
                        0.0,
                        0.0,
                        bbox.height(),
                        bbox.x0,
                        bbox.y0,
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coord_units() {
        assert_eq!(
            CoordUnits::parse_str("userSpaceOnUse").unwrap(),
            CoordUnits::UserSpaceOnUse
        );
        assert_eq!(
            CoordUnits::parse_str("objectBoundingBox").unwrap(),
            CoordUnits::ObjectBoundingBox
        );
        assert!(CoordUnits::parse_str("foo").is_err());
    }

    #[test]
    fn bounding_box_units_need_a_box() {
        let bbox = Rect::new(10.0, 20.0, 30.0, 60.0);
        let t = CoordUnits::ObjectBoundingBox.to_user_space(Some(&bbox)).unwrap();
        assert_eq!(t.transform_point(0.5, 0.5), (20.0, 40.0));

        assert!(CoordUnits::ObjectBoundingBox.to_user_space(None).is_none());
        assert!(CoordUnits::ObjectBoundingBox
            .to_user_space(Some(&Rect::new(0.0, 0.0, 0.0, 10.0)))
            .is_none());
    }
}
