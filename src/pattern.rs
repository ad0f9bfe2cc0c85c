//! Pattern brushes.
//!
//! A pattern is a container whose children are drawn into a tile, and the tile
//! repeats over the filled area.  This module only computes the geometry of the
//! tile; [`DrawingCtx`](crate::drawing_ctx::DrawingCtx) renders it.

use crate::aspect_ratio::AspectRatio;
use crate::coord_units::CoordUnits;
use crate::glyph_context::GlyphContext;
use crate::length::*;
use crate::rect::Rect;
use crate::transform::Transform;
use crate::viewbox::ViewBox;

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub units: CoordUnits,
    pub content_units: CoordUnits,
    pub x: Length<Horizontal>,
    pub y: Length<Vertical>,
    pub width: ULength<Horizontal>,
    pub height: ULength<Vertical>,
    pub view_box: Option<ViewBox>,
    pub aspect: AspectRatio,
    pub transform: Transform,
}

impl Default for Pattern {
    fn default() -> Pattern {
        Pattern {
            units: CoordUnits::ObjectBoundingBox,
            content_units: CoordUnits::UserSpaceOnUse,
            x: Default::default(),
            y: Default::default(),
            width: Default::default(),
            height: Default::default(),
            view_box: None,
            aspect: AspectRatio::default(),
            transform: Transform::identity(),
        }
    }
}

/// A pattern tile resolved against the shape it fills.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PatternTile {
    /// The tile, in the pattern's coordinate space.
    pub rect: Rect,

    /// From the children's coordinates to the tile's, whose origin is the tile's
    /// top-left corner.
    pub content_transform: Transform,

    /// From the pattern's coordinate space to the user space of the shape.
    pub transform: Transform,
}

impl Pattern {
    pub fn new(
        x: Length<Horizontal>,
        y: Length<Vertical>,
        width: ULength<Horizontal>,
        height: ULength<Vertical>,
    ) -> Pattern {
        Pattern {
            x,
            y,
            width,
            height,
            ..Pattern::default()
        }
    }

    pub fn with_units(mut self, units: CoordUnits) -> Pattern {
        self.units = units;
        self
    }

    pub fn with_content_units(mut self, units: CoordUnits) -> Pattern {
        self.content_units = units;
        self
    }

    pub fn with_view_box(mut self, view_box: ViewBox, aspect: AspectRatio) -> Pattern {
        self.view_box = Some(view_box);
        self.aspect = aspect;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Pattern {
        self.transform = transform;
        self
    }

    /// Computes the tile for a shape with the given bounds.
    ///
    /// Returns `None` when the tile is empty or cannot be placed, in which case the
    /// pattern paints nothing.
    pub fn resolve_tile(&self, bbox: Option<&Rect>, ctx: &GlyphContext) -> Option<PatternTile> {
        let to_user = self.units.to_user_space(bbox)?;

        let ctx = match self.units {
            CoordUnits::UserSpaceOnUse => ctx.clone(),
            CoordUnits::ObjectBoundingBox => ctx.resized(1.0, 1.0),
        };

        let rect = to_user.transform_rect(&Rect::from_xywh(
            self.x.to_user(&ctx),
            self.y.to_user(&ctx),
            self.width.to_user(&ctx),
            self.height.to_user(&ctx),
        ));

        if rect.is_empty() || !self.transform.is_invertible() {
            return None;
        }

        let content_transform = if let Some(vbox) = self.view_box {
            self.aspect
                .viewport_to_viewbox_transform(Some(vbox), &Rect::from_size(rect.width(), rect.height()))
                .ok()
                .flatten()?
        } else {
            match self.content_units {
                CoordUnits::UserSpaceOnUse => Transform::identity(),
                CoordUnits::ObjectBoundingBox => {
                    let bbox = bbox?;
                    Transform::new_scale(bbox.width(), bbox.height())
                }
            }
        };

        Some(PatternTile {
            rect,
            content_transform,
            transform: self.transform,
        })
    }
}
