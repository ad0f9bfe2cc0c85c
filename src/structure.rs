//! Structural elements: groups, documents, templates and their instances, and the
//! definition-only containers for clip paths and masks.

use std::rc::Rc;

use crate::aspect_ratio::AspectRatio;
use crate::coord_units::CoordUnits;
use crate::definitions::{AcquiredNodes, Definitions, Namespace};
use crate::drawing_ctx::DrawingCtx;
use crate::error::*;
use crate::glyph_context::{FontSize, GlyphContext};
use crate::length::*;
use crate::node::{Draw, Element, Node, NodeBorrow, NodeDraw};
use crate::properties::SpecifiedValues;
use crate::rect::Rect;
use crate::transform::{Transform, TransformPair};
use crate::viewbox::ViewBox;

/// A container that draws its children, optionally with its own font size.
///
/// Its presentation properties are inherited by the children.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Group {
    pub font: Option<FontSize>,
    pub values: SpecifiedValues,
}

impl Group {
    pub fn with_font(font: FontSize) -> Group {
        Group {
            font: Some(font),
            ..Group::default()
        }
    }

    pub fn with_values(mut self, values: SpecifiedValues) -> Group {
        self.values = values;
        self
    }
}

impl Draw for Group {
    fn draw(
        &self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        draw_ctx.with_values(&self.values, |dc| {
            dc.with_font(self.font, |dc| node.draw_children(acquired_nodes, dc, opacity))
        })
    }
}

/// Where the content of a document or symbol instance goes.
pub struct Layout {
    /// Clip rectangle, in the element's user space.
    pub clip: Option<Rect>,
    /// From the content's coordinates to the element's user space.
    pub content: TransformPair,
    /// Ambient context for the content.
    pub glyphs: GlyphContext,
}

/// A document: the root of a scene, or a sub-document nested in it.
///
/// A document maps its viewBox onto its element rectangle, clips to that rectangle,
/// and resolves names in its own [`Definitions`].
#[derive(Debug, Clone, PartialEq)]
pub struct Svg {
    pub x: Length<Horizontal>,
    pub y: Length<Vertical>,
    pub width: ULength<Horizontal>,
    pub height: ULength<Vertical>,
    pub view_box: Option<ViewBox>,
    pub aspect: AspectRatio,
}

impl Default for Svg {
    fn default() -> Svg {
        Svg {
            x: Length::px(0.0),
            y: Length::px(0.0),
            width: ULength::percent(100.0),
            height: ULength::percent(100.0),
            view_box: None,
            aspect: AspectRatio::default(),
        }
    }
}

impl Svg {
    pub fn new(width: ULength<Horizontal>, height: ULength<Vertical>) -> Svg {
        Svg {
            width,
            height,
            ..Svg::default()
        }
    }

    pub fn with_position(mut self, x: Length<Horizontal>, y: Length<Vertical>) -> Svg {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_view_box(mut self, view_box: ViewBox, aspect: AspectRatio) -> Svg {
        self.view_box = Some(view_box);
        self.aspect = aspect;
        self
    }

    /// Lays out the document against the enclosing viewport.
    ///
    /// Returns `None` if there is nothing to draw: the element rectangle or the
    /// viewBox is empty, or the viewBox transform is not invertible.
    pub fn layout(&self, glyphs: &GlyphContext) -> Option<Layout> {
        let rect = Rect::from_xywh(
            self.x.to_user(glyphs),
            self.y.to_user(glyphs),
            self.width.to_user(glyphs),
            self.height.to_user(glyphs),
        );

        if rect.is_empty() {
            return None;
        }

        let content = self
            .aspect
            .viewport_to_viewbox_transform(self.view_box, &rect)
            .ok()
            .flatten()?;

        let (w, h) = self.view_box.map_or(rect.size(), |vb| vb.size());

        Some(Layout {
            clip: Some(rect),
            content: TransformPair::new(content),
            glyphs: glyphs.nested(w, h),
        })
    }
}

impl Draw for Svg {
    fn draw(
        &self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        let layout = match self.layout(draw_ctx.glyphs()) {
            Some(layout) => layout,
            None => {
                scene_log!(draw_ctx.session(), "{}: empty viewport, nothing to draw", *node.borrow());
                return Ok(None);
            }
        };

        let definitions = Rc::new(Definitions::collect(node));

        {
            let data = node.borrow();
            data.cache_mut().definitions = Some(definitions.clone());
        }

        let content = layout.content.forward();
        let clip = layout.clip;

        let (bbox, responsible) = draw_ctx.with_nested_document(layout.glyphs, |dc| {
            if let Some(ref clip) = clip {
                dc.clip_to_rect(clip);
            }
            dc.concat(&content);

            acquired_nodes.with_definitions(definitions, |an| node.draw_children(an, dc, opacity))
        });

        {
            let data = node.borrow();
            let own = data.is_responsible();
            data.cache_mut().responsible = responsible || own;
        }

        let bbox = bbox?.map(|r| content.transform_rect(&r));

        Ok(match (bbox, clip) {
            (Some(r), Some(clip)) => r.intersection(&clip),
            (bbox, _) => bbox,
        })
    }
}

/// A template with its own viewBox, drawn only through a [`Use`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Symbol {
    pub view_box: Option<ViewBox>,
    pub aspect: AspectRatio,
}

impl Symbol {
    pub fn new(view_box: ViewBox, aspect: AspectRatio) -> Symbol {
        Symbol {
            view_box: Some(view_box),
            aspect,
        }
    }

    /// Lays out an instance of the symbol with the given size.
    ///
    /// The content's percentages resolve against the viewBox if there is one, or
    /// against the instance's size otherwise.
    pub fn layout(&self, width: f64, height: f64, glyphs: &GlyphContext) -> Option<Layout> {
        let rect = Rect::from_size(width, height);

        match self.view_box {
            None => Some(Layout {
                clip: None,
                content: TransformPair::default(),
                glyphs: glyphs.resized(width, height),
            }),

            Some(vbox) => {
                let content = self
                    .aspect
                    .viewport_to_viewbox_transform(Some(vbox), &rect)
                    .ok()
                    .flatten()?;

                Some(Layout {
                    clip: Some(rect),
                    content: TransformPair::new(content),
                    glyphs: glyphs.resized(vbox.width(), vbox.height()),
                })
            }
        }
    }
}

/// An instance of a template, drawn as if the template were inlined here.
///
/// The template inherits the instance's presentation properties, so instances of
/// one template can paint differently.
#[derive(Debug, Clone, PartialEq)]
pub struct Use {
    href: String,
    pub x: Length<Horizontal>,
    pub y: Length<Vertical>,
    pub width: Option<ULength<Horizontal>>,
    pub height: Option<ULength<Vertical>>,
    pub values: SpecifiedValues,
}

impl Use {
    /// Creates an instance of the template with the given name; a leading `#` is ignored.
    pub fn new(href: &str) -> Use {
        Use {
            href: href.strip_prefix('#').unwrap_or(href).to_string(),
            x: Length::px(0.0),
            y: Length::px(0.0),
            width: None,
            height: None,
            values: SpecifiedValues::default(),
        }
    }

    pub fn with_values(mut self, values: SpecifiedValues) -> Use {
        self.values = values;
        self
    }

    pub fn with_position(mut self, x: Length<Horizontal>, y: Length<Vertical>) -> Use {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_size(mut self, width: ULength<Horizontal>, height: ULength<Vertical>) -> Use {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn offset(&self, glyphs: &GlyphContext) -> (f64, f64) {
        (self.x.to_user(glyphs), self.y.to_user(glyphs))
    }

    /// Size of a symbol instance; an absent dimension is 100% of the viewport.
    pub fn symbol_size(&self, glyphs: &GlyphContext) -> (f64, f64) {
        let width = self.width.unwrap_or_else(|| ULength::percent(100.0));
        let height = self.height.unwrap_or_else(|| ULength::percent(100.0));

        (width.to_user(glyphs), height.to_user(glyphs))
    }
}

impl Draw for Use {
    fn draw(
        &self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        let (dx, dy) = self.offset(draw_ctx.glyphs());
        let offset = Transform::new_translate(dx, dy);

        let acquired = match acquired_nodes.acquire(Namespace::Template, &self.href) {
            Ok(acquired) => acquired,

            Err(AcquireError::MaxReferencesExceeded) => {
                return Err(RenderingError::LimitExceeded(
                    ImplementationLimit::TooManyReferencedElements,
                ));
            }

            Err(e) => {
                scene_log!(
                    draw_ctx.session(),
                    "{}: could not use template \"{}\": {}",
                    *node.borrow(),
                    self.href,
                    e
                );
                return Ok(None);
            }
        };

        let template = acquired.get();
        let is_symbol = matches!(*template.borrow_element(), Element::Symbol(_));

        let bbox = draw_ctx.with_values(&self.values, |dc| {
            dc.with_saved_state(|dc| {
                dc.concat(&offset);

                if is_symbol {
                    let (width, height) = self.symbol_size(dc.glyphs());

                    dc.draw_node_envelope(template, acquired_nodes, opacity, |dc, an, opacity| {
                        draw_symbol_instance(template, width, height, an, dc, opacity)
                    })
                } else {
                    dc.draw_node_from_stack(template, acquired_nodes, opacity)
                }
            })
        })?;

        Ok(bbox.map(|r| offset.transform_rect(&r)))
    }
}

fn draw_symbol_instance(
    symbol_node: &Node,
    width: f64,
    height: f64,
    acquired_nodes: &mut AcquiredNodes,
    draw_ctx: &mut DrawingCtx<'_>,
    opacity: f64,
) -> Result<Option<Rect>, RenderingError> {
    let layout = match *symbol_node.borrow_element() {
        Element::Symbol(ref symbol) => symbol.layout(width, height, draw_ctx.glyphs()),
        _ => None,
    };

    let layout = match layout {
        Some(layout) => layout,
        None => return Ok(None),
    };

    let content = layout.content.forward();
    let clip = layout.clip;

    let bbox = draw_ctx.with_glyphs(layout.glyphs, |dc| {
        if let Some(ref clip) = clip {
            dc.clip_to_rect(clip);
        }
        dc.concat(&content);

        symbol_node.draw_children(acquired_nodes, dc, opacity)
    })?;

    Ok(bbox.map(|r| content.transform_rect(&r)))
}

/// A container for definitions; it never draws.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Defs;

/// The union of its children's outlines is used to clip other nodes.
///
/// The clip outline is in the user space of the node that references it, with the
/// clip path node's own transform applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClipPath;

/// Modulates other nodes by the luminance of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub units: CoordUnits,
    pub content_units: CoordUnits,
    pub x: Length<Horizontal>,
    pub y: Length<Vertical>,
    pub width: ULength<Horizontal>,
    pub height: ULength<Vertical>,
}

impl Default for Mask {
    fn default() -> Mask {
        Mask {
            units: CoordUnits::ObjectBoundingBox,
            content_units: CoordUnits::UserSpaceOnUse,
            x: Length::percent(-10.0),
            y: Length::percent(-10.0),
            width: ULength::percent(120.0),
            height: ULength::percent(120.0),
        }
    }
}

impl Mask {
    /// A mask with the given rectangle in user space.
    pub fn user_space(
        x: Length<Horizontal>,
        y: Length<Vertical>,
        width: ULength<Horizontal>,
        height: ULength<Vertical>,
    ) -> Mask {
        Mask {
            units: CoordUnits::UserSpaceOnUse,
            content_units: CoordUnits::UserSpaceOnUse,
            x,
            y,
            width,
            height,
        }
    }

    pub fn with_content_units(mut self, units: CoordUnits) -> Mask {
        self.content_units = units;
        self
    }

    /// The area where the mask applies, in the masked node's user space.
    pub fn rect(&self, bbox: Option<&Rect>, glyphs: &GlyphContext) -> Option<Rect> {
        let to_user = self.units.to_user_space(bbox)?;

        let glyphs = match self.units {
            CoordUnits::UserSpaceOnUse => glyphs.clone(),
            CoordUnits::ObjectBoundingBox => glyphs.resized(1.0, 1.0),
        };

        let rect = to_user.transform_rect(&Rect::from_xywh(
            self.x.to_user(&glyphs),
            self.y.to_user(&glyphs),
            self.width.to_user(&glyphs),
            self.height.to_user(&glyphs),
        ));

        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }

    /// From the coordinates of the mask's children to the masked node's user space.
    pub fn content_transform(&self, bbox: Option<&Rect>) -> Option<Transform> {
        self.content_units.to_user_space(bbox)
    }
}
