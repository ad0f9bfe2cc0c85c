//! The main context structure which drives the drawing process.

use std::rc::Rc;

use tiny_skia::Pixmap;

use crate::definitions::{AcquiredNodes, Definitions, Namespace};
use crate::error::*;
use crate::glyph_context::{FontSize, GlyphContext};
use crate::limits;
use crate::node::{Element, Node, NodeBorrow, NodeDraw};
use crate::outline::{self, OutlineCtx, OutlineParams};
use crate::paint_server::{PaintSource, Pattern};
use crate::path::{FillRule, Path, PathBuilder};
use crate::properties::{ComputedValues, SpecifiedValues};
use crate::rect::Rect;
use crate::session::Session;
use crate::transform::Transform;

/// Drawing state that is saved and restored around every node.
#[derive(Clone)]
struct State {
    /// From the current user space to device pixels.
    transform: Transform,

    /// Coverage of the current clip, in device pixels; `None` means unclipped.
    clip: Option<Rc<tiny_skia::Mask>>,
}

/// Everything a render pass needs besides the tree and its definitions.
pub struct DrawingCtx<'a> {
    session: Session,

    surface: &'a mut Pixmap,

    /// Offscreen layers for masking; the last one is the current target.
    layers: Vec<Pixmap>,

    state: State,

    glyphs: GlyphContext,

    /// Presentation properties in effect for the node being drawn.
    values: ComputedValues,

    params: OutlineParams,

    generation: u64,

    /// Whether a node drawn in the current document claimed responsibility for events.
    responsible: bool,
}

/// The toplevel drawing routine.
///
/// This creates a `DrawingCtx` for `surface` and draws `node` with its whole envelope,
/// starting from `transform` as the mapping from `node`'s parent space to pixels and
/// from `values` as the inherited presentation properties.  Returns the node's client
/// rectangle.
pub fn draw_tree(
    session: &Session,
    node: &Node,
    surface: &mut Pixmap,
    transform: Transform,
    glyphs: GlyphContext,
    values: ComputedValues,
    params: OutlineParams,
    generation: u64,
) -> Result<Option<Rect>, RenderingError> {
    let mut acquired_nodes = AcquiredNodes::new(Rc::new(Definitions::new()));
    let mut draw_ctx = DrawingCtx::new(session.clone(), surface, transform, glyphs, values, params, generation);

    draw_ctx.draw_node_from_stack(node, &mut acquired_nodes, 1.0)
}

impl<'a> DrawingCtx<'a> {
    pub fn new(
        session: Session,
        surface: &'a mut Pixmap,
        transform: Transform,
        glyphs: GlyphContext,
        values: ComputedValues,
        params: OutlineParams,
        generation: u64,
    ) -> DrawingCtx<'a> {
        DrawingCtx {
            session,
            surface,
            layers: Vec::new(),
            state: State {
                transform,
                clip: None,
            },
            glyphs,
            values,
            params,
            generation,
            responsible: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn glyphs(&self) -> &GlyphContext {
        &self.glyphs
    }

    pub fn values(&self) -> &ComputedValues {
        &self.values
    }

    /// Runs `f` with `specified` folded into the inherited presentation properties.
    pub fn with_values<R>(&mut self, specified: &SpecifiedValues, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut values = self.values.clone();
        specified.to_computed_values(&mut values);

        let saved = std::mem::replace(&mut self.values, values);
        let res = f(self);
        self.values = saved;
        res
    }

    /// Runs `f` with the document defaults as the inherited properties.
    fn with_reset_values<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let values = self.values.reset();
        let saved = std::mem::replace(&mut self.values, values);
        let res = f(self);
        self.values = saved;
        res
    }

    /// The current mapping from user space to device pixels.
    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    /// Makes `t` the innermost transform of the current user space.
    pub fn concat(&mut self, t: &Transform) {
        self.state.transform = self.state.transform.pre_transform(t);
    }

    fn target(&mut self) -> &mut Pixmap {
        match self.layers.last_mut() {
            Some(layer) => layer,
            None => &mut *self.surface,
        }
    }

    /// Runs `f` and restores the transform and the clip afterwards.
    pub fn with_saved_state<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.state.clone();
        let res = f(self);
        self.state = saved;
        res
    }

    pub fn with_font<R>(&mut self, font: Option<FontSize>, f: impl FnOnce(&mut Self) -> R) -> R {
        let pushed = self.glyphs.push_font(font);
        let res = f(self);
        if pushed {
            self.glyphs.pop_font();
        }
        res
    }

    /// Runs `f` with a different glyph context, e.g. for a symbol instance.
    pub fn with_glyphs<R>(&mut self, glyphs: GlyphContext, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.glyphs, glyphs);
        let res = self.with_saved_state(f);
        self.glyphs = saved;
        res
    }

    /// Like [`with_glyphs`](Self::with_glyphs), but also tracks the responsible flag of
    /// the nested document separately.
    ///
    /// Returns whether a node inside the nested document claimed responsibility; that
    /// also marks the enclosing document as responsible.
    pub fn with_nested_document<R>(
        &mut self,
        glyphs: GlyphContext,
        f: impl FnOnce(&mut Self) -> R,
    ) -> (R, bool) {
        let saved = std::mem::replace(&mut self.responsible, false);
        let res = self.with_glyphs(glyphs, f);
        let inner = self.responsible;
        self.responsible = saved || inner;
        (res, inner)
    }

    pub fn fill_path(&mut self, path: &Path, rule: FillRule, source: &PaintSource) {
        let paint = match source.to_paint() {
            Some(paint) => paint,
            None => return,
        };

        let path = match path.to_skia() {
            Some(path) => path,
            None => return,
        };

        let transform = self.state.transform.to_skia();
        let clip = self.state.clip.clone();

        self.target()
            .fill_path(&path, &paint, rule.to_skia(), transform, clip.as_deref());
    }

    pub fn stroke_path(&mut self, path: &Path, width: f64, source: &PaintSource) {
        let paint = match source.to_paint() {
            Some(paint) => paint,
            None => return,
        };

        let path = match path.to_skia() {
            Some(path) => path,
            None => return,
        };

        let stroke = tiny_skia::Stroke {
            width: width as f32,
            ..Default::default()
        };

        let transform = self.state.transform.to_skia();
        let clip = self.state.clip.clone();

        self.target()
            .stroke_path(&path, &paint, &stroke, transform, clip.as_deref());
    }

    /// Intersects the current clip with a path in user space.
    ///
    /// An empty path clips everything away.
    pub fn clip_to_path(&mut self, path: &Path, rule: FillRule) {
        let transform = self.state.transform.to_skia();
        let skia_path = path.to_skia();

        let mask = match self.state.clip {
            Some(ref clip) => {
                let mut mask = tiny_skia::Mask::clone(clip);

                match skia_path {
                    Some(ref p) => mask.intersect_path(p, rule.to_skia(), true, transform),
                    None => mask.data_mut().fill(0),
                }

                mask
            }

            None => {
                let mut mask = match tiny_skia::Mask::new(self.surface.width(), self.surface.height()) {
                    Some(mask) => mask,
                    None => return,
                };

                if let Some(ref p) = skia_path {
                    mask.fill_path(p, rule.to_skia(), true, transform);
                }

                mask
            }
        };

        self.state.clip = Some(Rc::new(mask));
    }

    pub fn clip_to_rect(&mut self, rect: &Rect) {
        let mut builder = PathBuilder::new();
        builder.rect(rect.x0, rect.y0, rect.width(), rect.height());
        self.clip_to_path(&builder.into_path(), FillRule::NonZero);
    }

    /// Runs `f` with a fresh transparent layer as the drawing target, and returns the
    /// layer along with `f`'s result.
    ///
    /// Returns `None` for the layer if it could not be allocated; `f` then draws
    /// into the current target.
    fn with_layer<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> (R, Option<Pixmap>) {
        match Pixmap::new(self.surface.width(), self.surface.height()) {
            Some(layer) => {
                self.layers.push(layer);
                let res = f(self);
                (res, self.layers.pop())
            }

            None => (f(self), None),
        }
    }

    /// Draws a node as a child of the current node, with its full envelope.
    ///
    /// Definition-only nodes are skipped; they draw only when referenced.
    pub fn draw_node_from_stack(
        &mut self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        if node.borrow_element().is_definition_only() {
            return Ok(None);
        }

        self.draw_node_envelope(node, acquired_nodes, opacity, |dc, an, opacity| {
            node.draw(an, dc, opacity)
        })
    }

    /// Applies a node's transform, clip, mask and opacity around `draw_fn`.
    ///
    /// The node's client rectangle, in its parent's user space, is stored in its cache
    /// and returned.  Invisible nodes and nodes with a non-invertible transform draw
    /// nothing.
    pub fn draw_node_envelope(
        &mut self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        opacity: f64,
        draw_fn: impl FnOnce(&mut DrawingCtx<'a>, &mut AcquiredNodes, f64) -> Result<Option<Rect>, RenderingError>,
    ) -> Result<Option<Rect>, RenderingError> {
        let (transform, clip_path, clip_rule, mask, node_opacity, responsible) = {
            let data = node.borrow();
            (
                data.transform().forward(),
                data.clip_path().map(str::to_string),
                data.clip_rule(),
                data.mask().map(str::to_string),
                data.opacity(),
                data.is_responsible(),
            )
        };

        let opacity = opacity * node_opacity;

        if responsible {
            self.responsible = true;
        }

        if !transform.is_invertible() || opacity <= limits::MIN_OPACITY_FOR_DRAW {
            let data = node.borrow();
            data.cache_mut().client_rect = None;
            return Ok(None);
        }

        let bbox = self.with_saved_state(|dc| -> Result<Option<Rect>, RenderingError> {
            dc.concat(&transform);

            let clip = match clip_path {
                Some(ref name) => dc.resolve_clip(node, name, acquired_nodes)?,
                None => None,
            };

            if let Some(ref path) = clip {
                dc.clip_to_path(path, clip_rule);
            }

            let bbox = match mask {
                Some(ref name) => dc.draw_masked(node, name, acquired_nodes, opacity, draw_fn)?,
                None => draw_fn(dc, acquired_nodes, opacity)?,
            };

            Ok(match (bbox, clip) {
                (Some(r), Some(clip)) => clip.bounds().and_then(|c| r.intersection(&c)),
                (bbox, _) => bbox,
            })
        })?;

        let client_rect = bbox.map(|r| transform.transform_rect(&r));
        node.borrow().cache_mut().client_rect = client_rect;

        Ok(client_rect)
    }

    fn resolve_clip(
        &mut self,
        node: &Node,
        name: &str,
        acquired_nodes: &mut AcquiredNodes,
    ) -> Result<Option<Rc<Path>>, RenderingError> {
        match acquired_nodes.acquire(Namespace::ClipPath, name) {
            Ok(acquired) => {
                let mut ctx = OutlineCtx {
                    acquired_nodes,
                    glyphs: self.glyphs.clone(),
                    fill_rule: FillRule::default(),
                    params: self.params,
                    generation: self.generation,
                };

                Ok(Some(outline::clip_outline(acquired.get(), &mut ctx)))
            }

            Err(AcquireError::MaxReferencesExceeded) => Err(RenderingError::LimitExceeded(
                ImplementationLimit::TooManyReferencedElements,
            )),

            Err(e) => {
                scene_log!(self.session, "{}: ignoring clip path \"{}\": {}", *node.borrow(), name, e);
                Ok(None)
            }
        }
    }

    fn draw_masked(
        &mut self,
        node: &Node,
        name: &str,
        acquired_nodes: &mut AcquiredNodes,
        opacity: f64,
        draw_fn: impl FnOnce(&mut DrawingCtx<'a>, &mut AcquiredNodes, f64) -> Result<Option<Rect>, RenderingError>,
    ) -> Result<Option<Rect>, RenderingError> {
        let acquired = match acquired_nodes.acquire(Namespace::Mask, name) {
            Ok(acquired) => acquired,

            Err(AcquireError::MaxReferencesExceeded) => {
                return Err(RenderingError::LimitExceeded(
                    ImplementationLimit::TooManyReferencedElements,
                ));
            }

            Err(e) => {
                scene_log!(self.session, "{}: ignoring mask \"{}\": {}", *node.borrow(), name, e);
                return draw_fn(self, acquired_nodes, opacity);
            }
        };

        let mask_node = acquired.get();

        let mask = match *mask_node.borrow_element() {
            Element::Mask(ref m) => m.clone(),
            _ => return draw_fn(self, acquired_nodes, opacity),
        };

        let (bbox, content) = self.with_layer(|dc| draw_fn(dc, acquired_nodes, opacity));
        let bbox = bbox?;

        let content = match content {
            Some(content) => content,
            None => return Ok(bbox),
        };

        let rect = match mask.rect(bbox.as_ref(), &self.glyphs) {
            Some(rect) => rect,
            // the mask covers nothing, so nothing shows through
            None => return Ok(None),
        };

        let (res, luminance) = self.with_layer(|dc| {
            dc.with_saved_state(|dc| {
                dc.clip_to_rect(&rect);

                match mask.content_transform(bbox.as_ref()) {
                    Some(t) => {
                        dc.concat(&t);
                        dc.with_reset_values(|dc| mask_node.draw_children(acquired_nodes, dc, 1.0))
                    }

                    None => Ok(None),
                }
            })
        });
        res?;

        let luminance = match luminance {
            Some(luminance) => luminance,
            None => return Ok(bbox),
        };

        let coverage = tiny_skia::Mask::from_pixmap(luminance.as_ref(), tiny_skia::MaskType::Luminance);

        self.target().draw_pixmap(
            0,
            0,
            content.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            Some(&coverage),
        );

        Ok(bbox.and_then(|r| r.intersection(&rect)))
    }

    /// Renders the tile of a pattern brush for a shape with the given bounds.
    ///
    /// The tile is rendered at the device resolution of the current user space.
    /// Returns `None` if the pattern paints nothing.
    pub fn pattern_source(
        &mut self,
        node: &Node,
        pattern: &Pattern,
        acquired_nodes: &mut AcquiredNodes,
        bbox: Option<&Rect>,
        opacity: f64,
    ) -> Result<Option<PaintSource>, RenderingError> {
        let tile = match pattern.resolve_tile(bbox, &self.glyphs) {
            Some(tile) => tile,
            None => return Ok(None),
        };

        let to_device = self.state.transform.pre_transform(&tile.transform);
        let (sx, sy) = to_device.scale_factors();

        let width = (tile.rect.width() * sx).ceil();
        let height = (tile.rect.height() * sy).ceil();

        if !checked_surface_size(width, height) {
            scene_log!(self.session, "{}: pattern tile of {}x{} pixels is not drawable", *node.borrow(), width, height);
            return Ok(None);
        }

        let mut pixmap = match Pixmap::new(width as u32, height as u32) {
            Some(pixmap) => pixmap,
            None => return Ok(None),
        };

        let (tile_sx, tile_sy) = (width / tile.rect.width(), height / tile.rect.height());

        {
            let content = tile.content_transform.post_scale(tile_sx, tile_sy);

            let mut tile_ctx = DrawingCtx::new(
                self.session.clone(),
                &mut pixmap,
                content,
                self.glyphs.clone(),
                self.values.reset(),
                self.params,
                self.generation,
            );

            node.draw_children(acquired_nodes, &mut tile_ctx, 1.0)?;
        }

        let paint_transform = Transform::new_scale(1.0 / tile_sx, 1.0 / tile_sy)
            .post_translate(tile.rect.x0, tile.rect.y0)
            .then(&tile.transform);

        Ok(Some(PaintSource::Tile {
            pixmap,
            transform: paint_transform.to_skia(),
            opacity: opacity.clamp(0.0, 1.0) as f32,
        }))
    }
}

/// Whether a surface of this size can be allocated.
///
/// Rejects NaN, sizes below one pixel, and sizes so large that their area overflows
/// any reasonable allocation.
pub fn checked_surface_size(width: f64, height: f64) -> bool {
    width.is_finite()
        && height.is_finite()
        && width >= 1.0
        && height >= 1.0
        && width.log10() + height.log10() <= limits::MAX_SURFACE_LOG10_AREA
        && width <= f64::from(i32::MAX)
        && height <= f64::from(i32::MAX)
}
