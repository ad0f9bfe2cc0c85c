//! Combined outlines of subtrees, for clipping and path algebra.
//!
//! The outline of a container is built by combining the outlines of its children
//! with one boolean operator: the first drawable child seeds the result and every
//! following child is combined into it.  Each child's own transform is applied
//! before combining, and nested containers recurse with the same operator.
//!
//! Two backends compute the boolean operations.  [`BooleanBackend::Vector`] works
//! on the paths directly.  [`BooleanBackend::Region`] rasterizes both operands into
//! scanline regions, combines those, and traces the result back into a path; its
//! results agree with the vector backend up to the rasterization resolution.

use std::rc::Rc;

use crate::definitions::{AcquiredNodes, Definitions, Namespace};
use crate::glyph_context::GlyphContext;
use crate::limits::MAX_REGION_AREA;
use crate::node::{Element, Node, NodeBorrow};
use crate::path::{FillRule, Path};
use crate::path_ops::{self, BooleanOp};
use crate::properties::SpecifiedValues;
use crate::rect::{IRect, Rect};
use crate::region::Region;
use crate::transform::Transform;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BooleanBackend {
    /// Boolean operations on the paths themselves.
    #[default]
    Vector,
    /// Boolean operations on rasterized scanline regions.
    Region,
}

/// How outlines are combined.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutlineParams {
    pub backend: BooleanBackend,
    /// Pixels per user unit for the region backend.
    pub resolution: f64,
}

impl Default for OutlineParams {
    fn default() -> OutlineParams {
        OutlineParams {
            backend: BooleanBackend::default(),
            resolution: 1.0,
        }
    }
}

impl OutlineParams {
    /// The resolution, sanitized for use as a scale factor.
    pub fn scale(&self) -> f64 {
        if self.resolution.is_finite() && self.resolution > 0.0 {
            self.resolution
        } else {
            1.0
        }
    }
}

/// Everything a cached outline depends on besides the subtree itself.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct OutlineKey {
    generation: u64,
    op: BooleanOp,
    backend: BooleanBackend,
    resolution: f64,
    viewport: (f64, f64),
    font_size: f64,
    fill_rule: FillRule,
}

/// State threaded through an outline computation.
pub struct OutlineCtx<'a> {
    pub acquired_nodes: &'a mut AcquiredNodes,
    pub glyphs: GlyphContext,
    /// Inherited fill rule for shapes that do not set their own.
    pub fill_rule: FillRule,
    pub params: OutlineParams,
    /// Document generation; outlines cached under an older one are stale.
    pub generation: u64,
}

impl<'a> OutlineCtx<'a> {
    fn key(&self, op: BooleanOp) -> OutlineKey {
        OutlineKey {
            generation: self.generation,
            op,
            backend: self.params.backend,
            resolution: self.params.resolution,
            viewport: self.glyphs.viewport(),
            font_size: self.glyphs.font_size(),
            fill_rule: self.fill_rule,
        }
    }

    fn with_scope<R>(
        &mut self,
        glyphs: GlyphContext,
        definitions: Option<Rc<Definitions>>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved_glyphs = std::mem::replace(&mut self.glyphs, glyphs);
        let saved_defs = definitions.map(|d| self.acquired_nodes.set_definitions(d));

        let res = f(self);

        if let Some(defs) = saved_defs {
            self.acquired_nodes.set_definitions(defs);
        }
        self.glyphs = saved_glyphs;

        res
    }

    fn with_fill_rule<R>(&mut self, values: &SpecifiedValues, f: impl FnOnce(&mut Self) -> R) -> R {
        let rule = values.fill_rule.compute(&self.fill_rule);
        let saved = std::mem::replace(&mut self.fill_rule, rule);
        let res = f(self);
        self.fill_rule = saved;
        res
    }
}

/// Combines the outlines of the children of `node` with `op`.
///
/// The result is in the user space of `node`'s content, i.e. without `node`'s own
/// transform.  A container without drawable children has an empty outline.
pub fn combined_outline(node: &Node, op: BooleanOp, ctx: &mut OutlineCtx<'_>) -> Rc<Path> {
    let (font, fill_rule) = match *node.borrow_element() {
        Element::Group(ref g) => (g.font, g.values.fill_rule.compute(&ctx.fill_rule)),
        _ => (None, ctx.fill_rule),
    };

    let pushed = ctx.glyphs.push_font(font);
    let saved_rule = std::mem::replace(&mut ctx.fill_rule, fill_rule);
    let key = ctx.key(op);

    let cached = {
        let data = node.borrow();
        let cache = data.cache();
        match cache.outline {
            Some((k, ref path)) if k == key => Some(path.clone()),
            _ => None,
        }
    };

    let path = match cached {
        Some(path) => path,

        None => {
            let mut acc: Option<(Path, FillRule)> = None;

            for child in node.children() {
                if let Some(operand) = child_outline(&child, op, ctx) {
                    acc = Some(match acc {
                        None => operand,
                        Some(a) => (combine(&a, &operand, op, &ctx.params), FillRule::NonZero),
                    });
                }
            }

            let path = Rc::new(match acc {
                Some((path, FillRule::NonZero)) => path,
                Some((path, rule)) => combine(&(path, rule), &(Path::new(), rule), BooleanOp::Union, &ctx.params),
                None => Path::new(),
            });

            node.borrow().cache_mut().outline = Some((key, path.clone()));
            path
        }
    };

    ctx.fill_rule = saved_rule;
    if pushed {
        ctx.glyphs.pop_font();
    }

    path
}

/// The outline of a clip path node, in the user space where it is applied.
///
/// The result is cached on the clip node, so repeated calls return the same `Rc`
/// until the clip's content changes.
pub fn clip_outline(clip_node: &Node, ctx: &mut OutlineCtx<'_>) -> Rc<Path> {
    let transform = clip_node.borrow().transform().forward();
    let outline = combined_outline(clip_node, BooleanOp::Union, ctx);

    if transform == Transform::identity() {
        return outline;
    }

    let data = clip_node.borrow();
    let mut cache = data.cache_mut();

    if let Some((ref from, ref path)) = cache.clip_outline {
        if Rc::ptr_eq(from, &outline) {
            return path.clone();
        }
    }

    let path = Rc::new(if transform.is_invertible() {
        outline.transform(&transform)
    } else {
        Path::new()
    });

    cache.clip_outline = Some((outline, path.clone()));
    path
}

/// Outline of one child in its parent's user space, with its fill rule.
fn child_outline(child: &Node, op: BooleanOp, ctx: &mut OutlineCtx<'_>) -> Option<(Path, FillRule)> {
    let data = child.borrow();

    if !data.transform().is_invertible() {
        return None;
    }

    let (path, rule) = match *data.element() {
        Element::Shape(ref shape) => (
            shape.outline(&ctx.glyphs),
            shape.values.fill_rule.compute(&ctx.fill_rule),
        ),

        Element::Group(_) => (Path::clone(&combined_outline(child, op, ctx)), FillRule::NonZero),

        Element::Svg(ref svg) => {
            let layout = svg.layout(&ctx.glyphs)?;
            let defs = data
                .cache()
                .definitions
                .clone()
                .unwrap_or_else(|| Rc::new(Definitions::collect(child)));

            let inner = ctx.with_scope(layout.glyphs, Some(defs), |ctx| combined_outline(child, op, ctx));
            (inner.transform(&layout.content.forward()), FillRule::NonZero)
        }

        Element::Use(ref u) => {
            let (dx, dy) = u.offset(&ctx.glyphs);

            let acquired = ctx.acquired_nodes.acquire(Namespace::Template, u.href()).ok()?;
            let template = acquired.get();
            let tdata = template.borrow();

            let (path, rule) = ctx.with_fill_rule(&u.values, |ctx| match *tdata.element() {
                Element::Symbol(ref symbol) => {
                    if !tdata.transform().is_invertible() {
                        return None;
                    }

                    let (w, h) = u.symbol_size(&ctx.glyphs);
                    let layout = symbol.layout(w, h, &ctx.glyphs)?;
                    let inner = ctx.with_scope(layout.glyphs, None, |ctx| combined_outline(template, op, ctx));

                    let to_user = tdata.transform().forward().pre_transform(&layout.content.forward());
                    Some((inner.transform(&to_user), FillRule::NonZero))
                }

                _ => child_outline(template, op, ctx),
            })?;

            (path.transform(&Transform::new_translate(dx, dy)), rule)
        }

        _ => return None,
    };

    Some((path.transform(&data.transform().forward()), rule))
}

/// Combines two filled outlines with the configured backend.
pub fn combine(a: &(Path, FillRule), b: &(Path, FillRule), op: BooleanOp, params: &OutlineParams) -> Path {
    match params.backend {
        BooleanBackend::Vector => path_ops::boolean_op(&a.0, a.1, &b.0, b.1, op),

        BooleanBackend::Region => {
            region_op(a, b, op, params.scale()).unwrap_or_else(|| path_ops::boolean_op(&a.0, a.1, &b.0, b.1, op))
        }
    }
}

/// Region backend; `None` if the operands are too large to rasterize.
fn region_op(a: &(Path, FillRule), b: &(Path, FillRule), op: BooleanOp, scale: f64) -> Option<Path> {
    let to_pixels = Transform::new_scale(scale, scale);
    let pa = a.0.transform(&to_pixels);
    let pb = b.0.transform(&to_pixels);

    let bounds = match (pa.bounds(), pb.bounds()) {
        (None, None) => return Some(Path::new()),
        (Some(r), None) | (None, Some(r)) => r,
        (Some(r1), Some(r2)) => r1.union(&r2),
    };

    if !(bounds.width() * bounds.height() <= MAX_REGION_AREA as f64) {
        return None;
    }

    let clip = IRect::from(Rect::new(
        bounds.x0 - 1.0,
        bounds.y0 - 1.0,
        bounds.x1 + 1.0,
        bounds.y1 + 1.0,
    ));

    let ra = Region::from_path(&pa, a.1, clip)?;
    let rb = Region::from_path(&pb, b.1, clip)?;

    Some(
        ra.op(&rb, op)
            .boundary_path()
            .transform(&Transform::new_scale(1.0 / scale, 1.0 / scale)),
    )
}
