//! Main SVG scene structure.

use std::cell::Cell;
use std::rc::Rc;

use cssparser::RGBA;
use tiny_skia::Pixmap;

use crate::definitions::{AcquiredNodes, Definitions, Namespace};
use crate::drawing_ctx::draw_tree;
use crate::error::RenderingError;
use crate::glyph_context::GlyphContext;
use crate::hit_test::{self, HitParams};
use crate::node::{invalidate_ancestors, Element, Node, NodeBorrow, NodeData, NodeId};
use crate::outline::{self, OutlineCtx, OutlineParams};
use crate::path::{FillRule, Path};
use crate::path_ops::BooleanOp;
use crate::properties::ComputedValues;
use crate::rect::{IRect, Rect};
use crate::session::Session;
use crate::transform::Transform;

/// The area a document is rendered into.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    /// Width in user units.
    pub width: f64,
    /// Height in user units.
    pub height: f64,
    /// Device pixels per user unit.
    pub scale: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scale: f64) -> Viewport {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };

        Viewport { width, height, scale }
    }

    /// The viewport that covers a whole surface.
    pub fn for_surface(surface: &Pixmap, scale: f64) -> Viewport {
        let v = Viewport::new(0.0, 0.0, scale);

        Viewport {
            width: f64::from(surface.width()) / v.scale,
            height: f64::from(surface.height()) / v.scale,
            ..v
        }
    }

    fn glyphs(&self) -> GlyphContext {
        GlyphContext::new(self.scale, self.width, self.height)
    }

    /// The device pixels covered by the viewport.
    fn window(&self) -> IRect {
        IRect::new(
            0,
            0,
            (self.width * self.scale).ceil() as i32,
            (self.height * self.scale).ceil() as i32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport::new(0.0, 0.0, 1.0)
    }
}

/// A scene: a tree of nodes whose root is a document node.
///
/// The document assigns node ids, renders the tree, and answers hit tests and client
/// rectangle queries with what the last render computed.  All mutations go through
/// it, so that cached geometry is invalidated synchronously.
pub struct Document {
    root: Node,

    session: Session,

    /// Bumped on every mutation; outlines cached under an older generation are stale.
    generation: Cell<u64>,

    next_id: Cell<u32>,

    /// What the last render used.
    viewport: Cell<Viewport>,
    params: Cell<OutlineParams>,

    /// What `currentColor` paints with where no node sets a color.
    current_color: Cell<RGBA>,
}

impl Document {
    pub fn root(&self) -> Node {
        self.root.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn current_color(&self) -> RGBA {
        self.current_color.get()
    }

    /// Sets the document's tint, the color that `currentColor` resolves to.
    ///
    /// Takes effect at the next render.
    pub fn set_current_color(&self, color: RGBA) {
        self.current_color.set(color);
    }

    /// Renders the whole tree onto `surface`.
    ///
    /// Definitions are collected afresh, and every node's cached client rectangle is
    /// updated.
    pub fn render(
        &self,
        surface: &mut Pixmap,
        viewport: Viewport,
        params: OutlineParams,
    ) -> Result<(), RenderingError> {
        self.viewport.set(viewport);
        self.params.set(params);

        draw_tree(
            &self.session,
            &self.root,
            surface,
            Transform::new_scale(viewport.scale, viewport.scale),
            viewport.glyphs(),
            ComputedValues::with_current_color(self.current_color.get()),
            params,
            self.generation.get(),
        )?;

        Ok(())
    }

    /// Finds the node under a point, in user units of the viewport.
    ///
    /// Returns the root's id if nothing responsible for events is there.
    pub fn hit_test(&self, x: f64, y: f64) -> NodeId {
        let viewport = self.viewport.get();

        let params = HitParams {
            glyphs: viewport.glyphs(),
            values: ComputedValues::with_current_color(self.current_color.get()),
            to_device: Transform::new_scale(viewport.scale, viewport.scale),
            window: viewport.window(),
            outline: self.params.get(),
            generation: self.generation.get(),
        };

        hit_test::hit_test(&self.root, x, y, &params)
    }

    /// The bounds of what a node drew in the last render, in its parent's user space.
    pub fn client_rect(&self, node: &Node) -> Option<Rect> {
        node.borrow().cache().client_rect
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<Node> {
        self.root.descendants().find(|n| n.node_id() == id)
    }

    /// Looks up a definition of the root document by name.
    pub fn lookup(&self, ns: Namespace, name: &str) -> Option<Node> {
        self.definitions_for(&self.root).lookup(ns, name)
    }

    /// Combines the outlines of a container's children with `op`.
    ///
    /// Lengths are resolved as in the last render.
    pub fn combined_outline(&self, node: &Node, op: BooleanOp) -> Rc<Path> {
        let mut acquired_nodes = AcquiredNodes::new(self.definitions_for(node));
        let (glyphs, fill_rule) = self.scope_for(node);

        let mut ctx = OutlineCtx {
            acquired_nodes: &mut acquired_nodes,
            glyphs,
            fill_rule,
            params: self.params.get(),
            generation: self.generation.get(),
        };

        outline::combined_outline(node, op, &mut ctx)
    }

    /// Definitions in scope for a node: those of its nearest enclosing document.
    fn definitions_for(&self, node: &Node) -> Rc<Definitions> {
        let document = node
            .ancestors()
            .find(|n| n.borrow_element().is_document())
            .unwrap_or_else(|| self.root.clone());

        let cached = document.borrow().cache().definitions.clone();
        cached.unwrap_or_else(|| Rc::new(Definitions::collect(&document)))
    }

    /// The glyph context and fill rule that the last render had in effect inside
    /// `node`'s parent.
    fn scope_for(&self, node: &Node) -> (GlyphContext, FillRule) {
        let mut glyphs = self.viewport.get().glyphs();
        let mut fill_rule = FillRule::default();

        let mut ancestors: Vec<Node> = node.ancestors().skip(1).collect();
        ancestors.reverse();

        for a in ancestors {
            match *a.borrow_element() {
                Element::Svg(ref svg) => {
                    if let Some(layout) = svg.layout(&glyphs) {
                        glyphs = layout.glyphs;
                    }
                }

                Element::Group(ref g) => {
                    glyphs.push_font(g.font);
                    fill_rule = g.values.fill_rule.compute(&fill_rule);
                }

                _ => (),
            }
        }

        (glyphs, fill_rule)
    }

    fn assign_ids(&self, node: &Node) {
        for n in node.descendants() {
            let id = NodeId(self.next_id.get());
            self.next_id.set(id.0 + 1);
            n.borrow_mut().set_id(id);
        }
    }

    /// Drops cached geometry of a node and its ancestors after a change to it.
    pub fn invalidate(&self, node: &Node) {
        self.generation.set(self.generation.get() + 1);
        invalidate_ancestors(node);
    }

    pub fn set_transform(&self, node: &Node, transform: Transform) {
        node.borrow_mut().set_transform(transform);
        self.invalidate(node);
    }

    pub fn set_opacity(&self, node: &Node, opacity: f64) {
        node.borrow_mut().set_opacity(opacity);
        self.invalidate(node);
    }

    pub fn set_responsible(&self, node: &Node, responsible: bool) {
        node.borrow_mut().set_responsible(responsible);
    }

    pub fn set_clip_path(&self, node: &Node, name: Option<&str>) {
        node.borrow_mut().set_clip_path(name);
        self.invalidate(node);
    }

    pub fn set_name(&self, node: &Node, name: Option<&str>) {
        node.borrow_mut().set_name(name);
        self.invalidate(node);
    }

    /// Changes what a node is, e.g. the geometry of a shape.
    pub fn update_element<R>(&self, node: &Node, f: impl FnOnce(&mut Element) -> R) -> R {
        let res = f(node.borrow_mut().element_mut());
        self.invalidate(node);
        res
    }

    /// Adds a node as the last child of `parent` and returns it.
    pub fn append(&self, parent: &Node, data: NodeData) -> Node {
        let node = Node::new(data);
        self.assign_ids(&node);
        parent.append(node.clone());
        self.invalidate(parent);
        node
    }

    /// Removes a node and its subtree from the document.
    pub fn detach(&self, node: &Node) {
        let parent = node.parent();
        node.detach();

        match parent {
            Some(parent) => self.invalidate(&parent),
            None => self.generation.set(self.generation.get() + 1),
        }
    }
}

/// Builds a [`Document`] from the top down.
pub struct DocumentBuilder {
    session: Session,
    root: Node,
    next_id: u32,
}

impl DocumentBuilder {
    /// Starts a document with the given root, which should be an `Svg` node.
    pub fn new(session: Session, mut root: NodeData) -> DocumentBuilder {
        root.set_id(NodeId(1));

        DocumentBuilder {
            session,
            root: Node::new(root),
            next_id: 2,
        }
    }

    pub fn root(&self) -> Node {
        self.root.clone()
    }

    pub fn append(&mut self, parent: &Node, mut data: NodeData) -> Node {
        data.set_id(NodeId(self.next_id));
        self.next_id += 1;

        let node = Node::new(data);
        parent.append(node.clone());
        node
    }

    pub fn build(self) -> Document {
        Document {
            root: self.root,
            session: self.session,
            generation: Cell::new(1),
            next_id: Cell::new(self.next_id),
            viewport: Cell::new(Viewport::default()),
            params: Cell::new(OutlineParams::default()),
            current_color: Cell::new(RGBA::new(0, 0, 0, 255)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use crate::structure::{Group, Svg};

    fn document() -> (Document, Node, Node) {
        let mut builder = DocumentBuilder::new(Session::new_for_test_suite(), NodeData::new(Svg::default()));
        let root = builder.root();
        let group = builder.append(&root, NodeData::new(Group::default()).with_name("g"));
        let shape = builder.append(&group, NodeData::new(Shape::rect_px(0.0, 0.0, 10.0, 10.0)));

        (builder.build(), group, shape)
    }

    #[test]
    fn ids_are_assigned_in_order() {
        let (doc, group, shape) = document();

        assert_eq!(doc.root().node_id(), NodeId(1));
        assert_eq!(group.node_id(), NodeId(2));
        assert_eq!(shape.node_id(), NodeId(3));

        let added = doc.append(&group, NodeData::new(Shape::rect_px(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(added.node_id(), NodeId(4));
        assert!(doc.node_by_id(NodeId(4)).unwrap() == added);
    }

    #[test]
    fn lookup_finds_definitions() {
        let (doc, group, _) = document();

        assert!(doc.lookup(Namespace::Template, "g").unwrap() == group);
        assert!(doc.lookup(Namespace::ClipPath, "g").is_none());
    }

    #[test]
    fn mutations_bump_generation_and_invalidate() {
        let (doc, group, shape) = document();
        let mut surface = Pixmap::new(20, 20).unwrap();
        let viewport = Viewport::for_surface(&surface, 1.0);
        doc.render(&mut surface, viewport, OutlineParams::default()).unwrap();

        assert!(doc.client_rect(&group).is_some());

        let generation = doc.generation();
        doc.set_transform(&shape, Transform::new_translate(5.0, 0.0));

        assert!(doc.generation() > generation);
        assert!(doc.client_rect(&group).is_none());
        assert!(doc.client_rect(&shape).is_none());
    }

    #[test]
    fn combined_outline_follows_mutations() {
        let (doc, group, shape) = document();

        let before = doc.combined_outline(&group, BooleanOp::Union);
        assert!(before.contains(5.0, 5.0, crate::path::FillRule::NonZero));

        doc.set_transform(&shape, Transform::new_translate(20.0, 0.0));

        let after = doc.combined_outline(&group, BooleanOp::Union);
        assert!(!after.contains(5.0, 5.0, crate::path::FillRule::NonZero));
        assert!(after.contains(25.0, 5.0, crate::path::FillRule::NonZero));
    }

    #[test]
    fn current_color_tints_the_render() {
        let mut builder = DocumentBuilder::new(Session::new_for_test_suite(), NodeData::new(Svg::default()));
        let root = builder.root();
        builder.append(
            &root,
            NodeData::new(Shape::rect_px(0.0, 0.0, 10.0, 10.0).with_fill(crate::paint_server::PaintServer::CurrentColor)),
        );
        let doc = builder.build();
        assert_eq!(doc.current_color(), RGBA::new(0, 0, 0, 255));

        doc.set_current_color(RGBA::new(0, 0, 255, 255));

        let mut surface = Pixmap::new(10, 10).unwrap();
        let viewport = Viewport::for_surface(&surface, 1.0);
        doc.render(&mut surface, viewport, OutlineParams::default()).unwrap();

        let p = surface.pixel(5, 5).unwrap();
        assert_eq!((p.red(), p.green(), p.blue(), p.alpha()), (0, 0, 255, 255));
    }

    #[test]
    fn viewport_window_covers_scaled_pixels() {
        assert_eq!(Viewport::new(10.5, 4.0, 2.0).window(), IRect::new(0, 0, 21, 8));
    }

    #[test]
    fn detached_nodes_are_gone() {
        let (doc, group, shape) = document();
        doc.detach(&shape);

        assert!(group.first_child().is_none());
        assert!(doc.node_by_id(NodeId(3)).is_none());
    }
}
