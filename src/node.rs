//! Scene nodes.
//!
//! The scene is a tree built with the [rctree crate][rctree].  Its [`rctree::Node`]
//! struct provides a generic wrapper over nodes in a tree; we put a [`NodeData`] as
//! its type parameter and use the type alias [`Node`]` = rctree::Node<NodeData>`.
//!
//! Every node has the same envelope of properties: an identifier, an optional name
//! under which it is registered as a definition, a transform, a clip reference, a
//! mask reference, an opacity and a "responsible" flag for hit testing.  What the node
//! actually is lives in its [`Element`].
//!
//! Each node also carries a [`NodeCache`] with what the last render pass computed
//! for it: its client rectangle, its outline, and for clip paths the rasterized
//! region that hit testing reuses.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::definitions::{AcquiredNodes, Definitions, Namespace};
use crate::drawing_ctx::DrawingCtx;
use crate::error::RenderingError;
use crate::outline::OutlineKey;
use crate::paint_server::{LinearGradient, Pattern, RadialGradient};
use crate::path::{FillRule, Path};
use crate::rect::{IRect, Rect};
use crate::region::Region;
use crate::shapes::Shape;
use crate::structure::{ClipPath, Defs, Group, Mask, Svg, Symbol, Use};
use crate::transform::{Transform, TransformPair};

/// Strong reference to a node in the scene.
pub type Node = rctree::Node<NodeData>;

/// Weak reference to a node in the scene.
pub type WeakNode = rctree::WeakNode<NodeData>;

/// Identifier of a node, reported by hit tests.
///
/// Identifiers are assigned by the [`Document`](crate::document::Document) when a node
/// is added to it; the root document node always gets `NodeId(1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Identifier of nodes that have not been added to a document yet.
    pub const UNASSIGNED: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind-specific part of a node.
pub enum Element {
    Group(Group),
    Svg(Svg),
    Use(Use),
    Symbol(Symbol),
    Defs(Defs),
    ClipPath(ClipPath),
    Mask(Mask),
    Shape(Shape),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
    Pattern(Pattern),
}

macro_rules! impl_from_element {
    ($($name:ident),+ $(,)?) => {
        $(
            impl From<$name> for Element {
                fn from(e: $name) -> Element {
                    Element::$name(e)
                }
            }
        )+
    };
}

impl_from_element!(
    Group,
    Svg,
    Use,
    Symbol,
    Defs,
    ClipPath,
    Mask,
    Shape,
    LinearGradient,
    RadialGradient,
    Pattern,
);

impl Element {
    pub fn kind(&self) -> &'static str {
        match *self {
            Element::Group(_) => "Group",
            Element::Svg(_) => "Svg",
            Element::Use(_) => "Use",
            Element::Symbol(_) => "Symbol",
            Element::Defs(_) => "Defs",
            Element::ClipPath(_) => "ClipPath",
            Element::Mask(_) => "Mask",
            Element::Shape(_) => "Shape",
            Element::LinearGradient(_) => "LinearGradient",
            Element::RadialGradient(_) => "RadialGradient",
            Element::Pattern(_) => "Pattern",
        }
    }

    /// The registry namespace under which a named node of this kind is defined.
    pub fn namespace(&self) -> Namespace {
        match *self {
            Element::ClipPath(_) => Namespace::ClipPath,
            Element::Mask(_) => Namespace::Mask,
            Element::LinearGradient(_) | Element::RadialGradient(_) | Element::Pattern(_) => {
                Namespace::Brush
            }
            _ => Namespace::Template,
        }
    }

    /// Nodes that only draw when something references them.
    pub fn is_definition_only(&self) -> bool {
        matches!(
            *self,
            Element::Symbol(_)
                | Element::Defs(_)
                | Element::ClipPath(_)
                | Element::Mask(_)
                | Element::LinearGradient(_)
                | Element::RadialGradient(_)
                | Element::Pattern(_)
        )
    }

    /// Whether this node starts a document with its own definitions.
    pub fn is_document(&self) -> bool {
        matches!(*self, Element::Svg(_))
    }

    fn draw(
        &self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        match *self {
            Element::Group(ref e) => e.draw(node, acquired_nodes, draw_ctx, opacity),
            Element::Svg(ref e) => e.draw(node, acquired_nodes, draw_ctx, opacity),
            Element::Use(ref e) => e.draw(node, acquired_nodes, draw_ctx, opacity),
            Element::Shape(ref e) => e.draw(node, acquired_nodes, draw_ctx, opacity),
            _ => Ok(None),
        }
    }
}

/// Implemented by the elements that draw when they are visited.
pub trait Draw {
    /// Draws the element in the current user space of `draw_ctx`.
    ///
    /// Returns the bounds of what was drawn, in the element's own user space,
    /// or `None` if nothing was drawn.
    fn draw(
        &self,
        node: &Node,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError>;
}

/// What the last render pass computed for a node.
#[derive(Default)]
pub struct NodeCache {
    /// Bounds of what the node drew, in its parent's user space.
    pub client_rect: Option<Rect>,

    /// Combined outline, keyed by the parameters it was computed with.
    pub outline: Option<(OutlineKey, Rc<Path>)>,

    /// Outline of a clip path node with its own transform applied, along with
    /// the combined outline it was transformed from.
    pub clip_outline: Option<(Rc<Path>, Rc<Path>)>,

    /// Rasterized outline of a clip path node for hit testing, with the device
    /// transform and pixel window it was rasterized for.  Valid while the outline
    /// is the same `Rc` as the one in `clip_outline`.
    pub clip_region: Option<ClipRegion>,

    /// Definitions of a document node.
    pub definitions: Option<Rc<Definitions>>,

    /// Whether some node inside a document claimed responsibility for events.
    pub responsible: bool,
}

#[derive(Clone)]
pub struct ClipRegion {
    pub outline: Rc<Path>,
    pub rule: FillRule,
    pub to_device: Transform,
    pub window: IRect,
    pub region: Rc<Region>,
}

impl NodeCache {
    /// Drops everything derived from the geometry of the node's subtree.
    pub fn invalidate(&mut self) {
        self.client_rect = None;
        self.outline = None;
        self.clip_outline = None;
        self.clip_region = None;
    }
}

/// Data for a single node.
pub struct NodeData {
    id: NodeId,
    name: Option<String>,
    transform: TransformPair,
    clip_path: Option<String>,
    clip_rule: FillRule,
    mask: Option<String>,
    opacity: f64,
    responsible: bool,
    element: Element,
    cache: RefCell<NodeCache>,
}

impl NodeData {
    pub fn new(element: impl Into<Element>) -> NodeData {
        NodeData {
            id: NodeId::UNASSIGNED,
            name: None,
            transform: TransformPair::default(),
            clip_path: None,
            clip_rule: FillRule::default(),
            mask: None,
            opacity: 1.0,
            responsible: false,
            element: element.into(),
            cache: RefCell::new(NodeCache::default()),
        }
    }

    pub fn with_name(mut self, name: &str) -> NodeData {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> NodeData {
        self.transform = TransformPair::new(transform);
        self
    }

    pub fn with_clip_path(mut self, name: &str) -> NodeData {
        self.clip_path = Some(name.to_string());
        self
    }

    pub fn with_clip_rule(mut self, rule: FillRule) -> NodeData {
        self.clip_rule = rule;
        self
    }

    pub fn with_mask(mut self, name: &str) -> NodeData {
        self.mask = Some(name.to_string());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> NodeData {
        self.opacity = sanitize_opacity(opacity);
        self
    }

    pub fn with_responsible(mut self, responsible: bool) -> NodeData {
        self.responsible = responsible;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn transform(&self) -> &TransformPair {
        &self.transform
    }

    pub fn clip_path(&self) -> Option<&str> {
        self.clip_path.as_deref()
    }

    pub fn clip_rule(&self) -> FillRule {
        self.clip_rule
    }

    pub fn mask(&self) -> Option<&str> {
        self.mask.as_deref()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn is_responsible(&self) -> bool {
        self.responsible
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn cache(&self) -> Ref<'_, NodeCache> {
        self.cache.borrow()
    }

    pub fn cache_mut(&self) -> RefMut<'_, NodeCache> {
        self.cache.borrow_mut()
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = TransformPair::new(transform);
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) {
        self.opacity = sanitize_opacity(opacity);
    }

    pub(crate) fn set_responsible(&mut self, responsible: bool) {
        self.responsible = responsible;
    }

    pub(crate) fn set_clip_path(&mut self, name: Option<&str>) {
        self.clip_path = name.map(str::to_string);
    }

    pub(crate) fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_string);
    }
}

fn sanitize_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element.kind())?;

        match self.name {
            Some(ref name) => write!(f, "#{}", name),
            None => write!(f, "({})", self.id),
        }
    }
}

/// Helper trait for reading the common parts of a node
pub trait NodeBorrow {
    fn node_id(&self) -> NodeId;

    fn borrow_element(&self) -> Ref<'_, Element>;
}

impl NodeBorrow for Node {
    fn node_id(&self) -> NodeId {
        self.borrow().id
    }

    fn borrow_element(&self) -> Ref<'_, Element> {
        Ref::map(self.borrow(), |n| &n.element)
    }
}

/// Helper trait for drawing recursively
pub trait NodeDraw {
    fn draw(
        &self,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError>;

    fn draw_children(
        &self,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError>;
}

impl NodeDraw for Node {
    /// Draws the element only, without the node's transform, clip, mask and opacity.
    fn draw(
        &self,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        self.borrow()
            .element
            .draw(self, acquired_nodes, draw_ctx, opacity)
    }

    /// Draws every child in order, each with its full envelope, and returns the
    /// union of their client rectangles.
    fn draw_children(
        &self,
        acquired_nodes: &mut AcquiredNodes,
        draw_ctx: &mut DrawingCtx<'_>,
        opacity: f64,
    ) -> Result<Option<Rect>, RenderingError> {
        let mut bbox: Option<Rect> = None;

        for child in self.children() {
            if let Some(r) = draw_ctx.draw_node_from_stack(&child, acquired_nodes, opacity)? {
                bbox = Some(bbox.map_or(r, |b| b.union(&r)));
            }
        }

        Ok(bbox)
    }
}

/// Drops derived geometry of a node and of everything above it.
pub fn invalidate_ancestors(node: &Node) {
    for n in node.ancestors() {
        n.borrow().cache_mut().invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_name_or_id() {
        let mut data = NodeData::new(Group::default());
        data.set_id(NodeId(7));
        assert_eq!(format!("{}", data), "Group(7)");

        let data = NodeData::new(Group::default()).with_name("g");
        assert_eq!(format!("{}", data), "Group#g");
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(NodeData::new(Group::default()).with_opacity(2.0).opacity(), 1.0);
        assert_eq!(NodeData::new(Group::default()).with_opacity(-1.0).opacity(), 0.0);
        assert_eq!(NodeData::new(Group::default()).with_opacity(f64::NAN).opacity(), 1.0);
    }

    #[test]
    fn namespaces_by_kind() {
        assert_eq!(Element::from(ClipPath::default()).namespace(), Namespace::ClipPath);
        assert_eq!(Element::from(Mask::default()).namespace(), Namespace::Mask);
        assert_eq!(Element::from(Group::default()).namespace(), Namespace::Template);
        assert_eq!(Element::from(Symbol::default()).namespace(), Namespace::Template);
        assert_eq!(
            Element::from(LinearGradient::default()).namespace(),
            Namespace::Brush
        );
    }

    #[test]
    fn invalidation_reaches_ancestors() {
        let root = Node::new(NodeData::new(Svg::default()));
        let group = Node::new(NodeData::new(Group::default()));
        let leaf = Node::new(NodeData::new(Group::default()));
        root.append(group.clone());
        group.append(leaf.clone());

        let outline = Rc::new(Path::new());
        root.borrow().cache_mut().outline = Some((OutlineKey::default(), outline.clone()));
        group.borrow().cache_mut().outline = Some((OutlineKey::default(), outline));

        invalidate_ancestors(&leaf);

        assert!(root.borrow().cache().outline.is_none());
        assert!(group.borrow().cache().outline.is_none());
    }
}
