//! Named definitions and resolution of references to them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::AcquireError;
use crate::limits;
use crate::node::{Node, WeakNode};

/// The four independent namespaces of a document's definitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Targets of `Use` nodes.
    Template,
    ClipPath,
    Mask,
    /// Gradients and patterns.
    Brush,
}

/// Per-document registry from names to nodes.
///
/// The registry does not own the nodes; the tree does.  It is rebuilt from scratch at
/// the start of every render pass with [`Definitions::collect`], so references may
/// point to nodes that come later in document order.
#[derive(Default)]
pub struct Definitions {
    templates: HashMap<String, WeakNode>,
    clip_paths: HashMap<String, WeakNode>,
    masks: HashMap<String, WeakNode>,
    brushes: HashMap<String, WeakNode>,
}

impl Definitions {
    pub fn new() -> Definitions {
        Definitions::default()
    }

    /// Walks the subtree of a document root in pre-order and registers every named node.
    ///
    /// When a name appears more than once in a namespace, the last node in document
    /// order wins.  Nested documents are registered by name, but their contents are
    /// not; they get their own registry when they are drawn.
    pub fn collect(root: &Node) -> Definitions {
        let mut defs = Definitions::new();

        for child in root.children() {
            defs.collect_node(&child);
        }

        defs
    }

    fn collect_node(&mut self, node: &Node) {
        let is_nested_document = {
            let data = node.borrow();

            if let Some(name) = data.name() {
                self.define(data.element().namespace(), name, node);
            }

            data.element().is_document()
        };

        if !is_nested_document {
            for child in node.children() {
                self.collect_node(&child);
            }
        }
    }

    fn map_mut(&mut self, ns: Namespace) -> &mut HashMap<String, WeakNode> {
        match ns {
            Namespace::Template => &mut self.templates,
            Namespace::ClipPath => &mut self.clip_paths,
            Namespace::Mask => &mut self.masks,
            Namespace::Brush => &mut self.brushes,
        }
    }

    fn map(&self, ns: Namespace) -> &HashMap<String, WeakNode> {
        match ns {
            Namespace::Template => &self.templates,
            Namespace::ClipPath => &self.clip_paths,
            Namespace::Mask => &self.masks,
            Namespace::Brush => &self.brushes,
        }
    }

    pub fn define(&mut self, ns: Namespace, name: &str, node: &Node) {
        self.map_mut(ns).insert(name.to_string(), node.downgrade());
    }

    /// Looks up a name.  Names whose node has been destroyed are not found.
    pub fn lookup(&self, ns: Namespace, name: &str) -> Option<Node> {
        self.map(ns).get(name).and_then(WeakNode::upgrade)
    }
}

/// A node resolved through [`AcquiredNodes`]; it stays on the reference chain
/// until dropped.
pub struct AcquiredNode {
    chain: Rc<RefCell<ReferenceChain>>,
    node: Node,
}

impl Drop for AcquiredNode {
    fn drop(&mut self) {
        let left = self.chain.borrow_mut().leave();
        debug_assert!(left.as_ref() == Some(&self.node));
    }
}

impl AcquiredNode {
    pub fn get(&self) -> &Node {
        &self.node
    }
}

/// Resolves references during a traversal, detecting cycles and enforcing limits.
///
/// Consider a template that contains a `Use` of itself:
///
/// ```text
/// Group name="t"
///   Use href="t"
/// ```
///
/// Drawing the `Use` acquires `t`, whose child then tries to acquire `t` again while
/// the first acquisition is still alive; that is reported as
/// [`AcquireError::CircularReference`] and the inner `Use` draws nothing.
///
/// References can also be arranged so that a small document instantiates an
/// exponential number of nodes.  Every acquisition counts against
/// [`limits::MAX_REFERENCED_ELEMENTS`] for the whole traversal.
pub struct AcquiredNodes {
    definitions: Rc<Definitions>,
    lookups: usize,
    chain: Rc<RefCell<ReferenceChain>>,
}

impl AcquiredNodes {
    pub fn new(definitions: Rc<Definitions>) -> AcquiredNodes {
        AcquiredNodes {
            definitions,
            lookups: 0,
            chain: Rc::default(),
        }
    }

    /// Runs `f` with another registry in scope, e.g. inside a nested document.
    pub fn with_definitions<R>(
        &mut self,
        definitions: Rc<Definitions>,
        f: impl FnOnce(&mut AcquiredNodes) -> R,
    ) -> R {
        let outer = self.set_definitions(definitions);
        let res = f(self);
        self.set_definitions(outer);
        res
    }

    /// Replaces the registry in scope, returning the previous one.
    pub fn set_definitions(&mut self, definitions: Rc<Definitions>) -> Rc<Definitions> {
        std::mem::replace(&mut self.definitions, definitions)
    }

    /// Looks up `name` and puts the node on the reference chain.
    pub fn acquire(&mut self, ns: Namespace, name: &str) -> Result<AcquiredNode, AcquireError> {
        self.lookups += 1;
        if self.lookups > limits::MAX_REFERENCED_ELEMENTS {
            return Err(AcquireError::MaxReferencesExceeded);
        }

        match self.definitions.lookup(ns, name) {
            Some(node) => self.acquire_ref(&node),
            None => Err(AcquireError::LinkNotFound(name.to_string())),
        }
    }

    /// Puts an already known node on the reference chain, failing if it is there
    /// already.
    pub fn acquire_ref(&self, node: &Node) -> Result<AcquiredNode, AcquireError> {
        if !self.chain.borrow_mut().enter(node) {
            return Err(AcquireError::CircularReference(node.clone()));
        }

        Ok(AcquiredNode {
            chain: Rc::clone(&self.chain),
            node: node.clone(),
        })
    }
}

/// The nodes currently being drawn or tested through references, outermost first.
#[derive(Default)]
pub struct ReferenceChain(Vec<Node>);

impl ReferenceChain {
    /// Appends `node` unless it is already on the chain; returns whether it was
    /// appended.
    pub fn enter(&mut self, node: &Node) -> bool {
        if self.0.contains(node) {
            false
        } else {
            self.0.push(node.clone());
            true
        }
    }

    pub fn leave(&mut self) -> Option<Node> {
        self.0.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeData;
    use crate::structure::{ClipPath, Group, Svg, Use};

    fn named(element: impl Into<crate::node::Element>, name: &str) -> Node {
        Node::new(NodeData::new(element).with_name(name))
    }

    #[test]
    fn registers_names_in_their_namespace() {
        let root = Node::new(NodeData::new(Svg::default()));
        root.append(named(Group::default(), "a"));
        root.append(named(ClipPath::default(), "a"));

        let defs = Definitions::collect(&root);

        assert!(defs.lookup(Namespace::Template, "a").is_some());
        assert!(defs.lookup(Namespace::ClipPath, "a").is_some());
        assert!(defs.lookup(Namespace::Mask, "a").is_none());
        assert!(defs.lookup(Namespace::Brush, "a").is_none());
    }

    #[test]
    fn last_definition_wins() {
        let root = Node::new(NodeData::new(Svg::default()));
        let first = named(Group::default(), "dup");
        let group = Node::new(NodeData::new(Group::default()));
        let second = named(Group::default(), "dup");
        root.append(first);
        root.append(group.clone());
        group.append(second.clone());

        let defs = Definitions::collect(&root);
        assert!(defs.lookup(Namespace::Template, "dup") == Some(second));
    }

    #[test]
    fn nested_documents_keep_their_names() {
        let root = Node::new(NodeData::new(Svg::default()));
        let nested = named(Svg::default(), "inner");
        nested.append(named(Group::default(), "hidden"));
        root.append(nested);

        let defs = Definitions::collect(&root);
        assert!(defs.lookup(Namespace::Template, "inner").is_some());
        assert!(defs.lookup(Namespace::Template, "hidden").is_none());
    }

    #[test]
    fn registry_does_not_own_nodes() {
        let root = Node::new(NodeData::new(Svg::default()));
        let child = named(Group::default(), "gone");
        root.append(child.clone());

        let defs = Definitions::collect(&root);
        child.detach();
        drop(child);

        assert!(defs.lookup(Namespace::Template, "gone").is_none());
    }

    #[test]
    fn detects_circular_references() {
        let root = Node::new(NodeData::new(Svg::default()));
        let template = named(Group::default(), "t");
        template.append(Node::new(NodeData::new(Use::new("t"))));
        root.append(template);

        let mut acquired = AcquiredNodes::new(Rc::new(Definitions::collect(&root)));

        let outer = acquired.acquire(Namespace::Template, "t");
        assert!(outer.is_ok());
        assert!(matches!(
            acquired.acquire(Namespace::Template, "t"),
            Err(AcquireError::CircularReference(_))
        ));

        drop(outer);
        assert!(acquired.acquire(Namespace::Template, "t").is_ok());
    }

    #[test]
    fn missing_names_are_not_found() {
        let mut acquired = AcquiredNodes::new(Rc::new(Definitions::new()));
        assert!(matches!(
            acquired.acquire(Namespace::Template, "nope"),
            Err(AcquireError::LinkNotFound(ref name)) if name == "nope"
        ));
    }
}
