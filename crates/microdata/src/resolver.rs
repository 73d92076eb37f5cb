//! Property resolution for a single item
//!
//! Given an item root, collect its property elements: first everything
//! pulled in through `itemref`, then the root's own subtree. The walk is a
//! depth-first pre-order over element children with two rules:
//!
//! - a nested item is recorded (if it names properties) but never entered
//! - a node is dequeued at most once per call, by identity
//!
//! ```text
//!   itemref targets ──┐
//!                     ├─→ stack walk ─→ [prop, prop, ...]
//!   root subtree ─────┘        ↑
//!                       visited set (NodeId)
//! ```

use std::borrow::Cow;

use ahash::AHashSet;
use dom::{DomArena, NodeId};

use crate::element::Element;
use crate::token::Tokenization;

/// Document-scoped `id` lookup used to resolve `itemref`
///
/// The arena implements this with its own index. Tests and hosts with a
/// different id space can inject their own (see [`LookupFn`]).
pub trait IdIndex {
    /// Elements carrying `id`. The arena returns them in insertion order,
    /// which is document order for CDP-built documents.
    fn lookup(&self, id: &str) -> Cow<'_, [NodeId]>;
}

impl IdIndex for DomArena {
    fn lookup(&self, id: &str) -> Cow<'_, [NodeId]> {
        Cow::Borrowed(self.query_by_id(id))
    }
}

/// Adapts a closure into an [`IdIndex`]
pub struct LookupFn<F>(pub F);

impl<F> IdIndex for LookupFn<F>
where
    F: Fn(&str) -> Vec<NodeId>,
{
    fn lookup(&self, id: &str) -> Cow<'_, [NodeId]> {
        Cow::Owned((self.0)(id))
    }
}

/// Computes the ordered property list of items in one arena
pub struct PropertyResolver<'a> {
    arena: &'a DomArena,
    index: &'a dyn IdIndex,
    tokenization: Tokenization,
}

impl<'a> PropertyResolver<'a> {
    /// Resolver using the arena's own id index
    pub fn new(arena: &'a DomArena) -> Self {
        Self {
            arena,
            index: arena,
            tokenization: Tokenization::default(),
        }
    }

    /// Resolve `itemref` through `index` instead of the arena
    pub fn with_index(mut self, index: &'a dyn IdIndex) -> Self {
        self.index = index;
        self
    }

    pub fn with_tokenization(mut self, tokenization: Tokenization) -> Self {
        self.tokenization = tokenization;
        self
    }

    pub fn arena(&self) -> &'a DomArena {
        self.arena
    }

    pub fn tokenization(&self) -> Tokenization {
        self.tokenization
    }

    /// Element handle carrying this resolver's tokenization.
    /// `None` for unknown ids and non-element nodes.
    pub fn element(&self, node_id: NodeId) -> Option<Element<'a>> {
        Element::new(self.arena, node_id)
            .ok()
            .map(|element| element.with_tokenization(self.tokenization))
    }

    /// Property nodes of the item rooted at `root`, in the order they were
    /// first found: `itemref` targets in token order, then the root's
    /// subtree. Empty when `root` is not an item.
    pub fn properties(&self, root: NodeId) -> Vec<NodeId> {
        let Some(root_element) = self.element(root).filter(Element::is_item_scope) else {
            return Vec::new();
        };

        let mut walk = Walk::new(self, root);

        for id in root_element.item_ref() {
            let targets = self.index.lookup(id);
            if targets.is_empty() {
                tracing::debug!(
                    "[PropertyResolver] itemref {:?} on node {} matches no element",
                    id,
                    root
                );
            }
            for &target in targets.iter() {
                walk.merge(target);
            }
        }

        // The root itself may already have been reached through an itemref
        walk.merge(root);

        walk.properties
    }

    /// Same as [`properties`](Self::properties), as element handles
    pub fn property_elements(&self, root: NodeId) -> Vec<Element<'a>> {
        self.properties(root)
            .into_iter()
            .filter_map(|node_id| self.element(node_id))
            .collect()
    }
}

/// State of one `properties()` call
struct Walk<'r, 'a> {
    resolver: &'r PropertyResolver<'a>,
    root: NodeId,
    /// Nodes already taken off the frontier
    visited: AHashSet<NodeId>,
    stack: Vec<NodeId>,
    properties: Vec<NodeId>,
}

impl<'r, 'a> Walk<'r, 'a> {
    fn new(resolver: &'r PropertyResolver<'a>, root: NodeId) -> Self {
        Self {
            resolver,
            root,
            visited: AHashSet::default(),
            stack: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Walk the subtree at `start`, skipping anything already visited
    fn merge(&mut self, start: NodeId) {
        self.stack.push(start);

        while let Some(node_id) = self.stack.pop() {
            if !self.visited.insert(node_id) {
                continue;
            }
            let Some(element) = self.resolver.element(node_id) else {
                continue;
            };

            if node_id != self.root {
                if !element.item_prop().is_empty() {
                    self.properties.push(node_id);
                }
                if element.is_item_scope() {
                    tracing::trace!(
                        "[PropertyResolver] Nested item {} stops descent for item {}",
                        node_id,
                        self.root
                    );
                    continue;
                }
            }

            // Reverse so the first child is popped first
            let first = self.stack.len();
            self.stack.extend(self.resolver.arena.element_children(node_id));
            self.stack[first..].reverse();
        }
    }
}
