//! Arena-based DOM tree storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! The arena is the document. It owns every node; everything else holds a
//! `NodeId` (4-byte index) and a shared borrow of the arena. Node identity is
//! index equality, so two elements with identical attributes and text are
//! still different nodes.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! id index: "x" → [NodeId; 1]   (document-scoped, built on insertion)
//! ```
//!
//! Nodes are immutable once added through the public API. That keeps the id
//! index consistent with the attributes it was built from.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;
use smallvec::SmallVec;

/// Arena allocator for DOM nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - `DomNode::node_id` always equals the node's index in the arena
/// - HashMap for `id` attribute → elements, in insertion order
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Element `id` attribute → elements carrying it.
    /// Well-formed HTML has at most one entry per bucket.
    id_index: AHashMap<String, SmallVec<[NodeId; 1]>>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            id_index: AHashMap::new(),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's `node_id` is overwritten with its arena index. Linking it
    /// into a parent is the caller's job (see the `append_*` builders).
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;

        if node.is_element() {
            if let Some(id) = node.attr("id").filter(|id| !id.is_empty()) {
                self.id_index.entry(id.to_string()).or_default().push(node_id);
            }
        }

        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable). Crate-internal: attribute edits would
    /// invalidate the id index.
    pub(crate) fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Elements whose `id` attribute equals `id`.
    ///
    /// Document-scoped lookup. Nodes come back in insertion order, not
    /// document order: the two agree only when every node is added after
    /// all nodes that precede it in the document. CDP ingestion always
    /// builds that way; builder callers appending under an earlier parent
    /// after later siblings get insertion order for duplicate ids.
    /// Unknown or empty ids yield an empty slice.
    pub fn query_by_id(&self, id: &str) -> &[NodeId] {
        self.id_index.get(id).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Direct element children of a node, in document order.
    ///
    /// Text, comment and other non-element nodes are skipped. An unknown
    /// node has no children.
    pub fn element_children(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(node_id as usize)
            .into_iter()
            .flat_map(|node| node.children_ids.iter().copied())
            .filter(move |&child_id| {
                self.nodes
                    .get(child_id as usize)
                    .is_some_and(DomNode::is_element)
            })
    }

    /// Depth-first pre-order walk starting at (and including) `start_id`.
    ///
    /// Iterative, no recursion, so document depth never touches the stack.
    pub fn descendants(&self, start_id: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            stack: vec![start_id],
        }
    }

    /// Create a document node. The first document becomes the root.
    pub fn append_document(&mut self) -> NodeId {
        let backend_id = self.nodes.len() as u32;
        let node_id = self.add_node(DomNode::new(
            0,
            backend_id,
            NodeType::Document,
            "#document".to_string(),
        ));
        if self.root_id.is_none() {
            self.root_id = Some(node_id);
        }
        node_id
    }

    /// Append an element with the given attributes as the last child of `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId> {
        let mut node = DomNode::new(
            0,
            self.nodes.len() as u32,
            NodeType::Element,
            tag.to_string(),
        );
        node.attributes = attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.append_child(parent, node)
    }

    /// Append a text node as the last child of `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.append_character_data(parent, NodeType::Text, "#text", text)
    }

    /// Append a comment node as the last child of `parent`
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.append_character_data(parent, NodeType::Comment, "#comment", text)
    }

    fn append_character_data(
        &mut self,
        parent: NodeId,
        node_type: NodeType,
        name: &str,
        text: &str,
    ) -> Result<NodeId> {
        let mut node = DomNode::new(0, self.nodes.len() as u32, node_type, name.to_string());
        node.node_value = text.to_string();
        self.append_child(parent, node)
    }

    fn append_child(&mut self, parent: NodeId, mut node: DomNode) -> Result<NodeId> {
        self.get(parent)?;
        node.parent_id = Some(parent);
        let child_id = self.add_node(node);
        self.get_mut(parent)?.children_ids.push(child_id);
        Ok(child_id)
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator returned by [`DomArena::descendants`]
pub struct Descendants<'a> {
    arena: &'a DomArena,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DomNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node_id) = self.stack.pop() {
            if let Some(node) = self.arena.nodes.get(node_id as usize) {
                // Push children in reverse order (so they're visited left-to-right)
                self.stack.extend(node.children_ids.iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}
