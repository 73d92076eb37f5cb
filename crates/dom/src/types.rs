//! Core type definitions for the document tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Node identity is the index, never attribute equality
//! 3. Use SmallVec for small arrays (avoid heap allocation)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }

    /// Nodes whose value contributes to `textContent`
    pub fn is_character_data(self) -> bool {
        matches!(self, NodeType::Text | NodeType::CdataSection)
    }
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    // IDs
    pub node_id: NodeId,
    pub backend_node_id: u32,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(
        node_id: NodeId,
        backend_node_id: u32,
        node_type: NodeType,
        node_name: String,
    ) -> Self {
        Self {
            node_id,
            backend_node_id,
            node_type,
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            parent_id: None,
            children_ids: SmallVec::new(),
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Attribute presence, regardless of value (boolean attributes)
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}
