//! DOM Service - builds the document arena from CDP data
//!
//! This handles:
//! - Parsing CDP `DOM.getDocument` JSON responses
//! - DOM tree construction in document order (so the id index is too)
//!
//! Content documents (iframes) and shadow roots are separate trees and are
//! not linked into the document.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::*;
use serde_json::Value;
use std::collections::HashMap;

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    /// Deepest nesting accepted from CDP input
    pub max_depth: usize,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Take ownership of the built arena
    pub fn into_arena(self) -> DomArena {
        self.arena
    }

    /// Parse a raw CDP response string and build arena
    pub fn parse_cdp_json(&mut self, raw: &str) -> Result<NodeId> {
        let value: Value = serde_json::from_str(raw)?;
        self.parse_cdp_dom_tree(&value)
    }

    /// Parse CDP DOM tree response and build arena
    ///
    /// Input format matches CDP's DOM.getDocument response:
    /// ```json
    /// {
    ///   "root": {
    ///     "nodeId": 1,
    ///     "backendNodeId": 1,
    ///     "nodeType": 9,
    ///     "nodeName": "#document",
    ///     "children": [...]
    ///   }
    /// }
    /// ```
    pub fn parse_cdp_dom_tree(&mut self, cdp_response: &Value) -> Result<NodeId> {
        let root = cdp_response
            .get("root")
            .ok_or_else(|| DomError::CdpError("Missing 'root' in CDP response".to_string()))?;

        // Build aside: a failed parse leaves the previous document in place
        let mut arena = DomArena::new();
        let root_id = self.parse_node(&mut arena, root, None, 0)?;
        arena.set_root(root_id)?;

        tracing::debug!("[DomService] Parsed CDP document: {} nodes", arena.len());

        self.arena = arena;
        Ok(root_id)
    }

    /// Recursively parse a CDP node
    fn parse_node(
        &self,
        arena: &mut DomArena,
        cdp_node: &Value,
        parent_id: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId> {
        if depth > self.config.max_depth {
            return Err(DomError::MaxDepthExceeded {
                current: depth,
                max: self.config.max_depth,
            });
        }

        let node_id = required_u32(cdp_node, "nodeId")?;
        let backend_node_id = required_u32(cdp_node, "backendNodeId")?;

        let node_type_val = required_u64(cdp_node, "nodeType")?;
        let node_type = u8::try_from(node_type_val)
            .ok()
            .and_then(NodeType::from_u8)
            .ok_or_else(|| DomError::InvalidNodeType {
                expected: "valid NodeType".to_string(),
                actual: format!("{}", node_type_val),
            })?;

        let node_name = cdp_node["nodeName"].as_str().unwrap_or("").to_string();

        let node_value = cdp_node["nodeValue"].as_str().unwrap_or("").to_string();

        // Attributes arrive flattened: [name0, value0, name1, value1, ...]
        let mut attributes = HashMap::new();
        if let Some(attrs) = cdp_node["attributes"].as_array() {
            for pair in attrs.chunks_exact(2) {
                if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                    attributes.insert(key.to_string(), value.to_string());
                }
            }
        }

        let mut node = DomNode::new(node_id, backend_node_id, node_type, node_name);

        node.node_value = node_value;
        node.attributes = attributes;
        node.parent_id = parent_id;

        // Parent goes in before its children: arena order is document order
        let current_node_id = arena.add_node(node);

        if let Some(children) = cdp_node["children"].as_array() {
            let mut child_ids = smallvec::SmallVec::new();

            for child in children {
                let child_id =
                    self.parse_node(arena, child, Some(current_node_id), depth + 1)?;
                child_ids.push(child_id);
            }

            arena.get_mut(current_node_id)?.children_ids = child_ids;
        }

        Ok(current_node_id)
    }
}

fn required_u64(cdp_node: &Value, field: &str) -> Result<u64> {
    cdp_node[field]
        .as_u64()
        .ok_or_else(|| DomError::CdpError(format!("Missing {}", field)))
}

fn required_u32(cdp_node: &Value, field: &str) -> Result<u32> {
    let value = required_u64(cdp_node, field)?;
    u32::try_from(value)
        .map_err(|_| DomError::CdpError(format!("{} out of range: {}", field, value)))
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}
