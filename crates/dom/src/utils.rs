//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::types::NodeId;

/// Get all text content from node and its children
///
/// Matches DOM `textContent`: Text and CDATA values concatenated in document
/// order. Whitespace is preserved as-is, not trimmed.
pub fn text_content(arena: &DomArena, node_id: NodeId) -> String {
    arena
        .descendants(node_id)
        .filter(|node| node.node_type.is_character_data())
        .map(|node| node.node_value.as_str())
        .collect()
}
