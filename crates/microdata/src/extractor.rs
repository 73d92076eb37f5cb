//! Microdata Extractor - document-level entry point
//!
//! Finds top-level items and assembles them. Item discovery follows HTML:
//! a top-level item is an element with `itemscope` that is not itself a
//! property of another item.

use dom::{DomArena, DomService, NodeId};
use serde_json::Value;

use crate::element::Element;
use crate::error::Result;
use crate::item::{Item, ItemBuilder};
use crate::resolver::PropertyResolver;
use crate::token::Tokenization;

/// Configuration for the extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub tokenization: Tokenization,
    /// Deepest chain of nested items that is expanded
    pub max_item_depth: usize,
    /// Most items (nested ones included) assembled by one `item`/`items` call
    pub max_items: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            tokenization: Tokenization::AsciiWhitespace,
            max_item_depth: 64,
            max_items: 10_000,
        }
    }
}

/// Extracts items from arena documents
pub struct MicrodataExtractor {
    config: ExtractorConfig,
}

impl MicrodataExtractor {
    /// Create new extractor with default config
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create extractor with custom config
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Property resolver for `arena` using this extractor's tokenization
    pub fn resolver<'a>(&self, arena: &'a DomArena) -> PropertyResolver<'a> {
        PropertyResolver::new(arena).with_tokenization(self.config.tokenization)
    }

    /// Top-level item roots, in document order
    pub fn top_level_items(&self, arena: &DomArena) -> Vec<NodeId> {
        let resolver = self.resolver(arena);
        arena
            .node_ids()
            .filter_map(|node_id| resolver.element(node_id))
            .filter(|element| element.is_item_scope() && element.item_prop().is_empty())
            .map(|element| element.id())
            .collect()
    }

    /// Assemble the item rooted at `root`
    ///
    /// A root without `itemscope` yields an empty item.
    pub fn item(&self, arena: &DomArena, root: NodeId) -> Result<Item> {
        let resolver = self.resolver(arena);
        let root = Element::new(arena, root)?.with_tokenization(self.config.tokenization);
        Ok(self.builder(&resolver).build(root))
    }

    /// Assemble every top-level item of the document
    pub fn items(&self, arena: &DomArena) -> Vec<Item> {
        let resolver = self.resolver(arena);
        let roots = self.top_level_items(arena);

        tracing::debug!("[MicrodataExtractor] Found {} top-level items", roots.len());

        // One budget for the whole document
        let mut builder = self.builder(&resolver);
        let mut items = Vec::with_capacity(roots.len());
        for root in roots.iter().filter_map(|&node_id| resolver.element(node_id)) {
            if builder.exhausted() {
                tracing::warn!(
                    "[MicrodataExtractor] Item budget of {} spent, skipping remaining top-level items from node {}",
                    self.config.max_items,
                    root.id()
                );
                break;
            }
            items.push(builder.build(root));
        }
        items
    }

    fn builder<'r, 'a>(&self, resolver: &'r PropertyResolver<'a>) -> ItemBuilder<'r, 'a> {
        ItemBuilder::new(resolver, self.config.max_item_depth, self.config.max_items)
    }

    /// Build a document from a CDP `DOM.getDocument` response and extract it
    pub fn items_from_cdp(&self, cdp_response: &Value) -> Result<Vec<Item>> {
        let mut service = DomService::new();
        service.parse_cdp_dom_tree(cdp_response)?;
        Ok(self.items(service.arena()))
    }
}

impl Default for MicrodataExtractor {
    fn default() -> Self {
        Self::new()
    }
}
