//! Element facade - the microdata view of one DOM element
//!
//! Every accessor is a pure read of a single node: attributes, tag name,
//! text. No traversal happens here except `textContent`.

use std::borrow::Cow;
use std::fmt;

use dom::{utils, DomArena, DomNode, NodeId};

use crate::error::{MicrodataError, Result};
use crate::resolver::PropertyResolver;
use crate::token::{Tokenization, Tokens};

/// Tags whose value is their `src` attribute
const SRC_TAGS: &[&str] = &["audio", "embed", "iframe", "img", "source", "track", "video"];

/// Borrowed handle to an element in a [`DomArena`]
///
/// Cheap to copy. Equality is node identity: two handles are equal only if
/// they point at the same node of the same arena.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    arena: &'a DomArena,
    node: &'a DomNode,
    tokenization: Tokenization,
}

/// Value carried by a property element
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue<'a> {
    /// Attribute value or text content
    Text(Cow<'a, str>),
    /// The property is itself an item
    Item(Element<'a>),
}

impl<'a> ItemValue<'a> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ItemValue::Text(text) => Some(text),
            ItemValue::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<Element<'a>> {
        match self {
            ItemValue::Item(element) => Some(*element),
            ItemValue::Text(_) => None,
        }
    }
}

impl<'a> Element<'a> {
    /// Wrap `node_id`, which must name an element node
    pub fn new(arena: &'a DomArena, node_id: NodeId) -> Result<Self> {
        let node = arena.get(node_id)?;
        if !node.is_element() {
            return Err(MicrodataError::NotAnElement(node_id));
        }
        Ok(Self {
            arena,
            node,
            tokenization: Tokenization::default(),
        })
    }

    /// Same element, different token splitting
    pub fn with_tokenization(mut self, tokenization: Tokenization) -> Self {
        self.tokenization = tokenization;
        self
    }

    pub fn id(&self) -> NodeId {
        self.node.node_id
    }

    pub fn node(&self) -> &'a DomNode {
        self.node
    }

    pub fn arena(&self) -> &'a DomArena {
        self.arena
    }

    pub fn tokenization(&self) -> Tokenization {
        self.tokenization
    }

    pub fn tag_name(&self) -> &'a str {
        &self.node.node_name
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    /// Concatenated descendant text, untrimmed
    pub fn text_content(&self) -> String {
        utils::text_content(self.arena, self.node.node_id)
    }

    /// Direct element children, in document order
    pub fn element_children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let arena = self.arena;
        let tokenization = self.tokenization;
        arena.element_children(self.id()).filter_map(move |child_id| {
            Element::new(arena, child_id)
                .ok()
                .map(|child| child.with_tokenization(tokenization))
        })
    }

    /// `itemscope` is present. Its value is irrelevant.
    pub fn is_item_scope(&self) -> bool {
        self.node.has_attr("itemscope")
    }

    /// `itemtype` tokens, or `None` when missing or blank
    pub fn item_type(&self) -> Option<Tokens<'a>> {
        let tokens = self.tokens("itemtype");
        if tokens.is_empty() {
            None
        } else {
            Some(tokens)
        }
    }

    /// Raw `itemid`, or `None` when missing or empty
    pub fn item_id(&self) -> Option<&'a str> {
        self.attr("itemid").filter(|id| !id.is_empty())
    }

    /// Property names. Empty when `itemprop` is missing or blank.
    pub fn item_prop(&self) -> Tokens<'a> {
        self.tokens("itemprop")
    }

    /// Ids of elements whose properties are merged into this item
    pub fn item_ref(&self) -> Tokens<'a> {
        self.tokens("itemref")
    }

    /// The value this element contributes as a property.
    ///
    /// `None` without property names. A nested item is its own value.
    /// Otherwise the value depends on the tag; a missing attribute reads as
    /// the empty string, like DOM `getAttribute`.
    pub fn item_value(&self) -> Option<ItemValue<'a>> {
        if self.item_prop().is_empty() {
            return None;
        }

        if self.is_item_scope() {
            return Some(ItemValue::Item(*self));
        }

        if self.tag_is("time") {
            if let Some(datetime) = self.attr("datetime").filter(|v| !v.is_empty()) {
                return Some(ItemValue::Text(Cow::Borrowed(datetime)));
            }
        }

        let value = match self.value_attribute() {
            Some(name) => Cow::Borrowed(self.attr(name).unwrap_or("")),
            None => Cow::Owned(self.text_content()),
        };
        Some(ItemValue::Text(value))
    }

    /// Property elements of this item, resolved against the arena's own id index
    pub fn properties(&self) -> Vec<Element<'a>> {
        PropertyResolver::new(self.arena)
            .with_tokenization(self.tokenization)
            .property_elements(self.id())
    }

    fn tokens(&self, name: &str) -> Tokens<'a> {
        self.attr(name)
            .map(|value| self.tokenization.split(value))
            .unwrap_or_default()
    }

    fn tag_is(&self, tag: &str) -> bool {
        self.node.node_name.eq_ignore_ascii_case(tag)
    }

    fn value_attribute(&self) -> Option<&'static str> {
        if self.tag_is("meta") {
            Some("content")
        } else if SRC_TAGS.iter().any(|tag| self.tag_is(tag)) {
            Some("src")
        } else if self.tag_is("object") {
            Some("data")
        } else if self.tag_is("data") {
            Some("value")
        } else {
            None
        }
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.node.node_id == other.node.node_id
    }
}

impl Eq for Element<'_> {}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.node.node_id)
            .field("tag", &self.node.node_name)
            .finish()
    }
}
