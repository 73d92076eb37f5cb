//! Item records assembled from resolved properties
//!
//! `Item` is the owned, serializable form of an item: type tokens, id and
//! `(names, value)` pairs in property order. Nested items are expanded in
//! place.

use serde::{Deserialize, Serialize};

use dom::NodeId;

use crate::element::{Element, ItemValue};
use crate::resolver::PropertyResolver;

/// One structured record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<Vec<String>>,
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub properties: Vec<Property>,
}

/// A name→value pair contributed by one property element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub names: Vec<String>,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Item(Box<Item>),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            PropertyValue::Item(item) => Some(item),
            PropertyValue::Text(_) => None,
        }
    }
}

impl Item {
    /// First value of the property called `name`
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|property| property.names.iter().any(|n| n == name))
            .map(|property| &property.value)
    }

    /// Every value of the property called `name`, in property order
    pub fn values<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s PropertyValue> + 's {
        self.properties
            .iter()
            .filter(move |property| property.names.iter().any(|n| n == name))
            .map(|property| &property.value)
    }

    /// Whether any of the type tokens equals `item_type`
    pub fn has_type(&self, item_type: &str) -> bool {
        self.item_type
            .as_ref()
            .is_some_and(|types| types.iter().any(|t| t == item_type))
    }
}

/// Builds `Item`s, tracking the chain of items being expanded
///
/// `itemref` lets one element be a property of many items, so the expanded
/// tree can be exponentially larger than the document. `max_items` caps the
/// total number of items one builder assembles.
pub(crate) struct ItemBuilder<'r, 'a> {
    resolver: &'r PropertyResolver<'a>,
    max_depth: usize,
    max_items: usize,
    built: usize,
    chain: Vec<NodeId>,
}

impl<'r, 'a> ItemBuilder<'r, 'a> {
    pub(crate) fn new(
        resolver: &'r PropertyResolver<'a>,
        max_depth: usize,
        max_items: usize,
    ) -> Self {
        Self {
            resolver,
            max_depth,
            max_items,
            built: 0,
            chain: Vec::new(),
        }
    }

    /// Whether the item budget is used up
    pub(crate) fn exhausted(&self) -> bool {
        self.built >= self.max_items
    }

    /// Assemble `root`. The root itself is always built; only nested items
    /// are subject to the budget.
    pub(crate) fn build(&mut self, root: Element<'a>) -> Item {
        self.built += 1;
        self.chain.push(root.id());

        let mut properties = Vec::new();
        for element in self.resolver.property_elements(root.id()) {
            let value = match element.item_value() {
                Some(ItemValue::Text(text)) => PropertyValue::Text(text.into_owned()),
                Some(ItemValue::Item(nested)) => match self.expand(nested) {
                    Some(item) => PropertyValue::Item(Box::new(item)),
                    None => continue,
                },
                None => continue,
            };

            properties.push(Property {
                names: element.item_prop().iter().map(|n| n.to_string()).collect(),
                value,
            });
        }

        self.chain.pop();

        Item {
            item_type: root
                .item_type()
                .map(|types| types.iter().map(|t| t.to_string()).collect()),
            item_id: root.item_id().map(String::from),
            properties,
        }
    }

    fn expand(&mut self, nested: Element<'a>) -> Option<Item> {
        if self.chain.contains(&nested.id()) {
            tracing::warn!(
                "[ItemBuilder] Item {} refers back to itself through {:?}, property dropped",
                nested.id(),
                self.chain
            );
            return None;
        }
        if self.chain.len() >= self.max_depth {
            tracing::warn!(
                "[ItemBuilder] Item nesting exceeds {} at node {}, property dropped",
                self.max_depth,
                nested.id()
            );
            return None;
        }
        if self.exhausted() {
            tracing::warn!(
                "[ItemBuilder] Item budget of {} spent at node {}, property dropped",
                self.max_items,
                nested.id()
            );
            return None;
        }
        Some(self.build(nested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::DomArena;

    fn build(arena: &DomArena, root: NodeId, max_depth: usize) -> Item {
        let resolver = PropertyResolver::new(arena);
        let root = resolver.element(root).unwrap();
        ItemBuilder::new(&resolver, max_depth, usize::MAX).build(root)
    }

    fn count_items(item: &Item) -> usize {
        1 + item
            .properties
            .iter()
            .filter_map(|property| property.value.as_item())
            .map(count_items)
            .sum::<usize>()
    }

    /// `top` refs x1 and y1; every level k refs both x(k+1) and y(k+1), so
    /// the fully expanded tree doubles per level.
    fn doubling_document(levels: usize) -> (DomArena, NodeId) {
        let mut arena = DomArena::new();
        let doc = arena.append_document();
        let body = arena.append_element(doc, "body", &[]).unwrap();
        let top = arena
            .append_element(body, "div", &[("itemscope", ""), ("itemref", "x1 y1")])
            .unwrap();
        for level in 1..=levels {
            let next = if level < levels {
                format!("x{0} y{0}", level + 1)
            } else {
                String::new()
            };
            for side in ["x", "y"] {
                let id = format!("{}{}", side, level);
                arena
                    .append_element(
                        body,
                        "div",
                        &[
                            ("id", id.as_str()),
                            ("itemscope", ""),
                            ("itemprop", "p"),
                            ("itemref", next.as_str()),
                        ],
                    )
                    .unwrap();
            }
        }
        (arena, top)
    }

    #[test]
    fn test_build_flat_item() {
        let mut arena = DomArena::new();
        let doc = arena.append_document();
        let div = arena
            .append_element(
                doc,
                "div",
                &[("itemscope", ""), ("itemtype", "Person"), ("itemid", "#ada")],
            )
            .unwrap();
        let name = arena
            .append_element(div, "span", &[("itemprop", "name givenName")])
            .unwrap();
        arena.append_text(name, "Ada").unwrap();
        arena
            .append_element(div, "img", &[("itemprop", "image"), ("src", "ada.jpg")])
            .unwrap();

        let item = build(&arena, div, 8);
        assert_eq!(item.item_type, Some(vec!["Person".to_string()]));
        assert_eq!(item.item_id.as_deref(), Some("#ada"));
        assert_eq!(item.properties.len(), 2);
        assert_eq!(item.properties[0].names, vec!["name", "givenName"]);
        assert_eq!(item.property("givenName").unwrap().as_text(), Some("Ada"));
        assert_eq!(item.property("image").unwrap().as_text(), Some("ada.jpg"));
        assert!(item.property("email").is_none());
        assert!(item.has_type("Person"));
    }

    #[test]
    fn test_build_nested_item() {
        let mut arena = DomArena::new();
        let doc = arena.append_document();
        let person = arena.append_element(doc, "div", &[("itemscope", "")]).unwrap();
        let address = arena
            .append_element(
                person,
                "div",
                &[("itemscope", ""), ("itemtype", "PostalAddress"), ("itemprop", "address")],
            )
            .unwrap();
        let city = arena
            .append_element(address, "span", &[("itemprop", "addressLocality")])
            .unwrap();
        arena.append_text(city, "London").unwrap();

        let item = build(&arena, person, 8);
        assert_eq!(item.properties.len(), 1);
        let nested = item.property("address").unwrap().as_item().unwrap();
        assert!(nested.has_type("PostalAddress"));
        assert_eq!(
            nested.property("addressLocality").unwrap().as_text(),
            Some("London")
        );
        // The address fields belong to the nested item only
        assert!(item.property("addressLocality").is_none());
    }

    #[test]
    fn test_values_keeps_repeats_in_order() {
        let mut arena = DomArena::new();
        let doc = arena.append_document();
        let div = arena.append_element(doc, "div", &[("itemscope", "")]).unwrap();
        for color in ["red", "green"] {
            let span = arena
                .append_element(div, "span", &[("itemprop", "color")])
                .unwrap();
            arena.append_text(span, color).unwrap();
        }

        let item = build(&arena, div, 8);
        let colors: Vec<_> = item.values("color").filter_map(PropertyValue::as_text).collect();
        assert_eq!(colors, vec!["red", "green"]);
    }

    #[test]
    fn test_cycle_through_itemref_is_cut() {
        // top > r[itemprop=a] > c[itemprop=b itemref=r]
        let mut arena = DomArena::new();
        let doc = arena.append_document();
        let top = arena.append_element(doc, "div", &[("itemscope", "")]).unwrap();
        let r = arena
            .append_element(top, "div", &[("id", "r"), ("itemscope", ""), ("itemprop", "a")])
            .unwrap();
        arena
            .append_element(r, "div", &[("itemscope", ""), ("itemprop", "b"), ("itemref", "r")])
            .unwrap();

        let item = build(&arena, top, 8);
        let a = item.property("a").unwrap().as_item().unwrap();
        let b = a.property("b").unwrap().as_item().unwrap();
        assert!(b.properties.is_empty());
    }

    #[test]
    fn test_depth_limit_drops_deeper_items() {
        let mut arena = DomArena::new();
        let doc = arena.append_document();
        let top = arena.append_element(doc, "div", &[("itemscope", "")]).unwrap();
        let mid = arena
            .append_element(top, "div", &[("itemscope", ""), ("itemprop", "mid")])
            .unwrap();
        arena
            .append_element(mid, "div", &[("itemscope", ""), ("itemprop", "low")])
            .unwrap();

        let item = build(&arena, top, 2);
        let mid = item.property("mid").unwrap().as_item().unwrap();
        assert!(mid.property("low").is_none());

        let item = build(&arena, top, 3);
        let mid = item.property("mid").unwrap().as_item().unwrap();
        assert!(mid.property("low").unwrap().as_item().is_some());
    }

    #[test]
    fn test_item_budget_bounds_shared_itemref_fanout() {
        let (arena, top) = doubling_document(20);
        let resolver = PropertyResolver::new(&arena);
        let root = resolver.element(top).unwrap();

        let mut builder = ItemBuilder::new(&resolver, 64, 100);
        let item = builder.build(root);

        assert!(builder.exhausted());
        assert_eq!(count_items(&item), 100);
        // x1's subtree spends the budget before y1 is reached
        assert_eq!(item.values("p").count(), 1);
    }

    #[test]
    fn test_item_budget_unused_on_small_fanout() {
        // 1 + 2 + 4 + 8 items
        let (arena, top) = doubling_document(3);
        let resolver = PropertyResolver::new(&arena);
        let root = resolver.element(top).unwrap();

        let mut builder = ItemBuilder::new(&resolver, 64, 100);
        let item = builder.build(root);

        assert!(!builder.exhausted());
        assert_eq!(count_items(&item), 15);
    }

    #[test]
    fn test_serialize_shape() {
        let item = Item {
            item_type: Some(vec!["Person".to_string()]),
            item_id: None,
            properties: vec![Property {
                names: vec!["name".to_string()],
                value: PropertyValue::Text("Ada".to_string()),
            }],
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": ["Person"],
                "properties": [{"names": ["name"], "value": "Ada"}]
            })
        );

        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
