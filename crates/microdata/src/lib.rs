//! Microdata extraction
//!
//! Reads `itemscope` / `itemtype` / `itemprop` / `itemref` / `itemid` items
//! out of an arena DOM.
//!
//! ## Core Design
//!
//! ```text
//! DomArena ─→ Element (facade: scope, type, id, prop, ref, value)
//!    │            ↓
//!    └─→ PropertyResolver (itemref targets + subtree, stops at nested items)
//!                 ↓
//!            ItemBuilder ─→ Item { type, id, [(names, value)] }
//! ```
//!
//! The resolver is the part with rules worth knowing: properties come back
//! in first-found order, `itemref` targets before the root's subtree, and no
//! node is ever returned twice.
//!
//! ```
//! use dom::DomArena;
//! use microdata::MicrodataExtractor;
//!
//! let mut arena = DomArena::new();
//! let doc = arena.append_document();
//! let person = arena
//!     .append_element(doc, "div", &[("itemscope", ""), ("itemtype", "Person")])
//!     .unwrap();
//! let name = arena
//!     .append_element(person, "span", &[("itemprop", "name")])
//!     .unwrap();
//! arena.append_text(name, "Ada").unwrap();
//!
//! let items = MicrodataExtractor::new().items(&arena);
//! assert_eq!(items[0].property("name").unwrap().as_text(), Some("Ada"));
//! ```

pub mod element;
pub mod error;
pub mod extractor;
pub mod item;
pub mod resolver;
pub mod token;

pub use dom;
pub use element::{Element, ItemValue};
pub use error::{MicrodataError, Result};
pub use extractor::{ExtractorConfig, MicrodataExtractor};
pub use item::{Item, Property, PropertyValue};
pub use resolver::{IdIndex, LookupFn, PropertyResolver};
pub use token::{Tokenization, Tokens};
