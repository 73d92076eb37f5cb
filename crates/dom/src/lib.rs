//! Arena DOM
//!
//! Immutable, index-addressed document trees for extraction passes.
//!
//! ## Philosophy
//!
//! - **Good taste**: Data structures first, algorithms follow naturally
//! - **No special cases**: Type system eliminates branches
//! - **Identity by index**: a node is its `NodeId`, never its contents
//! - **Cache friendly**: Arena allocation, sequential access patterns
//!
//! ## Core Design
//!
//! ```text
//! CDP JSON ─┐
//!           ├→ DomArena (owned) → query_by_id / element_children / descendants
//! builder ──┘        ↓
//!               NodeId (u32)
//! ```

pub mod arena;
pub mod error;
pub mod service;
pub mod types;
pub mod utils;

pub use arena::{Descendants, DomArena};
pub use error::{DomError, Result};
pub use service::{DomService, DomServiceConfig};
pub use types::*;
