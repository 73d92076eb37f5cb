//! Error types for microdata extraction
//!
//! Extraction is best-effort: missing attributes and dangling `itemref` ids
//! are not errors. Only bad handles and bad input documents are.

use dom::{DomError, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MicrodataError>;

#[derive(Debug, Error)]
pub enum MicrodataError {
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
}
