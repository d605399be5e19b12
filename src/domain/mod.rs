//! Domain layer: document tree, XML codec and title handling
//!
//! This layer is independent of external concerns (no file I/O, no console, no config loading).

pub mod document;
pub mod encoding;
pub mod error;
pub mod parser;
pub mod title;
pub mod writer;

pub use document::{Attribute, Document, Element, Namespace, Node, NodeId, NodeKind};
pub use encoding::decode_document;
pub use error::{DomainError, DomainResult};
pub use parser::parse_document;
pub use title::{extract_title, normalize_title, Title, DEFAULT_PLACEHOLDER};
pub use writer::write_document;
