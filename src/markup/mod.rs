//! Markup document model
//!
//! This module provides the tree the editing surface is made of:
//! an arena of element and text nodes, a tolerant parser for the markup
//! stored in ContentModel, and a canonical serializer back to markup.
//!
//! # Example
//! ```ignore
//! use lectern::markup::Document;
//!
//! let doc = Document::parse("<p>Hello <b>world</b></p>");
//! assert_eq!(doc.to_markup(), "<p>Hello <b>world</b></p>");
//! ```

mod entities;
mod node;
mod parser;
mod serializer;
mod style;

pub use node::{
    is_block, is_list, is_raw_text, is_void, Ancestors, Document, Element, NodeId, NodeKind,
};
pub use entities::named_entity;
pub use parser::decode_entities;
pub use serializer::{escape_attr, escape_text};
pub use style::parse_declarations;
