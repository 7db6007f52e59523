//! # Flatmark Markup
//!
//! Tree source for the flat run model: a small, tolerant HTML fragment
//! lexer and parser producing an owned [`Node`] tree, plus the
//! [`MarkupTree`] trait the editor's flattener walks.
//!
//! This is not an HTML5 parser. It understands start/end tags, quoted and
//! bare attributes, comments, void elements and the common character
//! references, which is all the inline-formatting editor needs.

pub mod ast;
pub mod entities;
pub mod error;
pub mod lexer;
pub mod parser;


pub use ast::{MarkupTree, Node, ROOT_TAG};
pub use entities::{decode_entities, escape_attribute, escape_text};
pub use error::{ParseError, ParseResult};
pub use lexer::{tokenize, Token};
pub use parser::{parse_fragment, Parser};
