//! # Flattener
//!
//! Depth-first descent of a markup tree into a [`Document`]. The open-tag
//! stack is owned by the descent and copied into each run as it is emitted.
//!
//! The root element only hosts the content and never becomes a tag.
//! Whitespace-only text produces no run. The first run under each freshly
//! opened block element gets `force_close` so the reconstructor keeps
//! adjacent blocks apart.

use crate::document::Document;
use crate::model::{Run, RunContent, Tag, TagMark, VoidElement, ANCHOR};
use crate::schema::Schema;
use flatmark_markup::MarkupTree;
use tracing::debug;

/// Document plus the correlation id of each run
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub document: Document,

    /// `n-<i>` for run `i` when it came from a text node; `None` for void
    /// runs, which still consume an index.
    pub node_ids: Vec<Option<String>>,
}

pub struct Flattener<'s> {
    schema: &'s Schema,
}

impl<'s> Flattener<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn flatten<T: MarkupTree>(&self, root: &T) -> Document {
        self.flatten_annotated(root).document
    }

    pub fn flatten_annotated<T: MarkupTree>(&self, root: &T) -> Flattened {
        let mut descent = Descent {
            schema: self.schema,
            stack: Vec::new(),
            document: Document::new(),
            node_ids: Vec::new(),
        };

        if root.tag_name().is_some() {
            for child in root.children() {
                descent.visit(child);
            }
        } else {
            descent.visit(root);
        }

        debug!(runs = descent.document.len(), "flattened tree");

        Flattened {
            document: descent.document,
            node_ids: descent.node_ids,
        }
    }
}

/// A mark on the open-tag stack
struct OpenMark {
    mark: TagMark,
    /// Block opened but no run emitted under it yet
    fresh: bool,
}

struct Descent<'s> {
    schema: &'s Schema,
    stack: Vec<OpenMark>,
    document: Document,
    node_ids: Vec<Option<String>>,
}

impl Descent<'_> {
    fn visit<T: MarkupTree>(&mut self, node: &T) {
        let Some(name) = node.tag_name() else {
            if let Some(text) = node.text() {
                if !text.trim().is_empty() {
                    self.emit(RunContent::Text(text.to_string()));
                }
            }
            return;
        };

        if let Some(element) = VoidElement::from_tag_name(name) {
            self.emit(RunContent::Void(element));
            return;
        }

        let mark = if name == ANCHOR {
            TagMark::anchor(node.attribute("href").unwrap_or_default())
        } else {
            TagMark::named(name)
        };

        // Same identity nested inside itself adds nothing to the tag set
        let pushed = !self.is_open(&mark.tag);
        if pushed {
            let fresh = self.schema.is_block(name);
            self.stack.push(OpenMark { mark, fresh });
        }

        for child in node.children() {
            self.visit(child);
        }

        if pushed {
            self.stack.pop();
        }
    }

    fn is_open(&self, tag: &Tag) -> bool {
        self.stack.iter().any(|open| &open.mark.tag == tag)
    }

    fn emit(&mut self, content: RunContent) {
        let tags = self
            .stack
            .iter_mut()
            .map(|open| {
                let mark = open.mark.clone().with_force_close(open.fresh);
                open.fresh = false;
                mark
            })
            .collect();

        let index = self.document.len();
        let id = match content {
            RunContent::Text(_) => Some(format!("n-{}", index)),
            RunContent::Void(_) => None,
        };

        self.node_ids.push(id);
        self.document.push(Run { tags, content });
    }
}
