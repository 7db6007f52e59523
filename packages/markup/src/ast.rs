use crate::entities::{escape_attribute, escape_text};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag name of the synthetic element wrapping every parsed fragment
pub const ROOT_TAG: &str = "#root";

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Read-only view over a markup tree.
///
/// The flattener only ever needs to know whether a node is text or an
/// element, the element's tag name and attributes, and its ordered children.
/// Anything that can answer those questions can be flattened.
pub trait MarkupTree: Sized {
    /// Lowercase tag name, or `None` for text nodes
    fn tag_name(&self) -> Option<&str>;

    /// Character data, or `None` for elements
    fn text(&self) -> Option<&str>;

    /// Attribute value by (lowercase) name
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Children in document order; empty for text nodes
    fn children(&self) -> &[Self];
}

/// Owned markup node produced by the fragment parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    Text {
        content: String,
    },
}

impl Node {
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children,
        }
    }

    pub fn element_with_attributes(
        tag: impl Into<String>,
        attributes: BTreeMap<String, String>,
        children: Vec<Node>,
    ) -> Self {
        Node::Element {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    pub fn text_node(content: impl Into<String>) -> Self {
        Node::Text {
            content: content.into(),
        }
    }

    /// Synthetic wrapper element around a list of top-level nodes
    pub fn root(children: Vec<Node>) -> Self {
        Node::element(ROOT_TAG, children)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element { children, .. } => Some(children),
            Node::Text { .. } => None,
        }
    }

    /// First child that is an element
    pub fn first_element_child(&self) -> Option<&Node> {
        self.children().iter().find(|child| !child.is_text())
    }

    /// Serialize the node's children back to markup
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    /// Serialize the node (including its own tags) back to markup
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text { content } => out.push_str(&escape_text(content)),
            Node::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }

                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl MarkupTree for Node {
    fn tag_name(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            Node::Text { .. } => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            Node::Text { content } => Some(content),
            Node::Element { .. } => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            Node::Text { .. } => None,
        }
    }

    fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }
}
