use crate::ast::{is_void_element, Node, ROOT_TAG};
use crate::entities::decode_entities;
use crate::error::ParseResult;
use crate::lexer::{tokenize, Token};
use std::collections::BTreeMap;
use std::ops::Range;

/// Elements whose start tag implicitly closes an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "ol", "p", "pre", "section", "table", "ul",
];

/// Elements dropped together with their content
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// An element still waiting for its end tag
struct OpenElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl OpenElement {
    fn new(tag: String, attributes: BTreeMap<String, String>) -> Self {
        Self {
            tag,
            attributes,
            children: Vec::new(),
        }
    }

    fn into_node(self) -> Node {
        Node::element_with_attributes(self.tag, self.attributes, self.children)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Node::Text { content }) = self.children.last_mut() {
            content.push_str(text);
        } else {
            self.children.push(Node::text_node(text));
        }
    }
}

/// Tolerant tree builder over the token stream.
///
/// Unmatched end tags are ignored, elements left open at the end of input are
/// closed, and `<p>` is implicitly closed by block-level start tags.
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    stack: Vec<OpenElement>,
    /// Name of the raw-text element currently being skipped, if any
    skipping: Option<String>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            stack: vec![OpenElement::new(ROOT_TAG.to_string(), BTreeMap::new())],
            skipping: None,
        })
    }

    /// Build the tree; the returned node is the synthetic `#root` wrapper
    pub fn parse(mut self) -> Node {
        let tokens = std::mem::take(&mut self.tokens);

        for (token, _span) in tokens {
            if let Some(skipped) = &self.skipping {
                if matches!(token, Token::EndTag(_)) && token.tag_name().as_ref() == Some(skipped) {
                    self.skipping = None;
                }
                continue;
            }

            match token {
                Token::StartTag(raw) => self.start_tag(raw),
                Token::EndTag(_) => {
                    if let Some(name) = token.tag_name() {
                        self.end_tag(&name);
                    }
                }
                Token::Text(text) => self.current().push_text(&decode_entities(text)),
                Token::Lt => self.current().push_text("<"),
                Token::Comment(_) | Token::Declaration | Token::ProcessingInstruction => {}
            }
        }

        while self.stack.len() > 1 {
            self.pop();
        }

        self.stack
            .pop()
            .map(OpenElement::into_node)
            .unwrap_or_else(|| Node::root(Vec::new()))
    }

    fn current(&mut self) -> &mut OpenElement {
        // The root is never popped while tokens remain
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn start_tag(&mut self, raw: &str) {
        let (name, attributes, self_closing) = parse_start_tag(raw);

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            if !self_closing {
                self.skipping = Some(name);
            }
            return;
        }

        if CLOSES_PARAGRAPH.contains(&name.as_str()) && self.is_open("p") {
            self.end_tag("p");
        }

        if is_void_element(&name) || self_closing {
            let node = Node::element_with_attributes(name, attributes, Vec::new());
            self.current().children.push(node);
        } else {
            self.stack.push(OpenElement::new(name, attributes));
        }
    }

    fn end_tag(&mut self, name: &str) {
        let Some(depth) = self.stack.iter().rposition(|open| open.tag == name) else {
            return;
        };
        // Never close the root
        if depth == 0 {
            return;
        }
        while self.stack.len() > depth {
            self.pop();
        }
    }

    fn is_open(&self, name: &str) -> bool {
        self.stack.iter().skip(1).any(|open| open.tag == name)
    }

    fn pop(&mut self) {
        if let Some(open) = self.stack.pop() {
            let node = open.into_node();
            self.current().children.push(node);
        }
    }
}

/// Parse an HTML fragment into a tree rooted at a synthetic `#root` element
pub fn parse_fragment(source: &str) -> ParseResult<Node> {
    Ok(Parser::new(source)?.parse())
}

/// Split a raw start tag into (lowercase name, attributes, self-closing)
fn parse_start_tag(raw: &str) -> (String, BTreeMap<String, String>, bool) {
    let inner = &raw[1..raw.len() - 1];
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();

    (name, parse_attributes(&inner[name_end..]), self_closing)
}

fn parse_attributes(src: &str) -> BTreeMap<String, String> {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut attributes = BTreeMap::new();
    let mut i = 0;

    while i < len {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }

        let start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        if start == i {
            // stray '/' or '='
            i += 1;
            continue;
        }
        let name = src[start..i].to_ascii_lowercase();

        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = "";
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                value = &src[value_start..i];
                if i < len {
                    i += 1;
                }
            } else {
                let value_start = i;
                while i < len && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = &src[value_start..i];
            }
        }

        // First occurrence wins, as in browsers
        attributes
            .entry(name)
            .or_insert_with(|| decode_entities(value).into_owned());
    }

    attributes
}
