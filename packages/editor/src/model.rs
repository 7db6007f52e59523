//! # Run Model
//!
//! A [`Run`] is one maximal stretch of text sharing an identical set of
//! wrapping tags. Each run carries its own copy of the tag stack, so
//! formatting can be added or removed on any run without touching its
//! neighbours.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag name of anchor elements
pub const ANCHOR: &str = "a";

/// Identity of an open tag.
///
/// Anchors are identified by their target, so two links to different hrefs
/// are different tags while adjacent runs under the same href group into a
/// single open link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Tag {
    Named(String),
    Anchor(String),
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Tag::Named(name.into())
    }

    pub fn anchor(href: impl Into<String>) -> Self {
        Tag::Anchor(href.into())
    }

    /// Element name this identity renders as
    pub fn name(&self) -> &str {
        match self {
            Tag::Named(name) => name,
            Tag::Anchor(_) => ANCHOR,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Tag::Anchor(href) => Some(href),
            Tag::Named(_) => None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, Tag::Anchor(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Named(name) => f.write_str(name),
            Tag::Anchor(href) => write!(f, "{}:{}", ANCHOR, href),
        }
    }
}

/// One open-tag instance recorded on a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMark {
    pub tag: Tag,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Set on the first run under a freshly opened block element; tells the
    /// reconstructor to close and reopen the block even though the previous
    /// run carried the same identity.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_close: bool,
}

impl TagMark {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            tag: Tag::named(name),
            attributes: BTreeMap::new(),
            force_close: false,
        }
    }

    pub fn anchor(href: impl Into<String>) -> Self {
        let href = href.into();
        let mut attributes = BTreeMap::new();
        attributes.insert("href".to_string(), href.clone());
        Self {
            tag: Tag::Anchor(href),
            attributes,
            force_close: false,
        }
    }

    pub fn with_force_close(mut self, force_close: bool) -> Self {
        self.force_close = force_close;
        self
    }

    /// Current link target. The stored attribute wins over the identity,
    /// which only matters if the two were edited out of step.
    pub fn href(&self) -> Option<&str> {
        self.attributes
            .get("href")
            .map(String::as_str)
            .or_else(|| self.tag.href())
    }

    /// Replace the attributes; for anchors the identity follows the new href
    pub fn set_attributes(&mut self, attributes: BTreeMap<String, String>) {
        if let (Tag::Anchor(href), Some(new_href)) = (&mut self.tag, attributes.get("href")) {
            *href = new_href.clone();
        }
        self.attributes = attributes;
    }
}

/// Void elements that stand in for text in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoidElement {
    Br,
    Hr,
}

impl VoidElement {
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "br" => Some(VoidElement::Br),
            "hr" => Some(VoidElement::Hr),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            VoidElement::Br => "br",
            VoidElement::Hr => "hr",
        }
    }

    /// Fixed markup emitted in place of text
    pub fn literal(self) -> &'static str {
        match self {
            VoidElement::Br => "<br>",
            VoidElement::Hr => "<hr>",
        }
    }
}

/// What a run holds: real text, or a void element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RunContent {
    Text(String),
    Void(VoidElement),
}

/// One maximal stretch of text sharing an identical wrapping-tag set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Outer-to-inner, in the order the tags were encountered
    pub tags: Vec<TagMark>,
    pub content: RunContent,
}

impl Run {
    pub fn text(tags: Vec<TagMark>, text: impl Into<String>) -> Self {
        Self {
            tags,
            content: RunContent::Text(text.into()),
        }
    }

    pub fn void(tags: Vec<TagMark>, element: VoidElement) -> Self {
        Self {
            tags,
            content: RunContent::Void(element),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(text) => Some(text),
            RunContent::Void(_) => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.content, RunContent::Void(_))
    }

    /// Text, or the fixed literal for void runs
    pub fn literal(&self) -> &str {
        match &self.content {
            RunContent::Text(text) => text,
            RunContent::Void(element) => element.literal(),
        }
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.iter().any(|mark| &mark.tag == tag)
    }

    /// Index of the first mark rendering as element `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.tags.iter().position(|mark| mark.tag.name() == name)
    }

    pub fn anchor(&self) -> Option<&TagMark> {
        self.tags.iter().find(|mark| mark.tag.is_anchor())
    }

    /// Drop every forced block boundary carried by this run
    pub(crate) fn clear_force_close(&mut self) {
        for mark in &mut self.tags {
            mark.force_close = false;
        }
    }

    /// Keep only the outermost mark of each identity. Retargeting one of
    /// two nested anchors can make them equal.
    pub(crate) fn dedupe_tags(&mut self) {
        let mut seen: Vec<Tag> = Vec::with_capacity(self.tags.len());
        self.tags.retain(|mark| {
            if seen.contains(&mark.tag) {
                return false;
            }
            seen.push(mark.tag.clone());
            true
        });
    }
}
