//! # Edit Session
//!
//! Owns the document for one editing session together with the schema it is
//! rendered with and the last rendered markup. Any mutation that changes the
//! document drops the cached markup; the next [`EditSession::render`]
//! rebuilds it.

use crate::document::Document;
use crate::flatten::Flattener;
use crate::mutations::{Mutation, MutationResult};
use crate::render::Reconstructor;
use crate::schema::Schema;
use crate::selection::{Selection, SelectionOutcome, TagAction};
use crate::EditorError;
use flatmark_markup::parse_fragment;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Single-document edit session
#[derive(Debug, Clone)]
pub struct EditSession {
    document: Document,
    schema: Schema,

    /// Increments on every change to the document
    version: u64,

    /// Markup rendered from the current version, if still valid
    rendered: Option<String>,
}

impl EditSession {
    pub fn new(document: Document, schema: Schema) -> Self {
        Self {
            document,
            schema,
            version: 0,
            rendered: None,
        }
    }

    /// Parse an HTML fragment and flatten it. The fragment's synthetic root
    /// is the swallowed wrapper, so every element in `html` becomes a tag.
    #[instrument(skip_all, fields(len = html.len()))]
    pub fn from_html(html: &str, schema: Schema) -> Result<Self, EditorError> {
        let tree = parse_fragment(html)?;
        let document = Flattener::new(&schema).flatten(&tree);
        Ok(Self::new(document, schema))
    }

    /// Restore a session from a stored document
    pub fn load(json: &str, schema: Schema) -> Result<Self, EditorError> {
        Ok(Self::new(Document::from_json(json)?, schema))
    }

    /// Serialized form of the current document
    pub fn store(&self) -> Result<String, EditorError> {
        Ok(self.document.to_json()?)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the next render has to rebuild the markup
    pub fn is_dirty(&self) -> bool {
        self.rendered.is_none()
    }

    /// Replace the document, e.g. after re-flattening an edited tree
    pub fn reset(&mut self, document: Document) {
        self.document = document;
        self.touch();
    }

    /// Markup for the current document, rebuilt only after a change
    pub fn render(&mut self) -> &str {
        if self.rendered.is_none() {
            debug!(version = self.version, runs = self.document.len(), "rendering");
            let html = Reconstructor::new(&self.schema).render(&self.document);
            self.rendered = Some(html);
        }
        self.rendered.as_deref().unwrap_or_default()
    }

    #[instrument(skip(self), fields(version = self.version))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let result = mutation.apply(&mut self.document)?;
        if result.changed {
            self.touch();
        }
        Ok(result)
    }

    pub fn add_tag(
        &mut self,
        run: usize,
        count_from_end: usize,
        count: usize,
        tag: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::AddTag {
            run,
            count_from_end,
            count,
            tag: tag.to_string(),
            attributes,
        })
    }

    pub fn remove_tag(
        &mut self,
        run: usize,
        count_from_end: usize,
        count: usize,
        tag: &str,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::RemoveTag {
            run,
            count_from_end,
            count,
            tag: tag.to_string(),
        })
    }

    pub fn update_attributes(
        &mut self,
        runs: Vec<usize>,
        tag: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::UpdateAttributes {
            runs,
            tag: tag.to_string(),
            attributes,
        })
    }

    #[instrument(skip_all, fields(ranges = selection.ranges().len()))]
    pub fn apply_selection(
        &mut self,
        selection: &Selection,
        action: &TagAction,
    ) -> Result<SelectionOutcome, EditorError> {
        let outcome = selection.apply(&mut self.document, action)?;
        if outcome.changed {
            self.touch();
        }
        Ok(outcome)
    }

    /// Point every link to `old_href` at `new_href`; returns the runs updated
    pub fn retarget_link(&mut self, old_href: &str, new_href: &str) -> Result<usize, EditorError> {
        let runs = self.document.runs_with_href(old_href);
        if runs.is_empty() {
            return Ok(0);
        }

        let count = runs.len();
        let mut attributes = BTreeMap::new();
        attributes.insert("href".to_string(), new_href.to_string());
        self.update_attributes(runs, crate::model::ANCHOR, attributes)?;
        Ok(count)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.rendered = None;
    }
}
