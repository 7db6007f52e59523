//! Multi-range edits.
//!
//! A UI selection usually spans several runs. Every range is addressed
//! against the document as it was when the selection was made; applying
//! them in reading order and shifting later run indices by the runs each
//! split inserted keeps those addresses valid.

use crate::document::Document;
use crate::mutations::{MutationError, MutationResult};
use crate::words::Words;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Words `(count_from_end, count)` of run `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRange {
    pub run: usize,
    pub count_from_end: usize,
    pub count: usize,
}

impl WordRange {
    pub fn new(run: usize, count_from_end: usize, count: usize) -> Self {
        Self {
            run,
            count_from_end,
            count,
        }
    }
}

/// What to do with every range of a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum TagAction {
    Add {
        tag: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },
    Remove {
        tag: String,
    },
}

/// Word ranges over one snapshot of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ranges: Vec<WordRange>,
}

/// Totals for an applied selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// Words the action was asked to cover
    pub words: usize,

    /// Runs inserted by splitting
    pub inserted: usize,

    pub changed: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: WordRange) -> Self {
        self.push(range);
        self
    }

    pub fn push(&mut self, range: WordRange) {
        self.ranges.push(range);
    }

    pub fn ranges(&self) -> &[WordRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Ranges in reading order: by run, then from the start of the run
    fn ordered(&self) -> Vec<WordRange> {
        let mut ranges = self.ranges.clone();
        ranges.sort_by(|a, b| {
            a.run
                .cmp(&b.run)
                .then(b.count_from_end.cmp(&a.count_from_end))
        });
        ranges
    }

    /// Apply `action` to every range. Every addressed run is checked before
    /// anything is changed.
    pub fn apply(
        &self,
        doc: &mut Document,
        action: &TagAction,
    ) -> Result<SelectionOutcome, MutationError> {
        let ranges = self.ordered();
        for range in &ranges {
            if doc.run(range.run)?.is_void() {
                return Err(MutationError::VoidRun(range.run));
            }
        }

        let mut outcome = SelectionOutcome::default();
        let mut shift = 0;

        for range in ranges {
            let index = range.run + shift;
            let affected = doc.run(index)?.as_text().map_or(0, |text| {
                Words::new(text)
                    .range(range.count_from_end, range.count)
                    .len()
            });
            let result: MutationResult = match action {
                TagAction::Add { tag, attributes } => doc.add_tag(
                    index,
                    range.count_from_end,
                    range.count,
                    tag,
                    attributes.clone(),
                )?,
                TagAction::Remove { tag } => {
                    doc.remove_tag(index, range.count_from_end, range.count, tag)?
                }
            };

            shift += result.inserted;
            outcome.words += affected;
            outcome.inserted += result.inserted;
            outcome.changed |= result.changed;
        }

        Ok(outcome)
    }
}
