//! # Document
//!
//! The flat model: an ordered sequence of [`Run`]s in reading order. Order is
//! the only record of position; runs store no index.
//!
//! ## Lifecycle
//!
//! ```text
//! Flatten → Mutate (in place) → Reconstruct
//!   ↓          ↓                   ↓
//! Tree      add/remove/update    Markup
//! ```

use crate::model::{Run, ANCHOR};
use crate::mutations::MutationError;
use crate::words::Words;
use serde::{Deserialize, Serialize};

/// Ordered sequence of runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    runs: Vec<Run>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<Run> {
        self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Run> {
        self.runs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    /// Run at `index`, or an out-of-bounds error
    pub fn run(&self, index: usize) -> Result<&Run, MutationError> {
        self.runs.get(index).ok_or(MutationError::RunOutOfBounds {
            index,
            len: self.runs.len(),
        })
    }

    pub(crate) fn run_mut(&mut self, index: usize) -> Result<&mut Run, MutationError> {
        let len = self.runs.len();
        self.runs
            .get_mut(index)
            .ok_or(MutationError::RunOutOfBounds { index, len })
    }

    pub(crate) fn insert(&mut self, index: usize, run: Run) {
        self.runs.insert(index, run);
    }

    pub(crate) fn push(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Words of a text run, as addressed by the mutation operations.
    /// Void runs have no words.
    pub fn words(&self, index: usize) -> Result<Vec<&str>, MutationError> {
        let run = self.run(index)?;
        Ok(run
            .as_text()
            .map(|text| Words::new(text).words)
            .unwrap_or_default())
    }

    /// Distinct link targets in document order
    pub fn links(&self) -> Vec<&str> {
        let mut links: Vec<&str> = Vec::new();
        for run in &self.runs {
            if let Some(href) = run.anchor().and_then(|mark| mark.href()) {
                if !links.contains(&href) {
                    links.push(href);
                }
            }
        }
        links
    }

    /// Indices of runs linked to `href`
    pub fn runs_with_href(&self, href: &str) -> Vec<usize> {
        self.runs
            .iter()
            .enumerate()
            .filter(|(_, run)| {
                run.tags
                    .iter()
                    .any(|mark| mark.tag.name() == ANCHOR && mark.href() == Some(href))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Concatenated text of all text runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().filter_map(Run::as_text).collect()
    }

    /// Load a document from its serialized form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

impl FromIterator<Run> for Document {
    fn from_iter<I: IntoIterator<Item = Run>>(iter: I) -> Self {
        Self {
            runs: iter.into_iter().collect(),
        }
    }
}
