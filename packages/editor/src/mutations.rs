//! # Run Mutations
//!
//! Adding, removing and updating tags over word ranges of the flat model.
//!
//! ## Word addressing
//!
//! A range inside run `run` is `(count_from_end, count)`: `count_from_end`
//! is the number of words from the range start to the end of the run, and
//! `count` the number of words in the range. Counting from the end keeps an
//! address stable while earlier words of the same run are split off by a
//! previous edit. Both values are clamped, never rejected.
//!
//! ## Splitting
//!
//! A range covering the whole run is mutated in place. Otherwise the run is
//! cut into front / middle / back pieces in reading order, only the middle
//! piece is mutated, and the number of runs inserted (0, 1 or 2) is reported
//! so callers can shift run indices they hold. Inserted copies never carry a
//! forced block boundary.

use crate::document::Document;
use crate::model::{Run, RunContent, TagMark, ANCHOR};
use crate::words::Words;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Tag mutations over the flat model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Wrap a word range of a run in a tag
    AddTag {
        run: usize,
        count_from_end: usize,
        count: usize,
        tag: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },

    /// Remove a tag (by element name) from a word range of a run
    RemoveTag {
        run: usize,
        count_from_end: usize,
        count: usize,
        tag: String,
    },

    /// Replace the attributes of a tag on whole runs
    UpdateAttributes {
        runs: Vec<usize>,
        tag: String,
        attributes: BTreeMap<String, String>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Run {index} out of bounds (document has {len} runs)")]
    RunOutOfBounds { index: usize, len: usize },

    #[error("Run {0} is a void element and cannot be formatted")]
    VoidRun(usize),

    #[error("Tag <{tag}> requires attribute `{name}`")]
    MissingAttribute { tag: String, name: String },
}

/// Result of applying a mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationResult {
    /// Runs inserted into the document by splitting
    pub inserted: usize,

    /// Whether the document changed at all
    pub changed: bool,
}

impl MutationResult {
    pub fn unchanged() -> Self {
        Self::default()
    }

    fn changed(inserted: usize) -> Self {
        Self {
            inserted,
            changed: true,
        }
    }
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<MutationResult, MutationError> {
        match self {
            Mutation::AddTag {
                run,
                count_from_end,
                count,
                tag,
                attributes,
            } => doc.add_tag(*run, *count_from_end, *count, tag, attributes.clone()),

            Mutation::RemoveTag {
                run,
                count_from_end,
                count,
                tag,
            } => doc.remove_tag(*run, *count_from_end, *count, tag),

            Mutation::UpdateAttributes {
                runs,
                tag,
                attributes,
            } => doc.update_attributes(runs, tag, attributes.clone()),
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::AddTag {
                run,
                tag,
                attributes,
                ..
            } => {
                check_text_run(doc, *run)?;
                require_href(tag, attributes)
            }

            Mutation::RemoveTag { run, .. } => check_text_run(doc, *run),

            Mutation::UpdateAttributes {
                runs,
                tag,
                attributes,
            } => {
                for run in runs {
                    doc.run(*run)?;
                }
                require_href(tag, attributes)
            }
        }
    }
}

fn check_text_run(doc: &Document, index: usize) -> Result<(), MutationError> {
    if doc.run(index)?.is_void() {
        return Err(MutationError::VoidRun(index));
    }
    Ok(())
}

fn require_href(tag: &str, attributes: &BTreeMap<String, String>) -> Result<(), MutationError> {
    if tag == ANCHOR && !attributes.contains_key("href") {
        return Err(MutationError::MissingAttribute {
            tag: tag.to_string(),
            name: "href".to_string(),
        });
    }
    Ok(())
}

impl Document {
    /// Wrap words of run `index` in `tag`.
    ///
    /// For anchors, a targeted piece that already sits inside a link gets
    /// that link retargeted instead of a second anchor; other runs are not
    /// touched. Adding a tag the run already carries is a no-op.
    pub fn add_tag(
        &mut self,
        index: usize,
        count_from_end: usize,
        count: usize,
        tag: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<MutationResult, MutationError> {
        check_text_run(self, index)?;
        require_href(tag, &attributes)?;

        let run = self.run(index)?;
        let already_present = if tag == ANCHOR {
            run.anchor().and_then(TagMark::href) == attributes.get("href").map(String::as_str)
        } else {
            run.position_of(tag).is_some()
        };
        if already_present {
            return Ok(MutationResult::unchanged());
        }

        self.split_apply(index, count_from_end, count, |run| {
            if tag == ANCHOR {
                if let Some(mark) = run.tags.iter_mut().find(|mark| mark.tag.is_anchor()) {
                    mark.set_attributes(attributes);
                    run.dedupe_tags();
                    return;
                }
                let mut mark = TagMark::anchor(attributes.get("href").cloned().unwrap_or_default());
                mark.set_attributes(attributes);
                run.tags.push(mark);
            } else {
                let mut mark = TagMark::named(tag);
                mark.attributes = attributes;
                run.tags.push(mark);
            }
        })
    }

    /// Remove the first mark rendering as `tag` from words of run `index`.
    /// `"a"` matches an anchor with any target. Missing tags are a no-op.
    pub fn remove_tag(
        &mut self,
        index: usize,
        count_from_end: usize,
        count: usize,
        tag: &str,
    ) -> Result<MutationResult, MutationError> {
        check_text_run(self, index)?;

        if self.run(index)?.position_of(tag).is_none() {
            return Ok(MutationResult::unchanged());
        }

        self.split_apply(index, count_from_end, count, |run| {
            if let Some(position) = run.position_of(tag) {
                run.tags.remove(position);
            }
        })
    }

    /// Replace the attributes of the first `tag` mark on each listed run.
    /// Anchors follow the new href. Runs without the tag are skipped.
    pub fn update_attributes(
        &mut self,
        indices: &[usize],
        tag: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<MutationResult, MutationError> {
        require_href(tag, &attributes)?;
        for &index in indices {
            self.run(index)?;
        }

        let mut changed = false;
        for &index in indices {
            let run = self.run_mut(index)?;
            if let Some(position) = run.position_of(tag) {
                run.tags[position].set_attributes(attributes.clone());
                run.dedupe_tags();
                changed = true;
            }
        }

        Ok(MutationResult {
            inserted: 0,
            changed,
        })
    }

    /// Cut run `index` around the addressed words and apply `action` to the
    /// piece holding them
    fn split_apply<F>(
        &mut self,
        index: usize,
        count_from_end: usize,
        count: usize,
        action: F,
    ) -> Result<MutationResult, MutationError>
    where
        F: FnOnce(&mut Run),
    {
        let (range, segments, original) = {
            let run = self.run(index)?;
            let Some(text) = run.as_text() else {
                return Err(MutationError::VoidRun(index));
            };

            let words = Words::new(text);
            let range = words.range(count_from_end, count);
            if range.is_empty() {
                debug!(run = index, count_from_end, count, "empty word range");
                return Ok(MutationResult::unchanged());
            }

            let segments = words.segments(range.clone()).absorb_blank_edges();
            (range, segments, run.clone())
        };

        if segments.middle.trim().is_empty() {
            debug!(run = index, ?range, "word range holds no text");
            return Ok(MutationResult::unchanged());
        }

        if segments.front.is_empty() && segments.back.is_empty() {
            action(self.run_mut(index)?);
            return Ok(MutationResult::changed(0));
        }

        let piece = |text: String| {
            let mut copy = original.clone();
            copy.content = RunContent::Text(text);
            copy.clear_force_close();
            copy
        };

        let mut inserted = 0;
        let target = if segments.front.is_empty() {
            // The range starts the run: the run itself becomes the middle and
            // keeps any forced block boundary it had.
            let back = piece(segments.back);
            let run = self.run_mut(index)?;
            run.content = RunContent::Text(segments.middle);
            self.insert(index + 1, back);
            inserted += 1;
            index
        } else {
            self.run_mut(index)?.content = RunContent::Text(segments.front);
            self.insert(index + 1, piece(segments.middle));
            inserted += 1;
            if !segments.back.is_empty() {
                self.insert(index + 2, piece(segments.back));
                inserted += 1;
            }
            index + 1
        };

        debug!(run = index, ?range, inserted, "split run");
        action(self.run_mut(target)?);
        Ok(MutationResult::changed(inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    fn href(target: &str) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        attrs.insert("href".to_string(), target.to_string());
        attrs
    }

    fn single(tags: Vec<TagMark>, text: &str) -> Document {
        Document::from_runs(vec![Run::text(tags, text)])
    }

    fn texts(doc: &Document) -> Vec<&str> {
        doc.runs().iter().map(Run::literal).collect()
    }

    #[test]
    fn test_add_tag_whole_run_in_place() {
        let mut doc = single(vec![], "one two");
        let result = doc.add_tag(0, 2, 2, "em", BTreeMap::new()).unwrap();

        assert_eq!(result, MutationResult::changed(0));
        assert_eq!(doc.len(), 1);
        assert!(doc.runs()[0].has_tag(&Tag::named("em")));
    }

    #[test]
    fn test_add_tag_middle_word() {
        let mut doc = single(vec![], "one two three");
        let result = doc.add_tag(0, 2, 1, "u", BTreeMap::new()).unwrap();

        assert_eq!(result.inserted, 2);
        assert_eq!(texts(&doc), vec!["one ", "two", " three"]);
        assert!(!doc.runs()[0].has_tag(&Tag::named("u")));
        assert!(doc.runs()[1].has_tag(&Tag::named("u")));
        assert!(!doc.runs()[2].has_tag(&Tag::named("u")));
    }

    #[test]
    fn test_add_tag_leading_words_keeps_run_first() {
        let mut doc = single(vec![TagMark::named("p").with_force_close(true)], "one two three");
        let result = doc.add_tag(0, 3, 2, "em", BTreeMap::new()).unwrap();

        assert_eq!(result.inserted, 1);
        assert_eq!(texts(&doc), vec!["one two", " three"]);
        assert!(doc.runs()[0].tags[0].force_close);
        assert!(!doc.runs()[1].tags[0].force_close);
        assert!(doc.runs()[0].has_tag(&Tag::named("em")));
    }

    #[test]
    fn test_add_tag_trailing_words() {
        let mut doc = single(vec![], "one two three");
        let result = doc.add_tag(0, 1, 1, "strong", BTreeMap::new()).unwrap();

        assert_eq!(result.inserted, 1);
        assert_eq!(texts(&doc), vec!["one two ", "three"]);
        assert!(doc.runs()[1].has_tag(&Tag::named("strong")));
    }

    #[test]
    fn test_split_strips_force_close_from_copies() {
        let mut doc = single(vec![TagMark::named("p").with_force_close(true)], "a b c");
        doc.add_tag(0, 2, 1, "em", BTreeMap::new()).unwrap();

        let flags: Vec<bool> = doc.runs().iter().map(|run| run.tags[0].force_close).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_count_clamped() {
        let mut doc = single(vec![], "one two three");
        let result = doc.add_tag(0, 2, 99, "em", BTreeMap::new()).unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(texts(&doc), vec!["one ", "two three"]);
    }

    #[test]
    fn test_count_from_end_clamped() {
        let mut doc = single(vec![], "one two");
        let result = doc.add_tag(0, 50, 1, "em", BTreeMap::new()).unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(texts(&doc), vec!["one", " two"]);
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut doc = single(vec![], "one two");
        let before = doc.clone();
        assert_eq!(doc.add_tag(0, 0, 3, "em", BTreeMap::new()).unwrap(), MutationResult::unchanged());
        assert_eq!(doc.add_tag(0, 1, 0, "em", BTreeMap::new()).unwrap(), MutationResult::unchanged());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_existing_tag_is_noop() {
        let mut doc = single(vec![TagMark::named("em")], "one two");
        let before = doc.clone();
        assert_eq!(doc.add_tag(0, 1, 1, "em", BTreeMap::new()).unwrap(), MutationResult::unchanged());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_anchor_requires_href() {
        let mut doc = single(vec![], "x");
        let err = doc.add_tag(0, 1, 1, "a", BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            MutationError::MissingAttribute {
                tag: "a".to_string(),
                name: "href".to_string()
            }
        );
    }

    #[test]
    fn test_add_anchor_pushes_identity() {
        let mut doc = single(vec![], "go there");
        doc.add_tag(0, 1, 1, "a", href("/x")).unwrap();
        assert!(doc.runs()[1].has_tag(&Tag::anchor("/x")));
        assert_eq!(doc.runs()[1].anchor().and_then(TagMark::href), Some("/x"));
    }

    #[test]
    fn test_add_anchor_over_link_retargets_only_range() {
        let mut doc = single(vec![TagMark::anchor("/old")], "one two three");
        let result = doc.add_tag(0, 1, 1, "a", href("/new")).unwrap();

        assert_eq!(result.inserted, 1);
        assert!(doc.runs()[0].has_tag(&Tag::anchor("/old")));
        assert!(doc.runs()[1].has_tag(&Tag::anchor("/new")));
        assert_eq!(doc.runs()[1].tags.len(), 1);
    }

    #[test]
    fn test_add_anchor_over_whole_link_retargets_in_place() {
        let mut doc = single(vec![TagMark::anchor("/old")], "one two");
        let result = doc.add_tag(0, 2, 2, "a", href("/new")).unwrap();

        assert_eq!(result, MutationResult::changed(0));
        assert_eq!(doc.runs()[0].tags, vec![TagMark::anchor("/new")]);
    }

    #[test]
    fn test_remove_tag_sub_range() {
        let mut doc = single(vec![TagMark::named("strong"), TagMark::named("em")], "a b c");
        let result = doc.remove_tag(0, 2, 1, "strong").unwrap();

        assert_eq!(result.inserted, 2);
        assert!(doc.runs()[0].has_tag(&Tag::named("strong")));
        assert_eq!(doc.runs()[1].tags, vec![TagMark::named("em")]);
        assert!(doc.runs()[2].has_tag(&Tag::named("strong")));
    }

    #[test]
    fn test_remove_missing_tag_is_noop() {
        let mut doc = single(vec![TagMark::named("em")], "a b c");
        let before = doc.clone();
        let result = doc.remove_tag(0, 2, 1, "strong").unwrap();
        assert_eq!(result, MutationResult::unchanged());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_remove_matches_exact_name() {
        let mut doc = single(vec![TagMark::named("strike")], "x");
        assert!(!doc.remove_tag(0, 1, 1, "s").unwrap().changed);
        assert!(!doc.remove_tag(0, 1, 1, "strong").unwrap().changed);
    }

    #[test]
    fn test_remove_anchor_by_name() {
        let mut doc = single(vec![TagMark::anchor("/any")], "x");
        let result = doc.remove_tag(0, 1, 1, "a").unwrap();
        assert_eq!(result, MutationResult::changed(0));
        assert!(doc.runs()[0].tags.is_empty());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut doc = single(vec![], "x");
        assert_eq!(
            doc.add_tag(3, 1, 1, "em", BTreeMap::new()).unwrap_err(),
            MutationError::RunOutOfBounds { index: 3, len: 1 }
        );
        assert!(doc.remove_tag(1, 1, 1, "em").is_err());
        assert!(doc.update_attributes(&[0, 1], "a", href("/x")).is_err());
    }

    #[test]
    fn test_void_run_rejected() {
        let mut doc = Document::from_runs(vec![Run::void(vec![], crate::model::VoidElement::Br)]);
        assert_eq!(
            doc.add_tag(0, 1, 1, "em", BTreeMap::new()).unwrap_err(),
            MutationError::VoidRun(0)
        );
    }

    #[test]
    fn test_update_attributes_retargets_anchor() {
        let mut doc = Document::from_runs(vec![
            Run::text(vec![TagMark::anchor("/old")], "a"),
            Run::text(vec![], "b"),
            Run::text(vec![TagMark::named("em"), TagMark::anchor("/old")], "c"),
        ]);
        let result = doc.update_attributes(&[0, 1, 2], "a", href("/new")).unwrap();

        assert!(result.changed);
        assert_eq!(doc.len(), 3);
        assert!(doc.runs()[0].has_tag(&Tag::anchor("/new")));
        assert!(doc.runs()[2].has_tag(&Tag::anchor("/new")));
        assert_eq!(doc.runs_with_href("/new"), vec![0, 2]);
    }

    #[test]
    fn test_retarget_onto_nested_anchor_keeps_one() {
        let mut doc = single(vec![TagMark::anchor("/outer"), TagMark::anchor("/inner")], "a");
        let result = doc.update_attributes(&[0], "a", href("/inner")).unwrap();

        assert!(result.changed);
        let run = &doc.runs()[0];
        assert_eq!(run.tags.len(), 1);
        assert!(run.has_tag(&Tag::anchor("/inner")));
    }

    #[test]
    fn test_add_anchor_onto_nested_anchor_keeps_one() {
        let mut doc = single(vec![TagMark::anchor("/outer"), TagMark::anchor("/inner")], "a b");
        doc.add_tag(0, 2, 2, "a", href("/inner")).unwrap();

        let run = &doc.runs()[0];
        assert_eq!(run.tags.len(), 1);
        assert_eq!(doc.runs_with_href("/inner"), vec![0]);
    }

    #[test]
    fn test_update_attributes_without_match() {
        let mut doc = single(vec![TagMark::named("em")], "a");
        let result = doc.update_attributes(&[0], "a", href("/x")).unwrap();
        assert!(!result.changed);
    }

    #[test]
    fn test_mutation_serde() {
        let mutation: Mutation = serde_json::from_str(
            r#"{ "op": "addTag", "run": 0, "countFromEnd": 2, "count": 1, "tag": "em" }"#,
        )
        .unwrap();

        assert_eq!(
            mutation,
            Mutation::AddTag {
                run: 0,
                count_from_end: 2,
                count: 1,
                tag: "em".to_string(),
                attributes: BTreeMap::new(),
            }
        );
    }

    #[test]
    fn test_mutation_validate() {
        let doc = single(vec![], "x");
        let bad = Mutation::RemoveTag {
            run: 4,
            count_from_end: 1,
            count: 1,
            tag: "em".to_string(),
        };
        assert!(bad.validate(&doc).is_err());

        let good = Mutation::AddTag {
            run: 0,
            count_from_end: 1,
            count: 1,
            tag: "a".to_string(),
            attributes: href("/x"),
        };
        assert!(good.validate(&doc).is_ok());
    }
}
