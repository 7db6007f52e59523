//! # Reconstructor
//!
//! Renders a [`Document`] back to markup.
//!
//! The flat model records which tags wrap each run but not how tags that
//! open on the same run nest. The reconstructor walks runs left to right
//! keeping a stack of open identities and picks that order itself: a tag
//! present in more of the following runs is opened further out, so it stays
//! open across them instead of being closed and reopened every time a
//! shorter-lived tag ends.

use crate::document::Document;
use crate::model::{Run, RunContent, Tag, TagMark};
use crate::schema::{LinkPolicy, Schema};
use flatmark_markup::{escape_attribute, escape_text};
use std::collections::HashMap;
use tracing::warn;

pub struct Reconstructor<'a> {
    schema: &'a Schema,
    policy: &'a dyn LinkPolicy,
}

impl<'a> Reconstructor<'a> {
    /// Reconstructor using the schema's own link policy
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            policy: schema,
        }
    }

    pub fn with_policy(schema: &'a Schema, policy: &'a dyn LinkPolicy) -> Self {
        Self { schema, policy }
    }

    pub fn render(&self, document: &Document) -> String {
        let runs = document.runs();
        let mut html = String::new();
        let mut open: Vec<Tag> = Vec::new();

        // Occurrences of each identity in the runs not yet visited
        let mut remaining: HashMap<&Tag, usize> = HashMap::new();
        for run in runs {
            for mark in &run.tags {
                *remaining.entry(&mark.tag).or_default() += 1;
            }
        }

        for run in runs {
            for mark in &run.tags {
                if let Some(count) = remaining.get_mut(&mark.tag) {
                    *count = count.saturating_sub(1);
                }
            }

            self.close_pass(run, &mut open, &mut html);

            let mut to_open: Vec<&TagMark> = run
                .tags
                .iter()
                .filter(|mark| !open.contains(&mark.tag))
                .collect();

            // Stable: ties, including tags unique to this run, keep encounter order
            to_open.sort_by_key(|mark| {
                std::cmp::Reverse(remaining.get(&mark.tag).copied().unwrap_or(0))
            });

            for mark in to_open {
                self.open_tag(mark, &mut html);
                open.push(mark.tag.clone());
            }

            match &run.content {
                RunContent::Text(text) => html.push_str(&escape_text(text)),
                RunContent::Void(element) => html.push_str(element.literal()),
            }
        }

        while let Some(tag) = open.pop() {
            self.close_tag(&tag, &mut html);
        }

        html
    }

    /// Close every open tag the run no longer carries, plus blocks the run
    /// forces closed. Anything opened above a closing tag is closed with it
    /// and reopened by the open pass, so nesting stays well formed.
    fn close_pass(&self, run: &Run, open: &mut Vec<Tag>, html: &mut String) {
        let must_close = |tag: &Tag| {
            !run.has_tag(tag)
                || run.tags.iter().any(|mark| {
                    &mark.tag == tag && mark.force_close && self.schema.is_block(tag.name())
                })
        };

        let Some(lowest) = open.iter().position(|tag| must_close(tag)) else {
            return;
        };

        while open.len() > lowest {
            if let Some(tag) = open.pop() {
                self.close_tag(&tag, html);
            }
        }
    }

    fn open_tag(&self, mark: &TagMark, html: &mut String) {
        match &mark.tag {
            Tag::Anchor(_) => {
                let stored = mark.href().unwrap_or_default();
                let href = if self.policy.is_safe(stored) {
                    stored
                } else {
                    warn!(href = stored, "unsafe link target replaced");
                    self.policy.placeholder()
                };
                html.push_str("<a href=\"");
                html.push_str(&escape_attribute(href));
                html.push_str("\">");
            }
            Tag::Named(name) => {
                if self.schema.allows(name) {
                    html.push('<');
                    html.push_str(name);
                    html.push('>');
                } else {
                    warn!(tag = %name, "dropping tag outside the allow-list");
                }
            }
        }
    }

    fn close_tag(&self, tag: &Tag, html: &mut String) {
        match tag {
            Tag::Anchor(_) => html.push_str("</a>"),
            Tag::Named(name) => {
                if self.schema.allows(name) {
                    html.push_str("</");
                    html.push_str(name);
                    html.push('>');
                }
            }
        }
    }
}

/// Render with the default schema
pub fn render(document: &Document) -> String {
    Reconstructor::new(&Schema::default()).render(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VoidElement;

    fn named(name: &str) -> TagMark {
        TagMark::named(name)
    }

    fn block(name: &str) -> TagMark {
        TagMark::named(name).with_force_close(true)
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(&Document::new()), "");
    }

    #[test]
    fn test_persistent_tag_opened_outermost() {
        // em and strong open together; strong continues, so it goes outside
        let doc = Document::from_runs(vec![
            Run::text(vec![named("em"), named("strong")], "a"),
            Run::text(vec![named("strong")], "b"),
        ]);
        assert_eq!(render(&doc), "<strong><em>a</em>b</strong>");
    }

    #[test]
    fn test_tie_keeps_encounter_order() {
        let doc = Document::from_runs(vec![Run::text(vec![named("em"), named("u")], "x")]);
        assert_eq!(render(&doc), "<em><u>x</u></em>");
    }

    #[test]
    fn test_counts_non_adjacent_runs() {
        let doc = Document::from_runs(vec![
            Run::text(vec![named("u"), named("em")], "a"),
            Run::text(vec![named("em")], "b"),
            Run::text(vec![], "c"),
            Run::text(vec![named("em")], "d"),
        ]);
        assert_eq!(render(&doc), "<em><u>a</u>b</em>c<em>d</em>");
    }

    #[test]
    fn test_inner_close_reopens_outer_siblings() {
        // strong was opened outside em; closing strong must not leave em dangling
        let doc = Document::from_runs(vec![
            Run::text(vec![named("strong")], "a"),
            Run::text(vec![named("strong"), named("em")], "b"),
            Run::text(vec![named("em")], "c"),
        ]);
        assert_eq!(render(&doc), "<strong>a<em>b</em></strong><em>c</em>");
    }

    #[test]
    fn test_force_close_splits_blocks() {
        let doc = Document::from_runs(vec![
            Run::text(vec![block("p")], "one"),
            Run::text(vec![block("p")], "two"),
        ]);
        assert_eq!(render(&doc), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_force_close_ignored_for_non_blocks() {
        let doc = Document::from_runs(vec![
            Run::text(vec![named("em")], "a"),
            Run::text(vec![named("em").with_force_close(true)], "b"),
        ]);
        assert_eq!(render(&doc), "<em>ab</em>");
    }

    #[test]
    fn test_anchor_distinctness() {
        let doc = Document::from_runs(vec![
            Run::text(vec![TagMark::anchor("/a")], "one"),
            Run::text(vec![TagMark::anchor("/a")], "two"),
            Run::text(vec![TagMark::anchor("/b")], "three"),
        ]);
        assert_eq!(
            render(&doc),
            r#"<a href="/a">onetwo</a><a href="/b">three</a>"#
        );
    }

    #[test]
    fn test_anchor_uses_stored_href() {
        let mut mark = TagMark::anchor("/identity");
        mark.attributes.insert("href".to_string(), "/stored".to_string());
        let doc = Document::from_runs(vec![Run::text(vec![mark], "x")]);
        assert_eq!(render(&doc), r#"<a href="/stored">x</a>"#);
    }

    #[test]
    fn test_script_href_neutralized() {
        let doc = Document::from_runs(vec![Run::text(
            vec![TagMark::anchor("javascript:alert(1)")],
            "x",
        )]);
        assert_eq!(render(&doc), r##"<a href="#">x</a>"##);
    }

    #[test]
    fn test_href_escaped() {
        let doc = Document::from_runs(vec![Run::text(
            vec![TagMark::anchor(r#"/x" onclick="y"#)],
            "x",
        )]);
        assert_eq!(
            render(&doc),
            r#"<a href="/x&quot; onclick=&quot;y">x</a>"#
        );
    }

    #[test]
    fn test_disallowed_tag_skipped_both_ways() {
        let doc = Document::from_runs(vec![Run::text(vec![named("script"), named("em")], "x")]);
        assert_eq!(render(&doc), "<em>x</em>");
    }

    #[test]
    fn test_text_escaped_void_literal_not() {
        let doc = Document::from_runs(vec![
            Run::text(vec![], "1 < 2"),
            Run::void(vec![], VoidElement::Br),
        ]);
        assert_eq!(render(&doc), "1 &lt; 2<br>");
    }

    struct AllowAll;

    impl LinkPolicy for AllowAll {
        fn is_safe(&self, _href: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_custom_link_policy() {
        let schema = Schema::default();
        let doc = Document::from_runs(vec![Run::text(vec![TagMark::anchor("javascript:x")], "x")]);
        let html = Reconstructor::with_policy(&schema, &AllowAll).render(&doc);
        assert_eq!(html, r#"<a href="javascript:x">x</a>"#);
    }
}
