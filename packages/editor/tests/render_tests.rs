//! Reconstruction tests over hand-built documents

use flatmark_editor::{Document, LinkPolicy, Reconstructor, Run, Schema, TagMark, VoidElement};

fn p_first() -> TagMark {
    TagMark::named("p").with_force_close(true)
}

#[test]
fn test_most_persistent_tag_outermost() {
    let doc = Document::from_runs(vec![
        Run::text(vec![TagMark::named("u"), TagMark::named("em"), TagMark::named("strong")], "a"),
        Run::text(vec![TagMark::named("em"), TagMark::named("strong")], "b"),
        Run::text(vec![TagMark::named("strong")], "c"),
    ]);
    let html = Reconstructor::new(&Schema::default()).render(&doc);
    assert_eq!(html, "<strong><em><u>a</u>b</em>c</strong>");
}

#[test]
fn test_block_reopened_only_at_forced_boundary() {
    let doc = Document::from_runs(vec![
        Run::text(vec![p_first()], "a"),
        Run::text(vec![TagMark::named("p")], "b"),
        Run::void(vec![TagMark::named("p")], VoidElement::Br),
        Run::text(vec![p_first()], "c"),
    ]);
    let html = Reconstructor::new(&Schema::default()).render(&doc);
    assert_eq!(html, "<p>ab<br></p><p>c</p>");
}

#[test]
fn test_custom_block_tags() {
    let schema = Schema {
        block_tags: vec!["div".to_string()],
        ..Schema::default()
    };
    let doc = Document::from_runs(vec![
        Run::text(vec![TagMark::named("div").with_force_close(true)], "a"),
        Run::text(vec![TagMark::named("div").with_force_close(true)], "b"),
        Run::text(vec![p_first()], "c"),
        Run::text(vec![p_first()], "d"),
    ]);
    let html = Reconstructor::new(&schema).render(&doc);
    assert_eq!(html, "<div>a</div><div>b</div><p>cd</p>");
}

struct HttpsOnly;

impl LinkPolicy for HttpsOnly {
    fn is_safe(&self, href: &str) -> bool {
        href.starts_with("https://")
    }

    fn placeholder(&self) -> &str {
        "about:blank"
    }
}

#[test]
fn test_pluggable_link_policy() {
    let schema = Schema::default();
    let doc = Document::from_runs(vec![
        Run::text(vec![TagMark::anchor("http://plain")], "a"),
        Run::text(vec![TagMark::anchor("https://secure")], "b"),
    ]);
    let html = Reconstructor::with_policy(&schema, &HttpsOnly).render(&doc);
    assert_eq!(
        html,
        r#"<a href="about:blank">a</a><a href="https://secure">b</a>"#
    );
}

#[test]
fn test_unsafe_href_stays_stored() {
    let doc = Document::from_runs(vec![Run::text(vec![TagMark::anchor("javascript:void(0)")], "x")]);
    let html = Reconstructor::new(&Schema::default()).render(&doc);

    assert_eq!(html, r##"<a href="#">x</a>"##);
    assert_eq!(doc.links(), vec!["javascript:void(0)"]);
}

#[test]
fn test_configured_placeholder() {
    let schema = Schema {
        placeholder_href: "/blocked".to_string(),
        ..Schema::default()
    };
    let doc = Document::from_runs(vec![Run::text(vec![TagMark::anchor("javascript:x")], "x")]);
    assert_eq!(
        Reconstructor::new(&schema).render(&doc),
        r#"<a href="/blocked">x</a>"#
    );
}
