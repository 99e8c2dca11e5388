use std::sync::Arc;

use rstest::rstest;
use xdm_model::iter::collect;
use xdm_model::model::simple::{attr_ns, doc, elem, NodeBuilder};
use xdm_model::names::standard;
use xdm_model::navigator::escape_uri;
use xdm_model::{NamePool, XdmNode};

fn pool() -> Arc<NamePool> {
    Arc::new(NamePool::new())
}

fn xml_base(value: &str) -> NodeBuilder {
    attr_ns("xml", standard::XML_NS, "base", value)
}

#[rstest]
fn falls_back_to_the_system_id() {
    let pool = pool();
    let root = doc()
        .system_id("http://example.com/doc.xml")
        .child(elem("a").child(elem("b")))
        .build(&pool)
        .unwrap();
    let a = collect(root.children()).remove(0);
    let b = collect(a.children()).remove(0);
    assert_eq!(b.base_uri().as_deref(), Some("http://example.com/doc.xml"));
}

#[rstest]
fn relative_xml_base_resolves_against_the_ancestor() {
    let pool = pool();
    let root = doc()
        .system_id("http://example.com/dir/doc.xml")
        .child(
            elem("a")
                .attribute(xml_base("sub/"))
                .child(elem("b").attribute(xml_base("leaf.xml"))),
        )
        .build(&pool)
        .unwrap();
    let a = collect(root.children()).remove(0);
    let b = collect(a.children()).remove(0);
    assert_eq!(
        a.base_uri().as_deref(),
        Some("http://example.com/dir/sub/")
    );
    assert_eq!(
        b.base_uri().as_deref(),
        Some("http://example.com/dir/sub/leaf.xml")
    );
}

#[rstest]
fn absolute_xml_base_replaces_the_ancestor_base() {
    let pool = pool();
    let root = doc()
        .system_id("http://example.com/doc.xml")
        .child(elem("a").attribute(xml_base("https://other.example/x/")))
        .build(&pool)
        .unwrap();
    let a = collect(root.children()).remove(0);
    assert_eq!(a.base_uri().as_deref(), Some("https://other.example/x/"));
}

#[rstest]
fn spaces_in_xml_base_are_escaped_before_resolution() {
    let pool = pool();
    let root = doc()
        .system_id("http://example.com/dir/doc.xml")
        .child(elem("a").attribute(xml_base("my file.xml")))
        .build(&pool)
        .unwrap();
    let a = collect(root.children()).remove(0);
    assert_eq!(
        a.base_uri().as_deref(),
        Some("http://example.com/dir/my%20file.xml")
    );
}

#[rstest]
fn no_base_anywhere_is_none() {
    let pool = pool();
    let root = doc().child(elem("a")).build(&pool).unwrap();
    let a = collect(root.children()).remove(0);
    assert_eq!(a.base_uri(), None);
}

#[rstest]
fn escape_uri_rules() {
    assert_eq!(escape_uri("plain/path?q=1#f"), "plain/path?q=1#f");
    assert_eq!(escape_uri("a b"), "a%20b");
    assert_eq!(escape_uri("<>\"{}|\\^`"), "%3C%3E%22%7B%7D%7C%5C%5E%60");
    assert_eq!(escape_uri("tab\there"), "tab%09here");
    // Already-encoded input is left alone.
    assert_eq!(escape_uri("a%20b"), "a%20b");
    // Non-ASCII goes out as UTF-8 percent escapes.
    assert_eq!(escape_uri("f\u{fc}r"), "f%C3%BCr");
}
