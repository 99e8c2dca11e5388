use std::sync::Arc;

use rstest::rstest;
use xdm_model::iter::collect;
use xdm_model::model::simple::{attr_ns, doc, elem, text, SimpleNode};
use xdm_model::names::standard;
use xdm_model::stripped::{
    is_whitespace_only, SpaceStrippingRule, StripAllRule, StrippedDocument,
};
use xdm_model::{Axis, Fingerprint, NamePool, NodeKind, XdmNode};

fn pool() -> Arc<NamePool> {
    Arc::new(NamePool::new())
}

fn xml_space_preserve() -> xdm_model::model::simple::NodeBuilder {
    attr_ns("xml", standard::XML_NS, "space", "preserve")
}

#[rstest]
fn whitespace_only_text_is_hidden() {
    let pool = pool();
    let root = doc()
        .child(
            elem("r")
                .child(text("\n  "))
                .child(elem("a"))
                .child(text("\t"))
                .child(elem("b"))
                .child(text("kept")),
        )
        .build(&pool)
        .unwrap();
    let view = StrippedDocument::new(root, Arc::new(StripAllRule));
    let r = collect(view.stripped_root().children()).remove(0);
    let kids = collect(r.children());
    let kinds: Vec<NodeKind> = kids.iter().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        [NodeKind::Element, NodeKind::Element, NodeKind::Text]
    );
    assert_eq!(kids[2].string_value(), "kept");
    assert_eq!(r.string_value(), "kept");
}

#[rstest]
fn underlying_tree_is_untouched() {
    let pool = pool();
    let root = doc()
        .child(elem("r").child(text("  ")).child(elem("a")))
        .build(&pool)
        .unwrap();
    let view = StrippedDocument::new(root.clone(), Arc::new(StripAllRule));
    let r_view = collect(view.stripped_root().children()).remove(0);
    assert_eq!(collect(r_view.children()).len(), 1);
    let r_real = collect(root.children()).remove(0);
    assert_eq!(collect(r_real.children()).len(), 2);
}

#[rstest]
fn xml_space_preserve_wins_over_the_rule() {
    let pool = pool();
    let root = doc()
        .child(
            elem("r")
                .child(text("  "))
                .child(
                    elem("pre")
                        .attribute(xml_space_preserve())
                        .child(text("  "))
                        .child(elem("inner").child(text("  "))),
                ),
        )
        .build(&pool)
        .unwrap();
    let view = StrippedDocument::new(root, Arc::new(StripAllRule));
    let r = collect(view.stripped_root().children()).remove(0);
    let kids = collect(r.children());
    // The loose text under r goes; everything under xml:space="preserve"
    // stays, including under nested elements.
    assert_eq!(kids.len(), 1);
    let pre = kids[0].clone();
    assert_eq!(collect(pre.children()).len(), 2);
    let inner = collect(pre.children())[1].clone();
    assert_eq!(collect(inner.children()).len(), 1);
    assert_eq!(pre.string_value(), "    ");
}

#[rstest]
fn selective_rule_strips_by_element_name() {
    struct OnlyUnder(Fingerprint);
    impl SpaceStrippingRule for OnlyUnder {
        fn strips(&self, element: Option<Fingerprint>) -> bool {
            element == Some(self.0)
        }
    }
    let pool = pool();
    let root = doc()
        .child(
            elem("r")
                .child(elem("strip").child(text("  ")))
                .child(elem("keep").child(text("  "))),
        )
        .build(&pool)
        .unwrap();
    let fp = pool.fingerprint_for("", "strip").unwrap();
    let view = StrippedDocument::new(root, Arc::new(OnlyUnder(fp)));
    let r = collect(view.stripped_root().children()).remove(0);
    let kids = collect(r.children());
    assert!(collect(kids[0].children()).is_empty());
    assert_eq!(collect(kids[1].children()).len(), 1);
}

#[rstest]
fn view_nodes_compare_equal_per_underlying_node() {
    let pool = pool();
    let root = doc().child(elem("a")).build(&pool).unwrap();
    let view = StrippedDocument::new(root, Arc::new(StripAllRule));
    let once = collect(view.stripped_root().children()).remove(0);
    let twice = collect(view.stripped_root().children()).remove(0);
    assert_eq!(once, twice);
    assert_eq!(once.parent(), Some(view.stripped_root()));
}

#[rstest]
fn generic_axes_work_through_the_view() {
    let pool = pool();
    let root = doc()
        .child(
            elem("r")
                .child(text(" "))
                .child(elem("a"))
                .child(text(" "))
                .child(elem("b")),
        )
        .build(&pool)
        .unwrap();
    let view = StrippedDocument::new(root, Arc::new(StripAllRule));
    let r = collect(view.stripped_root().children()).remove(0);
    let a = collect(r.children()).remove(0);
    // Sibling axes see the stripped sequence: no text between a and b.
    let following = collect(a.iterate_axis(Axis::FollowingSibling, None).unwrap());
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].display_name(), "b");
    let preceding = collect(following[0].iterate_axis(Axis::Preceding, None).unwrap());
    assert_eq!(preceding.len(), 1);
    assert_eq!(preceding[0].display_name(), "a");
}

#[rstest]
fn whitespace_classifier() {
    assert!(is_whitespace_only(""));
    assert!(is_whitespace_only(" \t\r\n"));
    assert!(!is_whitespace_only(" x "));
    // Unicode spaces outside the XML set are not whitespace here.
    assert!(!is_whitespace_only("\u{a0}"));
}

#[rstest]
fn whitespace_under_document_is_kept() {
    let pool = pool();
    let root = doc()
        .child(text("\n"))
        .child(elem("r"))
        .build(&pool)
        .unwrap();
    let view = StrippedDocument::new(root, Arc::new(StripAllRule));
    assert_eq!(collect(view.stripped_root().children()).len(), 2);
}

#[rstest]
fn wrapping_twice_is_idempotent() {
    let pool = pool();
    let root = doc()
        .child(elem("r").child(text("  ")).child(elem("a")))
        .build(&pool)
        .unwrap();
    let view = StrippedDocument::new(root, Arc::new(StripAllRule));
    let direct: Vec<SimpleNode> = collect(
        collect(view.stripped_root().children())
            .remove(0)
            .children(),
    )
    .iter()
    .map(|n| n.underlying().clone())
    .collect();
    let again = StrippedDocument::new(view.stripped_root().underlying().clone(), Arc::new(StripAllRule));
    let twice: Vec<SimpleNode> = collect(
        collect(again.stripped_root().children())
            .remove(0)
            .children(),
    )
    .iter()
    .map(|n| n.underlying().clone())
    .collect();
    assert_eq!(direct, twice);
}
