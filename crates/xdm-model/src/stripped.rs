//! Whitespace-stripping view over an arbitrary tree.
//!
//! A [`StrippedDocument`] wraps a real tree and presents it with
//! whitespace-only text nodes removed according to a
//! [`SpaceStrippingRule`], without copying or mutating the underlying
//! nodes. `xml:space="preserve"` on an ancestor element overrides the
//! rule, per the XSLT stripping semantics. The overlay is pure view state:
//! wrapping the same underlying node twice yields equal nodes.

use std::sync::Arc;

use tracing::trace;

use crate::axis::Axis;
use crate::error::Error;
use crate::iter::AxisIterator;
use crate::model::{
    generic_iterate_axis, apply_node_test, NodeKind, NodeTest, SiblingCountingNode, XdmNode,
};
use crate::names::standard;
use crate::names::{Fingerprint, NameCode, NamePool, NamespaceCode};
use crate::navigator::DescendantIterator;

/// Decides which elements have whitespace-only text children stripped.
pub trait SpaceStrippingRule: Send + Sync {
    /// True when whitespace-only text children of an element with this
    /// fingerprint are stripped. `None` is the fingerprint of the document
    /// node and of unnamed containers.
    fn strips(&self, element: Option<Fingerprint>) -> bool;
}

/// Strips whitespace-only text under every element.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripAllRule;

impl SpaceStrippingRule for StripAllRule {
    fn strips(&self, _element: Option<Fingerprint>) -> bool {
        true
    }
}

/// True when the string contains only XML whitespace characters.
pub fn is_whitespace_only(value: &str) -> bool {
    value.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

/// A stripping view of one tree. Shared by every node of the view.
pub struct StrippedDocument<N: XdmNode> {
    root: N,
    rule: Arc<dyn SpaceStrippingRule>,
    /// Whether any element in the tree carries an `xml:space` attribute.
    /// When none does, stripping decisions skip the ancestor walk.
    preserve_space_found: bool,
}

impl<N: XdmNode> StrippedDocument<N> {
    /// Build a view over the tree containing `root`, scanning it once for
    /// `xml:space` attributes.
    pub fn new(root: N, rule: Arc<dyn SpaceStrippingRule>) -> Arc<Self> {
        let mut preserve_space_found = false;
        let mut scan = DescendantIterator::new(root.clone(), true, true);
        while let Some(n) = scan.next() {
            if n.kind() == NodeKind::Element
                && n.attribute_value(Fingerprint::from_raw(standard::XML_SPACE))
                    .is_some()
            {
                preserve_space_found = true;
                break;
            }
        }
        trace!(preserve_space_found, "built stripping view");
        Arc::new(StrippedDocument {
            root,
            rule,
            preserve_space_found,
        })
    }

    /// Wrap a node of the underlying tree into this view. The caller is
    /// responsible for only wrapping nodes of the viewed tree.
    pub fn wrap(self: &Arc<Self>, node: N) -> StrippedNode<N> {
        StrippedNode {
            doc: Arc::clone(self),
            node,
        }
    }

    /// The view of the wrapped root.
    pub fn stripped_root(self: &Arc<Self>) -> StrippedNode<N> {
        self.wrap(self.root.clone())
    }

    /// Whether a whitespace-only text node with this parent is hidden by
    /// the view.
    fn strips_under(&self, parent: &N) -> bool {
        if parent.kind() != NodeKind::Element {
            // Whitespace directly under the document node is kept.
            return false;
        }
        if !self.rule.strips(parent.fingerprint()) {
            return false;
        }
        if self.preserve_space_found {
            // The nearest xml:space attribute decides.
            let mut cursor = Some(parent.clone());
            while let Some(n) = cursor {
                if n.kind() == NodeKind::Element {
                    if let Some(v) = n.attribute_value(Fingerprint::from_raw(standard::XML_SPACE)) {
                        return v != "preserve";
                    }
                }
                cursor = n.parent();
            }
        }
        true
    }
}

impl<N: XdmNode> core::fmt::Debug for StrippedDocument<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StrippedDocument")
            .field("root", &self.root)
            .field("preserve_space_found", &self.preserve_space_found)
            .finish_non_exhaustive()
    }
}

/// A node of a stripping view: an underlying node plus the view it
/// belongs to.
pub struct StrippedNode<N: XdmNode> {
    doc: Arc<StrippedDocument<N>>,
    node: N,
}

impl<N: XdmNode> StrippedNode<N> {
    /// The wrapped node of the real tree.
    pub fn underlying(&self) -> &N {
        &self.node
    }

    fn wrap(&self, node: N) -> StrippedNode<N> {
        self.doc.wrap(node)
    }

    fn hidden(&self, candidate: &N) -> bool {
        candidate.kind() == NodeKind::Text
            && is_whitespace_only(&candidate.string_value())
            && match candidate.parent() {
                Some(p) => self.doc.strips_under(&p),
                None => false,
            }
    }
}

impl<N: XdmNode> Clone for StrippedNode<N> {
    fn clone(&self) -> Self {
        StrippedNode {
            doc: Arc::clone(&self.doc),
            node: self.node.clone(),
        }
    }
}

impl<N: XdmNode> PartialEq for StrippedNode<N> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.doc, &other.doc) && self.node == other.node
    }
}

impl<N: XdmNode> Eq for StrippedNode<N> {}

impl<N: XdmNode> core::fmt::Debug for StrippedNode<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("StrippedNode").field(&self.node).finish()
    }
}

impl<N: XdmNode> XdmNode for StrippedNode<N> {
    fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    fn name_pool(&self) -> Arc<NamePool> {
        self.node.name_pool()
    }

    fn name_code(&self) -> Option<NameCode> {
        self.node.name_code()
    }

    /// For elements and documents the value is recomputed through the
    /// view, so stripped text does not contribute.
    fn string_value(&self) -> String {
        match self.node.kind() {
            NodeKind::Document | NodeKind::Element => {
                let mut out = String::new();
                let mut scan = DescendantIterator::new(self.clone(), false, true);
                while let Some(n) = scan.next() {
                    if n.kind() == NodeKind::Text {
                        out.push_str(&n.node.string_value());
                    }
                }
                out
            }
            _ => self.node.string_value(),
        }
    }

    fn parent(&self) -> Option<Self> {
        self.node.parent().map(|p| self.wrap(p))
    }

    fn children(&self) -> Box<dyn AxisIterator<Self>> {
        Box::new(StrippedChildIterator {
            origin: self.clone(),
            base: self.node.children(),
            current: None,
            position: 0,
        })
    }

    fn attributes(&self) -> Box<dyn AxisIterator<Self>> {
        Box::new(WrappingIterator {
            origin: self.clone(),
            base: self.node.attributes(),
            current: None,
            position: 0,
        })
    }

    fn document_number(&self) -> u32 {
        self.node.document_number()
    }

    fn declared_namespaces(&self) -> smallvec::SmallVec<[NamespaceCode; 8]> {
        self.node.declared_namespaces()
    }

    fn system_id(&self) -> Option<String> {
        self.node.system_id()
    }

    fn iterate_axis(
        &self,
        axis: Axis,
        test: Option<Arc<dyn NodeTest<Self>>>,
    ) -> Result<Box<dyn AxisIterator<Self>>, Error> {
        // The namespace axis is served by the underlying tree when it
        // supports it; stripping never affects namespace nodes.
        if axis == Axis::Namespace {
            let base = self.node.iterate_axis(Axis::Namespace, None)?;
            let wrapped: Box<dyn AxisIterator<Self>> = Box::new(WrappingIterator {
                origin: self.clone(),
                base,
                current: None,
                position: 0,
            });
            return Ok(apply_node_test(wrapped, test));
        }
        generic_iterate_axis(self, axis, test)
    }
}

impl<N: SiblingCountingNode> SiblingCountingNode for StrippedNode<N> {
    /// Positions of the underlying tree are kept: they are not dense in
    /// the view, but document-order comparison only needs their order.
    fn sibling_position(&self) -> usize {
        self.node.sibling_position()
    }
}

/// Child cursor of the view: the underlying children minus stripped
/// whitespace text nodes.
struct StrippedChildIterator<N: XdmNode> {
    origin: StrippedNode<N>,
    base: Box<dyn AxisIterator<N>>,
    current: Option<StrippedNode<N>>,
    position: usize,
}

impl<N: XdmNode> AxisIterator<StrippedNode<N>> for StrippedChildIterator<N> {
    fn next(&mut self) -> Option<StrippedNode<N>> {
        while let Some(c) = self.base.next() {
            if self.origin.hidden(&c) {
                continue;
            }
            let node = self.origin.wrap(c);
            self.position += 1;
            self.current = Some(node.clone());
            return Some(node);
        }
        self.current = None;
        None
    }

    fn current(&self) -> Option<&StrippedNode<N>> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<StrippedNode<N>>> {
        Box::new(StrippedChildIterator {
            origin: self.origin.clone(),
            base: self.base.another(),
            current: None,
            position: 0,
        })
    }
}

/// Wraps an unfiltered underlying cursor into view nodes.
struct WrappingIterator<N: XdmNode> {
    origin: StrippedNode<N>,
    base: Box<dyn AxisIterator<N>>,
    current: Option<StrippedNode<N>>,
    position: usize,
}

impl<N: XdmNode> AxisIterator<StrippedNode<N>> for WrappingIterator<N> {
    fn next(&mut self) -> Option<StrippedNode<N>> {
        match self.base.next() {
            Some(n) => {
                let node = self.origin.wrap(n);
                self.position += 1;
                self.current = Some(node.clone());
                Some(node)
            }
            None => {
                self.current = None;
                None
            }
        }
    }

    fn current(&self) -> Option<&StrippedNode<N>> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<StrippedNode<N>>> {
        Box::new(WrappingIterator {
            origin: self.origin.clone(),
            base: self.base.another(),
            current: None,
            position: 0,
        })
    }

    fn last_position(&self) -> Option<usize> {
        self.base.last_position()
    }
}
