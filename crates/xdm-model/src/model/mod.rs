//! The node capability contract every concrete tree must satisfy.
//!
//! The core never owns a tree; it navigates anything that implements
//! [`XdmNode`]. Implementations supply a handful of primitives (kind, name
//! code, parent, child and attribute cursors, string value) and inherit
//! the full fourteen-axis vocabulary from the generic navigator through
//! the default [`XdmNode::iterate_axis`]. Trees with native support for
//! more axes override `iterate_axis` and serve them directly.

pub mod simple;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::axis::Axis;
use crate::error::Error;
use crate::iter::{AxisIterator, EmptyIterator, FilterIterator, SingletonIterator};
use crate::names::{Fingerprint, NameCode, NamePool, NamespaceCode};
use crate::navigator;
use crate::receiver::{Receiver, WhichNamespaces};

/// The node kinds of the XPath data model, plus the internal orphan
/// pseudo-kind for freestanding nodes with no tree context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    Document = 0,
    Element = 1,
    Attribute = 2,
    Text = 3,
    Comment = 4,
    ProcessingInstruction = 5,
    Namespace = 6,
    Orphan = 7,
}

impl NodeKind {
    pub(crate) fn bit(self) -> u16 {
        1 << self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Element => "element",
            NodeKind::Attribute => "attribute",
            NodeKind::Text => "text",
            NodeKind::Comment => "comment",
            NodeKind::ProcessingInstruction => "processing-instruction",
            NodeKind::Namespace => "namespace",
            NodeKind::Orphan => "orphan",
        }
    }
}

/// A structural qualified name, decoded from pool codes for callers that
/// want strings rather than integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

/// Read-only node in an XML tree.
///
/// Nodes are cheap handles: `Clone` duplicates the handle, never the tree.
/// Equality is node identity within a tree. Parent references are for
/// navigation only; a node does not keep its document alive through them.
pub trait XdmNode: Clone + PartialEq + Eq + core::fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;

    /// The pool all name codes of this tree were allocated from.
    fn name_pool(&self) -> Arc<NamePool>;

    /// `None` for unnamed kinds (document, text, comment).
    fn name_code(&self) -> Option<NameCode>;

    fn string_value(&self) -> String;

    fn parent(&self) -> Option<Self>;

    /// Native child cursor. Attributes and namespaces are not children.
    fn children(&self) -> Box<dyn AxisIterator<Self>>;

    /// Native attribute cursor; empty for non-elements.
    fn attributes(&self) -> Box<dyn AxisIterator<Self>>;

    /// Number of the containing document, issued by the pool.
    fn document_number(&self) -> u32;

    /// Namespace bindings declared (or undeclared) on this element itself,
    /// not the in-scope set.
    fn declared_namespaces(&self) -> SmallVec<[NamespaceCode; 8]> {
        SmallVec::new()
    }

    fn system_id(&self) -> Option<String> {
        None
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.name_code().map(NameCode::fingerprint)
    }

    fn local_part(&self) -> String {
        self.fingerprint()
            .and_then(|fp| self.name_pool().local_name_of(fp).ok())
            .unwrap_or_default()
    }

    fn uri(&self) -> String {
        self.fingerprint()
            .and_then(|fp| self.name_pool().uri_of(fp).ok())
            .unwrap_or_default()
    }

    fn display_name(&self) -> String {
        self.name_code()
            .and_then(|code| self.name_pool().display_name_of(code).ok())
            .unwrap_or_default()
    }

    fn name(&self) -> Option<QName> {
        let code = self.name_code()?;
        let pool = self.name_pool();
        let local = pool.local_name_of(code.fingerprint()).ok()?;
        let prefix = pool.prefix_of(code).ok().filter(|p| !p.is_empty());
        let ns_uri = pool.uri_of(code.fingerprint()).ok().filter(|u| !u.is_empty());
        Some(QName {
            prefix,
            local,
            ns_uri,
        })
    }

    /// Value of the attribute with the given fingerprint, if present.
    fn attribute_value(&self, fp: Fingerprint) -> Option<String> {
        let mut attrs = self.attributes();
        while let Some(a) = attrs.next() {
            if a.fingerprint() == Some(fp) {
                return Some(a.string_value());
            }
        }
        None
    }

    /// The root of the tree containing this node.
    fn root(&self) -> Self {
        let mut node = self.clone();
        while let Some(p) = node.parent() {
            node = p;
        }
        node
    }

    /// Base URI per XML Base: the nearest `xml:base` resolved against the
    /// ancestor base, falling back to the system identifier.
    fn base_uri(&self) -> Option<String> {
        navigator::base_uri(self)
    }

    /// Cursor over the given axis, optionally filtered by a node test.
    ///
    /// The default serves every axis except `namespace` from the generic
    /// navigator algorithms; requesting the namespace axis without an
    /// override is an unsupported-operation error (distinct from an axis
    /// that is merely empty for this node kind).
    fn iterate_axis(
        &self,
        axis: Axis,
        test: Option<Arc<dyn NodeTest<Self>>>,
    ) -> Result<Box<dyn AxisIterator<Self>>, Error> {
        generic_iterate_axis(self, axis, test)
    }

    /// Emit this subtree as events to a receiver.
    fn copy_to(
        &self,
        receiver: &mut dyn Receiver,
        namespaces: WhichNamespaces,
    ) -> Result<(), Error> {
        navigator::deep_copy(self, receiver, namespaces)
    }
}

/// Extension for trees whose nodes know their position among siblings,
/// enabling the efficient generic document-order comparison.
pub trait SiblingCountingNode: XdmNode {
    /// Zero-based index of this node within its sibling category: child
    /// nodes count among children, attributes among attributes, namespace
    /// nodes among the element's namespace nodes.
    fn sibling_position(&self) -> usize;

    /// Relative document order of two nodes in the same tree.
    fn compare_order(&self, other: &Self) -> core::cmp::Ordering {
        navigator::compare_order(self, other)
    }
}

/// Opaque boolean filter over nodes; the concrete test vocabulary (name
/// tests, kind tests, combinators) lives with the expression layer.
pub trait NodeTest<N: XdmNode>: Send + Sync {
    fn matches(&self, node: &N) -> bool;
}

/// Matches every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyNodeTest;

impl<N: XdmNode> NodeTest<N> for AnyNodeTest {
    fn matches(&self, _node: &N) -> bool {
        true
    }
}

/// Matches nodes of one kind.
#[derive(Debug, Clone, Copy)]
pub struct KindTest(pub NodeKind);

impl<N: XdmNode> NodeTest<N> for KindTest {
    fn matches(&self, node: &N) -> bool {
        node.kind() == self.0
    }
}

/// Matches nodes of one kind with one (URI, local) name.
#[derive(Debug, Clone, Copy)]
pub struct NameTest {
    pub kind: NodeKind,
    pub fingerprint: Fingerprint,
}

impl NameTest {
    pub fn new(kind: NodeKind, fingerprint: Fingerprint) -> Self {
        NameTest { kind, fingerprint }
    }
}

impl<N: XdmNode> NodeTest<N> for NameTest {
    fn matches(&self, node: &N) -> bool {
        node.kind() == self.kind && node.fingerprint() == Some(self.fingerprint)
    }
}

/// The navigator-backed axis dispatch behind the default
/// [`XdmNode::iterate_axis`]. Public so overriding implementations (the
/// stripped overlay, trees with partial native axis support) can fall back
/// to it for the axes they do not serve natively.
pub fn generic_iterate_axis<N: XdmNode>(
    node: &N,
    axis: Axis,
    test: Option<Arc<dyn NodeTest<N>>>,
) -> Result<Box<dyn AxisIterator<N>>, Error> {
    if axis.is_always_empty(node.kind()) {
        return Ok(Box::new(EmptyIterator::new()));
    }
    let base: Box<dyn AxisIterator<N>> = match axis {
        Axis::SelfAxis => Box::new(SingletonIterator::new(node.clone())),
        Axis::Child => node.children(),
        Axis::Attribute => node.attributes(),
        Axis::Parent => match node.parent() {
            Some(p) => Box::new(SingletonIterator::new(p)),
            None => Box::new(EmptyIterator::new()),
        },
        Axis::Ancestor => Box::new(navigator::AncestorIterator::new(node.clone(), false)),
        Axis::AncestorOrSelf => Box::new(navigator::AncestorIterator::new(node.clone(), true)),
        Axis::Descendant => Box::new(navigator::DescendantIterator::new(node.clone(), false, true)),
        Axis::DescendantOrSelf => {
            Box::new(navigator::DescendantIterator::new(node.clone(), true, true))
        }
        Axis::FollowingSibling => navigator::following_siblings(node),
        Axis::PrecedingSibling => navigator::preceding_siblings(node),
        Axis::Following => Box::new(navigator::FollowingIterator::new(node.clone())),
        Axis::Preceding => Box::new(navigator::PrecedingIterator::new(node.clone(), false)),
        Axis::PrecedingOrAncestor => {
            Box::new(navigator::PrecedingIterator::new(node.clone(), true))
        }
        Axis::Namespace => return Err(Error::unsupported_axis(axis.name())),
    };
    Ok(apply_node_test(base, test))
}

pub(crate) fn apply_node_test<N: XdmNode>(
    base: Box<dyn AxisIterator<N>>,
    test: Option<Arc<dyn NodeTest<N>>>,
) -> Box<dyn AxisIterator<N>> {
    match test {
        Some(t) => Box::new(FilterIterator::new(base, t)),
        None => base,
    }
}
