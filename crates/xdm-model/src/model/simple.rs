//! A straightforward in-memory tree.
//!
//! [`SimpleNode`] is the reference implementation of [`XdmNode`]: an
//! `Arc`-shared node with weak parent links, built through the
//! [`NodeBuilder`] helpers (`doc`, `elem`, `attr`, `text`, ...). It keeps
//! no redundant indexes and serves only the child and attribute cursors
//! natively plus a materialized namespace axis; everything else comes from
//! the generic navigator. Primarily used by tests and small fixtures, but
//! complete enough to back real documents.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use smallvec::SmallVec;

use crate::axis::Axis;
use crate::error::Error;
use crate::iter::{ArrayIterator, AxisIterator};
use crate::model::{apply_node_test, NodeKind, NodeTest, SiblingCountingNode, XdmNode};
use crate::names::checker::{NameChecker, Xml10NameChecker};
use crate::names::{standard, NameCode, NamePool, NamespaceCode};

struct Inner {
    pool: Arc<NamePool>,
    kind: NodeKind,
    name_code: Option<NameCode>,
    value: String,
    system_id: Option<String>,
    declared: Vec<NamespaceCode>,
    parent: RwLock<Option<Weak<Inner>>>,
    children: RwLock<Vec<SimpleNode>>,
    attributes: RwLock<Vec<SimpleNode>>,
    /// Materialized namespace-axis nodes, built on first request so the
    /// axis hands out stable node identities.
    namespace_nodes: RwLock<Option<Arc<[SimpleNode]>>>,
}

/// A node handle; cloning shares the node.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl core::fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.display_name())
            .finish_non_exhaustive()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl SimpleNode {
    fn new(inner: Inner) -> Self {
        SimpleNode(Arc::new(inner))
    }

    fn adopt(&self, child: &SimpleNode) {
        *write(&child.0.parent) = Some(Arc::downgrade(&self.0));
    }

    fn gather_text(&self, out: &mut String) {
        for c in read(&self.0.children).iter() {
            match c.0.kind {
                NodeKind::Text => out.push_str(&c.0.value),
                NodeKind::Element => c.gather_text(out),
                _ => {}
            }
        }
    }

    /// The namespace-axis nodes of this element, materialized once. The
    /// axis always starts with the implicit `xml` binding, then the
    /// in-scope declarations.
    fn namespace_nodes(&self) -> Result<Arc<[SimpleNode]>, Error> {
        if let Some(cached) = read(&self.0.namespace_nodes).as_ref() {
            return Ok(Arc::clone(cached));
        }
        let pool = Arc::clone(&self.0.pool);
        let mut nodes = Vec::new();
        nodes.push(self.make_namespace_node("xml", standard::XML_NS)?);
        for code in crate::namespaces::in_scope_namespace_codes(self) {
            let prefix = pool.prefix_from_namespace_code(code)?;
            let uri = pool.uri_from_namespace_code(code)?;
            nodes.push(self.make_namespace_node(&prefix, &uri)?);
        }
        let nodes: Arc<[SimpleNode]> = nodes.into();
        let mut cache = write(&self.0.namespace_nodes);
        if let Some(existing) = cache.as_ref() {
            // Another thread won the race; keep its identities.
            return Ok(Arc::clone(existing));
        }
        *cache = Some(Arc::clone(&nodes));
        Ok(nodes)
    }

    /// A namespace node is named by its prefix (unnamed for the default
    /// namespace) and its string value is the bound URI.
    fn make_namespace_node(&self, prefix: &str, uri: &str) -> Result<SimpleNode, Error> {
        let name_code = if prefix.is_empty() {
            None
        } else {
            Some(self.0.pool.allocate("", "", prefix)?)
        };
        let node = SimpleNode::new(Inner {
            pool: Arc::clone(&self.0.pool),
            kind: NodeKind::Namespace,
            name_code,
            value: uri.to_string(),
            system_id: None,
            declared: Vec::new(),
            parent: RwLock::new(Some(Arc::downgrade(&self.0))),
            children: RwLock::new(Vec::new()),
            attributes: RwLock::new(Vec::new()),
            namespace_nodes: RwLock::new(None),
        });
        Ok(node)
    }
}

impl XdmNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name_pool(&self) -> Arc<NamePool> {
        Arc::clone(&self.0.pool)
    }

    fn name_code(&self) -> Option<NameCode> {
        self.0.name_code
    }

    fn string_value(&self) -> String {
        match self.0.kind {
            NodeKind::Document | NodeKind::Element => {
                let mut out = String::new();
                self.gather_text(&mut out);
                out
            }
            _ => self.0.value.clone(),
        }
    }

    fn parent(&self) -> Option<Self> {
        read(&self.0.parent)
            .as_ref()
            .and_then(Weak::upgrade)
            .map(SimpleNode)
    }

    fn children(&self) -> Box<dyn AxisIterator<Self>> {
        Box::new(ArrayIterator::new(read(&self.0.children).clone()))
    }

    fn attributes(&self) -> Box<dyn AxisIterator<Self>> {
        Box::new(ArrayIterator::new(read(&self.0.attributes).clone()))
    }

    fn document_number(&self) -> u32 {
        let root = self.root();
        let key = Arc::as_ptr(&root.0) as u64;
        self.0.pool.allocate_document_number(key)
    }

    fn declared_namespaces(&self) -> SmallVec<[NamespaceCode; 8]> {
        self.0.declared.iter().copied().collect()
    }

    fn system_id(&self) -> Option<String> {
        match &self.0.system_id {
            Some(id) => Some(id.clone()),
            None => self.parent().and_then(|p| p.system_id()),
        }
    }

    fn iterate_axis(
        &self,
        axis: Axis,
        test: Option<Arc<dyn NodeTest<Self>>>,
    ) -> Result<Box<dyn AxisIterator<Self>>, Error> {
        if axis == Axis::Namespace {
            if self.0.kind != NodeKind::Element {
                return crate::model::generic_iterate_axis(self, axis, test);
            }
            let nodes = self.namespace_nodes()?;
            let base: Box<dyn AxisIterator<Self>> = Box::new(ArrayIterator::new(nodes));
            return Ok(apply_node_test(base, test));
        }
        crate::model::generic_iterate_axis(self, axis, test)
    }
}

impl SiblingCountingNode for SimpleNode {
    fn sibling_position(&self) -> usize {
        let Some(parent) = self.parent() else {
            return 0;
        };
        let pos = |list: &[SimpleNode]| list.iter().position(|n| n == self).unwrap_or(0);
        match self.0.kind {
            NodeKind::Attribute => pos(&read(&parent.0.attributes)),
            NodeKind::Namespace => match read(&parent.0.namespace_nodes).as_ref() {
                Some(list) => pos(list),
                None => 0,
            },
            _ => pos(&read(&parent.0.children)),
        }
    }
}

/// Declarative tree construction: builders hold plain strings and
/// [`NodeBuilder::build`] interns every name in one pass.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    kind: NodeKind,
    prefix: String,
    uri: String,
    local: String,
    value: String,
    system_id: Option<String>,
    namespaces: Vec<(String, String)>,
    attributes: Vec<NodeBuilder>,
    children: Vec<NodeBuilder>,
}

pub fn doc() -> NodeBuilder {
    NodeBuilder::leaf(NodeKind::Document, "", "")
}

pub fn elem(local: &str) -> NodeBuilder {
    NodeBuilder::leaf(NodeKind::Element, local, "")
}

pub fn elem_ns(prefix: &str, uri: &str, local: &str) -> NodeBuilder {
    let mut b = NodeBuilder::leaf(NodeKind::Element, local, "");
    b.prefix = prefix.to_string();
    b.uri = uri.to_string();
    b
}

pub fn attr(local: &str, value: &str) -> NodeBuilder {
    NodeBuilder::leaf(NodeKind::Attribute, local, value)
}

pub fn attr_ns(prefix: &str, uri: &str, local: &str, value: &str) -> NodeBuilder {
    let mut b = NodeBuilder::leaf(NodeKind::Attribute, local, value);
    b.prefix = prefix.to_string();
    b.uri = uri.to_string();
    b
}

pub fn text(value: &str) -> NodeBuilder {
    NodeBuilder::leaf(NodeKind::Text, "", value)
}

pub fn comment(value: &str) -> NodeBuilder {
    NodeBuilder::leaf(NodeKind::Comment, "", value)
}

pub fn pi(target: &str, data: &str) -> NodeBuilder {
    NodeBuilder::leaf(NodeKind::ProcessingInstruction, target, data)
}

impl NodeBuilder {
    fn leaf(kind: NodeKind, local: &str, value: &str) -> Self {
        NodeBuilder {
            kind,
            prefix: String::new(),
            uri: String::new(),
            local: local.to_string(),
            value: value.to_string(),
            system_id: None,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(mut self, attribute: NodeBuilder) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Declare a namespace binding on this element. An empty URI records
    /// an undeclaration.
    pub fn namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.push((prefix.to_string(), uri.to_string()));
        self
    }

    pub fn system_id(mut self, system_id: &str) -> Self {
        self.system_id = Some(system_id.to_string());
        self
    }

    /// Intern every name against the pool and assemble the tree.
    pub fn build(&self, pool: &Arc<NamePool>) -> Result<SimpleNode, Error> {
        let checker = Xml10NameChecker;
        if !self.local.is_empty() && !checker.is_valid_ncname(&self.local) {
            return Err(Error::invalid_name(&self.local, "not an NCName"));
        }
        if !self.prefix.is_empty() && !checker.is_valid_ncname(&self.prefix) {
            return Err(Error::invalid_name(&self.prefix, "not an NCName"));
        }
        let name_code = match self.kind {
            NodeKind::Element | NodeKind::Attribute | NodeKind::ProcessingInstruction
                if !self.local.is_empty() =>
            {
                Some(pool.allocate(&self.prefix, &self.uri, &self.local)?)
            }
            _ => None,
        };
        let mut declared = Vec::with_capacity(self.namespaces.len());
        for (prefix, uri) in &self.namespaces {
            declared.push(pool.allocate_namespace_code(prefix, uri)?);
        }
        // An element in a namespace implicitly declares its own binding.
        if !self.uri.is_empty() && self.kind == NodeKind::Element {
            let own = pool.allocate_namespace_code(&self.prefix, &self.uri)?;
            if !declared.contains(&own) {
                declared.push(own);
            }
        }
        let node = SimpleNode::new(Inner {
            pool: Arc::clone(pool),
            kind: self.kind,
            name_code,
            value: self.value.clone(),
            system_id: self.system_id.clone(),
            declared,
            parent: RwLock::new(None),
            children: RwLock::new(Vec::new()),
            attributes: RwLock::new(Vec::new()),
            namespace_nodes: RwLock::new(None),
        });
        for b in &self.attributes {
            let a = b.build(pool)?;
            node.adopt(&a);
            write(&node.0.attributes).push(a);
        }
        for b in &self.children {
            let c = b.build(pool)?;
            node.adopt(&c);
            write(&node.0.children).push(c);
        }
        Ok(node)
    }
}
