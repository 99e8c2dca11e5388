//! Generic, tree-independent navigation algorithms.
//!
//! Everything here is derived from two primitives every tree exposes: the
//! parent link and the native child/attribute cursors. A minimal tree
//! implementation gets the full axis vocabulary, document-order
//! comparison, deep copy and xsl:number counting from this module alone;
//! richer trees override the pieces they can serve faster.

use core::cmp::Ordering;

use url::Url;

use crate::error::Error;
use crate::iter::{AxisIterator, EmptyIterator, ReverseArrayIterator};
use crate::model::{NodeKind, NodeTest, SiblingCountingNode, XdmNode};
use crate::names::standard;
use crate::names::Fingerprint;
use crate::namespaces::in_scope_namespace_codes;
use crate::receiver::{Receiver, WhichNamespaces};

// ===== Sibling axes =====

/// Cursor over the following siblings of a node, lazily skipping the
/// parent's children up to the origin.
pub struct FollowingSiblingIterator<N: XdmNode> {
    origin: N,
    kids: Box<dyn AxisIterator<N>>,
    skipped: bool,
    current: Option<N>,
    position: usize,
}

impl<N: XdmNode> FollowingSiblingIterator<N> {
    pub fn new(origin: N) -> Self {
        let kids: Box<dyn AxisIterator<N>> = match origin.parent() {
            Some(p) => p.children(),
            None => Box::new(EmptyIterator::new()),
        };
        FollowingSiblingIterator {
            origin,
            kids,
            skipped: false,
            current: None,
            position: 0,
        }
    }
}

impl<N: XdmNode> AxisIterator<N> for FollowingSiblingIterator<N> {
    fn next(&mut self) -> Option<N> {
        if !self.skipped {
            loop {
                match self.kids.next() {
                    Some(c) if c == self.origin => {
                        self.skipped = true;
                        break;
                    }
                    Some(_) => {}
                    // Origin absent from the child list (attribute or
                    // namespace origin): no siblings on this axis.
                    None => return None,
                }
            }
        }
        match self.kids.next() {
            Some(n) => {
                self.position += 1;
                self.current = Some(n.clone());
                Some(n)
            }
            None => {
                self.current = None;
                None
            }
        }
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(FollowingSiblingIterator::new(self.origin.clone()))
    }
}

pub fn following_siblings<N: XdmNode>(node: &N) -> Box<dyn AxisIterator<N>> {
    Box::new(FollowingSiblingIterator::new(node.clone()))
}

/// Preceding siblings in reverse document order (nearest first). The
/// preceding slice has to be materialized since child cursors only run
/// forwards.
pub fn preceding_siblings<N: XdmNode>(node: &N) -> Box<dyn AxisIterator<N>> {
    let Some(parent) = node.parent() else {
        return Box::new(EmptyIterator::new());
    };
    let mut before = Vec::new();
    let mut kids = parent.children();
    let mut found = false;
    while let Some(c) = kids.next() {
        if c == *node {
            found = true;
            break;
        }
        before.push(c);
    }
    if !found {
        return Box::new(EmptyIterator::new());
    }
    Box::new(ReverseArrayIterator::new(before))
}

// ===== Ancestor axis =====

pub struct AncestorIterator<N: XdmNode> {
    origin: N,
    include_self: bool,
    next_up: Option<N>,
    current: Option<N>,
    position: usize,
}

impl<N: XdmNode> AncestorIterator<N> {
    pub fn new(origin: N, include_self: bool) -> Self {
        let next_up = if include_self {
            Some(origin.clone())
        } else {
            origin.parent()
        };
        AncestorIterator {
            origin,
            include_self,
            next_up,
            current: None,
            position: 0,
        }
    }
}

impl<N: XdmNode> AxisIterator<N> for AncestorIterator<N> {
    fn next(&mut self) -> Option<N> {
        match self.next_up.take() {
            Some(n) => {
                self.next_up = n.parent();
                self.position += 1;
                self.current = Some(n.clone());
                Some(n)
            }
            None => {
                self.current = None;
                None
            }
        }
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(AncestorIterator::new(self.origin.clone(), self.include_self))
    }
}

// ===== Descendant axis =====

enum Frame<N> {
    /// Emit this node when it reaches the top of the stack.
    Emit(N),
    /// Keep draining this child cursor.
    Children(Box<dyn AxisIterator<N>>),
}

/// Depth-first traversal of a subtree.
///
/// With `forwards` set, nodes come out in document order (pre-order, the
/// origin first when `include_self`). Without it, nodes come out in
/// reverse document order (deepest-last node first, the origin last),
/// which is what the preceding axis needs. Reverse traversal uses the
/// child cursor's reversible capability when available and falls back to
/// materializing each child list.
pub struct DescendantIterator<N: XdmNode> {
    origin: N,
    include_self: bool,
    forwards: bool,
    stack: Vec<Frame<N>>,
    current: Option<N>,
    position: usize,
}

impl<N: XdmNode> DescendantIterator<N> {
    pub fn new(origin: N, include_self: bool, forwards: bool) -> Self {
        let mut stack = Vec::new();
        if forwards {
            stack.push(Frame::Children(origin.children()));
            if include_self {
                stack.push(Frame::Emit(origin.clone()));
            }
        } else {
            if include_self {
                stack.push(Frame::Emit(origin.clone()));
            }
            stack.push(Frame::Children(reversed_children(&origin)));
        }
        DescendantIterator {
            origin,
            include_self,
            forwards,
            stack,
            current: None,
            position: 0,
        }
    }

    fn emit(&mut self, node: N) -> Option<N> {
        self.position += 1;
        self.current = Some(node.clone());
        Some(node)
    }
}

impl<N: XdmNode> AxisIterator<N> for DescendantIterator<N> {
    fn next(&mut self) -> Option<N> {
        loop {
            let Some(top) = self.stack.last_mut() else {
                self.current = None;
                return None;
            };
            match top {
                Frame::Emit(_) => {
                    let Some(Frame::Emit(n)) = self.stack.pop() else {
                        unreachable!("frame checked above");
                    };
                    return self.emit(n);
                }
                Frame::Children(kids) => match kids.next() {
                    Some(c) => {
                        if self.forwards {
                            self.stack.push(Frame::Children(c.children()));
                            return self.emit(c);
                        }
                        let grandkids = reversed_children(&c);
                        self.stack.push(Frame::Emit(c));
                        self.stack.push(Frame::Children(grandkids));
                    }
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(DescendantIterator::new(
            self.origin.clone(),
            self.include_self,
            self.forwards,
        ))
    }
}

fn reversed_children<N: XdmNode>(node: &N) -> Box<dyn AxisIterator<N>> {
    let kids = node.children();
    if let Some(rev) = kids.to_reverse() {
        return rev;
    }
    let mut all = Vec::new();
    let mut kids = kids;
    while let Some(c) = kids.next() {
        all.push(c);
    }
    Box::new(ReverseArrayIterator::new(all))
}

// ===== Following axis =====

/// Nodes after the origin in document order, excluding descendants.
///
/// Works level by level: the following siblings of the origin and of each
/// ancestor, each expanded to its full subtree, nearest ancestor first.
/// For attribute and namespace origins the traversal starts with the
/// owning element's own subtree, since the element's children follow the
/// attribute in document order.
pub struct FollowingIterator<N: XdmNode> {
    origin: N,
    anchor: Option<N>,
    siblings: Box<dyn AxisIterator<N>>,
    subtree: Option<DescendantIterator<N>>,
    current: Option<N>,
    position: usize,
}

impl<N: XdmNode> FollowingIterator<N> {
    pub fn new(origin: N) -> Self {
        let (anchor, siblings, subtree) = match origin.kind() {
            NodeKind::Attribute | NodeKind::Namespace => match origin.parent() {
                Some(owner) => {
                    let siblings = following_siblings(&owner);
                    let subtree = DescendantIterator::new(owner.clone(), false, true);
                    (Some(owner), siblings, Some(subtree))
                }
                None => {
                    let empty: Box<dyn AxisIterator<N>> = Box::new(EmptyIterator::new());
                    (None, empty, None)
                }
            },
            _ => (
                Some(origin.clone()),
                following_siblings(&origin),
                None,
            ),
        };
        FollowingIterator {
            origin,
            anchor,
            siblings,
            subtree,
            current: None,
            position: 0,
        }
    }

    fn emit(&mut self, node: N) -> Option<N> {
        self.position += 1;
        self.current = Some(node.clone());
        Some(node)
    }
}

impl<N: XdmNode> AxisIterator<N> for FollowingIterator<N> {
    fn next(&mut self) -> Option<N> {
        loop {
            if let Some(sub) = &mut self.subtree {
                if let Some(n) = sub.next() {
                    return self.emit(n);
                }
                self.subtree = None;
            }
            if let Some(s) = self.siblings.next() {
                self.subtree = Some(DescendantIterator::new(s, true, true));
                continue;
            }
            let Some(anchor) = self.anchor.take() else {
                self.current = None;
                return None;
            };
            let Some(parent) = anchor.parent() else {
                self.current = None;
                return None;
            };
            self.siblings = following_siblings(&parent);
            self.anchor = Some(parent);
        }
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(FollowingIterator::new(self.origin.clone()))
    }
}

// ===== Preceding axis =====

/// Nodes before the origin in reverse document order, excluding ancestors
/// unless `include_ancestors` is set (the internal preceding-or-ancestor
/// axis used by positional numbering).
///
/// Symmetric to [`FollowingIterator`]: each level contributes its
/// preceding siblings nearest-first, each expanded to its subtree in
/// reverse document order (descendants before the sibling itself).
pub struct PrecedingIterator<N: XdmNode> {
    origin: N,
    include_ancestors: bool,
    anchor: Option<N>,
    siblings: Box<dyn AxisIterator<N>>,
    subtree: Option<DescendantIterator<N>>,
    current: Option<N>,
    position: usize,
}

impl<N: XdmNode> PrecedingIterator<N> {
    pub fn new(origin: N, include_ancestors: bool) -> Self {
        PrecedingIterator {
            include_ancestors,
            anchor: Some(origin.clone()),
            siblings: preceding_siblings(&origin),
            subtree: None,
            origin,
            current: None,
            position: 0,
        }
    }

    fn emit(&mut self, node: N) -> Option<N> {
        self.position += 1;
        self.current = Some(node.clone());
        Some(node)
    }
}

impl<N: XdmNode> AxisIterator<N> for PrecedingIterator<N> {
    fn next(&mut self) -> Option<N> {
        loop {
            if let Some(sub) = &mut self.subtree {
                if let Some(n) = sub.next() {
                    return self.emit(n);
                }
                self.subtree = None;
            }
            if let Some(s) = self.siblings.next() {
                self.subtree = Some(DescendantIterator::new(s, true, false));
                continue;
            }
            let Some(anchor) = self.anchor.take() else {
                self.current = None;
                return None;
            };
            let Some(parent) = anchor.parent() else {
                self.current = None;
                return None;
            };
            self.siblings = preceding_siblings(&parent);
            self.anchor = Some(parent.clone());
            if self.include_ancestors {
                return self.emit(parent);
            }
        }
    }

    fn current(&self) -> Option<&N> {
        self.current.as_ref()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn another(&self) -> Box<dyn AxisIterator<N>> {
        Box::new(PrecedingIterator::new(
            self.origin.clone(),
            self.include_ancestors,
        ))
    }
}

// ===== Document order =====

/// Relative document order of two nodes, without materializing the tree.
///
/// Common cases stay cheap: identical nodes, same-parent siblings, and
/// direct ancestry are settled without a full ancestor walk beyond depth
/// equalization. Nodes from different trees fall back to comparing
/// document numbers.
pub fn compare_order<N: SiblingCountingNode>(a: &N, b: &N) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let depth_a = depth(a);
    let depth_b = depth(b);
    let mut n1 = a.clone();
    let mut n2 = b.clone();
    // Equalize depth, short-circuiting when one node is an ancestor of
    // the other: the ancestor comes first.
    if depth_a > depth_b {
        for _ in 0..(depth_a - depth_b) {
            match n1.parent() {
                Some(p) if p == *b => return Ordering::Greater,
                Some(p) => n1 = p,
                None => break,
            }
        }
    } else if depth_b > depth_a {
        for _ in 0..(depth_b - depth_a) {
            match n2.parent() {
                Some(p) if p == *a => return Ordering::Less,
                Some(p) => n2 = p,
                None => break,
            }
        }
    }
    // Walk both sides up in lockstep until a common parent appears, then
    // order by the children below it.
    loop {
        if let (Some(p1), Some(p2)) = (n1.parent(), n2.parent()) {
            if p1 == p2 {
                return same_parent_order(&n1, &n2);
            }
            n1 = p1;
            n2 = p2;
        } else {
            // Different trees: no common parent at equal depth.
            return a.document_number().cmp(&b.document_number());
        }
    }
}

fn depth<N: XdmNode>(node: &N) -> usize {
    let mut d = 0;
    let mut cur = node.clone();
    while let Some(p) = cur.parent() {
        d += 1;
        cur = p;
    }
    d
}

/// Order among siblings: namespace nodes first, then attributes, then
/// child nodes, each category in its own sibling-position order.
fn same_parent_order<N: SiblingCountingNode>(a: &N, b: &N) -> Ordering {
    fn category<N: XdmNode>(n: &N) -> u8 {
        match n.kind() {
            NodeKind::Namespace => 0,
            NodeKind::Attribute => 1,
            _ => 2,
        }
    }
    category(a)
        .cmp(&category(b))
        .then_with(|| a.sibling_position().cmp(&b.sibling_position()))
}

// ===== Deep copy =====

/// Kind-dispatched recursive copy, emitting the subtree as receiver
/// events. Used by any tree without a faster native copy.
pub fn deep_copy<N: XdmNode>(
    node: &N,
    receiver: &mut dyn Receiver,
    namespaces: WhichNamespaces,
) -> Result<(), Error> {
    match node.kind() {
        NodeKind::Document => {
            receiver.start_document()?;
            let mut kids = node.children();
            while let Some(c) = kids.next() {
                deep_copy(&c, receiver, namespaces)?;
            }
            receiver.end_document()
        }
        NodeKind::Element => {
            let code = node.name_code().ok_or_else(|| {
                Error::new(
                    crate::error::ErrorCode::UnknownNameCode,
                    "element without a name code cannot be copied",
                )
            })?;
            receiver.start_element(code)?;
            match namespaces {
                WhichNamespaces::All => {
                    for ns in in_scope_namespace_codes(node) {
                        receiver.namespace(ns)?;
                    }
                }
                WhichNamespaces::Local => {
                    for ns in node.declared_namespaces() {
                        receiver.namespace(ns)?;
                    }
                }
                WhichNamespaces::None => {}
            }
            let mut attrs = node.attributes();
            while let Some(a) = attrs.next() {
                deep_copy(&a, receiver, WhichNamespaces::None)?;
            }
            receiver.start_content()?;
            // Below the top element, locally declared namespaces suffice:
            // outer bindings were already emitted there.
            let child_namespaces = match namespaces {
                WhichNamespaces::None => WhichNamespaces::None,
                _ => WhichNamespaces::Local,
            };
            let mut kids = node.children();
            while let Some(c) = kids.next() {
                deep_copy(&c, receiver, child_namespaces)?;
            }
            receiver.end_element()
        }
        NodeKind::Attribute => {
            let code = node.name_code().ok_or_else(|| {
                Error::new(
                    crate::error::ErrorCode::UnknownNameCode,
                    "attribute without a name code cannot be copied",
                )
            })?;
            receiver.attribute(code, &node.string_value())
        }
        NodeKind::Text => receiver.characters(&node.string_value()),
        NodeKind::Comment => receiver.comment(&node.string_value()),
        NodeKind::ProcessingInstruction => {
            receiver.processing_instruction(&node.local_part(), &node.string_value())
        }
        NodeKind::Namespace => {
            let prefix = node.local_part();
            let uri = node.string_value();
            let code = node.name_pool().allocate_namespace_code(&prefix, &uri)?;
            receiver.namespace(code)
        }
        NodeKind::Orphan => receiver.characters(&node.string_value()),
    }
}

// ===== Base URI =====

/// Resolve the base URI of a node per XML Base semantics.
///
/// URI syntax failures are recovered locally by returning the literal
/// `xml:base` value: a downstream consumer that needs an absolute URI
/// will produce the clearer diagnostic itself.
pub fn base_uri<N: XdmNode>(node: &N) -> Option<String> {
    let xml_base = if node.kind() == NodeKind::Element {
        node.attribute_value(Fingerprint::from_raw(standard::XML_BASE))
    } else {
        None
    };
    match xml_base {
        Some(value) => {
            let escaped = escape_uri(&value);
            let inherited = node
                .parent()
                .and_then(|p| p.base_uri())
                .or_else(|| node.system_id());
            let resolved = match &inherited {
                Some(base) => Url::parse(base).ok().and_then(|b| b.join(&escaped).ok()),
                None => Url::parse(&escaped).ok(),
            };
            Some(resolved.map_or(value, |u| u.to_string()))
        }
        None => match node.parent() {
            Some(p) => p.base_uri(),
            None => node.system_id(),
        },
    }
}

/// Percent-escape the characters not permitted raw in a URI reference
/// before resolution.
pub fn escape_uri(value: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b' ' | b'<' | b'>' | b'"' | b'{' | b'}' | b'|' | b'\\' | b'^' | b'`'
            | 0x00..=0x1f
            | 0x80..=0xff => {
                out.push('%');
                out.push(char::from(HEX[usize::from(b >> 4)]));
                out.push(char::from(HEX[usize::from(b & 0xf)]));
            }
            _ => out.push(char::from(b)),
        }
    }
    out
}

// ===== Positional numbering =====

/// Memo for the single-sequential-pass numbering optimization: the most
/// recently numbered node and its count. Owned by the caller, which keeps
/// the correctness assumption (monotonically advancing input) explicit
/// and the state off any shared structure.
#[derive(Debug, Clone, Default)]
pub struct NumberCache<N> {
    node: Option<N>,
    value: usize,
}

impl<N> NumberCache<N> {
    pub fn new() -> Self {
        NumberCache {
            node: None,
            value: 0,
        }
    }
}

fn matches_pattern<N: XdmNode>(
    candidate: &N,
    pattern: Option<&dyn NodeTest<N>>,
    exemplar: &N,
) -> bool {
    match pattern {
        Some(t) => t.matches(candidate),
        // Default count pattern: same kind and same name as the node
        // being numbered.
        None => {
            candidate.kind() == exemplar.kind() && candidate.fingerprint() == exemplar.fingerprint()
        }
    }
}

/// 1-based position of `target` among its matching preceding siblings.
fn position_among_siblings<N: XdmNode>(
    target: &N,
    count: Option<&dyn NodeTest<N>>,
    exemplar: &N,
) -> usize {
    let mut num = 1;
    let mut sibs = preceding_siblings(target);
    while let Some(prev) = sibs.next() {
        if matches_pattern(&prev, count, exemplar) {
            num += 1;
        }
    }
    num
}

/// xsl:number level="single" without a from pattern, with an optional
/// memo for monotone sequences of calls.
pub fn number_simple<N: XdmNode>(
    node: &N,
    count: Option<&dyn NodeTest<N>>,
    mut cache: Option<&mut NumberCache<N>>,
) -> usize {
    let mut num = 1usize;
    let mut sibs = preceding_siblings(node);
    while let Some(prev) = sibs.next() {
        if let Some(c) = cache.as_deref_mut() {
            if c.node.as_ref() == Some(&prev) {
                // prev was numbered c.value; everything between it and the
                // origin has been counted in num already.
                if matches_pattern(&prev, count, node) {
                    num += c.value;
                } else {
                    num += c.value.saturating_sub(1);
                }
                c.node = Some(node.clone());
                c.value = num;
                return num;
            }
        }
        if matches_pattern(&prev, count, node) {
            num += 1;
        }
    }
    if let Some(c) = cache {
        c.node = Some(node.clone());
        c.value = num;
    }
    num
}

/// xsl:number level="single": number of the nearest matching
/// ancestor-or-self among its matching preceding siblings, or 0 when no
/// ancestor matches before the from pattern cuts the search off.
pub fn number_single<N: XdmNode>(
    node: &N,
    count: Option<&dyn NodeTest<N>>,
    from: Option<&dyn NodeTest<N>>,
) -> usize {
    let mut target = Some(node.clone());
    while let Some(t) = target {
        if matches_pattern(&t, count, node) {
            return position_among_siblings(&t, count, node);
        }
        if let Some(f) = from {
            if f.matches(&t) {
                return 0;
            }
        }
        target = t.parent();
    }
    0
}

/// xsl:number level="any": count of matching nodes at or before this one
/// in document order, restarting after the most recent from match. The
/// cache makes numbering a forward-moving sequence of nodes amortized
/// constant time instead of quadratic.
pub fn number_any<N: XdmNode>(
    node: &N,
    count: Option<&dyn NodeTest<N>>,
    from: Option<&dyn NodeTest<N>>,
    cache: &mut NumberCache<N>,
) -> usize {
    let mut num = 0usize;
    if matches_pattern(node, count, node) {
        num += 1;
    }
    let mut scan = PrecedingIterator::new(node.clone(), true);
    while let Some(prev) = scan.next() {
        if let Some(f) = from {
            if f.matches(&prev) {
                break;
            }
        }
        if cache.node.as_ref() == Some(&prev) {
            num += cache.value;
            break;
        }
        if matches_pattern(&prev, count, node) {
            num += 1;
        }
    }
    cache.node = Some(node.clone());
    cache.value = num;
    num
}

/// xsl:number level="multiple": one number per matching ancestor-or-self,
/// outermost first.
pub fn number_multi<N: XdmNode>(
    node: &N,
    count: Option<&dyn NodeTest<N>>,
    from: Option<&dyn NodeTest<N>>,
) -> Vec<usize> {
    let mut numbers = Vec::new();
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if matches_pattern(&n, count, node) {
            numbers.push(position_among_siblings(&n, count, node));
        }
        if let Some(f) = from {
            if f.matches(&n) {
                break;
            }
        }
        cur = n.parent();
    }
    numbers.reverse();
    numbers
}

