//! In-scope namespace resolution.
//!
//! An element's in-scope bindings are assembled by walking from the
//! element towards the root and taking, for every prefix, the nearest
//! declaration. A binding to the empty URI is an undeclaration: it masks
//! outer bindings for that prefix without contributing one itself. The
//! implicit `xml` binding is fixed by the XML recommendation and is never
//! reported.

use smallvec::SmallVec;

use crate::error::Error;
use crate::model::{NodeKind, XdmNode};
use crate::names::NamespaceCode;
use crate::receiver::Receiver;

/// The in-scope namespace bindings of an element, nearest declarations
/// first. For non-element nodes the set is empty.
pub fn in_scope_namespace_codes<N: XdmNode>(node: &N) -> SmallVec<[NamespaceCode; 8]> {
    let mut out: SmallVec<[NamespaceCode; 8]> = SmallVec::new();
    if node.kind() != NodeKind::Element {
        return out;
    }
    let xml_prefix = node.name_pool().code_for_prefix("xml");
    let mut seen: SmallVec<[u16; 8]> = SmallVec::new();
    let mut cursor = Some(node.clone());
    while let Some(n) = cursor {
        if n.kind() != NodeKind::Element {
            break;
        }
        for code in n.declared_namespaces() {
            let prefix = code.prefix_code();
            if seen.contains(&prefix) {
                // An inner declaration (or undeclaration) wins.
                continue;
            }
            seen.push(prefix);
            if code.uri_code() == 0 {
                // Undeclaration: masks outer bindings, contributes none.
                continue;
            }
            if Some(prefix) == xml_prefix {
                continue;
            }
            out.push(code);
        }
        cursor = n.parent();
    }
    out
}

/// Stream the in-scope bindings of an element to a receiver.
pub fn send_namespaces<N: XdmNode>(node: &N, receiver: &mut dyn Receiver) -> Result<(), Error> {
    for code in in_scope_namespace_codes(node) {
        receiver.namespace(code)?;
    }
    Ok(())
}

/// Standard iterator over an element's in-scope namespace codes.
pub struct NamespaceCodeIterator {
    codes: smallvec::IntoIter<[NamespaceCode; 8]>,
}

impl NamespaceCodeIterator {
    pub fn new<N: XdmNode>(node: &N) -> Self {
        NamespaceCodeIterator {
            codes: in_scope_namespace_codes(node).into_iter(),
        }
    }
}

impl Iterator for NamespaceCodeIterator {
    type Item = NamespaceCode;

    fn next(&mut self) -> Option<NamespaceCode> {
        self.codes.next()
    }
}
