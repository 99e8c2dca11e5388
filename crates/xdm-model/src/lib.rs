//! Tree-model core for an XPath processing engine.
//!
//! The crate provides the pieces every layer above shares:
//!
//! - [`names`]: the [`NamePool`] interning (prefix, URI, local name)
//!   triples into compact codes with fixed bit layouts, plus XML name
//!   validation;
//! - [`model`]: the [`XdmNode`] trait concrete trees implement, node
//!   tests, and a simple in-memory tree;
//! - [`axis`] and [`navigator`]: the fourteen navigation axes with
//!   generic iterator implementations, document-order comparison, deep
//!   copy and positional numbering;
//! - [`namespaces`]: in-scope namespace resolution;
//! - [`receiver`]: the event stream contract tree copies write to;
//! - [`stripped`]: a whitespace-stripping view over any tree.
//!
//! Trees implement a handful of primitives and inherit the rest; see
//! [`XdmNode`] for the contract.

pub mod axis;
pub mod error;
pub mod iter;
pub mod model;
pub mod names;
pub mod namespaces;
pub mod navigator;
pub mod receiver;
pub mod stripped;

pub use axis::Axis;
pub use error::{Error, ErrorCode};
pub use iter::AxisIterator;
pub use model::{
    AnyNodeTest, KindTest, NameTest, NodeKind, NodeTest, QName, SiblingCountingNode, XdmNode,
};
pub use names::checker::{NameChecker, Xml10NameChecker, Xml11NameChecker};
pub use names::{Fingerprint, NameCode, NamePool, NamespaceCode};
pub use receiver::{NullReceiver, Receiver, WhichNamespaces};
pub use stripped::{SpaceStrippingRule, StripAllRule, StrippedDocument, StrippedNode};
