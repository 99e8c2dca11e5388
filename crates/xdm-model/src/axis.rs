//! Static metadata for the XPath navigation axes.
//!
//! Everything here is a pure lookup: no state, no allocation. The bitmask
//! tables let callers short-circuit axis evaluation at compile time, e.g.
//! skip building an iterator when the axis is known to be empty for the
//! origin node kind.

use crate::error::Error;
use crate::model::NodeKind;

/// The thirteen XPath axes plus the internal `preceding-or-ancestor` axis
/// used by positional numbering. The internal axis is never produced by
/// [`Axis::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
    PrecedingOrAncestor,
}

impl Axis {
    pub const ALL: [Axis; 14] = [
        Axis::Ancestor,
        Axis::AncestorOrSelf,
        Axis::Attribute,
        Axis::Child,
        Axis::Descendant,
        Axis::DescendantOrSelf,
        Axis::Following,
        Axis::FollowingSibling,
        Axis::Namespace,
        Axis::Parent,
        Axis::Preceding,
        Axis::PrecedingSibling,
        Axis::SelfAxis,
        Axis::PrecedingOrAncestor,
    ];

    /// Parse the canonical lowercase axis name.
    pub fn from_name(name: &str) -> Result<Axis, Error> {
        Ok(match name {
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "attribute" => Axis::Attribute,
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "following" => Axis::Following,
            "following-sibling" => Axis::FollowingSibling,
            "namespace" => Axis::Namespace,
            "parent" => Axis::Parent,
            "preceding" => Axis::Preceding,
            "preceding-sibling" => Axis::PrecedingSibling,
            "self" => Axis::SelfAxis,
            _ => return Err(Error::unknown_axis(name)),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Ancestor => "ancestor",
            Axis::AncestorOrSelf => "ancestor-or-self",
            Axis::Attribute => "attribute",
            Axis::Child => "child",
            Axis::Descendant => "descendant",
            Axis::DescendantOrSelf => "descendant-or-self",
            Axis::Following => "following",
            Axis::FollowingSibling => "following-sibling",
            Axis::Namespace => "namespace",
            Axis::Parent => "parent",
            Axis::Preceding => "preceding",
            Axis::PrecedingSibling => "preceding-sibling",
            Axis::SelfAxis => "self",
            Axis::PrecedingOrAncestor => "preceding-or-ancestor",
        }
    }

    /// The node kind a name test on this axis selects by default.
    pub fn principal_node_kind(self) -> NodeKind {
        match self {
            Axis::Attribute => NodeKind::Attribute,
            Axis::Namespace => NodeKind::Namespace,
            _ => NodeKind::Element,
        }
    }

    /// True when the axis delivers nodes in document order.
    pub fn is_forwards(self) -> bool {
        matches!(
            self,
            Axis::Attribute
                | Axis::Child
                | Axis::Descendant
                | Axis::DescendantOrSelf
                | Axis::Following
                | Axis::FollowingSibling
                | Axis::Namespace
                | Axis::SelfAxis
        )
    }

    /// True when the axis delivers nodes in reverse document order.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor
                | Axis::AncestorOrSelf
                | Axis::Parent
                | Axis::Preceding
                | Axis::PrecedingSibling
                | Axis::PrecedingOrAncestor
                | Axis::SelfAxis
        )
    }

    /// A peer axis never returns two nodes where one is an ancestor of the
    /// other.
    pub fn is_peer(self) -> bool {
        matches!(
            self,
            Axis::Attribute
                | Axis::Child
                | Axis::FollowingSibling
                | Axis::Namespace
                | Axis::Parent
                | Axis::PrecedingSibling
                | Axis::SelfAxis
        )
    }

    /// A subtree axis only returns nodes within the subtree rooted at the
    /// origin.
    pub fn is_subtree(self) -> bool {
        matches!(
            self,
            Axis::Attribute
                | Axis::Child
                | Axis::Descendant
                | Axis::DescendantOrSelf
                | Axis::Namespace
                | Axis::SelfAxis
        )
    }

    /// True when this axis can never return any node from an origin of the
    /// given kind.
    pub fn is_always_empty(self, origin: NodeKind) -> bool {
        EMPTY_FROM[self as usize] & origin.bit() != 0
    }

    /// True when this axis can ever produce nodes of the given kind,
    /// whatever the origin.
    pub fn contains_node_kind(self, kind: NodeKind) -> bool {
        PRODUCES[self as usize] & kind.bit() != 0
    }
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

const DOCUMENT: u16 = 1 << NodeKind::Document as u16;
const ELEMENT: u16 = 1 << NodeKind::Element as u16;
const ATTRIBUTE: u16 = 1 << NodeKind::Attribute as u16;
const TEXT: u16 = 1 << NodeKind::Text as u16;
const COMMENT: u16 = 1 << NodeKind::Comment as u16;
const PI: u16 = 1 << NodeKind::ProcessingInstruction as u16;
const NAMESPACE: u16 = 1 << NodeKind::Namespace as u16;
const ORPHAN: u16 = 1 << NodeKind::Orphan as u16;

const ALL_KINDS: u16 =
    DOCUMENT | ELEMENT | ATTRIBUTE | TEXT | COMMENT | PI | NAMESPACE | ORPHAN;
const LEAF_KINDS: u16 = ATTRIBUTE | TEXT | COMMENT | PI | NAMESPACE;
const CHILD_KINDS: u16 = ELEMENT | TEXT | COMMENT | PI;

/// Per axis, the origin kinds for which the axis is unconditionally empty.
static EMPTY_FROM: [u16; 14] = [
    DOCUMENT | ORPHAN,                         // ancestor
    0,                                         // ancestor-or-self
    ALL_KINDS & !ELEMENT,                      // attribute
    LEAF_KINDS | ORPHAN,                       // child
    LEAF_KINDS | ORPHAN,                       // descendant
    0,                                         // descendant-or-self
    DOCUMENT | ORPHAN,                         // following
    DOCUMENT | ATTRIBUTE | NAMESPACE | ORPHAN, // following-sibling
    ALL_KINDS & !ELEMENT,                      // namespace
    DOCUMENT | ORPHAN,                         // parent
    DOCUMENT | ORPHAN,                         // preceding
    DOCUMENT | ATTRIBUTE | NAMESPACE | ORPHAN, // preceding-sibling
    0,                                         // self
    DOCUMENT | ORPHAN,                         // preceding-or-ancestor
];

/// Per axis, the node kinds it can ever produce.
static PRODUCES: [u16; 14] = [
    DOCUMENT | ELEMENT,          // ancestor
    ALL_KINDS,                   // ancestor-or-self
    ATTRIBUTE,                   // attribute
    CHILD_KINDS,                 // child
    CHILD_KINDS,                 // descendant
    ALL_KINDS,                   // descendant-or-self
    CHILD_KINDS,                 // following
    CHILD_KINDS,                 // following-sibling
    NAMESPACE,                   // namespace
    DOCUMENT | ELEMENT,          // parent
    CHILD_KINDS,                 // preceding
    CHILD_KINDS,                 // preceding-sibling
    ALL_KINDS,                   // self
    DOCUMENT | CHILD_KINDS,      // preceding-or-ancestor
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_public_names() {
        for axis in Axis::ALL {
            if axis == Axis::PrecedingOrAncestor {
                assert!(Axis::from_name(axis.name()).is_err());
            } else {
                assert_eq!(Axis::from_name(axis.name()).unwrap(), axis);
            }
        }
        assert!(Axis::from_name("descendant-or-self ").is_err());
        assert!(Axis::from_name("DESCENDANT").is_err());
    }

    #[test]
    fn classification_tables() {
        assert!(Axis::Attribute.is_always_empty(NodeKind::Document));
        assert!(!Axis::Attribute.is_always_empty(NodeKind::Element));
        assert!(Axis::Child.is_always_empty(NodeKind::Attribute));
        assert!(!Axis::DescendantOrSelf.is_always_empty(NodeKind::Text));
        assert!(Axis::FollowingSibling.is_always_empty(NodeKind::Attribute));

        assert!(Axis::Attribute.contains_node_kind(NodeKind::Attribute));
        assert!(!Axis::Attribute.contains_node_kind(NodeKind::Element));
        assert!(!Axis::Child.contains_node_kind(NodeKind::Document));
        assert!(Axis::AncestorOrSelf.contains_node_kind(NodeKind::Namespace));
    }

    #[test]
    fn direction_flags_are_consistent() {
        for axis in Axis::ALL {
            assert!(
                axis.is_forwards() || axis.is_reverse(),
                "{axis} has no direction"
            );
        }
        assert!(Axis::SelfAxis.is_forwards() && Axis::SelfAxis.is_reverse());
    }
}
