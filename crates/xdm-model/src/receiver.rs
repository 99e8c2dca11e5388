//! Event-based output contract for tree copies.
//!
//! A [`Receiver`] consumes a document as a stream of structural events in
//! document order. Names and namespace bindings arrive as pool codes, so a
//! receiver needs access to the same [`crate::names::NamePool`] the
//! producing tree used. Every method can fail; producers stop at the first
//! error.

use crate::error::Error;
use crate::names::{NameCode, NamespaceCode};

/// Which namespace bindings a copy operation emits for the top element of
/// the copied subtree. Below the top element only local declarations are
/// ever emitted, since everything outer has already been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhichNamespaces {
    /// No namespace events at all.
    None,
    /// Only bindings declared on the element itself.
    Local,
    /// The full in-scope set of the element.
    All,
}

/// Consumer of document events.
///
/// Event order within an element is fixed: `start_element`, then any
/// `namespace` events, then any `attribute` events, then `start_content`,
/// then the children, then `end_element`.
pub trait Receiver {
    fn start_document(&mut self) -> Result<(), Error>;

    fn end_document(&mut self) -> Result<(), Error>;

    fn start_element(&mut self, name: NameCode) -> Result<(), Error>;

    /// A namespace binding in scope for the current element.
    fn namespace(&mut self, code: NamespaceCode) -> Result<(), Error>;

    fn attribute(&mut self, name: NameCode, value: &str) -> Result<(), Error>;

    /// Marks the end of the namespace and attribute events for the current
    /// element.
    fn start_content(&mut self) -> Result<(), Error>;

    fn end_element(&mut self) -> Result<(), Error>;

    fn characters(&mut self, value: &str) -> Result<(), Error>;

    fn comment(&mut self, value: &str) -> Result<(), Error>;

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), Error>;
}

/// Discards every event. Useful for measuring traversal and as a base for
/// receivers that only care about a subset of events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReceiver;

impl Receiver for NullReceiver {
    fn start_document(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn start_element(&mut self, _name: NameCode) -> Result<(), Error> {
        Ok(())
    }

    fn namespace(&mut self, _code: NamespaceCode) -> Result<(), Error> {
        Ok(())
    }

    fn attribute(&mut self, _name: NameCode, _value: &str) -> Result<(), Error> {
        Ok(())
    }

    fn start_content(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn characters(&mut self, _value: &str) -> Result<(), Error> {
        Ok(())
    }

    fn comment(&mut self, _value: &str) -> Result<(), Error> {
        Ok(())
    }

    fn processing_instruction(&mut self, _target: &str, _data: &str) -> Result<(), Error> {
        Ok(())
    }
}
