//! Lexical validation of NCNames and QNames.
//!
//! The character classes are the harmonized Name rules shared by XML 1.0
//! (fifth edition) and XML 1.1; the two checkers differ only in the XML
//! version they report. Callers pick the checker matching the document's
//! declared version and pass validated strings on to the [`NamePool`].
//!
//! [`NamePool`]: crate::names::NamePool

use crate::error::Error;

/// Validates NCName/QName lexical syntax for one XML version.
pub trait NameChecker: Send + Sync {
    /// The XML version this checker enforces, `"1.0"` or `"1.1"`.
    fn xml_version(&self) -> &'static str;

    fn is_ncname_start_char(&self, c: char) -> bool {
        is_name_start_char(c)
    }

    fn is_ncname_char(&self, c: char) -> bool {
        is_name_char(c)
    }

    /// True if `name` is a valid NCName (a Name with no colon).
    fn is_valid_ncname(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if self.is_ncname_start_char(c) => {}
            _ => return false,
        }
        chars.all(|c| self.is_ncname_char(c))
    }

    /// True if `name` is a valid lexical QName: an NCName, optionally
    /// preceded by an NCName prefix and a single colon.
    fn is_valid_qname(&self, name: &str) -> bool {
        match name.split_once(':') {
            None => self.is_valid_ncname(name),
            Some((prefix, local)) => {
                self.is_valid_ncname(prefix) && self.is_valid_ncname(local)
            }
        }
    }

    /// Split a lexical QName into (prefix, local) parts, validating both.
    /// The prefix is empty when the QName has no colon.
    fn qname_parts<'a>(&self, qname: &'a str) -> Result<(&'a str, &'a str), Error> {
        let (prefix, local) = match qname.split_once(':') {
            None => ("", qname),
            Some((p, l)) => (p, l),
        };
        if !prefix.is_empty() && !self.is_valid_ncname(prefix) {
            return Err(Error::invalid_name(qname, "prefix is not a valid NCName"));
        }
        if !self.is_valid_ncname(local) {
            return Err(Error::invalid_name(qname, "local part is not a valid NCName"));
        }
        Ok((prefix, local))
    }
}

/// Checker for XML 1.0 (fifth edition) names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml10NameChecker;

impl NameChecker for Xml10NameChecker {
    fn xml_version(&self) -> &'static str {
        "1.0"
    }
}

/// Checker for XML 1.1 names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml11NameChecker;

impl NameChecker for Xml11NameChecker {
    fn xml_version(&self) -> &'static str {
        "1.1"
    }
}

/// NameStartChar per XML 1.0 5e / XML 1.1, with `:` excluded (NCName rule).
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// NameChar: NameStartChar plus digits, `-`, `.`, and the combining ranges.
fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}
