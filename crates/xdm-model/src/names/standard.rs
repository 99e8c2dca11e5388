//! Pre-registered standard vocabulary.
//!
//! Fingerprint values below [`STANDARD_NAME_LIMIT`] are reserved for a
//! fixed set of well-known names (XML attributes, XSLT vocabulary, XSD
//! types, XSI attributes). These never occupy pool chain storage: the pool
//! answers allocation and reverse lookup for them straight from the tables
//! in this module, so their codes are identical across every pool instance.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Fingerprints below this value denote standard names.
pub const STANDARD_NAME_LIMIT: u32 = 1024;

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XSLT_NS: &str = "http://www.w3.org/1999/XSL/Transform";
pub const SCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const FN_NS: &str = "http://www.w3.org/2005/xpath-functions";
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";

/// URI codes pre-allocated in every pool, in table order.
pub const NULL_URI_CODE: u16 = 0;
pub const XML_URI_CODE: u16 = 1;
pub const XSLT_URI_CODE: u16 = 2;
pub const SCHEMA_URI_CODE: u16 = 3;
pub const XSI_URI_CODE: u16 = 4;
pub const FN_URI_CODE: u16 = 5;
pub const ERR_URI_CODE: u16 = 6;

pub(crate) static STANDARD_URIS: [&str; 7] =
    ["", XML_NS, XSLT_NS, SCHEMA_NS, XSI_NS, FN_NS, ERR_NS];

/// Conventional prefix per standard URI code, seeded into each pool so
/// that e.g. `xs:string` round-trips through its usual prefix.
pub(crate) static CONVENTIONAL_PREFIXES: [&str; 7] =
    ["", "xml", "xsl", "xs", "xsi", "fn", "err"];

const N_GENERIC: usize = 14;
const N_XML: usize = 4;
const N_XSLT: usize = 37;
const N_XS: usize = 46;
const N_XSI: usize = 4;

const GENERIC_OFFSET: u32 = 0;
const XML_OFFSET: u32 = GENERIC_OFFSET + N_GENERIC as u32;
const XSLT_OFFSET: u32 = XML_OFFSET + N_XML as u32;
const XS_OFFSET: u32 = XSLT_OFFSET + N_XSLT as u32;
const XSI_OFFSET: u32 = XS_OFFSET + N_XS as u32;
const STANDARD_NAME_COUNT: u32 = XSI_OFFSET + N_XSI as u32;

/// Standard attribute names in no namespace (the common XSLT attributes).
static GENERIC_LOCALS: [&str; N_GENERIC] = [
    "name", "select", "match", "mode", "priority", "version", "href", "test", "use", "format",
    "level", "count", "from", "value",
];

static XML_LOCALS: [&str; N_XML] = ["base", "space", "lang", "id"];

static XSLT_LOCALS: [&str; N_XSLT] = [
    "stylesheet",
    "transform",
    "template",
    "apply-templates",
    "apply-imports",
    "call-template",
    "value-of",
    "for-each",
    "if",
    "choose",
    "when",
    "otherwise",
    "variable",
    "param",
    "with-param",
    "copy",
    "copy-of",
    "element",
    "attribute",
    "text",
    "comment",
    "processing-instruction",
    "number",
    "sort",
    "import",
    "include",
    "output",
    "key",
    "strip-space",
    "preserve-space",
    "attribute-set",
    "namespace-alias",
    "sequence",
    "function",
    "message",
    "fallback",
    "decimal-format",
];

static XS_LOCALS: [&str; N_XS] = [
    "string",
    "untypedAtomic",
    "anyType",
    "anySimpleType",
    "anyAtomicType",
    "untyped",
    "boolean",
    "decimal",
    "float",
    "double",
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "positiveInteger",
    "normalizedString",
    "token",
    "language",
    "NMTOKEN",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "ENTITY",
];

static XSI_LOCALS: [&str; N_XSI] =
    ["type", "nil", "schemaLocation", "noNamespaceSchemaLocation"];

// Fingerprints of names the core itself consults.
pub const XML_BASE: u32 = XML_OFFSET;
pub const XML_SPACE: u32 = XML_OFFSET + 1;
pub const XML_LANG: u32 = XML_OFFSET + 2;
pub const XML_ID: u32 = XML_OFFSET + 3;
pub const XS_STRING: u32 = XS_OFFSET;
pub const XS_UNTYPED_ATOMIC: u32 = XS_OFFSET + 1;
pub const XSI_TYPE: u32 = XSI_OFFSET;

/// URI code and local name for a standard fingerprint value.
pub(crate) fn entry(fp: u32) -> Option<(u16, &'static str)> {
    if fp >= STANDARD_NAME_COUNT {
        return None;
    }
    let i = fp as usize;
    Some(if fp >= XSI_OFFSET {
        (XSI_URI_CODE, XSI_LOCALS[i - XSI_OFFSET as usize])
    } else if fp >= XS_OFFSET {
        (SCHEMA_URI_CODE, XS_LOCALS[i - XS_OFFSET as usize])
    } else if fp >= XSLT_OFFSET {
        (XSLT_URI_CODE, XSLT_LOCALS[i - XSLT_OFFSET as usize])
    } else if fp >= XML_OFFSET {
        (XML_URI_CODE, XML_LOCALS[i - XML_OFFSET as usize])
    } else {
        (NULL_URI_CODE, GENERIC_LOCALS[i])
    })
}

pub(crate) fn standard_uri_code(uri: &str) -> Option<u16> {
    STANDARD_URIS
        .iter()
        .position(|u| *u == uri)
        .map(|i| i as u16)
}

/// Reverse lookup: standard fingerprint for a (URI, local) pair, if the
/// pair belongs to the pre-registered vocabulary.
pub(crate) fn fingerprint_of(uri: &str, local: &str) -> Option<u32> {
    static INDEX: OnceLock<HashMap<(u16, &'static str), u32>> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        let mut map = HashMap::with_capacity(STANDARD_NAME_COUNT as usize);
        for fp in 0..STANDARD_NAME_COUNT {
            if let Some((code, name)) = entry(fp) {
                map.insert((code, name), fp);
            }
        }
        map
    });
    let code = standard_uri_code(uri)?;
    index.get(&(code, local)).copied()
}
