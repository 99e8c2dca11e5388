//! Name interning: the pool that maps (prefix, URI, local name) triples to
//! compact integer codes, and the value types wrapping those codes.
//!
//! Code layouts are shared with the rest of the engine and must not change:
//!
//! - fingerprint: 20 bits, low 10 = hash slot, high 10 = chain depth;
//! - namecode: fingerprint plus an 8-bit prefix index in bits 20..28;
//! - namespace code: 16-bit prefix code (high) | 16-bit URI code (low).
//!
//! Two names with the same fingerprint are guaranteed to have the same
//! (URI, local name). Two namecodes differing only in prefix share one
//! fingerprint. The pool is append-only: codes stay valid for the lifetime
//! of the pool and allocation is idempotent.
//!
//! Allocation serializes on an internal write lock; read-only lookups take
//! a shared lock and may run concurrently with each other.

pub mod checker;
pub mod standard;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::error::Error;
use standard::{STANDARD_NAME_LIMIT, STANDARD_URIS};

const HASH_SLOTS: usize = 1024;
const HASH_MODULUS: u32 = 1023;
const MAX_CHAIN_DEPTH: u32 = 1023;
const MAX_URIS: usize = 32000;
const MAX_PREFIXES: usize = 32000;
const MAX_PREFIXES_PER_URI: usize = 255;

/// Identifies a (namespace URI, local name) pair, independent of prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// Mask selecting the fingerprint bits of a namecode.
    pub const MASK: u32 = 0x000f_ffff;

    pub(crate) fn from_parts(slot: u32, depth: u32) -> Self {
        Fingerprint((depth << 10) | slot)
    }

    /// Reinterpret a raw integer as a fingerprint, dropping prefix bits.
    pub fn from_raw(raw: u32) -> Self {
        Fingerprint(raw & Self::MASK)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn hash_slot(self) -> u32 {
        self.0 & 0x3ff
    }

    pub(crate) fn chain_depth(self) -> u32 {
        (self.0 >> 10) & 0x3ff
    }

    /// True for the reserved standard-name range.
    pub fn is_standard(self) -> bool {
        self.0 < STANDARD_NAME_LIMIT
    }
}

/// Identifies a full (prefix, URI, local name) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameCode(u32);

impl NameCode {
    pub(crate) fn compose(prefix_index: u8, fingerprint: Fingerprint) -> Self {
        NameCode((u32::from(prefix_index) << 20) | fingerprint.0)
    }

    pub fn from_raw(raw: u32) -> Self {
        NameCode(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn fingerprint(self) -> Fingerprint {
        Fingerprint(self.0 & Fingerprint::MASK)
    }

    /// Ordinal of the prefix within the prefixes seen for this name's URI.
    pub fn prefix_index(self) -> u8 {
        ((self.0 >> 20) & 0xff) as u8
    }
}

/// Identifies a (prefix, URI) binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceCode(u32);

impl NamespaceCode {
    pub fn new(prefix_code: u16, uri_code: u16) -> Self {
        NamespaceCode((u32::from(prefix_code) << 16) | u32::from(uri_code))
    }

    pub fn from_raw(raw: u32) -> Self {
        NamespaceCode(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn prefix_code(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn uri_code(self) -> u16 {
        (self.0 & 0xffff) as u16
    }
}

#[derive(Debug, Clone)]
struct NameEntry {
    uri_code: u16,
    local: CompactString,
}

#[derive(Debug)]
struct PoolTables {
    /// 1024 hash chains; the entry at chain index `d` has depth `d + 1`,
    /// so non-standard fingerprints never collide with the reserved range.
    chains: Vec<Vec<NameEntry>>,
    prefixes: Vec<CompactString>,
    uris: Vec<CompactString>,
    /// Per URI, the distinct prefixes ever used with it; index 0 is always
    /// the empty prefix. Position in this list is the namecode prefix index.
    prefixes_for_uri: Vec<Vec<CompactString>>,
    document_numbers: HashMap<u64, u32>,
    next_document_number: u32,
}

impl PoolTables {
    fn seeded() -> Self {
        let mut uris = Vec::with_capacity(STANDARD_URIS.len());
        let mut prefixes_for_uri = Vec::with_capacity(STANDARD_URIS.len());
        for (i, uri) in STANDARD_URIS.iter().enumerate() {
            uris.push(CompactString::from(*uri));
            let mut list = vec![CompactString::const_new("")];
            let conventional = standard::CONVENTIONAL_PREFIXES[i];
            if !conventional.is_empty() {
                list.push(CompactString::from(conventional));
            }
            prefixes_for_uri.push(list);
        }
        let prefixes = standard::CONVENTIONAL_PREFIXES
            .iter()
            .map(|p| CompactString::from(*p))
            .collect();
        PoolTables {
            chains: vec![Vec::new(); HASH_SLOTS],
            prefixes,
            uris,
            prefixes_for_uri,
            document_numbers: HashMap::new(),
            next_document_number: 1,
        }
    }

    fn uri_code(&self, uri: &str) -> Option<u16> {
        self.uris.iter().position(|u| u == uri).map(|i| i as u16)
    }

    fn allocate_uri_code(&mut self, uri: &str) -> Result<u16, Error> {
        if let Some(code) = self.uri_code(uri) {
            return Ok(code);
        }
        if self.uris.len() >= MAX_URIS {
            return Err(Error::pool_limit("distinct namespace URIs", MAX_URIS));
        }
        self.uris.push(CompactString::from(uri));
        self.prefixes_for_uri.push(vec![CompactString::const_new("")]);
        let code = (self.uris.len() - 1) as u16;
        debug!(uri, code, "allocated namespace URI code");
        Ok(code)
    }

    fn prefix_code(&self, prefix: &str) -> Option<u16> {
        self.prefixes
            .iter()
            .position(|p| p == prefix)
            .map(|i| i as u16)
    }

    fn allocate_prefix_code(&mut self, prefix: &str) -> Result<u16, Error> {
        if let Some(code) = self.prefix_code(prefix) {
            return Ok(code);
        }
        if self.prefixes.len() >= MAX_PREFIXES {
            return Err(Error::pool_limit("distinct prefixes", MAX_PREFIXES));
        }
        self.prefixes.push(CompactString::from(prefix));
        let code = (self.prefixes.len() - 1) as u16;
        debug!(prefix, code, "allocated prefix code");
        Ok(code)
    }

    fn prefix_index(&self, uri_code: u16, prefix: &str) -> Option<u8> {
        self.prefixes_for_uri
            .get(uri_code as usize)?
            .iter()
            .position(|p| p == prefix)
            .map(|i| i as u8)
    }

    fn allocate_prefix_index(&mut self, uri_code: u16, prefix: &str) -> Result<u8, Error> {
        let list = &mut self.prefixes_for_uri[uri_code as usize];
        if let Some(i) = list.iter().position(|p| p == prefix) {
            return Ok(i as u8);
        }
        if list.len() > MAX_PREFIXES_PER_URI {
            return Err(Error::pool_limit(
                "distinct prefixes for one URI",
                MAX_PREFIXES_PER_URI,
            ));
        }
        list.push(CompactString::from(prefix));
        Ok((list.len() - 1) as u8)
    }

    /// Locate the (URI code, local name) entry behind a fingerprint.
    fn entry(&self, fp: Fingerprint) -> Result<(u16, &str), Error> {
        if fp.is_standard() {
            return standard::entry(fp.as_u32()).ok_or_else(|| Error::unknown_name_code(fp.as_u32()));
        }
        let slot = fp.hash_slot() as usize;
        let depth = fp.chain_depth() as usize;
        self.chains
            .get(slot)
            .and_then(|chain| chain.get(depth - 1))
            .map(|e| (e.uri_code, e.local.as_str()))
            .ok_or_else(|| Error::unknown_name_code(fp.as_u32()))
    }
}

/// The name-interning registry shared by every tree built for one
/// processing run. Constructed explicitly and passed by `Arc`; there is no
/// implicit process-wide instance.
#[derive(Debug)]
pub struct NamePool {
    tables: RwLock<PoolTables>,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

impl NamePool {
    pub fn new() -> Self {
        NamePool {
            tables: RwLock::new(PoolTables::seeded()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PoolTables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolTables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate (or find) the namecode for a (prefix, URI, local) triple.
    /// Idempotent: the same triple always yields the same code, and two
    /// triples differing only in prefix share a fingerprint.
    pub fn allocate(&self, prefix: &str, uri: &str, local: &str) -> Result<NameCode, Error> {
        if let (Some(fp), Some(uri_code)) = (
            standard::fingerprint_of(uri, local),
            standard::standard_uri_code(uri),
        ) {
            // Standard names never touch chain storage.
            let mut t = self.write();
            let index = t.allocate_prefix_index(uri_code, prefix)?;
            return Ok(NameCode::compose(index, Fingerprint(fp)));
        }
        let mut t = self.write();
        let uri_code = t.allocate_uri_code(uri)?;
        let slot = name_hash(local);
        let chain = &mut t.chains[slot as usize];
        let depth = match chain
            .iter()
            .position(|e| e.uri_code == uri_code && e.local == local)
        {
            Some(i) => i as u32 + 1,
            None => {
                if chain.len() as u32 >= MAX_CHAIN_DEPTH {
                    return Err(Error::pool_limit(
                        "names in one hash chain",
                        MAX_CHAIN_DEPTH as usize,
                    ));
                }
                chain.push(NameEntry {
                    uri_code,
                    local: CompactString::from(local),
                });
                trace!(local, uri_code, slot, "interned new name");
                chain.len() as u32
            }
        };
        let fingerprint = Fingerprint::from_parts(slot, depth);
        let index = t.allocate_prefix_index(uri_code, prefix)?;
        Ok(NameCode::compose(index, fingerprint))
    }

    /// Lookup-only fingerprint query. Never allocates; `None` when the
    /// (URI, local) pair has not been seen by this pool.
    pub fn fingerprint_for(&self, uri: &str, local: &str) -> Option<Fingerprint> {
        if let Some(fp) = standard::fingerprint_of(uri, local) {
            return Some(Fingerprint(fp));
        }
        let t = self.read();
        let uri_code = t.uri_code(uri)?;
        let slot = name_hash(local);
        t.chains[slot as usize]
            .iter()
            .position(|e| e.uri_code == uri_code && e.local == local)
            .map(|i| Fingerprint::from_parts(slot, i as u32 + 1))
    }

    /// Namespace URI of a fingerprint. Unknown codes are a caller bug and
    /// reported as an error, never silently mapped to a placeholder.
    pub fn uri_of(&self, fp: Fingerprint) -> Result<String, Error> {
        let t = self.read();
        let (uri_code, _) = t.entry(fp)?;
        Ok(t.uris[uri_code as usize].to_string())
    }

    pub fn local_name_of(&self, fp: Fingerprint) -> Result<String, Error> {
        let t = self.read();
        let (_, local) = t.entry(fp)?;
        Ok(local.to_string())
    }

    pub fn uri_code_of(&self, fp: Fingerprint) -> Result<u16, Error> {
        let t = self.read();
        let (uri_code, _) = t.entry(fp)?;
        Ok(uri_code)
    }

    /// Prefix of a namecode, resolved through the prefix index against the
    /// prefixes seen for the name's URI.
    pub fn prefix_of(&self, code: NameCode) -> Result<String, Error> {
        let t = self.read();
        let (uri_code, _) = t.entry(code.fingerprint())?;
        t.prefixes_for_uri[uri_code as usize]
            .get(code.prefix_index() as usize)
            .map(|p| p.to_string())
            .ok_or_else(|| Error::unknown_name_code(code.as_u32()))
    }

    /// `prefix:local`, or just `local` when the prefix is empty.
    pub fn display_name_of(&self, code: NameCode) -> Result<String, Error> {
        let t = self.read();
        let (uri_code, local) = t.entry(code.fingerprint())?;
        let prefix = t.prefixes_for_uri[uri_code as usize]
            .get(code.prefix_index() as usize)
            .ok_or_else(|| Error::unknown_name_code(code.as_u32()))?;
        if prefix.is_empty() {
            Ok(local.to_string())
        } else {
            Ok(format!("{prefix}:{local}"))
        }
    }

    /// Clark notation: `{uri}local`, or `local` for names in no namespace.
    pub fn clark_name_of(&self, fp: Fingerprint) -> Result<String, Error> {
        let t = self.read();
        let (uri_code, local) = t.entry(fp)?;
        let uri = &t.uris[uri_code as usize];
        if uri.is_empty() {
            Ok(local.to_string())
        } else {
            Ok(format!("{{{uri}}}{local}"))
        }
    }

    /// Split Clark notation into (uri, local).
    pub fn parse_clark_name(clark: &str) -> Result<(&str, &str), Error> {
        if let Some(rest) = clark.strip_prefix('{') {
            match rest.split_once('}') {
                Some((uri, local)) if !local.is_empty() => Ok((uri, local)),
                _ => Err(Error::invalid_name(clark, "malformed Clark name")),
            }
        } else if clark.contains('}') {
            Err(Error::invalid_name(clark, "malformed Clark name"))
        } else {
            Ok(("", clark))
        }
    }

    /// Allocate a namecode from Clark notation, with an empty prefix.
    pub fn allocate_clark_name(&self, clark: &str) -> Result<NameCode, Error> {
        let (uri, local) = Self::parse_clark_name(clark)?;
        self.allocate("", uri, local)
    }

    pub fn allocate_code_for_uri(&self, uri: &str) -> Result<u16, Error> {
        self.write().allocate_uri_code(uri)
    }

    pub fn code_for_uri(&self, uri: &str) -> Option<u16> {
        self.read().uri_code(uri)
    }

    pub fn uri_for_code(&self, code: u16) -> Result<String, Error> {
        self.read()
            .uris
            .get(code as usize)
            .map(|u| u.to_string())
            .ok_or_else(|| Error::unknown_name_code(u32::from(code)))
    }

    pub fn allocate_code_for_prefix(&self, prefix: &str) -> Result<u16, Error> {
        self.write().allocate_prefix_code(prefix)
    }

    pub fn code_for_prefix(&self, prefix: &str) -> Option<u16> {
        self.read().prefix_code(prefix)
    }

    pub fn prefix_for_code(&self, code: u16) -> Result<String, Error> {
        self.read()
            .prefixes
            .get(code as usize)
            .map(|p| p.to_string())
            .ok_or_else(|| Error::unknown_name_code(u32::from(code)))
    }

    /// Allocate a namespace code for a (prefix, URI) binding. Also records
    /// the prefix as seen for that URI so later prefix-index resolution and
    /// [`NamePool::suggest_prefix_for_uri`] can find it.
    pub fn allocate_namespace_code(&self, prefix: &str, uri: &str) -> Result<NamespaceCode, Error> {
        let mut t = self.write();
        let prefix_code = t.allocate_prefix_code(prefix)?;
        let uri_code = t.allocate_uri_code(uri)?;
        t.allocate_prefix_index(uri_code, prefix)?;
        Ok(NamespaceCode::new(prefix_code, uri_code))
    }

    /// Lookup-only variant: `None` unless both the prefix and the URI are
    /// already known to this pool.
    pub fn namespace_code_for(&self, prefix: &str, uri: &str) -> Option<NamespaceCode> {
        let t = self.read();
        let prefix_code = t.prefix_code(prefix)?;
        let uri_code = t.uri_code(uri)?;
        Some(NamespaceCode::new(prefix_code, uri_code))
    }

    pub fn prefix_from_namespace_code(&self, ns: NamespaceCode) -> Result<String, Error> {
        self.prefix_for_code(ns.prefix_code())
    }

    pub fn uri_from_namespace_code(&self, ns: NamespaceCode) -> Result<String, Error> {
        self.uri_for_code(ns.uri_code())
    }

    /// A prefix conventionally usable for a URI: the first non-empty prefix
    /// ever seen with it.
    pub fn suggest_prefix_for_uri(&self, uri: &str) -> Option<String> {
        let t = self.read();
        let uri_code = t.uri_code(uri)?;
        t.prefixes_for_uri[uri_code as usize]
            .iter()
            .find(|p| !p.is_empty())
            .map(|p| p.to_string())
    }

    /// Issue (or re-issue) the document number for a node identity key.
    /// Numbers increase monotonically per pool and are stable per key
    /// until [`NamePool::release_document_number`] discards the entry.
    pub fn allocate_document_number(&self, key: u64) -> u32 {
        let mut t = self.write();
        if let Some(n) = t.document_numbers.get(&key) {
            return *n;
        }
        let n = t.next_document_number;
        t.next_document_number += 1;
        t.document_numbers.insert(key, n);
        debug!(key, number = n, "allocated document number");
        n
    }

    pub fn document_number(&self, key: u64) -> Option<u32> {
        self.read().document_numbers.get(&key).copied()
    }

    /// Explicit discard of a document-number entry once the owning
    /// document is no longer needed, so the pool does not pin the key map
    /// for the whole run.
    pub fn release_document_number(&self, key: u64) {
        self.write().document_numbers.remove(&key);
    }
}

/// Hash a local name into one of the 1024 chain slots. The 31-polynomial
/// over UTF-16 units keeps fingerprints stable across pool instances for
/// identical input, which several diagnostics rely on.
fn name_hash(local: &str) -> u32 {
    let mut h: u32 = 0;
    for unit in local.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(unit));
    }
    (h & 0x7fff_ffff) % HASH_MODULUS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_idempotent() {
        let pool = NamePool::new();
        let a = pool.allocate("p", "urn:test", "item").unwrap();
        let b = pool.allocate("p", "urn:test", "item").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn prefixes_share_fingerprint() {
        let pool = NamePool::new();
        let a = pool.allocate("p", "urn:test", "item").unwrap();
        let b = pool.allocate("q", "urn:test", "item").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(pool.prefix_of(a).unwrap(), "p");
        assert_eq!(pool.prefix_of(b).unwrap(), "q");
    }

    #[test]
    fn standard_names_bypass_chains() {
        let pool = NamePool::new();
        let code = pool
            .allocate("xs", standard::SCHEMA_NS, "string")
            .unwrap();
        assert!(code.fingerprint().is_standard());
        assert_eq!(code.fingerprint().as_u32(), standard::XS_STRING);
    }

    #[test]
    fn unknown_fingerprint_is_an_error() {
        let pool = NamePool::new();
        let bogus = Fingerprint::from_raw(0x0ffff);
        let err = pool.uri_of(bogus).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::UnknownNameCode);
    }

    #[test]
    fn clark_name_round_trip() {
        let pool = NamePool::new();
        let code = pool.allocate_clark_name("{urn:test}leaf").unwrap();
        assert_eq!(
            pool.clark_name_of(code.fingerprint()).unwrap(),
            "{urn:test}leaf"
        );
        let plain = pool.allocate_clark_name("leaf").unwrap();
        assert_eq!(pool.uri_of(plain.fingerprint()).unwrap(), "");
        assert!(NamePool::parse_clark_name("{unterminated").is_err());
    }

    #[test]
    fn document_numbers_are_stable_until_released() {
        let pool = NamePool::new();
        let a = pool.allocate_document_number(17);
        assert_eq!(pool.allocate_document_number(17), a);
        let b = pool.allocate_document_number(18);
        assert!(b > a);
        pool.release_document_number(17);
        assert_eq!(pool.document_number(17), None);
        assert_ne!(pool.allocate_document_number(17), a);
    }
}
