use rstest::rstest;
use xdm_model::names::standard;
use xdm_model::{ErrorCode, Fingerprint, NamePool};

#[rstest]
fn standard_name_round_trip_keeps_prefix() {
    let pool = NamePool::new();
    let code = pool.allocate("xs", standard::SCHEMA_NS, "string").unwrap();
    assert_eq!(code.fingerprint().as_u32(), standard::XS_STRING);
    assert!(code.fingerprint().is_standard());
    assert_eq!(pool.prefix_of(code).unwrap(), "xs");
    assert_eq!(pool.display_name_of(code).unwrap(), "xs:string");
    assert_eq!(pool.local_name_of(code.fingerprint()).unwrap(), "string");
    assert_eq!(pool.uri_of(code.fingerprint()).unwrap(), standard::SCHEMA_NS);
}

#[rstest]
fn fingerprints_identify_uri_and_local_pairs() {
    let pool = NamePool::new();
    let a = pool.allocate("", "urn:one", "item").unwrap();
    let b = pool.allocate("p", "urn:one", "item").unwrap();
    let c = pool.allocate("", "urn:two", "item").unwrap();
    let d = pool.allocate("", "urn:one", "other").unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_ne!(a.fingerprint(), d.fingerprint());
    // Non-standard fingerprints stay out of the reserved range.
    assert!(!a.fingerprint().is_standard());
    assert!(a.fingerprint().as_u32() >= 1024);
}

#[rstest]
fn fingerprint_lookup_never_allocates() {
    let pool = NamePool::new();
    assert!(pool.fingerprint_for("urn:unseen", "x").is_none());
    let code = pool.allocate("", "urn:unseen", "x").unwrap();
    assert_eq!(
        pool.fingerprint_for("urn:unseen", "x"),
        Some(code.fingerprint())
    );
    // Standard names are always resolvable.
    assert_eq!(
        pool.fingerprint_for(standard::XML_NS, "base"),
        Some(Fingerprint::from_raw(standard::XML_BASE))
    );
}

#[rstest]
fn same_input_yields_same_fingerprint_across_pools() {
    let one = NamePool::new();
    let two = NamePool::new();
    let a = one.allocate("", "urn:x", "stable").unwrap();
    let b = two.allocate("", "urn:x", "stable").unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[rstest]
fn namespace_codes_pack_prefix_and_uri() {
    let pool = NamePool::new();
    let ns = pool.allocate_namespace_code("p", "urn:one").unwrap();
    assert_eq!(pool.prefix_from_namespace_code(ns).unwrap(), "p");
    assert_eq!(pool.uri_from_namespace_code(ns).unwrap(), "urn:one");
    assert_eq!(pool.namespace_code_for("p", "urn:one"), Some(ns));
    assert_eq!(pool.namespace_code_for("zz", "urn:one"), None);
    // Allocating a binding registers the prefix for the URI.
    assert_eq!(pool.suggest_prefix_for_uri("urn:one").as_deref(), Some("p"));
}

#[rstest]
fn prefix_limit_per_uri_is_enforced() {
    let pool = NamePool::new();
    // Index 0 is the empty prefix; 255 named prefixes fill the table.
    for i in 0..255 {
        pool.allocate(&format!("p{i}"), "urn:crowded", "n").unwrap();
    }
    let err = pool.allocate("overflow", "urn:crowded", "n").unwrap_err();
    assert_eq!(err.code, ErrorCode::PoolLimitExceeded);
    // Existing codes keep working after a failed allocation.
    assert!(pool.allocate("p0", "urn:crowded", "n").is_ok());
}

#[rstest]
fn unknown_codes_are_reported_not_invented() {
    let pool = NamePool::new();
    let bogus = Fingerprint::from_raw(0x000f_fc01);
    assert_eq!(
        pool.uri_of(bogus).unwrap_err().code,
        ErrorCode::UnknownNameCode
    );
    assert_eq!(
        pool.local_name_of(bogus).unwrap_err().code,
        ErrorCode::UnknownNameCode
    );
    assert_eq!(
        pool.clark_name_of(bogus).unwrap_err().code,
        ErrorCode::UnknownNameCode
    );
}

#[rstest]
fn conventional_prefixes_are_seeded() {
    let pool = NamePool::new();
    assert_eq!(pool.code_for_prefix(""), Some(0));
    assert_eq!(pool.code_for_prefix("xml"), Some(1));
    assert_eq!(pool.code_for_uri(""), Some(0));
    assert_eq!(pool.code_for_uri(standard::XML_NS), Some(1));
    assert_eq!(
        pool.suggest_prefix_for_uri(standard::SCHEMA_NS).as_deref(),
        Some("xs")
    );
}
