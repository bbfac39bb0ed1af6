//! QPACK static table per RFC 9204 Appendix A.
//!
//! 99 predefined header fields, indexed from 0. Values may be empty. The
//! table is compiled in, shared by every decoder and encoder, and never
//! changes.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Static table entry.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntry {
    pub name: &'static [u8],
    pub value: &'static [u8],
}

impl StaticEntry {
    const fn new(name: &'static [u8], value: &'static [u8]) -> Self {
        Self { name, value }
    }
}

/// The 99 entries, in index order.
pub static STATIC_TABLE: &[StaticEntry] = &[
    /*  0 */ StaticEntry::new(b":authority", b""),
    /*  1 */ StaticEntry::new(b":path", b"/"),
    /*  2 */ StaticEntry::new(b"age", b"0"),
    /*  3 */ StaticEntry::new(b"content-disposition", b""),
    /*  4 */ StaticEntry::new(b"content-length", b"0"),
    /*  5 */ StaticEntry::new(b"cookie", b""),
    /*  6 */ StaticEntry::new(b"date", b""),
    /*  7 */ StaticEntry::new(b"etag", b""),
    /*  8 */ StaticEntry::new(b"if-modified-since", b""),
    /*  9 */ StaticEntry::new(b"if-none-match", b""),
    /* 10 */ StaticEntry::new(b"last-modified", b""),
    /* 11 */ StaticEntry::new(b"link", b""),
    /* 12 */ StaticEntry::new(b"location", b""),
    /* 13 */ StaticEntry::new(b"referer", b""),
    /* 14 */ StaticEntry::new(b"set-cookie", b""),
    /* 15 */ StaticEntry::new(b":method", b"CONNECT"),
    /* 16 */ StaticEntry::new(b":method", b"DELETE"),
    /* 17 */ StaticEntry::new(b":method", b"GET"),
    /* 18 */ StaticEntry::new(b":method", b"HEAD"),
    /* 19 */ StaticEntry::new(b":method", b"OPTIONS"),
    /* 20 */ StaticEntry::new(b":method", b"POST"),
    /* 21 */ StaticEntry::new(b":method", b"PUT"),
    /* 22 */ StaticEntry::new(b":scheme", b"http"),
    /* 23 */ StaticEntry::new(b":scheme", b"https"),
    /* 24 */ StaticEntry::new(b":status", b"103"),
    /* 25 */ StaticEntry::new(b":status", b"200"),
    /* 26 */ StaticEntry::new(b":status", b"304"),
    /* 27 */ StaticEntry::new(b":status", b"404"),
    /* 28 */ StaticEntry::new(b":status", b"503"),
    /* 29 */ StaticEntry::new(b"accept", b"*/*"),
    /* 30 */ StaticEntry::new(b"accept", b"application/dns-message"),
    /* 31 */ StaticEntry::new(b"accept-encoding", b"gzip, deflate, br"),
    /* 32 */ StaticEntry::new(b"accept-ranges", b"bytes"),
    /* 33 */ StaticEntry::new(b"access-control-allow-headers", b"cache-control"),
    /* 34 */ StaticEntry::new(b"access-control-allow-headers", b"content-type"),
    /* 35 */ StaticEntry::new(b"access-control-allow-origin", b"*"),
    /* 36 */ StaticEntry::new(b"cache-control", b"max-age=0"),
    /* 37 */ StaticEntry::new(b"cache-control", b"max-age=2592000"),
    /* 38 */ StaticEntry::new(b"cache-control", b"max-age=604800"),
    /* 39 */ StaticEntry::new(b"cache-control", b"no-cache"),
    /* 40 */ StaticEntry::new(b"cache-control", b"no-store"),
    /* 41 */ StaticEntry::new(b"cache-control", b"public, max-age=31536000"),
    /* 42 */ StaticEntry::new(b"content-encoding", b"br"),
    /* 43 */ StaticEntry::new(b"content-encoding", b"gzip"),
    /* 44 */ StaticEntry::new(b"content-type", b"application/dns-message"),
    /* 45 */ StaticEntry::new(b"content-type", b"application/javascript"),
    /* 46 */ StaticEntry::new(b"content-type", b"application/json"),
    /* 47 */ StaticEntry::new(b"content-type", b"application/x-www-form-urlencoded"),
    /* 48 */ StaticEntry::new(b"content-type", b"image/gif"),
    /* 49 */ StaticEntry::new(b"content-type", b"image/jpeg"),
    /* 50 */ StaticEntry::new(b"content-type", b"image/png"),
    /* 51 */ StaticEntry::new(b"content-type", b"text/css"),
    /* 52 */ StaticEntry::new(b"content-type", b"text/html; charset=utf-8"),
    /* 53 */ StaticEntry::new(b"content-type", b"text/plain"),
    /* 54 */ StaticEntry::new(b"content-type", b"text/plain;charset=utf-8"),
    /* 55 */ StaticEntry::new(b"range", b"bytes=0-"),
    /* 56 */ StaticEntry::new(b"strict-transport-security", b"max-age=31536000"),
    /* 57 */ StaticEntry::new(b"strict-transport-security", b"max-age=31536000; includesubdomains"),
    /* 58 */ StaticEntry::new(b"strict-transport-security", b"max-age=31536000; includesubdomains; preload"),
    /* 59 */ StaticEntry::new(b"vary", b"accept-encoding"),
    /* 60 */ StaticEntry::new(b"vary", b"origin"),
    /* 61 */ StaticEntry::new(b"x-content-type-options", b"nosniff"),
    /* 62 */ StaticEntry::new(b"x-xss-protection", b"1; mode=block"),
    /* 63 */ StaticEntry::new(b":status", b"100"),
    /* 64 */ StaticEntry::new(b":status", b"204"),
    /* 65 */ StaticEntry::new(b":status", b"206"),
    /* 66 */ StaticEntry::new(b":status", b"302"),
    /* 67 */ StaticEntry::new(b":status", b"400"),
    /* 68 */ StaticEntry::new(b":status", b"403"),
    /* 69 */ StaticEntry::new(b":status", b"421"),
    /* 70 */ StaticEntry::new(b":status", b"425"),
    /* 71 */ StaticEntry::new(b":status", b"500"),
    /* 72 */ StaticEntry::new(b"accept-language", b""),
    /* 73 */ StaticEntry::new(b"access-control-allow-credentials", b"FALSE"),
    /* 74 */ StaticEntry::new(b"access-control-allow-credentials", b"TRUE"),
    /* 75 */ StaticEntry::new(b"access-control-allow-headers", b"*"),
    /* 76 */ StaticEntry::new(b"access-control-allow-methods", b"get"),
    /* 77 */ StaticEntry::new(b"access-control-allow-methods", b"get, post, options"),
    /* 78 */ StaticEntry::new(b"access-control-allow-methods", b"options"),
    /* 79 */ StaticEntry::new(b"access-control-expose-headers", b"content-length"),
    /* 80 */ StaticEntry::new(b"access-control-request-headers", b"content-type"),
    /* 81 */ StaticEntry::new(b"access-control-request-method", b"get"),
    /* 82 */ StaticEntry::new(b"access-control-request-method", b"post"),
    /* 83 */ StaticEntry::new(b"alt-svc", b"clear"),
    /* 84 */ StaticEntry::new(b"authorization", b""),
    /* 85 */ StaticEntry::new(b"content-security-policy", b"script-src 'none'; object-src 'none'; base-uri 'none'"),
    /* 86 */ StaticEntry::new(b"early-data", b"1"),
    /* 87 */ StaticEntry::new(b"expect-ct", b""),
    /* 88 */ StaticEntry::new(b"forwarded", b""),
    /* 89 */ StaticEntry::new(b"if-range", b""),
    /* 90 */ StaticEntry::new(b"origin", b""),
    /* 91 */ StaticEntry::new(b"purpose", b"prefetch"),
    /* 92 */ StaticEntry::new(b"server", b""),
    /* 93 */ StaticEntry::new(b"timing-allow-origin", b"*"),
    /* 94 */ StaticEntry::new(b"upgrade-insecure-requests", b"1"),
    /* 95 */ StaticEntry::new(b"user-agent", b""),
    /* 96 */ StaticEntry::new(b"x-forwarded-for", b""),
    /* 97 */ StaticEntry::new(b"x-frame-options", b"deny"),
    /* 98 */ StaticEntry::new(b"x-frame-options", b"sameorigin"),
];

/// Reverse lookup maps, built once.
struct StaticTableLookup {
    /// Map from (name, value) to index.
    exact_match: HashMap<(&'static [u8], &'static [u8]), usize>,
    /// Map from name to first matching index.
    name_match: HashMap<&'static [u8], usize>,
}

impl StaticTableLookup {
    fn new() -> Self {
        let mut exact_match = HashMap::new();
        let mut name_match = HashMap::new();

        for (idx, entry) in STATIC_TABLE.iter().enumerate() {
            exact_match.entry((entry.name, entry.value)).or_insert(idx);
            name_match.entry(entry.name).or_insert(idx);
        }

        Self {
            exact_match,
            name_match,
        }
    }
}

static LOOKUP: OnceLock<StaticTableLookup> = OnceLock::new();

fn lookup() -> &'static StaticTableLookup {
    LOOKUP.get_or_init(StaticTableLookup::new)
}

/// Find exact match in static table.
#[inline]
pub fn find_exact(name: &[u8], value: &[u8]) -> Option<usize> {
    lookup().exact_match.get(&(name, value)).copied()
}

/// Find name-only match in static table.
/// Returns the index of the first entry with this name.
#[inline]
pub fn find_name(name: &[u8]) -> Option<usize> {
    lookup().name_match.get(name).copied()
}

/// Finds the best entry for a header field.
///
/// An entry matching both name and value wins. Failing that, the first entry
/// with a matching name is returned, whatever its value; callers compare the
/// value themselves to tell the two cases apart.
pub fn find_by_name_and_value(name: &[u8], value: &[u8]) -> Option<usize> {
    find_exact(name, value).or_else(|| find_name(name))
}

/// Get static table entry by index.
/// Returns None if index is out of bounds.
#[inline]
pub fn get(index: usize) -> Option<&'static StaticEntry> {
    STATIC_TABLE.get(index)
}

/// Returns the entry at `index`, failing with `DecompressionFailed` when the
/// index is outside the table (RFC 9204 Section 3.1).
pub fn lookup_name_value(index: u64) -> Result<&'static StaticEntry> {
    usize::try_from(index)
        .ok()
        .and_then(get)
        .ok_or_else(|| Error::DecompressionFailed(format!("static index {} out of range", index)))
}

/// Returns the name of the entry at `index`.
pub fn lookup_name(index: u64) -> Result<&'static [u8]> {
    lookup_name_value(index).map(|entry| entry.name)
}

/// Total number of static table entries.
#[inline]
pub fn len() -> usize {
    STATIC_TABLE.len()
}
