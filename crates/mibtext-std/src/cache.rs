//! Store caching with fingerprint support.
//!
//! Serializes a resolved store for fast startup. Two workflows:
//!
//! 1. **Generator → consumer**: one host resolves the module corpus and
//!    produces a cache; consumers load it without verification (no module
//!    files present).
//! 2. **Local corpus**: compute a fingerprint from the module files,
//!    verify cache validity on load, rebuild when stale.
//!
//! # File format
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header                                 │
//! │   magic: [u8; 4]        "MTXT"         │
//! │   version: u32 (LE)     schema version │
//! │   has_fingerprint: u8   0 or 1         │
//! │   fingerprint: [u8; 32] (if present)   │
//! ├────────────────────────────────────────┤
//! │ Payload (postcard-encoded StoreParts)  │
//! └────────────────────────────────────────┘
//! ```

use mibtext_core::model::{MibStore, StoreParts};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Current schema version. Bump on any breaking change to the
/// serialized model.
pub const SCHEMA_VERSION: u32 = 1;

/// Magic bytes identifying a mibtext cache file.
const MAGIC: [u8; 4] = *b"MTXT";

/// Cache read/write failures.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// File does not start with the expected magic bytes.
    #[error("invalid magic bytes (expected MTXT)")]
    InvalidMagic,
    /// Schema version mismatch.
    #[error("schema version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },
    /// Fingerprint does not match the expected value.
    #[error("fingerprint mismatch")]
    FingerprintMismatch,
    /// Header is shorter than its fixed fields.
    #[error("truncated header")]
    TruncatedHeader,
    /// Payload decoding failed.
    #[error("payload decoding failed: {0}")]
    Decode(postcard::Error),
    /// Payload encoding failed.
    #[error("payload encoding failed: {0}")]
    Encode(postcard::Error),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Compute a fingerprint over module sources.
///
/// Includes the schema version so format changes invalidate caches; files
/// are sorted by name for determinism.
pub fn compute_fingerprint<S: AsRef<str>>(files: &[(S, &[u8])]) -> [u8; 32] {
    let mut sorted: Vec<_> = files.iter().collect();
    sorted.sort_by_key(|(name, _)| name.as_ref());

    let mut hasher = Sha256::new();
    hasher.update(SCHEMA_VERSION.to_le_bytes());
    for (name, content) in sorted {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(content);
    }
    hasher.finalize().into()
}

/// Serialize a store to cache bytes.
pub fn to_cache_bytes(
    store: &MibStore,
    fingerprint: Option<[u8; 32]>,
) -> Result<Vec<u8>, CacheError> {
    let payload = postcard::to_stdvec(&store.to_parts()).map_err(CacheError::Encode)?;

    let mut out = Vec::with_capacity(payload.len() + 41);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    match fingerprint {
        Some(fp) => {
            out.push(1);
            out.extend_from_slice(&fp);
        }
        None => out.push(0),
    }
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Deserialize cache bytes, verifying the fingerprint when one is
/// expected.
pub fn from_cache_bytes(
    bytes: &[u8],
    expected: Option<[u8; 32]>,
) -> Result<MibStore, CacheError> {
    if bytes.len() < 9 {
        return Err(CacheError::TruncatedHeader);
    }
    if bytes[0..4] != MAGIC {
        return Err(CacheError::InvalidMagic);
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SCHEMA_VERSION {
        return Err(CacheError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: version,
        });
    }

    let (stored_fp, payload) = match bytes[8] {
        0 => (None, &bytes[9..]),
        _ => {
            if bytes.len() < 41 {
                return Err(CacheError::TruncatedHeader);
            }
            let mut fp = [0u8; 32];
            fp.copy_from_slice(&bytes[9..41]);
            (Some(fp), &bytes[41..])
        }
    };

    if let Some(expected) = expected {
        if stored_fp != Some(expected) {
            return Err(CacheError::FingerprintMismatch);
        }
    }

    let parts: StoreParts = postcard::from_bytes(payload).map_err(CacheError::Decode)?;
    Ok(MibStore::from_parts(parts))
}

/// Write a store cache to disk.
pub fn save_cache(
    store: &MibStore,
    path: &Path,
    fingerprint: Option<[u8; 32]>,
) -> Result<(), CacheError> {
    let bytes = to_cache_bytes(store, fingerprint)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Load a store cache without fingerprint verification.
pub fn load_cache(path: &Path) -> Result<MibStore, CacheError> {
    let bytes = fs::read(path)?;
    from_cache_bytes(&bytes, None)
}

/// Load a store cache, requiring a matching fingerprint.
pub fn load_cache_verified(path: &Path, fingerprint: [u8; 32]) -> Result<MibStore, CacheError> {
    let bytes = fs::read(path)?;
    from_cache_bytes(&bytes, Some(fingerprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mibtext_core::Loader;

    fn seed_store() -> MibStore {
        Loader::new().build()
    }

    #[test]
    fn test_round_trip() {
        let store = seed_store();
        let bytes = to_cache_bytes(&store, None).unwrap();
        let loaded = from_cache_bytes(&bytes, None).unwrap();

        assert!(loaded.modules().contains("SNMPv2-SMI"));
        assert_eq!(
            loaded.parse_oid("enterprises").unwrap(),
            vec![1, 3, 6, 1, 4, 1]
        );
        assert_eq!(
            loaded.format_oid(&[1, 3, 6, 1, 4, 1, 9]).unwrap(),
            "enterprises.9"
        );
    }

    #[test]
    fn test_round_trip_with_fingerprint() {
        let store = seed_store();
        let fp = compute_fingerprint(&[("IF-MIB", b"contents".as_slice())]);
        let bytes = to_cache_bytes(&store, Some(fp)).unwrap();

        assert!(from_cache_bytes(&bytes, Some(fp)).is_ok());

        let other = compute_fingerprint(&[("IF-MIB", b"changed".as_slice())]);
        assert!(matches!(
            from_cache_bytes(&bytes, Some(other)),
            Err(CacheError::FingerprintMismatch)
        ));
    }

    #[test]
    fn test_rejects_bad_magic() {
        assert!(matches!(
            from_cache_bytes(b"NOPE\0\0\0\0\0", None),
            Err(CacheError::InvalidMagic)
        ));
    }

    #[test]
    fn test_rejects_version_skew() {
        let store = seed_store();
        let mut bytes = to_cache_bytes(&store, None).unwrap();
        bytes[4] = 0xFF;
        assert!(matches!(
            from_cache_bytes(&bytes, None),
            Err(CacheError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_truncation() {
        assert!(matches!(
            from_cache_bytes(b"MTXT", None),
            Err(CacheError::TruncatedHeader)
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.mtxt");

        let store = seed_store();
        save_cache(&store, &path, None).unwrap();
        let loaded = load_cache(&path).unwrap();
        assert_eq!(loaded.modules().len(), store.modules().len());
    }

    #[test]
    fn test_fingerprint_is_order_independent() {
        let a = compute_fingerprint(&[("A", b"1".as_slice()), ("B", b"2".as_slice())]);
        let b = compute_fingerprint(&[("B", b"2".as_slice()), ("A", b"1".as_slice())]);
        assert_eq!(a, b);
    }
}
