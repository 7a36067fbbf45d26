//! Content digests used to decide whether a cached record is still valid

use sha2::{Digest, Sha256};

/// Compute the SHA256 hex digest of raw craft file bytes
pub fn digest(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest("ship = Foo\n"), digest("ship = Foo\n"));
        assert_eq!(digest("").len(), 64);
    }

    #[test]
    fn test_digest_changes_with_content() {
        assert_ne!(digest("ship = Foo\n"), digest("ship = Bar\n"));
    }

    #[test]
    fn test_digest_accepts_raw_bytes() {
        assert_eq!(digest(b"abc".as_slice()), digest("abc"));
        assert_ne!(digest(b"Caf\xe9".as_slice()), digest("Caf\u{fffd}"));
    }

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
