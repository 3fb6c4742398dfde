//!
//! `Digest` header handling
//!
//! Only SHA-256 is produced and checked. Other algorithms listed in a header are skipped.
//!

use sha2::{Digest, Sha256};

/// Algorithm token we emit
pub const ALGORITHM: &str = "sha-256";

/// Compute the `Digest` header value of the body
///
/// Format: `sha-256=<base64 of the SHA-256 hash>`
#[inline]
#[must_use]
pub fn digest(body: &[u8]) -> String {
    let hash = Sha256::digest(body);
    format!("{ALGORITHM}={}", base64_simd::STANDARD.encode_to_string(hash))
}

/// Check whether the `Digest` header value matches the body
///
/// The header may contain multiple comma-separated digests, one matching SHA-256 entry is enough.
/// The algorithm name is compared case-insensitively, the encoded hash byte-for-byte.
#[must_use]
pub fn matches(header_value: &str, body: &[u8]) -> bool {
    let mut sha256_entries = header_value
        .split(',')
        .filter_map(|entry| entry.trim().split_once('='))
        .filter(|(algorithm, _)| algorithm.trim().eq_ignore_ascii_case(ALGORITHM))
        .map(|(_, encoded)| encoded.trim())
        .peekable();

    if sha256_entries.peek().is_none() {
        return false;
    }

    let expected = base64_simd::STANDARD.encode_to_string(Sha256::digest(body));
    sha256_entries.any(|encoded| encoded == expected)
}

#[cfg(test)]
mod test {
    use super::{digest, matches};

    const TEXT: &str = r"Una sombra abajo de mi cama
Cómo se llama éste fantasma?
Es mi espejo, es mi espejo
Y me persigue hasta que hablemos";

    const EXPECTED_SHA256_HASH: &str = "vDI/NDnFX991qKsNsKB5Ne4bam8J5eLLYqo0jU8ku+I=";

    #[test]
    fn digest_sha256() {
        assert_eq!(
            digest(TEXT.as_bytes()),
            format!("sha-256={EXPECTED_SHA256_HASH}")
        );
    }

    #[test]
    fn digest_empty_body() {
        assert_eq!(
            digest(b""),
            "sha-256=47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn matches_own_digest() {
        let value = digest(TEXT.as_bytes());
        assert!(matches(&value, TEXT.as_bytes()));
    }

    #[test]
    fn matches_uppercase_algorithm() {
        let value = format!("SHA-256={EXPECTED_SHA256_HASH}");
        assert!(matches(&value, TEXT.as_bytes()));
    }

    #[test]
    fn matches_in_list() {
        let value = format!("md5=HUXZLQLMuI/KZ5KDcJPcOA==, sha-256={EXPECTED_SHA256_HASH}");
        assert!(matches(&value, TEXT.as_bytes()));
    }

    #[test]
    fn rejects_flipped_body() {
        let value = digest(TEXT.as_bytes());
        let mut body = TEXT.as_bytes().to_vec();
        body[0] ^= 1;

        assert!(!matches(&value, &body));
    }

    #[test]
    fn rejects_other_algorithms() {
        assert!(!matches("sha-512=whatever", TEXT.as_bytes()));
        assert!(!matches("", TEXT.as_bytes()));
        assert!(!matches("garbage", TEXT.as_bytes()));
    }
}
