//! Content hashing for blocks and code samples.

use sha2::{Digest, Sha256};

/// Normalize text before hashing: CRLF and lone CR become LF.
///
/// Trailing whitespace and indentation are significant and left alone,
/// so two samples only share a hash when their text really is the same.
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Stable SHA-256 hex digest of the normalized text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_same_hash() {
        assert_eq!(content_hash("print(1)\n"), content_hash("print(1)\n"));
    }

    #[test]
    fn line_endings_do_not_matter() {
        assert_eq!(content_hash("a\r\nb"), content_hash("a\nb"));
    }

    #[test]
    fn whitespace_is_significant() {
        assert_ne!(content_hash("  a"), content_hash("a"));
    }

    #[test]
    fn hex_sha256_length() {
        assert_eq!(content_hash("").len(), 64);
    }
}
