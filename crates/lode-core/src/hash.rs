//! The 256-bit hash primitive every other layer builds on.
//!
//! Consensus hashing is defined over fixed-width words: every integer that
//! enters a hash is encoded as 32 bytes big-endian, and every digest is read
//! back as an unsigned 256-bit big-endian integer. This encoding is
//! normative — it determines every transaction id, merkle root, and block
//! hash in the system.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uint::construct_uint;

construct_uint! {
    /// An unsigned 256-bit integer (4 × 64-bit words).
    ///
    /// Used for content hashes and proof-of-work targets alike, so that
    /// "mined" is the integer comparison `hash <= target`.
    #[derive(Serialize, Deserialize)]
    pub struct U256(4);
}

impl U256 {
    /// Parse from big-endian hex (with or without leading zeros).
    pub fn from_hex(s: &str) -> Result<Self, uint::FromStrRadixErr> {
        Self::from_str_radix(s, 16)
    }

    /// Lowercase big-endian hex, zero-padded to 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_big_endian())
    }
}

/// SHA-256 over the 32-byte big-endian encodings of `words`, read back as a
/// big-endian integer.
pub fn sha256_words(words: &[U256]) -> U256 {
    let mut hasher = Sha256::new();
    for word in words {
        hasher.update(word.to_big_endian());
    }
    U256::from_big_endian(&hasher.finalize())
}

/// SHA-256 over raw bytes, read back as a big-endian integer.
pub fn sha256_bytes(bytes: &[u8]) -> U256 {
    U256::from_big_endian(&Sha256::digest(bytes))
}

/// A content-addressed object: anything whose identity is a [`U256`].
///
/// Implementors appear as merkle leaves and as prior-transaction references.
pub trait Hashable {
    /// The object's content hash.
    fn hash(&self) -> U256;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_one_word_matches_known_digest() {
        // sha256 of the integer 1 as 32 big-endian bytes.
        let h = sha256_words(&[U256::one()]);
        assert_eq!(
            h.to_hex(),
            "ec4916dd28fc4c10d78e287ca5d9cc51ee1ae73cbfde08c6b37324cbfaac8bc5"
        );
    }

    #[test]
    fn word_hash_matches_byte_hash_of_encoding() {
        let word = U256::from(0xDEAD_BEEFu64);
        assert_eq!(sha256_words(&[word]), sha256_bytes(&word.to_big_endian()));
    }

    #[test]
    fn word_order_matters() {
        let a = U256::from(1u64);
        let b = U256::from(2u64);
        assert_ne!(sha256_words(&[a, b]), sha256_words(&[b, a]));
    }

    #[test]
    fn empty_input_is_sha256_of_nothing() {
        assert_eq!(
            sha256_words(&[]).to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hex_round_trip() {
        let v = U256::from_hex("4fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
            .unwrap();
        assert_eq!(
            v.to_hex(),
            "4fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn hex_accepts_short_strings() {
        assert_eq!(U256::from_hex("ff").unwrap(), U256::from(255u64));
    }

    #[test]
    fn big_endian_encoding_pads_left() {
        let bytes = U256::from(0x0102u64).to_big_endian();
        assert_eq!(bytes[30..], [0x01, 0x02]);
        assert!(bytes[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn serde_round_trip() {
        let v = U256::from_hex("ec4916dd28fc4c10d78e287ca5d9cc51ee1ae73cbfde08c6b37324cbfaac8bc5")
            .unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: U256 = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
