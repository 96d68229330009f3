//! SHA-256 merkle commitment over an ordered sequence of hashable items.
//!
//! Levels with an odd number of entries are padded with the integer 0
//! (32 zero bytes), not with a duplicate of the last element. The scheme
//! intentionally differs from Bitcoin's; the padding rule changes every root
//! above the first odd level and must not be "fixed". An empty sequence
//! commits to 0.

use crate::hash::{Hashable, U256, sha256_words};

/// Compute the merkle root of `items`.
///
/// Zero for an empty sequence; a single item's root is its own hash.
pub fn merkle_root<T: Hashable>(items: &[T]) -> U256 {
    if items.is_empty() {
        return U256::zero();
    }
    let mut level: Vec<U256> = items.iter().map(Hashable::hash).collect();
    while level.len() > 1 {
        if level.len() % 2 != 0 {
            level.push(U256::zero());
        }
        level = level.chunks(2).map(sha256_words).collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Wraps an integer so its merkle leaf hash is sha256 of the 32-byte
    /// big-endian value, matching the reference fixtures.
    struct Leaf(u64);

    impl Hashable for Leaf {
        fn hash(&self) -> U256 {
            sha256_words(&[U256::from(self.0)])
        }
    }

    fn root_of(values: &[u64]) -> String {
        let leaves: Vec<Leaf> = values.iter().copied().map(Leaf).collect();
        merkle_root(&leaves).to_hex()
    }

    // --- Reference fixtures ---

    #[test]
    fn root_of_empty_is_zero() {
        assert_eq!(
            root_of(&[]),
            "0000000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(merkle_root(&Vec::<Leaf>::new()), U256::zero());
    }

    #[test]
    fn root_of_single_item() {
        assert_eq!(
            root_of(&[1]),
            "ec4916dd28fc4c10d78e287ca5d9cc51ee1ae73cbfde08c6b37324cbfaac8bc5"
        );
        assert_eq!(
            root_of(&[2]),
            "9267d3dbed802941483f1afa2a6bc68de5f653128aca9bf1461c5d0a3ad36ed2"
        );
    }

    #[test]
    fn root_of_pair() {
        assert_eq!(
            root_of(&[1, 2]),
            "56af8f5d76765ecd266c7bbc471280f0b5962cab703465e0d9d06932fa47b782"
        );
    }

    #[test]
    fn root_of_three_pads_with_zero() {
        assert_eq!(
            root_of(&[1, 2, 3]),
            "ea670d796aa1f950025c4d9e7caf6b92a5c56ebeb37b95b072ca92bc99011c20"
        );
    }

    #[test]
    fn root_of_four_is_balanced() {
        assert_eq!(
            root_of(&[1, 2, 3, 4]),
            "ac82b024e679779e3372fbb95447bb318afa87e1e53783fdfdd9de61257638ff"
        );
    }

    // --- Structure ---

    #[test]
    fn single_item_root_is_its_hash() {
        assert_eq!(merkle_root(&[Leaf(7)]), Leaf(7).hash());
        assert_ne!(merkle_root(&[Leaf(7)]), U256::zero());
    }

    #[test]
    fn odd_level_uses_zero_sentinel_not_duplication() {
        // With duplication, [x] and [x, x] would collide one level up in
        // some arrangements; here [a, b, c] must pair c with 0, not c.
        let (a, b, c) = (Leaf(1).hash(), Leaf(2).hash(), Leaf(3).hash());
        let expected = sha256_words(&[
            sha256_words(&[a, b]),
            sha256_words(&[c, U256::zero()]),
        ]);
        assert_eq!(merkle_root(&[Leaf(1), Leaf(2), Leaf(3)]), expected);
    }

    #[test]
    fn order_matters() {
        assert_ne!(root_of(&[1, 2]), root_of(&[2, 1]));
    }

    #[test]
    fn changing_one_leaf_changes_root() {
        assert_ne!(root_of(&[1, 2, 3]), root_of(&[1, 2, 4]));
    }

    proptest! {
        #[test]
        fn root_is_deterministic(values in prop::collection::vec(any::<u64>(), 0..32)) {
            prop_assert_eq!(root_of(&values), root_of(&values));
        }

        #[test]
        fn appending_a_leaf_changes_root(values in prop::collection::vec(any::<u64>(), 1..16), extra: u64) {
            let mut longer = values.clone();
            longer.push(extra);
            prop_assert_ne!(root_of(&values), root_of(&longer));
        }
    }
}
