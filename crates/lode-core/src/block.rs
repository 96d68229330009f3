//! Blocks: a proof-of-work header over an ordered transaction list.
//!
//! Block identity is the SHA-256 of the five header integers
//! (version ‖ parent ‖ target ‖ timestamp ‖ nonce, each 32 bytes
//! big-endian). The merkle root commits to the contents and is computed on
//! demand; it does not enter the header hash — a consensus rule, not an
//! oversight to correct.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::BlockError;
use crate::hash::{Hashable, U256, sha256_words};
use crate::merkle;
use crate::transaction::Transaction;
use crate::utxo::UtxoSet;

/// A block: header fields plus ordered transaction contents.
///
/// Fields are public: a block under construction is freely mutated, then
/// sealed by [`mine`](Block::mine) and submitted to
/// [`Blockchain::extend`](crate::chain::Blockchain::extend), after which
/// the chain owns it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Protocol version.
    pub version: u64,
    /// Header hash of the parent block; zero only for a genesis.
    pub parent_hash: U256,
    /// Proof-of-work target: the block is mined once `hash <= target`.
    pub target: U256,
    /// Opaque timestamp; the engine applies no time policy.
    pub timestamp: u64,
    /// Proof-of-work nonce.
    pub nonce: u64,
    /// Ordered transactions. May be empty; an empty block is always valid.
    pub contents: Vec<Transaction>,
}

impl Block {
    /// A block extending `parent_hash` with the given contents.
    pub fn child_of(parent_hash: U256, contents: Vec<Transaction>) -> Self {
        Self {
            parent_hash,
            contents,
            ..Self::default()
        }
    }

    /// Merkle commitment over the contents (zero for an empty block).
    pub fn merkle_root(&self) -> U256 {
        merkle::merkle_root(&self.contents)
    }

    /// Search for a nonce bringing the header hash under `target`.
    ///
    /// Each step adds a uniformly random nonzero 64-bit value to the nonce
    /// (wrapping). Termination is probabilistic: callers bound the expected
    /// work by choosing a reachable target. There is no cancellation.
    pub fn mine(&mut self, target: U256) {
        self.mine_with(target, &mut rand::thread_rng());
    }

    /// [`mine`](Block::mine) with a caller-supplied RNG, for deterministic
    /// tests and benches.
    pub fn mine_with<R: Rng>(&mut self, target: U256, rng: &mut R) {
        self.target = target;
        let mut steps = 0u64;
        while self.hash() > self.target {
            self.nonce = self.nonce.wrapping_add(rng.gen_range(1..=u64::MAX));
            steps += 1;
        }
        trace!(steps, nonce = self.nonce, "mined block");
    }

    /// Validate contents against a UTXO snapshot and the per-block mint cap.
    ///
    /// An empty block is valid. Otherwise the first transaction must be a
    /// mint within `max_mint`, and every later transaction must be a
    /// non-mint that passes spend validation. Every spend is checked
    /// against the same snapshot: outputs created by sibling transactions
    /// in this block are not visible, so intra-block chains of spends are
    /// not admissible.
    pub fn validate(&self, utxo: &UtxoSet, max_mint: u64) -> Result<(), BlockError> {
        let Some((first, rest)) = self.contents.split_first() else {
            return Ok(());
        };
        first
            .validate_mint(max_mint)
            .map_err(|source| BlockError::FirstTxNotMint { source })?;
        for (offset, tx) in rest.iter().enumerate() {
            let index = offset + 1;
            if tx.is_mint() {
                return Err(BlockError::SecondaryMint { index });
            }
            tx.validate(utxo)
                .map_err(|source| BlockError::Transaction { index, source })?;
        }
        Ok(())
    }
}

impl Hashable for Block {
    /// Header hash: version ‖ parent ‖ target ‖ timestamp ‖ nonce.
    fn hash(&self) -> U256 {
        sha256_words(&[
            U256::from(self.version),
            self.parent_hash,
            self.target,
            U256::from(self.timestamp),
            U256::from(self.nonce),
        ])
    }
}
