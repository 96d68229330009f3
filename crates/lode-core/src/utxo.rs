//! The unspent-output view that spends are validated against.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::{Hashable, U256};
use crate::transaction::{Output, Transaction};

/// Reference to one output of a prior transaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Hash of the transaction holding the referenced output.
    pub txid: U256,
    /// 0-based index of the output within that transaction.
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:064x}:{}", self.txid, self.index)
    }
}

/// A snapshot of unspent transaction outputs: `(txid, index) → Output`.
///
/// Snapshots are derived from a block's ancestry
/// ([`Blockchain::utxo_as_of`](crate::chain::Blockchain::utxo_as_of)) or
/// assembled by hand in tests; they never persist across chain operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtxoSet {
    entries: HashMap<OutPoint, Output>,
}

impl UtxoSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the output an outpoint refers to.
    pub fn get(&self, outpoint: &OutPoint) -> Option<&Output> {
        self.entries.get(outpoint)
    }

    /// Whether the outpoint is present.
    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.entries.contains_key(outpoint)
    }

    /// Insert a single entry, replacing any previous one.
    pub fn insert(&mut self, outpoint: OutPoint, output: Output) {
        self.entries.insert(outpoint, output);
    }

    /// Add every output of `tx`, keyed by its hash and output position.
    ///
    /// A transaction with the same identity hash overwrites its earlier
    /// entries; the amounts at each position are identical by construction,
    /// so the overwrite is invisible.
    pub fn absorb(&mut self, tx: &Transaction) {
        let txid = tx.hash();
        for (index, output) in tx.outputs().iter().enumerate() {
            self.insert(
                OutPoint {
                    txid,
                    index: index as u32,
                },
                output.clone(),
            );
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(OutPoint, Output)> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = (OutPoint, Output)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
