//! The block DAG: fork tracking, UTXO reconstruction, and heaviest-work
//! tip selection.
//!
//! Every admitted block lives in a hash-indexed node map for the life of
//! the process; there is no pruning. Competing forks coexist, and the tip
//! is the block with the strictly greatest cumulative work — ties keep the
//! first-admitted incumbent. A candidate with transaction contents is
//! validated against a UTXO set reconstructed from its *parent's* ancestry,
//! so each fork is judged against its own history, never the tip's.
//!
//! The chain is single-owner and synchronous: every mutation flows through
//! [`Blockchain::extend`] on `&mut self`. Wrap it in a mutex to share;
//! reads need only a consistent view.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::block::Block;
use crate::error::{BlockError, ChainError};
use crate::hash::{Hashable, U256};
use crate::utxo::UtxoSet;
use crate::work::Work;

/// Per-block bookkeeping derived at admission time.
#[derive(Clone, Debug)]
struct Node {
    block: Block,
    height: u64,
    cumulative_work: Work,
    children: Vec<U256>,
}

/// Point-in-time summary of the DAG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainStats {
    /// Total admitted blocks, genesis included.
    pub blocks: usize,
    /// Header hash of the current tip.
    pub tip_hash: U256,
    /// Height of the current tip.
    pub tip_height: u64,
    /// Cumulative work of the current tip.
    pub best_work: Work,
}

/// An in-memory blockchain: genesis, forks, and the heaviest-work tip.
#[derive(Debug)]
pub struct Blockchain {
    genesis_target: U256,
    max_mint_per_block: u64,
    nodes: HashMap<U256, Node>,
    genesis_hash: U256,
    tip_hash: U256,
    best_work: Work,
}

impl Blockchain {
    /// Create a chain with a freshly installed genesis block.
    ///
    /// The genesis block has height 0, empty contents, the given target,
    /// and a fixed cumulative work of one unit; all other work values are
    /// relative to it. It is never mined: its hash need not meet its
    /// target.
    ///
    /// # Panics
    ///
    /// Panics on a zero `genesis_target` (work would be undefined).
    pub fn new(genesis_target: U256, max_mint_per_block: u64) -> Self {
        assert!(
            !genesis_target.is_zero(),
            "genesis target must be nonzero"
        );
        let genesis = Block {
            target: genesis_target,
            ..Block::default()
        };
        let genesis_hash = genesis.hash();
        let mut nodes = HashMap::new();
        nodes.insert(
            genesis_hash,
            Node {
                block: genesis,
                height: 0,
                cumulative_work: Work::unit(),
                children: Vec::new(),
            },
        );
        debug!(genesis = %genesis_hash.to_hex(), "chain initialized");
        Self {
            genesis_target,
            max_mint_per_block,
            nodes,
            genesis_hash,
            tip_hash: genesis_hash,
            best_work: Work::unit(),
        }
    }

    /// The heaviest-work block.
    pub fn tip(&self) -> &Block {
        &self.nodes[&self.tip_hash].block
    }

    /// Header hash of the heaviest-work block.
    pub fn tip_hash(&self) -> U256 {
        self.tip_hash
    }

    /// Header hash of the genesis block.
    pub fn genesis_hash(&self) -> U256 {
        self.genesis_hash
    }

    /// The per-block mint cap this chain enforces.
    pub fn max_mint_per_block(&self) -> u64 {
        self.max_mint_per_block
    }

    /// The work a block mined at `target` contributes:
    /// `genesis_target / target`.
    ///
    /// # Panics
    ///
    /// Panics on a zero `target` (such blocks never get past
    /// [`extend`](Blockchain::extend)).
    pub fn work(&self, target: U256) -> Work {
        Work::ratio(self.genesis_target, target)
    }

    /// Cumulative work of an admitted block, or `None` for an unknown hash.
    pub fn cumulative_work(&self, hash: &U256) -> Option<&Work> {
        self.nodes.get(hash).map(|node| &node.cumulative_work)
    }

    /// Height of an admitted block, or `None` for an unknown hash.
    pub fn height_of(&self, hash: &U256) -> Option<u64> {
        self.nodes.get(hash).map(|node| node.height)
    }

    /// Look up an admitted block by header hash.
    pub fn block(&self, hash: &U256) -> Option<&Block> {
        self.nodes.get(hash).map(|node| &node.block)
    }

    /// Hashes of the admitted children of a block.
    pub fn children_of(&self, hash: &U256) -> Option<&[U256]> {
        self.nodes.get(hash).map(|node| node.children.as_slice())
    }

    /// All admitted blocks at `height`, across every fork, in no
    /// particular order.
    pub fn blocks_at_height(&self, height: u64) -> Vec<&Block> {
        self.nodes
            .values()
            .filter(|node| node.height == height)
            .map(|node| &node.block)
            .collect()
    }

    /// Number of admitted blocks, genesis included.
    pub fn block_count(&self) -> usize {
        self.nodes.len()
    }

    /// Point-in-time summary of the DAG.
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            blocks: self.nodes.len(),
            tip_hash: self.tip_hash,
            tip_height: self.nodes[&self.tip_hash].height,
            best_work: self.best_work.clone(),
        }
    }

    /// Reconstruct the UTXO set as of `hash` (inclusive).
    ///
    /// Walks the ancestry from the genesis-child down to `hash`, inserting
    /// every output of every transaction in declaration order. Spent
    /// outputs are **not** removed — reconstruction is insert-only by
    /// consensus rule, so a re-spend of a consumed output is caught only by
    /// its predicate, never by absence from this set.
    ///
    /// Returns `None` for an unknown hash.
    pub fn utxo_as_of(&self, hash: &U256) -> Option<UtxoSet> {
        if !self.nodes.contains_key(hash) {
            return None;
        }
        Some(self.utxo_over_ancestry(*hash))
    }

    /// UTXO set over the ancestry of `hash`, which must be admitted.
    fn utxo_over_ancestry(&self, hash: U256) -> UtxoSet {
        let mut lineage = Vec::new();
        let mut cursor = hash;
        while cursor != self.genesis_hash {
            let node = &self.nodes[&cursor];
            lineage.push(&node.block);
            cursor = node.block.parent_hash;
        }

        let mut utxo = UtxoSet::new();
        for block in lineage.into_iter().rev() {
            for tx in &block.contents {
                utxo.absorb(tx);
            }
        }
        utxo
    }

    /// Admit a block into the DAG.
    ///
    /// The parent must already be admitted; a block with transaction
    /// contents is validated against the UTXO set as of that parent. On
    /// success the block is attached (height, cumulative work, parent's
    /// child list) and becomes the tip iff its cumulative work strictly
    /// exceeds the incumbent's — an equal-work rival never displaces it.
    ///
    /// Returns the admitted block's header hash. Rejection leaves the
    /// chain exactly as it was; re-submitting an already admitted block is
    /// rejected as a duplicate without touching state.
    pub fn extend(&mut self, block: Block) -> Result<U256, ChainError> {
        let hash = block.hash();

        let Some(parent) = self.nodes.get(&block.parent_hash) else {
            debug!(block = %hash.to_hex(), "rejected: unknown parent");
            return Err(ChainError::UnknownParent(block.parent_hash));
        };
        let (parent_height, parent_work) = (parent.height, parent.cumulative_work.clone());

        if self.nodes.contains_key(&hash) {
            debug!(block = %hash.to_hex(), "rejected: duplicate");
            return Err(ChainError::DuplicateBlock(hash));
        }
        if block.target.is_zero() {
            debug!(block = %hash.to_hex(), "rejected: zero target");
            return Err(BlockError::ZeroTarget.into());
        }

        if !block.contents.is_empty() {
            let utxo = self.utxo_over_ancestry(block.parent_hash);
            if let Err(source) = block.validate(&utxo, self.max_mint_per_block) {
                debug!(block = %hash.to_hex(), reason = %source, "rejected: invalid contents");
                return Err(source.into());
            }
        }

        // All rejections are behind us; mutations start here.
        let height = parent_height + 1;
        let cumulative_work = parent_work + self.work(block.target);
        let parent_hash = block.parent_hash;
        self.nodes.insert(
            hash,
            Node {
                block,
                height,
                cumulative_work: cumulative_work.clone(),
                children: Vec::new(),
            },
        );
        self.nodes
            .get_mut(&parent_hash)
            .expect("parent admitted above")
            .children
            .push(hash);
        debug!(block = %hash.to_hex(), height, "block admitted");

        if cumulative_work > self.best_work {
            self.tip_hash = hash;
            self.best_work = cumulative_work;
            info!(tip = %hash.to_hex(), height, "tip advanced");
        }
        Ok(hash)
    }
}
