//! Shared builders for the E2E and adversarial suites.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lode_core::error::ChainError;
use lode_core::hash::Hashable;
use lode_core::{Block, Blockchain, Input, Output, Transaction, U256, Value};

/// The genesis difficulty used across the suites: `0x4FF…F`.
pub fn genesis_target() -> U256 {
    U256::from_hex("4fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
        .unwrap()
}

/// The standard working target, four times harder than the genesis:
/// `0x1FF…F`.
pub fn standard_target() -> U256 {
    U256::from_hex("1fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
        .unwrap()
}

/// A fresh chain with the standard genesis target and a 50-coin mint cap.
pub fn chain() -> Blockchain {
    Blockchain::new(genesis_target(), 50)
}

/// Deterministic RNG so mining nonces are reproducible across runs.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(500)
}

/// An anyone-can-spend mint of the given amounts.
pub fn mint(amounts: &[u64]) -> Transaction {
    Transaction::mint(amounts.iter().copied().map(Output::open).collect())
}

/// A single-input transaction spending `prior`'s output at `index`.
pub fn spend(
    prior: &Transaction,
    index: u32,
    satisfier: Vec<Value>,
    outputs: Vec<Output>,
) -> Transaction {
    Transaction::new(
        vec![Input::new(prior.hash(), index, satisfier)],
        outputs,
        Vec::new(),
    )
}

/// Mine a block carrying `txs` onto `parent` and submit it.
///
/// The nonce is randomized before mining so that sibling blocks with
/// identical contents still get distinct headers; the shared RNG keeps the
/// whole suite deterministic.
pub fn grow(
    chain: &mut Blockchain,
    parent: U256,
    target: U256,
    txs: Vec<Transaction>,
    rng: &mut StdRng,
) -> Result<U256, ChainError> {
    let mut block = Block::child_of(parent, txs);
    block.nonce = rng.gen_range(0..=u64::MAX);
    block.mine_with(target, rng);
    chain.extend(block)
}
