//! Error types for the lode engine.
//!
//! One enum per domain, aggregated by [`LodeError`]. Rejections carry enough
//! context to diagnose which consensus rule fired; none of them implies any
//! mutation happened (a failed operation leaves state untouched).
use thiserror::Error;

use crate::hash::U256;
use crate::utxo::OutPoint;

/// Predicate evaluation failures — the typed stand-in for a constraint
/// script throwing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("missing satisfier argument {index} (have {len})")] MissingArgument { index: usize, len: usize },
    #[error("{op}: unsupported operand type {found}")] TypeMismatch { op: &'static str, found: &'static str },
    #[error("integer overflow")] Overflow,
    #[error("predicate produced {found}, not a boolean")] NotABoolean { found: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("not a mint: {inputs} input(s) present")] NotAMint { inputs: usize },
    #[error("mint of {minted} exceeds per-block cap {max}")] MintExceedsCap { minted: u64, max: u64 },
    #[error("unknown UTXO: {outpoint}")] UnknownUtxo { outpoint: OutPoint },
    #[error("input {input}: predicate rejected the satisfier")] PredicateRejected { input: usize },
    #[error("input {input}: {source}")] PredicateFailed { input: usize, source: ScriptError },
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: u64, need: u64 },
    #[error("value overflow")] ValueOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("first transaction is not a valid mint: {source}")] FirstTxNotMint { source: TransactionError },
    #[error("transaction {index} is a secondary mint")] SecondaryMint { index: usize },
    #[error("transaction {index}: {source}")] Transaction { index: usize, source: TransactionError },
    #[error("zero proof-of-work target")] ZeroTarget,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown parent block {0:#x}")] UnknownParent(U256),
    #[error("duplicate block {0:#x}")] DuplicateBlock(U256),
    #[error(transparent)] InvalidBlock(#[from] BlockError),
}

#[derive(Error, Debug)]
pub enum LodeError {
    #[error(transparent)] Script(#[from] ScriptError),
    #[error(transparent)] Transaction(#[from] TransactionError),
    #[error(transparent)] Block(#[from] BlockError),
    #[error(transparent)] Chain(#[from] ChainError),
}
