//! Transactions: value units, spend authorization, conservation rules.
//!
//! A transaction's identity covers its inputs' prior references and its
//! outputs' amounts — nothing else. Predicates, satisfiers, and the
//! free-form `data` field stay outside the hash preimage, so two mints with
//! identical amounts are the *same* transaction no matter how the rest
//! differs.

use serde::{Deserialize, Serialize};

use crate::error::TransactionError;
use crate::hash::{Hashable, U256, sha256_words};
use crate::script::{Predicate, Value};
use crate::utxo::{OutPoint, UtxoSet};

/// A value unit guarded by a spend predicate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Output {
    /// Authorization required to spend this output.
    pub predicate: Predicate,
    /// Token amount. Zero is legal (burn outputs mint nothing).
    pub amount: u64,
}

impl Output {
    pub fn new(predicate: Predicate, amount: u64) -> Self {
        Self { predicate, amount }
    }

    /// An output anyone can spend.
    pub fn open(amount: u64) -> Self {
        Self::new(Predicate::Open, amount)
    }
}

/// A claim on a prior transaction's output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Input {
    /// Hash of the prior transaction.
    pub prior_tx: U256,
    /// 0-based index of the claimed output within that transaction.
    pub prior_index: u32,
    /// Values handed to the prior output's predicate.
    pub satisfier: Vec<Value>,
}

impl Input {
    pub fn new(prior_tx: U256, prior_index: u32, satisfier: Vec<Value>) -> Self {
        Self {
            prior_tx,
            prior_index,
            satisfier,
        }
    }

    /// The outpoint this input claims.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.prior_tx,
            index: self.prior_index,
        }
    }
}

/// An immutable transfer of value.
///
/// A transaction with no inputs is a *mint*: it creates value from nothing
/// and is only admissible as the first transaction of a block, bounded by
/// the chain's per-block cap.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    /// Free-form payload; not part of the transaction's identity.
    data: Vec<u8>,
}

impl Transaction {
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>, data: Vec<u8>) -> Self {
        Self {
            inputs,
            outputs,
            data,
        }
    }

    /// A mint: no inputs, only newly created outputs.
    pub fn mint(outputs: Vec<Output>) -> Self {
        Self::new(Vec::new(), outputs, Vec::new())
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The output at a 0-based index.
    pub fn output(&self, index: usize) -> Option<&Output> {
        self.outputs.get(index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether this transaction creates value out of nothing.
    pub fn is_mint(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Sum of output amounts, `None` on overflow.
    pub fn total_output_amount(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.amount))
    }

    /// Validate as a mint against the per-block creation cap.
    pub fn validate_mint(&self, max_mint: u64) -> Result<(), TransactionError> {
        if !self.inputs.is_empty() {
            return Err(TransactionError::NotAMint {
                inputs: self.inputs.len(),
            });
        }
        let minted = self
            .total_output_amount()
            .ok_or(TransactionError::ValueOverflow)?;
        if minted > max_mint {
            return Err(TransactionError::MintExceedsCap {
                minted,
                max: max_mint,
            });
        }
        Ok(())
    }

    /// Validate a spend against a UTXO snapshot.
    ///
    /// Every input must resolve to an entry of `utxo`, and its satisfier
    /// must authorize the spend: authorization holds iff the satisfier is
    /// empty, or the prior output's predicate evaluates to exactly `true`.
    /// A predicate error is a refusal, not a propagated failure.
    ///
    /// **Caveat**: the empty-satisfier short-circuit is a consensus rule —
    /// an empty satisfier spends *any* output, whatever its predicate
    /// guards. Consumers relying on predicates for custody must account
    /// for this.
    ///
    /// Value is conserved when inputs cover outputs; any surplus is an
    /// implicit fee.
    pub fn validate(&self, utxo: &UtxoSet) -> Result<(), TransactionError> {
        let total_out = self
            .total_output_amount()
            .ok_or(TransactionError::ValueOverflow)?;

        let mut total_in: u64 = 0;
        for (index, input) in self.inputs.iter().enumerate() {
            let outpoint = input.outpoint();
            let prior = utxo
                .get(&outpoint)
                .ok_or(TransactionError::UnknownUtxo { outpoint })?;

            if !input.satisfier.is_empty() {
                match prior.predicate.evaluate(&input.satisfier) {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(TransactionError::PredicateRejected { input: index });
                    }
                    Err(source) => {
                        return Err(TransactionError::PredicateFailed {
                            input: index,
                            source,
                        });
                    }
                }
            }

            total_in = total_in
                .checked_add(prior.amount)
                .ok_or(TransactionError::ValueOverflow)?;
        }

        if total_in < total_out {
            return Err(TransactionError::InsufficientFunds {
                have: total_in,
                need: total_out,
            });
        }
        Ok(())
    }
}

impl Hashable for Transaction {
    /// SHA-256 over each input's `(prior_tx ‖ prior_index)` then each
    /// output's `amount`, all as 32-byte big-endian words.
    fn hash(&self) -> U256 {
        let mut words = Vec::with_capacity(self.inputs.len() * 2 + self.outputs.len());
        for input in &self.inputs {
            words.push(input.prior_tx);
            words.push(U256::from(input.prior_index));
        }
        for output in &self.outputs {
            words.push(U256::from(output.amount));
        }
        sha256_words(&words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptError;

    /// Index every output of `txs` into a fresh UTXO set.
    fn utxo_from(txs: &[&Transaction]) -> UtxoSet {
        let mut utxo = UtxoSet::new();
        for tx in txs {
            utxo.absorb(tx);
        }
        utxo
    }

    fn spend(prior: &Transaction, index: u32, satisfier: Vec<Value>, outputs: Vec<Output>) -> Transaction {
        Transaction::new(
            vec![Input::new(prior.hash(), index, satisfier)],
            outputs,
            Vec::new(),
        )
    }

    // --- Identity ---

    #[test]
    fn hash_is_deterministic_and_nonzero() {
        let tx = Transaction::mint(vec![Output::open(50)]);
        assert_eq!(tx.hash(), tx.hash());
        assert_ne!(tx.hash(), U256::zero());
    }

    #[test]
    fn hash_covers_amounts_and_prior_references_only() {
        let base = Transaction::mint(vec![Output::open(50)]);

        // Different predicate, same amount: same identity.
        let alias = Transaction::mint(vec![Output::new(Predicate::Equals("alice".into()), 50)]);
        assert_eq!(base.hash(), alias.hash());

        // Different data: same identity.
        let tagged = Transaction::new(Vec::new(), vec![Output::open(50)], b"tag".to_vec());
        assert_eq!(base.hash(), tagged.hash());

        // Different amount: different identity.
        let other = Transaction::mint(vec![Output::open(51)]);
        assert_ne!(base.hash(), other.hash());
    }

    #[test]
    fn hash_covers_input_references_not_satisfiers() {
        let prior = Transaction::mint(vec![Output::open(50)]);
        let a = spend(&prior, 0, vec![], vec![Output::open(50)]);
        let b = spend(&prior, 0, vec!["alice".into()], vec![Output::open(50)]);
        assert_eq!(a.hash(), b.hash());

        let c = spend(&prior, 1, vec![], vec![Output::open(50)]);
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn empty_transaction_hash_is_sha256_of_nothing() {
        let tx = Transaction::default();
        assert_eq!(
            tx.hash().to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    // --- Accessors ---

    #[test]
    fn output_access_is_zero_based() {
        let tx = Transaction::mint(vec![Output::open(30), Output::open(20)]);
        assert_eq!(tx.output(0).unwrap().amount, 30);
        assert_eq!(tx.output(1).unwrap().amount, 20);
        assert!(tx.output(2).is_none());
    }

    // --- Mint validation ---

    #[test]
    fn mint_respects_cap() {
        let tx = Transaction::mint(vec![Output::open(30), Output::open(20)]);
        assert!(tx.validate_mint(20).is_err());
        assert!(tx.validate_mint(100).is_ok());
        assert!(tx.validate_mint(50).is_ok());
    }

    #[test]
    fn mint_with_inputs_is_rejected() {
        let prior = Transaction::mint(vec![Output::open(50)]);
        let tx = spend(&prior, 0, vec![], vec![Output::open(10)]);
        assert_eq!(
            tx.validate_mint(100),
            Err(TransactionError::NotAMint { inputs: 1 })
        );
    }

    #[test]
    fn zero_amount_mint_is_valid() {
        // Burn mints carry a zero amount and an always-false predicate.
        let never = Predicate::Expr(crate::script::Expr::Const(false.into()));
        let tx = Transaction::mint(vec![Output::new(never, 0)]);
        assert!(tx.validate_mint(0).is_ok());
    }

    #[test]
    fn mint_output_overflow_is_rejected() {
        let tx = Transaction::mint(vec![Output::open(u64::MAX), Output::open(1)]);
        assert_eq!(tx.validate_mint(u64::MAX), Err(TransactionError::ValueOverflow));
    }

    // --- Spend validation ---

    #[test]
    fn spend_resolves_prior_outputs() {
        let t0 = Transaction::mint(vec![Output::open(30), Output::open(20)]);
        let t1 = spend(&t0, 0, vec![], vec![Output::open(30)]);
        assert!(t1.validate(&utxo_from(&[&t0])).is_ok());
    }

    #[test]
    fn spend_of_unknown_utxo_fails() {
        let t0 = Transaction::mint(vec![Output::open(30)]);
        let bogus_index = spend(&t0, 1, vec![], vec![Output::open(1)]);
        assert!(matches!(
            bogus_index.validate(&utxo_from(&[&t0])),
            Err(TransactionError::UnknownUtxo { .. })
        ));

        let bogus_hash = Transaction::new(
            vec![Input::new(U256::from(1234u64), 0, vec![])],
            vec![Output::open(1)],
            Vec::new(),
        );
        assert!(matches!(
            bogus_hash.validate(&utxo_from(&[&t0])),
            Err(TransactionError::UnknownUtxo { .. })
        ));
    }

    #[test]
    fn empty_satisfier_spends_any_predicate() {
        // The short-circuit: an empty satisfier is accepted without ever
        // consulting the predicate.
        let t0 = Transaction::mint(vec![Output::new(Predicate::Sum(100), 50)]);
        let t1 = spend(&t0, 0, vec![], vec![Output::open(50)]);
        assert!(t1.validate(&utxo_from(&[&t0])).is_ok());
    }

    #[test]
    fn satisfier_must_satisfy_predicate() {
        let t0 = Transaction::mint(vec![Output::new(Predicate::Equals("alice".into()), 50)]);
        let utxo = utxo_from(&[&t0]);

        let good = spend(&t0, 0, vec!["alice".into()], vec![Output::open(50)]);
        assert!(good.validate(&utxo).is_ok());

        let wrong = spend(&t0, 0, vec![1i64.into()], vec![Output::open(50)]);
        assert_eq!(
            wrong.validate(&utxo),
            Err(TransactionError::PredicateRejected { input: 0 })
        );
    }

    #[test]
    fn predicate_error_fails_the_spend() {
        // Sum over strings is the "constraint script threw" case.
        let t0 = Transaction::mint(vec![Output::new(Predicate::Sum(100), 50)]);
        let bad = spend(&t0, 0, vec!["a".into(), "b".into()], vec![Output::open(50)]);
        assert_eq!(
            bad.validate(&utxo_from(&[&t0])),
            Err(TransactionError::PredicateFailed {
                input: 0,
                source: ScriptError::TypeMismatch { op: "sum", found: "string" },
            })
        );
    }

    #[test]
    fn outputs_must_not_exceed_inputs() {
        let t0 = Transaction::mint(vec![Output::open(5)]);
        let utxo = utxo_from(&[&t0]);

        let over = spend(&t0, 0, vec![], vec![Output::open(6)]);
        assert_eq!(
            over.validate(&utxo),
            Err(TransactionError::InsufficientFunds { have: 5, need: 6 })
        );

        let exact = spend(&t0, 0, vec![], vec![Output::open(5)]);
        assert!(exact.validate(&utxo).is_ok());

        // Surplus is the miner's fee.
        let under = spend(&t0, 0, vec![], vec![Output::open(4)]);
        assert!(under.validate(&utxo).is_ok());
    }

    #[test]
    fn multi_input_spend_accumulates_amounts() {
        let t0 = Transaction::mint(vec![Output::open(30), Output::open(20)]);
        let utxo = utxo_from(&[&t0]);

        let tx = Transaction::new(
            vec![
                Input::new(t0.hash(), 0, vec![]),
                Input::new(t0.hash(), 1, vec![]),
            ],
            vec![Output::open(49)],
            Vec::new(),
        );
        assert!(tx.validate(&utxo).is_ok());

        let greedy = Transaction::new(
            vec![
                Input::new(t0.hash(), 0, vec![]),
                Input::new(t0.hash(), 1, vec![]),
            ],
            vec![Output::open(51)],
            Vec::new(),
        );
        assert_eq!(
            greedy.validate(&utxo),
            Err(TransactionError::InsufficientFunds { have: 50, need: 51 })
        );
    }

    #[test]
    fn transaction_graph_walk() {
        // t0 mints, t1 pays alice and bob, alice pays carol, carol spends.
        let t0 = Transaction::mint(vec![Output::open(30), Output::open(20)]);
        let t1 = Transaction::new(
            vec![Input::new(t0.hash(), 0, vec![]), Input::new(t0.hash(), 1, vec![])],
            vec![
                Output::new(Predicate::Equals("alice".into()), 10),
                Output::new(Predicate::Equals("bob".into()), 20),
            ],
            Vec::new(),
        );
        let mut utxo = utxo_from(&[&t0]);
        assert!(t1.validate(&utxo).is_ok());
        utxo.absorb(&t1);

        let t2 = spend(&t1, 0, vec!["alice".into()], vec![
            Output::new(Predicate::Equals("carol".into()), 5),
        ]);
        assert!(t2.validate(&utxo).is_ok());
        utxo.absorb(&t2);

        let t3 = spend(&t2, 0, vec!["carol".into()], vec![Output::open(5)]);
        assert!(t3.validate(&utxo).is_ok());
    }

    #[test]
    fn serde_round_trip() {
        let prior = Transaction::mint(vec![Output::open(50)]);
        let tx = spend(&prior, 0, vec!["alice".into()], vec![Output::open(49)]);
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
        assert_eq!(tx.hash(), back.hash());
    }
}
