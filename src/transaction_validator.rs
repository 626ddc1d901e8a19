use crate::validation::{self, Rejection, ValidationPolicy, ValidationSummary};
use crate::{OutputIndex, Transaction, TransactionId, Utxo, UtxoPool};
use tracing::{debug, info};

/// A candidate that was dropped from a batch, and why.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RejectedTransaction {
    /// Position of the transaction in the submitted batch.
    pub position: usize,
    pub transaction_id: Option<TransactionId>,
    pub reason: Rejection,
}

/// The result of handling one batch.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BatchOutcome {
    /// Accepted transactions, in the order they were submitted.
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<RejectedTransaction>,
}

/// Owns the ledger's pool of unspent outputs and moves it forward one batch at a time.
///
/// The validator works on its own copy of the pool it was created from; the caller's pool
/// is never modified.
pub struct TransactionValidator {
    pool: UtxoPool,
    policy: ValidationPolicy,
}

impl TransactionValidator {
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_policy(pool, ValidationPolicy::default())
    }

    pub fn with_policy(pool: &UtxoPool, policy: ValidationPolicy) -> Self {
        Self {
            pool: pool.clone(),
            policy,
        }
    }

    /// The current pool, reflecting every batch handled so far.
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn is_valid(&self, transaction: &Transaction) -> bool {
        self.validate(transaction).is_ok()
    }

    pub fn validate(&self, transaction: &Transaction) -> Result<ValidationSummary, Rejection> {
        validation::validate(transaction, &self.pool, self.policy)
    }

    /// Handles a batch of candidate transactions and returns the ones that were accepted.
    /// See `handle_transactions_with_report`.
    pub fn handle_transactions(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.handle_transactions_with_report(candidates).accepted
    }

    /// Handles a batch of candidate transactions in the given order.
    ///
    /// Each candidate is validated against the pool as left by the candidates before it. A
    /// valid candidate is applied right away: the outputs it claims leave the pool and the
    /// outputs it creates enter it. An invalid candidate is dropped and leaves the pool as
    /// it was.
    ///
    /// Since candidates can conflict, the accepted set depends on the order. A transaction
    /// spending the output of another one in the same batch is only accepted when it comes
    /// after it, and of two transactions claiming the same output the earlier one wins.
    pub fn handle_transactions_with_report(&mut self, candidates: &[Transaction]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (position, transaction) in candidates.iter().enumerate() {
            match self.validate(transaction) {
                Ok(summary) => {
                    self.apply(transaction, &summary);
                    outcome.accepted.push(transaction.clone());
                }
                Err(reason) => {
                    debug!(
                        "Rejected transaction at position {} ({}): {}",
                        position,
                        transaction
                            .id()
                            .map_or_else(|| "no id".to_string(), TransactionId::to_string),
                        reason
                    );
                    outcome.rejected.push(RejectedTransaction {
                        position,
                        transaction_id: transaction.id().copied(),
                        reason,
                    });
                }
            }
        }
        info!(
            "Handled batch of {} transactions: {} accepted, {} rejected, {} unspent outputs",
            candidates.len(),
            outcome.accepted.len(),
            outcome.rejected.len(),
            self.pool.len()
        );
        outcome
    }

    // Moves the pool past an already validated transaction.
    fn apply(&mut self, transaction: &Transaction, summary: &ValidationSummary) {
        for input in transaction.inputs() {
            self.pool.remove(&input.utxo());
        }
        for (index, output) in transaction.outputs().iter().enumerate() {
            // Validation bounds the output count to what fits in an output index.
            let utxo = Utxo::new(summary.transaction_id, OutputIndex::new(index as u32));
            self.pool.add(utxo, output.clone());
        }
        debug!(
            "Applied transaction {}: {} claimed, {} created, fee {}",
            summary.transaction_id,
            transaction.inputs().len(),
            transaction.outputs().len(),
            summary.fee()
        );
    }
}
