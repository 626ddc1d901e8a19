use crate::{Coin, PublicKey, Transaction, TransactionId, Utxo, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;

/// Rules where more than one policy is reasonable.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ValidationPolicy {
    /// Whether an output may carry an amount of exactly zero.
    /// Negative amounts are rejected regardless.
    pub allow_zero_value_outputs: bool,
}

impl ValidationPolicy {
    /// Rejects zero-value outputs in addition to negative ones.
    pub fn strict() -> Self {
        Self {
            allow_zero_value_outputs: false,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allow_zero_value_outputs: true,
        }
    }
}

/// The reason a transaction is not valid against a pool.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Rejection {
    #[error("Transaction is not finalized, it has no id")]
    NotFinalized,
    #[error("Transaction id {stated} does not match its content, which hashes to {computed}")]
    IdMismatch {
        stated: TransactionId,
        computed: TransactionId,
    },
    #[error("Failed to encode the transaction: {message}")]
    TransactionEncoding { message: String },
    #[error("Input {input_index} claims {utxo}, which is not in the pool")]
    MissingUtxo { input_index: usize, utxo: Utxo },
    #[error("Input {input_index} claims {utxo}, which an earlier input already claims")]
    DuplicateClaim { input_index: usize, utxo: Utxo },
    #[error("Input {input_index} is not signed")]
    MissingSignature { input_index: usize },
    #[error("Input {input_index} is not signed by the owner of {utxo}")]
    InvalidSignature { input_index: usize, utxo: Utxo },
    #[error("Failed to encode the signing payload of input {input_index}: {message}")]
    Encoding { input_index: usize, message: String },
    #[error("Output {output_index} has a negative amount: {amount}")]
    NegativeOutput { output_index: usize, amount: Coin },
    #[error("Output {output_index} has a zero amount")]
    ZeroOutput { output_index: usize },
    #[error("Outputs total {outputs}, which exceeds the claimed inputs total {inputs}")]
    InsufficientInputs { inputs: Coin, outputs: Coin },
    #[error("Transaction has {outputs} outputs, more than an output index can address")]
    TooManyOutputs { outputs: usize },
    #[error("Amounts overflow")]
    Overflow,
}

/// What a valid transaction moves.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ValidationSummary {
    pub transaction_id: TransactionId,
    pub input_total: Coin,
    pub output_total: Coin,
}

impl ValidationSummary {
    /// The part of the inputs that no output receives.
    pub fn fee(&self) -> Coin {
        // Validation guarantees 0 <= output_total <= input_total, so this cannot overflow.
        Coin::new(self.input_total.value() - self.output_total.value())
    }
}

/// The state a transaction is validated against.
pub struct UtxoContext<'a> {
    pool: &'a UtxoPool,
    policy: ValidationPolicy,
}

impl<'a> UtxoContext<'a> {
    pub fn new(pool: &'a UtxoPool, policy: ValidationPolicy) -> Self {
        Self { pool, policy }
    }
}

// Responsible for deciding whether a single transaction may be applied to a pool.
// A transaction is valid iff:
//   - its id is the hash of its content,
//   - every output it claims is in the pool, and no output is claimed twice,
//   - every input is signed by the owner of the output it claims,
//   - none of its outputs is negative,
//   - its outputs do not exceed the outputs it claims.
pub struct TransactionRules {}

impl TransactionRules {
    pub fn validate(
        transaction: &Transaction,
        context: &UtxoContext,
    ) -> Result<ValidationSummary, Rejection> {
        let transaction_id = Self::validate_is_finalized(transaction)?;
        let input_total = Self::validate_claims(transaction, context.pool)?;
        Self::validate_output_count(transaction)?;
        let output_total = Self::validate_outputs_are_non_negative(transaction, &context.policy)?;
        Self::validate_inputs_cover_outputs(input_total, output_total)?;
        Ok(ValidationSummary {
            transaction_id,
            input_total,
            output_total,
        })
    }

    // The stored id keys the created outputs, so it must be the hash of the content.
    fn validate_is_finalized(transaction: &Transaction) -> Result<TransactionId, Rejection> {
        let stated = transaction.id().copied().ok_or(Rejection::NotFinalized)?;
        let computed =
            transaction
                .compute_id()
                .map_err(|e| Rejection::TransactionEncoding {
                    message: e.to_string(),
                })?;
        if stated != computed {
            return Err(Rejection::IdMismatch { stated, computed });
        }
        Ok(stated)
    }

    // Returns the total amount of the claimed outputs.
    fn validate_claims(transaction: &Transaction, pool: &UtxoPool) -> Result<Coin, Rejection> {
        let mut claimed = HashSet::with_capacity(transaction.inputs().len());
        let mut input_total = Coin::zero();
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            let utxo = input.utxo();
            let output = pool
                .get(&utxo)
                .ok_or(Rejection::MissingUtxo { input_index, utxo })?;
            if !claimed.insert(utxo) {
                return Err(Rejection::DuplicateClaim { input_index, utxo });
            }
            Self::validate_claim_is_signed_by_owner(transaction, input_index, output.owner())?;
            input_total = input_total
                .checked_add(output.amount())
                .ok_or(Rejection::Overflow)?;
        }
        Ok(input_total)
    }

    fn validate_claim_is_signed_by_owner(
        transaction: &Transaction,
        input_index: usize,
        owner: &PublicKey,
    ) -> Result<(), Rejection> {
        let input = &transaction.inputs()[input_index];
        let signature = input
            .signature()
            .ok_or(Rejection::MissingSignature { input_index })?;
        let payload =
            transaction
                .raw_data_to_sign(input_index)
                .map_err(|e| Rejection::Encoding {
                    input_index,
                    message: e.to_string(),
                })?;
        if owner.verify(&payload, signature) {
            Ok(())
        } else {
            Err(Rejection::InvalidSignature {
                input_index,
                utxo: input.utxo(),
            })
        }
    }

    fn validate_output_count(transaction: &Transaction) -> Result<(), Rejection> {
        let outputs = transaction.outputs().len();
        if outputs as u64 <= u64::from(u32::MAX) + 1 {
            Ok(())
        } else {
            Err(Rejection::TooManyOutputs { outputs })
        }
    }

    // Returns the total amount of the outputs.
    fn validate_outputs_are_non_negative(
        transaction: &Transaction,
        policy: &ValidationPolicy,
    ) -> Result<Coin, Rejection> {
        let mut output_total = Coin::zero();
        for (output_index, output) in transaction.outputs().iter().enumerate() {
            let amount = output.amount();
            if amount.is_negative() {
                return Err(Rejection::NegativeOutput {
                    output_index,
                    amount,
                });
            }
            if amount.is_zero() && !policy.allow_zero_value_outputs {
                return Err(Rejection::ZeroOutput { output_index });
            }
            output_total = output_total
                .checked_add(amount)
                .ok_or(Rejection::Overflow)?;
        }
        Ok(output_total)
    }

    fn validate_inputs_cover_outputs(inputs: Coin, outputs: Coin) -> Result<(), Rejection> {
        if inputs >= outputs {
            Ok(())
        } else {
            Err(Rejection::InsufficientInputs { inputs, outputs })
        }
    }
}

/// Validates `transaction` against `pool` with the given policy, without changing the pool.
pub fn validate(
    transaction: &Transaction,
    pool: &UtxoPool,
    policy: ValidationPolicy,
) -> Result<ValidationSummary, Rejection> {
    TransactionRules::validate(transaction, &UtxoContext::new(pool, policy))
}

/// Returns true iff `transaction` can be applied to `pool` under the default policy.
pub fn is_valid(transaction: &Transaction, pool: &UtxoPool) -> bool {
    validate(transaction, pool, ValidationPolicy::default()).is_ok()
}
