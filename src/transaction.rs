use crate::{Coin, PublicKey, Sha256, Signature, Utxo};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub const fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Input index {index} is out of range for a transaction with {inputs} inputs")]
    InputIndexOutOfRange { index: usize, inputs: usize },
    #[error("Too many entries to index with 32 bits: {0}")]
    TooManyEntries(usize),
    #[error("Failed to encode transaction: {0}")]
    Encoding(#[from] bincode::Error),
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // The number of the UTXO to be spent within that transaction.
    output_index: OutputIndex,
    // Signature by the owner of the referenced output over `raw_data_to_sign` for this input.
    #[serde(default)]
    signature: Option<Signature>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            utxo_id,
            output_index,
            signature: None,
        }
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The output identifier this input claims.
    pub fn utxo(&self) -> Utxo {
        Utxo::new(self.utxo_id, self.output_index)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Coin,
    owner: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(amount: Coin, owner: PublicKey) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }
}

// Encoded form of the data an input signature commits to. Signatures are left out so the
// payload never depends on a signature, and the input index ties each signature to one input.
#[derive(Serialize)]
struct SigningPayload<'a> {
    input_index: u32,
    claims: Vec<(&'a TransactionId, &'a OutputIndex)>,
    outputs: &'a [TransactionOutput],
}

// Encoded form of the whole transaction, used to derive its id.
#[derive(Serialize)]
struct RawTransaction<'a> {
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

/// A transfer of coins from the outputs its inputs claim to the outputs it creates.
///
/// The id is only present once the transaction is finalized, and any change to the inputs,
/// outputs or signatures clears it again.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    id: Option<TransactionId>,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            id: None,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> Option<&TransactionId> {
        self.id.as_ref()
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&TransactionInput> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&TransactionOutput> {
        self.outputs.get(index)
    }

    pub fn add_input(&mut self, utxo_id: TransactionId, output_index: OutputIndex) {
        self.id = None;
        self.inputs.push(TransactionInput::new(utxo_id, output_index));
    }

    pub fn add_output(&mut self, amount: Coin, owner: PublicKey) {
        self.id = None;
        self.outputs.push(TransactionOutput::new(amount, owner));
    }

    pub fn add_signature(
        &mut self,
        input_index: usize,
        signature: Signature,
    ) -> Result<(), TransactionError> {
        let inputs = self.inputs.len();
        let input = self
            .inputs
            .get_mut(input_index)
            .ok_or(TransactionError::InputIndexOutOfRange {
                index: input_index,
                inputs,
            })?;
        input.signature = Some(signature);
        self.id = None;
        Ok(())
    }

    /// Bytes that the owner of the output claimed by input `input_index` must sign.
    /// They cover every claimed output and every created output, but no signature.
    pub fn raw_data_to_sign(&self, input_index: usize) -> Result<Vec<u8>, TransactionError> {
        if input_index >= self.inputs.len() {
            return Err(TransactionError::InputIndexOutOfRange {
                index: input_index,
                inputs: self.inputs.len(),
            });
        }
        let payload = SigningPayload {
            input_index: u32::try_from(input_index)
                .map_err(|_| TransactionError::TooManyEntries(input_index))?,
            claims: self
                .inputs
                .iter()
                .map(|input| (&input.utxo_id, &input.output_index))
                .collect(),
            outputs: &self.outputs,
        };
        Ok(bincode::serialize(&payload)?)
    }

    /// Bytes of the complete transaction, signatures included.
    pub fn raw_tx(&self) -> Result<Vec<u8>, TransactionError> {
        let raw = RawTransaction {
            inputs: &self.inputs,
            outputs: &self.outputs,
        };
        Ok(bincode::serialize(&raw)?)
    }

    /// The id the transaction has for its current content, whether or not it is stored.
    pub fn compute_id(&self) -> Result<TransactionId, TransactionError> {
        Ok(TransactionId::new(Sha256::double_digest(&self.raw_tx()?)))
    }

    /// Computes and stores the id of the transaction.
    /// Call it after all signatures are in place.
    pub fn finalize(&mut self) -> Result<TransactionId, TransactionError> {
        let id = self.compute_id()?;
        self.id = Some(id);
        Ok(id)
    }

    /// Output identifiers created by this transaction once it is accepted, paired with
    /// their outputs. Empty until the transaction is finalized.
    pub fn created_utxos(&self) -> Result<Vec<(Utxo, &TransactionOutput)>, TransactionError> {
        let id = match self.id {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        self.outputs
            .iter()
            .enumerate()
            .map(|(index, output)| -> Result<_, TransactionError> {
                let index =
                    u32::try_from(index).map_err(|_| TransactionError::TooManyEntries(index))?;
                Ok((Utxo::new(id, OutputIndex::new(index)), output))
            })
            .collect()
    }
}
