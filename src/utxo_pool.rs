use crate::{Coin, OutputIndex, TransactionId, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::FromIterator;

/// Identifies an unspent transaction output by the transaction that created it and its
/// index in that transaction.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub const fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// A single pool entry, which is how a pool is written out and read back.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UtxoPoolEntry {
    pub utxo: Utxo,
    pub output: TransactionOutput,
}

/// A pool of unspent transaction outputs, i.e. everything that can currently be spent.
///
/// Cloning a pool copies every entry, so the clone and the original can be mutated
/// independently.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<UtxoPoolEntry>", into = "Vec<UtxoPoolEntry>")]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by their transaction ID and their index in the
    // transaction.
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    /// Maps `utxo` to `output`, replacing any output it was mapped to before.
    pub fn add(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    /// Removes `utxo` from the pool. Removing a missing `utxo` does nothing.
    pub fn remove(&mut self, utxo: &Utxo) {
        self.utxos.remove(utxo);
    }

    pub fn get(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// All output identifiers in the pool, in no particular order.
    pub fn all_utxos(&self) -> Vec<Utxo> {
        self.utxos.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &TransactionOutput)> {
        self.utxos.iter()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Total amount held by the pool, or `None` if it does not fit in a `Coin`.
    pub fn total_value(&self) -> Option<Coin> {
        Coin::checked_sum(self.utxos.values().map(TransactionOutput::amount))
    }
}

impl FromIterator<(Utxo, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (Utxo, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<UtxoPoolEntry>> for UtxoPool {
    fn from(entries: Vec<UtxoPoolEntry>) -> Self {
        entries
            .into_iter()
            .map(|entry| (entry.utxo, entry.output))
            .collect()
    }
}

impl From<UtxoPool> for Vec<UtxoPoolEntry> {
    // Sorted, so that the same pool is always written out the same way.
    fn from(pool: UtxoPool) -> Self {
        let mut entries = pool
            .utxos
            .into_iter()
            .map(|(utxo, output)| UtxoPoolEntry { utxo, output })
            .collect::<Vec<UtxoPoolEntry>>();
        entries.sort_by(|lhs, rhs| lhs.utxo.cmp(&rhs.utxo));
        entries
    }
}
