//! Deterministic keys and transactions shared by the unit tests.

use crate::{Coin, PublicKey, Transaction, TransactionOutput, UtxoPool};
use ed25519_dalek::{Signer, SigningKey};

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn owner(key: &SigningKey) -> PublicKey {
    PublicKey::from(&key.verifying_key())
}

/// Signs input `input_index` of `tx` with `key`.
pub fn sign(tx: &mut Transaction, input_index: usize, key: &SigningKey) {
    let payload = tx.raw_data_to_sign(input_index).unwrap();
    tx.add_signature(input_index, key.sign(&payload).into())
        .unwrap();
}

/// A finalized transaction without inputs that pays `amount` to `key`.
pub fn genesis(amount: i64, key: &SigningKey) -> Transaction {
    let mut tx = Transaction::default();
    tx.add_output(Coin::new(amount), owner(key));
    tx.finalize().unwrap();
    tx
}

/// A pool holding every output of the given finalized transactions.
pub fn pool_of(transactions: &[&Transaction]) -> UtxoPool {
    transactions
        .iter()
        .copied()
        .flat_map(|tx| tx.created_utxos().unwrap())
        .map(|(utxo, output)| (utxo, output.clone()))
        .collect()
}

/// Builds a finalized transaction spending `claims` into `outputs`, each input signed
/// by the key that goes with it.
pub fn spend(
    claims: &[(&Transaction, u32, &SigningKey)],
    outputs: &[(i64, &SigningKey)],
) -> Transaction {
    let mut tx = Transaction::default();
    for (source, index, _) in claims {
        tx.add_input(*source.id().unwrap(), crate::OutputIndex::new(*index));
    }
    for (amount, key) in outputs {
        tx.add_output(Coin::new(*amount), owner(key));
    }
    for (input_index, (_, _, key)) in claims.iter().enumerate() {
        sign(&mut tx, input_index, key);
    }
    tx.finalize().unwrap();
    tx
}

pub fn output(amount: i64, key: &SigningKey) -> TransactionOutput {
    TransactionOutput::new(Coin::new(amount), owner(key))
}
