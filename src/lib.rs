pub mod coin;
pub mod commands;
pub mod hash;
pub mod public_key;
pub mod transaction;
pub mod transaction_validator;
pub mod utxo_pool;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use self::{
    coin::*, hash::*, public_key::*, transaction::*, transaction_validator::*, utxo_pool::*,
    validation::*,
};
