use bitcoin::{Amount, EcdsaSighashType};
use proptest::prelude::*;
use proptest::sample::select;

use crate::chain::ChainParams;

/// Largest key count a standard bare multisig script encodes with OP_PUSHNUM.
pub const MAX_MULTISIG_KEYS: usize = 16;

/// `(m, n)` with n uniform in `1..=16` and m uniform in `1..=n`.
pub fn multisig_params() -> impl Strategy<Value = (usize, usize)> {
    (1..=MAX_MULTISIG_KEYS).prop_flat_map(|total| (1..=total, Just(total)))
}

pub fn valid_sighash(chain: &ChainParams) -> impl Strategy<Value = EcdsaSighashType> + use<> {
    select(chain.valid_sighash_types().to_vec())
}

pub fn satoshi_amount(chain: &ChainParams) -> impl Strategy<Value = Amount> + use<> {
    (1..=chain.max_supply().to_sat()).prop_map(Amount::from_sat)
}
