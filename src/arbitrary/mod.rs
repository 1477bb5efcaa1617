//! Proptest strategies for Bitcoin fixtures.
//!
//! Every strategy is a pure function of its arguments. Randomness comes from
//! the runner driving it, either `proptest!` or [`crate::FixtureRunner`].

pub mod params;
pub mod primitives;
pub mod script;
pub mod signing;
pub mod transaction;

pub use params::{MAX_MULTISIG_KEYS, multisig_params, satoshi_amount, valid_sighash};
pub use signing::{
    KeyedSigInput, PartialInput, PartialTxs, SigningData, multisig_sig_input,
    multisig_sig_input_with, partial_txs, partial_txs_from, partial_txs_with, pk_hash_sig_input,
    pk_sig_input, script_hash_sig_input, script_hash_sig_input_from, sig_input, signing_data,
    signing_data_from,
};
pub use transaction::{
    addr_only_tx, addr_only_tx_full, addr_only_tx_in, addr_only_tx_in_full, addr_only_tx_out,
    any_tx, dedup_by_outpoint, empty_tx, legacy_tx, tx_in, tx_out, witness_tx,
};
