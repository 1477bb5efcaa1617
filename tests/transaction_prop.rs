use std::collections::HashSet;

use bitcoin::Transaction;
use bitcoin::consensus::{deserialize, serialize};
use proptest::prelude::*;
use tx_arbitrary::arbitrary::{
    addr_only_tx, addr_only_tx_full, addr_only_tx_in_full, addr_only_tx_out, any_tx, empty_tx,
    legacy_tx, tx_out, witness_tx,
};
use tx_arbitrary::{ScriptInput, ScriptOutput};

mod utils;

fn has_unique_outpoints(tx: &Transaction) -> bool {
    let outpoints = tx
        .input
        .iter()
        .map(|txin| txin.previous_output)
        .collect::<HashSet<_>>();
    outpoints.len() == tx.input.len()
}

proptest! {
    #![proptest_config(utils::proptest_config(64))]

    #[test]
    fn test_legacy_tx_shape(tx in legacy_tx(&utils::chain())) {
        prop_assert!(has_unique_outpoints(&tx));
        prop_assert!(tx.input.len() <= 5);
        prop_assert!(tx.output.len() <= 5);
        prop_assert!(tx.input.iter().all(|txin| txin.witness.is_empty()));
        if tx.input.is_empty() {
            prop_assert!(tx.output.len() >= 2);
        } else {
            let decoded: Transaction = deserialize(&serialize(&tx)).unwrap();
            prop_assert_eq!(decoded, tx);
        }
    }

    #[test]
    fn test_witness_tx_stacks(tx in witness_tx(&utils::chain())) {
        prop_assert!(has_unique_outpoints(&tx));
        prop_assert!(tx.input.iter().all(|txin| txin.witness.len() < 5));
        let items_bounded = tx
            .input
            .iter()
            .all(|txin| txin.witness.iter().all(|item| item.len() <= 64));
        prop_assert!(items_bounded);
    }

    #[test]
    fn test_any_tx_unique_outpoints(tx in any_tx(&utils::chain())) {
        prop_assert!(has_unique_outpoints(&tx));
    }

    #[test]
    fn test_empty_tx_is_unsigned(tx in empty_tx(&utils::chain())) {
        prop_assert!(has_unique_outpoints(&tx));
        prop_assert!((1..=5).contains(&tx.input.len()));
        prop_assert!((1..=5).contains(&tx.output.len()));
        prop_assert!(tx.input.iter().all(|txin| txin.script_sig.is_empty()));
    }

    #[test]
    fn test_tx_out_value_within_supply(txout in tx_out(&utils::chain())) {
        prop_assert!(txout.value.to_sat() >= 1);
        prop_assert!(txout.value <= utils::chain().max_supply());
        prop_assert!(ScriptOutput::from_script(&txout.script_pubkey).is_ok());
    }

    #[test]
    fn test_addr_only_tx_out_has_address(txout in addr_only_tx_out(&utils::chain())) {
        let network = utils::chain().network();
        prop_assert!(bitcoin::Address::from_script(&txout.script_pubkey, network).is_ok());
    }

    #[test]
    fn test_addr_only_tx_in_full_decodes(txin in addr_only_tx_in_full(&utils::chain())) {
        let input = ScriptInput::from_script(&txin.script_sig).unwrap();
        prop_assert!(input.simple_input().signatures().iter().all(|sig| !sig.is_empty()));
    }

    #[test]
    fn test_addr_only_tx_unique_outpoints(tx in addr_only_tx(&utils::chain())) {
        prop_assert!(has_unique_outpoints(&tx));
        if tx.input.is_empty() {
            prop_assert!(tx.output.len() >= 2);
        }
    }

    #[test]
    fn test_addr_only_tx_full_signed(tx in addr_only_tx_full(&utils::chain())) {
        prop_assert!(has_unique_outpoints(&tx));
        prop_assert!(tx.input.iter().all(|txin| !txin.script_sig.is_empty()));
    }
}
