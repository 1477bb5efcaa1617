use bitcoin::AddressType;
use proptest::prelude::*;
use tx_arbitrary::address::{script_hash_address, script_output_for};
use tx_arbitrary::arbitrary::script::{
    addr_only_output, addr_only_script_input, address, multisig_script_hash_input,
    multisig_script_hash_input_compressed, pay_script_hash, script_input, script_output,
    simple_output,
};
use tx_arbitrary::{ScriptInput, ScriptOutput, SimpleInput};

mod utils;

fn slots_match_threshold(input: &ScriptInput) -> bool {
    match input {
        ScriptInput::ScriptHash {
            input: SimpleInput::SpendMulSig(sigs),
            redeem: ScriptOutput::PayMulSig { keys, required },
        } => sigs.len() == *required && (1..=keys.len()).contains(required),
        _ => false,
    }
}

fn all_keys_compressed(input: &ScriptInput) -> bool {
    match input {
        ScriptInput::Regular(SimpleInput::SpendPkHash(_, key)) => key.compressed,
        ScriptInput::ScriptHash {
            redeem: ScriptOutput::PayMulSig { keys, .. },
            ..
        } => keys.iter().all(|key| key.compressed),
        _ => false,
    }
}

proptest! {
    #![proptest_config(utils::proptest_config(64))]

    #[test]
    fn test_multisig_script_hash_input_has_m_slots(input in multisig_script_hash_input(&utils::chain())) {
        prop_assert!(slots_match_threshold(&input));
    }

    #[test]
    fn test_compressed_multisig_script_hash_input_has_m_slots(
        input in multisig_script_hash_input_compressed(&utils::chain(), true),
    ) {
        prop_assert!(slots_match_threshold(&input));
    }

    #[test]
    fn test_address_kind(address in address(utils::chain().network())) {
        prop_assert!(matches!(
            address.address_type(),
            Some(AddressType::P2pkh) | Some(AddressType::P2sh)
        ));
        prop_assert!(script_output_for(&address).is_some());
    }

    #[test]
    fn test_script_output_roundtrip(output in script_output(utils::chain().network())) {
        let decoded = ScriptOutput::from_script(&output.to_script()).unwrap();
        prop_assert_eq!(decoded, output);
    }

    #[test]
    fn test_script_input_roundtrip(input in script_input(&utils::chain())) {
        let script = input.to_script().unwrap();
        prop_assert_eq!(ScriptInput::from_script(&script).unwrap(), input);
    }

    #[test]
    fn test_pay_script_hash_commits_to_redeem(
        (redeem, wrapped) in simple_output().prop_flat_map(|redeem| {
            let network = utils::chain().network();
            (Just(redeem.clone()), pay_script_hash(network, Just(redeem)))
        })
    ) {
        let address = script_hash_address(utils::chain().network(), &redeem);
        prop_assert_eq!(address.script_pubkey(), wrapped.to_script());
        prop_assert_eq!(wrapped, ScriptOutput::PayScriptHash(redeem.script_hash()));
    }

    #[test]
    fn test_addr_only_output_has_address(output in addr_only_output(utils::chain().network())) {
        prop_assert!(matches!(
            output,
            ScriptOutput::PayPkHash(_) | ScriptOutput::PayScriptHash(_)
        ));
    }

    #[test]
    fn test_addr_only_input_uses_compressed_keys(input in addr_only_script_input(&utils::chain(), false)) {
        prop_assert!(all_keys_compressed(&input));
    }

    #[test]
    fn test_addr_only_full_input_is_signed(input in addr_only_script_input(&utils::chain(), true)) {
        prop_assert!(all_keys_compressed(&input));
        prop_assert!(input.simple_input().signatures().iter().all(|sig| !sig.is_empty()));
    }
}
