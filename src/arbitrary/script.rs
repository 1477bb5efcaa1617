use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::{Address, Network, PublicKey, WPubkeyHash, WScriptHash};
use proptest::collection::vec;
use proptest::prelude::*;

use crate::address::{script_hash_address, script_output_for};
use crate::chain::ChainParams;
use crate::script::{ScriptInput, ScriptOutput, SimpleInput, TxSignature};

use super::params::multisig_params;
use super::primitives::{
    compressed_public_key, hash160, hash256, public_key, pubkey_hash, script_hash, tx_signature,
    tx_signature_or_empty,
};

pub fn pub_key_address(network: Network) -> impl Strategy<Value = Address> {
    pubkey_hash().prop_map(move |hash| Address::p2pkh(hash, network))
}

pub fn script_address(network: Network) -> impl Strategy<Value = Address> {
    script_hash().prop_map(move |hash| Address::p2sh_from_hash(hash, network))
}

/// Pubkey-hash or script-hash address over a random hash, with equal odds.
pub fn address(network: Network) -> impl Strategy<Value = Address> {
    prop_oneof![pub_key_address(network), script_address(network)]
}

pub fn pay_pk() -> impl Strategy<Value = ScriptOutput> {
    public_key().prop_map(ScriptOutput::PayPk)
}

pub fn pay_pk_hash() -> impl Strategy<Value = ScriptOutput> {
    pubkey_hash().prop_map(ScriptOutput::PayPkHash)
}

/// `(m, keys)` of an m-of-n multisig, n keys drawn from `key`.
fn multisig_parts(
    key: impl Strategy<Value = PublicKey> + Clone,
) -> impl Strategy<Value = (usize, Vec<PublicKey>)> {
    multisig_params()
        .prop_flat_map(move |(required, total)| (Just(required), vec(key.clone(), total)))
}

fn multisig_from((required, keys): (usize, Vec<PublicKey>)) -> ScriptOutput {
    ScriptOutput::PayMulSig { keys, required }
}

pub fn pay_multisig() -> impl Strategy<Value = ScriptOutput> {
    multisig_parts(public_key().boxed()).prop_map(multisig_from)
}

pub fn pay_multisig_compressed() -> impl Strategy<Value = ScriptOutput> {
    multisig_parts(compressed_public_key().boxed()).prop_map(multisig_from)
}

/// Wraps whatever `redeem` yields in a pay-to-script-hash descriptor.
pub fn pay_script_hash(
    network: Network,
    redeem: impl Strategy<Value = ScriptOutput>,
) -> impl Strategy<Value = ScriptOutput> {
    redeem.prop_filter_map("redeem script has no P2SH address", move |redeem| {
        script_output_for(&script_hash_address(network, &redeem))
    })
}

pub fn pay_witness_pk_hash() -> impl Strategy<Value = ScriptOutput> {
    hash160().prop_map(|hash| ScriptOutput::PayWitnessPkHash(WPubkeyHash::from_byte_array(hash)))
}

pub fn pay_witness_script_hash() -> impl Strategy<Value = ScriptOutput> {
    hash256().prop_map(|hash| ScriptOutput::PayWitnessScriptHash(WScriptHash::from_byte_array(hash)))
}

/// OP_RETURN output within the 80 byte standardness limit.
pub fn data_carrier() -> impl Strategy<Value = ScriptOutput> {
    vec(any::<u8>(), 0..=80).prop_filter_map("oversized data push", |data| {
        PushBytesBuf::try_from(data).ok().map(ScriptOutput::DataCarrier)
    })
}

pub fn simple_output() -> impl Strategy<Value = ScriptOutput> {
    prop_oneof![pay_pk(), pay_pk_hash(), pay_multisig()]
}

fn simple_output_compressed() -> impl Strategy<Value = ScriptOutput> {
    prop_oneof![
        compressed_public_key().prop_map(ScriptOutput::PayPk),
        pay_pk_hash(),
        pay_multisig_compressed(),
    ]
}

pub fn script_output(network: Network) -> impl Strategy<Value = ScriptOutput> {
    prop_oneof![
        pay_pk(),
        pay_pk_hash(),
        pay_multisig(),
        pay_script_hash(network, simple_output()),
        pay_witness_pk_hash(),
        pay_witness_script_hash(),
        data_carrier(),
    ]
}

/// Outputs that correspond to a base58 address.
pub fn addr_only_output(network: Network) -> impl Strategy<Value = ScriptOutput> {
    prop_oneof![
        pay_pk_hash(),
        pay_script_hash(network, simple_output_compressed()),
    ]
}

fn signature(chain: &ChainParams, full: bool) -> BoxedStrategy<TxSignature> {
    if full {
        tx_signature(chain).boxed()
    } else {
        tx_signature_or_empty(chain).boxed()
    }
}

pub fn spend_pk(chain: &ChainParams) -> impl Strategy<Value = SimpleInput> + use<> {
    tx_signature(chain).prop_map(SimpleInput::SpendPk)
}

pub fn spend_pk_hash(chain: &ChainParams) -> impl Strategy<Value = SimpleInput> + use<> {
    (tx_signature(chain), public_key()).prop_map(|(sig, key)| SimpleInput::SpendPkHash(sig, key))
}

/// Pay-to-pubkey-hash spend with a compressed key. Unless `full`, the
/// signature may be the empty placeholder.
pub fn spend_pk_hash_compressed(
    chain: &ChainParams,
    full: bool,
) -> impl Strategy<Value = SimpleInput> + use<> {
    (signature(chain, full), compressed_public_key())
        .prop_map(|(sig, key)| SimpleInput::SpendPkHash(sig, key))
}

pub fn spend_multisig(chain: &ChainParams) -> impl Strategy<Value = SimpleInput> + use<> {
    let chain = chain.clone();
    multisig_params()
        .prop_flat_map(move |(required, _)| vec(tx_signature(&chain), required))
        .prop_map(SimpleInput::SpendMulSig)
}

pub fn simple_input(chain: &ChainParams) -> impl Strategy<Value = SimpleInput> + use<> {
    prop_oneof![spend_pk(chain), spend_pk_hash(chain), spend_multisig(chain)]
}

fn multisig_script_hash_input_with(
    chain: &ChainParams,
    parts: BoxedStrategy<(usize, Vec<PublicKey>)>,
    full: bool,
) -> impl Strategy<Value = ScriptInput> + use<> {
    let chain = chain.clone();
    parts
        .prop_flat_map(move |(required, keys)| {
            let redeem = multisig_from((required, keys));
            (vec(signature(&chain, full), required), Just(redeem))
        })
        .prop_map(|(sigs, redeem)| ScriptInput::ScriptHash {
            input: SimpleInput::SpendMulSig(sigs),
            redeem,
        })
}

/// P2SH multisig spend with m signature slots, some possibly still empty.
pub fn multisig_script_hash_input(chain: &ChainParams) -> impl Strategy<Value = ScriptInput> + use<> {
    let parts = multisig_parts(public_key().boxed()).boxed();
    multisig_script_hash_input_with(chain, parts, false)
}

/// Compressed-key P2SH multisig spend. Unless `full`, slots may be empty.
pub fn multisig_script_hash_input_compressed(
    chain: &ChainParams,
    full: bool,
) -> impl Strategy<Value = ScriptInput> + use<> {
    let parts = multisig_parts(compressed_public_key().boxed()).boxed();
    multisig_script_hash_input_with(chain, parts, full)
}

pub fn script_input(chain: &ChainParams) -> impl Strategy<Value = ScriptInput> + use<> {
    prop_oneof![
        simple_input(chain).prop_map(ScriptInput::Regular),
        multisig_script_hash_input(chain),
    ]
}

/// Inputs spending base58 addresses: pubkey-hash or P2SH multisig.
pub fn addr_only_script_input(
    chain: &ChainParams,
    full: bool,
) -> impl Strategy<Value = ScriptInput> + use<> {
    prop_oneof![
        spend_pk_hash_compressed(chain, full).prop_map(ScriptInput::Regular),
        multisig_script_hash_input_compressed(chain, full),
    ]
}
