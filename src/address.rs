use bitcoin::{Address, Network, PublicKey};

use crate::script::ScriptOutput;

pub fn pub_key_hash_address(network: Network, key: &PublicKey) -> Address {
    Address::p2pkh(key.pubkey_hash(), network)
}

/// P2SH address committing to `redeem`.
///
/// Redeem scripts above the 520 byte push limit still get an address; spending
/// them is the consumer's problem.
pub fn script_hash_address(network: Network, redeem: &ScriptOutput) -> Address {
    Address::p2sh_from_hash(redeem.script_hash(), network)
}

/// Descriptor locking coins to `address`, if it is a standard address.
pub fn script_output_for(address: &Address) -> Option<ScriptOutput> {
    ScriptOutput::from_script(&address.script_pubkey()).ok()
}
