use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
use bitcoin::transaction::Version;
use bitcoin::{
    Network, OutPoint, PrivateKey, PubkeyHash, PublicKey, ScriptHash, Sequence, Txid, ecdsa,
};
use proptest::collection::vec;
use proptest::prelude::*;

use crate::chain::ChainParams;
use crate::script::TxSignature;

use super::params::valid_sighash;

pub fn hash160() -> impl Strategy<Value = [u8; 20]> {
    any::<[u8; 20]>()
}

pub fn hash256() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

pub fn pubkey_hash() -> impl Strategy<Value = PubkeyHash> {
    hash160().prop_map(PubkeyHash::from_byte_array)
}

pub fn script_hash() -> impl Strategy<Value = ScriptHash> {
    hash160().prop_map(ScriptHash::from_byte_array)
}

pub fn txid() -> impl Strategy<Value = Txid> {
    hash256().prop_map(Txid::from_byte_array)
}

pub fn outpoint() -> impl Strategy<Value = OutPoint> {
    (txid(), any::<u32>()).prop_map(|(txid, vout)| OutPoint::new(txid, vout))
}

/// Byte strings of up to 64 bytes, empty included.
pub fn bytes() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..=64)
}

pub fn sequence() -> impl Strategy<Value = Sequence> {
    any::<u32>().prop_map(Sequence)
}

pub fn version() -> impl Strategy<Value = Version> {
    any::<i32>().prop_map(Version)
}

pub fn lock_time() -> impl Strategy<Value = LockTime> {
    any::<u32>().prop_map(LockTime::from_consensus)
}

pub fn secret_key() -> impl Strategy<Value = SecretKey> {
    hash256().prop_filter_map("out of range secret key", |bytes| {
        SecretKey::from_slice(&bytes).ok()
    })
}

fn key_pair_with(
    network: Network,
    compressed: impl Strategy<Value = bool>,
) -> impl Strategy<Value = (PrivateKey, PublicKey)> {
    let secp = Secp256k1::signing_only();
    (secret_key(), compressed).prop_map(move |(secret, compressed)| {
        let private = if compressed {
            PrivateKey::new(secret, network)
        } else {
            PrivateKey::new_uncompressed(secret, network)
        };
        let public = private.public_key(&secp);
        (private, public)
    })
}

/// Fresh key pair, compressed or not with equal odds.
pub fn key_pair(network: Network) -> impl Strategy<Value = (PrivateKey, PublicKey)> {
    key_pair_with(network, any::<bool>())
}

pub fn compressed_key_pair(network: Network) -> impl Strategy<Value = (PrivateKey, PublicKey)> {
    key_pair_with(network, Just(true))
}

pub fn public_key() -> impl Strategy<Value = PublicKey> {
    key_pair(Network::Regtest).prop_map(|(_, public)| public)
}

pub fn compressed_public_key() -> impl Strategy<Value = PublicKey> {
    compressed_key_pair(Network::Regtest).prop_map(|(_, public)| public)
}

/// A real signature over a random digest, carrying a valid sighash flag.
pub fn tx_signature(chain: &ChainParams) -> impl Strategy<Value = TxSignature> + use<> {
    let secp = Secp256k1::signing_only();
    (secret_key(), hash256(), valid_sighash(chain)).prop_map(
        move |(secret, digest, sighash_type)| {
            TxSignature::Signed(ecdsa::Signature {
                signature: secp.sign_ecdsa(&Message::from_digest(digest), &secret),
                sighash_type,
            })
        },
    )
}

pub fn tx_signature_or_empty(chain: &ChainParams) -> impl Strategy<Value = TxSignature> + use<> {
    prop_oneof![Just(TxSignature::Empty), tx_signature(chain)]
}
