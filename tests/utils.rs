#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::SighashCache;
use bitcoin::{PublicKey, Transaction};
use proptest::test_runner::Config as ProptestConfig;
use tx_arbitrary::config::Config;
use tx_arbitrary::logging;
use tx_arbitrary::{ChainParams, ScriptInput, ScriptOutput, SigInput, SimpleInput, TxSignature};

pub fn config() -> Config {
    let config = Config::from_env().unwrap();
    logging::setup(config.log_format);
    config
}

pub fn chain() -> ChainParams {
    config().chain_params()
}

pub fn proptest_config(cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases,
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Keys whose signatures are present in the input of `tx` spending
/// `sig_input.outpoint`, in signature order. Fails on any signature that does
/// not verify against the script being satisfied.
pub fn signing_keys(tx: &Transaction, sig_input: &SigInput) -> Result<Vec<PublicKey>> {
    let index = tx
        .input
        .iter()
        .position(|txin| txin.previous_output == sig_input.outpoint)
        .ok_or_else(|| anyhow!("no input spends {}", sig_input.outpoint))?;
    let input = ScriptInput::from_script(&tx.input[index].script_sig)?;
    let script = sig_input.signing_script();
    let script_code = script.to_script();

    let candidates = match (script, input.simple_input()) {
        (ScriptOutput::PayPk(key), SimpleInput::SpendPk(_)) => vec![*key],
        (ScriptOutput::PayPkHash(hash), SimpleInput::SpendPkHash(_, key)) => {
            if key.pubkey_hash() != *hash {
                bail!("revealed key does not match {}", hash);
            }
            vec![*key]
        }
        (ScriptOutput::PayMulSig { keys, .. }, SimpleInput::SpendMulSig(_)) => keys.clone(),
        (script, input) => bail!("{:?} does not spend {:?}", input, script),
    };

    let secp = Secp256k1::verification_only();
    let mut signers = Vec::new();
    for sig in input.simple_input().signatures() {
        let TxSignature::Signed(sig) = sig else {
            continue;
        };
        let sighash = SighashCache::new(tx).legacy_signature_hash(
            index,
            &script_code,
            sig.sighash_type.to_u32(),
        )?;
        let msg = Message::from_digest(sighash.to_byte_array());
        let key = candidates
            .iter()
            .find(|key| secp.verify_ecdsa(&msg, &sig.signature, &key.inner).is_ok())
            .ok_or_else(|| anyhow!("signature on input {} does not verify", index))?;
        signers.push(*key);
    }
    Ok(signers)
}

/// Signatures an input of `sig_input`'s kind needs to be complete.
pub fn required_signatures(sig_input: &SigInput) -> usize {
    match sig_input.signing_script() {
        ScriptOutput::PayMulSig { required, .. } => *required,
        _ => 1,
    }
}
