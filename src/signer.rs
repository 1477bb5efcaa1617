use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{All, Message, Secp256k1};
use bitcoin::sighash::SighashCache;
use bitcoin::{
    Amount, EcdsaSighashType, OutPoint, PrivateKey, PublicKey, Script, Transaction, ecdsa,
};
use bon::Builder;
use tracing::debug;

use crate::chain::ChainParams;
use crate::error::{Error, Result};
use crate::script::{ScriptInput, ScriptOutput, SimpleInput, TxSignature};

/// Everything needed to sign the input spending `outpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct SigInput {
    pub script_output: ScriptOutput,
    pub value: Amount,
    pub outpoint: OutPoint,
    pub sighash: EcdsaSighashType,
    pub redeem: Option<ScriptOutput>,
}

impl SigInput {
    /// The script signatures have to satisfy: the redeem script when one is present.
    pub fn signing_script(&self) -> &ScriptOutput {
        self.redeem.as_ref().unwrap_or(&self.script_output)
    }
}

pub trait TxSigner {
    /// Returns `tx` with the script of every input named in `sig_inputs` filled in.
    fn sign(
        &self,
        chain: &ChainParams,
        tx: &Transaction,
        sig_inputs: &[SigInput],
        keys: &[PrivateKey],
    ) -> Result<Transaction>;
}

/// Signs pre-segwit inputs with legacy signature hashes.
///
/// Legacy sighashes do not commit to the spent amount, so `SigInput::value` is
/// carried through untouched.
#[derive(Debug, Clone)]
pub struct LegacySigner {
    secp: Secp256k1<All>,
}

impl LegacySigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    fn signing_script(sig_input: &SigInput) -> Result<&ScriptOutput> {
        match (&sig_input.script_output, &sig_input.redeem) {
            (ScriptOutput::PayScriptHash(hash), Some(redeem)) => {
                if redeem.is_script_hash() {
                    return Err(Error::NestedScriptHash);
                }
                if redeem.script_hash() != *hash {
                    return Err(Error::RedeemMismatch);
                }
                Ok(redeem)
            }
            (ScriptOutput::PayScriptHash(_), None) => Err(Error::MissingRedeem),
            (output, None) => Ok(output),
            (_, Some(_)) => Err(Error::RedeemMismatch),
        }
    }

    fn message(
        &self,
        tx: &Transaction,
        index: usize,
        script_code: &Script,
        sighash: EcdsaSighashType,
    ) -> Result<Message> {
        let sighash = SighashCache::new(tx).legacy_signature_hash(
            index,
            script_code,
            sighash.to_u32(),
        )?;
        Ok(Message::from_digest(sighash.to_byte_array()))
    }

    fn verifies(
        &self,
        tx: &Transaction,
        index: usize,
        script_code: &Script,
        sig: &ecdsa::Signature,
        key: &PublicKey,
    ) -> bool {
        self.message(tx, index, script_code, sig.sighash_type)
            .map(|msg| {
                self.secp
                    .verify_ecdsa(&msg, &sig.signature, &key.inner)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    fn sign_input(
        &self,
        tx: &Transaction,
        index: usize,
        sig_input: &SigInput,
        keys: &[(&PrivateKey, PublicKey)],
    ) -> Result<ScriptInput> {
        let script = Self::signing_script(sig_input)?;
        let script_code = script.to_script();
        let msg = self.message(tx, index, &script_code, sig_input.sighash)?;
        let sign = |private: &PrivateKey| {
            TxSignature::Signed(ecdsa::Signature {
                signature: self.secp.sign_ecdsa(&msg, &private.inner),
                sighash_type: sig_input.sighash,
            })
        };
        let missing_key = || Error::MissingKey(script_code.to_hex_string());

        let input = match script {
            ScriptOutput::PayPk(key) => {
                let (private, _) = keys
                    .iter()
                    .find(|(_, public)| public == key)
                    .ok_or_else(missing_key)?;
                SimpleInput::SpendPk(sign(*private))
            }
            ScriptOutput::PayPkHash(hash) => {
                let (private, public) = keys
                    .iter()
                    .find(|(_, public)| public.pubkey_hash() == *hash)
                    .ok_or_else(missing_key)?;
                SimpleInput::SpendPkHash(sign(*private), *public)
            }
            ScriptOutput::PayMulSig {
                keys: script_keys,
                required,
            } => {
                if !script_keys
                    .iter()
                    .any(|script_key| keys.iter().any(|(_, public)| public == script_key))
                {
                    return Err(missing_key());
                }
                // Script key order, at most m; supplied keys win over existing signatures.
                let existing = existing_signatures(&tx.input[index].script_sig);
                let mut sigs = Vec::with_capacity(*required);
                for script_key in script_keys {
                    if sigs.len() == *required {
                        break;
                    }
                    if let Some((private, _)) = keys.iter().find(|(_, public)| public == script_key)
                    {
                        sigs.push(sign(*private));
                    } else if let Some(sig) = existing
                        .iter()
                        .find(|sig| self.verifies(tx, index, &script_code, sig, script_key))
                    {
                        sigs.push(TxSignature::Signed(*sig));
                    }
                }
                sigs.resize(*required, TxSignature::Empty);
                SimpleInput::SpendMulSig(sigs)
            }
            other => {
                return Err(Error::UnsupportedScript(other.to_script().to_hex_string()));
            }
        };

        Ok(match &sig_input.redeem {
            Some(redeem) => ScriptInput::ScriptHash {
                input,
                redeem: redeem.clone(),
            },
            None => ScriptInput::Regular(input),
        })
    }
}

impl TxSigner for LegacySigner {
    fn sign(
        &self,
        chain: &ChainParams,
        tx: &Transaction,
        sig_inputs: &[SigInput],
        keys: &[PrivateKey],
    ) -> Result<Transaction> {
        let keys = keys
            .iter()
            .map(|private| (private, private.public_key(&self.secp)))
            .collect::<Vec<_>>();
        let mut signed = tx.clone();
        for sig_input in sig_inputs {
            if !chain.is_valid_sighash(sig_input.sighash) {
                return Err(Error::InvalidSigHash(sig_input.sighash));
            }
            let index = signed
                .input
                .iter()
                .position(|txin| txin.previous_output == sig_input.outpoint)
                .ok_or(Error::OutPointNotFound(sig_input.outpoint))?;
            let input = self.sign_input(&signed, index, sig_input, &keys)?;
            signed.input[index].script_sig = input.to_script()?;
            debug!(outpoint = %sig_input.outpoint, index, "Signed input");
        }
        Ok(signed)
    }
}

/// Signatures already present in an input script, placeholders dropped.
fn existing_signatures(script_sig: &Script) -> Vec<ecdsa::Signature> {
    ScriptInput::from_script(script_sig)
        .map(|input| input.simple_input().signatures())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|sig| match sig {
            TxSignature::Signed(sig) => Some(sig),
            TxSignature::Empty => None,
        })
        .collect()
}
