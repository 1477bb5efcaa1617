use bitcoin::{
    Amount, EcdsaSighashType, Network, OutPoint, PrivateKey, PublicKey, Transaction,
};
use proptest::collection::vec;
use proptest::prelude::*;
use tracing::error;

use crate::address::{pub_key_hash_address, script_hash_address, script_output_for};
use crate::chain::ChainParams;
use crate::script::ScriptOutput;
use crate::signer::{LegacySigner, SigInput, TxSigner};

use super::params::{multisig_params, satoshi_amount, valid_sighash};
use super::primitives::{key_pair, lock_time, outpoint, sequence, version};
use super::transaction::{
    MAX_TX_INPUTS, MAX_TX_OUTPUTS, dedup_by_outpoint, empty_tx, placeholder_input, tx_out,
};

/// Signing descriptor together with the keys that satisfy it.
pub type KeyedSigInput = (SigInput, Vec<PrivateKey>);

/// Unsigned transaction, the descriptors of all its inputs and the keys
/// needed to sign every one of them.
#[derive(Debug, Clone)]
pub struct SigningData {
    pub tx: Transaction,
    pub sig_inputs: Vec<SigInput>,
    pub keys: Vec<PrivateKey>,
}

/// Multisig output spent by one input of a [`PartialTxs`] skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialInput {
    pub script_output: ScriptOutput,
    pub redeem: Option<ScriptOutput>,
    pub value: Amount,
    pub outpoint: OutPoint,
    pub required: usize,
    pub total: usize,
}

impl PartialInput {
    pub fn sig_input(&self, sighash: EcdsaSighashType) -> SigInput {
        SigInput {
            script_output: self.script_output.clone(),
            value: self.value,
            outpoint: self.outpoint,
            sighash,
            redeem: self.redeem.clone(),
        }
    }
}

/// Singly-signed candidates of one skeleton transaction.
#[derive(Debug, Clone)]
pub struct PartialTxs {
    pub txs: Vec<Transaction>,
    pub inputs: Vec<PartialInput>,
}

fn sig_input_for<K>(chain: &ChainParams, keys: K) -> impl Strategy<Value = KeyedSigInput> + use<K>
where
    K: Strategy<Value = (ScriptOutput, Vec<PrivateKey>)>,
{
    (
        keys,
        satoshi_amount(chain),
        outpoint(),
        valid_sighash(chain),
    )
        .prop_map(|((script_output, keys), value, outpoint, sighash)| {
            let sig_input = SigInput::builder()
                .script_output(script_output)
                .value(value)
                .outpoint(outpoint)
                .sighash(sighash)
                .build();
            (sig_input, keys)
        })
}

pub fn pk_sig_input(chain: &ChainParams) -> impl Strategy<Value = KeyedSigInput> + use<> {
    let keys = key_pair(chain.network())
        .prop_map(|(private, public)| (ScriptOutput::PayPk(public), vec![private]));
    sig_input_for(chain, keys)
}

/// Pay-to-pubkey-hash descriptor derived from the address of the generated key.
pub fn pk_hash_sig_input(chain: &ChainParams) -> impl Strategy<Value = KeyedSigInput> + use<> {
    let network = chain.network();
    let keys = key_pair(network).prop_filter_map(
        "pubkey hash address has no descriptor",
        move |(private, public)| {
            let script_output = script_output_for(&pub_key_hash_address(network, &public))?;
            Some((script_output, vec![private]))
        },
    );
    sig_input_for(chain, keys)
}

fn multisig_keys<P>(
    network: Network,
    params: P,
) -> impl Strategy<Value = (usize, Vec<(PrivateKey, PublicKey)>)> + use<P>
where
    P: Strategy<Value = (usize, usize)>,
{
    params.prop_flat_map(move |(required, total)| (Just(required), vec(key_pair(network), total)))
}

fn multisig_output(required: usize, pairs: &[(PrivateKey, PublicKey)]) -> ScriptOutput {
    ScriptOutput::PayMulSig {
        keys: pairs.iter().map(|(_, public)| *public).collect(),
        required,
    }
}

/// Multisig descriptor over n fresh keys, paired with a random m of them.
pub fn multisig_sig_input_with<P>(
    chain: &ChainParams,
    params: P,
) -> impl Strategy<Value = KeyedSigInput> + use<P>
where
    P: Strategy<Value = (usize, usize)>,
{
    let keys = multisig_keys(chain.network(), params)
        .prop_flat_map(|(required, pairs)| {
            let script_output = multisig_output(required, &pairs);
            let privates = pairs.into_iter().map(|(private, _)| private).collect::<Vec<_>>();
            (Just(script_output), Just(privates).prop_shuffle(), Just(required))
        })
        .prop_map(|(script_output, privates, required)| {
            (script_output, privates.into_iter().take(required).collect())
        });
    sig_input_for(chain, keys)
}

pub fn multisig_sig_input(chain: &ChainParams) -> impl Strategy<Value = KeyedSigInput> + use<> {
    multisig_sig_input_with(chain, multisig_params())
}

/// Wraps the descriptors of `redeem` in pay-to-script-hash, keeping the keys.
pub fn script_hash_sig_input_from<S>(
    chain: &ChainParams,
    redeem: S,
) -> impl Strategy<Value = KeyedSigInput> + use<S>
where
    S: Strategy<Value = KeyedSigInput>,
{
    let network = chain.network();
    redeem.prop_filter_map(
        "redeem script has no P2SH address",
        move |(sig_input, keys)| {
            let redeem = sig_input.script_output;
            let script_output = script_output_for(&script_hash_address(network, &redeem))?;
            let sig_input = SigInput {
                script_output,
                redeem: Some(redeem),
                ..sig_input
            };
            Some((sig_input, keys))
        },
    )
}

pub fn script_hash_sig_input(chain: &ChainParams) -> impl Strategy<Value = KeyedSigInput> + use<> {
    let redeem = prop_oneof![
        pk_sig_input(chain),
        pk_hash_sig_input(chain),
        multisig_sig_input(chain),
    ];
    script_hash_sig_input_from(chain, redeem.boxed())
}

pub fn sig_input(chain: &ChainParams) -> BoxedStrategy<KeyedSigInput> {
    prop_oneof![
        pk_sig_input(chain),
        pk_hash_sig_input(chain),
        multisig_sig_input(chain),
        script_hash_sig_input(chain),
    ]
    .boxed()
}

/// 1 to 5 descriptors over distinct outpoints, an unsigned transaction
/// spending them in shuffled order, and all the keys they need.
pub fn signing_data(chain: &ChainParams) -> impl Strategy<Value = SigningData> + use<> {
    signing_data_from(chain, sig_input(chain))
}

/// Like [`signing_data`], drawing the descriptors from `sig_inputs`. Of
/// descriptors sharing an outpoint only the first survives, keys included.
pub fn signing_data_from<S>(
    chain: &ChainParams,
    sig_inputs: S,
) -> impl Strategy<Value = SigningData> + use<S>
where
    S: Strategy<Value = KeyedSigInput>,
{
    (
        vec(sig_inputs, 1..=MAX_TX_INPUTS),
        vec(tx_out(chain), 1..=MAX_TX_OUTPUTS),
        version(),
        lock_time(),
    )
        .prop_flat_map(|(keyed, output, version, lock_time)| {
            let keyed = dedup_by_outpoint(keyed, |(sig_input, _)| sig_input.outpoint);
            let sequences = vec(sequence(), keyed.len());
            (
                Just(keyed),
                sequences,
                Just(output),
                Just(version),
                Just(lock_time),
            )
        })
        .prop_flat_map(|(keyed, sequences, output, version, lock_time)| {
            let input = keyed
                .iter()
                .zip(sequences)
                .map(|((sig_input, _), sequence)| placeholder_input(sig_input.outpoint, sequence))
                .collect::<Vec<_>>();
            (
                Just(keyed),
                Just(input).prop_shuffle(),
                Just(output),
                Just(version),
                Just(lock_time),
            )
        })
        .prop_map(|(keyed, input, output, version, lock_time)| {
            let (sig_inputs, keys): (Vec<_>, Vec<_>) = keyed.into_iter().unzip();
            SigningData {
                tx: Transaction {
                    version,
                    lock_time,
                    input,
                    output,
                },
                sig_inputs,
                keys: keys.into_iter().flatten().collect(),
            }
        })
}

/// Multisig spend of `outpoint`, bare or behind P2SH, with between m and n
/// of its keys each paired with its own sighash flag.
fn partial_spend<P>(
    chain: &ChainParams,
    outpoint: OutPoint,
    params: P,
) -> impl Strategy<Value = (PartialInput, Vec<(PrivateKey, EcdsaSighashType)>)> + use<P>
where
    P: Strategy<Value = (usize, usize)>,
{
    let network = chain.network();
    let sighash_chain = chain.clone();
    (
        multisig_keys(network, params),
        any::<bool>(),
        satoshi_amount(chain),
    )
        .prop_filter_map(
            "multisig has no P2SH address",
            move |((required, pairs), wrapped, value)| {
                let multisig = multisig_output(required, &pairs);
                let (script_output, redeem) = if wrapped {
                    let address = script_hash_address(network, &multisig);
                    (script_output_for(&address)?, Some(multisig))
                } else {
                    (multisig, None)
                };
                let input = PartialInput {
                    script_output,
                    redeem,
                    value,
                    outpoint,
                    required,
                    total: pairs.len(),
                };
                let privates = pairs
                    .into_iter()
                    .map(|(private, _)| private)
                    .collect::<Vec<_>>();
                Some((input, privates))
            },
        )
        .prop_flat_map(move |(input, privates)| {
            let (required, total) = (input.required, input.total);
            (
                Just(input),
                Just(privates).prop_shuffle(),
                required..=total,
                vec(valid_sighash(&sighash_chain), total),
            )
        })
        .prop_map(|(input, privates, signers, flags)| {
            let keys = privates.into_iter().zip(flags).take(signers).collect();
            (input, keys)
        })
}

/// Like [`partial_txs_with`], drawing the `(m, n)` of every spend from `params`.
pub fn partial_txs_from<S, P>(
    chain: &ChainParams,
    signer: S,
    params: P,
) -> impl Strategy<Value = PartialTxs> + use<S, P>
where
    S: TxSigner,
    P: Strategy<Value = (usize, usize)> + Clone,
{
    let spends_chain = chain.clone();
    let signing_chain = chain.clone();
    empty_tx(chain)
        .prop_flat_map(move |tx| {
            let spends = tx
                .input
                .iter()
                .map(|txin| partial_spend(&spends_chain, txin.previous_output, params.clone()))
                .collect::<Vec<_>>();
            (Just(tx), spends)
        })
        .prop_map(move |(tx, spends)| {
            let mut txs = Vec::new();
            let mut inputs = Vec::with_capacity(spends.len());
            for (input, keys) in spends {
                for (key, sighash) in keys {
                    let sig_input = input.sig_input(sighash);
                    match signer.sign(&signing_chain, &tx, &[sig_input], &[key]) {
                        Ok(signed) => txs.push(signed),
                        Err(e) => {
                            error!(outpoint = %input.outpoint, "Signer rejected generated fixture: {}", e);
                            panic!("partial_txs built an unsignable fixture: {}", e);
                        }
                    }
                }
                inputs.push(input);
            }
            PartialTxs { txs, inputs }
        })
}

/// For every input of an [`empty_tx`] skeleton, a fresh m-of-n multisig and
/// one candidate transaction per signing key, each signed by that key alone.
pub fn partial_txs_with<S>(
    chain: &ChainParams,
    signer: S,
) -> impl Strategy<Value = PartialTxs> + use<S>
where
    S: TxSigner,
{
    partial_txs_from(chain, signer, multisig_params().boxed())
}

pub fn partial_txs(chain: &ChainParams) -> impl Strategy<Value = PartialTxs> + use<> {
    partial_txs_with(chain, LegacySigner::new())
}
