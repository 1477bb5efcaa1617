use bitcoin::{OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness};
use indexmap::IndexMap;
use proptest::collection::vec;
use proptest::prelude::*;

use crate::chain::ChainParams;
use crate::script::ScriptInput;

use super::params::satoshi_amount;
use super::primitives::{bytes, lock_time, outpoint, sequence, version};
use super::script::{addr_only_output, addr_only_script_input, script_input, script_output};

pub const MAX_TX_INPUTS: usize = 5;
pub const MAX_TX_OUTPUTS: usize = 5;

/// Keeps the first item seen for every outpoint, in the original order.
pub fn dedup_by_outpoint<T>(items: Vec<T>, outpoint: impl Fn(&T) -> OutPoint) -> Vec<T> {
    let mut unique = IndexMap::with_capacity(items.len());
    for item in items {
        unique.entry(outpoint(&item)).or_insert(item);
    }
    unique.into_values().collect()
}

/// Input spending `previous_output` whose script is not known yet.
pub fn placeholder_input(previous_output: OutPoint, sequence: Sequence) -> TxIn {
    TxIn {
        previous_output,
        script_sig: ScriptBuf::new(),
        sequence,
        witness: Witness::new(),
    }
}

pub fn tx_out(chain: &ChainParams) -> impl Strategy<Value = TxOut> + use<> {
    (satoshi_amount(chain), script_output(chain.network())).prop_map(|(value, script)| TxOut {
        value,
        script_pubkey: script.to_script(),
    })
}

pub fn addr_only_tx_out(chain: &ChainParams) -> impl Strategy<Value = TxOut> + use<> {
    (satoshi_amount(chain), addr_only_output(chain.network())).prop_map(|(value, script)| {
        TxOut {
            value,
            script_pubkey: script.to_script(),
        }
    })
}

fn tx_in_with(script: impl Strategy<Value = ScriptInput>) -> impl Strategy<Value = TxIn> {
    (outpoint(), script, sequence()).prop_filter_map(
        "input script does not encode",
        |(previous_output, script, sequence)| {
            Some(TxIn {
                script_sig: script.to_script().ok()?,
                ..placeholder_input(previous_output, sequence)
            })
        },
    )
}

pub fn tx_in(chain: &ChainParams) -> impl Strategy<Value = TxIn> + use<> {
    tx_in_with(script_input(chain))
}

/// Pubkey-hash or P2SH multisig spend, possibly with empty signature slots.
pub fn addr_only_tx_in(chain: &ChainParams) -> impl Strategy<Value = TxIn> + use<> {
    tx_in_with(addr_only_script_input(chain, false))
}

/// Like [`addr_only_tx_in`], with every signature slot filled.
pub fn addr_only_tx_in_full(chain: &ChainParams) -> impl Strategy<Value = TxIn> + use<> {
    tx_in_with(addr_only_script_input(chain, true))
}

/// `(inputs, outputs)` counts.
///
/// Without inputs, a legacy encoding starts with a zero input count that
/// decoders read as the segwit marker, and the output count that follows
/// would be taken for the segwit flag. Requiring two or more outputs keeps
/// such transactions clear of a flag value of 0 or 1.
fn tx_counts() -> impl Strategy<Value = (usize, usize)> {
    (0..=MAX_TX_INPUTS).prop_flat_map(|inputs| {
        let min_outputs = if inputs == 0 { 2 } else { 0 };
        (Just(inputs), min_outputs..=MAX_TX_OUTPUTS)
    })
}

fn tx_with(
    inputs: BoxedStrategy<TxIn>,
    outputs: BoxedStrategy<TxOut>,
) -> impl Strategy<Value = Transaction> {
    (version(), tx_counts(), lock_time())
        .prop_flat_map(move |(version, (ni, no), lock_time)| {
            (
                Just(version),
                vec(inputs.clone(), ni),
                vec(outputs.clone(), no),
                Just(lock_time),
            )
        })
        .prop_map(|(version, input, output, lock_time)| Transaction {
            version,
            lock_time,
            input: dedup_by_outpoint(input, |txin| txin.previous_output),
            output,
        })
}

/// Transaction without witness data.
pub fn legacy_tx(chain: &ChainParams) -> impl Strategy<Value = Transaction> + use<> {
    tx_with(tx_in(chain).boxed(), tx_out(chain).boxed())
}

/// Transaction carrying one witness stack per input. Stacks may be empty.
pub fn witness_tx(chain: &ChainParams) -> impl Strategy<Value = Transaction> + use<> {
    legacy_tx(chain)
        .prop_flat_map(|tx| {
            let stacks = vec(vec(bytes(), 0..5), tx.input.len());
            (Just(tx), stacks)
        })
        .prop_map(|(mut tx, stacks)| {
            for (txin, stack) in tx.input.iter_mut().zip(stacks) {
                txin.witness = Witness::from_slice(&stack);
            }
            tx
        })
}

pub fn any_tx(chain: &ChainParams) -> impl Strategy<Value = Transaction> + use<> {
    prop_oneof![legacy_tx(chain), witness_tx(chain)]
}

/// Unsigned skeleton: 1 to 5 fresh outpoints with empty scripts, 1 to 5 outputs.
pub fn empty_tx(chain: &ChainParams) -> impl Strategy<Value = Transaction> + use<> {
    empty_tx_with(chain, outpoint())
}

fn empty_tx_with<O>(
    chain: &ChainParams,
    outpoints: O,
) -> impl Strategy<Value = Transaction> + use<O>
where
    O: Strategy<Value = OutPoint>,
{
    (
        version(),
        vec((outpoints, sequence()), 1..=MAX_TX_INPUTS),
        vec(tx_out(chain), 1..=MAX_TX_OUTPUTS),
        lock_time(),
    )
        .prop_map(|(version, spends, output, lock_time)| Transaction {
            version,
            lock_time,
            input: dedup_by_outpoint(spends, |(outpoint, _)| *outpoint)
                .into_iter()
                .map(|(outpoint, sequence)| placeholder_input(outpoint, sequence))
                .collect(),
            output,
        })
}

pub fn addr_only_tx(chain: &ChainParams) -> impl Strategy<Value = Transaction> + use<> {
    tx_with(addr_only_tx_in(chain).boxed(), addr_only_tx_out(chain).boxed())
}

pub fn addr_only_tx_full(chain: &ChainParams) -> impl Strategy<Value = Transaction> + use<> {
    tx_with(
        addr_only_tx_in_full(chain).boxed(),
        addr_only_tx_out(chain).boxed(),
    )
}
