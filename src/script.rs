use bitcoin::hashes::Hash;
use bitcoin::opcodes::OP_0;
use bitcoin::opcodes::all::{
    OP_CHECKMULTISIG, OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_PUSHNUM_1,
    OP_PUSHNUM_16, OP_RETURN,
};
use bitcoin::script::{Builder, Instruction, PushBytesBuf};
use bitcoin::{
    PubkeyHash, PublicKey, Script, ScriptBuf, ScriptHash, WPubkeyHash, WScriptHash, ecdsa,
};

use crate::error::{Error, Result};

/// Output script descriptor.
///
/// Signing descriptors only ever carry the first four variants. The witness and
/// data carrier kinds exist so output generation covers every standard shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutput {
    PayPk(PublicKey),
    PayPkHash(PubkeyHash),
    PayMulSig { keys: Vec<PublicKey>, required: usize },
    PayScriptHash(ScriptHash),
    PayWitnessPkHash(WPubkeyHash),
    PayWitnessScriptHash(WScriptHash),
    DataCarrier(PushBytesBuf),
}

impl ScriptOutput {
    pub fn to_script(&self) -> ScriptBuf {
        match self {
            ScriptOutput::PayPk(key) => Builder::new()
                .push_key(key)
                .push_opcode(OP_CHECKSIG)
                .into_script(),
            ScriptOutput::PayPkHash(hash) => Builder::new()
                .push_opcode(OP_DUP)
                .push_opcode(OP_HASH160)
                .push_slice(hash.as_byte_array())
                .push_opcode(OP_EQUALVERIFY)
                .push_opcode(OP_CHECKSIG)
                .into_script(),
            ScriptOutput::PayMulSig { keys, required } => {
                let mut builder = Builder::new().push_int(*required as i64);
                for key in keys {
                    builder = builder.push_key(key);
                }
                builder
                    .push_int(keys.len() as i64)
                    .push_opcode(OP_CHECKMULTISIG)
                    .into_script()
            }
            ScriptOutput::PayScriptHash(hash) => Builder::new()
                .push_opcode(OP_HASH160)
                .push_slice(hash.as_byte_array())
                .push_opcode(OP_EQUAL)
                .into_script(),
            ScriptOutput::PayWitnessPkHash(hash) => Builder::new()
                .push_opcode(OP_0)
                .push_slice(hash.as_byte_array())
                .into_script(),
            ScriptOutput::PayWitnessScriptHash(hash) => Builder::new()
                .push_opcode(OP_0)
                .push_slice(hash.as_byte_array())
                .into_script(),
            ScriptOutput::DataCarrier(data) => Builder::new()
                .push_opcode(OP_RETURN)
                .push_slice(data)
                .into_script(),
        }
    }

    pub fn from_script(script: &Script) -> Result<Self> {
        let instructions = script.instructions().collect::<Result<Vec<_>, _>>()?;
        let unknown = || Error::UnknownScript(script.to_hex_string());
        let output = match instructions.as_slice() {
            [Instruction::PushBytes(key), Instruction::Op(OP_CHECKSIG)] => {
                ScriptOutput::PayPk(PublicKey::from_slice(key.as_bytes())?)
            }
            [
                Instruction::Op(OP_DUP),
                Instruction::Op(OP_HASH160),
                Instruction::PushBytes(hash),
                Instruction::Op(OP_EQUALVERIFY),
                Instruction::Op(OP_CHECKSIG),
            ] => ScriptOutput::PayPkHash(
                PubkeyHash::from_slice(hash.as_bytes()).map_err(|_| unknown())?,
            ),
            [
                Instruction::Op(OP_HASH160),
                Instruction::PushBytes(hash),
                Instruction::Op(OP_EQUAL),
            ] => ScriptOutput::PayScriptHash(
                ScriptHash::from_slice(hash.as_bytes()).map_err(|_| unknown())?,
            ),
            [Instruction::PushBytes(version), Instruction::PushBytes(program)]
                if version.as_bytes().is_empty() && program.as_bytes().len() == 20 =>
            {
                ScriptOutput::PayWitnessPkHash(
                    WPubkeyHash::from_slice(program.as_bytes()).map_err(|_| unknown())?,
                )
            }
            [Instruction::PushBytes(version), Instruction::PushBytes(program)]
                if version.as_bytes().is_empty() && program.as_bytes().len() == 32 =>
            {
                ScriptOutput::PayWitnessScriptHash(
                    WScriptHash::from_slice(program.as_bytes()).map_err(|_| unknown())?,
                )
            }
            [Instruction::Op(OP_RETURN), Instruction::PushBytes(data)] => {
                ScriptOutput::DataCarrier(PushBytesBuf::try_from(data.as_bytes().to_vec())?)
            }
            [first, pushes @ .., last, Instruction::Op(OP_CHECKMULTISIG)] => {
                let required = decode_pushnum(first).ok_or_else(unknown)?;
                let total = decode_pushnum(last).ok_or_else(unknown)?;
                let keys = pushes
                    .iter()
                    .map(|instruction| match instruction {
                        Instruction::PushBytes(key) => Ok(PublicKey::from_slice(key.as_bytes())?),
                        Instruction::Op(_) => Err(unknown()),
                    })
                    .collect::<Result<Vec<_>>>()?;
                if keys.len() != total || required > total {
                    return Err(unknown());
                }
                ScriptOutput::PayMulSig { keys, required }
            }
            _ => return Err(unknown()),
        };
        Ok(output)
    }

    /// Hash committed to by a pay-to-script-hash output redeeming this script.
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::hash(self.to_script().as_bytes())
    }

    pub fn is_script_hash(&self) -> bool {
        matches!(self, ScriptOutput::PayScriptHash(_))
    }
}

fn decode_pushnum(instruction: &Instruction) -> Option<usize> {
    let Instruction::Op(op) = instruction else {
        return None;
    };
    let (first, last) = (OP_PUSHNUM_1.to_u8(), OP_PUSHNUM_16.to_u8());
    let byte = op.to_u8();
    (first..=last)
        .contains(&byte)
        .then(|| (byte - first) as usize + 1)
}

/// Signature slot of an input script. `Empty` is the OP_0 placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxSignature {
    Empty,
    Signed(ecdsa::Signature),
}

impl TxSignature {
    pub fn is_empty(&self) -> bool {
        matches!(self, TxSignature::Empty)
    }

    fn to_push(self) -> Result<PushBytesBuf> {
        match self {
            TxSignature::Empty => Ok(PushBytesBuf::new()),
            TxSignature::Signed(sig) => Ok(PushBytesBuf::try_from(sig.to_vec())?),
        }
    }

    fn from_push(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(TxSignature::Empty);
        }
        Ok(TxSignature::Signed(ecdsa::Signature::from_slice(bytes)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleInput {
    SpendPk(TxSignature),
    SpendPkHash(TxSignature, PublicKey),
    SpendMulSig(Vec<TxSignature>),
}

impl SimpleInput {
    pub fn signatures(&self) -> Vec<TxSignature> {
        match self {
            SimpleInput::SpendPk(sig) | SimpleInput::SpendPkHash(sig, _) => vec![*sig],
            SimpleInput::SpendMulSig(sigs) => sigs.clone(),
        }
    }

    fn push_onto(&self, builder: Builder) -> Result<Builder> {
        let builder = match self {
            SimpleInput::SpendPk(sig) => builder.push_slice(sig.to_push()?),
            SimpleInput::SpendPkHash(sig, key) => builder.push_slice(sig.to_push()?).push_key(key),
            SimpleInput::SpendMulSig(sigs) => {
                let mut builder = builder.push_opcode(OP_0);
                for sig in sigs {
                    builder = builder.push_slice(sig.to_push()?);
                }
                builder
            }
        };
        Ok(builder)
    }

    fn from_pushes(pushes: &[&[u8]]) -> Option<Self> {
        match pushes {
            [sig] => TxSignature::from_push(sig).ok().map(SimpleInput::SpendPk),
            [sig, key] if PublicKey::from_slice(key).is_ok() => Some(SimpleInput::SpendPkHash(
                TxSignature::from_push(sig).ok()?,
                PublicKey::from_slice(key).ok()?,
            )),
            [dummy, sigs @ ..] if dummy.is_empty() && !sigs.is_empty() => sigs
                .iter()
                .map(|sig| TxSignature::from_push(sig).ok())
                .collect::<Option<Vec<_>>>()
                .map(SimpleInput::SpendMulSig),
            _ => None,
        }
    }

    /// Decodes pushes that must satisfy `redeem`.
    fn from_pushes_for(redeem: &ScriptOutput, pushes: &[&[u8]]) -> Option<Self> {
        let input = Self::from_pushes(pushes)?;
        let matches = match (redeem, &input) {
            (ScriptOutput::PayPk(_), SimpleInput::SpendPk(_)) => true,
            (ScriptOutput::PayPkHash(hash), SimpleInput::SpendPkHash(_, key)) => {
                key.pubkey_hash() == *hash
            }
            (ScriptOutput::PayMulSig { .. }, SimpleInput::SpendMulSig(_)) => true,
            _ => false,
        };
        matches.then_some(input)
    }
}

/// Input script descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptInput {
    Regular(SimpleInput),
    ScriptHash {
        input: SimpleInput,
        redeem: ScriptOutput,
    },
}

impl ScriptInput {
    pub fn simple_input(&self) -> &SimpleInput {
        match self {
            ScriptInput::Regular(input) | ScriptInput::ScriptHash { input, .. } => input,
        }
    }

    pub fn to_script(&self) -> Result<ScriptBuf> {
        let builder = self.simple_input().push_onto(Builder::new())?;
        let builder = match self {
            ScriptInput::Regular(_) => builder,
            ScriptInput::ScriptHash { redeem, .. } => {
                builder.push_slice(PushBytesBuf::try_from(redeem.to_script().into_bytes())?)
            }
        };
        Ok(builder.into_script())
    }

    pub fn from_script(script: &Script) -> Result<Self> {
        let instructions = script.instructions().collect::<Result<Vec<_>, _>>()?;
        let pushes = instructions
            .iter()
            .map(|instruction| match instruction {
                Instruction::PushBytes(bytes) => Some(bytes.as_bytes()),
                Instruction::Op(_) => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::UnknownScript(script.to_hex_string()))?;

        if let Some((last, rest)) = pushes.split_last() {
            if let Ok(redeem) = ScriptOutput::from_script(Script::from_bytes(last)) {
                if let Some(input) = SimpleInput::from_pushes_for(&redeem, rest) {
                    return Ok(ScriptInput::ScriptHash { input, redeem });
                }
            }
        }

        SimpleInput::from_pushes(&pushes)
            .map(ScriptInput::Regular)
            .ok_or_else(|| Error::UnknownScript(script.to_hex_string()))
    }
}
