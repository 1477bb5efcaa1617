use bitcoin::OutPoint;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Outpoint {0} is not spent by any transaction input")]
    OutPointNotFound(OutPoint),
    #[error("Sighash flag {0} is not valid on this chain")]
    InvalidSigHash(bitcoin::EcdsaSighashType),
    #[error("No private key satisfies script: {0}")]
    MissingKey(String),
    #[error("Script hash output spent without a redeem script")]
    MissingRedeem,
    #[error("Redeem script may not be another script hash")]
    NestedScriptHash,
    #[error("Redeem script does not hash to the spent script hash")]
    RedeemMismatch,
    #[error("Script cannot be signed: {0}")]
    UnsupportedScript(String),
    #[error("Unrecognized script: {0}")]
    UnknownScript(String),
    #[error("Chain parameters are invalid: {0}")]
    InvalidChainParams(String),
    #[error("Fixture generation failed: {0}")]
    Generation(String),
    #[error("Script parse error: {0}")]
    Script(#[from] bitcoin::script::Error),
    #[error("Push too large: {0}")]
    PushBytes(#[from] bitcoin::script::PushBytesError),
    #[error("Signature decode error: {0}")]
    Signature(#[from] bitcoin::ecdsa::Error),
    #[error("Public key decode error: {0}")]
    PublicKey(#[from] bitcoin::key::FromSliceError),
    #[error("Sighash input index error: {0}")]
    InputsIndex(#[from] bitcoin::transaction::InputsIndexError),
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
