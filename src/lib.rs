pub mod address;
pub mod arbitrary;
pub mod chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod script;
pub mod signer;

pub use chain::ChainParams;
pub use error::{Error, Result};
pub use runner::FixtureRunner;
pub use script::{ScriptInput, ScriptOutput, SimpleInput, TxSignature};
pub use signer::{LegacySigner, SigInput, TxSigner};
