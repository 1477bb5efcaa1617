use bitcoin::{Amount, EcdsaSighashType, Network};
use bon::Builder;

use crate::error::{Error, Result};

/// 21 million coins, in satoshis.
pub const MAX_MONEY: Amount = Amount::from_sat(21_000_000 * 100_000_000);

/// Sighash flags a signer may legitimately produce on a Bitcoin network.
pub const STANDARD_SIGHASH_TYPES: [EcdsaSighashType; 6] = [
    EcdsaSighashType::All,
    EcdsaSighashType::None,
    EcdsaSighashType::Single,
    EcdsaSighashType::AllPlusAnyoneCanPay,
    EcdsaSighashType::NonePlusAnyoneCanPay,
    EcdsaSighashType::SinglePlusAnyoneCanPay,
];

/// Network parameter set the generators draw their bounds from.
///
/// Callers own it and the generators only ever read it. The builder refuses
/// sets the generators cannot draw from.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(finish_fn(name = build_unchecked, vis = ""))]
pub struct ChainParams {
    network: Network,
    #[builder(default = MAX_MONEY)]
    max_supply: Amount,
    #[builder(default = STANDARD_SIGHASH_TYPES.to_vec())]
    sighash_types: Vec<EcdsaSighashType>,
}

impl<S: chain_params_builder::IsComplete> ChainParamsBuilder<S> {
    pub fn build(self) -> Result<ChainParams> {
        self.build_unchecked().validated()
    }
}

impl ChainParams {
    pub fn new(network: Network) -> Self {
        Self::builder().network(network).build_unchecked()
    }

    fn validated(self) -> Result<Self> {
        if self.max_supply == Amount::ZERO {
            return Err(Error::InvalidChainParams(
                "max supply must be at least one satoshi".to_string(),
            ));
        }
        if self.sighash_types.is_empty() {
            return Err(Error::InvalidChainParams(
                "at least one sighash flag is required".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    pub fn valid_sighash_types(&self) -> &[EcdsaSighashType] {
        &self.sighash_types
    }

    pub fn is_valid_sighash(&self, sighash: EcdsaSighashType) -> bool {
        self.sighash_types.contains(&sighash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_standard_flags() {
        let chain = ChainParams::new(Network::Regtest);
        assert_eq!(chain.max_supply().to_sat(), 2_100_000_000_000_000);
        assert_eq!(chain.valid_sighash_types().len(), 6);
        assert!(chain.is_valid_sighash(EcdsaSighashType::SinglePlusAnyoneCanPay));
    }

    #[test]
    fn test_builder_rejects_empty_flag_set() {
        let chain = ChainParams::builder()
            .network(Network::Bitcoin)
            .sighash_types(vec![])
            .build();
        assert!(matches!(chain, Err(Error::InvalidChainParams(_))));
    }

    #[test]
    fn test_builder_rejects_zero_supply() {
        let chain = ChainParams::builder()
            .network(Network::Bitcoin)
            .max_supply(Amount::ZERO)
            .build();
        assert!(matches!(chain, Err(Error::InvalidChainParams(_))));
    }

    #[test]
    fn test_builder_keeps_overrides() {
        let chain = ChainParams::builder()
            .network(Network::Testnet)
            .max_supply(Amount::ONE_SAT)
            .sighash_types(vec![EcdsaSighashType::None])
            .build()
            .unwrap();
        assert_eq!(chain.max_supply(), Amount::ONE_SAT);
        assert_eq!(chain.valid_sighash_types(), &[EcdsaSighashType::None]);
    }
}
