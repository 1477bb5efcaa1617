use bitcoin::Network;
use clap::Parser;
use proptest::test_runner::Config as ProptestConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chain::ChainParams;
use crate::error::Result;
use crate::logging;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(
    name = "tx-arbitrary",
    version = "0.1.0",
    about = "Constrained-random Bitcoin fixtures"
)]
pub struct Config {
    #[clap(
        long,
        env = "LOG_FORMAT",
        help = "Log format (plain, json)",
        default_value = "plain"
    )]
    pub log_format: logging::Format,

    #[clap(
        long,
        env = "FIXTURE_NETWORK",
        help = "Network the fixtures are generated for",
        default_value = "regtest"
    )]
    pub network: Network,

    #[clap(
        long,
        env = "FIXTURE_CASES",
        help = "Number of cases per property",
        default_value = "64"
    )]
    pub cases: u32,

    #[clap(
        long,
        env = "FIXTURE_SEED",
        help = "Hex encoded 32 byte seed for reproducible fixtures"
    )]
    pub seed: Option<String>,
}

impl Config {
    /// Reads the environment only; command line arguments belong to the test
    /// harness.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::try_parse_from(["tx-arbitrary"])?)
    }

    pub fn chain_params(&self) -> ChainParams {
        ChainParams::new(self.network)
    }

    pub fn proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            failure_persistence: None,
            ..ProptestConfig::default()
        }
    }

    /// The configured seed, or a fresh random one.
    pub fn seed(&self) -> Result<[u8; 32]> {
        match &self.seed {
            Some(seed) => {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(seed, &mut bytes)?;
                Ok(bytes)
            }
            None => Ok(rand::rng().random()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: Option<&str>) -> Config {
        Config {
            log_format: logging::Format::Plain,
            network: Network::Regtest,
            cases: 8,
            seed: seed.map(str::to_string),
        }
    }

    #[test]
    fn test_seed_from_hex() {
        let seed = "07".repeat(32);
        assert_eq!(config(Some(&seed)).seed().unwrap(), [7u8; 32]);
    }

    #[test]
    fn test_seed_rejects_short_hex() {
        assert!(config(Some("0707")).seed().is_err());
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::try_parse_from(["tx-arbitrary", "--network", "signet"]).unwrap();
        assert_eq!(config.network, Network::Signet);
        assert_eq!(config.proptest_config().cases, config.cases);
        assert!(config.proptest_config().failure_persistence.is_none());
        assert_eq!(config.chain_params().network(), Network::Signet);
    }
}
