use proptest::strategy::{Strategy, ValueTree};
use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner};

use crate::config::Config;
use crate::error::{Error, Result};

/// Draws fixtures outside of `proptest!`, from a ChaCha stream fixed by a
/// 32 byte seed. Runners never share state, so equal seeds give equal fixtures.
pub struct FixtureRunner {
    runner: TestRunner,
    seed: [u8; 32],
}

impl FixtureRunner {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::with_config(ProptestConfig::default(), seed)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_config(config.proptest_config(), config.seed()?))
    }

    fn with_config(config: ProptestConfig, seed: [u8; 32]) -> Self {
        let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &seed);
        Self {
            runner: TestRunner::new_with_rng(config, rng),
            seed,
        }
    }

    pub fn seed(&self) -> [u8; 32] {
        self.seed
    }

    pub fn generate<S: Strategy>(&mut self, strategy: &S) -> Result<S::Value> {
        let tree = strategy
            .new_tree(&mut self.runner)
            .map_err(|reason| Error::Generation(format!("{:?}", reason)))?;
        Ok(tree.current())
    }
}
