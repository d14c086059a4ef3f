// Key generation configuration
// Builder-style settings consumed by KeyGenerator

use crate::rsa::prime::BitLengthPolicy;
use crate::rsa::primality::DEFAULT_ROUNDS;

/// First public exponent tried: 2^16 + 1
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// Configuration for key generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenConfig {
    /// Miller-Rabin rounds per candidate
    pub rounds: u32,
    /// Width handling for each prime
    pub bit_policy: BitLengthPolicy,
    /// Search start for the public exponent
    pub first_exponent: u64,
    /// Fixed seed for reproducible keys; `None` draws fresh entropy per prime
    pub seed: Option<u64>,
    /// Generate p and q concurrently. Without the `parallel` feature this
    /// falls back to sequential generation and logs a warning.
    pub parallel: bool,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            bit_policy: BitLengthPolicy::SignMasked,
            first_exponent: DEFAULT_PUBLIC_EXPONENT,
            seed: None,
            parallel: false,
        }
    }
}

impl KeyGenConfig {
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_bit_policy(mut self, policy: BitLengthPolicy) -> Self {
        self.bit_policy = policy;
        self
    }

    pub fn with_first_exponent(mut self, exponent: u64) -> Self {
        self.first_exponent = exponent;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeyGenConfig::default();
        assert_eq!(config.rounds, 10);
        assert_eq!(config.first_exponent, 65537);
        assert_eq!(config.bit_policy, BitLengthPolicy::SignMasked);
        assert!(config.seed.is_none());
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder() {
        let config = KeyGenConfig::default()
            .with_rounds(20)
            .with_seed(7)
            .with_bit_policy(BitLengthPolicy::Exact)
            .with_first_exponent(3)
            .with_parallel(true);
        assert_eq!(config.rounds, 20);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.bit_policy, BitLengthPolicy::Exact);
        assert_eq!(config.first_exponent, 3);
        assert!(config.parallel);
    }
}
