//! Error types for the RSA core.
//!
//! Every failure here is a local, deterministic logic error: the same inputs
//! and the same random state always produce the same error. Nothing is
//! retried internally.

use thiserror::Error;

/// Error type for all RSA operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RsaError {
    /// `next_int` was asked for an empty or inverted range
    #[error("invalid random range: min {min} must be less than max {max}")]
    InvalidRange { min: i64, max: i64 },

    /// Repeated primes, or phi(n) too small to invert the public exponent against
    #[error("degenerate modulus: primes must be distinct and phi(n) greater than 1")]
    DegenerateModulus,

    /// A block's integer value is not below the modulus
    #[error("block value exceeds the modulus")]
    BlockOverflow,

    /// A prime bit length too small to fill a single byte
    #[error("prime bit length {bits} is below the minimum of {min}")]
    InvalidBitLength { bits: u32, min: u32 },

    /// A key size too small to hold two usable primes
    #[error("key size {bits} bits is below the minimum of {min}")]
    KeySizeTooSmall { bits: u32, min: u32 },

    /// The modulus leaves no room for payload after the reserved margin
    #[error("modulus of {bytes} bytes is too small for segmented encryption")]
    ModulusTooSmall { bytes: usize },

    /// Ciphertext is not a whole number of modulus-sized blocks
    #[error("ciphertext length {len} is not a multiple of the block size {block}")]
    InvalidCiphertextLength { len: usize, block: usize },

    /// A big-integer sampling range with `low > high`
    #[error("empty sampling range: low exceeds high")]
    EmptyRange,

    /// No modular inverse exists for the given operands
    #[error("no modular inverse exists")]
    NoInverse,

    /// Key text could not be parsed
    #[error("malformed key text: {0}")]
    KeyFormat(String),
}

/// Result type alias for RSA operations.
pub type Result<T> = std::result::Result<T, RsaError>;
