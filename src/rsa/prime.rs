// Random prime generation
// Draws odd candidates of a target width and keeps the first that passes Miller-Rabin

use tracing::debug;

use super::bigint::{from_bytes_le, RsaBigInt};
use super::primality::{is_probable_prime, DEFAULT_ROUNDS};
use super::random::RandomSource;
use crate::error::{Result, RsaError};

/// Smallest prime width accepted; anything narrower has no byte to draw.
pub const MIN_PRIME_BITS: u32 = 8;

/// How a candidate's width relates to the requested bit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitLengthPolicy {
    /// `bits / 8` random bytes with the top byte's high bit cleared.
    ///
    /// The high bit is cleared but no bit is forced on, so the prime may be
    /// several bits shorter than requested (at most `bits - 1` significant
    /// bits, and `bits % 8` requested bits are dropped outright). A key built
    /// from two such primes can be a few bits narrower than its nominal size.
    #[default]
    SignMasked,
    /// Exactly `bits` significant bits: the top bit is forced on.
    Exact,
}

/// One odd, non-negative candidate drawn from `source`.
///
/// Fails with `InvalidBitLength` below `MIN_PRIME_BITS`.
pub fn random_candidate<R: RandomSource>(
    bits: u32,
    policy: BitLengthPolicy,
    source: &mut R,
) -> Result<RsaBigInt> {
    if bits < MIN_PRIME_BITS {
        return Err(RsaError::InvalidBitLength {
            bits,
            min: MIN_PRIME_BITS,
        });
    }

    let mut bytes = match policy {
        BitLengthPolicy::SignMasked => {
            let mut bytes = source.next_bytes((bits / 8) as usize);
            if let Some(top) = bytes.last_mut() {
                *top &= 0x7F;
            }
            bytes
        }
        BitLengthPolicy::Exact => {
            let mut bytes = source.next_bytes(((bits + 7) / 8) as usize);
            let top_bit = (bits - 1) % 8;
            if let Some(top) = bytes.last_mut() {
                *top &= ((1u16 << (top_bit + 1)) - 1) as u8;
                *top |= 1 << top_bit;
            }
            bytes
        }
    };

    if let Some(low) = bytes.first_mut() {
        *low |= 1;
    }

    Ok(from_bytes_le(&bytes))
}

/// Generate a probable prime of `bits` width (subject to `policy`).
///
/// Loops until a candidate passes; there is no iteration cap. Callers that
/// need a deadline must run this on a worker they can abandon.
pub fn generate_prime<R: RandomSource>(
    bits: u32,
    rounds: u32,
    policy: BitLengthPolicy,
    source: &mut R,
) -> Result<RsaBigInt> {
    let mut candidates = 0u64;
    loop {
        candidates += 1;
        let candidate = random_candidate(bits, policy, source)?;
        if is_probable_prime(&candidate, rounds, source) {
            debug!(bits, candidates, significant_bits = candidate.bits(), "prime found");
            return Ok(candidate);
        }
    }
}

/// Prime generator owning its random source.
#[derive(Debug, Clone)]
pub struct PrimeGenerator<R: RandomSource> {
    source: R,
    rounds: u32,
    policy: BitLengthPolicy,
}

impl<R: RandomSource> PrimeGenerator<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            rounds: DEFAULT_ROUNDS,
            policy: BitLengthPolicy::default(),
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_policy(mut self, policy: BitLengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn policy(&self) -> BitLengthPolicy {
        self.policy
    }

    pub fn generate_prime(&mut self, bits: u32) -> Result<RsaBigInt> {
        generate_prime(bits, self.rounds, self.policy, &mut self.source)
    }

    /// Give the source back, e.g. to hand it to another task
    pub fn into_source(self) -> R {
        self.source
    }
}
