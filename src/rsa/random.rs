// Pseudo-random sources for prime generation
// A seeded xorshift generator plus an OS-backed source behind the same trait

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

use crate::error::{Result, RsaError};

/// Odd multiplier applied to the xorshift state to produce each output
const OUTPUT_MULTIPLIER: u64 = 2_685_821_657_736_338_717;

/// Xorshift never leaves the all-zero state, so a zero seed is replaced
const ZERO_SEED_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Map a full-width 64-bit draw onto `[0, width)` with a widening multiply.
fn scale(value: u64, width: u64) -> u64 {
    ((value as u128 * width as u128) >> 64) as u64
}

/// Contract shared by every random source the prime engine can draw from.
///
/// Sources are stateful: each call mutates the state. A source must be owned
/// by exactly one task at a time; concurrent work needs one source per task.
pub trait RandomSource {
    /// Next raw 64-bit output
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `[min, max)`
    fn next_int(&mut self, min: i64, max: i64) -> Result<i64> {
        if min >= max {
            return Err(RsaError::InvalidRange { min, max });
        }
        let width = max.wrapping_sub(min) as u64;
        let offset = scale(self.next_u64(), width);
        Ok(min.wrapping_add(offset as i64))
    }

    /// Fill `dest`, each byte drawn independently as `next_int(0, 256)`
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = scale(self.next_u64(), 256) as u8;
        }
    }

    /// `len` fresh random bytes
    fn next_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.fill_bytes(&mut bytes);
        bytes
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        (**self).fill_bytes(dest)
    }
}

/// Seedable xorshift generator.
///
/// NOT cryptographically secure: the whole stream is determined by a single
/// 64-bit seed. Keys meant to protect anything should be generated from
/// [`OsSource`] via `KeyGenerator::generate_keypair_with`.
#[derive(Debug, Clone)]
pub struct XorShiftSource {
    state: u64,
}

impl XorShiftSource {
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed };
        Self { state }
    }

    /// Fresh generator seeded from [`entropy_seed`]
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }
}

impl RandomSource for XorShiftSource {
    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(OUTPUT_MULTIPLIER)
    }
}

/// Source backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSource;

impl RandomSource for OsSource {
    fn next_u64(&mut self) -> u64 {
        OsRng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest)
    }
}

/// Seed derived from OS entropy mixed with the wall clock.
///
/// The clock alone is not enough: two primes drawn within the same tick
/// would share a stream.
pub fn entropy_seed() -> u64 {
    let ticks = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut buf = [0u8; 8];
    let os = match OsRng.try_fill_bytes(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            warn!(error = %e, "OS entropy unavailable, seeding from the clock alone");
            0
        }
    };

    os ^ ticks
}
