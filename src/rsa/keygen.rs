// RSA Key Generation
// Builds (n, e, d) from two independently drawn probable primes

use std::fmt;

use num_traits::One;
use tracing::{debug, info};

use super::bigint::{bit_length, from_u64, gcd, mod_inverse, mod_pow, RsaBigInt};
use super::prime::{generate_prime, MIN_PRIME_BITS};
use super::random::{RandomSource, XorShiftSource};
use crate::config::KeyGenConfig;
use crate::error::{Result, RsaError};

/// Smallest key size accepted: room for two minimum-width primes
pub const MIN_KEY_BITS: u32 = 2 * MIN_PRIME_BITS;

/// Mixed into a fixed seed to give q its own stream
const Q_SEED_TWEAK: u64 = 0xD1B5_4A32_D192_ED03;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    n: RsaBigInt,
    e: RsaBigInt,
}

/// RSA Private Key
///
/// Holds secret material. Keep its lifetime short; the exponent is not
/// zeroized when the value is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    n: RsaBigInt,
    d: RsaBigInt,
}

/// RSA Key Pair
///
/// Invariants: `n = p * q` for two probable primes, `gcd(e, phi) = 1` and
/// `e * d ≡ 1 (mod phi)` with `phi = (p - 1)(q - 1)`. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    n: RsaBigInt,
    e: RsaBigInt,
    d: RsaBigInt,
}

impl RsaPublicKey {
    pub fn new(n: RsaBigInt, e: RsaBigInt) -> Self {
        Self { n, e }
    }

    pub fn modulus(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn public_exponent(&self) -> &RsaBigInt {
        &self.e
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        bit_length(&self.n)
    }

    /// `m^e mod n`; the message must already be below the modulus
    pub fn encrypt_int(&self, m: &RsaBigInt) -> Result<RsaBigInt> {
        apply_exponent(m, &self.e, &self.n)
    }

    /// Textbook verification is the same public-exponent operation
    pub fn verify_int(&self, s: &RsaBigInt) -> Result<RsaBigInt> {
        self.encrypt_int(s)
    }
}

impl RsaPrivateKey {
    pub fn new(n: RsaBigInt, d: RsaBigInt) -> Self {
        Self { n, d }
    }

    pub fn modulus(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn private_exponent(&self) -> &RsaBigInt {
        &self.d
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        bit_length(&self.n)
    }

    /// `c^d mod n`; the ciphertext must be below the modulus
    pub fn decrypt_int(&self, c: &RsaBigInt) -> Result<RsaBigInt> {
        apply_exponent(c, &self.d, &self.n)
    }

    /// Textbook signing is the same private-exponent operation
    pub fn sign_int(&self, m: &RsaBigInt) -> Result<RsaBigInt> {
        self.decrypt_int(m)
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("n", &self.n)
            .field("d", &"[redacted]")
            .finish()
    }
}

impl RsaKeyPair {
    /// Assemble a keypair from known components. No consistency check is made.
    pub fn from_components(n: RsaBigInt, e: RsaBigInt, d: RsaBigInt) -> Self {
        Self { n, e, d }
    }

    pub fn modulus(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn public_exponent(&self) -> &RsaBigInt {
        &self.e
    }

    pub fn private_exponent(&self) -> &RsaBigInt {
        &self.d
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        bit_length(&self.n)
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::new(self.n.clone(), self.e.clone())
    }

    pub fn private_key(&self) -> RsaPrivateKey {
        RsaPrivateKey::new(self.n.clone(), self.d.clone())
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("n", &self.n)
            .field("e", &self.e)
            .field("d", &"[redacted]")
            .finish()
    }
}

fn apply_exponent(value: &RsaBigInt, exp: &RsaBigInt, n: &RsaBigInt) -> Result<RsaBigInt> {
    if value >= n {
        return Err(RsaError::BlockOverflow);
    }
    Ok(mod_pow(value, exp, n))
}

/// Smallest exponent `>= start` coprime to phi, with the number of increments taken.
pub fn choose_public_exponent(phi: &RsaBigInt, start: u64) -> (RsaBigInt, u64) {
    let mut e = from_u64(start);
    let mut steps = 0u64;
    while !gcd(&e, phi).is_one() {
        e += 1u8;
        steps += 1;
    }
    (e, steps)
}

/// Turn two primes into a keypair.
///
/// `DegenerateModulus` is returned when `p == q` (phi(p^2) is `p(p - 1)`,
/// not `(p - 1)^2`) or when `phi(n) <= 1`.
pub fn keypair_from_primes(
    p: &RsaBigInt,
    q: &RsaBigInt,
    first_exponent: u64,
) -> Result<RsaKeyPair> {
    if p <= &RsaBigInt::one() || q <= &RsaBigInt::one() || p == q {
        return Err(RsaError::DegenerateModulus);
    }

    let n = p * q;
    let phi = (p - 1u8) * (q - 1u8);
    if phi <= RsaBigInt::one() {
        return Err(RsaError::DegenerateModulus);
    }

    let (e, steps) = choose_public_exponent(&phi, first_exponent);
    debug!(e = %e, steps, "public exponent chosen");

    let d = mod_inverse(&e, &phi)?;

    Ok(RsaKeyPair { n, e, d })
}

/// Orchestrates two prime draws into a full keypair.
#[derive(Clone, Debug, Default)]
pub struct KeyGenerator {
    config: KeyGenConfig,
}

impl KeyGenerator {
    pub fn new(config: KeyGenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KeyGenConfig {
        &self.config
    }

    /// Generate a keypair whose modulus is built from two `key_size_bits / 2`
    /// bit primes, each drawn from its own freshly seeded xorshift source.
    ///
    /// With a configured seed the result is reproducible; otherwise each
    /// source is seeded from OS entropy mixed with the clock at the call.
    pub fn generate_keypair(&self, key_size_bits: u32) -> Result<RsaKeyPair> {
        let (p_source, q_source) = match self.config.seed {
            Some(seed) => (
                XorShiftSource::new(seed),
                XorShiftSource::new(seed.rotate_left(32) ^ Q_SEED_TWEAK),
            ),
            None => (XorShiftSource::from_entropy(), XorShiftSource::from_entropy()),
        };

        if self.config.parallel {
            return self.generate_keypair_parallel(key_size_bits, p_source, q_source);
        }

        let (mut p_source, mut q_source) = (p_source, q_source);
        self.generate_keypair_with(key_size_bits, &mut p_source, &mut q_source)
    }

    /// Generate a keypair drawing p and q from caller-supplied sources.
    ///
    /// This is where a cryptographically secure source such as
    /// [`OsSource`](super::random::OsSource) is plugged in.
    pub fn generate_keypair_with<P, Q>(
        &self,
        key_size_bits: u32,
        p_source: &mut P,
        q_source: &mut Q,
    ) -> Result<RsaKeyPair>
    where
        P: RandomSource,
        Q: RandomSource,
    {
        let half_bits = self.half_bits(key_size_bits)?;

        let p = self.prime(half_bits, p_source)?;
        let q = self.distinct_prime(half_bits, &p, q_source)?;

        self.finish(key_size_bits, &p, &q)
    }

    #[cfg(feature = "parallel")]
    fn generate_keypair_parallel(
        &self,
        key_size_bits: u32,
        mut p_source: XorShiftSource,
        mut q_source: XorShiftSource,
    ) -> Result<RsaKeyPair> {
        let half_bits = self.half_bits(key_size_bits)?;

        // each branch owns its source outright
        let (p, q) = rayon::join(
            || self.prime(half_bits, &mut p_source),
            || self.prime(half_bits, &mut q_source),
        );
        let p = p?;
        let mut q = q?;
        if q == p {
            q = self.distinct_prime(half_bits, &p, &mut q_source)?;
        }

        self.finish(key_size_bits, &p, &q)
    }

    #[cfg(not(feature = "parallel"))]
    fn generate_keypair_parallel(
        &self,
        key_size_bits: u32,
        mut p_source: XorShiftSource,
        mut q_source: XorShiftSource,
    ) -> Result<RsaKeyPair> {
        tracing::warn!(
            "parallel key generation requested without the `parallel` feature, generating sequentially"
        );
        self.generate_keypair_with(key_size_bits, &mut p_source, &mut q_source)
    }

    fn half_bits(&self, key_size_bits: u32) -> Result<u32> {
        if key_size_bits < MIN_KEY_BITS {
            return Err(RsaError::KeySizeTooSmall {
                bits: key_size_bits,
                min: MIN_KEY_BITS,
            });
        }
        Ok(key_size_bits / 2)
    }

    fn prime<R: RandomSource>(&self, bits: u32, source: &mut R) -> Result<RsaBigInt> {
        generate_prime(bits, self.config.rounds, self.config.bit_policy, source)
    }

    /// Draw from `source` until the prime differs from `other`
    fn distinct_prime<R: RandomSource>(
        &self,
        bits: u32,
        other: &RsaBigInt,
        source: &mut R,
    ) -> Result<RsaBigInt> {
        loop {
            let q = self.prime(bits, source)?;
            if &q != other {
                return Ok(q);
            }
            debug!("second prime equals the first, redrawing");
        }
    }

    fn finish(&self, key_size_bits: u32, p: &RsaBigInt, q: &RsaBigInt) -> Result<RsaKeyPair> {
        let keypair = keypair_from_primes(p, q, self.config.first_exponent)?;
        info!(
            requested_bits = key_size_bits,
            modulus_bits = keypair.bit_length(),
            "RSA key pair generated"
        );
        Ok(keypair)
    }
}

/// Generate RSA key pair with default settings
pub fn generate_keypair(key_size_bits: u32) -> Result<RsaKeyPair> {
    KeyGenerator::default().generate_keypair(key_size_bits)
}
