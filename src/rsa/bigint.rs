// RSA Big Integer Operations
// Wrapper around num-bigint fixing the byte-order and sign conventions of the core

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::random::RandomSource;
use crate::error::{Result, RsaError};

/// RSA Big Integer type alias
///
/// Unsigned throughout: every value the core handles is non-negative, so no
/// sign byte ever appears in a byte encoding.
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (little-endian, least significant byte first)
pub fn from_bytes_le(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_le(bytes)
}

/// Convert big integer to its minimal little-endian bytes
///
/// Zero encodes as the empty slice.
pub fn to_bytes_le(n: &RsaBigInt) -> Vec<u8> {
    if n.is_zero() {
        return Vec::new();
    }
    n.to_bytes_le()
}

/// Little-endian bytes zero-extended to exactly `width` bytes.
///
/// Returns `BlockOverflow` if the value needs more than `width` bytes.
pub fn to_bytes_le_padded(n: &RsaBigInt, width: usize) -> Result<Vec<u8>> {
    let mut bytes = to_bytes_le(n);
    if bytes.len() > width {
        return Err(RsaError::BlockOverflow);
    }
    bytes.resize(width, 0);
    Ok(bytes)
}

/// Number of significant bits; zero has none.
pub fn bit_length(n: &RsaBigInt) -> u64 {
    n.bits()
}

/// `ceil(bit_length(n) / 8)`
pub fn byte_length(n: &RsaBigInt) -> usize {
    ((bit_length(n) + 7) / 8) as usize
}

/// Modular exponentiation: base^exp mod modulus
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }
    base.modpow(exp, modulus)
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd = gcd(a, b)
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_x, mut x) = (BigInt::one(), BigInt::zero());
    let (mut old_y, mut y) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_x = &old_x - &q * &x;
        old_x = std::mem::replace(&mut x, next_x);

        let next_y = &old_y - &q * &y;
        old_y = std::mem::replace(&mut y, next_y);
    }

    (old_r, old_x, old_y)
}

/// Compute modular inverse: a^(-1) mod m
///
/// A negative Bezout coefficient is normalized by adding `m`.
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Result<RsaBigInt> {
    if m.is_zero() {
        return Err(RsaError::NoInverse);
    }
    if m.is_one() {
        return Ok(RsaBigInt::zero());
    }

    let a_signed = BigInt::from_biguint(Sign::Plus, a % m);
    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let (g, x, _) = extended_gcd(&a_signed, &m_signed);

    if !g.is_one() {
        return Err(RsaError::NoInverse);
    }

    let mut x = x % &m_signed;
    if x.is_negative() {
        x += &m_signed;
    }

    x.to_biguint().ok_or(RsaError::NoInverse)
}

/// Uniform integer in `[low, high]` drawn from `source`.
///
/// Rejection sampling over byte strings as wide as `high`, with the top byte
/// masked down to the bit length of `high` so each draw lands in range with
/// probability at least 1/2. Fails with `EmptyRange` when `low > high`.
pub fn random_in_range<R: RandomSource>(
    source: &mut R,
    low: &RsaBigInt,
    high: &RsaBigInt,
) -> Result<RsaBigInt> {
    if low > high {
        return Err(RsaError::EmptyRange);
    }

    let width = byte_length(high).max(1);
    let top_bits = bit_length(high) % 8;
    let top_mask = if top_bits == 0 { 0xFF } else { (1u8 << top_bits) - 1 };

    let mut bytes = vec![0u8; width];
    loop {
        source.fill_bytes(&mut bytes);
        if let Some(top) = bytes.last_mut() {
            *top &= top_mask;
        }
        let candidate = from_bytes_le(&bytes);
        if &candidate >= low && &candidate <= high {
            return Ok(candidate);
        }
    }
}
