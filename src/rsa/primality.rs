// Miller-Rabin primality testing
// Probabilistic compositeness test driven by witnesses drawn from a RandomSource

use num_integer::Integer;
use num_traits::{One, Zero};

use super::bigint::{from_u64, mod_pow, random_in_range, RsaBigInt};
use super::random::RandomSource;

/// Rounds used for key generation unless the caller asks otherwise.
///
/// Each round lets a composite through with probability at most 1/4, so ten
/// rounds bound the false-positive rate by 4^-10 (under one in a million).
pub const DEFAULT_ROUNDS: u32 = 10;

/// Outcome of a single witness round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primality {
    ProbablyPrime,
    Composite,
}

impl Primality {
    pub fn is_probably_prime(&self) -> bool {
        matches!(self, Self::ProbablyPrime)
    }
}

/// `n - 1 = d * 2^s` with `d` odd, precomputed once per candidate.
#[derive(Debug, Clone)]
pub struct MillerRabin<'a> {
    candidate: &'a RsaBigInt,
    minus_one: RsaBigInt,
    d: RsaBigInt,
    s: u64,
}

impl<'a> MillerRabin<'a> {
    /// Decompose `candidate - 1`.
    ///
    /// Returns `None` unless the candidate is odd and at least 5, the smallest
    /// value with a non-empty witness range `[2, n-2]`.
    pub fn new(candidate: &'a RsaBigInt) -> Option<Self> {
        if candidate < &from_u64(5) || candidate.is_even() {
            return None;
        }

        let minus_one = candidate - 1u8;
        let mut d = minus_one.clone();
        let mut s = 0u64;
        while d.is_even() && !d.is_zero() {
            d >>= 1;
            s += 1;
        }

        Some(Self {
            candidate,
            minus_one,
            d,
            s,
        })
    }

    /// One round with witness `a`, assumed in `[2, n-2]`.
    pub fn test_once(&self, a: &RsaBigInt) -> Primality {
        let two = from_u64(2);
        let mut x = mod_pow(a, &self.d, self.candidate);

        if x.is_one() || x == self.minus_one {
            return Primality::ProbablyPrime;
        }

        for _ in 1..self.s {
            x = mod_pow(&x, &two, self.candidate);
            if x == self.minus_one {
                return Primality::ProbablyPrime;
            }
            if x.is_one() {
                // 1 can only square to 1, so n-1 will never show up
                return Primality::Composite;
            }
        }

        Primality::Composite
    }

    /// Run `rounds` rounds with witnesses drawn uniformly from `[2, n-2]`,
    /// stopping at the first round that proves the candidate composite.
    pub fn run<R: RandomSource>(&self, rounds: u32, source: &mut R) -> bool {
        let low = from_u64(2);
        let high = self.candidate - 2u8;

        for _ in 0..rounds {
            let Ok(a) = random_in_range(source, &low, &high) else {
                return false;
            };
            if !self.test_once(&a).is_probably_prime() {
                return false;
            }
        }

        true
    }
}

/// Miller-Rabin test
/// Returns true if n is probably prime after `rounds` witness rounds
pub fn is_probable_prime<R: RandomSource>(n: &RsaBigInt, rounds: u32, source: &mut R) -> bool {
    if n <= &from_u64(1) {
        return false;
    }
    if n == &from_u64(2) || n == &from_u64(3) {
        return true;
    }

    MillerRabin::new(n).map_or(false, |test| test.run(rounds, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::random::XorShiftSource;

    fn trial_division(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        let mut i = 2;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    #[test]
    fn test_is_probable_prime_small() {
        let mut source = XorShiftSource::new(1);
        assert!(!is_probable_prime(&from_u64(0), DEFAULT_ROUNDS, &mut source));
        assert!(!is_probable_prime(&from_u64(1), DEFAULT_ROUNDS, &mut source));
        assert!(is_probable_prime(&from_u64(2), DEFAULT_ROUNDS, &mut source));
        assert!(is_probable_prime(&from_u64(3), DEFAULT_ROUNDS, &mut source));
        assert!(!is_probable_prime(&from_u64(4), DEFAULT_ROUNDS, &mut source));
        assert!(is_probable_prime(&from_u64(5), DEFAULT_ROUNDS, &mut source));
        assert!(is_probable_prime(&from_u64(7), DEFAULT_ROUNDS, &mut source));
        assert!(!is_probable_prime(&from_u64(9), DEFAULT_ROUNDS, &mut source));
    }

    #[test]
    fn test_primes_below_ten_thousand() {
        let mut source = XorShiftSource::new(0x5EED);
        for n in 0..10_000u64 {
            if trial_division(n) {
                assert!(
                    is_probable_prime(&from_u64(n), DEFAULT_ROUNDS, &mut source),
                    "{} is prime",
                    n
                );
            }
        }
    }

    #[test]
    fn test_composites_below_ten_thousand() {
        let mut source = XorShiftSource::new(0xC0FFEE);
        let mut false_positives = 0;
        for n in 0..10_000u64 {
            if !trial_division(n) && is_probable_prime(&from_u64(n), DEFAULT_ROUNDS, &mut source) {
                false_positives += 1;
            }
        }
        // ~8770 composites at 4^-10 each: expectation is far below one
        assert!(false_positives <= 1, "{} false positives", false_positives);
    }

    #[test]
    fn test_carmichael_numbers() {
        let mut source = XorShiftSource::new(561);
        for carmichael in [561u64, 1105, 1729, 2465, 2821, 6601, 8911] {
            let n = from_u64(carmichael);
            let passes = (0..50)
                .filter(|_| is_probable_prime(&n, DEFAULT_ROUNDS, &mut source))
                .count();
            assert_eq!(passes, 0, "{} passed {} times", carmichael, passes);
        }
    }

    #[test]
    fn test_zero_rounds_accepts_odd_candidates() {
        let mut source = XorShiftSource::new(9);
        assert!(is_probable_prime(&from_u64(561), 0, &mut source));
    }

    #[test]
    fn test_single_round_witnesses() {
        // 2 is a strong liar for 2047 = 23 * 89, 3 is not
        let n = from_u64(2047);
        let test = MillerRabin::new(&n).unwrap();
        assert_eq!(test.test_once(&from_u64(2)), Primality::ProbablyPrime);
        assert_eq!(test.test_once(&from_u64(3)), Primality::Composite);
    }

    #[test]
    fn test_large_known_values() {
        let mut source = XorShiftSource::new(11);
        // 2^61 - 1 is a Mersenne prime, 2^67 - 1 = 193707721 * 761838257287
        let m61 = (from_u64(1) << 61u32) - 1u8;
        let m67 = (from_u64(1) << 67u32) - 1u8;
        assert!(is_probable_prime(&m61, DEFAULT_ROUNDS, &mut source));
        assert!(!is_probable_prime(&m67, DEFAULT_ROUNDS, &mut source));
    }

    #[test]
    fn test_decomposition_needs_odd_candidate_from_five() {
        for n in [0u64, 1, 2, 3, 4, 6, 100] {
            assert!(MillerRabin::new(&from_u64(n)).is_none(), "{}", n);
        }
        let mut source = XorShiftSource::new(5);
        let five = from_u64(5);
        assert!(MillerRabin::new(&five).unwrap().run(DEFAULT_ROUNDS, &mut source));
    }

    #[test]
    fn test_even_numbers_rejected() {
        let mut source = XorShiftSource::new(2);
        for n in (6..200u64).step_by(2) {
            assert!(!is_probable_prime(&from_u64(n), DEFAULT_ROUNDS, &mut source));
        }
    }
}
