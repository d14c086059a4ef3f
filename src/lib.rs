//! Textbook RSA built from first principles.
//!
//! The numeric core is a seeded pseudo-random source feeding a Miller-Rabin
//! prime generator, which in turn feeds key construction; the resulting
//! keypair drives a block-wise modpow cipher.
//!
//! This is not a hardened implementation. Nothing is constant-time, no
//! OAEP/PSS padding is applied, and the default [`XorShiftSource`] is not
//! cryptographically secure. Substitute [`OsSource`] through
//! [`KeyGenerator::generate_keypair_with`] when keys must resist attack.
//!
//! ```no_run
//! use textbook_rsa::{generate_keypair, RsaCipher};
//!
//! let keypair = generate_keypair(512)?;
//! let cipher = RsaCipher::default();
//! let ciphertext = cipher.encrypt(b"hello", &keypair.public_key())?;
//! let plaintext = cipher.decrypt(&ciphertext, &keypair.private_key())?;
//! assert_eq!(plaintext, b"hello");
//! # Ok::<(), textbook_rsa::RsaError>(())
//! ```

pub mod config;
pub mod error;
pub mod rsa;

pub use config::KeyGenConfig;
pub use error::{Result, RsaError};
pub use rsa::{
    generate_keypair, generate_prime, is_probable_prime, BitLengthPolicy, BlockMode, KeyGenerator,
    OsSource, PrimeGenerator, RandomSource, RsaCipher, RsaKeyPair, RsaPrivateKey, RsaPublicKey,
    XorShiftSource, DEFAULT_ROUNDS,
};
