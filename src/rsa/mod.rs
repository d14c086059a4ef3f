// RSA Module - Main module file
// Exports the prime engine, key construction and block cipher

pub mod bigint;
pub mod cipher;
pub mod keygen;
pub mod pem;
pub mod primality;
pub mod prime;
pub mod random;

pub use cipher::{BlockMode, BlockSizes, RsaCipher, RESERVED_BLOCK_BYTES};
pub use keygen::{generate_keypair, KeyGenerator, RsaKeyPair, RsaPrivateKey, RsaPublicKey, MIN_KEY_BITS};
pub use primality::{is_probable_prime, DEFAULT_ROUNDS};
pub use prime::{generate_prime, BitLengthPolicy, PrimeGenerator};
pub use random::{OsSource, RandomSource, XorShiftSource};
