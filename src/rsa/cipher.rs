// RSA Block Cipher
// Textbook modpow over byte payloads, segmented into modulus-sized blocks
//
// Byte order is little-endian throughout: a block's first byte is the least
// significant byte of its integer. No padding scheme is applied; the reserved
// margin below only keeps every plaintext block strictly under the modulus.

use super::bigint::{byte_length, from_bytes_le, mod_pow, to_bytes_le, to_bytes_le_padded, RsaBigInt};
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::error::{Result, RsaError};

/// Bytes of each modulus-sized block left unused on the plaintext side
pub const RESERVED_BLOCK_BYTES: usize = 11;

/// How a payload is mapped onto integers below the modulus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// Payload split into `k - 11` byte blocks, each output block exactly
    /// `k` bytes, where `k = ceil(bitlength(n) / 8)`.
    ///
    /// The final recovered block is emitted in minimal form, so trailing zero
    /// bytes at the very end of a payload do not survive a round trip.
    #[default]
    Segmented,
    /// Whole payload as a single integer, which must be below the modulus.
    /// Output is the minimal little-endian encoding of the result.
    Single,
}

/// Block sizes derived from a modulus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSizes {
    /// Plaintext bytes consumed per block
    pub plain: usize,
    /// Ciphertext bytes produced per block
    pub cipher: usize,
}

impl BlockSizes {
    pub fn for_modulus(n: &RsaBigInt) -> Result<Self> {
        let cipher = byte_length(n);
        if cipher <= RESERVED_BLOCK_BYTES {
            return Err(RsaError::ModulusTooSmall { bytes: cipher });
        }
        Ok(Self {
            plain: cipher - RESERVED_BLOCK_BYTES,
            cipher,
        })
    }
}

/// Encrypt/decrypt/sign/verify over byte payloads.
///
/// Stateless apart from the block mode; keys are only read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsaCipher {
    mode: BlockMode,
}

impl RsaCipher {
    pub fn new(mode: BlockMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    /// Public-exponent operation on plaintext blocks
    ///
    /// No padding is applied. In segmented mode the last recovered block is
    /// minimal, so trailing zero bytes of `data` are lost on decryption:
    /// `[0x41, 0x00]` comes back as `[0x41]` and `[0x00]` as `[]`.
    pub fn encrypt(&self, data: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>> {
        self.seal(data, key.modulus(), key.public_exponent())
    }

    /// Private-exponent operation on ciphertext blocks
    pub fn decrypt(&self, data: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>> {
        self.open(data, key.modulus(), key.private_exponent())
    }

    /// Textbook signature: private-exponent operation on plaintext blocks
    pub fn sign(&self, data: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>> {
        self.seal(data, key.modulus(), key.private_exponent())
    }

    /// Recover signed data: public-exponent operation on signature blocks
    pub fn verify(&self, data: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>> {
        self.open(data, key.modulus(), key.public_exponent())
    }

    fn seal(&self, data: &[u8], n: &RsaBigInt, exp: &RsaBigInt) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        match self.mode {
            BlockMode::Segmented => {
                let sizes = BlockSizes::for_modulus(n)?;
                let blocks = (data.len() + sizes.plain - 1) / sizes.plain;
                let mut out = Vec::with_capacity(blocks * sizes.cipher);

                for chunk in data.chunks(sizes.plain) {
                    let m = from_bytes_le(chunk);
                    let c = mod_pow(&m, exp, n);
                    out.extend_from_slice(&to_bytes_le_padded(&c, sizes.cipher)?);
                }

                Ok(out)
            }
            BlockMode::Single => {
                let m = from_bytes_le(data);
                if &m >= n {
                    return Err(RsaError::BlockOverflow);
                }
                Ok(to_bytes_le(&mod_pow(&m, exp, n)))
            }
        }
    }

    fn open(&self, data: &[u8], n: &RsaBigInt, exp: &RsaBigInt) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        match self.mode {
            BlockMode::Segmented => {
                let sizes = BlockSizes::for_modulus(n)?;
                if data.len() % sizes.cipher != 0 {
                    return Err(RsaError::InvalidCiphertextLength {
                        len: data.len(),
                        block: sizes.cipher,
                    });
                }

                let blocks = data.len() / sizes.cipher;
                let mut out = Vec::with_capacity(blocks * sizes.plain);

                for (index, chunk) in data.chunks(sizes.cipher).enumerate() {
                    let c = from_bytes_le(chunk);
                    if &c >= n {
                        return Err(RsaError::BlockOverflow);
                    }
                    let m = mod_pow(&c, exp, n);

                    if index + 1 == blocks {
                        out.extend_from_slice(&to_bytes_le(&m));
                    } else {
                        out.extend_from_slice(&to_bytes_le_padded(&m, sizes.plain)?);
                    }
                }

                Ok(out)
            }
            BlockMode::Single => {
                let c = from_bytes_le(data);
                if &c >= n {
                    return Err(RsaError::BlockOverflow);
                }
                Ok(to_bytes_le(&mod_pow(&c, exp, n)))
            }
        }
    }
}

impl RsaPublicKey {
    /// Encrypt a message using this public key (segmented mode)
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        RsaCipher::default().encrypt(plaintext, self)
    }

    /// Recover data signed by the matching private key (segmented mode)
    pub fn verify(&self, signature: &[u8]) -> Result<Vec<u8>> {
        RsaCipher::default().verify(signature, self)
    }
}

impl RsaPrivateKey {
    /// Decrypt a ciphertext using this private key (segmented mode)
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        RsaCipher::default().decrypt(ciphertext, self)
    }

    /// Sign a message using this private key (segmented mode)
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        RsaCipher::default().sign(message, self)
    }
}
