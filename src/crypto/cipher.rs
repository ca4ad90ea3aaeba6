//! AES-GCM sealing and opening of single text fields.

use super::{CipherError, EncryptedField};
use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
    aead::{Aead, KeyInit, consts::U12},
    aes::Aes192,
};
use rand::{RngCore, rngs::OsRng};
use std::fmt;
use tracing::warn;

/// Size in bytes of the random nonce prefixed to every sealed field.
pub const NONCE_LEN: usize = 12;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// The AES variant selected by the decoded key length.
enum GcmPrimitive {
    Aes128(Box<Aes128Gcm>),
    Aes192(Box<Aes192Gcm>),
    Aes256(Box<Aes256Gcm>),
}

impl GcmPrimitive {
    fn from_key(key: &[u8]) -> Result<Self, CipherError> {
        let invalid = |_| CipherError::InvalidKeyLength(key.len());
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(|cipher| Self::Aes128(Box::new(cipher)))
                .map_err(invalid),
            24 => Aes192Gcm::new_from_slice(key)
                .map(|cipher| Self::Aes192(Box::new(cipher)))
                .map_err(invalid),
            32 => Aes256Gcm::new_from_slice(key)
                .map(|cipher| Self::Aes256(Box::new(cipher)))
                .map_err(invalid),
            other => Err(CipherError::InvalidKeyLength(other)),
        }
    }

    const fn key_bits(&self) -> usize {
        match self {
            Self::Aes128(_) => 128,
            Self::Aes192(_) => 192,
            Self::Aes256(_) => 256,
        }
    }

    fn encrypt(&self, nonce_bytes: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::from_slice(nonce_bytes);
        match self {
            Self::Aes128(cipher) => cipher.encrypt(nonce, plaintext),
            Self::Aes192(cipher) => cipher.encrypt(nonce, plaintext),
            Self::Aes256(cipher) => cipher.encrypt(nonce, plaintext),
        }
    }

    fn decrypt(&self, nonce_bytes: &[u8], sealed: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::from_slice(nonce_bytes);
        match self {
            Self::Aes128(cipher) => cipher.decrypt(nonce, sealed),
            Self::Aes192(cipher) => cipher.decrypt(nonce, sealed),
            Self::Aes256(cipher) => cipher.decrypt(nonce, sealed),
        }
    }
}

/// Seals and opens task text fields under one static symmetric key.
///
/// The key is hex-decoded once at construction; construction fails closed
/// when the key is malformed, so a half-configured cipher never exists.
pub struct FieldCipher {
    primitive: GcmPrimitive,
}

impl FieldCipher {
    /// Builds a cipher from a hex-encoded AES key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyEncoding`] when the key is not hex and
    /// [`CipherError::InvalidKeyLength`] when it does not decode to 16, 24 or
    /// 32 bytes.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CipherError> {
        let key = hex::decode(hex_key.trim()).map_err(|err| {
            warn!(error = %err, "failed to decode encryption key from hex");
            CipherError::InvalidKeyEncoding(err.to_string())
        })?;
        let primitive = GcmPrimitive::from_key(&key).inspect_err(|err| {
            warn!(error = %err, "failed to build field cipher");
        })?;
        Ok(Self { primitive })
    }

    /// Seals `plaintext` under a freshly generated nonce.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Entropy`] when the operating system random
    /// source fails, or [`CipherError::Seal`] if the primitive rejects the
    /// input.
    pub fn seal(&self, plaintext: &str) -> Result<EncryptedField, CipherError> {
        let mut nonce = [0_u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce).map_err(|err| {
            warn!(error = %err, "failed to generate nonce");
            CipherError::Entropy(err.to_string())
        })?;
        self.seal_with_nonce(nonce, plaintext)
    }

    fn seal_with_nonce(
        &self,
        nonce: [u8; NONCE_LEN],
        plaintext: &str,
    ) -> Result<EncryptedField, CipherError> {
        let sealed = self
            .primitive
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| {
                warn!("failed to seal field");
                CipherError::Seal
            })?;
        let mut bytes = Vec::with_capacity(NONCE_LEN + sealed.len());
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&sealed);
        Ok(EncryptedField::from_bytes(bytes))
    }

    /// Opens a sealed field, returning the plaintext.
    ///
    /// Values shorter than the nonce are rejected before any cryptographic
    /// work is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::TooShort`] for truncated values,
    /// [`CipherError::Authentication`] when the tag does not verify (tampered
    /// bytes or wrong key), and [`CipherError::InvalidUtf8`] when the opened
    /// bytes are not text.
    pub fn open(&self, field: &EncryptedField) -> Result<String, CipherError> {
        let (nonce, sealed) = field.split().ok_or_else(|| {
            warn!(len = field.len(), "encrypted field is shorter than its nonce");
            CipherError::TooShort {
                actual: field.len(),
                expected: NONCE_LEN,
            }
        })?;
        let plaintext = self.primitive.decrypt(nonce, sealed).map_err(|_| {
            warn!("encrypted field failed authentication");
            CipherError::Authentication
        })?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher")
            .field("key_bits", &self.primitive.key_bits())
            .finish_non_exhaustive()
    }
}
