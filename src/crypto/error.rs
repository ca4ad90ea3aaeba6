//! Error types for field encryption.

use thiserror::Error;

/// Errors returned by [`super::FieldCipher`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The key is not valid hexadecimal.
    #[error("encryption key is not valid hex: {0}")]
    InvalidKeyEncoding(String),

    /// The decoded key does not match an AES key size.
    #[error("encryption key must decode to 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The secure random source failed to produce a nonce.
    #[error("failed to generate nonce: {0}")]
    Entropy(String),

    /// Sealing the plaintext failed.
    #[error("failed to seal field")]
    Seal,

    /// The stored value is shorter than the nonce and cannot be opened.
    #[error("encrypted field is {actual} bytes, shorter than the {expected}-byte nonce")]
    TooShort {
        /// Length of the stored value.
        actual: usize,
        /// Required nonce length.
        expected: usize,
    },

    /// The authentication tag did not verify.
    #[error("encrypted field failed authentication")]
    Authentication,

    /// The opened plaintext is not valid UTF-8.
    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,
}
