//! Field-level authenticated encryption for sensitive task data.
//!
//! A task summary is stored as an [`EncryptedField`]: a random 96-bit nonce
//! followed by the AES-GCM ciphertext and authentication tag. Every write
//! seals the plaintext under a fresh nonce, so identical summaries never
//! produce identical stored bytes.

mod cipher;
mod error;
mod field;

pub use cipher::{FieldCipher, NONCE_LEN};
pub use error::CipherError;
pub use field::EncryptedField;
