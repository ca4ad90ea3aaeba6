//! Stored representation of an encrypted text field.

use super::NONCE_LEN;
use std::fmt;

/// Nonce-prefixed AES-GCM ciphertext of a single text field.
///
/// Values are never mutated in place: an update replaces the whole field with
/// a freshly sealed one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncryptedField(Vec<u8>);

impl EncryptedField {
    /// Wraps bytes loaded from storage.
    ///
    /// No validation happens here; malformed values are rejected when
    /// opened.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw stored bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the field, returning the raw stored bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the stored length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the stored value is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the nonce and sealed payload, or `None` when the value is
    /// shorter than a nonce.
    pub(crate) fn split(&self) -> Option<(&[u8], &[u8])> {
        self.0.split_at_checked(NONCE_LEN)
    }
}

// Ciphertext bytes stay out of logs.
impl fmt::Debug for EncryptedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedField")
            .field("len", &self.0.len())
            .finish()
    }
}
