//! The single active encryption key.

use crate::error::KeyError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{rand_core::RngCore, OsRng};
use secrecy::{ExposeSecret, SecretVec};
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

/// Key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Optional prefix accepted in front of a base64 key, as in `base64:...`.
const BASE64_PREFIX: &str = "base64:";

/// A 256-bit symmetric key, zeroized on drop.
pub struct EncryptionKey {
    bytes: SecretVec<u8>,
}

impl EncryptionKey {
    /// Wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidLength` unless `bytes` is exactly 32 bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, KeyError> {
        if bytes.len() != KEY_SIZE {
            let actual = bytes.len();
            drop(Zeroizing::new(bytes));
            return Err(KeyError::InvalidLength { expected: KEY_SIZE, actual });
        }
        Ok(Self { bytes: SecretVec::new(bytes) })
    }

    /// Generates a fresh random key from the OS RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use elocrypt::key::{EncryptionKey, KEY_SIZE};
    ///
    /// let key = EncryptionKey::generate();
    /// assert_eq!(key.len(), KEY_SIZE);
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes: SecretVec::new(bytes) }
    }

    /// Parses a base64 key, with or without a leading `base64:`.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not base64 or does not decode to 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let encoded = encoded.trim();
        let encoded = encoded.strip_prefix(BASE64_PREFIX).unwrap_or(encoded);
        if encoded.is_empty() {
            return Err(KeyError::Missing);
        }

        let bytes =
            STANDARD.decode(encoded).map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Reads a base64 key from a file. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or holds an invalid key.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let contents = Zeroizing::new(std::fs::read_to_string(path)?);
        Self::from_base64(&contents)
    }

    /// Encodes the key as `base64:<key>`.
    #[must_use]
    pub fn to_base64(&self) -> String {
        format!("{BASE64_PREFIX}{}", STANDARD.encode(self.bytes.expose_secret()))
    }

    /// Returns the key size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.expose_secret().len()
    }

    /// Always `false` for a constructed key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.expose_secret().is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl Clone for EncryptionKey {
    fn clone(&self) -> Self {
        Self { bytes: SecretVec::new(self.bytes.expose_secret().clone()) }
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}
